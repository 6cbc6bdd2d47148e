use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::SpinTuning;
use crate::wheel::{EngineError, Label, SpinOutcome, WheelEngine};

/// A request on the control channel. Anything that does not deserialize into
/// one of these shapes is not for us and gets no reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    SetLabels { labels: Vec<String> },
    Reset,
    Spin,
    GetState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Reply {
    SetLabelsResult { ok: bool },
    ResetResult { ok: bool },
    SpinResult { ok: bool },
    GetStateResult { labels: Vec<Label>, rotation: f64 },
}

/// Shared handle to the engine. Every operation is one synchronous critical
/// section, which is what upholds the at-most-one-spin invariant across the
/// socket tasks and the driver loop.
#[derive(Clone)]
pub struct WheelHandle {
    engine: Arc<Mutex<WheelEngine>>,
}

impl WheelHandle {
    pub fn new(engine: WheelEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn spin(&self, now: Instant) -> Result<(), EngineError> {
        self.engine.lock().spin(now)
    }

    pub fn advance(&self, now: Instant) -> Option<SpinOutcome> {
        self.engine.lock().advance(now)
    }

    pub fn reset(&self) {
        self.engine.lock().reset();
    }

    pub fn set_labels(&self, raw: Vec<String>) -> Result<(), EngineError> {
        self.engine.lock().set_labels(raw)
    }

    /// A copy of the current labels, never the live list.
    pub fn labels(&self) -> Vec<Label> {
        self.engine.lock().labels()
    }

    pub fn rotation(&self) -> f64 {
        self.engine.lock().rotation()
    }

    pub fn set_rotation(&self, rotation: f64) -> Result<(), EngineError> {
        self.engine.lock().set_rotation(rotation)
    }

    pub fn is_spinning(&self) -> bool {
        self.engine.lock().is_spinning()
    }

    pub fn last_winner(&self) -> Option<Label> {
        self.engine.lock().last_winner()
    }

    pub fn set_tuning(&self, tuning: SpinTuning) {
        self.engine.lock().set_tuning(tuning);
    }

    pub fn persist(&self) {
        self.engine.lock().persist();
    }

    /// Wipe the persisted snapshot; the in-memory state is untouched.
    pub fn clear_state(&self) {
        self.engine.lock().clear_persisted();
    }

    /// Map a protocol request onto the engine. State-errors come back as
    /// `ok: false` replies, never as faults.
    pub fn handle_request(&self, request: Request) -> Reply {
        match request {
            Request::SetLabels { labels } => Reply::SetLabelsResult {
                ok: self.set_labels(labels).is_ok(),
            },
            Request::Reset => {
                self.reset();
                Reply::ResetResult { ok: true }
            }
            Request::Spin => Reply::SpinResult {
                ok: self.spin(Instant::now()).is_ok(),
            },
            Request::GetState => Reply::GetStateResult {
                labels: self.labels(),
                rotation: self.rotation(),
            },
        }
    }
}
