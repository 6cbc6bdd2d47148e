use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SpinTuning;
use crate::store::Store;
use crate::wheel::geometry::{normalize_angle, segment_at_pointer, segment_center};
use crate::wheel::{DEFAULT_SEGMENT_COUNT, Label, POINTER_ANGLE, sanitize_labels};

/// The canonical wheel state: ordered labels (wedge 0..n-1 clockwise from the
/// pointer) and the current orientation in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelState {
    pub labels: Vec<Label>,
    pub rotation: f64,
}

impl WheelState {
    pub fn defaults() -> Self {
        Self {
            labels: (1..=DEFAULT_SEGMENT_COUNT)
                .map(|i| Label::new(format!("S{i}")))
                .collect(),
            rotation: 0.0,
        }
    }
}

/// One in-flight animated spin. At most one exists at any time.
#[derive(Debug, Clone)]
pub struct SpinTask {
    started_at: Instant,
    duration: Duration,
    start_rotation: f64,
    end_rotation: f64,
    target_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinOutcome {
    pub index: usize,
    pub label: Label,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("a spin is already in flight")]
    Busy,
    #[error("the wheel has no segments")]
    NoSegments,
    #[error("no usable labels after sanitizing")]
    NoUsableLabels,
    #[error("rotation must be a finite number")]
    NonFiniteRotation,
}

pub struct WheelEngine {
    state: WheelState,
    task: Option<SpinTask>,
    last_winner: Option<Label>,
    tuning: SpinTuning,
    store: Store,
    rng: StdRng,
}

impl WheelEngine {
    pub fn new(state: WheelState, tuning: SpinTuning, store: Store) -> Self {
        Self {
            state,
            task: None,
            last_winner: None,
            tuning,
            store,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reseed the winner/turn randomness, for deterministic runs.
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn labels(&self) -> Vec<Label> {
        self.state.labels.clone()
    }

    pub fn rotation(&self) -> f64 {
        self.state.rotation
    }

    pub fn is_spinning(&self) -> bool {
        self.task.is_some()
    }

    pub fn last_winner(&self) -> Option<Label> {
        self.last_winner.clone()
    }

    pub fn set_tuning(&mut self, tuning: SpinTuning) {
        self.tuning = tuning;
    }

    /// Start a spin with a uniformly random winner. Rejected while a spin is
    /// in flight or when the wheel is empty; nothing is mutated on rejection.
    pub fn spin(&mut self, now: Instant) -> Result<(), EngineError> {
        if self.task.is_some() {
            return Err(EngineError::Busy);
        }
        let n = self.state.labels.len();
        if n == 0 {
            return Err(EngineError::NoSegments);
        }
        let target = self.rng.random_range(0..n);
        self.begin_spin(target, now);
        Ok(())
    }

    /// Spin with a predetermined winner. Same state rules as [`spin`],
    /// plus the target must be a valid segment index.
    ///
    /// [`spin`]: WheelEngine::spin
    pub fn spin_to(&mut self, target: usize, now: Instant) -> Result<(), EngineError> {
        if self.task.is_some() {
            return Err(EngineError::Busy);
        }
        if target >= self.state.labels.len() {
            return Err(EngineError::NoSegments);
        }
        self.begin_spin(target, now);
        Ok(())
    }

    fn begin_spin(&mut self, target: usize, now: Instant) {
        let n = self.state.labels.len();
        let span = (self.tuning.max_turns - self.tuning.min_turns).max(0.0);
        let turns = self.tuning.min_turns
            + if span > 0.0 {
                self.rng.random_range(0.0..span)
            } else {
                0.0
            };

        // Monotonically forward: several full turns past the current rotation,
        // then the unique corrective delta in [0, 2π) that parks the target's
        // center under the pointer.
        let base_end = self.state.rotation + turns * TAU;
        let desired = normalize_angle(POINTER_ANGLE - segment_center(target, n));
        let delta = normalize_angle(desired - base_end);

        self.last_winner = None;
        self.task = Some(SpinTask {
            started_at: now,
            duration: self.tuning.duration,
            start_rotation: self.state.rotation,
            end_rotation: base_end + delta,
            target_index: target,
        });
        log::debug!("Spin started: {} segments, {:.2} turns", n, turns);
    }

    /// Advance the animation clock. Writes the eased rotation into the wheel
    /// state every call so collaborators always read live values; on the tick
    /// that reaches the end of the task, runs the completion step exactly once
    /// and returns the outcome.
    pub fn advance(&mut self, now: Instant) -> Option<SpinOutcome> {
        let task = self.task.as_ref()?;
        let elapsed = now.saturating_duration_since(task.started_at);
        let t = if task.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / task.duration.as_secs_f64()).clamp(0.0, 1.0)
        };
        let k = 1.0 - (1.0 - t).powi(5);
        self.state.rotation = task.start_rotation + (task.end_rotation - task.start_rotation) * k;
        if t < 1.0 {
            return None;
        }
        self.settle()
    }

    fn settle(&mut self) -> Option<SpinOutcome> {
        let task = self.task.take()?;
        self.state.rotation = task.end_rotation;

        // Re-derive the winner from the final rotation; the pointer mapping is
        // the source of truth and must agree with the chosen target.
        let winner = segment_at_pointer(self.state.labels.len(), self.state.rotation);
        debug_assert_eq!(winner, task.target_index);

        let label = self.state.labels.remove(winner);
        self.state.rotation = normalize_angle(self.state.rotation);
        self.last_winner = Some(label.clone());
        self.store.save(&self.state);
        Some(SpinOutcome {
            index: winner,
            label,
        })
    }

    /// Restore the default wheel. An in-flight spin is discarded outright:
    /// no completion side effects, no label removal.
    pub fn reset(&mut self) {
        self.task = None;
        self.last_winner = None;
        self.state = WheelState::defaults();
        self.store.save(&self.state);
    }

    /// Replace the labels while idle. Rotation is preserved so the wheel does
    /// not visually jump.
    pub fn set_labels(&mut self, raw: Vec<String>) -> Result<(), EngineError> {
        if self.task.is_some() {
            return Err(EngineError::Busy);
        }
        let labels = sanitize_labels(raw);
        if labels.is_empty() {
            return Err(EngineError::NoUsableLabels);
        }
        self.state.labels = labels;
        self.last_winner = None;
        self.store.save(&self.state);
        Ok(())
    }

    pub fn set_rotation(&mut self, rotation: f64) -> Result<(), EngineError> {
        if self.task.is_some() {
            return Err(EngineError::Busy);
        }
        if !rotation.is_finite() {
            return Err(EngineError::NonFiniteRotation);
        }
        self.state.rotation = normalize_angle(rotation);
        self.store.save(&self.state);
        Ok(())
    }

    pub fn persist(&self) {
        self.store.save(&self.state);
    }

    pub fn clear_persisted(&self) {
        self.store.clear();
    }
}
