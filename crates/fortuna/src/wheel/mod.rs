use std::f64::consts::PI;

use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

pub mod engine;
pub mod geometry;

pub use engine::{EngineError, SpinOutcome, SpinTask, WheelEngine, WheelState};
pub use geometry::{normalize_angle, segment_at_pointer, segment_center};

pub const SEGMENT_CAP: usize = 64;
pub const DEFAULT_SEGMENT_COUNT: usize = 12;
pub const POINTER_ANGLE: f64 = -PI / 2.0; // top of the wheel, never moves
pub const EDGE_EPSILON: f64 = 1e-9; // nudge past exact wedge edges

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trim entries, drop the ones that end up empty, cap at [`SEGMENT_CAP`].
/// Order and duplicates are preserved.
pub fn sanitize_labels<I>(raw: I) -> Vec<Label>
where
    I: IntoIterator<Item = String>,
{
    raw.into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .take(SEGMENT_CAP)
        .map(Label::new)
        .collect()
}
