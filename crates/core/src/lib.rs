#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod host;
pub mod lines;
pub mod subject;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use host::{DisplaySink, SessionHost};
pub use lines::{LineTemplate, Rank, RenderedState};
pub use subject::{Position, ServerStats, SubjectHandle, SubjectId, SubjectSnapshot};

/// Server tick counter (20 TPS => 50 ms per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick of any timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0.saturating_add(delta))
    }

    /// Ticks elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: SimTick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}
