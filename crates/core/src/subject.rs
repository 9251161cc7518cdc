//! Subject identity and the read-only views the host hands out.
//!
//! Subjects (connected clients) are owned by the host session layer. The HUD
//! never keeps one alive: it stores a [`SubjectId`] and asks the host for a
//! fresh [`SubjectSnapshot`] whenever it renders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable subject identifier (the player name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    /// Wrap a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the underlying name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Handle to one activation of a subject.
///
/// Handles are allocated monotonically and never reused, so a handle taken
/// before a subject quits will not match the session created when it rejoins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectHandle(pub u64);

impl fmt::Display for SubjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World-space position of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Position {
    /// Construct a position.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Point-in-time view of a subject, produced by the host on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSnapshot {
    /// Stable identifier.
    pub id: SubjectId,
    /// Name shown in chat (may carry formatting codes).
    pub display_name: String,
    /// Current health points.
    pub health: f32,
    /// Maximum health points.
    pub max_health: f32,
    /// Current position.
    pub position: Position,
    /// Folder name of the world the subject is in.
    pub world: String,
    /// False once the host has started tearing the session down.
    pub online: bool,
}

impl SubjectSnapshot {
    /// Snapshot with default vitals, useful for hosts that only know a name.
    pub fn named(name: &str) -> Self {
        Self {
            id: SubjectId::new(name),
            display_name: name.to_string(),
            health: 20.0,
            max_health: 20.0,
            position: Position::default(),
            world: "world".to_string(),
            online: true,
        }
    }
}

/// Server-wide figures exposed to placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerStats {
    /// Subjects currently connected.
    pub online: usize,
    /// Configured player cap.
    pub max_online: usize,
    /// Measured ticks per second.
    pub ticks_per_second: f32,
}

impl Default for ServerStats {
    fn default() -> Self {
        Self {
            online: 0,
            max_online: 20,
            ticks_per_second: 20.0,
        }
    }
}
