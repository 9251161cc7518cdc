//! Summary metrics for headless HUD runs, exported as JSON for CI.

use crate::SinkEvent;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Counters describing how much sink traffic a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudRunMetrics {
    /// Run identifier.
    pub run_name: String,
    /// When the metrics were collected (RFC 3339).
    pub timestamp: String,
    /// Server ticks simulated.
    pub ticks: u64,
    /// Scheduler firings.
    pub firings: u64,
    /// `create_display` calls.
    pub displays_created: u64,
    /// `remove_display` calls.
    pub displays_removed: u64,
    /// remove-then-set pushes.
    pub pushes: u64,
    /// Lines sent across all pushes.
    pub lines_sent: u64,
}

impl HudRunMetrics {
    /// Start an empty report stamped with the current time.
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_name: run_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            ..Self::default()
        }
    }

    /// Fold recorded sink events into the counters.
    pub fn record(&mut self, events: &[SinkEvent]) {
        for event in events {
            match event {
                SinkEvent::CreateDisplay { .. } => self.displays_created += 1,
                SinkEvent::RemoveDisplay { .. } => self.displays_removed += 1,
                // Every push starts with a remove; count pushes there.
                SinkEvent::RemoveEntries { .. } => self.pushes += 1,
                SinkEvent::SetEntries { entries, .. } => self.lines_sent += entries.len() as u64,
            }
        }
    }

    /// Write the report as pretty JSON, creating parent dirs if needed.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
