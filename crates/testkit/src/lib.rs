#![warn(missing_docs)]
//! Test doubles for the host, the display sink, and third-party plugins,
//! plus transcript writers for headless runs.

mod collaborators;
mod host;
mod metrics;
mod sink;

use anyhow::Result;
use scorehud_core::SimTick;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub use collaborators::*;
pub use host::*;
pub use metrics::*;
pub use sink::*;

/// One line of a headless-run transcript.
#[derive(Debug, Serialize)]
pub struct TranscriptRecord<'a> {
    /// Server tick the sink call happened on.
    pub tick: SimTick,
    /// The recorded call.
    #[serde(flatten)]
    pub event: &'a SinkEvent,
}

/// Writes sink calls as newline-delimited JSON.
pub struct JsonlTranscript {
    file: File,
}

impl JsonlTranscript {
    /// Create a transcript at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Append one event.
    pub fn write(&mut self, tick: SimTick, event: &SinkEvent) -> Result<()> {
        let line = serde_json::to_string(&TranscriptRecord { tick, event })?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}
