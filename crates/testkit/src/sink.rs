//! Display sink that records every call instead of talking to a client.

use anyhow::{bail, Result};
use scorehud_core::{DisplaySink, Rank, RenderedState, SubjectId};
use serde::Serialize;

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SinkEvent {
    /// `create_display`
    CreateDisplay {
        /// Target subject.
        subject: String,
        /// Sidebar title.
        title: String,
    },
    /// `remove_entries`
    RemoveEntries {
        /// Target subject.
        subject: String,
        /// Ranks cleared, ascending.
        ranks: Vec<u32>,
    },
    /// `set_entries`
    SetEntries {
        /// Target subject.
        subject: String,
        /// `(rank, text)` pairs, ascending by rank.
        entries: Vec<(u32, String)>,
    },
    /// `remove_display`
    RemoveDisplay {
        /// Target subject.
        subject: String,
    },
}

impl SinkEvent {
    /// Subject the call was addressed to.
    pub fn subject(&self) -> &str {
        match self {
            Self::CreateDisplay { subject, .. }
            | Self::RemoveEntries { subject, .. }
            | Self::SetEntries { subject, .. }
            | Self::RemoveDisplay { subject } => subject,
        }
    }
}

/// In-memory [`DisplaySink`] for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
    fail_next_set: bool,
}

impl RecordingSink {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Take and clear the recorded events.
    pub fn drain(&mut self) -> Vec<SinkEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events addressed to one subject.
    pub fn events_for(&self, subject: &str) -> Vec<&SinkEvent> {
        self.events
            .iter()
            .filter(|event| event.subject() == subject)
            .collect()
    }

    /// Make the next `set_entries` call fail.
    pub fn fail_next_set(&mut self) {
        self.fail_next_set = true;
    }
}

impl DisplaySink for RecordingSink {
    fn create_display(&mut self, subject: &SubjectId, title: &str) -> Result<()> {
        self.events.push(SinkEvent::CreateDisplay {
            subject: subject.to_string(),
            title: title.to_string(),
        });
        Ok(())
    }

    fn remove_entries(&mut self, subject: &SubjectId, ranks: &[Rank]) -> Result<()> {
        self.events.push(SinkEvent::RemoveEntries {
            subject: subject.to_string(),
            ranks: ranks.iter().map(|rank| rank.0).collect(),
        });
        Ok(())
    }

    fn set_entries(&mut self, subject: &SubjectId, state: &RenderedState) -> Result<()> {
        if std::mem::take(&mut self.fail_next_set) {
            bail!("injected set_entries failure for {subject}");
        }
        self.events.push(SinkEvent::SetEntries {
            subject: subject.to_string(),
            entries: state
                .iter()
                .map(|(rank, text)| (rank.0, text.to_string()))
                .collect(),
        });
        Ok(())
    }

    fn remove_display(&mut self, subject: &SubjectId) -> Result<()> {
        self.events.push(SinkEvent::RemoveDisplay {
            subject: subject.to_string(),
        });
        Ok(())
    }
}
