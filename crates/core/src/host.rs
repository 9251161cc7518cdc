//! Seams to the host game server.
//!
//! The HUD consumes the host through two traits: [`SessionHost`] for looking
//! subjects up by identifier, and [`DisplaySink`] for pushing sidebar state to
//! a subject's client. How the sink encodes things on the wire is the host's
//! business.

use crate::{Rank, RenderedState, ServerStats, SimTick, SubjectId, SubjectSnapshot};
use anyhow::Result;

/// Read access to the host's session layer.
pub trait SessionHost {
    /// Fresh snapshot of a connected subject, or `None` if it is gone.
    fn subject(&self, id: &SubjectId) -> Option<SubjectSnapshot>;

    /// Identifiers of every connected subject.
    fn online_subjects(&self) -> Vec<SubjectId>;

    /// Server-wide figures.
    fn server_stats(&self) -> ServerStats;

    /// Current server tick.
    fn current_tick(&self) -> SimTick;
}

/// Output channel for sidebar state.
pub trait DisplaySink {
    /// Allocate (or re-title) the sidebar for a subject.
    fn create_display(&mut self, subject: &SubjectId, title: &str) -> Result<()>;

    /// Clear whatever is shown at `ranks`.
    fn remove_entries(&mut self, subject: &SubjectId, ranks: &[Rank]) -> Result<()>;

    /// Show every `(rank, text)` pair of `state`.
    fn set_entries(&mut self, subject: &SubjectId, state: &RenderedState) -> Result<()>;

    /// Tear the sidebar down.
    fn remove_display(&mut self, subject: &SubjectId) -> Result<()>;
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn create_display(&mut self, subject: &SubjectId, title: &str) -> Result<()> {
        (**self).create_display(subject, title)
    }

    fn remove_entries(&mut self, subject: &SubjectId, ranks: &[Rank]) -> Result<()> {
        (**self).remove_entries(subject, ranks)
    }

    fn set_entries(&mut self, subject: &SubjectId, state: &RenderedState) -> Result<()> {
        (**self).set_entries(subject, state)
    }

    fn remove_display(&mut self, subject: &SubjectId) -> Result<()> {
        (**self).remove_display(subject)
    }
}
