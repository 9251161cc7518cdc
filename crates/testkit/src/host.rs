//! Scriptable stand-in for the host session layer.

use scorehud_core::{ServerStats, SessionHost, SimTick, SubjectId, SubjectSnapshot};
use std::collections::BTreeMap;

/// Host with a mutable roster of subjects and a manually advanced clock.
#[derive(Debug, Clone)]
pub struct FakeHost {
    subjects: BTreeMap<SubjectId, SubjectSnapshot>,
    max_online: usize,
    ticks_per_second: f32,
    tick: SimTick,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            subjects: BTreeMap::new(),
            max_online: 20,
            ticks_per_second: 20.0,
            tick: SimTick::ZERO,
        }
    }
}

impl FakeHost {
    /// Empty host at tick zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a subject (replacing any previous snapshot with that name).
    pub fn join(&mut self, snapshot: SubjectSnapshot) -> SubjectId {
        let id = snapshot.id.clone();
        self.subjects.insert(id.clone(), snapshot);
        id
    }

    /// Connect a subject with default vitals.
    pub fn join_named(&mut self, name: &str) -> SubjectId {
        self.join(SubjectSnapshot::named(name))
    }

    /// Disconnect a subject.
    pub fn quit(&mut self, id: &SubjectId) -> Option<SubjectSnapshot> {
        self.subjects.remove(id)
    }

    /// Mutate a connected subject in place.
    pub fn update<F: FnOnce(&mut SubjectSnapshot)>(&mut self, id: &SubjectId, f: F) {
        if let Some(subject) = self.subjects.get_mut(id) {
            f(subject);
        }
    }

    /// Set the measured tick rate.
    pub fn set_ticks_per_second(&mut self, tps: f32) {
        self.ticks_per_second = tps;
    }

    /// Advance the clock by one tick.
    pub fn advance(&mut self) -> SimTick {
        self.tick = self.tick.advance(1);
        self.tick
    }
}

impl SessionHost for FakeHost {
    fn subject(&self, id: &SubjectId) -> Option<SubjectSnapshot> {
        self.subjects.get(id).cloned()
    }

    fn online_subjects(&self) -> Vec<SubjectId> {
        self.subjects.keys().cloned().collect()
    }

    fn server_stats(&self) -> ServerStats {
        ServerStats {
            online: self.subjects.len(),
            max_online: self.max_online,
            ticks_per_second: self.ticks_per_second,
        }
    }

    fn current_tick(&self) -> SimTick {
        self.tick
    }
}
