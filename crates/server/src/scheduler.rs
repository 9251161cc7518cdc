//! Fixed-period update timer.

use crate::engine::ScoreboardEngine;
use scorehud_core::{DisplaySink, LineTemplate, SessionHost};
use tracing::debug;

/// Default refresh period in server ticks (one second at 20 TPS).
pub const DEFAULT_UPDATE_INTERVAL: u64 = 20;

/// Default number of firings between bulk economy refreshes (~15 s).
pub const DEFAULT_EXTERNAL_REFRESH_EVERY: u32 = 300;

/// What one firing did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FireReport {
    /// Subjects pushed after applying async completions.
    pub pumped: usize,
    /// Subjects pushed by the periodic refresh.
    pub refreshed: usize,
    /// Whether the bulk external refresh ran.
    pub external_refresh: bool,
}

/// Repeating timer driving [`ScoreboardEngine::refresh_all`].
///
/// The host calls [`UpdateScheduler::on_server_tick`] once per server tick;
/// the scheduler fires every `period` ticks.
#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    period: u64,
    external_every: u32,
    elapsed: u64,
    firings: u32,
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_INTERVAL, DEFAULT_EXTERNAL_REFRESH_EVERY)
    }
}

impl UpdateScheduler {
    /// Timer firing every `period` ticks, with a bulk external refresh every
    /// `external_every` firings. Zero values are clamped to one.
    pub fn new(period: u64, external_every: u32) -> Self {
        Self {
            period: period.max(1),
            external_every: external_every.max(1),
            elapsed: 0,
            firings: 0,
        }
    }

    /// Ticks between firings.
    pub fn period(&self) -> u64 {
        self.period
    }

    /// Firings since the last bulk refresh.
    pub fn firings(&self) -> u32 {
        self.firings
    }

    /// True if the next [`UpdateScheduler::on_server_tick`] will fire.
    pub fn is_due(&self) -> bool {
        self.elapsed + 1 >= self.period
    }

    /// Advance one server tick; fire if the period has elapsed.
    pub fn on_server_tick<S: DisplaySink>(
        &mut self,
        engine: &mut ScoreboardEngine<S>,
        host: &dyn SessionHost,
        template: &LineTemplate,
    ) -> Option<FireReport> {
        self.elapsed += 1;
        if self.elapsed < self.period {
            return None;
        }
        self.elapsed = 0;
        Some(self.fire(engine, host, template))
    }

    /// Run one firing now.
    pub fn fire<S: DisplaySink>(
        &mut self,
        engine: &mut ScoreboardEngine<S>,
        host: &dyn SessionHost,
        template: &LineTemplate,
    ) -> FireReport {
        self.firings += 1;
        let pumped = engine.pump_completions(host);
        let refreshed = engine.refresh_all(host, template.clone());

        let external_refresh = self.firings >= self.external_every;
        if external_refresh {
            self.firings = 0;
            debug!(subjects = engine.active_count(), "bulk external data refresh");
            engine.refresh_external(host);
        }

        FireReport {
            pumped,
            refreshed,
            external_refresh,
        }
    }
}
