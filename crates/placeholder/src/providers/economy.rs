//! `{money}` backed by an asynchronous economy plugin.
//!
//! The render path never waits on the economy plugin. A cache miss shows
//! [`LOADING`] and fires a request; the reply lands in the cache through a
//! channel that the game thread drains in [`PlaceholderProvider::pump`], so
//! the value shows up on a later render.

use crate::format::format_thousands;
use crate::{
    replace_token, BalanceReply, BalanceUpdate, EconomyService, PlaceholderProvider,
    ProviderError, RenderContext, LOADING, SUPPORTED_ECONOMY_API,
};
use scorehud_core::{SimTick, SubjectHandle, SubjectId};
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

const TOKEN: &str = "{money}";

/// Balance provider with an eventually consistent per-session cache.
pub struct EconomyProvider {
    service: Box<dyn EconomyService>,
    balances: HashMap<SubjectHandle, i64>,
    in_flight: HashSet<SubjectHandle>,
    last_activity_refresh: HashMap<SubjectHandle, SimTick>,
    activity_cooldown: u64,
    replies_tx: UnboundedSender<BalanceUpdate>,
    replies_rx: UnboundedReceiver<BalanceUpdate>,
}

impl EconomyProvider {
    /// Registry name.
    pub const NAME: &'static str = "Economy";

    /// Wrap an economy adapter.
    ///
    /// Fails if the adapter implements an API major version this build does
    /// not understand. `activity_cooldown` is the minimum number of ticks
    /// between activity-triggered refreshes for one subject.
    pub fn new(
        service: Box<dyn EconomyService>,
        activity_cooldown: u64,
    ) -> Result<Self, ProviderError> {
        let version = service.api_version();
        if !version.is_supported() {
            return Err(ProviderError::UnsupportedApi {
                found: version,
                expected: SUPPORTED_ECONOMY_API,
            });
        }
        info!(%version, sync = service.supports_sync_lookup(), "economy adapter attached");

        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        Ok(Self {
            service,
            balances: HashMap::new(),
            in_flight: HashSet::new(),
            last_activity_refresh: HashMap::new(),
            activity_cooldown,
            replies_tx,
            replies_rx,
        })
    }

    /// Cached balance for a session, if one has arrived.
    pub fn cached_balance(&self, handle: SubjectHandle) -> Option<i64> {
        self.balances.get(&handle).copied()
    }

    /// Number of sessions with a cached balance.
    pub fn cached_len(&self) -> usize {
        self.balances.len()
    }

    /// Fire an asynchronous lookup. Failures are logged and leave the cache
    /// untouched so the next render tries again.
    fn request(&mut self, handle: SubjectHandle, subject: &SubjectId) {
        let reply = BalanceReply::new(handle, subject.clone(), self.replies_tx.clone());
        match self.service.request_balance(subject, reply) {
            Ok(()) => {
                self.in_flight.insert(handle);
            }
            Err(err) => {
                error!(%subject, "failed to request balance: {err:#}");
            }
        }
    }

    fn lookup(&mut self, handle: SubjectHandle, subject: &SubjectId) -> Option<i64> {
        if let Some(balance) = self.balances.get(&handle) {
            return Some(*balance);
        }
        if self.service.supports_sync_lookup() {
            if let Some(balance) = self.service.balance_now(subject) {
                debug!(%subject, balance, "balance read synchronously");
                self.balances.insert(handle, balance);
                return Some(balance);
            }
        }
        if !self.in_flight.contains(&handle) {
            self.request(handle, subject);
        }
        None
    }
}

impl PlaceholderProvider for EconomyProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn resolve(&mut self, text: &str, ctx: &RenderContext<'_>) -> Result<String, ProviderError> {
        if !text.contains(TOKEN) {
            return Ok(text.to_string());
        }
        let value = match self.lookup(ctx.handle, &ctx.subject.id) {
            Some(balance) => format_thousands(balance),
            None => LOADING.to_string(),
        };
        let mut out = text.to_string();
        replace_token(&mut out, TOKEN, || value);
        Ok(out)
    }

    fn on_activate(&mut self, ctx: &RenderContext<'_>) {
        if !self.in_flight.contains(&ctx.handle) {
            self.request(ctx.handle, &ctx.subject.id);
        }
    }

    fn on_deactivate(&mut self, handle: SubjectHandle) {
        self.balances.remove(&handle);
        self.in_flight.remove(&handle);
        self.last_activity_refresh.remove(&handle);
    }

    fn on_activity(&mut self, ctx: &RenderContext<'_>) {
        let due = match self.last_activity_refresh.get(&ctx.handle) {
            Some(last) => ctx.now.since(*last) >= self.activity_cooldown,
            None => true,
        };
        if due {
            self.last_activity_refresh.insert(ctx.handle, ctx.now);
            self.request(ctx.handle, &ctx.subject.id);
        }
    }

    fn refresh_external(&mut self, subjects: &[RenderContext<'_>]) {
        debug!(count = subjects.len(), "bulk balance refresh");
        for ctx in subjects {
            self.request(ctx.handle, &ctx.subject.id);
        }
    }

    fn pump(&mut self, is_live: &dyn Fn(SubjectHandle) -> bool) -> Vec<SubjectHandle> {
        let mut changed = Vec::new();
        while let Ok(update) = self.replies_rx.try_recv() {
            self.in_flight.remove(&update.handle);
            if !is_live(update.handle) {
                debug!(
                    subject = %update.subject,
                    handle = %update.handle,
                    "dropping balance for ended session"
                );
                continue;
            }
            let previous = self.balances.insert(update.handle, update.balance);
            debug!(subject = %update.subject, balance = update.balance, "cached balance updated");
            if previous != Some(update.balance) {
                changed.push(update.handle);
            }
        }
        changed
    }
}
