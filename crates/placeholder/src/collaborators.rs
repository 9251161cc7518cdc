//! Narrow adapter interfaces for optional third-party plugins.
//!
//! The HUD never reaches into a collaborator's internals. An economy plugin
//! is wrapped in an [`EconomyService`] that declares the API version it
//! implements; a token plugin is wrapped in a [`TokenLedger`].

use anyhow::Result;
use scorehud_core::{SubjectHandle, SubjectId};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Economy adapter API major version understood by this build.
pub const SUPPORTED_ECONOMY_API: u16 = 1;

/// Version of the economy adapter contract an implementation follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EconomyApiVersion {
    /// Breaking-change counter.
    pub major: u16,
    /// Additive-change counter.
    pub minor: u16,
}

impl EconomyApiVersion {
    /// The version this build was written against.
    pub const CURRENT: Self = Self {
        major: SUPPORTED_ECONOMY_API,
        minor: 0,
    };

    /// True if this build can drive an adapter of this version.
    pub fn is_supported(self) -> bool {
        self.major == SUPPORTED_ECONOMY_API
    }
}

impl fmt::Display for EconomyApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

/// Balance lookup that arrived from the economy plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceUpdate {
    /// Session that asked for it.
    pub handle: SubjectHandle,
    /// Subject the balance belongs to.
    pub subject: SubjectId,
    /// Balance in whole currency units.
    pub balance: i64,
}

/// One-shot reply slot handed to an [`EconomyService`].
///
/// `complete` may be called from any thread; the value is queued and applied
/// on the game thread the next time the HUD drains completions. Dropping the
/// reply without completing it simply leaves the cached value stale.
#[derive(Debug)]
pub struct BalanceReply {
    handle: SubjectHandle,
    subject: SubjectId,
    tx: UnboundedSender<BalanceUpdate>,
}

impl BalanceReply {
    pub(crate) fn new(
        handle: SubjectHandle,
        subject: SubjectId,
        tx: UnboundedSender<BalanceUpdate>,
    ) -> Self {
        Self {
            handle,
            subject,
            tx,
        }
    }

    /// Subject whose balance was requested.
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// Deliver the balance.
    pub fn complete(self, balance: i64) {
        // A closed channel means the provider is gone; nothing left to update.
        let _ = self.tx.send(BalanceUpdate {
            handle: self.handle,
            subject: self.subject,
            balance,
        });
    }
}

/// Adapter over an economy plugin.
pub trait EconomyService {
    /// Contract version this adapter implements.
    fn api_version(&self) -> EconomyApiVersion;

    /// Start an asynchronous balance lookup. Must not block.
    fn request_balance(&self, subject: &SubjectId, reply: BalanceReply) -> Result<()>;

    /// True if [`EconomyService::balance_now`] is backed by a stable accessor.
    fn supports_sync_lookup(&self) -> bool {
        false
    }

    /// Synchronous fast path. Returns `None` when the value is not at hand.
    fn balance_now(&self, _subject: &SubjectId) -> Option<i64> {
        None
    }
}

/// Adapter over a token-count plugin.
pub trait TokenLedger {
    /// Token count for `subject`, or `None` if the plugin cannot answer.
    fn tokens(&self, subject: &SubjectId) -> Option<i64>;
}
