//! Fake economy and token plugins.

use anyhow::{bail, Result};
use scorehud_core::SubjectId;
use scorehud_placeholder::{BalanceReply, EconomyApiVersion, EconomyService, TokenLedger};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct EconomyState {
    pending: Vec<BalanceReply>,
    balances: HashMap<SubjectId, i64>,
    requests: usize,
    offline: bool,
}

/// Economy plugin whose replies are held until the test releases them.
///
/// Clones share state, so a test can keep one clone while the provider owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct ManualEconomy {
    state: Arc<Mutex<EconomyState>>,
}

impl ManualEconomy {
    /// Economy with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, EconomyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the balance that future replies will carry.
    pub fn set_balance(&self, subject: &SubjectId, balance: i64) {
        self.state().balances.insert(subject.clone(), balance);
    }

    /// Make `request_balance` fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Requests accepted so far.
    pub fn requests(&self) -> usize {
        self.state().requests
    }

    /// Requests not yet answered.
    pub fn pending(&self) -> usize {
        self.state().pending.len()
    }

    /// Answer every outstanding request with the configured balance
    /// (zero for unknown accounts). Returns how many were answered.
    pub fn release_all(&self) -> usize {
        let (pending, balances) = {
            let mut state = self.state();
            (std::mem::take(&mut state.pending), state.balances.clone())
        };
        let count = pending.len();
        for reply in pending {
            let balance = balances.get(reply.subject()).copied().unwrap_or(0);
            reply.complete(balance);
        }
        count
    }

    /// Answer outstanding requests from a background thread, the way a real
    /// economy plugin's database worker would.
    pub fn release_all_on_thread(&self) -> usize {
        let economy = self.clone();
        std::thread::spawn(move || economy.release_all())
            .join()
            .unwrap_or(0)
    }
}

impl EconomyService for ManualEconomy {
    fn api_version(&self) -> EconomyApiVersion {
        EconomyApiVersion::CURRENT
    }

    fn request_balance(&self, subject: &SubjectId, reply: BalanceReply) -> Result<()> {
        let mut state = self.state();
        if state.offline {
            bail!("economy backend offline while fetching {subject}");
        }
        state.requests += 1;
        state.pending.push(reply);
        Ok(())
    }
}

/// Token plugin with a fixed table.
#[derive(Debug, Clone, Default)]
pub struct FixedTokens {
    tokens: HashMap<SubjectId, i64>,
}

impl FixedTokens {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, subject: &str, tokens: i64) -> Self {
        self.tokens.insert(SubjectId::new(subject), tokens);
        self
    }
}

impl TokenLedger for FixedTokens {
    fn tokens(&self, subject: &SubjectId) -> Option<i64> {
        self.tokens.get(subject).copied()
    }
}
