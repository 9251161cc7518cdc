#![warn(missing_docs)]
//! Placeholder providers and the registry that chains them.
//!
//! A provider owns one family of `{token}`s and rewrites a line of text for
//! one subject. The [`ProviderRegistry`] runs every registered provider over a
//! line in registration order and contains failures to the provider that
//! caused them.

pub mod collaborators;
pub mod format;
mod key;
pub mod providers;
mod registry;

use scorehud_core::{ServerStats, SimTick, SubjectHandle, SubjectSnapshot};
use thiserror::Error;

pub use collaborators::{
    BalanceReply, BalanceUpdate, EconomyApiVersion, EconomyService, TokenLedger,
    SUPPORTED_ECONOMY_API,
};
pub use key::ProviderKey;
pub use providers::{DefaultProvider, EconomyProvider, TokenProvider};
pub use registry::ProviderRegistry;

/// Literal shown in place of a value that has not arrived yet.
pub const LOADING: &str = "Loading...";

/// Errors raised by providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A resolve pass could not produce text.
    #[error("provider {provider} failed: {reason}")]
    Failed {
        /// Provider name.
        provider: String,
        /// What went wrong.
        reason: String,
    },

    /// The economy adapter speaks an API major version we do not understand.
    #[error("economy adapter speaks API {found}, expected major version {expected}")]
    UnsupportedApi {
        /// Version reported by the adapter.
        found: EconomyApiVersion,
        /// Major version this build understands.
        expected: u16,
    },

    /// Collaborator error bubbled up through a provider.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

/// Everything a provider may read while resolving a line for one subject.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Session handle of the subject being rendered.
    pub handle: SubjectHandle,
    /// Fresh view of the subject from the host.
    pub subject: &'a SubjectSnapshot,
    /// Server-wide figures.
    pub server: &'a ServerStats,
    /// Current server tick.
    pub now: SimTick,
}

/// A pluggable text-substitution unit for one placeholder domain.
///
/// `resolve` must leave text without this provider's tokens untouched, and
/// must fall back to a literal (usually [`LOADING`]) rather than fail when a
/// value is merely missing. The lifecycle hooks default to no-ops; only
/// providers that cache per-subject data need them.
pub trait PlaceholderProvider {
    /// Registry name, compared case-insensitively.
    fn name(&self) -> &str;

    /// Replace this provider's tokens in `text`.
    fn resolve(&mut self, text: &str, ctx: &RenderContext<'_>) -> Result<String, ProviderError>;

    /// A subject just got a display.
    fn on_activate(&mut self, _ctx: &RenderContext<'_>) {}

    /// A subject's display was removed; drop anything cached for it.
    fn on_deactivate(&mut self, _handle: SubjectHandle) {}

    /// The host reported activity (e.g. an inventory transaction) for a subject.
    fn on_activity(&mut self, _ctx: &RenderContext<'_>) {}

    /// Periodic bulk refresh of externally sourced data.
    fn refresh_external(&mut self, _subjects: &[RenderContext<'_>]) {}

    /// Apply asynchronous completions that arrived since the last call.
    ///
    /// `is_live` reports whether a handle still belongs to an active session;
    /// completions for dead handles must be dropped. Returns the handles whose
    /// cached data changed.
    fn pump(&mut self, _is_live: &dyn Fn(SubjectHandle) -> bool) -> Vec<SubjectHandle> {
        Vec::new()
    }
}

/// Replace every occurrence of `token` in `text`, skipping the allocation
/// for `value` when the token is absent.
pub(crate) fn replace_token(text: &mut String, token: &str, value: impl FnOnce() -> String) {
    if text.contains(token) {
        *text = text.replace(token, &value());
    }
}
