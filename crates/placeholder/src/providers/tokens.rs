//! `{tokens}` read synchronously from a token plugin.

use crate::format::format_thousands;
use crate::{replace_token, PlaceholderProvider, ProviderError, RenderContext, TokenLedger};

const TOKEN: &str = "{tokens}";

/// Token-count provider. Leaves `{tokens}` in place when the ledger cannot
/// answer for a subject.
pub struct TokenProvider {
    ledger: Box<dyn TokenLedger>,
}

impl TokenProvider {
    /// Registry name.
    pub const NAME: &'static str = "Tokens";

    /// Wrap a token ledger.
    pub fn new(ledger: Box<dyn TokenLedger>) -> Self {
        Self { ledger }
    }
}

impl PlaceholderProvider for TokenProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn resolve(&mut self, text: &str, ctx: &RenderContext<'_>) -> Result<String, ProviderError> {
        let mut out = text.to_string();
        if !out.contains(TOKEN) {
            return Ok(out);
        }
        if let Some(tokens) = self.ledger.tokens(&ctx.subject.id) {
            replace_token(&mut out, TOKEN, || format_thousands(tokens));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorehud_core::{ServerStats, SimTick, SubjectHandle, SubjectId, SubjectSnapshot};

    struct Ledger;

    impl TokenLedger for Ledger {
        fn tokens(&self, subject: &SubjectId) -> Option<i64> {
            (subject.as_str() == "Alice").then_some(12_000)
        }
    }

    fn resolve(name: &str, text: &str) -> String {
        let subject = SubjectSnapshot::named(name);
        let server = ServerStats::default();
        let ctx = RenderContext {
            handle: SubjectHandle(1),
            subject: &subject,
            server: &server,
            now: SimTick::ZERO,
        };
        TokenProvider::new(Box::new(Ledger)).resolve(text, &ctx).unwrap()
    }

    #[test]
    fn resolves_known_subject() {
        assert_eq!(resolve("Alice", "Tokens: {tokens}"), "Tokens: 12,000");
    }

    #[test]
    fn leaves_token_when_ledger_has_no_answer() {
        assert_eq!(resolve("Bob", "Tokens: {tokens}"), "Tokens: {tokens}");
    }
}
