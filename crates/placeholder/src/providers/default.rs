//! Player, position, and server tokens.

use crate::format::format_decimal;
use crate::{replace_token, PlaceholderProvider, ProviderError, RenderContext};

/// Resolves tokens that come straight from the host:
///
/// | token | value |
/// |---|---|
/// | `{name}` | subject name |
/// | `{display_name}` | chat display name |
/// | `{health}` / `{max_health}` | health, one decimal |
/// | `{x}` `{y}` `{z}` | position, one decimal per axis |
/// | `{world}` | world folder name |
/// | `{online}` / `{max_online}` | connected subjects / player cap |
/// | `{tps}` | ticks per second, two decimals |
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProvider;

impl DefaultProvider {
    /// Registry name.
    pub const NAME: &'static str = "Default";
}

impl PlaceholderProvider for DefaultProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn resolve(&mut self, text: &str, ctx: &RenderContext<'_>) -> Result<String, ProviderError> {
        let subject = ctx.subject;
        let server = ctx.server;
        let mut out = text.to_string();

        replace_token(&mut out, "{name}", || subject.id.to_string());
        replace_token(&mut out, "{display_name}", || subject.display_name.clone());
        replace_token(&mut out, "{health}", || {
            format_decimal(f64::from(subject.health), 1)
        });
        replace_token(&mut out, "{max_health}", || {
            format_decimal(f64::from(subject.max_health), 1)
        });

        replace_token(&mut out, "{x}", || format_decimal(subject.position.x, 1));
        replace_token(&mut out, "{y}", || format_decimal(subject.position.y, 1));
        replace_token(&mut out, "{z}", || format_decimal(subject.position.z, 1));
        replace_token(&mut out, "{world}", || subject.world.clone());

        replace_token(&mut out, "{online}", || server.online.to_string());
        replace_token(&mut out, "{max_online}", || server.max_online.to_string());
        replace_token(&mut out, "{tps}", || {
            format_decimal(f64::from(server.ticks_per_second), 2)
        });

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorehud_core::{Position, ServerStats, SimTick, SubjectHandle, SubjectSnapshot};

    fn resolve(text: &str, subject: &SubjectSnapshot, server: &ServerStats) -> String {
        let ctx = RenderContext {
            handle: SubjectHandle(1),
            subject,
            server,
            now: SimTick::ZERO,
        };
        DefaultProvider.resolve(text, &ctx).unwrap()
    }

    #[test]
    fn resolves_player_tokens() {
        let mut alice = SubjectSnapshot::named("Alice");
        alice.display_name = "§bAlice".into();
        alice.health = 17.86;
        let text = resolve(
            "{name} ({display_name}) HP: {health}/{max_health}",
            &alice,
            &ServerStats::default(),
        );
        assert_eq!(text, "Alice (§bAlice) HP: 17.9/20");
    }

    #[test]
    fn resolves_position_and_server_tokens() {
        let mut bob = SubjectSnapshot::named("Bob");
        bob.position = Position::new(12.34, 64.0, -7.06);
        bob.world = "nether".into();
        let server = ServerStats {
            online: 3,
            max_online: 50,
            ticks_per_second: 19.876,
        };
        let text = resolve(
            "{x} {y} {z} @ {world} | {online}/{max_online} @ {tps}",
            &bob,
            &server,
        );
        assert_eq!(text, "12.3 64 -7.1 @ nether | 3/50 @ 19.88");
    }

    #[test]
    fn text_without_tokens_is_unchanged() {
        let text = resolve(
            "Coins: {money} {unknown}",
            &SubjectSnapshot::named("Carol"),
            &ServerStats::default(),
        );
        assert_eq!(text, "Coins: {money} {unknown}");
    }
}
