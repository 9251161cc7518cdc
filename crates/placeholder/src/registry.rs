//! Ordered provider chain with per-provider failure isolation.

use crate::{PlaceholderProvider, ProviderKey, RenderContext};
use scorehud_core::SubjectHandle;
use tracing::{debug, error};

/// Ordered collection of providers keyed by case-insensitive name.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<(ProviderKey, Box<dyn PlaceholderProvider>)>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider.
    ///
    /// Re-registering a name replaces the earlier provider in its original
    /// slot, so chain order is fixed by the first registration of a name.
    pub fn register(&mut self, provider: Box<dyn PlaceholderProvider>) {
        let key = ProviderKey::new(provider.name());
        if let Some(slot) = self.providers.iter_mut().find(|(k, _)| *k == key) {
            debug!(provider = %key, "replacing placeholder provider");
            slot.1 = provider;
        } else {
            debug!(provider = %key, "registering placeholder provider");
            self.providers.push((key, provider));
        }
    }

    /// True if a provider is registered under `name` (any case).
    pub fn contains(&self, name: &str) -> bool {
        let key = ProviderKey::new(name);
        self.providers.iter().any(|(k, _)| *k == key)
    }

    /// Registered keys in chain order.
    pub fn keys(&self) -> impl Iterator<Item = &ProviderKey> {
        self.providers.iter().map(|(key, _)| key)
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Run every provider over `text` in order, each seeing the previous
    /// provider's output. A failing provider is logged and skipped.
    pub fn render_line(&mut self, text: &str, ctx: &RenderContext<'_>) -> String {
        let mut current = text.to_string();
        for (key, provider) in &mut self.providers {
            match provider.resolve(&current, ctx) {
                Ok(next) => current = next,
                Err(err) => {
                    error!(
                        provider = %key,
                        subject = %ctx.subject.id,
                        "placeholder provider failed: {err}"
                    );
                }
            }
        }
        current
    }

    /// Notify providers that a subject became active.
    pub fn on_activate(&mut self, ctx: &RenderContext<'_>) {
        for (_, provider) in &mut self.providers {
            provider.on_activate(ctx);
        }
    }

    /// Notify providers that a session ended.
    pub fn on_deactivate(&mut self, handle: SubjectHandle) {
        for (_, provider) in &mut self.providers {
            provider.on_deactivate(handle);
        }
    }

    /// Forward host-reported activity.
    pub fn on_activity(&mut self, ctx: &RenderContext<'_>) {
        for (_, provider) in &mut self.providers {
            provider.on_activity(ctx);
        }
    }

    /// Ask providers to refresh externally sourced data for `subjects`.
    pub fn refresh_external(&mut self, subjects: &[RenderContext<'_>]) {
        for (_, provider) in &mut self.providers {
            provider.refresh_external(subjects);
        }
    }

    /// Drain asynchronous completions from every provider.
    ///
    /// Returns the handles whose cached data changed, deduplicated and sorted.
    pub fn pump(&mut self, is_live: &dyn Fn(SubjectHandle) -> bool) -> Vec<SubjectHandle> {
        let mut touched = Vec::new();
        for (_, provider) in &mut self.providers {
            touched.extend(provider.pump(is_live));
        }
        touched.sort_unstable();
        touched.dedup();
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderError;
    use scorehud_core::{ServerStats, SimTick, SubjectSnapshot};

    struct Fixed {
        name: &'static str,
        token: &'static str,
        value: &'static str,
    }

    impl PlaceholderProvider for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn resolve(
            &mut self,
            text: &str,
            _ctx: &RenderContext<'_>,
        ) -> Result<String, ProviderError> {
            Ok(text.replace(self.token, self.value))
        }
    }

    struct Exploding;

    impl PlaceholderProvider for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn resolve(
            &mut self,
            _text: &str,
            _ctx: &RenderContext<'_>,
        ) -> Result<String, ProviderError> {
            Err(ProviderError::Failed {
                provider: "exploding".into(),
                reason: "boom".into(),
            })
        }
    }

    fn render(registry: &mut ProviderRegistry, text: &str) -> String {
        let subject = SubjectSnapshot::named("Alice");
        let server = ServerStats::default();
        let ctx = RenderContext {
            handle: SubjectHandle(1),
            subject: &subject,
            server: &server,
            now: SimTick::ZERO,
        };
        registry.render_line(text, &ctx)
    }

    #[test]
    fn failing_provider_does_not_stop_the_chain() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(Fixed {
            name: "a",
            token: "{a}",
            value: "1",
        }));
        registry.register(Box::new(Exploding));
        registry.register(Box::new(Fixed {
            name: "b",
            token: "{b}",
            value: "2",
        }));

        assert_eq!(render(&mut registry, "{a} {b} {c}"), "1 2 {c}");
    }

    #[test]
    fn later_registration_wins_case_insensitively() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(Fixed {
            name: "Money",
            token: "{money}",
            value: "old",
        }));
        registry.register(Box::new(Fixed {
            name: "other",
            token: "{x}",
            value: "x",
        }));
        registry.register(Box::new(Fixed {
            name: "MONEY",
            token: "{money}",
            value: "new",
        }));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("money"));
        assert_eq!(
            registry.keys().map(ProviderKey::as_str).collect::<Vec<_>>(),
            vec!["money", "other"]
        );
        assert_eq!(render(&mut registry, "{money}"), "new");
    }

    #[test]
    fn providers_see_previous_output() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(Fixed {
            name: "first",
            token: "{a}",
            value: "{b}",
        }));
        registry.register(Box::new(Fixed {
            name: "second",
            token: "{b}",
            value: "done",
        }));
        assert_eq!(render(&mut registry, "{a}"), "done");
    }

    #[test]
    fn empty_registry_passes_text_through() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(render(&mut registry, "plain {name}"), "plain {name}");
    }
}
