//! Case-insensitive provider keys.

use std::fmt;

/// Registry key for a provider: the trimmed, lowercased provider name.
///
/// `"BedrockEconomy"` and `"bedrockeconomy"` name the same registry slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderKey(String);

impl ProviderKey {
    /// Normalize a provider name into a key.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// Normalized key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
