//! Line templates and the rank-addressed state rendered from them.
//!
//! The display sink sorts entries by score, so every template line is given a
//! rank (its score) counted from the bottom: the first line of an `N`-line
//! template gets rank `N`, the last gets rank `1`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Score slot of one sidebar line. Ranks of an `N`-line template are `1..=N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rank(pub u32);

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered raw line templates with `{token}` placeholders.
///
/// Cloning is cheap; all subjects share one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineTemplate {
    lines: Arc<[String]>,
}

impl LineTemplate {
    /// Build a template from configured lines, keeping their order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of lines (`N`).
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True if the template has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Raw template lines in top-to-bottom order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Rank assigned to the line at `index` (0-based, top first).
    pub fn rank_of(&self, index: usize) -> Rank {
        debug_assert!(index < self.lines.len());
        Rank((self.lines.len() - index) as u32)
    }

    /// Iterate `(rank, raw line)` pairs in template order.
    pub fn ranked(&self) -> impl Iterator<Item = (Rank, &str)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(|(index, line)| (self.rank_of(index), line.as_str()))
    }
}

impl Serialize for LineTemplate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.lines.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LineTemplate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let lines = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::new(lines))
    }
}

/// Fully resolved text for one subject, addressed by rank.
///
/// Equality is by value: same ranks mapped to the same text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderedState {
    entries: BTreeMap<Rank, String>,
}

impl RenderedState {
    /// Empty state (nothing pushed yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the text shown at `rank`, returning the previous text.
    pub fn insert(&mut self, rank: Rank, text: String) -> Option<String> {
        self.entries.insert(rank, text)
    }

    /// Text at `rank`, if any.
    pub fn get(&self, rank: Rank) -> Option<&str> {
        self.entries.get(&rank).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been rendered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranks in ascending order.
    pub fn ranks(&self) -> Vec<Rank> {
        self.entries.keys().copied().collect()
    }

    /// `(rank, text)` pairs in ascending rank order.
    pub fn iter(&self) -> impl Iterator<Item = (Rank, &str)> + '_ {
        self.entries.iter().map(|(rank, text)| (*rank, text.as_str()))
    }
}

impl FromIterator<(Rank, String)> for RenderedState {
    fn from_iter<T: IntoIterator<Item = (Rank, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_line_gets_highest_rank() {
        let template = LineTemplate::new(["top", "middle", "bottom"]);
        let ranked: Vec<_> = template.ranked().collect();
        assert_eq!(
            ranked,
            vec![(Rank(3), "top"), (Rank(2), "middle"), (Rank(1), "bottom")]
        );
    }

    #[test]
    fn template_deserializes_from_plain_list() {
        let template: LineTemplate = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(template.lines(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn rendered_state_equality_ignores_insertion_order() {
        let mut a = RenderedState::new();
        a.insert(Rank(1), "x".into());
        a.insert(Rank(2), "y".into());
        let b: RenderedState = [(Rank(2), "y".to_string()), (Rank(1), "x".to_string())]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }

    proptest! {
        /// Property: ranks are a bijection onto 1..=N with the first line at N.
        #[test]
        fn ranks_cover_one_to_n(lines in prop::collection::vec(".{0,8}", 1..40)) {
            let template = LineTemplate::new(lines.clone());
            let n = lines.len() as u32;
            let mut ranks: Vec<u32> = template.ranked().map(|(rank, _)| rank.0).collect();
            prop_assert_eq!(ranks[0], n);
            ranks.sort_unstable();
            let expected: Vec<u32> = (1..=n).collect();
            prop_assert_eq!(ranks, expected);
        }
    }
}
