//! Sidebar objective packets.
//!
//! The HUD drives a single objective per client. Each line is a fake-player
//! score entry whose score and scoreboard id both equal the line's rank.

use scorehud_core::Rank;
use serde::{Deserialize, Serialize};

/// Wire protocol version.
pub const PROTOCOL_VERSION: u16 = 1;

/// Display slot the objective is shown in.
pub const DISPLAY_SLOT: &str = "sidebar";

/// Name of the single objective every client gets.
pub const OBJECTIVE_NAME: &str = "objective";

/// Objective criteria; scores are set by the server only.
pub const CRITERIA: &str = "dummy";

/// Client-side ordering of score entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Wire value 0.
    #[default]
    Ascending,
    /// Wire value 1.
    Descending,
}

impl SortOrder {
    /// Value carried in the packet.
    pub fn wire_value(self) -> u8 {
        match self {
            Self::Ascending => 0,
            Self::Descending => 1,
        }
    }
}

/// What a [`ScorePacket::SetScore`] does with its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreAction {
    /// Set or overwrite the entries.
    Change,
    /// Drop the entries.
    Remove,
}

/// One sidebar line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Stable id of the line; equals the rank.
    pub scoreboard_id: i64,
    /// Objective the entry belongs to.
    pub objective: String,
    /// Sort key; equals the rank.
    pub score: i32,
    /// Text shown as the fake player's name. Empty in removals.
    pub custom_name: String,
}

impl ScoreEntry {
    /// Entry for `rank` on the HUD objective.
    pub fn line(rank: Rank, text: impl Into<String>) -> Self {
        Self {
            scoreboard_id: i64::from(rank.0),
            objective: OBJECTIVE_NAME.to_string(),
            score: i32::try_from(rank.0).unwrap_or(i32::MAX),
            custom_name: text.into(),
        }
    }
}

/// Packets sent to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScorePacket {
    /// Create or re-title the objective and put it in a display slot.
    SetDisplayObjective {
        /// Slot, always [`DISPLAY_SLOT`].
        display_slot: String,
        /// Objective name, always [`OBJECTIVE_NAME`].
        objective: String,
        /// Title shown above the lines.
        display_name: String,
        /// Criteria, always [`CRITERIA`].
        criteria: String,
        /// Entry ordering.
        sort_order: SortOrder,
    },
    /// Change or remove score entries.
    SetScore {
        /// Change or remove.
        action: ScoreAction,
        /// Affected entries.
        entries: Vec<ScoreEntry>,
    },
    /// Remove the objective entirely.
    RemoveObjective {
        /// Objective name.
        objective: String,
    },
}

impl ScorePacket {
    /// Sidebar objective titled `title`.
    pub fn display(title: &str, sort_order: SortOrder) -> Self {
        Self::SetDisplayObjective {
            display_slot: DISPLAY_SLOT.to_string(),
            objective: OBJECTIVE_NAME.to_string(),
            display_name: title.to_string(),
            criteria: CRITERIA.to_string(),
            sort_order,
        }
    }

    /// Removal of the lines at `ranks`.
    pub fn remove_lines(ranks: &[Rank]) -> Self {
        Self::SetScore {
            action: ScoreAction::Remove,
            entries: ranks
                .iter()
                .map(|rank| ScoreEntry::line(*rank, String::new()))
                .collect(),
        }
    }

    /// Removal of the HUD objective.
    pub fn remove_objective() -> Self {
        Self::RemoveObjective {
            objective: OBJECTIVE_NAME.to_string(),
        }
    }

    /// Frame tag for this packet kind.
    pub fn tag(&self) -> u8 {
        match self {
            Self::SetDisplayObjective { .. } => 0,
            Self::SetScore { .. } => 1,
            Self::RemoveObjective { .. } => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_entry_uses_rank_for_score_and_id() {
        let entry = ScoreEntry::line(Rank(3), "Alice");
        assert_eq!(entry.score, 3);
        assert_eq!(entry.scoreboard_id, 3);
        assert_eq!(entry.objective, OBJECTIVE_NAME);
    }

    #[test]
    fn display_packet_targets_sidebar() {
        let packet = ScorePacket::display("§lHUD", SortOrder::default());
        match packet {
            ScorePacket::SetDisplayObjective {
                display_slot,
                criteria,
                sort_order,
                ..
            } => {
                assert_eq!(display_slot, "sidebar");
                assert_eq!(criteria, "dummy");
                assert_eq!(sort_order.wire_value(), 0);
            }
            other => panic!("unexpected packet {other:?}"),
        }
    }

    #[test]
    fn removal_entries_carry_no_text() {
        let ScorePacket::SetScore { action, entries } =
            ScorePacket::remove_lines(&[Rank(1), Rank(2)])
        else {
            panic!("expected SetScore");
        };
        assert_eq!(action, ScoreAction::Remove);
        assert!(entries.iter().all(|e| e.custom_name.is_empty()));
        assert_eq!(entries.len(), 2);
    }
}
