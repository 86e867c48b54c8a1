//! Per-user statistics records read by the stats page.

use serde::{Deserialize, Serialize};

/// Substring identifying scratch-card games in the `Game` table.
pub const SCRATCH_GAME_MARKER: &str = "scratch";

/// How often a user ran a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-storage", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CommandStat {
    pub command: String,
    pub uses: i64,
}

/// Running total of an item statistic for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-storage", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ItemStat {
    pub item_id: String,
    pub amount: i64,
}

/// A user's position on one leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-storage", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardStanding {
    pub leaderboard: String,
    pub position: i32,
}

/// Scratch-card plays for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-storage", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ScratchGameStats {
    pub game: String,
    /// Number of plays.
    pub count: i64,
    /// Sum of the win indicator over all plays.
    pub win_sum: i64,
}

/// Gambling plays for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-storage", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct GambleGameStats {
    pub game: String,
    /// Number of plays.
    pub count: i64,
    pub avg_bet: Option<f64>,
    pub bet_sum: i64,
    pub earned_sum: i64,
    pub xp_earned_sum: i64,
    /// Plays with `win = 1`, filled in after grouping.
    #[cfg_attr(feature = "sqlx-storage", sqlx(default))]
    pub wins: i64,
}

/// One play of a game, as stored in the `Game` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub user_id: String,
    pub game: String,
    pub bet: i64,
    pub earned: i64,
    pub xp_earned: i64,
    pub win: i32,
}

/// Whether a game identifier belongs to the scratch-card family.
#[must_use]
pub fn is_scratch_game(game: &str) -> bool {
    game.contains(SCRATCH_GAME_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_scratch_game() {
        assert!(is_scratch_game("scratch_card"));
        assert!(is_scratch_game("vote_scratch"));
        assert!(!is_scratch_game("blackjack"));
        assert!(!is_scratch_game("Scratch"));
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let json = serde_json::to_value(GambleGameStats {
            game: "roulette".to_string(),
            count: 3,
            avg_bet: Some(150.0),
            bet_sum: 450,
            earned_sum: 900,
            xp_earned_sum: 12,
            wins: 1,
        })
        .unwrap();

        assert_eq!(json["avgBet"], 150.0);
        assert_eq!(json["betSum"], 450);
        assert_eq!(json["xpEarnedSum"], 12);
        assert_eq!(json["wins"], 1);

        let json = serde_json::to_value(ItemStat {
            item_id: "lock_pick".to_string(),
            amount: 4,
        })
        .unwrap();
        assert_eq!(json["itemId"], "lock_pick");
    }
}
