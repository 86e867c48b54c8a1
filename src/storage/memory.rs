//! In-memory storage implementation for testing and local runs.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    error::Result,
    models::{
        is_scratch_game, CommandStat, GambleGameStats, GameRecord, ItemStat, LeaderboardStanding,
        ScratchGameStats,
    },
    storage::{storage_error, StatsStorage},
};

/// In-memory storage backend for testing and development.
///
/// Results are sorted in memory on the same keys the SQL backend orders by.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    command_uses: RwLock<Vec<(String, CommandStat)>>,
    item_stats: RwLock<Vec<(String, ItemStat)>>,
    leaderboards: RwLock<Vec<(String, LeaderboardStanding)>>,
    games: RwLock<Vec<GameRecord>>,
    failing: RwLock<HashSet<&'static str>>,
    queries: AtomicUsize,
}

impl MemoryStorage {
    /// Create a new empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for test cleanup).
    pub fn clear(&self) {
        self.command_uses.write().clear();
        self.item_stats.write().clear();
        self.leaderboards.write().clear();
        self.games.write().clear();
        self.failing.write().clear();
    }

    /// Record command usage for a user, replacing any previous count.
    pub fn set_command_uses(&self, user_id: &str, command: &str, uses: i64) {
        let mut rows = self.command_uses.write();
        rows.retain(|(user, stat)| !(user == user_id && stat.command == command));
        rows.push((
            user_id.to_string(),
            CommandStat {
                command: command.to_string(),
                uses,
            },
        ));
    }

    /// Set an item statistic for a user, replacing any previous amount.
    pub fn set_item_stat(&self, user_id: &str, item_id: &str, amount: i64) {
        let mut rows = self.item_stats.write();
        rows.retain(|(user, stat)| !(user == user_id && stat.item_id == item_id));
        rows.push((
            user_id.to_string(),
            ItemStat {
                item_id: item_id.to_string(),
                amount,
            },
        ));
    }

    /// Place a user on a leaderboard.
    pub fn set_leaderboard(&self, user_id: &str, leaderboard: &str, position: i32) {
        let mut rows = self.leaderboards.write();
        rows.retain(|(user, standing)| !(user == user_id && standing.leaderboard == leaderboard));
        rows.push((
            user_id.to_string(),
            LeaderboardStanding {
                leaderboard: leaderboard.to_string(),
                position,
            },
        ));
    }

    /// Append a game play.
    pub fn record_game(&self, record: GameRecord) {
        self.games.write().push(record);
    }

    /// Make the named query (e.g. `"leaderboards"`) fail from now on.
    pub fn fail_query(&self, query: &'static str) {
        self.failing.write().insert(query);
    }

    /// Number of queries executed so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn begin(&self, query: &'static str) -> Result<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().contains(query) {
            return Err(storage_error(format!("{query} unavailable")).into());
        }
        Ok(())
    }

    fn games_for<'a>(
        games: &'a [GameRecord],
        user_id: &'a str,
        scratch: bool,
    ) -> BTreeMap<&'a str, Vec<&'a GameRecord>> {
        let mut groups: BTreeMap<&str, Vec<&GameRecord>> = BTreeMap::new();
        for record in games
            .iter()
            .filter(|r| r.user_id == user_id && is_scratch_game(&r.game) == scratch)
        {
            groups.entry(record.game.as_str()).or_default().push(record);
        }
        groups
    }
}

#[async_trait]
impl StatsStorage for MemoryStorage {
    async fn command_stats(&self, user_id: &str) -> Result<Vec<CommandStat>> {
        self.begin("command_stats")?;
        let mut rows: Vec<CommandStat> = self
            .command_uses
            .read()
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, stat)| stat.clone())
            .collect();
        rows.sort_by(|a, b| b.uses.cmp(&a.uses));
        Ok(rows)
    }

    async fn item_stats(&self, user_id: &str) -> Result<Vec<ItemStat>> {
        self.begin("item_stats")?;
        let mut rows: Vec<ItemStat> = self
            .item_stats
            .read()
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, stat)| stat.clone())
            .collect();
        rows.sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(rows)
    }

    async fn leaderboards(&self, user_id: &str) -> Result<Vec<LeaderboardStanding>> {
        self.begin("leaderboards")?;
        let mut rows: Vec<LeaderboardStanding> = self
            .leaderboards
            .read()
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, standing)| standing.clone())
            .collect();
        rows.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| b.leaderboard.cmp(&a.leaderboard))
        });
        Ok(rows)
    }

    async fn scratch_stats(&self, user_id: &str) -> Result<Vec<ScratchGameStats>> {
        self.begin("scratch_stats")?;
        let games = self.games.read();
        let mut rows: Vec<ScratchGameStats> = Self::games_for(&games, user_id, true)
            .into_iter()
            .map(|(game, plays)| ScratchGameStats {
                game: game.to_string(),
                count: plays.len() as i64,
                win_sum: plays.iter().map(|p| i64::from(p.win)).sum(),
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(rows)
    }

    async fn gamble_stats(&self, user_id: &str) -> Result<Vec<GambleGameStats>> {
        self.begin("gamble_stats")?;
        let games = self.games.read();
        let mut rows: Vec<GambleGameStats> = Self::games_for(&games, user_id, false)
            .into_iter()
            .map(|(game, plays)| {
                let count = plays.len() as i64;
                let bet_sum: i64 = plays.iter().map(|p| p.bet).sum();
                GambleGameStats {
                    game: game.to_string(),
                    count,
                    avg_bet: Some(bet_sum as f64 / count as f64),
                    bet_sum,
                    earned_sum: plays.iter().map(|p| p.earned).sum(),
                    xp_earned_sum: plays.iter().map(|p| p.xp_earned).sum(),
                    wins: 0,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(rows)
    }

    async fn count_wins(&self, user_id: &str, game: &str) -> Result<i64> {
        self.begin("count_wins")?;
        let wins = self
            .games
            .read()
            .iter()
            .filter(|r| r.user_id == user_id && r.game == game && r.win == 1)
            .count();
        Ok(wins as i64)
    }
}
