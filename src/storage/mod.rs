//! Storage abstraction for per-user statistics.
//!
//! This module provides a trait-based storage abstraction with two implementations:
//! - `SqlxStorage`: PostgreSQL storage via SQLx (feature: `sqlx-storage`)
//! - `MemoryStorage`: In-memory storage for testing and local runs (feature: `memory-storage`)
//!
//! Every query is scoped by the Discord user ID it is given; nothing here
//! reads across users.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, StorageError};
use crate::models::{
    CommandStat, GambleGameStats, ItemStat, LeaderboardStanding, ScratchGameStats,
};

#[cfg(feature = "sqlx-storage")]
mod sqlx_impl;
#[cfg(feature = "sqlx-storage")]
pub use sqlx_impl::SqlxStorage;

#[cfg(feature = "memory-storage")]
mod memory;
#[cfg(feature = "memory-storage")]
pub use memory::MemoryStorage;

/// Read-only access to a user's statistics.
#[async_trait]
pub trait StatsStorage: Send + Sync {
    /// Command usage counts, most used first.
    async fn command_stats(&self, user_id: &str) -> Result<Vec<CommandStat>>;

    /// Item statistic totals, largest first.
    async fn item_stats(&self, user_id: &str) -> Result<Vec<ItemStat>>;

    /// Leaderboard standings, best position first; equal positions ordered
    /// by leaderboard name descending.
    async fn leaderboards(&self, user_id: &str) -> Result<Vec<LeaderboardStanding>>;

    /// Scratch-card plays grouped by game, most played first.
    async fn scratch_stats(&self, user_id: &str) -> Result<Vec<ScratchGameStats>>;

    /// Non-scratch plays grouped by game, most played first.
    ///
    /// `wins` is left at zero; see [`StatsStorage::count_wins`].
    async fn gamble_stats(&self, user_id: &str) -> Result<Vec<GambleGameStats>>;

    /// Number of the user's plays of `game` with `win = 1`.
    async fn count_wins(&self, user_id: &str, game: &str) -> Result<i64>;
}

#[async_trait]
impl<T: StatsStorage + ?Sized> StatsStorage for Arc<T> {
    async fn command_stats(&self, user_id: &str) -> Result<Vec<CommandStat>> {
        (**self).command_stats(user_id).await
    }

    async fn item_stats(&self, user_id: &str) -> Result<Vec<ItemStat>> {
        (**self).item_stats(user_id).await
    }

    async fn leaderboards(&self, user_id: &str) -> Result<Vec<LeaderboardStanding>> {
        (**self).leaderboards(user_id).await
    }

    async fn scratch_stats(&self, user_id: &str) -> Result<Vec<ScratchGameStats>> {
        (**self).scratch_stats(user_id).await
    }

    async fn gamble_stats(&self, user_id: &str) -> Result<Vec<GambleGameStats>> {
        (**self).gamble_stats(user_id).await
    }

    async fn count_wins(&self, user_id: &str, game: &str) -> Result<i64> {
        (**self).count_wins(user_id, game).await
    }
}

/// Combined storage trait for convenience.
///
/// This trait is object-safe and can be used with `Box<dyn Storage>` for
/// dynamic dispatch, or with concrete types for static dispatch.
pub trait Storage: StatsStorage + Send + Sync {}

impl<T: StatsStorage + Send + Sync> Storage for T {}

/// Helper function to create a storage error from a string.
pub fn storage_error(msg: impl Into<String>) -> StorageError {
    StorageError::Other(msg.into())
}
