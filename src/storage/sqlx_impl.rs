//! `SQLx` `PostgreSQL` storage implementation.
//!
//! Table and column names follow the Prisma schema of the bot that writes
//! these rows, hence the quoted camelCase identifiers.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::{Result, StorageError},
    models::{
        CommandStat, GambleGameStats, ItemStat, LeaderboardStanding, ScratchGameStats,
        SCRATCH_GAME_MARKER,
    },
    storage::StatsStorage,
};

/// `SQLx` `PostgreSQL` storage backend.
#[derive(Debug, Clone)]
pub struct SqlxStorage {
    pool: PgPool,
}

impl SqlxStorage {
    /// Create a new `SQLx` storage with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///    - Returns `StorageError` if migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.into()))?;
        Ok(())
    }
}

#[async_trait]
impl StatsStorage for SqlxStorage {
    async fn command_stats(&self, user_id: &str) -> Result<Vec<CommandStat>> {
        let rows = sqlx::query_as::<_, CommandStat>(
            r#"
            SELECT "command", "uses"::BIGINT AS "uses"
            FROM "CommandUse"
            WHERE "userId" = $1
            ORDER BY "uses" DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(rows)
    }

    async fn item_stats(&self, user_id: &str) -> Result<Vec<ItemStat>> {
        let rows = sqlx::query_as::<_, ItemStat>(
            r#"
            SELECT "itemId" AS item_id, "amount"::BIGINT AS amount
            FROM "Stats"
            WHERE "userId" = $1
            ORDER BY "amount" DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(rows)
    }

    async fn leaderboards(&self, user_id: &str) -> Result<Vec<LeaderboardStanding>> {
        let rows = sqlx::query_as::<_, LeaderboardStanding>(
            r#"
            SELECT "leaderboard", "position"
            FROM "Leaderboards"
            WHERE "userId" = $1
            ORDER BY "position" ASC, "leaderboard" DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(rows)
    }

    async fn scratch_stats(&self, user_id: &str) -> Result<Vec<ScratchGameStats>> {
        let rows = sqlx::query_as::<_, ScratchGameStats>(
            r#"
            SELECT
                "game",
                COUNT(*) AS count,
                COALESCE(SUM("win"), 0)::BIGINT AS win_sum
            FROM "Game"
            WHERE "userId" = $1 AND STRPOS("game", $2) > 0
            GROUP BY "game"
            ORDER BY count DESC
            "#,
        )
        .bind(user_id)
        .bind(SCRATCH_GAME_MARKER)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(rows)
    }

    async fn gamble_stats(&self, user_id: &str) -> Result<Vec<GambleGameStats>> {
        let rows = sqlx::query_as::<_, GambleGameStats>(
            r#"
            SELECT
                "game",
                COUNT(*) AS count,
                AVG("bet")::DOUBLE PRECISION AS avg_bet,
                COALESCE(SUM("bet"), 0)::BIGINT AS bet_sum,
                COALESCE(SUM("earned"), 0)::BIGINT AS earned_sum,
                COALESCE(SUM("xpEarned"), 0)::BIGINT AS xp_earned_sum
            FROM "Game"
            WHERE "userId" = $1 AND STRPOS("game", $2) = 0
            GROUP BY "game"
            ORDER BY count DESC
            "#,
        )
        .bind(user_id)
        .bind(SCRATCH_GAME_MARKER)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(rows)
    }

    async fn count_wins(&self, user_id: &str, game: &str) -> Result<i64> {
        let wins: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM "Game"
            WHERE "userId" = $1 AND "game" = $2 AND "win" = 1
            "#,
        )
        .bind(user_id)
        .bind(game)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(wins)
    }
}
