//! PostgreSQL implementation of the puzzle repository.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::PuzzleRepository;
use super::models::PuzzleRow;
use crate::config::ServerConfig;
use crate::domain::{NewPuzzle, Puzzle, PuzzleChanges, PuzzleId};
use crate::error::PuzzleError;

/// Opens a connection pool sized from the configuration.
///
/// # Errors
///
/// Returns [`PuzzleError::Storage`] if the database is unreachable.
pub async fn connect(config: &ServerConfig) -> Result<PgPool, PuzzleError> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await
        .map_err(|e| PuzzleError::Storage(format!("failed to connect to database: {e}")))
}

/// Applies the embedded schema migrations.
///
/// # Errors
///
/// Returns [`PuzzleError::Storage`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), PuzzleError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| PuzzleError::Storage(format!("failed to migrate database: {e}")))
}

/// PostgreSQL-backed puzzle repository using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPuzzleRepository {
    pool: PgPool,
}

impl PostgresPuzzleRepository {
    /// Creates a repository over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(id: PuzzleId) -> PuzzleError {
    PuzzleError::NotFound(format!("puzzle {id}"))
}

#[async_trait]
impl PuzzleRepository for PostgresPuzzleRepository {
    async fn insert(&self, puzzle: NewPuzzle) -> Result<Puzzle, PuzzleError> {
        let row = sqlx::query_as::<_, PuzzleRow>(
            "INSERT INTO puzzles (name, img, best_time, created_at, last_played_at) \
             VALUES ($1, $2, 0, $3, $4) \
             RETURNING id, name, img, best_time, created_at, last_played_at, last_best_time_at",
        )
        .bind(&puzzle.name)
        .bind(&puzzle.image_reference)
        .bind(puzzle.created_at)
        .bind(puzzle.last_played_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: PuzzleId) -> Result<Puzzle, PuzzleError> {
        let row = sqlx::query_as::<_, PuzzleRow>(
            "SELECT id, name, img, best_time, created_at, last_played_at, last_best_time_at \
             FROM puzzles WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Puzzle::from).ok_or_else(|| not_found(id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Puzzle, PuzzleError> {
        let row = sqlx::query_as::<_, PuzzleRow>(
            "SELECT id, name, img, best_time, created_at, last_played_at, last_best_time_at \
             FROM puzzles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Puzzle::from)
            .ok_or_else(|| PuzzleError::NotFound(format!("puzzle named {name:?}")))
    }

    async fn find_all(&self) -> Result<Vec<Puzzle>, PuzzleError> {
        let rows = sqlx::query_as::<_, PuzzleRow>(
            "SELECT id, name, img, best_time, created_at, last_played_at, last_best_time_at \
             FROM puzzles ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Puzzle::from).collect())
    }

    async fn count(&self) -> Result<u64, PuzzleError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM puzzles")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn update_fields(
        &self,
        id: PuzzleId,
        changes: &PuzzleChanges,
    ) -> Result<Puzzle, PuzzleError> {
        let row = sqlx::query_as::<_, PuzzleRow>(
            "UPDATE puzzles SET \
                 name = COALESCE($2, name), \
                 best_time = COALESCE($3, best_time), \
                 last_played_at = COALESCE($4, last_played_at), \
                 last_best_time_at = COALESCE($5, last_best_time_at), \
                 created_at = COALESCE($6, created_at), \
                 img = COALESCE($7, img) \
             WHERE id = $1 \
             RETURNING id, name, img, best_time, created_at, last_played_at, last_best_time_at",
        )
        .bind(id.get())
        .bind(changes.name.as_deref())
        .bind(changes.best_time)
        .bind(changes.last_played_at)
        .bind(changes.last_best_time_at)
        .bind(changes.created_at)
        .bind(changes.image_reference.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Puzzle::from).ok_or_else(|| not_found(id))
    }

    async fn save(&self, puzzle: &Puzzle) -> Result<Puzzle, PuzzleError> {
        let row = sqlx::query_as::<_, PuzzleRow>(
            "UPDATE puzzles SET name = $2, img = $3, best_time = $4, created_at = $5, \
                 last_played_at = $6, last_best_time_at = $7 \
             WHERE id = $1 \
             RETURNING id, name, img, best_time, created_at, last_played_at, last_best_time_at",
        )
        .bind(puzzle.id.get())
        .bind(&puzzle.name)
        .bind(&puzzle.image_reference)
        .bind(puzzle.best_time)
        .bind(puzzle.created_at)
        .bind(puzzle.last_played_at)
        .bind(puzzle.last_best_time_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Puzzle::from).ok_or_else(|| not_found(puzzle.id))
    }

    async fn delete(&self, id: PuzzleId) -> Result<(), PuzzleError> {
        let result = sqlx::query("DELETE FROM puzzles WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
