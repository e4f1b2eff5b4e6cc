//! Database row model for the `puzzles` table.

use chrono::{DateTime, Utc};

use crate::domain::{Puzzle, PuzzleId};

/// A stored row from the `puzzles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PuzzleRow {
    /// `BIGSERIAL` primary key.
    pub id: i64,
    /// Unique puzzle name.
    pub name: String,
    /// Stored image filename.
    pub img: String,
    /// Best time in milliseconds, `0` when unset.
    pub best_time: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-played timestamp.
    pub last_played_at: DateTime<Utc>,
    /// Last best-time improvement, `NULL` until the first recorded time.
    pub last_best_time_at: Option<DateTime<Utc>>,
}

impl From<PuzzleRow> for Puzzle {
    fn from(row: PuzzleRow) -> Self {
        Self {
            id: PuzzleId::new(row.id),
            name: row.name,
            image_reference: row.img,
            best_time: row.best_time,
            created_at: row.created_at,
            last_played_at: row.last_played_at,
            last_best_time_at: row.last_best_time_at,
        }
    }
}

