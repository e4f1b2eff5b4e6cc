//! Persistence layer: puzzle records.
//!
//! Provides the [`PuzzleRepository`] trait for durable storage of puzzle
//! records. The concrete implementation uses `sqlx::PgPool` for async
//! PostgreSQL access; an in-memory implementation backs tests and runs
//! with persistence disabled.

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryPuzzleRepository;
pub use postgres::PostgresPuzzleRepository;

use std::fmt;

use async_trait::async_trait;

use crate::domain::{NewPuzzle, Puzzle, PuzzleChanges, PuzzleId};
use crate::error::PuzzleError;

/// Storage of puzzle records keyed by id and unique name.
#[async_trait]
pub trait PuzzleRepository: Send + Sync + fmt::Debug {
    /// Inserts a new record and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Conflict`] if the name is taken and
    /// [`PuzzleError::Storage`] on backend failure.
    async fn insert(&self, puzzle: NewPuzzle) -> Result<Puzzle, PuzzleError>;

    /// Loads a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NotFound`] if no record has this id.
    async fn find_by_id(&self, id: PuzzleId) -> Result<Puzzle, PuzzleError>;

    /// Loads a record by its unique name.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NotFound`] if no record has this name.
    async fn find_by_name(&self, name: &str) -> Result<Puzzle, PuzzleError>;

    /// Loads every record in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Storage`] on backend failure.
    async fn find_all(&self) -> Result<Vec<Puzzle>, PuzzleError>;

    /// Returns the number of stored records without loading them.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Storage`] on backend failure.
    async fn count(&self) -> Result<u64, PuzzleError>;

    /// Writes only the fields set in `changes` and returns the result.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NotFound`] if no record has this id and
    /// [`PuzzleError::Conflict`] if a new name is taken.
    async fn update_fields(
        &self,
        id: PuzzleId,
        changes: &PuzzleChanges,
    ) -> Result<Puzzle, PuzzleError>;

    /// Re-saves every column of an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NotFound`] if the record no longer exists and
    /// [`PuzzleError::Conflict`] if its name collides with another record.
    async fn save(&self, puzzle: &Puzzle) -> Result<Puzzle, PuzzleError>;

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NotFound`] if no record has this id.
    async fn delete(&self, id: PuzzleId) -> Result<(), PuzzleError>;
}
