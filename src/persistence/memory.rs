//! In-memory puzzle repository.
//!
//! [`MemoryPuzzleRepository`] keeps records in a `BTreeMap` behind a
//! [`tokio::sync::RwLock`], so iteration order is id order, which is also
//! insertion order. The unique-name rule is checked on every write, the
//! way the database's unique constraint would.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PuzzleRepository;
use crate::domain::{NewPuzzle, Puzzle, PuzzleChanges, PuzzleId};
use crate::error::PuzzleError;

#[derive(Debug, Default)]
struct Tables {
    last_id: i64,
    puzzles: BTreeMap<PuzzleId, Puzzle>,
}

impl Tables {
    fn ensure_name_free(&self, name: &str, owner: Option<PuzzleId>) -> Result<(), PuzzleError> {
        let taken = self
            .puzzles
            .values()
            .any(|p| p.name == name && Some(p.id) != owner);
        if taken {
            return Err(PuzzleError::Conflict(format!(
                "puzzle named {name:?} already exists"
            )));
        }
        Ok(())
    }
}

/// Process-local puzzle storage.
#[derive(Debug, Default)]
pub struct MemoryPuzzleRepository {
    tables: RwLock<Tables>,
}

impl MemoryPuzzleRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.tables.read().await.puzzles.len()
    }

    /// Returns `true` if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.puzzles.is_empty()
    }
}

fn not_found(id: PuzzleId) -> PuzzleError {
    PuzzleError::NotFound(format!("puzzle {id}"))
}

#[async_trait]
impl PuzzleRepository for MemoryPuzzleRepository {
    async fn insert(&self, puzzle: NewPuzzle) -> Result<Puzzle, PuzzleError> {
        let mut tables = self.tables.write().await;
        tables.ensure_name_free(&puzzle.name, None)?;

        tables.last_id = tables.last_id.saturating_add(1);
        let stored = puzzle.with_id(PuzzleId::new(tables.last_id));
        tables.puzzles.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: PuzzleId) -> Result<Puzzle, PuzzleError> {
        let tables = self.tables.read().await;
        tables.puzzles.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Puzzle, PuzzleError> {
        let tables = self.tables.read().await;
        tables
            .puzzles
            .values()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| PuzzleError::NotFound(format!("puzzle named {name:?}")))
    }

    async fn find_all(&self) -> Result<Vec<Puzzle>, PuzzleError> {
        let tables = self.tables.read().await;
        Ok(tables.puzzles.values().cloned().collect())
    }

    async fn count(&self) -> Result<u64, PuzzleError> {
        let tables = self.tables.read().await;
        Ok(tables.puzzles.len() as u64)
    }

    async fn update_fields(
        &self,
        id: PuzzleId,
        changes: &PuzzleChanges,
    ) -> Result<Puzzle, PuzzleError> {
        let mut tables = self.tables.write().await;
        if let Some(name) = &changes.name {
            tables.ensure_name_free(name, Some(id))?;
        }
        let stored = tables.puzzles.get_mut(&id).ok_or_else(|| not_found(id))?;

        if let Some(name) = &changes.name {
            stored.name.clone_from(name);
        }
        if let Some(best_time) = changes.best_time {
            stored.best_time = best_time;
        }
        if let Some(at) = changes.last_played_at {
            stored.last_played_at = at;
        }
        if let Some(at) = changes.last_best_time_at {
            stored.last_best_time_at = Some(at);
        }
        if let Some(at) = changes.created_at {
            stored.created_at = at;
        }
        if let Some(reference) = &changes.image_reference {
            stored.image_reference.clone_from(reference);
        }
        Ok(stored.clone())
    }

    async fn save(&self, puzzle: &Puzzle) -> Result<Puzzle, PuzzleError> {
        let mut tables = self.tables.write().await;
        tables.ensure_name_free(&puzzle.name, Some(puzzle.id))?;
        let stored = tables
            .puzzles
            .get_mut(&puzzle.id)
            .ok_or_else(|| not_found(puzzle.id))?;
        *stored = puzzle.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: PuzzleId) -> Result<(), PuzzleError> {
        let mut tables = self.tables.write().await;
        tables
            .puzzles
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}
