//! Puzzle service: validates uploads, stores images, records best times.

use std::sync::Arc;

use crate::domain::puzzle::{image_reference_for, validate_name};
use crate::domain::{Clock, NewPuzzle, Puzzle, PuzzleChanges, PuzzleId};
use crate::error::PuzzleError;
use crate::persistence::PuzzleRepository;
use crate::storage::ImageStore;

use super::image_check::square_side;

/// How many suffixed filenames `create` tries after the plain one is taken.
const MAX_REFERENCE_RETRIES: u32 = 16;

/// Orchestration layer for all puzzle operations.
///
/// Stateless coordinator: owns handles to the [`PuzzleRepository`] for
/// records, the [`ImageStore`] for image bytes and a [`Clock`] for
/// timestamps. No locking is added on top of what storage provides.
///
/// # Partial failures
///
/// Creating and deleting a puzzle each touch two stores and are not
/// atomic:
///
/// - `create` rejects a taken name before touching the image store, then
///   writes the image. If the record insert still fails (a concurrent
///   create won the name, database down) the image file stays behind.
/// - `delete` removes the image first. If that fails the record is kept;
///   if the record delete then fails the record points at a missing image.
#[derive(Debug, Clone)]
pub struct PuzzleService {
    repository: Arc<dyn PuzzleRepository>,
    images: Arc<dyn ImageStore>,
    clock: Arc<dyn Clock>,
}

impl PuzzleService {
    /// Creates a new `PuzzleService`.
    #[must_use]
    pub fn new(
        repository: Arc<dyn PuzzleRepository>,
        images: Arc<dyn ImageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            images,
            clock,
        }
    }

    /// Creates a puzzle from an uploaded image.
    ///
    /// The image must decode and be exactly square. It is stored as
    /// `{unixSeconds}_{name}{ext}` where `ext` comes from
    /// `original_filename`. When that filename already exists (a renamed
    /// puzzle created in the same second still owns it) a numeric suffix
    /// is added; an existing image is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Validation`] for a bad name or image,
    /// [`PuzzleError::Conflict`] if the name is taken, and
    /// [`PuzzleError::Storage`] on I/O or database failure.
    pub async fn create(
        &self,
        name: &str,
        image: &[u8],
        original_filename: &str,
    ) -> Result<Puzzle, PuzzleError> {
        let name = validate_name(name)?;
        let side = square_side(image)?;
        self.ensure_name_free(&name).await?;

        let now = self.clock.now();
        let reference = self
            .store_image(&name, original_filename, now, image)
            .await?;

        let puzzle = match self
            .repository
            .insert(NewPuzzle::new(name, reference.clone(), now))
            .await
        {
            Ok(puzzle) => puzzle,
            Err(err) => {
                tracing::warn!(%reference, error = %err, "puzzle insert failed; image left in store");
                return Err(err);
            }
        };

        tracing::info!(puzzle_id = %puzzle.id, name = %puzzle.name, side, "puzzle created");
        Ok(puzzle)
    }

    async fn ensure_name_free(&self, name: &str) -> Result<(), PuzzleError> {
        match self.repository.find_by_name(name).await {
            Ok(_) => Err(PuzzleError::Conflict(format!(
                "puzzle named {name:?} already exists"
            ))),
            Err(PuzzleError::NotFound(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn store_image(
        &self,
        name: &str,
        original_filename: &str,
        now: chrono::DateTime<chrono::Utc>,
        image: &[u8],
    ) -> Result<String, PuzzleError> {
        let mut attempt = 0;
        loop {
            let reference = image_reference_for(name, original_filename, now, attempt);
            match self.images.save(&reference, image).await {
                Err(PuzzleError::Conflict(_)) if attempt < MAX_REFERENCE_RETRIES => {
                    tracing::debug!(%reference, "image filename taken, retrying with suffix");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Applies a partial update.
    ///
    /// `created_at` and `image_reference` keep their stored values no
    /// matter what `changes` carries.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NotFound`] if the puzzle does not exist,
    /// [`PuzzleError::Validation`] for an invalid name or a best time that
    /// would regress, and [`PuzzleError::Conflict`] if the new name is taken.
    pub async fn update(
        &self,
        id: PuzzleId,
        changes: PuzzleChanges,
    ) -> Result<Puzzle, PuzzleError> {
        let existing = self.repository.find_by_id(id).await?;

        let mut merged = existing.clone();
        merged.apply(&changes)?;

        let mut changes = changes.pinned_to(&existing);
        if changes.name.is_some() {
            changes.name = Some(merged.name);
        }

        let updated = self.repository.update_fields(id, &changes).await?;
        tracing::info!(puzzle_id = %id, "puzzle updated");
        Ok(updated)
    }

    /// Deletes a puzzle and its stored image.
    ///
    /// The image goes first; if it cannot be removed the record is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NotFound`] if the puzzle or its image is
    /// missing and [`PuzzleError::Storage`] on I/O or database failure.
    pub async fn delete(&self, id: PuzzleId) -> Result<(), PuzzleError> {
        let puzzle = self.repository.find_by_id(id).await?;

        self.images.delete(&puzzle.image_reference).await?;
        self.repository.delete(id).await?;

        tracing::info!(puzzle_id = %id, reference = %puzzle.image_reference, "puzzle deleted");
        Ok(())
    }

    /// Looks a puzzle up by id.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NotFound`] if the puzzle does not exist.
    pub async fn get_by_id(&self, id: PuzzleId) -> Result<Puzzle, PuzzleError> {
        self.repository.find_by_id(id).await
    }

    /// Looks a puzzle up by its unique name.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NotFound`] if no puzzle has this name.
    pub async fn get_by_name(&self, name: &str) -> Result<Puzzle, PuzzleError> {
        self.repository.find_by_name(name).await
    }

    /// Returns how many puzzles are stored.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Storage`] on database failure.
    pub async fn count(&self) -> Result<u64, PuzzleError> {
        self.repository.count().await
    }

    /// Returns every puzzle in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Storage`] on database failure.
    pub async fn get_all(&self) -> Result<Vec<Puzzle>, PuzzleError> {
        self.repository.find_all().await
    }

    /// Records a completed play of `time` milliseconds.
    ///
    /// The best time is replaced only if none is recorded yet or `time` is
    /// strictly lower. `last_played_at` is bumped either way and the whole
    /// record is re-saved.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Validation`] if `time` is not positive and
    /// [`PuzzleError::NotFound`] if the puzzle does not exist.
    pub async fn update_best_time(&self, id: PuzzleId, time: i64) -> Result<Puzzle, PuzzleError> {
        if time <= 0 {
            return Err(PuzzleError::Validation(format!(
                "time must be a positive number of milliseconds (got {time})"
            )));
        }

        let mut puzzle = self.repository.find_by_id(id).await?;
        let previous = puzzle.best_time;
        let improved = puzzle.record_play(time, self.clock.now());
        let saved = self.repository.save(&puzzle).await?;

        if improved {
            tracing::info!(puzzle_id = %id, previous, best_time = time, "new best time");
        } else {
            tracing::debug!(puzzle_id = %id, best_time = previous, time, "play recorded");
        }
        Ok(saved)
    }

    /// Returns the best time in milliseconds, `0` if none is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NotFound`] if the puzzle does not exist.
    pub async fn get_best_time(&self, id: PuzzleId) -> Result<i64, PuzzleError> {
        Ok(self.repository.find_by_id(id).await?.best_time)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use image::ImageFormat;

    use super::*;
    use crate::domain::ManualClock;
    use crate::persistence::MemoryPuzzleRepository;
    use crate::service::image_check::tests::encode;
    use crate::storage::MemoryImageStore;

    struct Harness {
        service: PuzzleService,
        repo: Arc<MemoryPuzzleRepository>,
        images: Arc<MemoryImageStore>,
        clock: Arc<ManualClock>,
    }

    fn start() -> DateTime<Utc> {
        let Some(t) = Utc.timestamp_opt(1_700_000_000, 0).single() else {
            panic!("valid timestamp");
        };
        t
    }

    fn harness() -> Harness {
        let repo = Arc::new(MemoryPuzzleRepository::new());
        let images = Arc::new(MemoryImageStore::new());
        let clock = Arc::new(ManualClock::new(start()));
        let service = PuzzleService::new(
            Arc::clone(&repo) as Arc<dyn PuzzleRepository>,
            Arc::clone(&images) as Arc<dyn ImageStore>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        Harness {
            service,
            repo,
            images,
            clock,
        }
    }

    fn square_png() -> Vec<u8> {
        encode(50, 50, ImageFormat::Png)
    }

    async fn create_cat(h: &Harness) -> Puzzle {
        let Ok(puzzle) = h.service.create("cat", &square_png(), "cat.png").await else {
            panic!("create failed");
        };
        puzzle
    }

    #[tokio::test]
    async fn create_stores_image_and_record() {
        let h = harness();
        let puzzle = create_cat(&h).await;

        assert_eq!(puzzle.name, "cat");
        assert_eq!(puzzle.image_reference, "1700000000_cat.png");
        assert_eq!(puzzle.best_time, 0);
        assert_eq!(puzzle.created_at, start());
        assert_eq!(puzzle.created_at, puzzle.last_played_at);
        assert!(puzzle.last_best_time_at.is_none());
        assert!(matches!(h.images.exists("1700000000_cat.png").await, Ok(true)));
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let h = harness();
        let created = create_cat(&h).await;

        let Ok(by_id) = h.service.get_by_id(created.id).await else {
            panic!("get_by_id");
        };
        let Ok(by_name) = h.service.get_by_name("cat").await else {
            panic!("get_by_name");
        };
        assert_eq!(by_id, created);
        assert_eq!(by_name, created);
    }

    #[tokio::test]
    async fn non_square_image_persists_nothing() {
        let h = harness();
        let bytes = encode(50, 40, ImageFormat::Png);
        let result = h.service.create("wide", &bytes, "wide.png").await;

        assert!(matches!(result, Err(PuzzleError::Validation(_))));
        assert!(h.repo.is_empty().await);
        assert!(h.images.is_empty().await);
    }

    #[tokio::test]
    async fn undecodable_image_persists_nothing() {
        let h = harness();
        let result = h.service.create("junk", b"GIF89a-ish", "junk.gif").await;

        assert!(matches!(result, Err(PuzzleError::Validation(_))));
        assert!(h.repo.is_empty().await);
        assert!(h.images.is_empty().await);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let h = harness();
        let result = h.service.create("  ", &square_png(), "a.png").await;
        assert!(matches!(result, Err(PuzzleError::Validation(_))));
        assert!(h.images.is_empty().await);
    }

    #[tokio::test]
    async fn duplicate_name_in_same_second_leaves_existing_image() {
        let h = harness();
        let cat = create_cat(&h).await;
        let original = square_png();

        let other = encode(30, 30, ImageFormat::Png);
        let result = h.service.create("cat", &other, "cat.png").await;
        assert!(matches!(result, Err(PuzzleError::Conflict(_))));
        assert_eq!(h.repo.len().await, 1);
        assert_eq!(h.images.len().await, 1);
        assert_eq!(
            h.images.get(&cat.image_reference).await.as_deref(),
            Some(original.as_slice())
        );
    }

    #[tokio::test]
    async fn duplicate_name_later_touches_no_image() {
        let h = harness();
        let _ = create_cat(&h).await;
        h.clock.advance(Duration::seconds(1));

        let result = h.service.create("cat", &square_png(), "cat.png").await;
        assert!(matches!(result, Err(PuzzleError::Conflict(_))));
        assert_eq!(h.images.len().await, 1);
        assert!(matches!(h.images.exists("1700000001_cat.png").await, Ok(false)));
    }

    #[tokio::test]
    async fn recreating_a_renamed_name_in_same_second_gets_its_own_image() {
        let h = harness();
        let cat = create_cat(&h).await;
        let renamed = PuzzleChanges {
            name: Some("dog".into()),
            ..PuzzleChanges::default()
        };
        let Ok(dog) = h.service.update(cat.id, renamed).await else {
            panic!("rename failed");
        };

        let new_cat = create_cat(&h).await;
        assert_eq!(dog.image_reference, "1700000000_cat.png");
        assert_eq!(new_cat.image_reference, "1700000000_cat_1.png");
        assert_eq!(h.images.len().await, 2);

        assert!(h.service.delete(new_cat.id).await.is_ok());
        assert!(h.service.delete(dog.id).await.is_ok());
        assert!(h.images.is_empty().await);
        assert!(h.repo.is_empty().await);
    }

    #[tokio::test]
    async fn count_tracks_creates_and_deletes() {
        let h = harness();
        assert!(matches!(h.service.count().await, Ok(0)));
        let cat = create_cat(&h).await;
        let _ = h.service.create("dog", &square_png(), "dog.png").await;
        assert!(matches!(h.service.count().await, Ok(2)));

        let _ = h.service.delete(cat.id).await;
        assert!(matches!(h.service.count().await, Ok(1)));
    }

    #[tokio::test]
    async fn update_keeps_immutable_fields() {
        let h = harness();
        let created = create_cat(&h).await;
        h.clock.advance(Duration::minutes(5));

        let changes = PuzzleChanges {
            name: Some(" tabby ".into()),
            created_at: Some(h.clock.now()),
            image_reference: Some("elsewhere.png".into()),
            ..PuzzleChanges::default()
        };
        let Ok(updated) = h.service.update(created.id, changes).await else {
            panic!("update failed");
        };

        assert_eq!(updated.name, "tabby");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.image_reference, created.image_reference);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let h = harness();
        let result = h
            .service
            .update(PuzzleId::new(404), PuzzleChanges::default())
            .await;
        assert!(matches!(result, Err(PuzzleError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_image_and_record() {
        let h = harness();
        let created = create_cat(&h).await;

        assert!(h.service.delete(created.id).await.is_ok());
        assert!(h.images.is_empty().await);
        assert!(matches!(
            h.service.get_by_id(created.id).await,
            Err(PuzzleError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_with_missing_image_keeps_record() {
        let h = harness();
        let created = create_cat(&h).await;
        let _ = h.images.delete(&created.image_reference).await;

        let result = h.service.delete(created.id).await;
        assert!(matches!(result, Err(PuzzleError::NotFound(_))));
        assert!(h.service.get_by_id(created.id).await.is_ok());
    }

    #[tokio::test]
    async fn best_time_scenario() {
        let h = harness();
        let cat = create_cat(&h).await;
        assert!(matches!(h.service.get_best_time(cat.id).await, Ok(0)));

        h.clock.advance(Duration::seconds(10));
        let Ok(first) = h.service.update_best_time(cat.id, 5_000).await else {
            panic!("first time");
        };
        assert_eq!(first.best_time, 5_000);
        assert_eq!(first.last_best_time_at, Some(h.clock.now()));
        let first_best_at = first.last_best_time_at;

        h.clock.advance(Duration::seconds(10));
        let Ok(slower) = h.service.update_best_time(cat.id, 7_000).await else {
            panic!("slower time");
        };
        assert_eq!(slower.best_time, 5_000);
        assert_eq!(slower.last_best_time_at, first_best_at);
        assert_eq!(slower.last_played_at, h.clock.now());

        h.clock.advance(Duration::seconds(10));
        let Ok(equal) = h.service.update_best_time(cat.id, 5_000).await else {
            panic!("equal time");
        };
        assert_eq!(equal.last_best_time_at, first_best_at);

        h.clock.advance(Duration::seconds(10));
        let Ok(faster) = h.service.update_best_time(cat.id, 3_000).await else {
            panic!("faster time");
        };
        assert_eq!(faster.best_time, 3_000);
        assert_eq!(faster.last_best_time_at, Some(h.clock.now()));
        assert!(matches!(h.service.get_best_time(cat.id).await, Ok(3_000)));
    }

    #[tokio::test]
    async fn non_positive_time_is_rejected() {
        let h = harness();
        let cat = create_cat(&h).await;
        for bad in [0, -1] {
            let result = h.service.update_best_time(cat.id, bad).await;
            assert!(matches!(result, Err(PuzzleError::Validation(_))));
        }
        assert!(matches!(h.service.get_best_time(cat.id).await, Ok(0)));
    }

    #[tokio::test]
    async fn best_time_for_missing_puzzle() {
        let h = harness();
        let id = PuzzleId::new(7);
        assert!(matches!(
            h.service.update_best_time(id, 100).await,
            Err(PuzzleError::NotFound(_))
        ));
        assert!(matches!(
            h.service.get_best_time(id).await,
            Err(PuzzleError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn get_all_lists_in_creation_order() {
        let h = harness();
        for name in ["one", "two", "three"] {
            let _ = h.service.create(name, &square_png(), "x.png").await;
        }
        let Ok(all) = h.service.get_all().await else {
            panic!("get_all");
        };
        let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["one", "two", "three"]);
    }
}
