//! Puzzle aggregate and the rules that govern its mutation.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::PuzzleId;
use crate::error::PuzzleError;

/// Maximum length of a puzzle name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// A stored puzzle: image reference plus play statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Puzzle {
    /// Storage-assigned identifier (immutable after creation).
    pub id: PuzzleId,

    /// Unique human-readable name.
    pub name: String,

    /// Filename of the stored image (immutable after creation).
    pub image_reference: String,

    /// Best completion time in milliseconds; `0` means no recorded time.
    pub best_time: i64,

    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last play or recorded time.
    pub last_played_at: DateTime<Utc>,

    /// Timestamp of the last best-time improvement, if any.
    pub last_best_time_at: Option<DateTime<Utc>>,
}

impl Puzzle {
    /// Returns `true` if a completion time has ever been recorded.
    #[must_use]
    pub const fn has_best_time(&self) -> bool {
        self.best_time > 0
    }

    /// Returns `true` if `time` would replace the current best.
    ///
    /// The comparison is strict: an equal time is not an improvement.
    #[must_use]
    pub const fn is_improvement(&self, time: i64) -> bool {
        !self.has_best_time() || time < self.best_time
    }

    /// Records a finished play.
    ///
    /// Always bumps `last_played_at`; replaces `best_time` and bumps
    /// `last_best_time_at` only when `time` is an improvement. Returns
    /// whether the best time changed.
    pub fn record_play(&mut self, time: i64, now: DateTime<Utc>) -> bool {
        let improved = self.is_improvement(time);
        if improved {
            self.best_time = time;
            self.last_best_time_at = Some(now);
        }
        self.last_played_at = now;
        improved
    }

    /// Applies caller-supplied changes, ignoring immutable fields.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Validation`] if a new name is invalid or a
    /// new best time is negative or would regress the current best.
    pub fn apply(&mut self, changes: &PuzzleChanges) -> Result<(), PuzzleError> {
        if let Some(name) = &changes.name {
            self.name = validate_name(name)?;
        }
        if let Some(best_time) = changes.best_time {
            if best_time < 0 {
                return Err(PuzzleError::Validation(format!(
                    "best time must not be negative (got {best_time})"
                )));
            }
            if self.has_best_time() && (best_time == 0 || best_time > self.best_time) {
                return Err(PuzzleError::Validation(format!(
                    "best time cannot regress from {} to {best_time}",
                    self.best_time
                )));
            }
            self.best_time = best_time;
        }
        if let Some(at) = changes.last_played_at {
            self.last_played_at = at;
        }
        if let Some(at) = changes.last_best_time_at {
            self.last_best_time_at = Some(at);
        }
        Ok(())
    }
}

/// A puzzle that has not been inserted yet (no id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPuzzle {
    /// Validated unique name.
    pub name: String,
    /// Filename returned by the image store.
    pub image_reference: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Initial last-played timestamp (equal to `created_at`).
    pub last_played_at: DateTime<Utc>,
}

impl NewPuzzle {
    /// Builds a fresh record with no recorded best time.
    #[must_use]
    pub fn new(name: String, image_reference: String, now: DateTime<Utc>) -> Self {
        Self {
            name,
            image_reference,
            created_at: now,
            last_played_at: now,
        }
    }

    /// Attaches the storage-assigned id.
    #[must_use]
    pub fn with_id(self, id: PuzzleId) -> Puzzle {
        Puzzle {
            id,
            name: self.name,
            image_reference: self.image_reference,
            best_time: 0,
            created_at: self.created_at,
            last_played_at: self.last_played_at,
            last_best_time_at: None,
        }
    }
}

/// Partial update of a puzzle. `None` leaves a field untouched.
///
/// `created_at` and `image_reference` are accepted so that a client can
/// send back a whole record, but they are never applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PuzzleChanges {
    /// New unique name.
    pub name: Option<String>,
    /// New best time in milliseconds.
    pub best_time: Option<i64>,
    /// New last-played timestamp.
    pub last_played_at: Option<DateTime<Utc>>,
    /// New last-best-time timestamp.
    pub last_best_time_at: Option<DateTime<Utc>>,
    /// Ignored; creation time is immutable.
    pub created_at: Option<DateTime<Utc>>,
    /// Ignored; the stored image is immutable.
    pub image_reference: Option<String>,
}

impl PuzzleChanges {
    /// Returns the changes with the immutable fields pinned to `existing`.
    #[must_use]
    pub fn pinned_to(mut self, existing: &Puzzle) -> Self {
        self.created_at = Some(existing.created_at);
        self.image_reference = Some(existing.image_reference.clone());
        self
    }
}

/// Trims and validates a puzzle name.
///
/// Names become part of the stored image filename, so path separators,
/// `..`, a trailing `.` and control characters are rejected.
///
/// # Errors
///
/// Returns [`PuzzleError::Validation`] describing the first rule broken.
pub fn validate_name(raw: &str) -> Result<String, PuzzleError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(PuzzleError::Validation("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(PuzzleError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if name.contains(['/', '\\']) || name.contains("..") || name.chars().any(char::is_control) {
        return Err(PuzzleError::Validation(format!(
            "name contains forbidden characters: {name:?}"
        )));
    }
    if name.ends_with('.') {
        return Err(PuzzleError::Validation(format!(
            "name must not end with '.': {name:?}"
        )));
    }
    Ok(name.to_string())
}

/// Builds the stored image filename: `{unixSeconds}_{name}{ext}`.
///
/// `ext` is the original filename's extension including the leading dot,
/// or empty when the original has none. A non-zero `attempt` inserts
/// `_{attempt}` before the extension, for when the plain filename is
/// already taken.
#[must_use]
pub fn image_reference_for(
    name: &str,
    original_filename: &str,
    now: DateTime<Utc>,
    attempt: u32,
) -> String {
    let ext = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let ts = now.timestamp();
    if attempt == 0 {
        format!("{ts}_{name}{ext}")
    } else {
        format!("{ts}_{name}_{attempt}{ext}")
    }
}
