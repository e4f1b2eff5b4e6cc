//! Puzzle DTOs for create, update, get, and best-time operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Puzzle, PuzzleChanges};

/// Multipart form accepted by `POST /api/puzzles`.
#[derive(Debug, ToSchema)]
pub struct CreatePuzzleForm {
    /// Unique puzzle name.
    pub name: String,
    /// Square PNG or JPEG image.
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// A puzzle as returned by every endpoint that yields a record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleResponse {
    /// Puzzle identifier.
    pub id: i64,
    /// Unique puzzle name.
    pub name: String,
    /// Stored image filename, served under `/uploads/`.
    pub img: String,
    /// Best completion time in milliseconds, `0` when none is recorded.
    pub best_time: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last play timestamp.
    #[serde(rename = "lastPlayed")]
    pub last_played_at: DateTime<Utc>,
    /// Last best-time improvement, absent until the first recorded time.
    #[serde(rename = "lastBestTime")]
    pub last_best_time_at: Option<DateTime<Utc>>,
}

impl From<Puzzle> for PuzzleResponse {
    fn from(p: Puzzle) -> Self {
        Self {
            id: p.id.get(),
            name: p.name,
            img: p.image_reference,
            best_time: p.best_time,
            created_at: p.created_at,
            last_played_at: p.last_played_at,
            last_best_time_at: p.last_best_time_at,
        }
    }
}

/// Request body for `PUT /api/puzzles/{id}`.
///
/// Every field is optional. `createdAt` and `img` are accepted so a
/// client can send back a full record, but they are never applied.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePuzzleRequest {
    /// New unique name.
    pub name: Option<String>,
    /// New best time in milliseconds; may not regress.
    pub best_time: Option<i64>,
    /// New last-played timestamp.
    #[serde(rename = "lastPlayed")]
    pub last_played_at: Option<DateTime<Utc>>,
    /// New last-best-time timestamp.
    #[serde(rename = "lastBestTime")]
    pub last_best_time_at: Option<DateTime<Utc>>,
    /// Ignored.
    pub created_at: Option<DateTime<Utc>>,
    /// Ignored.
    pub img: Option<String>,
}

impl From<UpdatePuzzleRequest> for PuzzleChanges {
    fn from(req: UpdatePuzzleRequest) -> Self {
        Self {
            name: req.name,
            best_time: req.best_time,
            last_played_at: req.last_played_at,
            last_best_time_at: req.last_best_time_at,
            created_at: req.created_at,
            image_reference: req.img,
        }
    }
}

/// Request body for `PUT /api/puzzles/{id}/best-time`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BestTimeRequest {
    /// Completion time in milliseconds.
    pub time: i64,
}

/// Response body for `GET /api/puzzles/{id}/best-time`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BestTimeResponse {
    /// Best completion time in milliseconds, `0` when none is recorded.
    pub best_time: i64,
}
