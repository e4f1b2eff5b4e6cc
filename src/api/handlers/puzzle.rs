//! Puzzle CRUD and best-time handlers.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    BestTimeRequest, BestTimeResponse, CreatePuzzleForm, PuzzleResponse, UpdatePuzzleRequest,
};
use crate::app_state::AppState;
use crate::domain::PuzzleId;
use crate::error::{ErrorResponse, PuzzleError};

/// `POST /puzzles` — Upload a square image as a new puzzle.
///
/// # Errors
///
/// Returns [`PuzzleError`] on a missing or invalid image, bad name, or
/// duplicate name.
#[utoipa::path(
    post,
    path = "/api/puzzles",
    tag = "Puzzles",
    summary = "Create a puzzle",
    description = "Accepts a multipart form with a `name` field and an `image` file. The image must be a square PNG or JPEG.",
    request_body(content = CreatePuzzleForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Puzzle created", body = PuzzleResponse),
        (status = 400, description = "Invalid name or image", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
    )
)]
pub async fn create_puzzle(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, PuzzleError> {
    let mut name: Option<String> = None;
    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PuzzleError::Validation(format!("malformed upload: {e}")))?
    {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| PuzzleError::Validation(format!("failed to read name: {e}")))?;
                name = Some(text);
            }
            Some("image") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| PuzzleError::Validation(format!("failed to read image: {e}")))?;
                image = Some((bytes.to_vec(), filename));
            }
            _ => {}
        }
    }

    let Some((bytes, filename)) = image.filter(|(bytes, _)| !bytes.is_empty()) else {
        return Err(PuzzleError::Validation("no image provided".to_string()));
    };
    let name = name.unwrap_or_default();

    let puzzle = state
        .puzzle_service
        .create(&name, &bytes, &filename)
        .await?;

    Ok((StatusCode::CREATED, Json(PuzzleResponse::from(puzzle))))
}

/// `GET /puzzles` — List every puzzle.
///
/// # Errors
///
/// Returns [`PuzzleError::Storage`] on database failure.
#[utoipa::path(
    get,
    path = "/api/puzzles",
    tag = "Puzzles",
    summary = "List puzzles",
    description = "Returns all puzzles in creation order.",
    responses(
        (status = 200, description = "All puzzles", body = Vec<PuzzleResponse>),
    )
)]
pub async fn list_puzzles(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PuzzleError> {
    let puzzles = state.puzzle_service.get_all().await?;
    let body: Vec<PuzzleResponse> = puzzles.into_iter().map(PuzzleResponse::from).collect();
    Ok(Json(body))
}

/// `GET /puzzles/{id}` — Get a puzzle by id.
///
/// # Errors
///
/// Returns [`PuzzleError::NotFound`] if the puzzle does not exist.
#[utoipa::path(
    get,
    path = "/api/puzzles/{id}",
    tag = "Puzzles",
    summary = "Get a puzzle",
    params(
        ("id" = i64, Path, description = "Puzzle id"),
    ),
    responses(
        (status = 200, description = "Puzzle", body = PuzzleResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Puzzle not found", body = ErrorResponse),
    )
)]
pub async fn get_puzzle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PuzzleError> {
    let id: PuzzleId = id.parse()?;
    let puzzle = state.puzzle_service.get_by_id(id).await?;
    Ok(Json(PuzzleResponse::from(puzzle)))
}

/// `GET /puzzles/name/{name}` — Get a puzzle by its unique name.
///
/// # Errors
///
/// Returns [`PuzzleError::NotFound`] if no puzzle has this name.
#[utoipa::path(
    get,
    path = "/api/puzzles/name/{name}",
    tag = "Puzzles",
    summary = "Get a puzzle by name",
    params(
        ("name" = String, Path, description = "Puzzle name"),
    ),
    responses(
        (status = 200, description = "Puzzle", body = PuzzleResponse),
        (status = 404, description = "Puzzle not found", body = ErrorResponse),
    )
)]
pub async fn get_puzzle_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, PuzzleError> {
    let puzzle = state.puzzle_service.get_by_name(&name).await?;
    Ok(Json(PuzzleResponse::from(puzzle)))
}

/// `PUT /puzzles/{id}` — Update mutable puzzle fields.
///
/// # Errors
///
/// Returns [`PuzzleError`] if the puzzle does not exist, the new name is
/// invalid or taken, or the best time would regress.
#[utoipa::path(
    put,
    path = "/api/puzzles/{id}",
    tag = "Puzzles",
    summary = "Update a puzzle",
    description = "Applies the supplied fields. `createdAt` and `img` are immutable and silently kept.",
    params(
        ("id" = i64, Path, description = "Puzzle id"),
    ),
    request_body = UpdatePuzzleRequest,
    responses(
        (status = 200, description = "Updated puzzle", body = PuzzleResponse),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Puzzle not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
    )
)]
pub async fn update_puzzle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePuzzleRequest>,
) -> Result<impl IntoResponse, PuzzleError> {
    let id: PuzzleId = id.parse()?;
    let puzzle = state.puzzle_service.update(id, req.into()).await?;
    Ok(Json(PuzzleResponse::from(puzzle)))
}

/// `DELETE /puzzles/{id}` — Delete a puzzle and its image.
///
/// # Errors
///
/// Returns [`PuzzleError::NotFound`] if the puzzle or its image is missing.
#[utoipa::path(
    delete,
    path = "/api/puzzles/{id}",
    tag = "Puzzles",
    summary = "Delete a puzzle",
    description = "Removes the stored image, then the record. If the image cannot be removed the record is kept.",
    params(
        ("id" = i64, Path, description = "Puzzle id"),
    ),
    responses(
        (status = 204, description = "Puzzle deleted"),
        (status = 404, description = "Puzzle or image not found", body = ErrorResponse),
    )
)]
pub async fn delete_puzzle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PuzzleError> {
    let id: PuzzleId = id.parse()?;
    state.puzzle_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /puzzles/{id}/best-time` — Record a completed play.
///
/// # Errors
///
/// Returns [`PuzzleError`] if the time is not positive or the puzzle does
/// not exist.
#[utoipa::path(
    put,
    path = "/api/puzzles/{id}/best-time",
    tag = "Best Times",
    summary = "Record a play",
    description = "Replaces the best time only if the new time is strictly lower or none is recorded. Always updates `lastPlayed`.",
    params(
        ("id" = i64, Path, description = "Puzzle id"),
    ),
    request_body = BestTimeRequest,
    responses(
        (status = 200, description = "Updated puzzle", body = PuzzleResponse),
        (status = 400, description = "Invalid time", body = ErrorResponse),
        (status = 404, description = "Puzzle not found", body = ErrorResponse),
    )
)]
pub async fn update_best_time(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<BestTimeRequest>,
) -> Result<impl IntoResponse, PuzzleError> {
    let id: PuzzleId = id.parse()?;
    let puzzle = state.puzzle_service.update_best_time(id, req.time).await?;
    Ok(Json(PuzzleResponse::from(puzzle)))
}

/// `GET /puzzles/{id}/best-time` — Current best time.
///
/// # Errors
///
/// Returns [`PuzzleError::NotFound`] if the puzzle does not exist.
#[utoipa::path(
    get,
    path = "/api/puzzles/{id}/best-time",
    tag = "Best Times",
    summary = "Get the best time",
    params(
        ("id" = i64, Path, description = "Puzzle id"),
    ),
    responses(
        (status = 200, description = "Best time in milliseconds", body = BestTimeResponse),
        (status = 404, description = "Puzzle not found", body = ErrorResponse),
    )
)]
pub async fn get_best_time(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PuzzleError> {
    let id: PuzzleId = id.parse()?;
    let best_time = state.puzzle_service.get_best_time(id).await?;
    Ok(Json(BestTimeResponse { best_time }))
}

/// Puzzle routes. The collection is reachable with and without a
/// trailing slash.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/puzzles", post(create_puzzle).get(list_puzzles))
        .route("/puzzles/", post(create_puzzle).get(list_puzzles))
        .route("/puzzles/name/{name}", get(get_puzzle_by_name))
        .route(
            "/puzzles/{id}",
            get(get_puzzle).put(update_puzzle).delete(delete_puzzle),
        )
        .route(
            "/puzzles/{id}/best-time",
            put(update_best_time).get(get_best_time),
        )
}
