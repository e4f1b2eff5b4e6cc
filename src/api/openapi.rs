//! OpenAPI document for the REST API.

use utoipa::OpenApi;

use super::dto::{
    BestTimeRequest, BestTimeResponse, CreatePuzzleForm, PuzzleResponse, UpdatePuzzleRequest,
};
use super::handlers::{puzzle, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "puzzle-tracker",
        description = "Stores jigsaw puzzle images and best completion times."
    ),
    paths(
        puzzle::create_puzzle,
        puzzle::list_puzzles,
        puzzle::get_puzzle,
        puzzle::get_puzzle_by_name,
        puzzle::update_puzzle,
        puzzle::delete_puzzle,
        puzzle::update_best_time,
        puzzle::get_best_time,
        system::health_handler,
    ),
    components(schemas(
        CreatePuzzleForm,
        PuzzleResponse,
        UpdatePuzzleRequest,
        BestTimeRequest,
        BestTimeResponse,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
    )),
    tags(
        (name = "Puzzles", description = "Puzzle records and images"),
        (name = "Best Times", description = "Play results"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

/// Returns the OpenAPI document.
#[must_use]
pub fn api_doc() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
