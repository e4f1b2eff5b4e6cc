//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::PuzzleService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Puzzle service for all business logic.
    pub puzzle_service: Arc<PuzzleService>,
}
