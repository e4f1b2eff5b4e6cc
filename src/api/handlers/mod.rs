//! REST endpoint handlers organized by resource.

pub mod puzzle;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().merge(puzzle::routes())
}
