//! Service layer: business logic orchestration.
//!
//! [`PuzzleService`] validates uploads, coordinates the image store and the
//! puzzle repository, and owns the best-time policy.

pub mod image_check;
pub mod puzzle_service;

pub use puzzle_service::PuzzleService;
