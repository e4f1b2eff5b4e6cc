//! Image store: durable storage for uploaded puzzle images.
//!
//! The [`ImageStore`] trait hides where image bytes live. References are
//! bare filenames inside a single flat namespace; the service derives them
//! and the store only checks that they cannot escape that namespace.

pub mod fs;
pub mod memory;

pub use fs::FsImageStore;
pub use memory::MemoryImageStore;

use std::fmt;

use async_trait::async_trait;

use crate::error::PuzzleError;

/// Byte store for puzzle images addressed by filename.
#[async_trait]
pub trait ImageStore: Send + Sync + fmt::Debug {
    /// Writes `bytes` under a new `reference` and returns the reference.
    ///
    /// Existing content is never replaced.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Validation`] for an unsafe reference,
    /// [`PuzzleError::Conflict`] if something is already stored under the
    /// reference and [`PuzzleError::Storage`] on I/O failure.
    async fn save(&self, reference: &str, bytes: &[u8]) -> Result<String, PuzzleError>;

    /// Removes the bytes stored under `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NotFound`] if nothing is stored under the
    /// reference and [`PuzzleError::Storage`] on other I/O failures.
    async fn delete(&self, reference: &str) -> Result<(), PuzzleError>;

    /// Returns `true` if bytes are stored under `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Storage`] on I/O failure.
    async fn exists(&self, reference: &str) -> Result<bool, PuzzleError>;
}

pub(crate) fn reference_taken(reference: &str) -> PuzzleError {
    PuzzleError::Conflict(format!("image {reference} already exists"))
}

/// Rejects references that are empty or could address anything outside
/// the store's flat namespace.
///
/// # Errors
///
/// Returns [`PuzzleError::Validation`] for an unsafe reference.
pub fn check_reference(reference: &str) -> Result<(), PuzzleError> {
    if reference.is_empty()
        || reference == "."
        || reference.contains(['/', '\\', '\0'])
        || reference.contains("..")
    {
        return Err(PuzzleError::Validation(format!(
            "invalid image reference: {reference:?}"
        )));
    }
    Ok(())
}
