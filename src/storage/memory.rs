//! In-process image store.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ImageStore, check_reference, reference_taken};
use crate::error::PuzzleError;

/// Keeps image bytes in a map. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored images.
    pub async fn len(&self) -> usize {
        self.images.read().await.len()
    }

    /// Returns `true` if no images are stored.
    pub async fn is_empty(&self) -> bool {
        self.images.read().await.is_empty()
    }

    /// Returns a copy of the bytes stored under `reference`.
    pub async fn get(&self, reference: &str) -> Option<Vec<u8>> {
        self.images.read().await.get(reference).cloned()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn save(&self, reference: &str, bytes: &[u8]) -> Result<String, PuzzleError> {
        check_reference(reference)?;
        match self.images.write().await.entry(reference.to_string()) {
            Entry::Occupied(_) => Err(reference_taken(reference)),
            Entry::Vacant(slot) => {
                slot.insert(bytes.to_vec());
                Ok(reference.to_string())
            }
        }
    }

    async fn delete(&self, reference: &str) -> Result<(), PuzzleError> {
        check_reference(reference)?;
        self.images
            .write()
            .await
            .remove(reference)
            .map(|_| ())
            .ok_or_else(|| PuzzleError::NotFound(format!("image {reference}")))
    }

    async fn exists(&self, reference: &str) -> Result<bool, PuzzleError> {
        check_reference(reference)?;
        Ok(self.images.read().await.contains_key(reference))
    }
}
