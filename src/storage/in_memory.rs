//! In-memory state store for testing and development

use crate::core::error::StorageError;
use crate::storage::StateStore;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// In-memory state store
///
/// Clones share the same slot, so a test can keep a handle and inspect what the
/// code under test saved.
#[derive(Debug)]
pub struct InMemoryStateStore<T> {
    value: Arc<RwLock<Option<T>>>,
}

impl<T> InMemoryStateStore<T> {
    pub fn new() -> Self {
        Self {
            value: Arc::new(RwLock::new(None)),
        }
    }

    /// Store pre-seeded with a value
    pub fn with_value(value: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(Some(value))),
        }
    }
}

impl<T> Clone for InMemoryStateStore<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

impl<T> Default for InMemoryStateStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> StateStore<T> for InMemoryStateStore<T>
where
    T: Clone + Send + Sync,
{
    async fn load(&self) -> Result<Option<T>, StorageError> {
        let value = self
            .value
            .read()
            .map_err(|_| StorageError::LockPoisoned("state store"))?;
        Ok(value.clone())
    }

    async fn save(&self, value: &T) -> Result<(), StorageError> {
        let mut slot = self
            .value
            .write()
            .map_err(|_| StorageError::LockPoisoned("state store"))?;
        *slot = Some(value.clone());
        Ok(())
    }
}
