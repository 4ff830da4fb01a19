//! Persistence of committed state
//!
//! State (deck lists, settings) is saved whole on every commit through a
//! [`StateStore`]. Two implementations ship: an in-memory store for tests and
//! development, and a JSON file store.

pub mod in_memory;
pub mod json_file;
pub mod settings;

pub use in_memory::InMemoryStateStore;
pub use json_file::JsonFileStore;
pub use settings::SettingsService;

use crate::core::error::StorageError;
use async_trait::async_trait;

/// Whole-value persistence for one piece of state
#[async_trait]
pub trait StateStore<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Load the last saved value, `None` if nothing was ever saved
    async fn load(&self) -> Result<Option<T>, StorageError>;

    /// Replace the saved value
    async fn save(&self, value: &T) -> Result<(), StorageError>;
}
