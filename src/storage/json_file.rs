//! JSON file state store

use crate::core::error::StorageError;
use crate::storage::StateStore;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Persists a value as pretty-printed JSON in a single file
///
/// Saves write a uniquely named sibling temporary file and rename it over the
/// target, so a reader never observes a half-written file and concurrent saves
/// never share a temporary file.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl<T> StateStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load(&self) -> Result<Option<T>, StorageError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(Some(serde_json::from_slice(&content)?))
    }

    async fn save(&self, value: &T) -> Result<(), StorageError> {
        let content = serde_json::to_vec_pretty(value)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut temp = self.path.clone().into_os_string();
        temp.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        let temp = PathBuf::from(temp);

        tokio::fs::write(&temp, &content)
            .await
            .map_err(|e| self.io_error(e))?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(self.io_error(e));
        }

        tracing::debug!(path = %self.path.display(), bytes = content.len(), "saved state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::Settings;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let dir = tempdir().expect("temp dir");
        let store: JsonFileStore<Settings> = JsonFileStore::new(dir.path().join("settings.json"));
        assert!(store.load().await.expect("load").is_none());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_roundtrips() {
        let dir = tempdir().expect("temp dir");
        let store = JsonFileStore::new(dir.path().join("nested/settings.json"));
        let settings = Settings {
            page_size: 50,
            ..Default::default()
        };

        store.save(&settings).await.expect("save");
        assert_eq!(store.load().await.expect("load"), Some(settings));

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("settings.json")]);
    }

    #[tokio::test]
    async fn test_concurrent_saves_do_not_collide() {
        let dir = tempdir().expect("temp dir");
        let store: JsonFileStore<Settings> = JsonFileStore::new(dir.path().join("settings.json"));

        let saves: Vec<_> = (1..=16)
            .map(|page_size| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .save(&Settings {
                            page_size,
                            ..Default::default()
                        })
                        .await
                })
            })
            .collect();
        for save in saves {
            save.await.expect("task").expect("save");
        }

        let saved = store.load().await.expect("load").expect("saved settings");
        assert!((1..=16).contains(&saved.page_size));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"{ not json").expect("write");

        let store: JsonFileStore<Settings> = JsonFileStore::new(path);
        assert!(matches!(
            store.load().await,
            Err(StorageError::Serialization(_))
        ));
    }
}
