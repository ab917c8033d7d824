mod storage;

use std::collections::HashSet;
use thiserror::Error;

pub use storage::{FileStore, KeyValueStore, StorageError};

#[cfg(test)]
pub(crate) use storage::tests::MemoryStore;

/// Entry holding the JSON-encoded favorites list.
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("corrupt favorites entry: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("favorite name must not be empty")]
    EmptyName,
}

/// Catalog names the user marked, persisted after every change.
pub struct FavoritesStore {
    names: HashSet<String>,
    backend: Box<dyn KeyValueStore>,
}

impl FavoritesStore {
    pub fn empty(backend: Box<dyn KeyValueStore>) -> Self {
        Self {
            names: HashSet::new(),
            backend,
        }
    }

    pub fn load(backend: Box<dyn KeyValueStore>) -> Result<Self, FavoritesError> {
        let names = match backend.get(FAVORITES_KEY)? {
            Some(json) => serde_json::from_str::<Vec<String>>(&json)?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };
        Ok(Self { names, backend })
    }

    pub fn save(&self) -> Result<(), FavoritesError> {
        let json = serde_json::to_string(&self.names())?;
        self.backend.put(FAVORITES_KEY, &json)?;
        Ok(())
    }

    /// Flips membership of `name` and persists. Returns the new membership.
    /// A failed save leaves membership as it was.
    pub fn toggle(&mut self, name: &str) -> Result<bool, FavoritesError> {
        if name.is_empty() {
            return Err(FavoritesError::EmptyName);
        }

        let favorite = if self.names.remove(name) {
            false
        } else {
            self.names.insert(name.to_string());
            true
        };

        if let Err(e) = self.save() {
            if favorite {
                self.names.remove(name);
            } else {
                self.names.insert(name.to_string());
            }
            return Err(e);
        }

        Ok(favorite)
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Sorted for stable output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().cloned().collect();
        names.sort();
        names
    }
}
