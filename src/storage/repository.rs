//! Generic JSON repository
//!
//! One repository per entity kind, each backed by `data/<log_name>s.json`.
//! The whole map is kept in memory and rewritten atomically on every change.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::error::{BizdeskError, BizdeskResult};
use crate::models::{Entity, EntityId};

use super::file_io::{read_json, write_json_atomic};

/// Row-level access the generic write path needs from a store
pub trait EntityStore<E: Entity>: Send + Sync {
    fn fetch(&self, key: Uuid) -> BizdeskResult<Option<E>>;

    /// Add a new row; fails if the key is taken
    fn insert(&self, entity: &E) -> BizdeskResult<()>;

    /// Overwrite an existing row
    fn replace(&self, entity: &E) -> BizdeskResult<()>;

    fn remove(&self, key: Uuid) -> BizdeskResult<()>;
}

/// On-disk layout of a repository file
#[derive(Debug, Serialize, Deserialize)]
struct EntityFile<E> {
    records: Vec<E>,
}

impl<E> Default for EntityFile<E> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

/// JSON-file repository for one entity kind
pub struct Repository<E: Entity> {
    path: PathBuf,
    data: RwLock<HashMap<Uuid, E>>,
}

impl<E: Entity> Repository<E> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load rows from disk, replacing whatever is in memory
    pub fn load(&self) -> BizdeskResult<()> {
        let file: EntityFile<E> = read_json(&self.path)?;
        let mut data = self.write()?;

        data.clear();
        for entity in file.records {
            data.insert(entity.key(), entity);
        }

        tracing::trace!(kind = %E::KIND, rows = data.len(), "repository loaded");
        Ok(())
    }

    /// Save all rows to disk
    pub fn save(&self) -> BizdeskResult<()> {
        let data = self.read()?;
        self.write_file(&data)
    }

    pub fn get(&self, key: Uuid) -> BizdeskResult<Option<E>> {
        Ok(self.read()?.get(&key).cloned())
    }

    /// Every row, trashed ones included, ordered by label
    pub fn get_all(&self) -> BizdeskResult<Vec<E>> {
        Ok(sorted(self.read()?.values().cloned().collect()))
    }

    /// Rows that are not soft-deleted
    pub fn active(&self) -> BizdeskResult<Vec<E>> {
        self.filter(|e| !e.is_trashed())
    }

    pub fn trashed(&self) -> BizdeskResult<Vec<E>> {
        self.filter(|e| e.is_trashed())
    }

    pub fn filter(&self, predicate: impl Fn(&E) -> bool) -> BizdeskResult<Vec<E>> {
        let data = self.read()?;
        Ok(sorted(data.values().filter(|e| predicate(e)).cloned().collect()))
    }

    pub fn find_by(&self, predicate: impl Fn(&E) -> bool) -> BizdeskResult<Option<E>> {
        Ok(self.read()?.values().find(|e| predicate(e)).cloned())
    }

    /// Find a row from a user-typed reference: short id, UUID prefix or
    /// exact label (case-insensitive)
    pub fn resolve(&self, reference: &str) -> BizdeskResult<E> {
        let data = self.read()?;
        let needle = reference.trim().to_lowercase();

        let mut matches: Vec<&E> = data
            .values()
            .filter(|e| e.id().matches(reference) || e.label().to_lowercase() == needle)
            .collect();

        match matches.len() {
            0 => Err(BizdeskError::not_found(E::KIND, reference)),
            1 => Ok(matches.remove(0).clone()),
            n => Err(BizdeskError::Validation(format!(
                "'{}' matches {} {} records; be more specific",
                reference,
                n,
                E::KIND
            ))),
        }
    }

    pub fn count(&self) -> BizdeskResult<usize> {
        Ok(self.read()?.len())
    }

    fn read(&self) -> BizdeskResult<RwLockReadGuard<'_, HashMap<Uuid, E>>> {
        self.data
            .read()
            .map_err(|e| BizdeskError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> BizdeskResult<RwLockWriteGuard<'_, HashMap<Uuid, E>>> {
        self.data
            .write()
            .map_err(|e| BizdeskError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    fn write_file(&self, data: &HashMap<Uuid, E>) -> BizdeskResult<()> {
        let file = EntityFile {
            records: sorted(data.values().cloned().collect()),
        };
        write_json_atomic(&self.path, &file)
    }
}

impl<E: Entity> EntityStore<E> for Repository<E> {
    fn fetch(&self, key: Uuid) -> BizdeskResult<Option<E>> {
        self.get(key)
    }

    fn insert(&self, entity: &E) -> BizdeskResult<()> {
        let mut data = self.write()?;
        let key = entity.key();

        if data.contains_key(&key) {
            return Err(BizdeskError::Duplicate {
                entity_type: E::KIND.type_name(),
                identifier: entity.id().to_string(),
            });
        }

        data.insert(key, entity.clone());
        if let Err(e) = self.write_file(&data) {
            data.remove(&key);
            return Err(e);
        }
        Ok(())
    }

    fn replace(&self, entity: &E) -> BizdeskResult<()> {
        let mut data = self.write()?;
        let key = entity.key();

        let Some(previous) = data.insert(key, entity.clone()) else {
            data.remove(&key);
            return Err(BizdeskError::not_found(E::KIND, entity.id().to_string()));
        };

        if let Err(e) = self.write_file(&data) {
            data.insert(key, previous);
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: Uuid) -> BizdeskResult<()> {
        let mut data = self.write()?;

        let Some(previous) = data.remove(&key) else {
            return Err(BizdeskError::not_found(E::KIND, key.to_string()));
        };

        if let Err(e) = self.write_file(&data) {
            data.insert(key, previous);
            return Err(e);
        }
        Ok(())
    }
}

fn sorted<E: Entity>(mut rows: Vec<E>) -> Vec<E> {
    rows.sort_by(|a, b| {
        a.label()
            .to_lowercase()
            .cmp(&b.label().to_lowercase())
            .then_with(|| a.key().cmp(&b.key()))
    });
    rows
}
