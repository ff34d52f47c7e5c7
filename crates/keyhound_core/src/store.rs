//! Persistence traits and the in-memory reference store.
//!
//! Persistence is a seam, not a feature: the engine hands finished records
//! to a [`MetadataStore`] and raw secrets to a [`SecretVault`] and knows
//! nothing about what sits behind either trait. The split is deliberate -
//! the metadata store holds only public-safe fields and may be widely
//! readable, while the vault holds raw key material under its own access
//! control. Nothing in this crate ever writes a raw secret to the metadata
//! store.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::candidate::KeyId;
use crate::lifecycle::{KeyRecord, KeyStatus};

/// Errors surfaced by a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("store backend failure: {0}")]
    Backend(String),

    /// An update referenced a key that was never inserted.
    #[error("no record for key id: {key_id}")]
    MissingRecord {
        /// The key id with no stored record.
        key_id: KeyId,
    },
}

/// Durable home for public-safe key metadata.
///
/// Implementations must treat `upsert` as idempotent per `key_id` and must
/// never delete: `update_status` is the sole mutation path after insert, so
/// the record set only grows and statuses only move through the lifecycle.
pub trait MetadataStore: Send + Sync {
    /// Inserts the record, or refreshes it if the key id is already present.
    fn upsert(&self, record: &KeyRecord) -> Result<(), StoreError>;

    /// Updates the status fields of an existing record.
    fn update_status(
        &self,
        key_id: &KeyId,
        status: KeyStatus,
        last_verified: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    /// Fetches the record for a key id, if one exists.
    fn get(&self, key_id: &KeyId) -> Result<Option<KeyRecord>, StoreError>;
}

/// Restricted home for raw key material.
pub trait SecretVault: Send + Sync {
    /// Stores the raw secret under its key id. Idempotent per key id.
    fn store(&self, key_id: &KeyId, raw_secret: &str) -> Result<(), StoreError>;
}

/// In-memory store used by the runner's dry mode and by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<KeyId, KeyRecord>>,
    secrets: Mutex<HashMap<KeyId, Box<str>>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored metadata records.
    pub fn record_count(&self) -> Result<usize, StoreError> {
        Ok(lock(&self.records)?.len())
    }

    /// Returns the number of vaulted secrets.
    pub fn secret_count(&self) -> Result<usize, StoreError> {
        Ok(lock(&self.secrets)?.len())
    }

    /// Returns a snapshot of all stored records.
    pub fn records(&self) -> Result<Vec<KeyRecord>, StoreError> {
        Ok(lock(&self.records)?.values().cloned().collect())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
}

impl MetadataStore for MemoryStore {
    fn upsert(&self, record: &KeyRecord) -> Result<(), StoreError> {
        let mut records = lock(&self.records)?;
        records.insert(record.key_id.clone(), record.clone());
        Ok(())
    }

    fn update_status(
        &self,
        key_id: &KeyId,
        status: KeyStatus,
        last_verified: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let mut records = lock(&self.records)?;
        let record = records.get_mut(key_id).ok_or_else(|| StoreError::MissingRecord {
            key_id: key_id.clone(),
        })?;

        record.status = status;
        record.last_verified = last_verified;
        Ok(())
    }

    fn get(&self, key_id: &KeyId) -> Result<Option<KeyRecord>, StoreError> {
        Ok(lock(&self.records)?.get(key_id).cloned())
    }
}

impl SecretVault for MemoryStore {
    fn store(&self, key_id: &KeyId, raw_secret: &str) -> Result<(), StoreError> {
        let mut secrets = lock(&self.secrets)?;
        secrets.insert(key_id.clone(), raw_secret.into());
        Ok(())
    }
}
