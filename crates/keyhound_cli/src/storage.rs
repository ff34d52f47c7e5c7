//! JSON-file persistence backend.
//!
//! Two files under the store directory: `keys.json` holds public-safe
//! metadata records and may be committed or shared, `vault.json` holds raw
//! key material and is written with owner-only permissions. Raw secrets
//! never appear in `keys.json`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use keyhound_core::prelude::*;

const RECORDS_FILE: &str = "keys.json";
const VAULT_FILE: &str = "vault.json";

/// Metadata store and secret vault backed by JSON files in one directory.
#[derive(Debug)]
pub struct JsonStore {
    records_path: PathBuf,
    vault_path: PathBuf,
}

impl JsonStore {
    /// Opens (or creates) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| backend(&format!("failed to create store dir: {e}")))?;

        Ok(Self {
            records_path: dir.join(RECORDS_FILE),
            vault_path: dir.join(VAULT_FILE),
        })
    }

    /// Returns a snapshot of all stored records.
    pub fn records(&self) -> Result<Vec<KeyRecord>, StoreError> {
        Ok(self.load_records()?.into_values().collect())
    }

    fn load_records(&self) -> Result<HashMap<KeyId, KeyRecord>, StoreError> {
        load_map(&self.records_path)
    }

    fn save_records(&self, records: &HashMap<KeyId, KeyRecord>) -> Result<(), StoreError> {
        save_map(&self.records_path, records, false)
    }
}

fn backend(message: &str) -> StoreError {
    StoreError::Backend(message.to_string())
}

fn load_map<V: serde::de::DeserializeOwned>(path: &Path) -> Result<HashMap<KeyId, V>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(backend(&format!("failed to read {}: {e}", path.display()))),
    };

    serde_json::from_str(&content).map_err(|e| backend(&format!("failed to parse {}: {e}", path.display())))
}

fn save_map<V: serde::Serialize>(path: &Path, map: &HashMap<KeyId, V>, restrict: bool) -> Result<(), StoreError> {
    let content =
        serde_json::to_string_pretty(map).map_err(|e| backend(&format!("failed to serialise store: {e}")))?;

    fs::write(path, content).map_err(|e| backend(&format!("failed to write {}: {e}", path.display())))?;

    if restrict {
        restrict_permissions(path)?;
    }

    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| backend(&format!("failed to restrict {}: {e}", path.display())))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

impl MetadataStore for JsonStore {
    fn upsert(&self, record: &KeyRecord) -> Result<(), StoreError> {
        let mut records = self.load_records()?;
        records.insert(record.key_id.clone(), record.clone());
        self.save_records(&records)
    }

    fn update_status(
        &self,
        key_id: &KeyId,
        status: KeyStatus,
        last_verified: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let mut records = self.load_records()?;
        let record = records
            .get_mut(key_id)
            .ok_or_else(|| StoreError::MissingRecord { key_id: key_id.clone() })?;

        record.status = status;
        record.last_verified = last_verified;
        self.save_records(&records)
    }

    fn get(&self, key_id: &KeyId) -> Result<Option<KeyRecord>, StoreError> {
        Ok(self.load_records()?.get(key_id).cloned())
    }
}

impl SecretVault for JsonStore {
    fn store(&self, key_id: &KeyId, raw_secret: &str) -> Result<(), StoreError> {
        let mut secrets: HashMap<KeyId, String> = load_map(&self.vault_path)?;
        secrets.insert(key_id.clone(), raw_secret.to_string());
        save_map(&self.vault_path, &secrets, true)
    }
}
