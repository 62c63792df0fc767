//! File-backed profile storage.
//!
//! One JSON record per profile under a dedicated directory. Storage keys are
//! second-resolution UTC timestamps, so lexicographic filename order matches
//! creation order without a separate index file. The store keeps no
//! in-memory cache; every listing re-scans the directory.
//!
//! Operations are synchronous and hold no locks. Multi-step sequences (the
//! write-then-delete on a replacing save) are not transactional; callers
//! serialize access (single-writer assumption).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::schema::{Profile, ProfileReference};
use crate::error::{ProfileError, Result};

/// Filename suffix identifying the serialization format.
const RECORD_SUFFIX: &str = ".profile.json";

/// Storage key format: lexicographically sortable, human-diagnosable.
const KEY_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Durable CRUD over profile records in a dedicated storage directory.
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// Create a store over the given directory.
    ///
    /// The directory is provisioned lazily on first save, or explicitly via
    /// [`ensure_storage_ready`](Self::ensure_storage_ready).
    #[must_use]
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store at the standard location.
    ///
    /// Location: `~/.local/share/therapy-profiles/profiles/`
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(default_store_dir()?))
    }

    /// The storage directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Idempotently provision the storage directory.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn ensure_storage_ready(&self) -> Result<()> {
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(ProfileError::StorageUnavailable {
                path: self.dir.display().to_string(),
                reason: "path exists but is not a directory".to_string(),
            });
        }
        fs::create_dir_all(&self.dir).map_err(|e| ProfileError::StorageUnavailable {
            path: self.dir.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!("Profile storage ready");
        Ok(())
    }

    /// Enumerate all valid records as lightweight references.
    ///
    /// Only the `name` field of each record is deserialized. Records that
    /// fail to read or parse are logged and skipped: one corrupt file must
    /// not make the whole collection unavailable. A missing or unreadable
    /// directory yields an empty listing.
    #[instrument(skip(self))]
    pub fn list(&self) -> Vec<ProfileReference> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(error = %e, "Profile directory not readable, listing empty");
                return Vec::new();
            }
        };

        let mut references = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(key) = storage_key_of(&path) else {
                continue;
            };
            match read_record_name(&path) {
                Ok(name) => references.push(ProfileReference::new(name, key)),
                Err(e) => warn!(key = %key, error = %e, "Skipping unreadable profile record"),
            }
        }

        // Keys are sortable timestamps, so this is creation order.
        references.sort_by(|a, b| a.storage_key.cmp(&b.storage_key));
        debug!(count = references.len(), "Listed profiles");
        references
    }

    /// Persist a profile under a fresh timestamp key.
    ///
    /// Replace-by-name: any existing record with the same name is removed,
    /// but only after the new record is durable, so a crash between the two
    /// steps leaves a duplicate name rather than zero records.
    #[instrument(skip(self, profile), fields(name = %profile.name))]
    pub fn save(&self, profile: &Profile) -> Result<ProfileReference> {
        self.ensure_storage_ready()?;

        let replaced: Vec<ProfileReference> = self
            .list()
            .into_iter()
            .filter(|reference| reference.name == profile.name)
            .collect();

        let key = self.fresh_storage_key(Utc::now());
        let contents = serde_json::to_string_pretty(profile)
            .map_err(|e| ProfileError::Serialize(e.to_string()))?;
        fs::write(self.record_path(&key), contents)?;

        for old in &replaced {
            if let Err(e) = self.delete(old) {
                warn!(key = %old.storage_key, error = %e, "Failed to remove replaced record");
            }
        }

        info!(name = %profile.name, key = %key, replaced = replaced.len(), "Profile saved");
        Ok(ProfileReference::new(profile.name.clone(), key))
    }

    /// Load the full record behind a reference.
    #[instrument(skip(self, reference), fields(key = %reference.storage_key))]
    pub fn load(&self, reference: &ProfileReference) -> Result<Profile> {
        let contents =
            fs::read_to_string(self.record_path(&reference.storage_key)).map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    ProfileError::NotFound {
                        key: reference.storage_key.clone(),
                    }
                } else {
                    ProfileError::Io(e)
                }
            })?;

        let profile: Profile =
            serde_json::from_str(&contents).map_err(|e| ProfileError::CorruptRecord {
                key: reference.storage_key.clone(),
                reason: e.to_string(),
            })?;

        debug!(name = %profile.name, "Profile loaded");
        Ok(profile)
    }

    /// Remove the record behind a reference.
    #[instrument(skip(self, reference), fields(key = %reference.storage_key))]
    pub fn delete(&self, reference: &ProfileReference) -> Result<()> {
        fs::remove_file(self.record_path(&reference.storage_key)).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ProfileError::NotFound {
                    key: reference.storage_key.clone(),
                }
            } else {
                ProfileError::Io(e)
            }
        })?;
        info!(name = %reference.name, key = %reference.storage_key, "Profile deleted");
        Ok(())
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}{RECORD_SUFFIX}"))
    }

    /// Next free timestamp key. Two saves within one second advance to the
    /// next free second so keys stay unique and sorted by creation.
    fn fresh_storage_key(&self, now: DateTime<Utc>) -> String {
        let mut candidate = now;
        loop {
            let key = candidate.format(KEY_FORMAT).to_string();
            if !self.record_path(&key).exists() {
                return key;
            }
            candidate += Duration::seconds(1);
        }
    }
}

/// Name-only view of a record, for listing without a full deserialize.
#[derive(Deserialize)]
struct RecordName {
    name: String,
}

fn read_record_name(path: &Path) -> Result<String> {
    let contents = fs::read_to_string(path)?;
    let record: RecordName =
        serde_json::from_str(&contents).map_err(|e| ProfileError::CorruptRecord {
            key: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(record.name)
}

fn storage_key_of(path: &Path) -> Option<String> {
    path.file_name()?
        .to_str()?
        .strip_suffix(RECORD_SUFFIX)
        .map(str::to_string)
}

/// Returns the default storage directory.
///
/// Location: `~/.local/share/therapy-profiles/profiles/`
pub fn default_store_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir().ok_or_else(|| {
        ProfileError::Other("Could not determine local data directory".to_string())
    })?;
    Ok(data_dir.join("therapy-profiles").join("profiles"))
}
