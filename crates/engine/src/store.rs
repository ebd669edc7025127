//! Persisted configuration store
//!
//! Owns the raw bytes of the configuration file: reading, timestamped
//! backups, and the atomic commit. The merged document is materialized
//! fully in memory, written to a temporary file in the store's directory,
//! and renamed into place, so readers never observe a half-written file
//! and any commit failure leaves the store byte-for-byte unchanged.

use crate::error::MergeError;
use chrono::{DateTime, Local};
use hooksmith_core::ConfigurationDocument;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Bounded retry count for backup name collisions within one second
const BACKUP_NAME_ATTEMPTS: u32 = 100;

/// A timestamped copy of the store taken before a commit
///
/// Never mutated and never auto-pruned by the pipeline; retention is the
/// caller's concern.
#[derive(Debug, Clone)]
pub struct BackupRecord {
    /// Path of the backup file
    pub path: PathBuf,
    /// When the backup was taken
    pub created_at: DateTime<Local>,
}

/// Handle to the persisted configuration file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// A store handle for the given path (the file need not exist yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store file exists
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the store's raw bytes; `None` when the file does not exist
    pub fn read_raw(&self) -> Result<Option<Vec<u8>>, MergeError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(MergeError::StoreRead {
                path: self.path.clone(),
                source: err,
            }),
        }
    }

    /// Write a timestamped sibling backup of the given bytes
    ///
    /// The backup is named `<stem>.backup-<timestamp><ext>`; a numeric
    /// suffix disambiguates collisions within one second. The bytes are
    /// written exactly as given, including unparsable content (forensic
    /// copies of a corrupt store).
    pub fn write_backup(&self, raw: &[u8]) -> Result<BackupRecord, MergeError> {
        let created_at = Local::now();
        let stamp = created_at.format("%Y%m%dT%H%M%S");

        let stem = self
            .path
            .file_stem()
            .map_or_else(|| "store".to_string(), |s| s.to_string_lossy().into_owned());
        let extension = self
            .path
            .extension()
            .map_or_else(String::new, |e| format!(".{}", e.to_string_lossy()));
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut last_error = None;
        for attempt in 0..BACKUP_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{stem}.backup-{stamp}{extension}")
            } else {
                format!("{stem}.backup-{stamp}-{attempt}{extension}")
            };
            let candidate = parent.join(name);

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(mut file) => {
                    file.write_all(raw).map_err(|err| MergeError::BackupWrite {
                        path: candidate.clone(),
                        source: err,
                    })?;
                    tracing::debug!(path = %candidate.display(), "wrote backup");
                    return Ok(BackupRecord {
                        path: candidate,
                        created_at,
                    });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    last_error = Some((candidate, err));
                }
                Err(err) => {
                    return Err(MergeError::BackupWrite {
                        path: candidate,
                        source: err,
                    });
                }
            }
        }

        let (path, source) = match last_error {
            Some((path, source)) => (path, source),
            None => (
                self.path.clone(),
                std::io::Error::other("backup name space exhausted"),
            ),
        };
        Err(MergeError::BackupWrite { path, source })
    }

    /// Atomically replace the store with the serialized document
    ///
    /// The document is written to a temporary file in the store's
    /// directory and renamed over the store path. On any failure the
    /// temporary artifact is discarded and the store keeps its previous
    /// content.
    pub fn commit(&self, document: &ConfigurationDocument) -> Result<(), MergeError> {
        let rendered = document.to_json_string()?;

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|err| MergeError::CommitIoFailure {
            path: self.path.clone(),
            source: err,
        })?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|err| MergeError::CommitIoFailure {
            path: self.path.clone(),
            source: err,
        })?;
        temp.write_all(rendered.as_bytes())
            .map_err(|err| MergeError::CommitIoFailure {
                path: self.path.clone(),
                source: err,
            })?;

        temp.persist(&self.path)
            .map_err(|err| MergeError::CommitIoFailure {
                path: self.path.clone(),
                source: err.error,
            })?;

        tracing::debug!(path = %self.path.display(), "committed document");
        Ok(())
    }
}
