// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory-backed scan storage — one image file plus a JSON record per scan.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use flatscan_core::error::{FlatscanError, Result};
use flatscan_core::types::{ScanId, ScanResult, StoredScan};
use tracing::{debug, info, instrument, warn};

use crate::integrity::{hash_bytes, matches_hash};
use crate::traits::ScanStore;

/// Stores each scan as `<id>.jpg` (rectified) or `<id>.orig` (fallback
/// pass-through) next to a `<id>.json` [`StoredScan`] record.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|err| {
            FlatscanError::Storage(format!("cannot create {}: {}", root.display(), err))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a stored image file.
    pub fn image_path(&self, record: &StoredScan) -> PathBuf {
        self.root.join(&record.file_name)
    }

    fn record_path(&self, id: &ScanId) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        std::fs::write(path, bytes).map_err(|err| {
            FlatscanError::Storage(format!("cannot write {}: {}", path.display(), err))
        })
    }
}

impl ScanStore for DirectoryStore {
    #[instrument(skip_all, fields(root = %self.root.display(), bytes = result.encoded_image.len()))]
    fn store(&self, result: &ScanResult) -> Result<StoredScan> {
        let id = ScanId::new();
        let extension = if result.is_fallback() { "orig" } else { "jpg" };
        let record = StoredScan {
            id,
            file_name: format!("{}.{}", id, extension),
            sha256: hash_bytes(&result.encoded_image),
            byte_len: result.encoded_image.len() as u64,
            corners: result.corners,
            confidence: result.confidence,
            stored_at: Utc::now(),
        };

        self.write(&self.image_path(&record), &result.encoded_image)?;
        self.write(&self.record_path(&id), &serde_json::to_vec_pretty(&record)?)?;

        info!(%id, file = %record.file_name, "Scan stored");
        Ok(record)
    }

    fn load(&self, id: &ScanId) -> Result<Option<Vec<u8>>> {
        let Some(record) = self.record(id)? else {
            return Ok(None);
        };
        let path = self.image_path(&record);
        let bytes = std::fs::read(&path).map_err(|err| {
            FlatscanError::Storage(format!("cannot read {}: {}", path.display(), err))
        })?;

        if !matches_hash(&bytes, &record.sha256) {
            warn!(%id, "Stored scan does not match its recorded hash");
            return Err(FlatscanError::Storage(format!(
                "{} has been modified since it was stored",
                record.file_name
            )));
        }
        debug!(%id, bytes = bytes.len(), "Scan loaded");
        Ok(Some(bytes))
    }

    fn record(&self, id: &ScanId) -> Result<Option<StoredScan>> {
        let path = self.record_path(id);
        let text = match std::fs::read(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(FlatscanError::Storage(format!(
                    "cannot read {}: {}",
                    path.display(),
                    err
                )));
            }
        };
        Ok(Some(serde_json::from_slice(&text)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatscan_core::types::{FALLBACK_CONFIDENCE, Point, Quad};

    fn detected() -> ScanResult {
        let quad = Quad::from_ordered([
            Point::new(10.0, 10.0),
            Point::new(90.0, 12.0),
            Point::new(88.0, 140.0),
            Point::new(8.0, 138.0),
        ]);
        ScanResult::detected(vec![0xFF, 0xD8, 1, 2, 3, 0xFF, 0xD9], quad, 0.71)
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DirectoryStore::open(dir.path().join("scans")).expect("open");

        let result = detected();
        let record = store.store(&result).expect("store");
        assert_eq!(record.byte_len, 7);
        assert_eq!(record.sha256, hash_bytes(&result.encoded_image));
        assert!(record.file_name.ends_with(".jpg"));
        assert!(store.image_path(&record).exists());

        let bytes = store.load(&record.id).expect("load").expect("stored bytes");
        assert_eq!(bytes, result.encoded_image);

        let reread = store.record(&record.id).expect("record").expect("stored record");
        assert_eq!(reread, record);
    }

    #[test]
    fn fallback_keeps_original_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DirectoryStore::open(dir.path()).expect("open");

        let record = store.store(&ScanResult::fallback(b"\x89PNG original")).expect("store");
        assert!(record.file_name.ends_with(".orig"));
        assert!(record.corners.is_none());
        assert_eq!(record.confidence, FALLBACK_CONFIDENCE);
        assert_eq!(
            store.load(&record.id).expect("load").expect("bytes"),
            b"\x89PNG original"
        );
    }

    #[test]
    fn unknown_id_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DirectoryStore::open(dir.path()).expect("open");
        let id = ScanId::new();
        assert!(store.load(&id).expect("load").is_none());
        assert!(store.record(&id).expect("record").is_none());
    }

    #[test]
    fn tampered_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DirectoryStore::open(dir.path()).expect("open");
        let record = store.store(&detected()).expect("store");

        std::fs::write(store.image_path(&record), b"replaced").expect("tamper");
        assert!(matches!(store.load(&record.id), Err(FlatscanError::Storage(_))));
    }
}
