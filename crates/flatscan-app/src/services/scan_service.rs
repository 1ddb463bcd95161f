// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — wires an image source, the shared processing
// engine, and the scan store together for the command-line front end.
//
// Pipeline runs are CPU-bound, so they execute on tokio's blocking pool; the
// engine itself is loaded once and shared through `EngineCell`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use flatscan_bridge::{DirectoryStore, FileSource, ImageSource, ScanStore, SourceImage};
use flatscan_core::ScanConfig;
use flatscan_core::error::{FlatscanError, Result};
use flatscan_core::types::{Quad, ScanResult, StoredScan};
use flatscan_document::{EngineCell, ManualSession};
use tracing::{info, instrument};

/// Shared application services.
///
/// All fields are cheaply cloneable (Arc-wrapped) so that the struct can be
/// passed into async blocks without lifetime issues.
#[derive(Clone)]
pub struct ScanService {
    engine: Arc<EngineCell>,
    store: Arc<DirectoryStore>,
}

impl ScanService {
    /// Initialise the service. The engine is not loaded until the first scan.
    pub fn init(config: ScanConfig, out_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = DirectoryStore::open(out_dir)?;
        info!(path = %store.root().display(), "scan service initialised");
        Ok(Self {
            engine: Arc::new(EngineCell::new(config)),
            store: Arc::new(store),
        })
    }

    pub fn store(&self) -> &DirectoryStore {
        &self.store
    }

    /// Run the automatic pipeline on the photograph at `path` and store the
    /// result (rectified scan or original pass-through).
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn scan_file(&self, path: &Path) -> Result<StoredScan> {
        let source = acquire(path)?;
        let engine = self.engine.get().await?;

        let result = tokio::task::spawn_blocking(move || engine.scan(&source.bytes, source.kind))
            .await
            .map_err(|e| FlatscanError::PipelineUnavailable(format!("scan task failed: {e}")))??;

        self.persist(&result)
    }

    /// Rectify the photograph at `path` using user-supplied corners
    /// (original-resolution pixels), or the default inset handles when none
    /// are given, and store the result.
    #[instrument(skip_all, fields(path = %path.display(), has_corners = corners.is_some()))]
    pub async fn correct_file(&self, path: &Path, corners: Option<Quad>) -> Result<StoredScan> {
        let source = acquire(path)?;
        let engine = self.engine.get().await?;

        let result = tokio::task::spawn_blocking(move || {
            let session = ManualSession::open(&engine, &source.bytes, source.kind, corners.as_ref())?;
            session.render(&engine)
        })
        .await
        .map_err(|e| FlatscanError::PipelineUnavailable(format!("correction task failed: {e}")))??;

        self.persist(&result)
    }

    fn persist(&self, result: &ScanResult) -> Result<StoredScan> {
        let record = self.store.store(result)?;
        info!(
            id = %record.id,
            confidence = record.confidence,
            rectified = record.corners.is_some(),
            "scan saved"
        );
        Ok(record)
    }
}

fn acquire(path: &Path) -> Result<SourceImage> {
    FileSource::new(path)
        .acquire()?
        .ok_or_else(|| FlatscanError::Storage(format!("no image read from {}", path.display())))
}
