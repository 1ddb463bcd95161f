// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the pipeline's collaborators.
//
// The rectification core neither acquires photographs nor persists results;
// these traits are the seams where a camera, a file picker, or a storage
// backend plugs in.

use flatscan_core::error::Result;
use flatscan_core::types::{ImageKind, ScanId, ScanOrigin, ScanResult, StoredScan};

/// An encoded photograph handed to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    /// Declared format, if the source knows it.
    pub kind: Option<ImageKind>,
    pub origin: ScanOrigin,
}

/// Supplies photographs (camera capture, file picker, ...).
pub trait ImageSource {
    /// Acquire one photograph. Returns `Ok(None)` if the user cancelled.
    fn acquire(&self) -> Result<Option<SourceImage>>;
}

/// Persists pipeline output.
pub trait ScanStore {
    /// Store the encoded image of `result` and return its record.
    fn store(&self, result: &ScanResult) -> Result<StoredScan>;

    /// Stored bytes for `id`, or `None` if nothing is stored under it.
    fn load(&self, id: &ScanId) -> Result<Option<Vec<u8>>>;

    /// Stored record for `id`, or `None` if nothing is stored under it.
    fn record(&self, id: &ScanId) -> Result<Option<StoredScan>>;
}
