// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filesystem image source — the desktop stand-in for a file picker.

use std::path::{Path, PathBuf};

use flatscan_core::error::Result;
use flatscan_core::types::{ImageKind, ScanOrigin};
use tracing::{debug, instrument};

use crate::traits::{ImageSource, SourceImage};

/// Reads a photograph from a fixed path. The declared format is inferred
/// from the file extension.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn declared_kind(&self) -> Option<ImageKind> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageKind::from_extension)
    }
}

impl ImageSource for FileSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn acquire(&self) -> Result<Option<SourceImage>> {
        let bytes = std::fs::read(&self.path)?;
        let kind = self.declared_kind();
        debug!(bytes = bytes.len(), ?kind, "Read source image");
        Ok(Some(SourceImage {
            bytes,
            kind,
            origin: ScanOrigin::File {
                path: self.path.display().to_string(),
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatscan_core::FlatscanError;

    #[test]
    fn reads_bytes_and_infers_kind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("page.JPG");
        std::fs::write(&path, b"\xFF\xD8fake").expect("write");

        let image = FileSource::new(&path).acquire().expect("acquire").expect("image");
        assert_eq!(image.bytes, b"\xFF\xD8fake");
        assert_eq!(image.kind, Some(ImageKind::Jpeg));
        assert!(matches!(image.origin, ScanOrigin::File { .. }));
    }

    #[test]
    fn unknown_extension_has_no_declared_kind() {
        assert_eq!(FileSource::new("scan.xyz").declared_kind(), None);
        assert_eq!(FileSource::new("scan").declared_kind(), None);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = FileSource::new(dir.path().join("absent.png")).acquire();
        assert!(matches!(result, Err(FlatscanError::Io(_))));
    }
}
