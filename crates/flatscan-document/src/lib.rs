// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// flatscan-document — Document rectification for photographed pages.
//
// Turns a phone photograph of a page into a flat, binarized scan: finds the
// page outline, warps it upright, and cleans it up. Falls back to passing the
// original through whenever no page can be found.

pub mod image;
pub mod scan;

// Re-export the primary structs so callers can use `flatscan_document::ScanEngine` etc.
pub use crate::image::processor::ImageProcessor;
pub use scan::engine::{EngineCell, ScanEngine, shared_engine};
pub use scan::manual::{CornerHandles, ManualOutcome, ManualSession};
pub use scan::pipeline::scan_document;
