// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — preparation, document detection, corner ordering,
// perspective rectification, enhancement, scoring, and manual correction.

pub mod corners;
pub mod detect;
pub mod edges;
pub mod engine;
pub mod enhance;
pub mod filter;
pub mod geometry;
pub mod manual;
pub mod pipeline;
pub mod prepare;
pub mod rectify;
pub mod score;

pub use corners::order_corners;
pub use detect::{Detection, DocumentDetector};
pub use engine::{EngineCell, ScanEngine, shared_engine};
pub use enhance::ScanEnhancer;
pub use manual::{CornerHandles, ManualOutcome, ManualSession};
pub use pipeline::scan_document;
pub use prepare::{PreparedImage, prepare};
