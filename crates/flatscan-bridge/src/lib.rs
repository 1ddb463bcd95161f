// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// flatscan-bridge — Collaborators around the rectification core.
//
// Defines where photographs come from (`ImageSource`) and where results go
// (`ScanStore`), with filesystem implementations of both for desktop and CI
// use. Camera capture and mobile storage plug in behind the same traits.

pub mod file_source;
pub mod integrity;
pub mod store;
pub mod traits;

pub use file_source::FileSource;
pub use store::DirectoryStore;
pub use traits::{ImageSource, ScanStore, SourceImage};
