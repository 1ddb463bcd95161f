// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::PathBuf;

/// Default location for stored scans when `--out-dir` is not given.
///
/// `$XDG_DATA_HOME/flatscan/scans`, falling back to
/// `$HOME/.local/share/flatscan/scans`. The directory is created by the
/// store on first use.
pub fn default_scan_dir() -> PathBuf {
    dirs_fallback().join("flatscan").join("scans")
}

fn dirs_fallback() -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    std::env::temp_dir()
}
