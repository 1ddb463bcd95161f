// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people scanning paper documents.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The taxonomy uses three severity levels that drive presentation.

use crate::error::FlatscanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something went wrong this time; trying again may work.
    Transient,
    /// The user must do something (pick another file, fix a setting).
    ActionRequired,
    /// Cannot be fixed by retrying: the input or environment is unusable.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying the same operation can succeed.
    pub retriable: bool,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `FlatscanError` into a `HumanError`.
pub fn humanize_error(err: &FlatscanError) -> HumanError {
    match err {
        FlatscanError::ImageDecode(detail) => humanize_decode_error(detail),

        FlatscanError::RenderContext(_) => HumanError {
            message: "This image is empty.".into(),
            suggestion: "The photo has no pixels to work with. Take the picture again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        FlatscanError::PipelineUnavailable(detail) => HumanError {
            message: "The scanner couldn't start.".into(),
            suggestion: format!("Check the scanner settings file, then try again. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        FlatscanError::Detection(_) | FlatscanError::Encode(_) => HumanError {
            message: "The scan couldn't be processed.".into(),
            suggestion: "Try again. If this keeps happening, take the photo again on a plain background.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        FlatscanError::Geometry(_) => HumanError {
            message: "Those corners don't outline a page.".into(),
            suggestion: "Drag the four corner handles onto the corners of the document, then apply again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FlatscanError::Storage(_) => HumanError {
            message: "The scan couldn't be saved.".into(),
            suggestion: "Make sure there is free space on the device, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        FlatscanError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or copy the file to a different location first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        FlatscanError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check that the settings file is valid JSON, or remove it to use the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

/// Decode failures split into "wrong kind of file" and "damaged file".
fn humanize_decode_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("heic") || lower.contains("unsupported") || lower.contains("unknown format") {
        HumanError {
            message: "This type of image isn't supported.".into(),
            suggestion: "Save the photo as a JPEG or PNG first. On phones, set the camera to \"Most Compatible\".".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: format!("The file may be damaged. Try taking the photo again. (Detail: {detail})"),
            retriable: false,
            severity: Severity::Permanent,
        }
    }
}
