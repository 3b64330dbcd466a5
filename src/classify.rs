//! File-type classification for the downloaded artifact.
//!
//! The final workflow invariant is deliberately loose: the edited document
//! the backend returns is not required to be byte-identical to anything we
//! can predict, only to *be a PDF* according to an independent inspector.
//! That inspector sits behind [`ArtifactClassifier`] so the probe runs the
//! same way everywhere:
//!
//! * [`MagicClassifier`] — pure in-process magic-byte sniffing, the default.
//!   Works in containers and CI images with no extra tooling.
//! * [`FileCommandClassifier`] — shells out to the local `file(1)` utility,
//!   for operators who want the verdict of a real external inspector.
//!
//! Both return a [`Classification`]: the coarse [`FileKind`] the invariant is
//! checked against plus a human-readable label for the `[DOWNLOAD]` report
//! line.

use crate::error::ProbeError;
use std::io::Write;
use std::process::Command;

/// Coarse file kind derived from a label or magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Png,
    Jpeg,
    Unknown,
}

impl FileKind {
    pub fn is_pdf(&self) -> bool {
        matches!(self, FileKind::Pdf)
    }

    /// Map an inspector's textual description to a kind.
    ///
    /// `file(1)` describes PDFs as "PDF document, version 1.4" and images as
    /// "PNG image data, 50 x 50, …"; the uppercase format token is the stable
    /// part of those descriptions.
    pub fn from_label(label: &str) -> Self {
        if label.contains("PDF") {
            FileKind::Pdf
        } else if label.contains("PNG") {
            FileKind::Png
        } else if label.contains("JPEG") {
            FileKind::Jpeg
        } else {
            FileKind::Unknown
        }
    }
}

/// A classified byte buffer: coarse kind plus the inspector's own words.
#[derive(Debug, Clone)]
pub struct Classification {
    pub kind: FileKind,
    /// Human-readable description, e.g. `PDF document, version 1.4`.
    pub label: String,
}

/// Capability interface: turn raw bytes into a [`Classification`].
///
/// Errors represent classification *infrastructure* failing (temp file I/O,
/// missing utility); "these bytes are not a PDF" is a successful
/// classification with a non-PDF kind, judged by the caller.
pub trait ArtifactClassifier: Send + Sync {
    fn classify(&self, bytes: &[u8]) -> Result<Classification, ProbeError>;
}

// ── In-process sniffer ───────────────────────────────────────────────────

/// Magic-byte sniffer covering the formats this workflow can encounter.
pub struct MagicClassifier;

impl ArtifactClassifier for MagicClassifier {
    fn classify(&self, bytes: &[u8]) -> Result<Classification, ProbeError> {
        if bytes.starts_with(b"%PDF") {
            return Ok(Classification {
                kind: FileKind::Pdf,
                label: pdf_label(bytes),
            });
        }
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Ok(Classification {
                kind: FileKind::Png,
                label: "PNG image data".to_string(),
            });
        }
        if bytes.starts_with(b"\xFF\xD8\xFF") {
            return Ok(Classification {
                kind: FileKind::Jpeg,
                label: "JPEG image data".to_string(),
            });
        }
        // file(1) falls back to the bare word "data" for unrecognised bytes.
        Ok(Classification {
            kind: FileKind::Unknown,
            label: "data".to_string(),
        })
    }
}

/// Render a `file(1)`-style PDF label, picking up the header version when the
/// buffer starts with the usual `%PDF-1.x` form.
fn pdf_label(bytes: &[u8]) -> String {
    let version: Option<String> = bytes
        .strip_prefix(b"%PDF-")
        .map(|rest| {
            rest.iter()
                .take_while(|b| b.is_ascii_digit() || **b == b'.')
                .map(|b| *b as char)
                .collect::<String>()
        })
        .filter(|v| !v.is_empty());

    match version {
        Some(v) => format!("PDF document, version {v}"),
        None => "PDF document".to_string(),
    }
}

// ── External `file(1)` adapter ───────────────────────────────────────────

/// Classifier that defers to the local `file` utility.
///
/// Bytes are written to a [`tempfile::NamedTempFile`] (deleted on drop, even
/// on panic) and `file -b <path>` is run on it; `-b` suppresses the filename
/// prefix so stdout is the bare description.
pub struct FileCommandClassifier {
    program: String,
}

impl FileCommandClassifier {
    pub fn new() -> Self {
        Self {
            program: "file".to_string(),
        }
    }

    /// Use a different executable name or path (e.g. `gfile` on some BSDs).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FileCommandClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactClassifier for FileCommandClassifier {
    fn classify(&self, bytes: &[u8]) -> Result<Classification, ProbeError> {
        let mut tmp = tempfile::NamedTempFile::new().map_err(|e| ProbeError::Classification {
            detail: format!("temp file: {e}"),
        })?;
        tmp.write_all(bytes)
            .and_then(|_| tmp.flush())
            .map_err(|e| ProbeError::Classification {
                detail: format!("temp file write: {e}"),
            })?;

        let output = Command::new(&self.program)
            .arg("-b")
            .arg(tmp.path())
            .output()
            .map_err(|e| ProbeError::Classification {
                detail: format!("could not run '{}': {e}", self.program),
            })?;

        if !output.status.success() {
            return Err(ProbeError::Classification {
                detail: format!(
                    "'{}' exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let label = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Classification {
            kind: FileKind::from_label(&label),
            label,
        })
    }
}
