//! Error types for the pdfeditor-probe library.
//!
//! Every failure is fatal by design: the probe exists to answer "does the
//! backend behave?", so the first broken invariant aborts the run. Two types
//! carry that story:
//!
//! * [`ProbeError`] — what went wrong (unreachable backend, malformed body,
//!   unknown document, rejected request, violated invariant, …).
//!
//! * [`StageFailure`] — where it went wrong: the [`Stage`] that was executing
//!   when the error surfaced, wrapped around the underlying [`ProbeError`].
//!   Returned by [`crate::runner::ProbeRunner::run`] so callers get one
//!   attributable diagnostic instead of a bare cause.
//!
//! Nothing here is retried or recovered locally; retry policy, if anyone ever
//! wants one, belongs to the caller driving the runner.

use std::fmt;
use thiserror::Error;

/// All errors produced by the probe library.
#[derive(Debug, Error)]
pub enum ProbeError {
    // ── Transport errors ──────────────────────────────────────────────────
    /// The HTTP request never completed: DNS, refused connection, timeout.
    #[error("cannot reach the backend at '{url}': {reason}\nCheck that the service is running and BACKEND_URL points at it.")]
    Transport { url: String, reason: String },

    // ── Protocol errors ───────────────────────────────────────────────────
    /// The backend answered, but not with the structure the endpoint promises.
    #[error("unexpected response from {endpoint}: {detail}")]
    Response { endpoint: String, detail: String },

    /// The backend does not know the document identifier.
    #[error("the backend does not know document '{id}'")]
    NotFound { id: String },

    /// The backend understood the request and rejected it as invalid.
    #[error("the backend rejected the request: {detail}")]
    Validation { detail: String },

    // ── Workflow errors ───────────────────────────────────────────────────
    /// An invariant checked between stages did not hold.
    #[error("invariant violated: {check}")]
    Assertion { check: String },

    /// The download succeeded but carried zero bytes.
    #[error("downloaded zero bytes from '{url}'")]
    EmptyArtifact { url: String },

    /// File-type classification infrastructure failed (not a verdict of
    /// "wrong type" — that surfaces as [`ProbeError::Assertion`]).
    #[error("file-type classification failed: {detail}\nPass --classifier builtin if the `file` utility is unavailable.")]
    Classification { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// The four workflow stages, in execution order.
///
/// Stage names double as failure tags ("upload failed: …") and as the
/// bracketed prefixes of the per-stage report lines (`[UPLOAD]`,
/// `[PDF-INFO]`, `[PROCESS]`, `[DOWNLOAD]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// POST the fixture document to `/api/upload`.
    Upload,
    /// GET `/api/pdf-info/{id}` for the uploaded document.
    Info,
    /// POST overlays to `/api/process`.
    Process,
    /// GET the edited document from the returned locator.
    Download,
}

impl Stage {
    /// Lowercase stage name used in failure attribution.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Upload => "upload",
            Stage::Info => "info",
            Stage::Process => "process",
            Stage::Download => "download",
        }
    }

    /// Uppercase tag used in the bracketed per-stage report lines.
    pub fn tag(&self) -> &'static str {
        match self {
            Stage::Upload => "UPLOAD",
            Stage::Info => "PDF-INFO",
            Stage::Process => "PROCESS",
            Stage::Download => "DOWNLOAD",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A [`ProbeError`] tagged with the [`Stage`] that raised it.
///
/// The runner wraps every stage error in one of these, so a failed run always
/// reads as `<stage> stage failed: <cause>` and the original cause stays
/// reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error("{stage} stage failed: {cause}")]
pub struct StageFailure {
    /// Stage that was executing when the error surfaced.
    pub stage: Stage,
    /// The underlying error.
    #[source]
    pub cause: ProbeError,
}

impl StageFailure {
    pub fn new(stage: Stage, cause: ProbeError) -> Self {
        Self { stage, cause }
    }
}
