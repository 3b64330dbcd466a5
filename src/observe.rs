//! Stage-observer trait for workflow progress events.
//!
//! Inject an [`Arc<dyn StageObserver>`] via
//! [`crate::config::ProbeConfigBuilder::observer`] to receive an event as each
//! workflow stage starts, completes, or fails. Console reporting lives
//! entirely behind this seam: the library never prints, the `pdfprobe` binary
//! installs an observer that renders the `[UPLOAD]`/`[PDF-INFO]`/`[PROCESS]`/
//! `[DOWNLOAD]` lines, and embedders can forward events wherever they like
//! (a channel, a test recorder, a CI log).
//!
//! All methods have default no-op implementations so callers only override
//! what they care about. The trait is `Send + Sync`; the runner itself is
//! strictly sequential, but observers are commonly shared across an `Arc`.

use crate::error::Stage;
use std::sync::Arc;

/// Called by [`crate::runner::ProbeRunner`] around each workflow stage.
pub trait StageObserver: Send + Sync {
    /// Called once before the first stage, with the resolved base address.
    fn on_run_start(&self, base_url: &str) {
        let _ = base_url;
    }

    /// Called just before a stage's HTTP call is issued.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage completes and its invariants hold.
    ///
    /// `summary` is the payload of the stage's report line, e.g.
    /// `id=a1b2c3 filename=fixture.pdf pages=1` for the upload stage.
    fn on_stage_complete(&self, stage: Stage, summary: &str, elapsed_ms: u64) {
        let _ = (stage, summary, elapsed_ms);
    }

    /// Called when a stage fails; the run stops after this event.
    fn on_stage_failed(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once after the final stage succeeds. Not called on failure.
    fn on_run_complete(&self, total_ms: u64) {
        let _ = total_ms;
    }
}

/// A no-op implementation for callers that don't need stage events.
///
/// This is the default when no observer is configured.
pub struct NoopObserver;

impl StageObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::ProbeConfig`].
pub type ObserverHandle = Arc<dyn StageObserver>;
