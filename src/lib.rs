//! # pdfeditor-probe
//!
//! Black-box end-to-end probe for a remote PDF-editing HTTP service.
//!
//! ## Why this crate?
//!
//! A deployed editor backend can pass every unit test and still be broken
//! end to end: a route renamed in one place, a container shipped without
//! its PDF toolchain, a download path that serves zero bytes. The probe
//! answers "does the whole surface work right now?" by exercising it the
//! way a real client would. It generates its own minimal fixtures in
//! memory (a one-page PDF and a 50×50 red PNG), pushes them through the
//! full upload / info / process / download sequence, and verifies the
//! invariants between stages, ending with a file-type check on the bytes
//! that came back. No fixture files on disk, no browser, no state left
//! behind beyond what the backend itself stores.
//!
//! ## Workflow Overview
//!
//! ```text
//! fixtures (in memory)                backend
//!  │
//!  ├─ 1. Upload    POST /api/upload          multipart PDF → document id
//!  ├─ 2. Info      GET  /api/pdf-info/{id}   page count + page geometry
//!  ├─ 3. Process   POST /api/process         text + image overlays → downloadUrl
//!  └─ 4. Download  GET  <downloadUrl>        edited bytes, classified as PDF
//! ```
//!
//! Each stage must succeed before the next runs; the first failure aborts
//! the run as a [`StageFailure`] naming the stage.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfeditor_probe::{ProbeConfig, ProbeRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Base URL from BACKEND_URL, default http://localhost:8080
//!     let config = ProbeConfig::from_env()?;
//!     let report = ProbeRunner::new(config)?.run().await?;
//!     println!(
//!         "edited document: {} bytes ({})",
//!         report.artifact_bytes, report.artifact_label
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfprobe` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdfeditor-probe = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod observe;
pub mod runner;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use classify::{
    ArtifactClassifier, Classification, FileCommandClassifier, FileKind, MagicClassifier,
};
pub use client::{
    Artifact, EditorClient, ImageOverlay, PdfInfo, ProcessRequest, ProcessResult, TextOverlay,
    UploadResult,
};
pub use config::{ProbeConfig, ProbeConfigBuilder, BACKEND_URL_VAR, DEFAULT_BASE_URL};
pub use error::{ProbeError, Stage, StageFailure};
pub use fixtures::pdf::PdfFixtureBuilder;
pub use fixtures::png::{to_data_url, PngFixtureBuilder};
pub use observe::{NoopObserver, ObserverHandle, StageObserver};
pub use runner::{ProbeReport, ProbeRunner, ProbeStats};
