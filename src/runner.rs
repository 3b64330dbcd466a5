//! The four-stage probe workflow.
//!
//! ## Why a fixed script?
//!
//! The probe is a black-box check, not a test framework. It always runs the
//! same four calls in the same order (upload, info, process, download),
//! verifies the cross-stage invariants between them, and stops at the first
//! violation. Progress is reported twice over: structured [`tracing`] events
//! for logs, and [`StageObserver`](crate::observe::StageObserver) callbacks
//! for interactive UIs. A run either produces a complete [`ProbeReport`] or
//! a [`StageFailure`] naming the stage that broke.
//!
//! The overlays applied at the process stage are deliberately constant (see
//! the `OVERLAY_*` values below): a probe that varies its input produces
//! diagnostics nobody can compare across runs.

use crate::classify::{ArtifactClassifier, Classification, MagicClassifier};
use crate::client::{
    Artifact, EditorClient, ImageOverlay, PdfInfo, ProcessRequest, ProcessResult, TextOverlay,
    UploadResult,
};
use crate::config::ProbeConfig;
use crate::error::{ProbeError, Stage, StageFailure};
use crate::fixtures::pdf::PdfFixtureBuilder;
use crate::fixtures::png::{self, PngFixtureBuilder};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

// ── Fixed overlay script ────────────────────────────────────────────────

/// Text stamped onto page 1 at the process stage.
pub const OVERLAY_TEXT: &str = "Hello from PDF Editor!";
pub const OVERLAY_TEXT_X: f64 = 10.0;
pub const OVERLAY_TEXT_Y: f64 = 10.0;
pub const OVERLAY_FONT_SIZE: f64 = 16.0;
pub const OVERLAY_COLOR: &str = "#000000";

pub const OVERLAY_IMAGE_X: f64 = 50.0;
pub const OVERLAY_IMAGE_Y: f64 = 50.0;
pub const OVERLAY_IMAGE_WIDTH: f64 = 20.0;
pub const OVERLAY_IMAGE_HEIGHT: f64 = 10.0;

/// Both overlays target page 1; the fixture only has one page.
pub const OVERLAY_PAGE: u32 = 1;

// ── Report types ────────────────────────────────────────────────────────

/// Everything a successful run learned about the backend.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Base URL the run was pointed at.
    pub base_url: String,
    pub upload: UploadResult,
    pub info: PdfInfo,
    pub process: ProcessResult,
    /// Raw edited document. Skipped in JSON output; `artifact_bytes`
    /// reports the size instead.
    #[serde(skip)]
    pub artifact: Vec<u8>,
    pub artifact_bytes: usize,
    /// Human-readable verdict of the artifact classifier, e.g.
    /// `PDF document, version 1.4`.
    pub artifact_label: String,
    /// Content-Type the backend declared on the download, when any.
    pub content_type: Option<String>,
    pub stats: ProbeStats,
}

/// Wall-clock timings, one per stage plus the whole run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProbeStats {
    pub upload_ms: u64,
    pub info_ms: u64,
    pub process_ms: u64,
    pub download_ms: u64,
    pub total_ms: u64,
}

// ── Runner ──────────────────────────────────────────────────────────────

/// Drives the upload / info / process / download sequence against one
/// backend.
pub struct ProbeRunner {
    config: ProbeConfig,
    client: EditorClient,
    classifier: Arc<dyn ArtifactClassifier>,
}

impl ProbeRunner {
    /// Build a runner from the configuration. Fails only on config-level
    /// problems (bad base URL, unbuildable HTTP client); anything that
    /// happens while talking to the backend comes out of [`run`](Self::run)
    /// as a [`StageFailure`] instead.
    pub fn new(config: ProbeConfig) -> Result<Self, ProbeError> {
        let client = EditorClient::new(&config)?;
        let classifier = config
            .classifier
            .clone()
            .unwrap_or_else(|| Arc::new(MagicClassifier));
        Ok(Self {
            config,
            client,
            classifier,
        })
    }

    /// Execute the full workflow.
    ///
    /// Fail-fast: the first stage error aborts the run and is returned
    /// tagged with its stage. Nothing is retried.
    pub async fn run(&self) -> Result<ProbeReport, StageFailure> {
        let total_start = Instant::now();
        info!("Starting probe against {}", self.client.base_url());
        if let Some(ref obs) = self.config.observer {
            obs.on_run_start(self.client.base_url());
        }

        // ── Stage 1: upload the fixture document ─────────────────────────
        let fixture = PdfFixtureBuilder::default().build();
        debug!("Built {} byte PDF fixture", fixture.len());

        let (upload, upload_ms) = self
            .run_stage(
                Stage::Upload,
                async {
                    let upload = self.client.upload(&fixture).await?;
                    ensure(
                        upload.pages >= 1,
                        format!("upload pages >= 1 (got {})", upload.pages),
                    )?;
                    Ok(upload)
                },
                |u| format!("id={} filename={} pages={}", u.id, u.filename, u.pages),
            )
            .await?;

        // ── Stage 2: read back page geometry ─────────────────────────────
        let (info, info_ms) = self
            .run_stage(
                Stage::Info,
                async {
                    let info = self.client.pdf_info(&upload.id).await?;
                    ensure(
                        info.pages == upload.pages,
                        format!(
                            "info pages == upload pages (got {} vs {})",
                            info.pages, upload.pages
                        ),
                    )?;
                    ensure(
                        info.page_widths.len() == info.pages as usize,
                        format!(
                            "pageWidths length == pages (got {} vs {})",
                            info.page_widths.len(),
                            info.pages
                        ),
                    )?;
                    ensure(
                        info.page_heights.len() == info.pages as usize,
                        format!(
                            "pageHeights length == pages (got {} vs {})",
                            info.page_heights.len(),
                            info.pages
                        ),
                    )?;
                    Ok(info)
                },
                |i| {
                    format!(
                        "pages={} widths={:?} heights={:?}",
                        i.pages, i.page_widths, i.page_heights
                    )
                },
            )
            .await?;

        // ── Stage 3: apply the overlay script ────────────────────────────
        let (process, process_ms) = self
            .run_stage(
                Stage::Process,
                async {
                    let request = self.build_request(&upload.id)?;
                    // The client guarantees a non-empty downloadUrl.
                    self.client.process(&request).await
                },
                |p| format!("downloadUrl={} id={}", p.download_url, p.id),
            )
            .await?;

        // ── Stage 4: fetch and classify the edited document ──────────────
        let ((artifact, classification), download_ms) = self
            .run_stage(
                Stage::Download,
                async {
                    let artifact = self.client.download(&process.download_url).await?;
                    let classification = self.classifier.classify(&artifact.bytes)?;
                    ensure(
                        classification.kind.is_pdf(),
                        format!(
                            "artifact classifies as PDF (got {:?})",
                            classification.label
                        ),
                    )?;
                    Ok((artifact, classification))
                },
                |(a, c): &(Artifact, Classification)| {
                    format!("{} bytes, {}", a.bytes.len(), c.label)
                },
            )
            .await?;

        let total_ms = total_start.elapsed().as_millis() as u64;
        info!("Probe complete: 4/4 stages passed in {}ms", total_ms);
        if let Some(ref obs) = self.config.observer {
            obs.on_run_complete(total_ms);
        }

        let Artifact {
            bytes,
            content_type,
        } = artifact;

        Ok(ProbeReport {
            base_url: self.client.base_url().to_string(),
            upload,
            info,
            process,
            artifact_bytes: bytes.len(),
            artifact: bytes,
            artifact_label: classification.label,
            content_type,
            stats: ProbeStats {
                upload_ms,
                info_ms,
                process_ms,
                download_ms,
                total_ms,
            },
        })
    }

    /// Run one stage: observer start/complete/failed callbacks, wall-clock
    /// timing, and failure attribution all live here so the four stages in
    /// [`run`](Self::run) stay declarative.
    async fn run_stage<T>(
        &self,
        stage: Stage,
        work: impl Future<Output = Result<T, ProbeError>>,
        summarize: impl FnOnce(&T) -> String,
    ) -> Result<(T, u64), StageFailure> {
        if let Some(ref obs) = self.config.observer {
            obs.on_stage_start(stage);
        }
        let start = Instant::now();

        match work.await {
            Ok(value) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                let summary = summarize(&value);
                info!("[{}] {} ({}ms)", stage.tag(), summary, elapsed_ms);
                if let Some(ref obs) = self.config.observer {
                    obs.on_stage_complete(stage, &summary, elapsed_ms);
                }
                Ok((value, elapsed_ms))
            }
            Err(cause) => {
                if let Some(ref obs) = self.config.observer {
                    obs.on_stage_failed(stage, &cause.to_string());
                }
                Err(StageFailure::new(stage, cause))
            }
        }
    }

    /// Assemble the constant overlay script for a stored document.
    fn build_request(&self, id: &str) -> Result<ProcessRequest, ProbeError> {
        let png = PngFixtureBuilder::default().build()?;
        let text = TextOverlay::new(
            OVERLAY_TEXT,
            OVERLAY_TEXT_X,
            OVERLAY_TEXT_Y,
            OVERLAY_PAGE,
            OVERLAY_FONT_SIZE,
            OVERLAY_COLOR,
        )?;
        let image = ImageOverlay::new(
            png::to_data_url(&png),
            OVERLAY_IMAGE_X,
            OVERLAY_IMAGE_Y,
            OVERLAY_IMAGE_WIDTH,
            OVERLAY_IMAGE_HEIGHT,
            OVERLAY_PAGE,
        )?;

        Ok(ProcessRequest {
            id: id.to_string(),
            texts: vec![text],
            images: vec![image],
        })
    }
}

fn ensure(condition: bool, check: impl Into<String>) -> Result<(), ProbeError> {
    if condition {
        Ok(())
    } else {
        Err(ProbeError::Assertion {
            check: check.into(),
        })
    }
}
