//! HTTP access to the four editor endpoints.
//!
//! ## Wire Contract
//!
//! | Call | Endpoint | Body |
//! |------|----------|------|
//! | [`EditorClient::upload`] | `POST /api/upload` | multipart, file field `pdf` |
//! | [`EditorClient::pdf_info`] | `GET /api/pdf-info/{id}` | none |
//! | [`EditorClient::process`] | `POST /api/process` | JSON [`ProcessRequest`] |
//! | [`EditorClient::download`] | `GET` resolved locator | none |
//!
//! All JSON travels in camelCase; the serde renames below are the single
//! place that mapping lives.
//!
//! ## Error Mapping
//!
//! Failures that never reached the service (connect, timeout, DNS) become
//! [`ProbeError::Transport`]. A 404 on an id-scoped endpoint becomes
//! [`ProbeError::NotFound`]. A rejected `/api/process` request becomes
//! [`ProbeError::Validation`] carrying the service's own `{"error": …}`
//! detail when the body has one. A download that returns zero bytes becomes
//! [`ProbeError::EmptyArtifact`]. Everything else unexpected, including a
//! success body missing its id or download locator, is
//! [`ProbeError::Response`].

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const UPLOAD_PATH: &str = "/api/upload";
const INFO_PATH: &str = "/api/pdf-info";
const PROCESS_PATH: &str = "/api/process";

/// `#RRGGBB`, case-insensitive hex digits.
static HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

// ── Wire types ──────────────────────────────────────────────────────────

/// Response of `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// Server-assigned document handle; every later call is keyed on it.
    pub id: String,
    pub filename: String,
    pub pages: u32,
}

/// Response of `GET /api/pdf-info/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfInfo {
    pub pages: u32,
    /// Per-page width in PDF points, index 0 = page 1.
    pub page_widths: Vec<f64>,
    /// Per-page height in PDF points, index 0 = page 1.
    pub page_heights: Vec<f64>,
}

/// Request body of `POST /api/process`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub id: String,
    pub texts: Vec<TextOverlay>,
    pub images: Vec<ImageOverlay>,
}

/// One text stamp. Coordinates are PDF points from the page origin; pages
/// are 1-based.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlay {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub page: u32,
    pub font_size: f64,
    pub color: String,
}

impl TextOverlay {
    /// Build a text overlay, rejecting malformed input before it goes on
    /// the wire. The colour must be `#RRGGBB`; pages are 1-based.
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        page: u32,
        font_size: f64,
        color: impl Into<String>,
    ) -> Result<Self, ProbeError> {
        let color = color.into();
        if !HEX_COLOR.is_match(&color) {
            return Err(ProbeError::Validation {
                detail: format!("colour must be #RRGGBB, got {color:?}"),
            });
        }
        if page == 0 {
            return Err(ProbeError::Validation {
                detail: "overlay pages are 1-based, got page 0".to_string(),
            });
        }
        if !(font_size > 0.0) {
            return Err(ProbeError::Validation {
                detail: format!("fontSize must be positive, got {font_size}"),
            });
        }
        Ok(Self {
            text: text.into(),
            x,
            y,
            page,
            font_size,
            color,
        })
    }
}

/// One image stamp. `image_data` is a `data:image/…;base64,` URL; `width`
/// and `height` give the placed size in PDF points.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOverlay {
    pub image_data: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub page: u32,
}

impl ImageOverlay {
    pub fn new(
        image_data: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        page: u32,
    ) -> Result<Self, ProbeError> {
        let image_data = image_data.into();
        if !image_data.starts_with("data:image/") {
            return Err(ProbeError::Validation {
                detail: "imageData must be a data:image/… URL".to_string(),
            });
        }
        if page == 0 {
            return Err(ProbeError::Validation {
                detail: "overlay pages are 1-based, got page 0".to_string(),
            });
        }
        Ok(Self {
            image_data,
            x,
            y,
            width,
            height,
            page,
        })
    }
}

/// Response of `POST /api/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    /// Locator for the edited document; may be a bare path. Feed it to
    /// [`EditorClient::download`] unchanged.
    pub download_url: String,
    pub id: String,
}

/// The downloaded artifact plus the Content-Type the service declared,
/// when it declared one.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────────

/// Thin async client over the editor's HTTP surface.
///
/// One instance per probe run; cloning shares the underlying connection
/// pool.
#[derive(Debug, Clone)]
pub struct EditorClient {
    http: reqwest::Client,
    base_url: String,
    upload_filename: String,
}

impl EditorClient {
    /// Build a client from the probe configuration.
    pub fn new(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| ProbeError::Transport {
            url: config.base_url.clone(),
            reason: format!("client construction failed: {e}"),
        })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            upload_filename: config.upload_filename.clone(),
        })
    }

    /// `POST /api/upload`: store a PDF, get back its handle.
    pub async fn upload(&self, pdf: &[u8]) -> Result<UploadResult, ProbeError> {
        let url = format!("{}{}", self.base_url, UPLOAD_PATH);
        debug!("POST {} ({} byte fixture)", url, pdf.len());

        let part = Part::bytes(pdf.to_vec())
            .file_name(self.upload_filename.clone())
            .mime_str("application/pdf")
            .map_err(|e| ProbeError::Internal(format!("multipart part: {e}")))?;
        let form = Form::new().part("pdf", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProbeError::Response {
                endpoint: UPLOAD_PATH.to_string(),
                detail: error_detail(status, &body),
            });
        }

        let result: UploadResult = parse_json(response, UPLOAD_PATH).await?;
        if result.id.is_empty() {
            return Err(ProbeError::Response {
                endpoint: UPLOAD_PATH.to_string(),
                detail: "upload result carries an empty document id".to_string(),
            });
        }
        Ok(result)
    }

    /// `GET /api/pdf-info/{id}`: page count and per-page dimensions.
    pub async fn pdf_info(&self, id: &str) -> Result<PdfInfo, ProbeError> {
        let url = format!("{}{}/{}", self.base_url, INFO_PATH, id);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProbeError::NotFound { id: id.to_string() });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProbeError::Response {
                endpoint: INFO_PATH.to_string(),
                detail: error_detail(status, &body),
            });
        }

        parse_json(response, INFO_PATH).await
    }

    /// `POST /api/process`: apply the overlays, get back a download
    /// locator for the edited document.
    pub async fn process(&self, request: &ProcessRequest) -> Result<ProcessResult, ProbeError> {
        let url = format!("{}{}", self.base_url, PROCESS_PATH);
        debug!(
            "POST {} (id={}, {} text / {} image overlays)",
            url,
            request.id,
            request.texts.len(),
            request.images.len()
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProbeError::NotFound {
                id: request.id.clone(),
            });
        }
        if !status.is_success() {
            // The service vets overlay coordinates and page numbers here,
            // so a rejection is a validation verdict, not a wire fault.
            let body = response.text().await.unwrap_or_default();
            return Err(ProbeError::Validation {
                detail: error_detail(status, &body),
            });
        }

        let result: ProcessResult = parse_json(response, PROCESS_PATH).await?;
        if result.download_url.is_empty() {
            return Err(ProbeError::Response {
                endpoint: PROCESS_PATH.to_string(),
                detail: "process result carries an empty downloadUrl".to_string(),
            });
        }
        Ok(result)
    }

    /// `GET` the edited document. `locator` is whatever `/api/process`
    /// returned: absolute URLs pass through, bare paths resolve against
    /// the configured base.
    pub async fn download(&self, locator: &str) -> Result<Artifact, ProbeError> {
        let url = self.resolve_url(locator);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProbeError::Response {
                endpoint: locator.to_string(),
                detail: error_detail(status, &body),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(&url, e))?
            .to_vec();
        if bytes.is_empty() {
            return Err(ProbeError::EmptyArtifact { url });
        }

        Ok(Artifact {
            bytes,
            content_type,
        })
    }

    /// Resolve a download locator against the configured base URL.
    pub fn resolve_url(&self, locator: &str) -> String {
        if is_absolute_url(locator) {
            locator.to_string()
        } else if locator.starts_with('/') {
            format!("{}{}", self.base_url, locator)
        } else {
            format!("{}/{}", self.base_url, locator)
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Check if the locator already carries a scheme.
pub fn is_absolute_url(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

// ── Error helpers ───────────────────────────────────────────────────────

fn transport_error(url: &str, e: reqwest::Error) -> ProbeError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    };
    ProbeError::Transport {
        url: url.to_string(),
        reason,
    }
}

/// Extract the service's own error message when the body is the
/// conventional `{"error": "…"}` shape, else fall back to the raw body or
/// the bare status.
fn error_detail(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return format!("HTTP {}: {}", status.as_u16(), parsed.error);
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), truncate(trimmed, 120))
    }
}

async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<T, ProbeError> {
    let url = response.url().to_string();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(&url, e))?;

    serde_json::from_slice(&bytes).map_err(|e| ProbeError::Response {
        endpoint: endpoint.to_string(),
        detail: format!("malformed JSON body: {e}"),
    })
}

/// Char-boundary-safe prefix, so multibyte bodies never panic a slice.
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
