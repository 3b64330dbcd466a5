//! Configuration types for a probe run.
//!
//! All run behaviour is controlled through [`ProbeConfig`], built via its
//! [`ProbeConfigBuilder`]. Keeping every knob in one struct keeps the library
//! entry point to a single argument and makes two runs easy to diff when
//! their outcomes differ.
//!
//! The only environment variable the probe reads is `BACKEND_URL`; everything
//! else is explicit. [`ProbeConfig::from_env`] is a thin wrapper over a pure
//! resolution helper so the lookup logic stays unit-testable without touching
//! the process environment.

use crate::classify::ArtifactClassifier;
use crate::error::ProbeError;
use crate::observe::ObserverHandle;
use std::fmt;
use std::sync::Arc;

/// Base address used when `BACKEND_URL` is unset or empty.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Environment variable naming the backend base address.
pub const BACKEND_URL_VAR: &str = "BACKEND_URL";

/// Configuration for a probe run.
///
/// Built via [`ProbeConfig::builder()`], [`ProbeConfig::from_env()`], or
/// [`ProbeConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfeditor_probe::ProbeConfig;
///
/// let config = ProbeConfig::builder()
///     .base_url("http://localhost:9000")
///     .timeout_secs(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ProbeConfig {
    /// Backend base address, scheme included, no trailing slash.
    /// Default: `http://localhost:8080`.
    pub base_url: String,

    /// Optional per-request deadline in seconds. Default: None.
    ///
    /// None leaves the transport default in place (no overall deadline);
    /// interrupting a hung backend is then the operator's call.
    pub timeout_secs: Option<u64>,

    /// Filename reported for the fixture in the multipart upload.
    /// Default: `fixture.pdf`.
    pub upload_filename: String,

    /// Classifier used on the downloaded artifact.
    /// Default: the in-process magic-byte sniffer.
    pub classifier: Option<Arc<dyn ArtifactClassifier>>,

    /// Observer notified around each workflow stage. Default: none.
    pub observer: Option<ObserverHandle>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            upload_filename: "fixture.pdf".to_string(),
            classifier: None,
            observer: None,
        }
    }
}

impl fmt::Debug for ProbeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("upload_filename", &self.upload_filename)
            .field(
                "classifier",
                &self.classifier.as_ref().map(|_| "<dyn ArtifactClassifier>"),
            )
            .field("observer", &self.observer.as_ref().map(|_| "<dyn StageObserver>"))
            .finish()
    }
}

impl ProbeConfig {
    /// Create a new builder for `ProbeConfig`.
    pub fn builder() -> ProbeConfigBuilder {
        ProbeConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from the process environment (`BACKEND_URL`).
    pub fn from_env() -> Result<Self, ProbeError> {
        let base = base_url_from(std::env::var(BACKEND_URL_VAR).ok().as_deref());
        Self::builder().base_url(base).build()
    }
}

/// Resolve the base address from an optional `BACKEND_URL` value.
///
/// Unset, empty, and whitespace-only values all fall back to the default so
/// `BACKEND_URL= pdfprobe` behaves the same as an unset variable.
pub fn base_url_from(var: Option<&str>) -> String {
    match var.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => DEFAULT_BASE_URL.to_string(),
    }
}

/// Builder for [`ProbeConfig`].
pub struct ProbeConfigBuilder {
    config: ProbeConfig,
}

impl ProbeConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn upload_filename(mut self, name: impl Into<String>) -> Self {
        self.config.upload_filename = name.into();
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn ArtifactClassifier>) -> Self {
        self.config.classifier = Some(classifier);
        self
    }

    pub fn observer(mut self, observer: ObserverHandle) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// The base address must be an http/https URL; a trailing slash is
    /// stripped so locator joining never produces `//api/...`.
    pub fn build(self) -> Result<ProbeConfig, ProbeError> {
        let mut config = self.config;

        let trimmed = config.base_url.trim();
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ProbeError::InvalidConfig(format!(
                "base address must start with http:// or https://, got '{}'",
                config.base_url
            )));
        }
        config.base_url = trimmed.trim_end_matches('/').to_string();

        if config.upload_filename.trim().is_empty() {
            return Err(ProbeError::InvalidConfig(
                "upload filename must not be empty".into(),
            ));
        }
        if let Some(0) = config.timeout_secs {
            return Err(ProbeError::InvalidConfig(
                "timeout must be at least 1 second".into(),
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_localhost() {
        let c = ProbeConfig::default();
        assert_eq!(c.base_url, "http://localhost:8080");
        assert_eq!(c.timeout_secs, None);
        assert_eq!(c.upload_filename, "fixture.pdf");
        assert!(c.classifier.is_none());
        assert!(c.observer.is_none());
    }

    #[test]
    fn builder_strips_trailing_slash() {
        let c = ProbeConfig::builder()
            .base_url("http://localhost:9000/")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "http://localhost:9000");
    }

    #[test]
    fn builder_rejects_non_http_base() {
        let err = ProbeConfig::builder()
            .base_url("localhost:8080")
            .build()
            .unwrap_err();
        assert!(matches!(err, ProbeError::InvalidConfig(_)));

        let err = ProbeConfig::builder().base_url("ftp://x").build().unwrap_err();
        assert!(matches!(err, ProbeError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = ProbeConfig::builder().timeout_secs(0).build().unwrap_err();
        assert!(matches!(err, ProbeError::InvalidConfig(_)));
    }

    #[test]
    fn base_url_resolution_falls_back_to_default() {
        assert_eq!(base_url_from(None), DEFAULT_BASE_URL);
        assert_eq!(base_url_from(Some("")), DEFAULT_BASE_URL);
        assert_eq!(base_url_from(Some("   ")), DEFAULT_BASE_URL);
        assert_eq!(
            base_url_from(Some(" http://10.0.0.5:8080 ")),
            "http://10.0.0.5:8080"
        );
    }

    #[test]
    fn debug_masks_dyn_fields() {
        use crate::classify::MagicClassifier;
        use crate::observe::NoopObserver;

        let c = ProbeConfig::builder()
            .classifier(Arc::new(MagicClassifier))
            .observer(Arc::new(NoopObserver))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn ArtifactClassifier>"));
        assert!(dbg.contains("<dyn StageObserver>"));
    }
}
