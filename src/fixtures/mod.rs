//! Synthetic binary fixtures, built from first principles.
//!
//! ```text
//! PdfFixtureBuilder ──▶ minimal 1-page PDF  ──▶ multipart upload body
//! PngFixtureBuilder ──▶ 50×50 solid-red PNG ──▶ data:image/png;base64,… overlay
//! ```
//!
//! Neither builder uses a document or image library for output: the point of
//! the probe is to hand the backend bytes whose internal structure we control
//! and can reason about exactly — object offsets, chunk checksums, compressed
//! scanlines. A conforming reader rejecting a fixture is a bug here, never
//! noise to shrug off, so the builders are deterministic and the tests verify
//! them with independent readers.

pub mod pdf;
pub mod png;
