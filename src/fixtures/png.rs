//! Minimal valid PNG construction plus the data-URL transport wrapper.
//!
//! The fixture is a solid-colour RGBA bitmap assembled chunk by chunk:
//! 8-byte signature, IHDR, one IDAT, IEND. Every chunk is framed as
//! big-endian payload length, 4-byte type tag, payload, and a big-endian
//! CRC-32 over the tag and payload together. The pixel payload follows the
//! scanline convention: one filter-type byte (0, no filter) before each row
//! of 4-byte RGBA pixels, the whole thing zlib-compressed. Readers verify
//! the CRCs and the declared dimensions against the inflated payload, so
//! both come from the real algorithms (`crc32fast`, `flate2`), not
//! approximations.

use crate::error::ProbeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// The fixed 8-byte PNG signature.
pub const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Default fixture edge length in pixels.
pub const DEFAULT_SIZE: u32 = 50;

/// Default fixture pixel: solid red, fully opaque.
pub const DEFAULT_PIXEL: [u8; 4] = [255, 0, 0, 255];

/// Builder for the solid-colour PNG fixture.
///
/// Deterministic: the same knobs produce byte-identical output on every call.
///
/// # Example
/// ```rust
/// use pdfeditor_probe::{fixtures::png::PNG_SIGNATURE, PngFixtureBuilder};
///
/// let png = PngFixtureBuilder::default().build().unwrap();
/// assert!(png.starts_with(PNG_SIGNATURE));
/// ```
#[derive(Debug, Clone)]
pub struct PngFixtureBuilder {
    width: u32,
    height: u32,
    pixel: [u8; 4],
}

impl Default for PngFixtureBuilder {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            pixel: DEFAULT_PIXEL,
        }
    }
}

impl PngFixtureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the bitmap dimensions.
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Override the fill colour (RGBA).
    pub fn pixel(mut self, rgba: [u8; 4]) -> Self {
        self.pixel = rgba;
        self
    }

    /// Serialize the fixture.
    ///
    /// The only fallible step is the deflate pass; its `io::Error` surfaces
    /// as [`ProbeError::Internal`] since writing into a `Vec` cannot
    /// legitimately fail.
    pub fn build(&self) -> Result<Vec<u8>, ProbeError> {
        // Scanlines: filter byte 0 then width RGBA pixels, height times.
        let row_len = 1 + self.width as usize * 4;
        let mut raw = Vec::with_capacity(self.height as usize * row_len);
        for _ in 0..self.height {
            raw.push(0u8);
            for _ in 0..self.width {
                raw.extend_from_slice(&self.pixel);
            }
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&raw)
            .map_err(|e| ProbeError::Internal(format!("deflate: {e}")))?;
        let compressed = encoder
            .finish()
            .map_err(|e| ProbeError::Internal(format!("deflate: {e}")))?;

        // IHDR: width, height, bit depth 8, colour type 6 (truecolour +
        // alpha), then the three reserved method bytes, all zero.
        let mut ihdr = Vec::with_capacity(13);
        ihdr.extend_from_slice(&self.width.to_be_bytes());
        ihdr.extend_from_slice(&self.height.to_be_bytes());
        ihdr.extend_from_slice(&[8, 6, 0, 0, 0]);

        let mut png = Vec::with_capacity(compressed.len() + 64);
        png.extend_from_slice(PNG_SIGNATURE);
        write_chunk(&mut png, b"IHDR", &ihdr);
        write_chunk(&mut png, b"IDAT", &compressed);
        write_chunk(&mut png, b"IEND", &[]);
        Ok(png)
    }
}

/// Frame one chunk: length, tag, payload, CRC-32 over tag ++ payload.
fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(payload);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(tag);
    hasher.update(payload);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Wrap raw PNG bytes as a `data:image/png;base64,…` URL.
///
/// Padded standard-alphabet base64; the backend decodes with a standard
/// decoder, so padding has to stay.
pub fn to_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
