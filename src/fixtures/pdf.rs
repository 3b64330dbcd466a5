//! Minimal valid PDF construction.
//!
//! The fixture is the smallest legal document a conforming reader will
//! accept: header, catalog, page tree, one empty page, cross-reference table,
//! trailer, `%%EOF`. No binary marker, no info dictionary, no content
//! streams, no incremental updates. What *is* non-negotiable is the
//! cross-reference table: every entry must hold the exact byte offset at
//! which its object's serialization begins, and `startxref` must point at the
//! table itself, or readers that walk offsets (rather than scavenging) will
//! refuse the file. Offsets are therefore recorded while writing, never
//! hardcoded.

/// Default page width in PDF user-space units (US Letter).
pub const DEFAULT_PAGE_WIDTH: f64 = 612.0;

/// Default page height in PDF user-space units (US Letter).
pub const DEFAULT_PAGE_HEIGHT: f64 = 792.0;

/// Builder for the one-page PDF fixture.
///
/// Deterministic: the same knobs produce byte-identical output on every call.
///
/// # Example
/// ```rust
/// use pdfeditor_probe::PdfFixtureBuilder;
///
/// let pdf = PdfFixtureBuilder::default().build();
/// assert!(pdf.starts_with(b"%PDF-1.4"));
/// assert!(pdf.ends_with(b"%%EOF"));
/// ```
#[derive(Debug, Clone)]
pub struct PdfFixtureBuilder {
    page_width: f64,
    page_height: f64,
}

impl Default for PdfFixtureBuilder {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
        }
    }
}

impl PdfFixtureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the MediaBox dimensions of the single page.
    pub fn page_size(mut self, width: f64, height: f64) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Serialize the fixture.
    ///
    /// Objects are written in a fixed order (1 = catalog, 2 = page tree,
    /// 3 = page); the byte position of each is captured just before its
    /// `N 0 obj` line goes out and replayed verbatim into the xref table.
    pub fn build(&self) -> Vec<u8> {
        let mut pdf: Vec<u8> = Vec::with_capacity(512);
        let mut offsets: Vec<usize> = Vec::with_capacity(3);

        pdf.extend_from_slice(b"%PDF-1.4\n");

        // Object 1: catalog
        offsets.push(pdf.len());
        pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        // Object 2: page tree, exactly one kid
        offsets.push(pdf.len());
        pdf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

        // Object 3: the page, empty resources
        offsets.push(pdf.len());
        pdf.extend_from_slice(
            format!(
                "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << >> >>\nendobj\n",
                self.page_width, self.page_height
            )
            .as_bytes(),
        );

        // Cross-reference table: free-list head plus one entry per object.
        // Entries are fixed-width 20-byte records, trailing space included.
        let xref_offset = pdf.len();
        pdf.extend_from_slice(b"xref\n");
        pdf.extend_from_slice(format!("0 {}\n", offsets.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for &pos in &offsets {
            pdf.extend_from_slice(format!("{pos:010} 00000 n \n").as_bytes());
        }

        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF",
                offsets.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );

        pdf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walk the xref table of a generated fixture and return, per in-use
    /// entry, the declared offset. Panics on malformed structure; that
    /// panic *is* the test failure.
    fn declared_offsets(pdf: &[u8]) -> (usize, Vec<usize>) {
        let text = std::str::from_utf8(pdf).expect("fixture is pure ASCII");

        let startxref = text
            .rfind("startxref\n")
            .expect("startxref keyword present");
        let xref_offset: usize = text[startxref + "startxref\n".len()..]
            .lines()
            .next()
            .expect("offset line after startxref")
            .trim()
            .parse()
            .expect("startxref offset is a number");

        let table = &text[xref_offset..];
        assert!(table.starts_with("xref\n"), "startxref must point at the table");

        let mut lines = table.lines();
        assert_eq!(lines.next(), Some("xref"));
        let header = lines.next().expect("subsection header");
        let count: usize = header
            .split_whitespace()
            .nth(1)
            .expect("entry count")
            .parse()
            .expect("numeric entry count");

        let free = lines.next().expect("free-list head entry");
        assert_eq!(free, "0000000000 65535 f ");
        assert_eq!(free.len(), 19, "entry is 20 bytes including newline");

        let mut offsets = Vec::new();
        for _ in 1..count {
            let entry = lines.next().expect("in-use entry");
            assert!(entry.ends_with(" 00000 n "), "entry was: {entry:?}");
            offsets.push(entry[..10].parse().expect("10-digit offset"));
        }
        (xref_offset, offsets)
    }

    #[test]
    fn build_is_deterministic() {
        let a = PdfFixtureBuilder::default().build();
        let b = PdfFixtureBuilder::default().build();
        assert_eq!(a, b);
    }

    #[test]
    fn header_and_eof_marker() {
        let pdf = PdfFixtureBuilder::default().build();
        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(pdf.ends_with(b"%%EOF"));
    }

    #[test]
    fn xref_offsets_point_at_their_objects() {
        let pdf = PdfFixtureBuilder::default().build();
        let (_, offsets) = declared_offsets(&pdf);

        assert_eq!(offsets.len(), 3);
        for (i, &off) in offsets.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert!(
                pdf[off..].starts_with(expected.as_bytes()),
                "offset {off} for object {} does not start an object",
                i + 1
            );
        }
    }

    #[test]
    fn catalog_walk_reaches_the_page() {
        let pdf = PdfFixtureBuilder::default().build();
        let text = std::str::from_utf8(&pdf).unwrap();

        // Each object defined exactly once
        for obj in ["1 0 obj", "2 0 obj", "3 0 obj"] {
            assert_eq!(text.matches(obj).count(), 1, "{obj} defined once");
        }

        // Catalog → Pages → Page reference chain
        assert!(text.contains("/Type /Catalog /Pages 2 0 R"));
        assert!(text.contains("/Type /Pages /Kids [3 0 R] /Count 1"));
        assert!(text.contains("/Type /Page /Parent 2 0 R"));
        assert!(text.contains("/MediaBox [0 0 612 792]"));
        assert!(text.contains("/Resources << >>"));
        assert!(text.contains("/Size 4 /Root 1 0 R"));
    }

    #[test]
    fn custom_page_size_lands_in_media_box() {
        let pdf = PdfFixtureBuilder::new().page_size(200.0, 400.0).build();
        let text = std::str::from_utf8(&pdf).unwrap();
        assert!(text.contains("/MediaBox [0 0 200 400]"));

        // Offsets must stay correct whatever the page dict length is.
        let (_, offsets) = declared_offsets(&pdf);
        assert!(pdf[offsets[2]..].starts_with(b"3 0 obj"));
    }
}
