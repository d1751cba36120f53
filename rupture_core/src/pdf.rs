//! # PDF Generation Module
//!
//! Generates the batch rupture report as a PDF using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Batch data is injected via string formatting before compilation
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! The report's numeric content comes straight from the batch records and
//! [`crate::batch::Batch::summary`]; this module only formats, never
//! recomputes. Display precision follows the lab convention: load to 3
//! decimals, area to 2, kN/cm² to 4, MPa to 3.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rupture_core::batch::Batch;
//! use rupture_core::pdf::render_batch_pdf;
//! use rupture_core::units::{Cm2, Kgf};
//!
//! let mut batch = Batch::new("Residencial Jardim Tropical", Cm2(16.0));
//! batch.add_record("A039.258", Kgf(1600.0)).unwrap();
//!
//! let pdf_bytes = render_batch_pdf(&batch).unwrap();
//! std::fs::write("batch_report.pdf", pdf_bytes).unwrap();
//! ```

use chrono::Utc;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::batch::Batch;
use crate::errors::{BatchError, BatchResult};

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    /// The main source document
    main: Source,
    /// Font book
    book: LazyHash<FontBook>,
    /// Available fonts
    fonts: Vec<Font>,
    /// Library (standard functions)
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    fn load_fonts() -> Vec<Font> {
        let mut fonts = Vec::new();
        for font_bytes in typst_assets::fonts() {
            let buffer = Bytes::new(font_bytes.to_vec());
            for font in Font::iter(buffer) {
                fonts.push(font);
            }
        }
        fonts
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// Report Template
// ============================================================================

/// Typst template for the batch rupture report
const BATCH_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 1in, bottom: 1in, left: 0.8in, right: 0.8in),
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 9pt)[Site: {{SITE}}]],
      align(center)[#text(size: 9pt)[Page #counter(page).display()]],
      align(right)[#text(size: 9pt)[{{GENERATED}}]],
    )
  ]
)

#set text(size: 11pt)

// Title Block
#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Mortar Ruptures — Batch Report]
  ]
]

#v(8pt)

#align(center)[
  Site: *{{SITE}}* #h(1em) | #h(1em)
  Date: *{{DATE}}* #h(1em) | #h(1em)
  Specimen area: *{{AREA}} cm#super[2]*
]

#v(12pt)
#line(length: 100%, stroke: 0.5pt)
#v(8pt)

== Specimen Table

#table(
  columns: (auto, 1fr, auto, auto, auto, auto),
  inset: 8pt,
  stroke: 0.5pt,
  align: (center, left, right, right, right, right),
  table.header([*\#*], [*Specimen*], [*Load (kgf)*], [*Area (cm#super[2])*], [*kN/cm#super[2]*], [*MPa*]),
{{RECORD_ROWS}}
)

#v(16pt)

== Summary Statistics

#table(
  columns: (1fr, auto, auto),
  inset: 8pt,
  stroke: 0.5pt,
  align: (left, right, right),
  table.header([*Statistic*], [*kN/cm#super[2]*], [*MPa*]),
  [Mean], [{{MEAN_KN}}], [{{MEAN_MPA}}],
  [Std dev (population)], [{{SD_KN}}], [{{SD_MPA}}],
  [Specimens], [{{COUNT}}], [],
)

#v(24pt)
#text(size: 9pt, fill: gray)[
  Conversions: stress (kgf/cm#super[2]) × 0.00980665 = kN/cm#super[2];
  × 0.0980665 = MPa.
]
"##;

// ============================================================================
// PDF Rendering Functions
// ============================================================================

/// Render the batch report to PDF.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(BatchError::ExportFailed)` - empty batch or Typst failure
///
/// The batch itself is untouched either way; after an export failure its
/// data remains valid and exportable.
pub fn render_batch_pdf(batch: &Batch) -> BatchResult<Vec<u8>> {
    if batch.is_empty() {
        return Err(BatchError::export_failed(
            "pdf",
            "batch has no records to report",
        ));
    }
    // Non-empty batch always has a summary
    let summary = batch.summary().ok_or_else(|| {
        BatchError::export_failed("pdf", "summary unavailable for non-empty batch")
    })?;

    let source = BATCH_TEMPLATE
        .replace("{{SITE}}", &escape_typst(&batch.meta.site_name))
        .replace("{{DATE}}", &batch.meta.batch_date.format("%d/%m/%Y").to_string())
        .replace("{{AREA}}", &format!("{:.2}", batch.meta.default_area_cm2.0))
        .replace("{{GENERATED}}", &Utc::now().format("%Y-%m-%d").to_string())
        .replace("{{RECORD_ROWS}}", &build_record_rows(batch))
        .replace("{{MEAN_KN}}", &format!("{:.4}", summary.mean_kn_cm2))
        .replace("{{MEAN_MPA}}", &format!("{:.3}", summary.mean_mpa))
        .replace("{{SD_KN}}", &format!("{:.4}", summary.stddev_kn_cm2))
        .replace("{{SD_MPA}}", &format!("{:.3}", summary.stddev_mpa))
        .replace("{{COUNT}}", &summary.count.to_string());

    // Compile the Typst document
    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        BatchError::export_failed(
            "pdf",
            format!("Typst compilation failed: {}", error_msgs.join("; ")),
        )
    })?;

    // Render to PDF
    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        BatchError::export_failed(
            "pdf",
            format!("PDF rendering failed: {}", error_msgs.join("; ")),
        )
    })?;

    Ok(pdf_bytes)
}

/// Build the specimen table rows for the template
fn build_record_rows(batch: &Batch) -> String {
    batch
        .records()
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "  [{}], [{}], [{:.3}], [{:.2}], [{:.4}], [{:.3}],",
                i + 1,
                escape_typst(&r.code),
                r.load_kgf.0,
                r.area_cm2.0,
                r.stress.kn_cm2.0,
                r.stress.mpa.0,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape special Typst characters in user-provided text
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Cm2, Kgf};
    use chrono::NaiveDate;

    fn sample_batch() -> Batch {
        let mut batch = Batch::with_date(
            "Residencial Jardim Tropical",
            NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            Cm2(16.0),
        );
        batch.add_record("A039.258", Kgf(1600.0)).unwrap();
        batch.add_record("H682", Kgf(2000.0)).unwrap();
        batch
    }

    #[test]
    fn test_pdf_generation() {
        let pdf = render_batch_pdf(&sample_batch());
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_empty_batch_rejected() {
        let batch = Batch::new("Obra Centro", Cm2(16.0));
        let err = render_batch_pdf(&batch).unwrap_err();
        assert_eq!(err.error_code(), "EXPORT_FAILED");
        // Batch data remains usable after the failure
        assert!(batch.is_empty());
    }

    #[test]
    fn test_special_characters_in_site_name() {
        let mut batch = sample_batch();
        batch.set_site_name("Obra #3 *fase 2* _norte_");
        let pdf = render_batch_pdf(&batch);
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());
    }

    #[test]
    fn test_record_rows_formatting() {
        let rows = build_record_rows(&sample_batch());
        assert!(rows.contains("[A039.258], [1600.000], [16.00], [0.9807], [9.807],"));
        assert!(rows.contains("[2], [H682],"));
    }
}
