//! # CSV / HTML Export
//!
//! Text export surfaces for a batch:
//!
//! - CSV with a header row and one record per row, covering the full field
//!   set. Numeric fields use `f64`'s shortest round-trip formatting, so
//!   re-importing a CSV reproduces the exact stored doubles.
//! - A standalone printable HTML report (header, record table, summary),
//!   used as a fallback when PDF rendering is unavailable.
//! - The report file-name convention shared by all exporters.

use chrono::NaiveDate;

use crate::batch::{Batch, SpecimenRecord};
use crate::conversion::StressTriple;
use crate::errors::{BatchError, BatchResult};
use crate::units::{Cm2, Kgf, KgfPerCm2, KnPerCm2, MPa};

/// CSV header row (column order is part of the format)
pub const CSV_HEADER: &str =
    "code,load_kgf,area_cm2,stress_kgf_cm2,stress_kn_cm2,stress_mpa,molding_date,rupture_date,age_days";

// ============================================================================
// CSV
// ============================================================================

/// Serialize the batch's records as CSV.
///
/// An empty batch produces just the header row.
pub fn to_csv(batch: &Batch) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for record in batch.records() {
        out.push_str(&record_to_csv_row(record));
        out.push('\n');
    }
    out
}

fn record_to_csv_row(record: &SpecimenRecord) -> String {
    let date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    let age = record
        .age_days()
        .map(|a| a.to_string())
        .unwrap_or_default();
    format!(
        "{},{},{},{},{},{},{},{},{}",
        csv_escape(&record.code),
        record.load_kgf.0,
        record.area_cm2.0,
        record.stress.kgf_cm2.0,
        record.stress.kn_cm2.0,
        record.stress.mpa.0,
        date(record.molding_date),
        date(record.rupture_date),
        age,
    )
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Parse records back from CSV produced by [`to_csv`].
///
/// The header row is required and validated. Derived stress fields are
/// read back verbatim (not recomputed), preserving the exact doubles that
/// were exported.
pub fn from_csv(csv: &str) -> BatchResult<Vec<SpecimenRecord>> {
    let mut lines = csv.lines();
    let header = lines
        .next()
        .ok_or_else(|| BatchError::invalid_input("csv", "", "empty document"))?;
    if header.trim() != CSV_HEADER {
        return Err(BatchError::invalid_input(
            "csv",
            header,
            "unrecognized header row",
        ));
    }

    let mut records = Vec::new();
    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_csv_row(line).map_err(|reason| {
            BatchError::invalid_input("csv", format!("line {}", line_no + 2), reason)
        })?);
    }
    Ok(records)
}

fn parse_csv_row(line: &str) -> Result<SpecimenRecord, String> {
    let fields = split_csv_line(line)?;
    if fields.len() != 9 {
        return Err(format!("expected 9 fields, found {}", fields.len()));
    }

    let num = |s: &str, name: &str| -> Result<f64, String> {
        s.parse::<f64>().map_err(|_| format!("bad number in '{name}': {s}"))
    };
    let date = |s: &str, name: &str| -> Result<Option<NaiveDate>, String> {
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse::<NaiveDate>()
                .map(Some)
                .map_err(|_| format!("bad date in '{name}': {s}"))
        }
    };

    Ok(SpecimenRecord {
        code: fields[0].clone(),
        load_kgf: Kgf(num(&fields[1], "load_kgf")?),
        area_cm2: Cm2(num(&fields[2], "area_cm2")?),
        stress: StressTriple {
            kgf_cm2: KgfPerCm2(num(&fields[3], "stress_kgf_cm2")?),
            kn_cm2: KnPerCm2(num(&fields[4], "stress_kn_cm2")?),
            mpa: MPa(num(&fields[5], "stress_mpa")?),
        },
        molding_date: date(&fields[6], "molding_date")?,
        rupture_date: date(&fields[7], "rupture_date")?,
        // age_days (field 8) is derived; ignored on import
    })
}

/// Split one CSV line, honoring quoted fields with doubled quotes.
fn split_csv_line(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}

// ============================================================================
// HTML
// ============================================================================

/// Render the batch as a standalone printable HTML report.
///
/// Same content contract as the PDF report: identifying header, full
/// record table, and the summary statistics. Used as a print-to-PDF
/// fallback when no PDF backend is available.
pub fn to_html(batch: &Batch) -> String {
    let mut rows = String::new();
    for (i, record) in batch.records().iter().enumerate() {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.3}</td><td>{:.2}</td><td>{:.4}</td><td>{:.3}</td></tr>\n",
            i + 1,
            html_escape(&record.code),
            record.load_kgf.0,
            record.area_cm2.0,
            record.stress.kn_cm2.0,
            record.stress.mpa.0,
        ));
    }

    let summary_block = match batch.summary() {
        Some(s) => format!(
            "<h3>Summary</h3>\n<table>\n\
             <thead><tr><th>Statistic</th><th>kN/cm\u{b2}</th><th>MPa</th></tr></thead>\n\
             <tbody>\n\
             <tr><td>Mean</td><td>{:.4}</td><td>{:.3}</td></tr>\n\
             <tr><td>Std dev (pop.)</td><td>{:.4}</td><td>{:.3}</td></tr>\n\
             </tbody>\n</table>\n",
            s.mean_kn_cm2, s.mean_mpa, s.stddev_kn_cm2, s.stddev_mpa,
        ),
        None => String::new(),
    };

    format!(
        "<!doctype html><html><head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Mortar Ruptures \u{2014} {site}</title>\n\
         <style>\n\
         body{{font-family:Arial,Helvetica,sans-serif;margin:24px}}\n\
         table{{border-collapse:collapse;width:100%;margin-top:12px}}\n\
         th,td{{border:1px solid #999;padding:6px;text-align:center}}\n\
         thead th{{background:#f2f2f2}}\n\
         </style></head><body>\n\
         <h2>Mortar Ruptures \u{2014} Batch</h2>\n\
         <div>Site: <b>{site}</b> | Date: <b>{date}</b> | Specimen area: <b>{area:.2} cm\u{b2}</b></div>\n\
         <table>\n\
         <thead><tr><th>#</th><th>Specimen</th><th>Load (kgf)</th><th>Area (cm\u{b2})</th>\
         <th>kN/cm\u{b2}</th><th>MPa</th></tr></thead>\n\
         <tbody>\n{rows}</tbody>\n\
         </table>\n\
         {summary_block}\
         </body></html>\n",
        site = html_escape(&batch.meta.site_name),
        date = batch.meta.batch_date.format("%d/%m/%Y"),
        area = batch.meta.default_area_cm2.0,
        rows = rows,
        summary_block = summary_block,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ============================================================================
// File naming
// ============================================================================

/// Build a report file name: `<prefix>_<sanitized-site>_<YYYYMMDD>[_<id>].<ext>`.
///
/// Site sanitization keeps letters, digits, spaces, hyphens and
/// underscores, then collapses whitespace runs into single underscores.
pub fn report_file_name(
    prefix: &str,
    site_name: &str,
    date: NaiveDate,
    report_id: Option<&str>,
    extension: &str,
) -> String {
    let safe_site = sanitize_site_name(site_name);
    let date_str = date.format("%Y%m%d");
    match report_id {
        Some(id) => format!("{prefix}_{safe_site}_{date_str}_{id}.{extension}"),
        None => format!("{prefix}_{safe_site}_{date_str}.{extension}"),
    }
}

fn sanitize_site_name(site_name: &str) -> String {
    let filtered: String = site_name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    filtered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batch() -> Batch {
        let mut batch = Batch::with_date(
            "Obra Centro",
            NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            Cm2(16.0),
        );
        batch.add_record("A039.258", Kgf(1600.0)).unwrap();
        batch.add_record("H682", Kgf(2000.0)).unwrap();
        batch
    }

    #[test]
    fn test_csv_shape() {
        let csv = to_csv(&sample_batch());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("A039.258,1600,16,100,"));
    }

    #[test]
    fn test_csv_round_trip_is_lossless() {
        let mut batch = sample_batch();
        // An awkward value that needs full double precision
        batch
            .add_record_with_area("odd", Kgf(1234.5678901), Cm2(15.9))
            .unwrap();

        let csv = to_csv(&batch);
        let records = from_csv(&csv).unwrap();
        assert_eq!(records.len(), 3);
        for (orig, parsed) in batch.records().iter().zip(&records) {
            assert_eq!(orig.load_kgf, parsed.load_kgf);
            assert_eq!(orig.area_cm2, parsed.area_cm2);
            assert_eq!(orig.stress, parsed.stress);
        }
    }

    #[test]
    fn test_csv_quoted_code() {
        let mut batch = sample_batch();
        batch.add_record("lot \"A\", slab 2", Kgf(500.0)).unwrap();

        let csv = to_csv(&batch);
        let records = from_csv(&csv).unwrap();
        assert_eq!(records[2].code, "lot \"A\", slab 2");
    }

    #[test]
    fn test_csv_dates_round_trip() {
        let mut batch = sample_batch();
        batch.set_lifecycle_dates(
            NaiveDate::from_ymd_opt(2024, 7, 18),
            NaiveDate::from_ymd_opt(2024, 8, 15),
        );
        batch.add_record("dated", Kgf(800.0)).unwrap();

        let records = from_csv(&to_csv(&batch)).unwrap();
        assert_eq!(records[0].molding_date, None);
        assert_eq!(
            records[2].molding_date,
            NaiveDate::from_ymd_opt(2024, 7, 18)
        );
        assert_eq!(records[2].age_days(), Some(28));
    }

    #[test]
    fn test_csv_rejects_bad_header() {
        let err = from_csv("nope,nope\n1,2\n").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_html_contains_records_and_summary() {
        let html = to_html(&sample_batch());
        assert!(html.contains("Obra Centro"));
        assert!(html.contains("A039.258"));
        assert!(html.contains("15/08/2024"));
        // Mean MPa of the two records
        assert!(html.contains("11.032"));
    }

    #[test]
    fn test_html_empty_batch() {
        let batch = Batch::with_date(
            "Obra Centro",
            NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            Cm2(16.0),
        );
        let html = to_html(&batch);
        assert!(html.contains("<tbody>"));
        assert!(!html.contains("Summary"));
    }

    #[test]
    fn test_html_escapes_site_name() {
        let mut batch = sample_batch();
        batch.set_site_name("Obra <Norte> & Sul");
        let html = to_html(&batch);
        assert!(html.contains("Obra &lt;Norte&gt; &amp; Sul"));
    }

    #[test]
    fn test_report_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        assert_eq!(
            report_file_name("Lote_Rupturas", "Jardim Tropical", date, None, "pdf"),
            "Lote_Rupturas_Jardim_Tropical_20240815.pdf"
        );
        assert_eq!(
            report_file_name("Lote_Rupturas", "Obra!  #42/b", date, Some("a1b2"), "pdf"),
            "Lote_Rupturas_Obra_42b_20240815_a1b2.pdf"
        );
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_site_name("  a   b  "), "a_b");
        assert_eq!(sanitize_site_name("a-b_c 9"), "a-b_c_9");
    }
}
