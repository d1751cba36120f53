//! # Rupture CLI Application
//!
//! Interactive single-session shell for recording one mortar rupture batch.
//! One operator, one batch, operation by operation: every command runs to
//! completion before the next prompt, matching the engine's single-writer
//! model.
//!
//! Rejections from the engine (`BatchError`) are rendered as messages and
//! never abort the session.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::NaiveDate;
use rupture_core::batch::{Batch, BatchState, MAX_BATCH_SIZE};
use rupture_core::conversion::convert;
use rupture_core::export::{report_file_name, to_csv, to_html};
use rupture_core::file_io::{load_batch, save_batch};
use rupture_core::pdf::render_batch_pdf;
use rupture_core::units::{Cm2, Kgf};

/// Read one line, trimmed. `None` means the stream is finished (EOF) or
/// broken; the session must end rather than keep prompting.
fn next_line(reader: &mut impl BufRead) -> Option<String> {
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

fn prompt(text: &str) -> Option<String> {
    print!("{}", text);
    io::stdout().flush().ok()?;
    next_line(&mut io::stdin().lock())
}

fn prompt_f64(text: &str, default: f64) -> f64 {
    prompt(text)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn prompt_date(text: &str, default: NaiveDate) -> NaiveDate {
    let input = match prompt(text) {
        Some(s) if !s.is_empty() => s,
        _ => return default,
    };
    NaiveDate::parse_from_str(&input, "%d/%m/%Y")
        .or_else(|_| input.parse::<NaiveDate>())
        .unwrap_or(default)
}

fn main() {
    println!("Rupture CLI - Mortar Batch Logger");
    println!("=================================");
    println!();

    let mut batch = setup_batch();

    println!();
    println!("Type 'help' for commands.");

    loop {
        println!();
        let Some(command) = prompt(&format!(
            "[{} | {}/{}] > ",
            batch.meta.site_name,
            batch.len(),
            MAX_BATCH_SIZE
        )) else {
            // stdin closed; end the session like 'quit'
            break;
        };
        match command.as_str() {
            "add" => add_specimen(&mut batch),
            "list" | "table" => print_table(&batch),
            "chart" => print_chart(&batch),
            "edit" => edit_specimen(&mut batch),
            "recompute" => recompute(&mut batch),
            "remove" => remove_specimens(&mut batch),
            "clear" => {
                batch.clear();
                println!("Batch cleared.");
            }
            "site" => match prompt("Site name: ") {
                Some(name) if !name.is_empty() => batch.set_site_name(name),
                _ => println!("Site name unchanged."),
            },
            "area" => {
                let area = prompt_f64(
                    &format!(
                        "Default area (cm2) [{:.2}]: ",
                        batch.meta.default_area_cm2.0
                    ),
                    batch.meta.default_area_cm2.0,
                );
                match batch.set_default_area(Cm2(area)) {
                    Ok(()) => println!(
                        "Default area set to {:.2} cm2 (existing specimens unchanged; \
                         use 'recompute' to rewrite them)",
                        area
                    ),
                    Err(e) => println!("Rejected: {}", e),
                }
            }
            "dates" => set_dates(&mut batch),
            "csv" => export_csv(&batch),
            "html" => export_html(&batch),
            "pdf" => export_pdf(&batch),
            "save" => save(&batch),
            "load" => {
                if let Some(loaded) = load() {
                    batch = loaded;
                }
            }
            "json" => match serde_json::to_string_pretty(&batch) {
                Ok(json) => println!("{}", json),
                Err(e) => println!("Serialization failed: {}", e),
            },
            "help" => print_help(),
            "quit" | "exit" | "q" => break,
            "" => {}
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }
    }
}

fn setup_batch() -> Batch {
    let site = prompt("Site name: ").unwrap_or_default();
    let date = prompt_date("Batch date (dd/mm/yyyy) [today]: ", chrono::Local::now().date_naive());
    let area = prompt_f64("Specimen area (cm2) [16.00]: ", 16.00);
    Batch::with_date(site, date, Cm2(area))
}

fn add_specimen(batch: &mut Batch) {
    let Some(code) = prompt("Specimen code: ") else {
        return;
    };
    let load = prompt_f64("Rupture load (kgf): ", 0.0);

    // Preview the conversion before committing, like the entry form does
    if let Some(stress) = convert(Kgf(load), batch.meta.default_area_cm2) {
        println!(
            "  -> with area {:.2} cm2: {:.5} kN/cm2  |  {:.4} MPa",
            batch.meta.default_area_cm2.0, stress.kn_cm2.0, stress.mpa.0
        );
    }

    match batch.add_record(&code, Kgf(load)) {
        Ok(record) => println!("Added '{}' ({:.3} MPa).", record.code, record.stress.mpa.0),
        Err(e) => println!("Rejected: {}", e),
    }
}

fn edit_specimen(batch: &mut Batch) {
    if batch.is_empty() {
        println!("Batch is empty.");
        return;
    }
    print_table(batch);
    let index = match prompt("Row # to edit: ").and_then(|s| s.parse::<usize>().ok()) {
        Some(n) if n >= 1 => n - 1,
        _ => {
            println!("Invalid row number.");
            return;
        }
    };
    let load = prompt_f64("New load (kgf): ", 0.0);
    let area = prompt_f64(
        &format!("New area (cm2) [{:.2}]: ", batch.meta.default_area_cm2.0),
        batch.meta.default_area_cm2.0,
    );
    match batch.edit_record(index, Kgf(load), Cm2(area)) {
        Ok(()) => println!("Row {} updated.", index + 1),
        Err(e) => println!("Rejected: {}", e),
    }
}

fn recompute(batch: &mut Batch) {
    let area = prompt_f64(
        &format!("Recompute all with area (cm2) [{:.2}]: ", batch.meta.default_area_cm2.0),
        batch.meta.default_area_cm2.0,
    );
    match batch.recompute_with_area(Cm2(area)) {
        Ok(count) => println!("Recomputed {} specimen(s) with area {:.2} cm2.", count, area),
        Err(e) => println!("Rejected: {}", e),
    }
}

fn remove_specimens(batch: &mut Batch) {
    let Some(input) = prompt("Codes to remove (comma-separated): ") else {
        return;
    };
    let codes: BTreeSet<String> = input
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if codes.is_empty() {
        println!("Nothing to remove.");
        return;
    }
    let removed = batch.remove_records(&codes);
    println!("Removed {} specimen(s).", removed);
}

fn set_dates(batch: &mut Batch) {
    let parse = |s: Option<String>| {
        s.and_then(|s| NaiveDate::parse_from_str(&s, "%d/%m/%Y").ok())
    };
    let molding = parse(prompt("Molding date (dd/mm/yyyy, empty = not tracked): "));
    let rupture = parse(prompt("Rupture date (dd/mm/yyyy, empty = not tracked): "));
    batch.set_lifecycle_dates(molding, rupture);
    println!("Lifecycle dates updated for specimens added from now on.");

    if !batch.is_empty() {
        if let Some(answer) = prompt("Apply to the existing specimens too? (y/N): ") {
            if answer.eq_ignore_ascii_case("y") {
                let count = batch.restamp_lifecycle_dates();
                println!("Restamped {} specimen(s).", count);
            }
        }
    }
}

fn print_table(batch: &Batch) {
    if batch.is_empty() {
        println!("Batch is empty.");
        return;
    }
    println!();
    println!(
        "  #  {:<32} {:>12} {:>10} {:>10} {:>9}  {:>4}",
        "Specimen", "Load (kgf)", "Area", "kN/cm2", "MPa", "Age"
    );
    println!("  {}", "-".repeat(85));
    for (i, r) in batch.records().iter().enumerate() {
        let age = r
            .age_days()
            .map(|a| format!("{}d", a))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<3}{:<32} {:>12.3} {:>10.2} {:>10.4} {:>9.3}  {:>4}",
            i + 1,
            r.code,
            r.load_kgf.0,
            r.area_cm2.0,
            r.stress.kn_cm2.0,
            r.stress.mpa.0,
            age
        );
    }
    if let Some(s) = batch.summary() {
        println!();
        println!(
            "  Mean: {:.4} kN/cm2 | {:.3} MPa    Std dev (pop.): {:.4} kN/cm2 | {:.3} MPa",
            s.mean_kn_cm2, s.mean_mpa, s.stddev_kn_cm2, s.stddev_mpa
        );
    }
    if batch.state() == BatchState::Full {
        println!("  Batch is full ({} specimens).", MAX_BATCH_SIZE);
    }
}

fn print_chart(batch: &Batch) {
    let points = batch.chart_points();
    if points.is_empty() {
        println!("Nothing to chart.");
        return;
    }
    let max_mpa = points.iter().map(|(_, m)| *m).fold(0.0_f64, f64::max);
    if max_mpa <= 0.0 {
        println!("Nothing to chart.");
        return;
    }
    println!();
    println!("  MPa per specimen (max {:.3})", max_mpa);
    for (code, mpa) in points {
        let width = ((mpa / max_mpa) * 50.0).round() as usize;
        println!("  {:<32} {} {:.3}", code, "#".repeat(width.max(1)), mpa);
    }
}

fn export_csv(batch: &Batch) {
    let name = report_file_name(
        "Lote_Rupturas",
        &batch.meta.site_name,
        batch.meta.batch_date,
        None,
        "csv",
    );
    match std::fs::write(&name, to_csv(batch)) {
        Ok(()) => println!("Wrote {}", name),
        Err(e) => println!("CSV export failed: {}", e),
    }
}

fn export_html(batch: &Batch) {
    let name = report_file_name(
        "Lote_Rupturas",
        &batch.meta.site_name,
        batch.meta.batch_date,
        None,
        "html",
    );
    match std::fs::write(&name, to_html(batch)) {
        Ok(()) => println!("Wrote {} (print to PDF from a browser)", name),
        Err(e) => println!("HTML export failed: {}", e),
    }
}

fn export_pdf(batch: &Batch) {
    // Short report id ties the file to this batch
    let report_id = batch.id.simple().to_string()[..8].to_string();
    let name = report_file_name(
        "Lote_Rupturas",
        &batch.meta.site_name,
        batch.meta.batch_date,
        Some(&report_id),
        "pdf",
    );
    match render_batch_pdf(batch) {
        Ok(bytes) => match std::fs::write(&name, bytes) {
            Ok(()) => println!("Wrote {}", name),
            Err(e) => println!("PDF export failed: {}", e),
        },
        // Batch data stays intact; try 'html' as a fallback
        Err(e) => println!("{}", e),
    }
}

fn save(batch: &Batch) {
    let path = match prompt("Save to (.lot path): ") {
        Some(p) if !p.is_empty() => p,
        _ => {
            println!("Save cancelled.");
            return;
        }
    };
    match save_batch(batch, Path::new(&path)) {
        Ok(()) => println!("Saved {}", path),
        Err(e) => println!("{}", e),
    }
}

fn load() -> Option<Batch> {
    let path = match prompt("Load from (.lot path): ") {
        Some(p) if !p.is_empty() => p,
        _ => {
            println!("Load cancelled.");
            return None;
        }
    };
    match load_batch(Path::new(&path)) {
        Ok(batch) => {
            println!("Loaded '{}' ({} specimens).", batch.meta.site_name, batch.len());
            Some(batch)
        }
        Err(e) => {
            println!("{}", e);
            None
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  add        add a specimen (code + load in kgf)");
    println!("  list       show the specimen table and summary");
    println!("  chart      ASCII chart of MPa per specimen");
    println!("  edit       edit one specimen's load/area by row number");
    println!("  recompute  rewrite every specimen with a new area");
    println!("  remove     remove specimens by code (duplicates included)");
    println!("  clear      empty the batch");
    println!("  site       change the site name");
    println!("  area       change the default area for new specimens");
    println!("  dates      set molding/rupture dates (optionally restamp existing)");
    println!("  csv        export the batch as CSV");
    println!("  html       export a printable HTML report");
    println!("  pdf        export the PDF report");
    println!("  save/load  persist or restore a .lot batch file");
    println!("  json       dump the batch as JSON");
    println!("  quit       exit (closing stdin also ends the session)");
}
