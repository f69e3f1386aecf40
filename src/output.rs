//! CLI output formatting.
//!
//! Each command has a `format_*` function returning `Vec<String>` so the
//! layout can be tested without capturing stdout, and a `print_*` wrapper
//! that writes the lines. Format functions are pure.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Found 8 image files in public/detail-glass
//! Parsed 7 records (4 brands, 5 models)
//!
//! Rejected
//! 001 LOGO.png
//!     does not have enough parts (1, need at least 7)
//! ```
//!
//! ## Stats
//!
//! ```text
//! Total images: 7
//! Total brands: 4
//! Total unique models: 5
//!
//! FORD (2 images)
//!     TRANSIT-CUSTOM (2 images)
//!
//! Window codes
//!     DB: 2
//!     FD: 1
//!
//! Sizes
//!     Average: 1032 x 664
//!     Largest: CHEVROLET TORNADO 1346 x 491
//!     Smallest: PEUGEOT PARTNER 554 x 506
//! ```
//!
//! ## Query
//!
//! ```text
//! 001 FORD TRANSIT-CUSTOM 2017-2021
//!     FD 28414 567X1199 PUERTA DELANTERA DERECHA
//!     Image: /detail-glass/FORD-TRANSIT-CUSTOM-...PNG
//! ```

use crate::catalog::Catalog;
use crate::naming::display_title;
use crate::scan::{Manifest, Rejection};
use crate::types::GlassPartRecord;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// `2017-2021`, or `2017-?` when the end year is missing.
fn year_span(record: &GlassPartRecord) -> String {
    if record.end_year == 0 {
        format!("{}-?", record.start_year)
    } else {
        format!("{}-{}", record.start_year, record.end_year)
    }
}

/// Header line for a record: index, brand, model, years.
fn record_header(index: usize, record: &GlassPartRecord) -> String {
    if record.model.is_empty() {
        format!(
            "{} {} {}",
            format_index(index),
            record.brand,
            year_span(record)
        )
    } else {
        format!(
            "{} {} {} {}",
            format_index(index),
            record.brand,
            record.model,
            year_span(record)
        )
    }
}

fn rejection_lines(rejected: &[Rejection]) -> Vec<String> {
    let mut lines = Vec::new();
    if rejected.is_empty() {
        return lines;
    }
    lines.push(String::new());
    lines.push("Rejected".to_string());
    for (i, r) in rejected.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), r.filename));
        lines.push(format!("{}{}", indent(1), r.reason));
    }
    lines
}

// ============================================================================
// scan / check
// ============================================================================

/// Summary of a scan: counts, distinct brands and models, and rejects.
pub fn format_scan_output(manifest: &Manifest, image_dir: &Path) -> Vec<String> {
    let catalog = &manifest.records;
    let found = catalog.len() + manifest.rejected.len();
    let mut lines = vec![
        format!(
            "Found {} in {}",
            plural(found, "image file"),
            image_dir.display()
        ),
        format!(
            "Parsed {} ({}, {})",
            plural(catalog.len(), "record"),
            plural(catalog.unique_brands().len(), "brand"),
            plural(catalog.unique_models().len(), "model")
        ),
    ];
    lines.extend(rejection_lines(&manifest.rejected));
    lines
}

pub fn print_scan_output(manifest: &Manifest, image_dir: &Path) {
    for line in format_scan_output(manifest, image_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// stats
// ============================================================================

/// Brand → model tree with counts, window code distribution, and sizes.
pub fn format_stats_output(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec![
        format!("Total images: {}", catalog.len()),
        format!("Total brands: {}", catalog.unique_brands().len()),
        format!("Total unique models: {}", catalog.unique_models().len()),
    ];

    let groups = catalog.group_by_brand();
    for (brand, models) in catalog.models_by_brand() {
        let brand_count = groups.get(brand).map_or(0, Vec::len);
        lines.push(String::new());
        lines.push(format!("{} ({})", brand, plural(brand_count, "image")));
        for model in models {
            // counted across brands, as the website's model filter does
            let model_count = catalog.by_model(model).len();
            let label = if model.is_empty() { "(no model)" } else { model };
            lines.push(format!(
                "{}{} ({})",
                indent(1),
                label,
                plural(model_count, "image")
            ));
        }
    }

    let codes = catalog.window_code_counts();
    if !codes.is_empty() {
        lines.push(String::new());
        lines.push("Window codes".to_string());
        for (code, count) in codes {
            lines.push(format!("{}{}: {}", indent(1), code, count));
        }
    }

    if let Some(stats) = catalog.size_stats() {
        lines.push(String::new());
        lines.push("Sizes".to_string());
        lines.push(format!(
            "{}Average: {:.0} x {:.0}",
            indent(1),
            stats.average_width,
            stats.average_height
        ));
        lines.push(format!("{}Largest: {}", indent(1), size_label(stats.largest)));
        if let Some(smallest) = stats.smallest {
            lines.push(format!("{}Smallest: {}", indent(1), size_label(smallest)));
        }
    }

    lines
}

fn size_label(record: &GlassPartRecord) -> String {
    format!(
        "{} {} {} x {}",
        record.brand, record.model, record.size.width, record.size.height
    )
}

pub fn print_stats_output(catalog: &Catalog) {
    for line in format_stats_output(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// query
// ============================================================================

/// One entry per record: header, window data, image path.
pub fn format_records(records: &[&GlassPartRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No images found for this selection".to_string()];
    }

    let mut lines = Vec::new();
    for (i, record) in records.iter().enumerate() {
        lines.push(record_header(i + 1, record));
        let mut detail = format!(
            "{}{} {} {}",
            indent(1),
            record.window_code.trim(),
            record.window_number,
            record.size.raw
        );
        if !record.description.is_empty() {
            detail.push(' ');
            detail.push_str(&display_title(&record.description));
        }
        lines.push(detail);
        lines.push(format!("{}Image: {}", indent(1), record.image_path));
    }
    lines.push(String::new());
    lines.push(format!("{} matched", plural(records.len(), "image")));
    lines
}

pub fn print_records(records: &[&GlassPartRecord]) {
    for line in format_records(records) {
        println!("{}", line);
    }
}
