//! Shared test utilities for the glass-catalog test suite.
//!
//! Provides fixture setup, panicking lookups with useful messages, and
//! builders for synthetic records.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path(), &CatalogConfig::default());
//!
//! let transit = find_record(&manifest.records, "28414");
//! assert_eq!(transit.model, "TRANSIT-CUSTOM");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::catalog::Catalog;
use crate::types::{GlassPartRecord, WindowSize};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/detail-glass/` to a temp directory and return it.
///
/// Tests get an isolated copy they can add files to without affecting
/// other tests or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/detail-glass");
    for entry in std::fs::read_dir(&fixtures).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), tmp.path().join(entry.file_name())).unwrap();
    }
    tmp
}

/// Create an empty file. Only names matter to the catalog.
pub fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"").unwrap();
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a record by window number. Panics if not found.
pub fn find_record<'a>(catalog: &'a Catalog, window_number: &str) -> &'a GlassPartRecord {
    catalog
        .iter()
        .find(|r| r.window_number == window_number)
        .unwrap_or_else(|| {
            let numbers: Vec<&str> = catalog.iter().map(|r| r.window_number.as_str()).collect();
            panic!("record '{window_number}' not found. Available: {numbers:?}")
        })
}

/// All filenames in catalog order.
pub fn filenames(catalog: &Catalog) -> Vec<&str> {
    catalog.iter().map(|r| r.filename.as_str()).collect()
}

// =========================================================================
// Synthetic records
// =========================================================================

/// A minimal record with the given year range.
pub fn record_with_years(start_year: u32, end_year: u32) -> GlassPartRecord {
    let filename = format!("TEST-MODEL-{start_year}-{end_year}-FD-1-10X10-X.png");
    GlassPartRecord {
        image_path: format!("/detail-glass/{filename}"),
        tokens: vec![
            "TEST".to_string(),
            "MODEL".to_string(),
            start_year.to_string(),
            end_year.to_string(),
            "FD".to_string(),
            "1".to_string(),
            "10X10".to_string(),
            "X".to_string(),
        ],
        filename,
        brand: "TEST".to_string(),
        model: "MODEL".to_string(),
        submodels: vec!["MODEL".to_string()],
        start_year,
        end_year,
        window_code: "FD".to_string(),
        window_number: "1".to_string(),
        size: WindowSize {
            width: 10,
            height: 10,
            raw: "10X10".to_string(),
        },
        description: "X".to_string(),
    }
}
