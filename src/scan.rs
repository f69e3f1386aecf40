//! Directory listing, catalog building, and the catalog manifest.
//!
//! This is the build-time half of the tool: it reads the image directory,
//! parses every filename, and produces a [`Manifest`] that the `query`
//! command (and the website) read back later.
//!
//! ```text
//! public/detail-glass/         list_image_files    build_catalog       Manifest
//! ├── FORD-...-DERECHA.PNG  ─▶  [filenames]     ─▶  Catalog        ─▶  catalog.json
//! ├── _draft.png (skipped)                          + rejected
//! └── .DS_Store  (skipped)
//! ```
//!
//! ## Listing rules
//!
//! - Only regular files whose extension is in the configured list.
//! - Names starting with `.` or `_` are ignored.
//! - Results are sorted by name so builds are reproducible.
//! - A missing or unreadable directory is an empty listing, not an error.
//!
//! ## Fingerprint
//!
//! Each manifest carries a `source_hash`: SHA-256 over the sorted filenames and
//! the image prefix. Since records derive only from those inputs, an equal
//! hash means an existing manifest is still current and need not be rewritten.

use crate::catalog::Catalog;
use crate::config::{CatalogConfig, ListingConfig};
use crate::naming::{self, ParseFailure};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Version of the manifest format. Bump when the record shape changes.
const MANIFEST_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported manifest version {found}")]
    Version { found: u32 },
}

/// A filename that did not produce a record, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub filename: String,
    #[serde(flatten)]
    pub reason: ParseFailure,
}

/// Everything a catalog build produced.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub catalog: Catalog,
    pub rejected: Vec<Rejection>,
}

/// Serialized output of the scan stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub source_hash: String,
    pub image_prefix: String,
    pub records: Catalog,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<Rejection>,
}

impl Manifest {
    /// Load a manifest written by [`Manifest::save`].
    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let content = fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&content)?;
        if manifest.version != MANIFEST_VERSION {
            return Err(ScanError::Version {
                found: manifest.version,
            });
        }
        Ok(manifest)
    }

    /// Like [`Manifest::load`], but a missing, unreadable or outdated file is `None`.
    pub fn load_existing(path: &Path) -> Option<Self> {
        match Self::load(path) {
            Ok(m) => Some(m),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no usable existing manifest");
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ScanError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write to `path` unless a usable manifest with the same `source_hash`
    /// is already there. `force` always writes. Returns whether it wrote.
    pub fn save_if_changed(&self, path: &Path, force: bool) -> Result<bool, ScanError> {
        if !force
            && let Some(existing) = Self::load_existing(path)
            && existing.source_hash == self.source_hash
        {
            debug!(path = %path.display(), "manifest is current");
            return Ok(false);
        }
        self.save(path)?;
        Ok(true)
    }
}

/// List the image files in `dir` according to `listing`.
///
/// Never fails: an absent or unreadable directory yields an empty list and a
/// warning, so callers render "no images" rather than an error.
pub fn list_image_files(dir: &Path, listing: &ListingConfig) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read image directory");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| match e.file_name().into_string() {
            Ok(name) => Some(name),
            Err(raw) => {
                warn!(name = ?raw, "skipping image with a non UTF-8 filename");
                None
            }
        })
        .filter(|name| !name.starts_with('.') && !name.starts_with('_'))
        .filter(|name| has_listed_extension(name, &listing.extensions))
        .collect();

    names.sort();
    names
}

fn has_listed_extension(name: &str, extensions: &[String]) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            extensions.iter().any(|e| ext.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Parse a batch of filenames into a catalog.
///
/// Input order is preserved. Rejected names are dropped from the catalog
/// and returned alongside it; nothing is deduplicated.
pub fn build_catalog<I, S>(filenames: I, image_prefix: &str) -> BuildReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for name in filenames {
        let name = name.as_ref();
        match naming::parse_glass_filename(name, image_prefix) {
            Ok(record) => records.push(record),
            Err(reason) => rejected.push(Rejection {
                filename: name.to_string(),
                reason,
            }),
        }
    }

    info!(
        parsed = records.len(),
        rejected = rejected.len(),
        "built glass catalog"
    );

    BuildReport {
        catalog: Catalog::from_records(records),
        rejected,
    }
}

/// Fingerprint of the inputs a catalog is derived from.
pub fn source_hash(filenames: &[String], image_prefix: &str) -> String {
    let mut sorted: Vec<&str> = filenames.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(image_prefix.as_bytes());
    for name in sorted {
        hasher.update([0u8]);
        hasher.update(name.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// List `image_dir` and build a manifest from it.
pub fn scan(image_dir: &Path, config: &CatalogConfig) -> Manifest {
    let filenames = list_image_files(image_dir, &config.listing);
    info!(
        dir = %image_dir.display(),
        files = filenames.len(),
        "listed image directory"
    );
    let hash = source_hash(&filenames, &config.image_prefix);
    let report = build_catalog(&filenames, &config.image_prefix);

    Manifest {
        version: MANIFEST_VERSION,
        source_hash: hash,
        image_prefix: config.image_prefix.clone(),
        records: report.catalog,
        rejected: report.rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::DEFAULT_IMAGE_PREFIX;
    use crate::test_helpers::{filenames, find_record, setup_fixtures, touch};
    use tempfile::TempDir;

    #[test]
    fn listing_filters_extensions_and_hidden_files() {
        let tmp = TempDir::new().unwrap();
        for name in [
            "B-X-2020-2021-FD-1-10x10.png",
            "A-X-2020-2021-FD-1-10x10.PNG",
            "C-X-2020-2021-FD-1-10x10.jpeg",
            "notes.txt",
            ".DS_Store",
            "_draft-X-2020-2021-FD-1-10x10.png",
            ".hidden.png",
        ] {
            touch(tmp.path(), name);
        }
        fs::create_dir(tmp.path().join("nested.png")).unwrap();

        let names = list_image_files(tmp.path(), &ListingConfig::default());
        assert_eq!(
            names,
            vec![
                "A-X-2020-2021-FD-1-10x10.PNG",
                "B-X-2020-2021-FD-1-10x10.png",
                "C-X-2020-2021-FD-1-10x10.jpeg",
            ]
        );
    }

    #[test]
    fn listing_respects_configured_extensions() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.png");
        touch(tmp.path(), "b.jpg");

        let listing = ListingConfig {
            extensions: vec!["PNG".to_string()],
        };
        assert_eq!(list_image_files(tmp.path(), &listing), vec!["a.png"]);
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        let names = list_image_files(&tmp.path().join("absent"), &ListingConfig::default());
        assert!(names.is_empty());
    }

    #[test]
    fn build_reports_rejections_in_order() {
        let report = build_catalog(
            [
                "A-B-2020.png",
                "A-B-2020-2021-FD-1-10x10",
                "A-B-C-1999-3000-FD-1-10x10",
                "A-B-2020-2021-FD-1-bad",
            ],
            DEFAULT_IMAGE_PREFIX,
        );
        assert_eq!(report.catalog.len(), 2);
        assert_eq!(
            report.rejected,
            vec![
                Rejection {
                    filename: "A-B-2020.png".to_string(),
                    reason: ParseFailure::TooFewTokens { found: 3 },
                },
                Rejection {
                    filename: "A-B-C-1999-3000-FD-1-10x10".to_string(),
                    reason: ParseFailure::NoStartYear,
                },
            ]
        );
    }

    #[test]
    fn build_keeps_duplicates() {
        let name = "A-B-2020-2021-FD-1-10x10";
        let report = build_catalog([name, name], DEFAULT_IMAGE_PREFIX);
        assert_eq!(report.catalog.len(), 2);
    }

    #[test]
    fn build_from_empty_listing() {
        let report = build_catalog(Vec::<String>::new(), DEFAULT_IMAGE_PREFIX);
        assert!(report.catalog.is_empty());
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn scan_fixtures() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path(), &CatalogConfig::default());

        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert_eq!(manifest.records.len(), 6);
        assert_eq!(manifest.rejected.len(), 1);
        assert_eq!(manifest.rejected[0].filename, "LOGO-EMPRESA.png");

        let transit = find_record(&manifest.records, "28414");
        assert_eq!(transit.model, "TRANSIT-CUSTOM");
        assert!(transit.image_path.starts_with("/detail-glass/"));

        // underscore-prefixed and non-image fixtures never reach the parser
        assert!(!filenames(&manifest.records).iter().any(|f| f.starts_with('_')));
    }

    #[test]
    fn scan_uses_configured_prefix() {
        let tmp = setup_fixtures();
        let config = CatalogConfig {
            image_prefix: "https://cdn.example.com/glass/".to_string(),
            ..CatalogConfig::default()
        };
        let manifest = scan(tmp.path(), &config);
        assert!(
            manifest
                .records
                .iter()
                .all(|r| r.image_path.starts_with("https://cdn.example.com/glass/"))
        );
    }

    #[test]
    fn source_hash_ignores_order() {
        let a = vec!["x.png".to_string(), "y.png".to_string()];
        let b = vec!["y.png".to_string(), "x.png".to_string()];
        assert_eq!(source_hash(&a, "/p/"), source_hash(&b, "/p/"));
    }

    #[test]
    fn source_hash_changes_with_inputs() {
        let a = vec!["x.png".to_string()];
        let b = vec!["z.png".to_string()];
        assert_ne!(source_hash(&a, "/p/"), source_hash(&b, "/p/"));
        assert_ne!(source_hash(&a, "/p/"), source_hash(&a, "/q/"));
        // names are separated, so concatenation cannot collide
        let joined = vec!["ab".to_string()];
        let split = vec!["a".to_string(), "b".to_string()];
        assert_ne!(source_hash(&joined, "/p/"), source_hash(&split, "/p/"));
    }

    #[test]
    fn manifest_save_and_load() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path(), &CatalogConfig::default());

        let out = TempDir::new().unwrap();
        let path = out.path().join("build/catalog.json");
        manifest.save(&path).unwrap();

        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn manifest_rejections_serialize_flat() {
        let report = build_catalog(["A-B-2020.png"], DEFAULT_IMAGE_PREFIX);
        let json = serde_json::to_value(&report.rejected[0]).unwrap();
        assert_eq!(json["filename"], "A-B-2020.png");
        assert_eq!(json["reason"], "too_few_tokens");
        assert_eq!(json["found"], 3);
    }

    #[test]
    fn manifest_version_mismatch_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        fs::write(
            &path,
            r#"{"version": 99, "source_hash": "", "image_prefix": "/", "records": []}"#,
        )
        .unwrap();

        assert!(matches!(
            Manifest::load(&path),
            Err(ScanError::Version { found: 99 })
        ));
        assert!(Manifest::load_existing(&path).is_none());
    }

    #[test]
    fn load_existing_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(Manifest::load_existing(&tmp.path().join("nope.json")).is_none());
    }

    fn small_manifest(names: &[&str]) -> Manifest {
        let tmp = TempDir::new().unwrap();
        for name in names {
            touch(tmp.path(), name);
        }
        scan(tmp.path(), &CatalogConfig::default())
    }

    #[test]
    fn save_if_changed_skips_current_manifest() {
        let out = TempDir::new().unwrap();
        let path = out.path().join("catalog.json");
        let first = small_manifest(&["A-X-2020-2021-FD-1-10x10.png"]);
        assert!(first.save_if_changed(&path, false).unwrap());

        // same inputs, so the file on disk must be left alone
        let mut again = first.clone();
        again.rejected.push(Rejection {
            filename: "marker.png".to_string(),
            reason: ParseFailure::NoStartYear,
        });
        assert!(!again.save_if_changed(&path, false).unwrap());
        assert_eq!(Manifest::load(&path).unwrap(), first);
    }

    #[test]
    fn save_if_changed_writes_new_listing() {
        let out = TempDir::new().unwrap();
        let path = out.path().join("catalog.json");
        let first = small_manifest(&["A-X-2020-2021-FD-1-10x10.png"]);
        first.save(&path).unwrap();

        let second = small_manifest(&[
            "A-X-2020-2021-FD-1-10x10.png",
            "B-Y-2020-2021-FB-2-20x20.png",
        ]);
        assert!(second.save_if_changed(&path, false).unwrap());
        assert_eq!(Manifest::load(&path).unwrap(), second);
    }

    #[test]
    fn save_if_changed_force_always_writes() {
        let out = TempDir::new().unwrap();
        let path = out.path().join("catalog.json");
        let first = small_manifest(&["A-X-2020-2021-FD-1-10x10.png"]);
        first.save(&path).unwrap();

        let mut forced = first.clone();
        forced.image_prefix = "/forced/".to_string();
        assert!(forced.save_if_changed(&path, true).unwrap());
        assert_eq!(Manifest::load(&path).unwrap().image_prefix, "/forced/");
    }

    #[test]
    fn save_if_changed_replaces_unusable_manifest() {
        let out = TempDir::new().unwrap();
        let path = out.path().join("catalog.json");
        let manifest = small_manifest(&["A-X-2020-2021-FD-1-10x10.png"]);

        fs::write(&path, "not json").unwrap();
        assert!(manifest.save_if_changed(&path, false).unwrap());
        assert_eq!(Manifest::load(&path).unwrap(), manifest);

        let mut outdated = serde_json::to_value(&manifest).unwrap();
        outdated["version"] = serde_json::json!(99);
        fs::write(&path, outdated.to_string()).unwrap();
        assert!(manifest.save_if_changed(&path, false).unwrap());
        assert_eq!(Manifest::load(&path).unwrap(), manifest);
    }

    #[cfg(unix)]
    #[test]
    fn listing_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "A-X-2020-2021-FD-1-10x10.png");
        let raw = OsStr::from_bytes(b"B-\xff-2020-2021-FD-1-10x10.png");
        fs::write(tmp.path().join(raw), b"").unwrap();

        let names = list_image_files(tmp.path(), &ListingConfig::default());
        assert_eq!(names, vec!["A-X-2020-2021-FD-1-10x10.png"]);
    }
}
