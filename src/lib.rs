//! # Glass Catalog
//!
//! Builds a queryable catalog of automotive glass part images. The image
//! directory is the data source: every filename encodes the vehicle, the
//! year range, the part and its size.
//!
//! ```text
//! FORD-TRANSIT-CUSTOM-2017-2021-FD-28414-567X1199-PUERTA-DELANTERA-DERECHA.PNG
//! └─┬┘ └─────┬──────┘ └──┬────┘ └┬┘ └─┬─┘ └──┬───┘ └──────────┬───────────┘
//! brand    model       years   code number  size         description
//! ```
//!
//! # Pipeline
//!
//! ```text
//! 1. List    public/detail-glass/  →  filenames       (skips hidden/_ files)
//! 2. Parse   filename              →  GlassPartRecord (or a rejection)
//! 3. Build   records               →  Catalog         (immutable, ordered)
//! 4. Query   Catalog               →  brands, models, year ranges, search
//! ```
//!
//! Stages 1–3 run together in [`scan::scan`], which returns a JSON-serializable
//! [`scan::Manifest`]. The website reads that manifest; the `query` command
//! reads it back into a [`catalog::Catalog`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Filename convention parser, staged as [`naming::ParseStage`] |
//! | [`types`] | `GlassPartRecord` and `WindowSize`, serialized into the manifest |
//! | [`scan`] | Directory listing, catalog building, manifest load/save |
//! | [`catalog`] | Immutable catalog and its derived views |
//! | [`config`] | `catalog.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Failure Model
//!
//! Nothing in the parse/build path returns an error to the caller. Filenames
//! that cannot be parsed are dropped with a `tracing` warning (and listed in
//! the manifest's `rejected` section); a bad size token keeps the record with
//! a zero size; a missing image directory is an empty catalog. Only config
//! and manifest I/O can fail.

pub mod catalog;
pub mod config;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

pub use catalog::Catalog;
pub use naming::{ParseFailure, parse_glass_filename};
pub use types::{GlassPartRecord, WindowSize};

#[cfg(test)]
pub(crate) mod test_helpers;
