//! Shared types serialized between the scan stage and catalog consumers.
//!
//! Records are written to the JSON catalog manifest and read back by the
//! `query` command, so the serialized shape is the contract with the
//! presentation layer. Keys are camelCase (`startYear`, `imagePath`) because
//! that is what the website code reads.

use serde::{Deserialize, Serialize};

/// One glass part, parsed from a filename like
/// `FORD-TRANSIT-CUSTOM-2017-2021-FD-28414-567X1199-PUERTA-DELANTERA-DERECHA.PNG`.
///
/// Records are never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlassPartRecord {
    /// Original filename, extension included. Unique within a catalog snapshot.
    pub filename: String,
    pub brand: String,
    /// Model tokens joined with `-` (e.g. `TRANSIT-CUSTOM`).
    pub model: String,
    /// Model tokens in positional order. `submodels.join("-") == model`.
    pub submodels: Vec<String>,
    /// Always within the accepted start-year window.
    pub start_year: u32,
    /// Not range-checked. `0` when the token after the start year is not four digits.
    pub end_year: u32,
    /// Stored verbatim, stray whitespace included.
    pub window_code: String,
    /// Stored verbatim. Some brands put a side marker (`DR`, `IZ`) here.
    pub window_number: String,
    pub size: WindowSize,
    /// Remaining tokens after the size, joined with `-`. May be empty.
    pub description: String,
    /// Mount prefix followed by the original filename.
    pub image_path: String,
    /// Every positional token of the extension-stripped name.
    ///
    /// Lets consumers reinterpret slots that some brands encode differently
    /// without re-parsing the filename.
    pub tokens: Vec<String>,
}

/// Physical size of the glass piece as written in the filename.
///
/// `width` and `height` are `0` when `raw` is not of the form `<digits>x<digits>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
    pub raw: String,
}

impl WindowSize {
    /// Area in the filename's units. Zero for unparsed sizes.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}
