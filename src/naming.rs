//! Filename parsing for the glass-part naming convention.
//!
//! Every image in the catalog directory encodes its metadata in the filename:
//!
//! ```text
//! BRAND-MODEL[-MODEL...]-STARTYEAR-ENDYEAR-CODE-NUMBER-WIDTHxHEIGHT[-DESC...].ext
//! FORD-TRANSIT-CUSTOM-2017-2021-FD-28414-567X1199-PUERTA-DELANTERA-DERECHA.PNG
//! ```
//!
//! Tokens are positional, except for the model which may span any number of
//! tokens. The model ends where the first plausible start year begins, so the
//! parser scans for that year first and slices everything else around it.
//!
//! ## Stages
//!
//! Parsing is a short pipeline expressed as [`ParseStage`]:
//!
//! ```text
//! Unparsed ──▶ PartiallyTokenized ──▶ Parsed
//!     │                 │
//!     └──────▶ Rejected ◀┘
//! ```
//!
//! [`parse_glass_filename`] drives a stage to completion. Callers that only
//! want the record never see the intermediate states.
//!
//! ## Failure policy
//!
//! Structural problems (too few tokens, no start year, nothing after the
//! years) reject the filename. A size token that is not `WIDTHxHEIGHT` is a
//! soft failure: the record is kept with a zero size and the raw token. Both
//! are reported through `tracing` warnings, never panics.
//!
//! ## Quirks kept on purpose
//!
//! - The start year is the *first* token in `[2000, 2030]`, even when a model
//!   name contains such a number before the real year range.
//! - The end year is any four-digit token, unchecked against the window.
//! - Two token slots are always consumed for the years, even when the end
//!   year is missing.

use crate::types::{GlassPartRecord, WindowSize};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Earliest accepted start year.
pub const MIN_START_YEAR: u32 = 2000;
/// Latest accepted start year.
pub const MAX_START_YEAR: u32 = 2030;
/// Shortest token sequence that can possibly hold a record.
pub const MIN_TOKENS: usize = 7;
/// URL prefix images are served under when none is configured.
pub const DEFAULT_IMAGE_PREFIX: &str = "/detail-glass/";

/// Extensions removed before tokenizing (ASCII case-insensitive).
const STRIPPED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Why a filename produced no record.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ParseFailure {
    #[error("does not have enough parts ({found}, need at least 7)")]
    TooFewTokens { found: usize },
    #[error("could not find a start year between 2000 and 2030")]
    NoStartYear,
    #[error("missing window data after years ({found} of 3 parts)")]
    MissingWindowData { found: usize },
}

/// One step of the parsing pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseStage<'a> {
    /// Raw filename, extension still attached.
    Unparsed(&'a str),
    /// Split into tokens with at least [`MIN_TOKENS`] present.
    PartiallyTokenized {
        filename: &'a str,
        brand: &'a str,
        remaining: Vec<&'a str>,
    },
    Parsed(GlassPartRecord),
    Rejected(ParseFailure),
}

impl<'a> ParseStage<'a> {
    /// Perform a single transition. Terminal stages return themselves.
    pub fn advance(self, image_prefix: &str) -> ParseStage<'a> {
        match self {
            ParseStage::Unparsed(filename) => tokenize(filename),
            ParseStage::PartiallyTokenized {
                filename,
                brand,
                remaining,
            } => build_record(filename, brand, &remaining, image_prefix),
            terminal => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ParseStage::Parsed(_) | ParseStage::Rejected(_))
    }
}

/// Parse a filename into a record, or say why it cannot be one.
///
/// `image_prefix` is prepended to the untouched filename to form
/// [`GlassPartRecord::image_path`].
///
/// - `"FORD-TRANSIT-CUSTOM-2017-2021-FD-28414-567X1199-PUERTA.PNG"` → brand `FORD`, model `TRANSIT-CUSTOM`
/// - `"A-B-2020-2021-FD-1-notasize-DESC"` → record with a zero size
/// - `"A-B-2020.png"` → `Err(TooFewTokens { found: 3 })`
pub fn parse_glass_filename(
    filename: &str,
    image_prefix: &str,
) -> Result<GlassPartRecord, ParseFailure> {
    let mut stage = ParseStage::Unparsed(filename);
    loop {
        stage = match stage.advance(image_prefix) {
            ParseStage::Parsed(record) => return Ok(record),
            ParseStage::Rejected(reason) => {
                warn!(filename, %reason, "skipping glass image");
                return Err(reason);
            }
            next => next,
        };
    }
}

/// Remove a trailing image extension, if any.
///
/// Only the extensions the catalog knows about are removed; anything else
/// stays part of the last token.
pub fn strip_image_extension(filename: &str) -> &str {
    if let Some((stem, ext)) = filename.rsplit_once('.')
        && STRIPPED_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    {
        return stem;
    }
    filename
}

/// Parse a `WIDTHxHEIGHT` token (either case of `x`).
///
/// Returns `None` unless both sides are non-empty ASCII digit runs that fit
/// in a `u32`.
pub fn parse_size(raw: &str) -> Option<(u32, u32)> {
    let (width, height) = raw.split_once(['x', 'X'])?;
    Some((parse_digits(width)?, parse_digits(height)?))
}

/// Turn a dash-joined token run into display text: `PUERTA-DELANTERA` → `PUERTA DELANTERA`.
pub fn display_title(raw: &str) -> String {
    raw.replace('-', " ")
}

fn tokenize(filename: &str) -> ParseStage<'_> {
    let mut tokens = strip_image_extension(filename).split('-');
    let found = tokens.clone().count();
    if found < MIN_TOKENS {
        return ParseStage::Rejected(ParseFailure::TooFewTokens { found });
    }
    // split always yields at least one item
    let brand = tokens.next().unwrap_or_default();
    ParseStage::PartiallyTokenized {
        filename,
        brand,
        remaining: tokens.collect(),
    }
}

fn build_record<'a>(
    filename: &'a str,
    brand: &'a str,
    remaining: &[&'a str],
    image_prefix: &str,
) -> ParseStage<'a> {
    let tokens: Vec<&str> = std::iter::once(brand)
        .chain(remaining.iter().copied())
        .collect();

    let Some((start_index, start_year)) = locate_start_year(&tokens) else {
        return ParseStage::Rejected(ParseFailure::NoStartYear);
    };

    // The end-year slot is never trimmed and never range-checked.
    let end_year = tokens
        .get(start_index + 1)
        .and_then(|t| parse_year_token(t))
        .unwrap_or(0);

    let submodels: Vec<String> = tokens[1..start_index]
        .iter()
        .map(|t| t.to_string())
        .collect();

    let after_years = start_index + 2;
    let window_data = tokens.get(after_years..).unwrap_or_default();
    if window_data.len() < 3 {
        return ParseStage::Rejected(ParseFailure::MissingWindowData {
            found: window_data.len(),
        });
    }

    let size_raw = window_data[2];
    let (width, height) = parse_size(size_raw).unwrap_or_else(|| {
        warn!(filename, size = size_raw, "could not parse window size");
        (0, 0)
    });

    ParseStage::Parsed(GlassPartRecord {
        filename: filename.to_string(),
        brand: brand.to_string(),
        model: submodels.join("-"),
        submodels,
        start_year,
        end_year,
        window_code: window_data[0].to_string(),
        window_number: window_data[1].to_string(),
        size: WindowSize {
            width,
            height,
            raw: size_raw.to_string(),
        },
        description: window_data[3..].join("-"),
        image_path: format!("{image_prefix}{filename}"),
        tokens: tokens.iter().map(|t| t.to_string()).collect(),
    })
}

/// First token after the brand that reads as a start year. Surrounding
/// whitespace (and a stray byte-order mark) is ignored for this check only.
fn locate_start_year(tokens: &[&str]) -> Option<(usize, u32)> {
    tokens.iter().enumerate().skip(1).find_map(|(i, token)| {
        parse_year_token(trim_year_padding(token))
            .filter(|year| (MIN_START_YEAR..=MAX_START_YEAR).contains(year))
            .map(|year| (i, year))
    })
}

fn trim_year_padding(token: &str) -> &str {
    token.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Exactly four ASCII digits.
fn parse_year_token(token: &str) -> Option<u32> {
    if token.len() == 4 {
        parse_digits(token)
    } else {
        None
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
