//! The in-memory glass catalog and its derived views.
//!
//! A [`Catalog`] is an ordered, immutable collection of
//! [`GlassPartRecord`]s built once from a filename snapshot (see
//! [`crate::scan::build_catalog`]). All queries borrow from it and return
//! records in catalog order unless noted otherwise. No query fails: an
//! empty result is a normal answer.

use crate::naming;
use crate::types::GlassPartRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    records: Vec<GlassPartRecord>,
}

/// Several criteria combined with AND. Unset fields match everything.
///
/// Each criterion behaves exactly like the corresponding single query
/// (`brand` like [`Catalog::by_brand`], `years` like
/// [`Catalog::by_year_range`], and so on).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub window_code: Option<String>,
    /// Inclusive `(start, end)` overlap.
    pub years: Option<(u32, u32)>,
    /// Case-insensitive description substring.
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &GlassPartRecord) -> bool {
        let search = self.search.as_deref().map(str::to_lowercase);
        self.matches_with(record, search.as_deref())
    }

    fn matches_with(&self, record: &GlassPartRecord, lowered_term: Option<&str>) -> bool {
        self.brand.as_deref().is_none_or(|b| record.brand == b)
            && self.model.as_deref().is_none_or(|m| record.model == m)
            && self
                .window_code
                .as_deref()
                .is_none_or(|c| record.window_code == c)
            && self
                .years
                .is_none_or(|(start, end)| overlaps(record, start, end))
            && lowered_term.is_none_or(|t| description_contains(record, t))
    }
}

fn overlaps(record: &GlassPartRecord, start: u32, end: u32) -> bool {
    record.start_year <= end && record.end_year >= start
}

/// `lowered_term` must already be lowercase.
fn description_contains(record: &GlassPartRecord, lowered_term: &str) -> bool {
    record.description.to_lowercase().contains(lowered_term)
}

/// Aggregate window dimensions across a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeStats<'a> {
    pub average_width: f64,
    pub average_height: f64,
    pub largest: &'a GlassPartRecord,
    /// Smallest record with a non-zero area. `None` if every size failed to parse.
    pub smallest: Option<&'a GlassPartRecord>,
}

impl Catalog {
    /// Wrap already-parsed records, keeping their order.
    pub fn from_records(records: Vec<GlassPartRecord>) -> Self {
        Self { records }
    }

    /// Parse every filename and keep the ones that form a record.
    ///
    /// Rejections are logged and dropped. Use [`crate::scan::build_catalog`]
    /// to get them back as well.
    pub fn build<I, S>(filenames: I, image_prefix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        filenames
            .into_iter()
            .filter_map(|name| naming::parse_glass_filename(name.as_ref(), image_prefix).ok())
            .collect()
    }

    pub fn records(&self) -> &[GlassPartRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GlassPartRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct brands, sorted.
    pub fn unique_brands(&self) -> Vec<String> {
        self.distinct(|r| &r.brand)
    }

    /// Distinct models across all brands, sorted.
    pub fn unique_models(&self) -> Vec<String> {
        self.distinct(|r| &r.model)
    }

    /// Exact, case-sensitive brand match.
    pub fn by_brand(&self, brand: &str) -> Vec<&GlassPartRecord> {
        self.filter(|r| r.brand == brand)
    }

    /// Exact, case-sensitive model match.
    pub fn by_model(&self, model: &str) -> Vec<&GlassPartRecord> {
        self.filter(|r| r.model == model)
    }

    /// Exact window code match.
    pub fn by_window_code(&self, code: &str) -> Vec<&GlassPartRecord> {
        self.filter(|r| r.window_code == code)
    }

    /// Records whose year range overlaps `[start, end]`, inclusive.
    ///
    /// Records with an end year of `0` (missing in the filename) never
    /// overlap a range that starts after year zero.
    pub fn by_year_range(&self, start: u32, end: u32) -> Vec<&GlassPartRecord> {
        self.filter(|r| overlaps(r, start, end))
    }

    /// Case-insensitive substring search over the description only.
    pub fn search_description(&self, term: &str) -> Vec<&GlassPartRecord> {
        let term = term.to_lowercase();
        self.filter(|r| description_contains(r, &term))
    }

    /// Records matching every criterion in `filter`, in catalog order.
    pub fn select(&self, filter: &RecordFilter) -> Vec<&GlassPartRecord> {
        let term = filter.search.as_deref().map(str::to_lowercase);
        self.filter(|r| filter.matches_with(r, term.as_deref()))
    }

    /// Parts fitting a specific vehicle: same brand and model, and `year`
    /// within the record's range.
    pub fn find_vehicle(&self, brand: &str, model: &str, year: u32) -> Vec<&GlassPartRecord> {
        self.filter(|r| {
            r.brand == brand && r.model == model && r.start_year <= year && r.end_year >= year
        })
    }

    /// Brand → sorted distinct models.
    pub fn models_by_brand(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut tree: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for r in &self.records {
            tree.entry(&r.brand).or_default().insert(&r.model);
        }
        tree
    }

    /// Brand → records, each group in catalog order.
    pub fn group_by_brand(&self) -> BTreeMap<&str, Vec<&GlassPartRecord>> {
        let mut groups: BTreeMap<&str, Vec<&GlassPartRecord>> = BTreeMap::new();
        for r in &self.records {
            groups.entry(&r.brand).or_default().push(r);
        }
        groups
    }

    /// Window codes with their record counts, most frequent first.
    /// Ties are ordered by code.
    pub fn window_code_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &self.records {
            *counts.entry(&r.window_code).or_default() += 1;
        }
        let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
        // stable sort keeps the BTreeMap's code order for ties
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Average dimensions plus the largest and smallest pieces by area.
    ///
    /// Averages include unparsed (zero) sizes. `None` for an empty catalog.
    pub fn size_stats(&self) -> Option<SizeStats<'_>> {
        let largest = self.records.iter().reduce(|best, r| {
            if r.size.area() > best.size.area() {
                r
            } else {
                best
            }
        })?;
        let smallest = self
            .records
            .iter()
            .filter(|r| r.size.area() > 0)
            .reduce(|best, r| {
                if r.size.area() < best.size.area() {
                    r
                } else {
                    best
                }
            });

        let count = self.records.len() as f64;
        let total_width: f64 = self.records.iter().map(|r| f64::from(r.size.width)).sum();
        let total_height: f64 = self.records.iter().map(|r| f64::from(r.size.height)).sum();

        Some(SizeStats {
            average_width: total_width / count,
            average_height: total_height / count,
            largest,
            smallest,
        })
    }

    fn filter(&self, pred: impl Fn(&GlassPartRecord) -> bool) -> Vec<&GlassPartRecord> {
        self.records.iter().filter(|r| pred(r)).collect()
    }

    fn distinct(&self, key: impl Fn(&GlassPartRecord) -> &String) -> Vec<String> {
        self.records
            .iter()
            .map(key)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect()
    }
}

impl FromIterator<GlassPartRecord> for Catalog {
    fn from_iter<T: IntoIterator<Item = GlassPartRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a GlassPartRecord;
    type IntoIter = std::slice::Iter<'a, GlassPartRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
