//! Reconciliation merge: fills gaps in catalog data from the storefront
//! fetch collaborator and promotes complete rows to [`CatalogEntry`].

mod storefront;

pub use storefront::{
    FetchedFields, HttpStorefrontFetcher, NullStorefrontFetcher, StorefrontFetcher,
};

use crate::error::PipelineError;
use crate::model::{CatalogEntry, PartialCatalogEntry};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Reconciles an incomplete catalog table against the fetch collaborator.
///
/// Rows are deduplicated by item id (first occurrence wins). For each row
/// still missing a field, a lookup URL is derived from `store_base_url`
/// and the collaborator is asked once; whatever subset of fields comes
/// back is spliced in. A single row's fetch failure is logged and skipped
/// without failing the batch. After reconciliation, rows with no title
/// are dropped, price defaults to 0, genre/tag lists from the two sources
/// are set-unioned, and release dates go through the lenient parser with
/// failures coerced to missing.
pub fn reconcile(
    rows: Vec<PartialCatalogEntry>,
    fetcher: &dyn StorefrontFetcher,
    store_base_url: &str,
) -> Vec<CatalogEntry> {
    let mut seen_ids: HashSet<u64> = HashSet::new();
    let mut fetched = 0usize;
    let mut failed = 0usize;
    let mut dropped = 0usize;

    let mut entries = Vec::new();
    for mut row in rows {
        if !seen_ids.insert(row.item_id) {
            continue;
        }

        if row.is_incomplete() {
            let url = lookup_url(store_base_url, row.item_id);
            match fetcher.fetch(&url) {
                Ok(fields) => {
                    fetched += 1;
                    splice(&mut row, fields);
                }
                Err(e) => {
                    failed += 1;
                    let err = PipelineError::FetchFailure {
                        item_id: row.item_id,
                        reason: e.to_string(),
                    };
                    debug!("{}", err);
                }
            }
        }

        let Some(title) = row.title else {
            dropped += 1;
            continue;
        };
        entries.push(CatalogEntry {
            item_id: row.item_id,
            title,
            genres: row.genres.unwrap_or_default(),
            tags: row.tags.unwrap_or_default(),
            price: row.price.unwrap_or(0.0),
            developer: row.developer.unwrap_or_default(),
            release_year: row.release_date.as_deref().and_then(parse_release_year),
        });
    }

    if failed > 0 {
        warn!("{} storefront fetches failed and were skipped", failed);
    }
    info!(
        "Reconciled catalog: {} entries ({} fetched, {} dropped without a title)",
        entries.len(),
        fetched,
        dropped
    );
    entries
}

/// Derives the storefront lookup URL for one item.
pub fn lookup_url(store_base_url: &str, item_id: u64) -> String {
    format!("{}/{}", store_base_url.trim_end_matches('/'), item_id)
}

/// Splices fetched fields into a row. Scalar fields only fill gaps;
/// genre/tag lists are set-unioned with the catalog's own, duplicates
/// removed, catalog order first.
fn splice(row: &mut PartialCatalogEntry, fields: FetchedFields) {
    row.title = row.title.take().or(fields.title);
    row.price = row.price.take().or(fields.price);
    row.developer = row.developer.take().or(fields.developer);
    row.release_date = row.release_date.take().or(fields.release_date);
    row.genres = union_labels(row.genres.take(), fields.genres);
    row.tags = union_labels(row.tags.take(), fields.tags);
}

fn union_labels(ours: Option<Vec<String>>, theirs: Option<Vec<String>>) -> Option<Vec<String>> {
    match (ours, theirs) {
        (None, None) => None,
        (Some(labels), None) | (None, Some(labels)) => Some(labels),
        (Some(ours), Some(theirs)) => {
            let mut seen: HashSet<String> = HashSet::new();
            let mut merged = Vec::new();
            for label in ours.into_iter().chain(theirs) {
                if seen.insert(label.clone()) {
                    merged.push(label);
                }
            }
            Some(merged)
        }
    }
}

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap())
}

/// Lenient multi-format release-date parser. Unparseable dates coerce to
/// missing; the row is then retained with an unknown year (and dropped
/// downstream by consumers that require one).
pub fn parse_release_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if s.is_empty() || s.starts_with("Soon") {
        return None;
    }
    for format in ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y", "%d %b, %Y", "%d %B, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date.year());
        }
    }
    // Last resort: a bare plausible year anywhere in the string
    year_regex()
        .find(s)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}
