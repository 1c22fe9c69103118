//! Readers for the cleaned input tables.
//!
//! The raw JSON ingestion and schema cleaning live upstream; this module
//! only consumes the cleaned CSV tables they produce. Loading a table is
//! all-or-nothing: a missing or unreadable file is fatal before any
//! artifact is written, while individual malformed rows are dropped.

use crate::error::PipelineError;
use crate::model::{PartialCatalogEntry, RawInteraction, ReviewRecord, SentimentLabel, SentimentRecord};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

/// Year assumed when a posted date carries no year at all
/// ("Posted June 24."). The source datasets were captured in 2016.
const DEFAULT_POSTED_YEAR: i32 = 2016;

#[derive(Debug, Deserialize)]
struct InteractionRow {
    user_id: String,
    #[serde(alias = "item_id")]
    id: u64,
    item_name: String,
    playtime_forever: u64,
}

#[derive(Debug, Deserialize)]
struct ReviewRow {
    user_id: String,
    item_id: u64,
    posted: String,
    recommend: String,
}

#[derive(Debug, Deserialize)]
struct SentimentRow {
    item_id: u64,
    posted: String,
    sentiment_analysis: u8,
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: Option<u64>,
    title: Option<String>,
    genres: Option<String>,
    tags: Option<String>,
    price: Option<String>,
    developer: Option<String>,
    release_date: Option<String>,
}

fn open_table(path: &Path) -> Result<csv::Reader<std::fs::File>, PipelineError> {
    csv::Reader::from_path(path).map_err(|e| PipelineError::missing_input(path, e))
}

/// Loads the user-items table: one row per (user, owned item).
pub fn load_interactions(path: &Path) -> Result<Vec<RawInteraction>, PipelineError> {
    let reader = open_table(path)?;
    Ok(read_interactions(reader))
}

fn read_interactions<R: Read>(mut reader: csv::Reader<R>) -> Vec<RawInteraction> {
    let mut rows = Vec::new();
    for record in reader.deserialize::<InteractionRow>() {
        match record {
            Ok(row) => rows.push(RawInteraction {
                user_id: row.user_id,
                item_id: row.id,
                item_name: row.item_name,
                playtime_forever: row.playtime_forever,
            }),
            Err(e) => warn!("Dropping malformed interaction row: {}", e),
        }
    }
    rows
}

/// Loads the reviews table, deriving the review year from the posted
/// timestamp. Rows whose timestamp does not resolve are dropped; those
/// should have been excluded upstream.
pub fn load_reviews(path: &Path) -> Result<Vec<ReviewRecord>, PipelineError> {
    let reader = open_table(path)?;
    Ok(read_reviews(reader))
}

fn read_reviews<R: Read>(mut reader: csv::Reader<R>) -> Vec<ReviewRecord> {
    let mut rows = Vec::new();
    for record in reader.deserialize::<ReviewRow>() {
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                warn!("Dropping malformed review row: {}", e);
                continue;
            }
        };
        let (Some(date), Some(recommend)) =
            (parse_posted_date(&row.posted), parse_bool(&row.recommend))
        else {
            warn!(
                "Dropping review row with unresolvable fields (posted={:?}, recommend={:?})",
                row.posted, row.recommend
            );
            continue;
        };
        rows.push(ReviewRecord {
            user_id: row.user_id,
            item_id: row.item_id,
            year: date.year(),
            recommend,
        });
    }
    rows
}

/// Loads the sentiment table produced by the external labeling
/// collaborator. Identifying fields beyond the item id are dropped here.
pub fn load_sentiment(path: &Path) -> Result<Vec<SentimentRecord>, PipelineError> {
    let reader = open_table(path)?;
    Ok(read_sentiment(reader))
}

fn read_sentiment<R: Read>(mut reader: csv::Reader<R>) -> Vec<SentimentRecord> {
    let mut rows = Vec::new();
    for record in reader.deserialize::<SentimentRow>() {
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                warn!("Dropping malformed sentiment row: {}", e);
                continue;
            }
        };
        let (Some(date), Some(label)) = (
            parse_posted_date(&row.posted),
            SentimentLabel::from_code(row.sentiment_analysis),
        ) else {
            warn!(
                "Dropping sentiment row with unresolvable fields (posted={:?}, label={})",
                row.posted, row.sentiment_analysis
            );
            continue;
        };
        rows.push(SentimentRecord {
            item_id: row.item_id,
            year: date.year(),
            label,
        });
    }
    rows
}

/// Loads the catalog table into partial entries for reconciliation.
/// Rows without an item id are unusable and dropped outright.
pub fn load_catalog(path: &Path) -> Result<Vec<PartialCatalogEntry>, PipelineError> {
    let reader = open_table(path)?;
    Ok(read_catalog(reader))
}

fn read_catalog<R: Read>(mut reader: csv::Reader<R>) -> Vec<PartialCatalogEntry> {
    let mut rows = Vec::new();
    for record in reader.deserialize::<CatalogRow>() {
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                warn!("Dropping malformed catalog row: {}", e);
                continue;
            }
        };
        let Some(item_id) = row.id else {
            warn!("Dropping catalog row without an item id");
            continue;
        };
        rows.push(PartialCatalogEntry {
            item_id,
            title: row.title.and_then(non_blank),
            genres: row.genres.as_deref().and_then(parse_label_list),
            tags: row.tags.as_deref().and_then(parse_label_list),
            price: row.price.as_deref().and_then(parse_price),
            developer: row.developer.and_then(non_blank),
            release_date: row.release_date.and_then(non_blank),
        });
    }
    rows
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parses a review posting date. The cleaned table usually carries ISO
/// dates, but the raw "Posted June 24, 2014." form (with or without the
/// year) still shows up; a date without a year falls back to
/// [`DEFAULT_POSTED_YEAR`].
pub fn parse_posted_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    let stripped = s
        .strip_prefix("Posted ")
        .unwrap_or(s)
        .trim_end_matches('.')
        .trim();
    if let Ok(date) = NaiveDate::parse_from_str(stripped, "%B %d, %Y") {
        return Some(date);
    }
    // No year at all: "June 24"
    let with_default_year = format!("{}, {}", stripped, DEFAULT_POSTED_YEAR);
    NaiveDate::parse_from_str(&with_default_year, "%B %d, %Y").ok()
}

/// Parses a label-list cell. The cleaned table stores these as
/// `['Action', 'Indie']`; a bare comma-separated form is accepted too.
/// Empty and whitespace-only labels are discarded, and an empty result
/// counts as missing.
pub fn parse_label_list(raw: &str) -> Option<Vec<String>> {
    let s = raw.trim();
    if s.is_empty() || s == "None" || s == "[]" {
        return None;
    }
    let inner = s
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(s);
    let labels: Vec<String> = inner
        .split(',')
        .map(|label| label.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        None
    } else {
        Some(labels)
    }
}

fn starting_at_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d{2})?)").unwrap())
}

/// Parses a price cell. Plain numbers pass through, "Starting at $9.99"
/// style strings reduce to their numeric part, and any other textual
/// representation ("Free To Play", "Play the Demo") coerces to 0.
pub fn parse_price(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(value) = s.parse::<f64>() {
        return Some(value.max(0.0));
    }
    if s.starts_with("Starting") {
        if let Some(captures) = starting_at_regex().captures(s) {
            if let Ok(value) = captures[1].parse::<f64>() {
                return Some(value);
            }
        }
    }
    Some(0.0)
}
