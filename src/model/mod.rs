//! Record and aggregate row types shared across the pipeline.
//!
//! Everything here is a plain value type: the pipeline derives these once
//! per batch run and never mutates them afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One (user, item, genre) interaction row, produced by the normalizer
/// after joining raw interactions with the catalog and exploding the
/// item's genre list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_id: String,
    pub item_id: u64,
    /// Total playtime in minutes. Never negative.
    pub playtime_forever: u64,
    pub genre: String,
    pub release_year: i32,
}

/// One user review with the year derived from its posting timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub user_id: String,
    pub item_id: u64,
    pub year: i32,
    pub recommend: bool,
}

/// Sentiment classification of a single review, as produced by the
/// external labeling collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SentimentLabel {
    Negative = 0,
    Neutral = 1,
    Positive = 2,
}

impl SentimentLabel {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Negative),
            1 => Some(Self::Neutral),
            2 => Some(Self::Positive),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// One labeled review row consumed by the sentiment histogrammer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub item_id: u64,
    pub year: i32,
    pub label: SentimentLabel,
}

/// A complete catalog entry, as produced by the reconciliation merge.
/// Entries that still have no title after reconciliation are dropped
/// before this type is ever constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item_id: u64,
    pub title: String,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    /// Defaults to 0.0 when absent after reconciliation.
    pub price: f64,
    pub developer: String,
    /// Absent when the release date never parsed.
    pub release_year: Option<i32>,
}

/// A raw interaction row as it comes out of the cleaned user-items table,
/// before the catalog join and genre explode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInteraction {
    pub user_id: String,
    pub item_id: u64,
    pub item_name: String,
    pub playtime_forever: u64,
}

/// A catalog row before reconciliation: any field other than the item id
/// may still be missing. The reconciliation merge fills the gaps and
/// promotes survivors to [`CatalogEntry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialCatalogEntry {
    pub item_id: u64,
    pub title: Option<String>,
    pub genres: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub price: Option<f64>,
    pub developer: Option<String>,
    /// Unparsed release date string, in whatever shape the source had.
    pub release_date: Option<String>,
}

impl PartialCatalogEntry {
    /// True when at least one catalog field is still missing.
    pub fn is_incomplete(&self) -> bool {
        self.title.is_none()
            || self.genres.is_none()
            || self.tags.is_none()
            || self.price.is_none()
            || self.developer.is_none()
            || self.release_date.is_none()
    }
}

/// The winning year per genre: the (genre, year) group with the maximum
/// summed playtime. One row per genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreYearAggregate {
    pub genre: String,
    pub release_year: i32,
    pub total_playtime: u64,
}

/// The winning user per genre, expanded back into that user's per-year
/// playtime breakdown. Multiple rows per genre when the user was active
/// in several years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGenreAggregate {
    pub user_id: String,
    pub genre: String,
    pub release_year: i32,
    pub total_playtime: u64,
}

/// One ranked title in the yearly top-3 for a recommend polarity.
///
/// A full (year, polarity) group carries positions 1..3. A short group
/// (fewer than three distinct reviewed titles that year) assigns 1 to its
/// first entry and leaves the rest unset rather than cycling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub year: i32,
    pub position: Option<u8>,
    pub title: String,
    pub polarity: bool,
}

/// Count of one sentiment label in one year. (year, label) pairs that
/// never occur are omitted, not zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentHistogramEntry {
    pub year: i32,
    pub label: SentimentLabel,
    pub count: u64,
}

/// A read-only catalog keyed by item id. Components that need catalog
/// lookups receive this explicitly instead of sharing hidden state.
#[derive(Debug, Clone, Default)]
pub struct CatalogTable {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<u64, usize>,
}

impl CatalogTable {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut by_id = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            // First occurrence wins on duplicate ids
            by_id.entry(entry.item_id).or_insert(index);
        }
        Self { entries, by_id }
    }

    pub fn get(&self, item_id: u64) -> Option<&CatalogEntry> {
        self.by_id.get(&item_id).map(|&index| &self.entries[index])
    }

    pub fn title(&self, item_id: u64) -> Option<&str> {
        self.get(item_id).map(|entry| entry.title.as_str())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_label_codes_round_trip() {
        for code in 0..=2u8 {
            let label = SentimentLabel::from_code(code).unwrap();
            assert_eq!(label.code(), code);
        }
        assert!(SentimentLabel::from_code(3).is_none());
    }
}
