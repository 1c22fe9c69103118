//! Record normalizer: joins raw interactions with the catalog and
//! explodes genre lists into one row per (user, item, genre).

use crate::model::{CatalogTable, InteractionRecord, RawInteraction};
use tracing::debug;

/// Left-joins raw interaction rows to the catalog on item id and explodes
/// each matched row's genre list.
///
/// Rows with no catalog match, no release year, or no usable genre label
/// are dropped silently; there are no partial records. The relative order
/// of surviving rows follows the input order, which is what the
/// aggregators' documented first-seen tie-breaks key off.
pub fn normalize(raw: &[RawInteraction], catalog: &CatalogTable) -> Vec<InteractionRecord> {
    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in raw {
        let Some(entry) = catalog.get(row.item_id) else {
            dropped += 1;
            continue;
        };
        let Some(release_year) = entry.release_year else {
            dropped += 1;
            continue;
        };
        let mut matched_genre = false;
        for genre in &entry.genres {
            let genre = genre.trim();
            if genre.is_empty() {
                continue;
            }
            matched_genre = true;
            records.push(InteractionRecord {
                user_id: row.user_id.clone(),
                item_id: row.item_id,
                playtime_forever: row.playtime_forever,
                genre: genre.to_string(),
                release_year,
            });
        }
        if !matched_genre {
            dropped += 1;
        }
    }

    if dropped > 0 {
        debug!(
            "Normalizer dropped {} raw rows without a full catalog join",
            dropped
        );
    }
    records
}
