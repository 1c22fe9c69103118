//! Yearly top-3 most-reviewed titles, split by recommend polarity.

use crate::model::{CatalogTable, RankingEntry, RawInteraction, ReviewRecord};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::warn;

const TOP_N: usize = 3;

/// Builds the interaction-derived title fallback table: item id to item
/// name, with duplicate names pre-deduplicated (first occurrence wins).
pub fn interaction_title_table(raw: &[RawInteraction]) -> HashMap<u64, String> {
    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut titles = HashMap::new();
    for row in raw {
        if seen_names.insert(row.item_name.as_str()) {
            titles.entry(row.item_id).or_insert_with(|| row.item_name.clone());
        }
    }
    titles
}

/// Ranks reviews into two yearly top-3 series, one per polarity.
///
/// Reviews are grouped by (year, recommend, item id) and counted; per
/// year and polarity the top 3 item ids by descending count win, with a
/// stable sort so ties keep the item-id-ascending grouped order. Titles
/// resolve through the catalog first and fall back to the
/// interaction-derived table; entries that resolve nowhere are dropped
/// rather than emitted with a fabricated title.
///
/// Positions: a full group gets 1..3; a short group assigns 1 to its
/// first entry and leaves the rest unset instead of cycling.
///
/// Returns (recommended, not-recommended), years ascending.
pub fn rank_reviews(
    reviews: &[ReviewRecord],
    catalog: &CatalogTable,
    fallback_titles: &HashMap<u64, String>,
) -> (Vec<RankingEntry>, Vec<RankingEntry>) {
    let mut counts: BTreeMap<(i32, bool, u64), u64> = BTreeMap::new();
    for review in reviews {
        *counts
            .entry((review.year, review.recommend, review.item_id))
            .or_insert(0) += 1;
    }

    // (year, polarity) -> item-id-ascending candidates
    let mut groups: BTreeMap<(i32, bool), Vec<(u64, u64)>> = BTreeMap::new();
    for ((year, recommend, item_id), count) in counts {
        groups
            .entry((year, recommend))
            .or_default()
            .push((item_id, count));
    }

    let mut recommended = Vec::new();
    let mut not_recommended = Vec::new();
    for ((year, polarity), mut candidates) in groups {
        // Stable: ties stay in item-id order
        candidates.sort_by_key(|&(_, count)| std::cmp::Reverse(count));

        let mut titles = Vec::new();
        for &(item_id, _) in candidates.iter() {
            if titles.len() == TOP_N {
                break;
            }
            let title = catalog
                .title(item_id)
                .or_else(|| fallback_titles.get(&item_id).map(String::as_str));
            match title {
                Some(title) => titles.push(title.trim().to_string()),
                None => warn!(
                    "No title resolvable for item {} in {} rankings, skipping",
                    item_id, year
                ),
            }
        }

        let full_group = titles.len() == TOP_N;
        let out = if polarity {
            &mut recommended
        } else {
            &mut not_recommended
        };
        for (index, title) in titles.into_iter().enumerate() {
            let position = if full_group {
                Some(index as u8 + 1)
            } else if index == 0 {
                Some(1)
            } else {
                None
            };
            out.push(RankingEntry {
                year,
                position,
                title,
                polarity,
            });
        }
    }

    (recommended, not_recommended)
}
