//! Item-to-item similarity index over term-weighted catalog metadata.

mod stop_words;
mod tfidf;

pub use tfidf::{dot, tokenize, vectorize, SparseVector};

use crate::error::PipelineError;
use crate::model::CatalogTable;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// How many neighbors a query returns: similarity ranks 2..6 of the row,
/// rank 1 being the query item itself.
pub const TOP_K: usize = 5;

/// One indexed item, in matrix row order. Titles are title-cased so
/// queries can match case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedItem {
    pub title: String,
    pub item_id: u64,
}

/// A neighbor returned by a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarItem {
    pub title: String,
    pub item_id: u64,
    pub similarity: f64,
}

/// Dense pairwise cosine-similarity matrix plus a title/id-keyed lookup.
///
/// Built once per batch run from the reconciled catalog; read-only
/// afterwards. The matrix is symmetric with a unit diagonal.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    items: Vec<IndexedItem>,
    matrix: Vec<Vec<f64>>,
    by_title: HashMap<String, usize>,
    by_id: HashMap<u64, usize>,
}

impl SimilarityIndex {
    /// Builds the index from the reconciled catalog.
    ///
    /// Entries are deduplicated by title (first occurrence wins). Each
    /// item's feature text concatenates its label set (genres and tags
    /// unioned, duplicates removed) with its developer name; entries with
    /// no feature text at all cannot be placed in the vector space and
    /// are left out of the index.
    pub fn build(catalog: &CatalogTable) -> Self {
        let mut seen_titles: HashSet<&str> = HashSet::new();
        let mut items = Vec::new();
        let mut corpus = Vec::new();
        for entry in catalog.entries() {
            if !seen_titles.insert(entry.title.as_str()) {
                continue;
            }
            let feature_text = feature_text(entry);
            if feature_text.is_empty() {
                continue;
            }
            items.push(IndexedItem {
                title: title_case(&entry.title),
                item_id: entry.item_id,
            });
            corpus.push(feature_text);
        }

        let vectors = vectorize(&corpus);
        let matrix = cosine_matrix(&vectors);
        info!("Similarity index built over {} items", items.len());
        Self::from_parts(items, matrix)
    }

    /// Reassembles an index from persisted parts (item order + matrix).
    pub fn from_parts(items: Vec<IndexedItem>, matrix: Vec<Vec<f64>>) -> Self {
        let mut by_title = HashMap::with_capacity(items.len());
        let mut by_id = HashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            by_title.entry(item.title.to_lowercase()).or_insert(index);
            by_id.entry(item.item_id).or_insert(index);
        }
        Self {
            items,
            matrix,
            by_title,
            by_id,
        }
    }

    pub fn items(&self) -> &[IndexedItem] {
        &self.items
    }

    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.matrix
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The [`TOP_K`] most similar items to the given item id, excluding
    /// the item itself, sorted by descending similarity.
    pub fn similar_by_id(&self, item_id: u64) -> Result<Vec<SimilarItem>, PipelineError> {
        let index = self
            .by_id
            .get(&item_id)
            .copied()
            .ok_or_else(|| PipelineError::not_found(format!("item id {}", item_id)))?;
        Ok(self.neighbors(index))
    }

    /// Same as [`similar_by_id`](Self::similar_by_id), keyed by title.
    /// The match is case-insensitive against the title-cased index.
    pub fn similar_by_title(&self, title: &str) -> Result<Vec<SimilarItem>, PipelineError> {
        let index = self
            .by_title
            .get(&title.trim().to_lowercase())
            .copied()
            .ok_or_else(|| PipelineError::not_found(format!("title {:?}", title)))?;
        Ok(self.neighbors(index))
    }

    fn neighbors(&self, index: usize) -> Vec<SimilarItem> {
        let row = &self.matrix[index];
        let mut order: Vec<usize> = (0..self.items.len()).filter(|&j| j != index).collect();
        // Stable: equal similarities keep matrix order
        order.sort_by(|&a, &b| row[b].partial_cmp(&row[a]).unwrap_or(std::cmp::Ordering::Equal));
        order
            .into_iter()
            .take(TOP_K)
            .map(|j| SimilarItem {
                title: self.items[j].title.clone(),
                item_id: self.items[j].item_id,
                similarity: row[j],
            })
            .collect()
    }
}

/// Space-joined deduplicated label set (genres then tags) plus developer.
fn feature_text(entry: &crate::model::CatalogEntry) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut parts: Vec<&str> = Vec::new();
    for label in entry.genres.iter().chain(entry.tags.iter()) {
        let label = label.trim();
        if !label.is_empty() && seen.insert(label) {
            parts.push(label);
        }
    }
    let developer = entry.developer.trim();
    if !developer.is_empty() {
        parts.push(developer);
    }
    parts.join(" ")
}

/// Full pairwise cosine matrix. Rows are computed in parallel; each cell
/// is a single ordered sparse dot product, so the matrix is exactly
/// symmetric and stable across runs. The diagonal is pinned to 1.0.
fn cosine_matrix(vectors: &[SparseVector]) -> Vec<Vec<f64>> {
    let n = vectors.len();
    (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        dot(&vectors[i], &vectors[j])
                    }
                })
                .collect()
        })
        .collect()
}

/// Python-style title casing: the first letter after any non-alphabetic
/// character is uppercased, everything else lowercased.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
