//! Term-frequency / inverse-document-frequency vectorization.
//!
//! Matches the common smoothed formulation: idf = ln((1 + n) / (1 + df))
//! + 1 over raw term counts, with each document vector l2-normalized so
//! plain dot products are cosine similarities.

use super::stop_words::is_stop_word;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Words of two or more word characters
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").unwrap())
}

/// Lowercases, tokenizes and drops stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .filter(|token| !is_stop_word(token))
        .collect()
}

/// A document vector: (term index, weight) pairs sorted by term index.
pub type SparseVector = Vec<(usize, f64)>;

/// Fits a TF-IDF model over a corpus and returns one normalized sparse
/// vector per document, in input order. The vocabulary is sorted, so the
/// vectorization is deterministic for a fixed corpus order.
pub fn vectorize(corpus: &[String]) -> Vec<SparseVector> {
    let tokenized: Vec<Vec<String>> = corpus.iter().map(|text| tokenize(text)).collect();

    // Sorted vocabulary: term -> column index
    let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for tokens in &tokenized {
        let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            *document_frequency.entry(term).or_insert(0) += 1;
        }
    }
    let vocabulary: HashMap<&str, usize> = document_frequency
        .keys()
        .enumerate()
        .map(|(index, &term)| (term, index))
        .collect();
    let document_count = corpus.len() as f64;
    let idf: Vec<f64> = document_frequency
        .values()
        .map(|&df| ((1.0 + document_count) / (1.0 + df as f64)).ln() + 1.0)
        .collect();

    tokenized
        .iter()
        .map(|tokens| {
            let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
            for token in tokens {
                if let Some(&index) = vocabulary.get(token.as_str()) {
                    *counts.entry(index).or_insert(0.0) += 1.0;
                }
            }
            let mut vector: SparseVector = counts
                .into_iter()
                .map(|(index, tf)| (index, tf * idf[index]))
                .collect();
            l2_normalize(&mut vector);
            vector
        })
        .collect()
}

fn l2_normalize(vector: &mut SparseVector) {
    let norm = vector
        .iter()
        .map(|&(_, weight)| weight * weight)
        .sum::<f64>()
        .sqrt();
    if norm > 0.0 {
        for (_, weight) in vector.iter_mut() {
            *weight /= norm;
        }
    }
}

/// Dot product of two index-sorted sparse vectors. The summation walks
/// term indices in order, so dot(a, b) and dot(b, a) are bit-identical.
pub fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let mut sum = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_lowercase_and_drops_stop_words_and_short_tokens() {
        let tokens = tokenize("The Action RPG of A Lifetime");
        assert_eq!(tokens, vec!["action", "rpg", "lifetime"]);
    }

    #[test]
    fn vectors_are_l2_normalized() {
        let corpus = vec![
            "action shooter valve".to_string(),
            "action strategy".to_string(),
        ];
        let vectors = vectorize(&corpus);
        for vector in &vectors {
            let norm: f64 = vector.iter().map(|&(_, w)| w * w).sum();
            assert!((norm - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn identical_documents_have_cosine_one() {
        let corpus = vec!["indie platformer".to_string(), "indie platformer".to_string()];
        let vectors = vectorize(&corpus);
        assert!((dot(&vectors[0], &vectors[1]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_documents_have_cosine_zero() {
        let corpus = vec!["action shooter".to_string(), "puzzle relaxing".to_string()];
        let vectors = vectorize(&corpus);
        assert_eq!(dot(&vectors[0], &vectors[1]), 0.0);
    }

    #[test]
    fn shared_terms_score_higher_than_rare_overlap() {
        let corpus = vec![
            "action shooter fast".to_string(),
            "action shooter arena".to_string(),
            "farming simulator cozy".to_string(),
        ];
        let vectors = vectorize(&corpus);
        let close = dot(&vectors[0], &vectors[1]);
        let far = dot(&vectors[0], &vectors[2]);
        assert!(close > far);
    }

    #[test]
    fn all_stop_word_document_yields_empty_vector() {
        let corpus = vec!["the and of".to_string(), "action".to_string()];
        let vectors = vectorize(&corpus);
        assert!(vectors[0].is_empty());
    }
}
