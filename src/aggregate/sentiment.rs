//! Sentiment label counts per year.

use crate::model::{SentimentHistogramEntry, SentimentRecord};
use std::collections::BTreeMap;

/// Counts sentiment labels per year. Only (year, label) pairs that occur
/// at least once are emitted; clients treat absent pairs as zero. Rows
/// come out ordered by (year, label).
pub fn sentiment_histogram(records: &[SentimentRecord]) -> Vec<SentimentHistogramEntry> {
    let mut counts: BTreeMap<(i32, crate::model::SentimentLabel), u64> = BTreeMap::new();
    for record in records {
        *counts.entry((record.year, record.label)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((year, label), count)| SentimentHistogramEntry { year, label, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SentimentLabel;

    fn record(year: i32, label: SentimentLabel) -> SentimentRecord {
        SentimentRecord {
            item_id: 1,
            year,
            label,
        }
    }

    #[test]
    fn counts_exact_matches_per_pair() {
        let records = vec![
            record(2012, SentimentLabel::Positive),
            record(2012, SentimentLabel::Positive),
            record(2012, SentimentLabel::Negative),
            record(2013, SentimentLabel::Neutral),
        ];
        let histogram = sentiment_histogram(&records);
        assert_eq!(histogram.len(), 3);
        assert_eq!(
            histogram[0],
            SentimentHistogramEntry {
                year: 2012,
                label: SentimentLabel::Negative,
                count: 1
            }
        );
        assert_eq!(histogram[1].label, SentimentLabel::Positive);
        assert_eq!(histogram[1].count, 2);
        assert_eq!(histogram[2].year, 2013);
    }

    #[test]
    fn absent_pairs_are_omitted_not_zero_filled() {
        let histogram = sentiment_histogram(&[record(2012, SentimentLabel::Neutral)]);
        assert_eq!(histogram.len(), 1);
        assert!(!histogram
            .iter()
            .any(|e| e.label == SentimentLabel::Positive));
    }

    #[test]
    fn empty_input_produces_empty_histogram() {
        assert!(sentiment_histogram(&[]).is_empty());
    }
}
