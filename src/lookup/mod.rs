//! Read-side lookup layer over the persisted aggregates.
//!
//! This is the seam the serving layer plugs into: every query works off
//! immutable, already-computed tables and a miss comes back as a distinct
//! [`PipelineError::NotFound`], never as a silently empty success.

use crate::artifacts::{
    self, read_genre_year, read_rankings, read_sentiment_histogram, read_user_genre, ArtifactPaths,
};
use crate::error::PipelineError;
use crate::model::{
    GenreYearAggregate, RankingEntry, SentimentHistogramEntry, UserGenreAggregate,
};
use crate::similarity::{SimilarItem, SimilarityIndex};
use anyhow::Result;

/// Immutable lookup tables held for process lifetime by a serving layer.
pub struct LookupTables {
    genre_year: Vec<GenreYearAggregate>,
    user_genre: Vec<UserGenreAggregate>,
    rankings_recommended: Vec<RankingEntry>,
    rankings_not_recommended: Vec<RankingEntry>,
    sentiment_histogram: Vec<SentimentHistogramEntry>,
    similarity: SimilarityIndex,
}

impl LookupTables {
    /// Assembles lookup tables from in-memory pipeline outputs.
    pub fn new(
        genre_year: Vec<GenreYearAggregate>,
        user_genre: Vec<UserGenreAggregate>,
        rankings_recommended: Vec<RankingEntry>,
        rankings_not_recommended: Vec<RankingEntry>,
        sentiment_histogram: Vec<SentimentHistogramEntry>,
        similarity: SimilarityIndex,
    ) -> Self {
        Self {
            genre_year,
            user_genre,
            rankings_recommended,
            rankings_not_recommended,
            sentiment_histogram,
            similarity,
        }
    }

    /// Loads every artifact from a pipeline output directory.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        Ok(Self {
            genre_year: read_genre_year(&paths.genre_year)?,
            user_genre: read_user_genre(&paths.user_genre)?,
            rankings_recommended: read_rankings(&paths.rankings_recommended, true)?,
            rankings_not_recommended: read_rankings(&paths.rankings_not_recommended, false)?,
            sentiment_histogram: read_sentiment_histogram(&paths.sentiment_histogram)?,
            similarity: artifacts::read_similarity(&paths.similarity_matrix)?,
        })
    }

    /// The winning year and total playtime for a genre.
    pub fn playtime_by_genre(&self, genre: &str) -> Result<&GenreYearAggregate, PipelineError> {
        let genre = genre.trim();
        self.genre_year
            .iter()
            .find(|row| row.genre.eq_ignore_ascii_case(genre))
            .ok_or_else(|| PipelineError::not_found(format!("genre {:?}", genre)))
    }

    /// The winning user for a genre with their per-year breakdown.
    pub fn user_for_genre(&self, genre: &str) -> Result<Vec<&UserGenreAggregate>, PipelineError> {
        let genre = genre.trim();
        let rows: Vec<&UserGenreAggregate> = self
            .user_genre
            .iter()
            .filter(|row| row.genre.eq_ignore_ascii_case(genre))
            .collect();
        if rows.is_empty() {
            return Err(PipelineError::not_found(format!("genre {:?}", genre)));
        }
        Ok(rows)
    }

    /// The ranked titles for a year and polarity.
    pub fn rankings_for_year(
        &self,
        year: i32,
        polarity: bool,
    ) -> Result<Vec<&RankingEntry>, PipelineError> {
        let table = if polarity {
            &self.rankings_recommended
        } else {
            &self.rankings_not_recommended
        };
        let rows: Vec<&RankingEntry> = table.iter().filter(|row| row.year == year).collect();
        if rows.is_empty() {
            return Err(PipelineError::not_found(format!(
                "rankings for year {} (recommend={})",
                year, polarity
            )));
        }
        Ok(rows)
    }

    /// The sentiment label counts observed in a year. Labels absent from
    /// the result had a zero count.
    pub fn sentiment_for_year(
        &self,
        year: i32,
    ) -> Result<Vec<&SentimentHistogramEntry>, PipelineError> {
        let rows: Vec<&SentimentHistogramEntry> = self
            .sentiment_histogram
            .iter()
            .filter(|row| row.year == year)
            .collect();
        if rows.is_empty() {
            return Err(PipelineError::not_found(format!("sentiment for year {}", year)));
        }
        Ok(rows)
    }

    pub fn similar_by_title(&self, title: &str) -> Result<Vec<SimilarItem>, PipelineError> {
        self.similarity.similar_by_title(title)
    }

    pub fn similar_by_id(&self, item_id: u64) -> Result<Vec<SimilarItem>, PipelineError> {
        self.similarity.similar_by_id(item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SentimentLabel;

    fn tables() -> LookupTables {
        LookupTables::new(
            vec![GenreYearAggregate {
                genre: "Action".to_string(),
                release_year: 2015,
                total_playtime: 800,
            }],
            vec![UserGenreAggregate {
                user_id: "heavy".to_string(),
                genre: "Action".to_string(),
                release_year: 2015,
                total_playtime: 700,
            }],
            vec![RankingEntry {
                year: 2011,
                position: Some(1),
                title: "Game 1".to_string(),
                polarity: true,
            }],
            vec![],
            vec![SentimentHistogramEntry {
                year: 2012,
                label: SentimentLabel::Positive,
                count: 2,
            }],
            SimilarityIndex::from_parts(vec![], vec![]),
        )
    }

    #[test]
    fn genre_lookups_are_case_insensitive() {
        let tables = tables();
        assert_eq!(tables.playtime_by_genre("action").unwrap().release_year, 2015);
        assert_eq!(tables.user_for_genre("ACTION").unwrap()[0].user_id, "heavy");
    }

    #[test]
    fn misses_surface_as_not_found_not_empty_success() {
        let tables = tables();
        assert!(matches!(
            tables.playtime_by_genre("Sports"),
            Err(PipelineError::NotFound(_))
        ));
        assert!(matches!(
            tables.rankings_for_year(1999, true),
            Err(PipelineError::NotFound(_))
        ));
        assert!(matches!(
            tables.rankings_for_year(2011, false),
            Err(PipelineError::NotFound(_))
        ));
        assert!(matches!(
            tables.sentiment_for_year(1999),
            Err(PipelineError::NotFound(_))
        ));
    }

    #[test]
    fn present_keys_resolve() {
        let tables = tables();
        assert_eq!(tables.rankings_for_year(2011, true).unwrap().len(), 1);
        assert_eq!(tables.sentiment_for_year(2012).unwrap()[0].count, 2);
    }
}
