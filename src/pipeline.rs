//! Batch orchestration: load, reconcile, normalize, aggregate, persist.
//!
//! Every aggregate is computed in memory before the first artifact is
//! written, so a failed run never leaves a partial artifact set behind.

use crate::aggregate::{
    interaction_title_table, rank_reviews, sentiment_histogram, winning_user_per_genre,
    winning_year_per_genre,
};
use crate::artifacts::{self, ArtifactPaths};
use crate::config::AppConfig;
use crate::input;
use crate::model::{
    CatalogTable, GenreYearAggregate, PartialCatalogEntry, RankingEntry, RawInteraction,
    ReviewRecord, SentimentHistogramEntry, SentimentRecord, UserGenreAggregate,
};
use crate::normalize::normalize;
use crate::reconcile::{reconcile, StorefrontFetcher};
use crate::similarity::SimilarityIndex;
use anyhow::Result;
use std::time::Instant;
use tracing::info;

/// The four cleaned input tables, loaded up front. Any missing table is
/// fatal before any computation starts.
#[derive(Debug)]
pub struct PipelineInputs {
    pub interactions: Vec<RawInteraction>,
    pub reviews: Vec<ReviewRecord>,
    pub sentiment: Vec<SentimentRecord>,
    pub catalog: Vec<PartialCatalogEntry>,
}

/// Everything one batch run produces, ready to persist or serve.
pub struct PipelineOutputs {
    pub genre_year: Vec<GenreYearAggregate>,
    pub user_genre: Vec<UserGenreAggregate>,
    pub rankings_recommended: Vec<RankingEntry>,
    pub rankings_not_recommended: Vec<RankingEntry>,
    pub sentiment_histogram: Vec<SentimentHistogramEntry>,
    pub similarity: SimilarityIndex,
}

pub fn load_inputs(config: &AppConfig) -> Result<PipelineInputs> {
    let started = Instant::now();
    let inputs = PipelineInputs {
        interactions: input::load_interactions(&config.interactions_path())?,
        reviews: input::load_reviews(&config.reviews_path())?,
        sentiment: input::load_sentiment(&config.sentiment_path())?,
        catalog: input::load_catalog(&config.catalog_path())?,
    };
    info!(
        "Loaded {} interactions, {} reviews, {} sentiment rows, {} catalog rows in {:?}",
        inputs.interactions.len(),
        inputs.reviews.len(),
        inputs.sentiment.len(),
        inputs.catalog.len(),
        started.elapsed()
    );
    Ok(inputs)
}

/// Runs the whole batch over already-loaded inputs.
pub fn run(
    inputs: PipelineInputs,
    fetcher: &dyn StorefrontFetcher,
    store_base_url: &str,
) -> Result<PipelineOutputs> {
    let started = Instant::now();
    let entries = reconcile(inputs.catalog, fetcher, store_base_url);
    let catalog = CatalogTable::new(entries);
    info!("Reconciliation done in {:?}", started.elapsed());

    let started = Instant::now();
    let records = normalize(&inputs.interactions, &catalog);
    info!(
        "Normalized {} interaction records in {:?}",
        records.len(),
        started.elapsed()
    );

    let started = Instant::now();
    let fallback_titles = interaction_title_table(&inputs.interactions);
    let ((genre_year, user_genre), ((rankings_recommended, rankings_not_recommended), sentiment)) =
        rayon::join(
            || {
                (
                    winning_year_per_genre(&records),
                    winning_user_per_genre(&records),
                )
            },
            || {
                rayon::join(
                    || rank_reviews(&inputs.reviews, &catalog, &fallback_titles),
                    || sentiment_histogram(&inputs.sentiment),
                )
            },
        );
    info!("Aggregates computed in {:?}", started.elapsed());

    let started = Instant::now();
    let similarity = SimilarityIndex::build(&catalog);
    info!("Similarity index built in {:?}", started.elapsed());

    Ok(PipelineOutputs {
        genre_year,
        user_genre,
        rankings_recommended,
        rankings_not_recommended,
        sentiment_histogram: sentiment,
        similarity,
    })
}

/// Persists every artifact. Called only once the full output set exists.
pub fn write_artifacts(outputs: &PipelineOutputs, paths: &ArtifactPaths) -> Result<()> {
    let started = Instant::now();
    artifacts::write_genre_year(&outputs.genre_year, &paths.genre_year)?;
    artifacts::write_user_genre(&outputs.user_genre, &paths.user_genre)?;
    artifacts::write_rankings(&outputs.rankings_recommended, &paths.rankings_recommended)?;
    artifacts::write_rankings(
        &outputs.rankings_not_recommended,
        &paths.rankings_not_recommended,
    )?;
    artifacts::write_sentiment_histogram(&outputs.sentiment_histogram, &paths.sentiment_histogram)?;
    artifacts::write_similarity(&outputs.similarity, paths)?;
    info!("All artifacts written in {:?}", started.elapsed());
    Ok(())
}
