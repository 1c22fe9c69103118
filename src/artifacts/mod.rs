//! Persisted artifacts: one columnar file per aggregate, plus the dense
//! similarity matrix as a JSON document.
//!
//! Artifacts are written once per batch run, after every aggregate has
//! been computed, and read back as immutable lookup tables.

use crate::error::PipelineError;
use crate::model::{
    GenreYearAggregate, RankingEntry, SentimentHistogramEntry, SentimentLabel, UserGenreAggregate,
};
use crate::similarity::{IndexedItem, SimilarityIndex};
use anyhow::{bail, Context, Result};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::SerializedFileWriter;
use parquet::record::{Field, RecordWriter, Row};
use parquet_derive::ParquetRecordWriter;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Artifact file locations under one output directory.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub genre_year: PathBuf,
    pub user_genre: PathBuf,
    pub rankings_recommended: PathBuf,
    pub rankings_not_recommended: PathBuf,
    pub sentiment_histogram: PathBuf,
    pub similarity_items: PathBuf,
    pub similarity_matrix: PathBuf,
}

impl ArtifactPaths {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            genre_year: output_dir.join("genre_year.parquet"),
            user_genre: output_dir.join("user_genre.parquet"),
            rankings_recommended: output_dir.join("rankings_recommended.parquet"),
            rankings_not_recommended: output_dir.join("rankings_not_recommended.parquet"),
            sentiment_histogram: output_dir.join("sentiment_histogram.parquet"),
            similarity_items: output_dir.join("similarity_items.parquet"),
            similarity_matrix: output_dir.join("similarity_matrix.json"),
        }
    }
}

#[derive(ParquetRecordWriter)]
struct GenreYearRow {
    genre: String,
    release_year: i32,
    total_playtime: i64,
}

#[derive(ParquetRecordWriter)]
struct UserGenreRow {
    user_id: String,
    genre: String,
    release_year: i32,
    total_playtime: i64,
}

#[derive(ParquetRecordWriter)]
struct RankingRow {
    year: i32,
    position: Option<i32>,
    title: String,
}

#[derive(ParquetRecordWriter)]
struct SentimentRow {
    year: i32,
    label: i32,
    count: i64,
}

#[derive(ParquetRecordWriter)]
struct SimilarityItemRow {
    title: String,
    item_id: i64,
}

/// The dense matrix artifact, self-contained: item order plus the
/// square symmetric cosine matrix.
#[derive(Debug, Serialize, Deserialize)]
struct SimilarityMatrixArtifact {
    items: Vec<IndexedItem>,
    matrix: Vec<Vec<f64>>,
}

fn write_parquet<T>(rows: &[T], path: &Path) -> Result<()>
where
    for<'a> &'a [T]: RecordWriter<T>,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create artifact {:?}", path))?;
    let schema = rows.schema()?;
    let props = Arc::new(WriterProperties::builder().build());
    let mut writer = SerializedFileWriter::new(file, schema, props)?;
    let mut row_group = writer.next_row_group()?;
    rows.write_to_row_group(&mut row_group)?;
    row_group.close()?;
    writer.close()?;
    info!("Wrote {} rows to {:?}", rows.len(), path);
    Ok(())
}

pub fn write_genre_year(rows: &[GenreYearAggregate], path: &Path) -> Result<()> {
    let rows: Vec<GenreYearRow> = rows
        .iter()
        .map(|r| GenreYearRow {
            genre: r.genre.clone(),
            release_year: r.release_year,
            total_playtime: r.total_playtime as i64,
        })
        .collect();
    write_parquet(&rows, path)
}

pub fn write_user_genre(rows: &[UserGenreAggregate], path: &Path) -> Result<()> {
    let rows: Vec<UserGenreRow> = rows
        .iter()
        .map(|r| UserGenreRow {
            user_id: r.user_id.clone(),
            genre: r.genre.clone(),
            release_year: r.release_year,
            total_playtime: r.total_playtime as i64,
        })
        .collect();
    write_parquet(&rows, path)
}

pub fn write_rankings(rows: &[RankingEntry], path: &Path) -> Result<()> {
    let rows: Vec<RankingRow> = rows
        .iter()
        .map(|r| RankingRow {
            year: r.year,
            position: r.position.map(i32::from),
            title: r.title.clone(),
        })
        .collect();
    write_parquet(&rows, path)
}

pub fn write_sentiment_histogram(rows: &[SentimentHistogramEntry], path: &Path) -> Result<()> {
    let rows: Vec<SentimentRow> = rows
        .iter()
        .map(|r| SentimentRow {
            year: r.year,
            label: r.label.code() as i32,
            count: r.count as i64,
        })
        .collect();
    write_parquet(&rows, path)
}

/// Writes both similarity artifacts: the columnar title/id lookup table
/// and the JSON matrix document.
pub fn write_similarity(index: &SimilarityIndex, paths: &ArtifactPaths) -> Result<()> {
    let rows: Vec<SimilarityItemRow> = index
        .items()
        .iter()
        .map(|item| SimilarityItemRow {
            title: item.title.clone(),
            item_id: item.item_id as i64,
        })
        .collect();
    write_parquet(&rows, &paths.similarity_items)?;

    let artifact = SimilarityMatrixArtifact {
        items: index.items().to_vec(),
        matrix: index.matrix().to_vec(),
    };
    let file = File::create(&paths.similarity_matrix)
        .with_context(|| format!("Failed to create artifact {:?}", paths.similarity_matrix))?;
    serde_json::to_writer(file, &artifact)?;
    info!(
        "Wrote {}x{} similarity matrix to {:?}",
        index.len(),
        index.len(),
        paths.similarity_matrix
    );
    Ok(())
}

/// Loads the similarity index back from its JSON artifact.
pub fn read_similarity(path: &Path) -> Result<SimilarityIndex> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open similarity artifact {:?}", path))?;
    let artifact: SimilarityMatrixArtifact = serde_json::from_reader(file)?;
    if artifact.matrix.len() != artifact.items.len() {
        bail!(
            "Similarity artifact is inconsistent: {} items but {} matrix rows",
            artifact.items.len(),
            artifact.matrix.len()
        );
    }
    Ok(SimilarityIndex::from_parts(artifact.items, artifact.matrix))
}

fn rows_of(path: &Path) -> Result<Vec<Row>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open artifact {:?}", path))?;
    let reader = SerializedFileReader::new(file)?;
    let mut rows = Vec::new();
    for row in reader.get_row_iter(None)? {
        rows.push(row?);
    }
    Ok(rows)
}

fn field_str(row: &Row, name: &str) -> Result<String> {
    match find_field(row, name)? {
        Field::Str(s) => Ok(s.clone()),
        other => bail!("Field {} is not a string: {:?}", name, other),
    }
}

fn field_i32(row: &Row, name: &str) -> Result<i32> {
    match find_field(row, name)? {
        Field::Int(v) => Ok(*v),
        other => bail!("Field {} is not an int: {:?}", name, other),
    }
}

fn field_i64(row: &Row, name: &str) -> Result<i64> {
    match find_field(row, name)? {
        Field::Long(v) => Ok(*v),
        Field::Int(v) => Ok(*v as i64),
        other => bail!("Field {} is not a long: {:?}", name, other),
    }
}

fn field_opt_i32(row: &Row, name: &str) -> Result<Option<i32>> {
    match find_field(row, name)? {
        Field::Int(v) => Ok(Some(*v)),
        Field::Null => Ok(None),
        other => bail!("Field {} is not an optional int: {:?}", name, other),
    }
}

fn find_field<'a>(row: &'a Row, name: &str) -> Result<&'a Field> {
    row.get_column_iter()
        .find(|(column, _)| column.as_str() == name)
        .map(|(_, field)| field)
        .with_context(|| format!("Missing column {}", name))
}

pub fn read_genre_year(path: &Path) -> Result<Vec<GenreYearAggregate>> {
    rows_of(path)?
        .iter()
        .map(|row| {
            Ok(GenreYearAggregate {
                genre: field_str(row, "genre")?,
                release_year: field_i32(row, "release_year")?,
                total_playtime: field_i64(row, "total_playtime")? as u64,
            })
        })
        .collect()
}

pub fn read_user_genre(path: &Path) -> Result<Vec<UserGenreAggregate>> {
    rows_of(path)?
        .iter()
        .map(|row| {
            Ok(UserGenreAggregate {
                user_id: field_str(row, "user_id")?,
                genre: field_str(row, "genre")?,
                release_year: field_i32(row, "release_year")?,
                total_playtime: field_i64(row, "total_playtime")? as u64,
            })
        })
        .collect()
}

pub fn read_rankings(path: &Path, polarity: bool) -> Result<Vec<RankingEntry>> {
    rows_of(path)?
        .iter()
        .map(|row| {
            Ok(RankingEntry {
                year: field_i32(row, "year")?,
                position: field_opt_i32(row, "position")?.map(|p| p as u8),
                title: field_str(row, "title")?,
                polarity,
            })
        })
        .collect()
}

pub fn read_sentiment_histogram(path: &Path) -> Result<Vec<SentimentHistogramEntry>> {
    rows_of(path)?
        .iter()
        .map(|row| {
            let code = field_i32(row, "label")?;
            let label =
                SentimentLabel::from_code(code as u8).ok_or(PipelineError::ParseFailure {
                    field: "label",
                    value: code.to_string(),
                })?;
            Ok(SentimentHistogramEntry {
                year: field_i32(row, "year")?,
                label,
                count: field_i64(row, "count")? as u64,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn genre_year_round_trips_through_parquet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("genre_year.parquet");
        let rows = vec![
            GenreYearAggregate {
                genre: "Action".to_string(),
                release_year: 2015,
                total_playtime: 800,
            },
            GenreYearAggregate {
                genre: "Indie".to_string(),
                release_year: 2012,
                total_playtime: 42,
            },
        ];

        write_genre_year(&rows, &path).unwrap();
        let loaded = read_genre_year(&path).unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn rankings_round_trip_preserves_unset_positions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rankings.parquet");
        let rows = vec![
            RankingEntry {
                year: 2010,
                position: Some(1),
                title: "First".to_string(),
                polarity: false,
            },
            RankingEntry {
                year: 2010,
                position: None,
                title: "Second".to_string(),
                polarity: false,
            },
        ];

        write_rankings(&rows, &path).unwrap();
        let loaded = read_rankings(&path, false).unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn sentiment_round_trips_with_label_codes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sentiment.parquet");
        let rows = vec![SentimentHistogramEntry {
            year: 2013,
            label: SentimentLabel::Positive,
            count: 7,
        }];

        write_sentiment_histogram(&rows, &path).unwrap();
        assert_eq!(read_sentiment_histogram(&path).unwrap(), rows);
    }

    #[test]
    fn similarity_artifacts_round_trip() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        let items = vec![
            IndexedItem {
                title: "Half-Life".to_string(),
                item_id: 1,
            },
            IndexedItem {
                title: "Portal".to_string(),
                item_id: 3,
            },
        ];
        let matrix = vec![vec![1.0, 0.25], vec![0.25, 1.0]];
        let index = SimilarityIndex::from_parts(items, matrix);

        write_similarity(&index, &paths).unwrap();
        let loaded = read_similarity(&paths.similarity_matrix).unwrap();

        assert_eq!(loaded.items(), index.items());
        assert_eq!(loaded.matrix(), index.matrix());
    }
}
