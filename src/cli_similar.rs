//! One-shot query tool over a persisted similarity matrix artifact.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gamelens_pipeline::artifacts;
use gamelens_pipeline::similarity::SimilarItem;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the similarity_matrix.json artifact.
    pub matrix_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints the most similar items to the given title.
    /// The match is case-insensitive.
    Title { title: String },

    /// Prints the most similar items to the given item id.
    Id { item_id: u64 },
}

fn print_results(results: &[SimilarItem]) {
    for (rank, item) in results.iter().enumerate() {
        println!(
            "{}. {} (id {}, similarity {:.4})",
            rank + 1,
            item.title,
            item.item_id,
            item.similarity
        );
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let index = artifacts::read_similarity(&cli_args.matrix_path)
        .with_context(|| format!("Failed to load {:?}", cli_args.matrix_path))?;

    let results = match &cli_args.command {
        Command::Title { title } => index.similar_by_title(title)?,
        Command::Id { item_id } => index.similar_by_id(*item_id)?,
    };
    print_results(&results);
    Ok(())
}
