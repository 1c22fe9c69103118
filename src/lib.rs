//! GameLens Pipeline Library
//!
//! Batch pipeline turning cleaned game-interaction tables into precomputed
//! aggregates and an item-to-item similarity index. This library exposes
//! the internal modules for testing and potential reuse.

pub mod aggregate;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod input;
pub mod lookup;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod similarity;

// Re-export commonly used types for convenience
pub use artifacts::ArtifactPaths;
pub use config::{AppConfig, CliConfig, FileConfig};
pub use error::PipelineError;
pub use lookup::LookupTables;
pub use pipeline::{load_inputs, run, write_artifacts, PipelineInputs, PipelineOutputs};
pub use reconcile::{HttpStorefrontFetcher, NullStorefrontFetcher, StorefrontFetcher};
pub use similarity::{SimilarItem, SimilarityIndex};
