//! # reelmatch
//!
//! Content-based show and movie recommendations over an in-memory catalog.
//!
//! reelmatch fuses each item's tags, cast, director and synopsis into one
//! document, fits a TF-IDF model over the catalog and ranks items by cosine
//! similarity. No viewing history is involved: two items are similar when
//! their descriptions are.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! reelmatch --catalog data/netflix_sample.csv serve --port 8080
//! curl 'localhost:8080/recommend/title?q=breaking%20bad&k=5'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use reelmatch::prelude::*;
//!
//! let catalog = load_catalog("data/netflix_sample.csv").unwrap();
//! let tags = list_all_tags(&catalog);
//! let engine = build_engine(catalog);
//!
//! for rec in recommend_by_title(&engine, "Breaking Bad", 5).unwrap() {
//!     println!("{} ({:.4})", rec.title, rec.similarity_score);
//! }
//! let crime = recommend_by_tags(&engine, &["Crime", "Thrillers"], 10).unwrap();
//! # let _ = (tags, crime);
//! ```
//!
//! ## Crate Structure
//!
//! - [`reelmatch-core`](reelmatch_core) - Text normalization, sparse vectors, TF-IDF
//! - [`reelmatch-similarity`](reelmatch_similarity) - Catalog reconciliation, similarity engine, export
//! - [`reelmatch-api`](reelmatch_api) - REST query front

use std::path::Path;

// Re-export core types
pub use reelmatch_core::{
    normalize, Error, Result, SparseVector, TfidfVectorizer, VectorSpace, VectorizerConfig,
};

// Re-export the engine
pub use reelmatch_similarity::{
    Attribute, BuildStats, Catalog, CatalogItem, CatalogSchema, CatalogStats, Engine,
    EngineConfig, EngineHandle, FusionConfig, LoadReport, Recommendation, Recommendations,
};

// Re-export API
pub use reelmatch_api::RestApi;

/// Load a CSV catalog with the built-in schema.
///
/// Fails with [`Error::DatasetNotFound`] when the file cannot be read.
/// Missing or malformed values are replaced with defaults and reported as a
/// warning, never as an error.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    Catalog::load(path, &CatalogSchema::default())
}

/// Run the full build pipeline with the default configuration
pub fn build_engine(catalog: Catalog) -> Engine {
    Engine::build(catalog, &EngineConfig::default())
}

/// Items most similar to the first title containing `title`
pub fn recommend_by_title(engine: &Engine, title: &str, k: usize) -> Result<Vec<Recommendation>> {
    engine.recommend_by_title(title, k).map(|r| r.results)
}

/// Items from the neighborhoods of every item tagged `tag`
pub fn recommend_by_tag(engine: &Engine, tag: &str, k: usize) -> Result<Vec<Recommendation>> {
    engine.recommend_by_tag(tag, k).map(|r| r.results)
}

/// Items from the neighborhoods of every item carrying any of `tags`
pub fn recommend_by_tags<S: AsRef<str>>(
    engine: &Engine,
    tags: &[S],
    k: usize,
) -> Result<Vec<Recommendation>> {
    engine.recommend_by_tags(tags, k).map(|r| r.results)
}

/// Every distinct tag in the catalog, trimmed, deduplicated and sorted
pub fn list_all_tags(catalog: &Catalog) -> Vec<String> {
    catalog.all_tags()
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        build_engine, list_all_tags, load_catalog, recommend_by_tag, recommend_by_tags,
        recommend_by_title, Catalog, CatalogItem, Engine, EngineConfig, EngineHandle, Error,
        Recommendation, Result,
    };
}

/// CSV and JSON export of ranked results
pub mod export {
    pub use reelmatch_similarity::export::{
        export_csv, similarity_percentage, to_json, write_csv, EXPORT_COLUMNS,
    };
}
