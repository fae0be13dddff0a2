//! # reelmatch Similarity
//!
//! Content-based recommendations over a tabular show/movie catalog.
//!
//! This crate reconciles heterogeneous catalog files onto one canonical
//! schema, fuses each item's text attributes into a composite document and
//! ranks items by TF-IDF cosine similarity.
//!
//! ## Features
//!
//! - **Catalog Schema**: Declarative column aliases and defaults per attribute
//! - **Reconciliation**: Missing or malformed cells degrade to defaults, rows are never dropped
//! - **Feature Fusion**: Tags, cast, director and description in one normalized document
//! - **Similarity Engine**: Title, tag and multi-tag queries with max-score aggregation
//! - **Engine Handle**: Lock-free reads with atomic swap on reload
//!
//! ## Example
//!
//! ```rust
//! use reelmatch_similarity::{Catalog, CatalogItem, Engine, EngineConfig};
//!
//! let catalog = Catalog::from_items(vec![
//!     CatalogItem::new("Breaking Bad")
//!         .with_tags("Crime, Drama")
//!         .with_director("Vince Gilligan"),
//!     CatalogItem::new("Better Call Saul")
//!         .with_tags("Crime, Drama")
//!         .with_director("Vince Gilligan"),
//!     CatalogItem::new("The Office").with_tags("Comedy"),
//! ]);
//!
//! let engine = Engine::build(catalog, &EngineConfig::default());
//! let recs = engine.recommend_by_title("breaking", 2).unwrap();
//! assert_eq!(recs.results[0].title, "Better Call Saul");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Catalog   │────>│    Fuse     │────>│   TF-IDF    │
//! │ (reconcile) │     │ (documents) │     │   Space     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                      ┌─────────────┐           │
//!                      │   Engine    │<──────────┘
//!                      │  (queries)  │
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │   Handle    │
//!                      │ (swap/read) │
//!                      └─────────────┘
//! ```

pub mod schema;
pub mod catalog;
pub mod fuse;
pub mod config;
pub mod engine;
pub mod handle;
pub mod stats;
pub mod export;

// Re-export main types for convenience
pub use schema::{Attribute, CatalogSchema, FieldMapping, DEFAULT_FALLBACK_YEAR, UNKNOWN};
pub use catalog::{all_tags, parse_year, Catalog, CatalogItem, LoadReport};
pub use fuse::{fuse, FusionConfig};
pub use config::EngineConfig;
pub use engine::{BuildStats, Engine, Recommendation, Recommendations};
pub use handle::EngineHandle;
pub use stats::CatalogStats;
pub use export::{export_csv, similarity_percentage, to_json, write_csv};
