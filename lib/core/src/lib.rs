//! # reelmatch Core
//!
//! Core library for the reelmatch recommendation engine.
//!
//! This crate provides the text and vector-space building blocks:
//!
//! - [`normalize`] - Free-text normalization (lowercase, letters only, stop-words removed)
//! - [`SparseVector`] - Sparse `f32` vector with merge-based dot products
//! - [`TfidfVectorizer`] - Fits a TF-IDF model with n-grams and document-frequency filters
//! - [`VectorSpace`] - Immutable fitted model, L2-normalized rows and inverted postings
//!
//! ## Example
//!
//! ```rust
//! use reelmatch_core::{normalize, TfidfVectorizer, VectorizerConfig};
//!
//! let docs: Vec<String> = [
//!     "Crime, Drama. Vince Gilligan. A teacher turns to crime.",
//!     "Crime, Drama. Vince Gilligan. A lawyer's descent.",
//!     "Comedy. Greg Daniels. Mockumentary about office life.",
//! ]
//! .iter()
//! .map(|d| normalize(Some(d)))
//! .collect();
//!
//! let space = TfidfVectorizer::new(VectorizerConfig::default()).fit_transform(&docs);
//! assert!(space.cosine(0, 1) > space.cosine(0, 2));
//! ```

pub mod error;
pub mod text;
pub mod tfidf;
pub mod vector;

pub use error::{Error, Result};
pub use text::{is_stop_word, normalize, STOP_WORDS};
pub use tfidf::{TfidfVectorizer, VectorSpace, VectorizerConfig};
pub use vector::SparseVector;
