//! TF-IDF vector spaces
//!
//! [`TfidfVectorizer`] fits a term-weighting model over a corpus of
//! documents and produces one L2-normalized [`SparseVector`] per document,
//! packaged together with an inverted index as a [`VectorSpace`].
//!
//! Weighting follows the smoothed scheme:
//!
//! ```text
//! idf(t)    = ln((1 + N) / (1 + df(t))) + 1
//! w(t, d)   = count(t, d) * idf(t)
//! row(d)    = w(., d) / ||w(., d)||
//! ```
//!
//! Term selection is fully deterministic: candidate terms are filtered by
//! document frequency, capped at `max_features` by corpus-wide count (ties
//! broken lexicographically) and the surviving vocabulary is sorted, so two
//! fits over the same corpus produce bit-identical rows.

use crate::error::{Error, Result};
use crate::text::is_stop_word;
use crate::vector::SparseVector;
use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for [`TfidfVectorizer`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Maximum number of terms kept in the vocabulary
    pub max_features: usize,
    /// Smallest n-gram length, in tokens
    pub ngram_min: usize,
    /// Largest n-gram length, in tokens
    pub ngram_max: usize,
    /// A term must occur in at least this many documents
    pub min_df: usize,
    /// A term occurring in more than this fraction of documents is dropped
    pub max_df: f64,
    /// Remove English stop-words before building n-grams
    pub stop_words: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_min: 1,
            ngram_max: 2,
            min_df: 2,
            max_df: 0.8,
            stop_words: true,
        }
    }
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(Error::InvalidConfig("max_features must be positive".into()));
        }
        if self.ngram_min == 0 || self.ngram_min > self.ngram_max {
            return Err(Error::InvalidConfig(format!(
                "invalid ngram range ({}, {})",
                self.ngram_min, self.ngram_max
            )));
        }
        if self.min_df == 0 {
            return Err(Error::InvalidConfig("min_df must be at least 1".into()));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        Ok(())
    }
}

/// Fits a [`VectorSpace`] over a corpus
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
}

impl TfidfVectorizer {
    #[must_use]
    pub fn new(config: VectorizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Split a document into tokens: runs of two or more alphanumerics,
    /// lowercased, with stop-words removed when configured.
    pub fn tokenize(&self, doc: &str) -> Vec<String> {
        doc.split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.chars().count() >= 2)
            .map(str::to_lowercase)
            .filter(|s| !(self.config.stop_words && is_stop_word(s)))
            .collect()
    }

    /// Term counts for one document, over all configured n-gram lengths
    pub fn analyze(&self, doc: &str) -> AHashMap<String, u32> {
        let tokens = self.tokenize(doc);
        let mut counts = AHashMap::new();
        for n in self.config.ngram_min..=self.config.ngram_max {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                *counts.entry(window.join(" ")).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Fit the model and transform the corpus in one pass.
    ///
    /// Never fails on content: a corpus that leaves no term standing after
    /// the document-frequency filters yields an empty, degenerate space in
    /// which every row is all-zero.
    pub fn fit_transform<S: AsRef<str> + Sync>(&self, docs: &[S]) -> VectorSpace {
        let n_docs = docs.len();
        let counts: Vec<AHashMap<String, u32>> =
            docs.par_iter().map(|d| self.analyze(d.as_ref())).collect();

        // term -> (document frequency, corpus count)
        let mut stats: AHashMap<&str, (usize, u64)> = AHashMap::new();
        for doc in &counts {
            for (term, &count) in doc {
                let entry = stats.entry(term.as_str()).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += u64::from(count);
            }
        }

        let max_doc_count = (self.config.max_df * n_docs as f64).floor() as usize;
        let mut candidates: Vec<(&str, u64)> = stats
            .iter()
            .filter(|(_, &(df, _))| df >= self.config.min_df && df <= max_doc_count)
            .map(|(&term, &(_, total))| (term, total))
            .collect();
        let pruned = stats.len() - candidates.len();

        if candidates.len() > self.config.max_features {
            candidates.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            candidates.truncate(self.config.max_features);
        }

        let mut vocabulary: Vec<String> = candidates.iter().map(|(t, _)| (*t).to_string()).collect();
        vocabulary.sort_unstable();

        let n = n_docs as f64;
        let idf: Vec<f32> = vocabulary
            .iter()
            .map(|term| {
                let df = stats.get(term.as_str()).map_or(0, |s| s.0) as f64;
                (((1.0 + n) / (1.0 + df)).ln() + 1.0) as f32
            })
            .collect();

        let lookup: AHashMap<&str, u32> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i as u32))
            .collect();

        let rows: Vec<SparseVector> = counts
            .par_iter()
            .map(|doc| {
                let pairs = doc
                    .iter()
                    .filter_map(|(term, &count)| {
                        lookup
                            .get(term.as_str())
                            .map(|&idx| (idx, count as f32 * idf[idx as usize]))
                    })
                    .collect();
                SparseVector::from_pairs(pairs).normalized()
            })
            .collect();

        let space = VectorSpace::from_parts(vocabulary, idf, rows);

        if space.is_degenerate() {
            warn!(
                documents = n_docs,
                min_df = self.config.min_df,
                max_df = self.config.max_df,
                "Degenerate vocabulary: no term survived document-frequency filtering, all similarities will be zero"
            );
        } else {
            info!(
                documents = n_docs,
                terms = space.n_terms(),
                nnz = space.nnz(),
                "Fitted TF-IDF vector space"
            );
        }
        debug!(pruned, "Terms removed by df filters or max_features cap");

        space
    }
}

/// A fitted TF-IDF model and the document rows it produced.
///
/// Immutable once built. Rows are L2-normalized, so the dot product of two
/// rows is their cosine similarity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorSpace {
    vocabulary: Vec<String>,
    idf: Vec<f32>,
    rows: Vec<SparseVector>,
    /// term index -> (document, weight), documents ascending
    postings: Vec<Vec<(u32, f32)>>,
}

impl VectorSpace {
    fn from_parts(vocabulary: Vec<String>, idf: Vec<f32>, rows: Vec<SparseVector>) -> Self {
        let mut postings = vec![Vec::new(); vocabulary.len()];
        for (doc, row) in rows.iter().enumerate() {
            for (term, weight) in row.iter() {
                postings[term as usize].push((doc as u32, weight));
            }
        }
        Self {
            vocabulary,
            idf,
            rows,
            postings,
        }
    }

    /// Number of documents (rows)
    #[inline]
    pub fn n_docs(&self) -> usize {
        self.rows.len()
    }

    /// Vocabulary size (columns)
    #[inline]
    pub fn n_terms(&self) -> usize {
        self.vocabulary.len()
    }

    /// Stored non-zero weights across all rows
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(SparseVector::nnz).sum()
    }

    /// True when the vocabulary is empty.
    ///
    /// A degenerate space is still usable; every cross-document similarity
    /// is simply zero.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Sorted vocabulary
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f32] {
        &self.idf
    }

    pub fn term_index(&self, term: &str) -> Option<u32> {
        self.vocabulary
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
            .map(|i| i as u32)
    }

    pub fn row(&self, doc: usize) -> Option<&SparseVector> {
        self.rows.get(doc)
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// Cosine similarity between two rows, in `[0, 1]`.
    ///
    /// Out-of-range rows score 0.0; a row against itself scores exactly 1.0.
    pub fn cosine(&self, a: usize, b: usize) -> f32 {
        if a >= self.rows.len() || b >= self.rows.len() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }
        sanitize(self.rows[a].dot(&self.rows[b]))
    }

    /// Similarity of row `doc` against every row, as a dense vector.
    ///
    /// Accumulates over the postings of the terms `doc` actually has, in
    /// ascending term order, so `scores[j]` equals `cosine(doc, j)` bit for
    /// bit. The diagonal entry is pinned to 1.0.
    pub fn similarity_row(&self, doc: usize) -> Vec<f32> {
        let mut scores = vec![0.0f32; self.rows.len()];
        let Some(row) = self.rows.get(doc) else {
            return scores;
        };
        for (term, weight) in row.iter() {
            for &(other, other_weight) in &self.postings[term as usize] {
                scores[other as usize] += weight * other_weight;
            }
        }
        for score in &mut scores {
            *score = sanitize(*score);
        }
        scores[doc] = 1.0;
        scores
    }
}

/// Map NaN to 0.0 and clamp rounding overshoot into `[0, 1]`
#[inline]
fn sanitize(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<&'static str> {
        vec![
            "crime drama bryan cranston vince gilligan teacher turns crime",
            "crime drama bob odenkirk vince gilligan lawyer descent",
            "comedy steve carell greg daniels mockumentary office life",
        ]
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_single_chars() {
        let v = TfidfVectorizer::default();
        assert_eq!(v.tokenize("The x-files and THE wire"), vec!["files", "wire"]);
    }

    #[test]
    fn test_analyze_builds_bigrams() {
        let v = TfidfVectorizer::default();
        let counts = v.analyze("vince gilligan vince");
        assert_eq!(counts["vince"], 2);
        assert_eq!(counts["vince gilligan"], 1);
        assert_eq!(counts["gilligan vince"], 1);
        assert_eq!(counts.len(), 4);
    }

    #[test]
    fn test_df_filters() {
        let space = TfidfVectorizer::default().fit_transform(&corpus());
        // only terms shared by exactly two of three documents survive
        assert_eq!(
            space.vocabulary(),
            &["crime", "crime drama", "drama", "gilligan", "vince", "vince gilligan"]
        );
        assert!(space.row(2).unwrap().is_empty());
        assert!(!space.is_degenerate());
    }

    #[test]
    fn test_max_df_keeps_terms_at_the_limit() {
        // "shared" occurs in exactly 7 of 10 documents
        let docs: Vec<String> = (0..10)
            .map(|i| {
                let mut doc = String::from("pair");
                if i < 7 {
                    doc.push_str(" shared");
                }
                if i < 8 {
                    doc.push_str(" common");
                }
                doc
            })
            .collect();
        let config = VectorizerConfig {
            max_df: 0.7,
            ngram_max: 1,
            ..Default::default()
        };
        let space = TfidfVectorizer::new(config).fit_transform(&docs);
        assert_eq!(space.vocabulary(), &["shared"]);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let space = TfidfVectorizer::default().fit_transform(&corpus());
        assert!((space.row(0).unwrap().norm() - 1.0).abs() < 1e-6);
        assert!((space.row(1).unwrap().norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_idf_smoothing() {
        let space = TfidfVectorizer::default().fit_transform(&corpus());
        let idx = space.term_index("drama").unwrap() as usize;
        let expected = ((4.0f64 / 3.0).ln() + 1.0) as f32;
        assert!((space.idf()[idx] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let config = VectorizerConfig {
            max_features: 1,
            ..Default::default()
        };
        let space = TfidfVectorizer::new(config).fit_transform(&corpus());
        // "crime" occurs three times across the corpus
        assert_eq!(space.vocabulary(), &["crime"]);
    }

    #[test]
    fn test_degenerate_corpus() {
        let space = TfidfVectorizer::default().fit_transform(&["solitary document"]);
        assert!(space.is_degenerate());
        assert_eq!(space.n_docs(), 1);
        assert_eq!(space.cosine(0, 0), 1.0);

        let empty: Vec<String> = Vec::new();
        let space = TfidfVectorizer::default().fit_transform(&empty);
        assert!(space.is_degenerate());
        assert_eq!(space.n_docs(), 0);
    }

    #[test]
    fn test_similarity_row_matches_cosine() {
        let space = TfidfVectorizer::default().fit_transform(&corpus());
        for i in 0..3 {
            let row = space.similarity_row(i);
            for (j, score) in row.iter().enumerate() {
                assert_eq!(*score, space.cosine(i, j));
                assert_eq!(space.cosine(i, j), space.cosine(j, i));
            }
        }
        assert!(space.cosine(0, 1) > 0.5);
        assert_eq!(space.cosine(0, 2), 0.0);
        assert_eq!(space.cosine(0, 99), 0.0);
    }

    #[test]
    fn test_deterministic_fit() {
        let a = TfidfVectorizer::default().fit_transform(&corpus());
        let b = TfidfVectorizer::default().fit_transform(&corpus());
        assert_eq!(a, b);
    }

    #[test]
    fn test_config_validation() {
        assert!(VectorizerConfig::default().validate().is_ok());
        let bad = VectorizerConfig {
            ngram_min: 3,
            ngram_max: 2,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidConfig(_))));
        let bad = VectorizerConfig {
            max_df: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
