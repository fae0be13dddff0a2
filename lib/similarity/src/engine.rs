//! Similarity engine
//!
//! An [`Engine`] owns a reconciled catalog and the TF-IDF [`VectorSpace`]
//! fitted over its composite documents. It answers three kinds of queries:
//!
//! - by title: the first item whose title contains the query
//!   (case-insensitive) is the seed, every other item is ranked against it
//! - by tag: every item whose tags contain the tag is a seed; each seed
//!   nominates its own top-k neighbors and a candidate keeps the highest
//!   score any seed gave it
//! - by tags: as by tag, over the deduplicated union of seeds
//!
//! Matching is plain substring containment. Ranking is by descending score
//! with ties broken by catalog order, so results are fully deterministic.
//! The engine is immutable after [`Engine::build`] and safe to share across
//! threads.

use crate::catalog::{Catalog, CatalogItem};
use crate::config::EngineConfig;
use crate::fuse::fuse;
use ahash::AHashMap;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use reelmatch_core::{Error, Result, TfidfVectorizer, VectorSpace};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::time::Instant;
use tracing::{debug, info};

/// One ranked result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: usize,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub tags: String,
    pub description: String,
    pub release_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    pub similarity_score: f32,
}

impl Recommendation {
    fn new(item: &CatalogItem, score: f32) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            kind: item.kind.clone(),
            tags: item.tags.clone(),
            description: item.description.clone(),
            release_year: item.release_year,
            poster_url: (!item.poster_url.is_empty()).then(|| item.poster_url.clone()),
            similarity_score: score,
        }
    }
}

/// Ranked results plus the seed items they were derived from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    /// Seed ids in catalog order
    pub seeds: Vec<usize>,
    pub results: Vec<Recommendation>,
}

impl Recommendations {
    #[inline]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.title.as_str()).collect()
    }
}

/// Summary of a finished build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub items: usize,
    pub vocabulary_size: usize,
    pub nnz: usize,
    /// No term survived vectorization; every cross-item score is zero
    pub degenerate: bool,
}

/// Immutable recommendation engine over one catalog
#[derive(Debug)]
pub struct Engine {
    items: Vec<CatalogItem>,
    space: VectorSpace,
    fingerprint: String,
    stats: BuildStats,
}

impl Engine {
    /// Run the build pipeline: fuse every item, fit the vector space.
    ///
    /// Deterministic for a given catalog and config.
    pub fn build(catalog: Catalog, config: &EngineConfig) -> Self {
        let start = Instant::now();
        let (mut items, fingerprint) = catalog.into_items();

        items.par_iter_mut().for_each(|item| {
            item.composite_document = fuse(item, &config.fusion);
        });

        let documents: Vec<&str> = items.iter().map(|i| i.composite_document.as_str()).collect();
        let space = TfidfVectorizer::new(config.vectorizer.clone()).fit_transform(&documents);

        let stats = BuildStats {
            items: items.len(),
            vocabulary_size: space.n_terms(),
            nnz: space.nnz(),
            degenerate: space.is_degenerate(),
        };

        info!(
            items = stats.items,
            terms = stats.vocabulary_size,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Engine built"
        );

        Self {
            items,
            space,
            fingerprint,
            stats,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn item(&self, id: usize) -> Option<&CatalogItem> {
        self.items.get(id)
    }

    pub fn space(&self) -> &VectorSpace {
        &self.space
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Every distinct tag in the catalog, sorted
    pub fn all_tags(&self) -> Vec<String> {
        crate::catalog::all_tags(&self.items)
    }

    /// Fingerprint of the catalog this engine was built from
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Cosine similarity between two items, in `[0, 1]`.
    ///
    /// `similarity(i, i)` is exactly 1.0; unknown ids score 0.0.
    pub fn similarity(&self, a: usize, b: usize) -> f32 {
        self.space.cosine(a, b)
    }

    /// Id of the first item whose title contains `query`, ignoring case
    pub fn find_title(&self, query: &str) -> Option<usize> {
        let needle = query.to_lowercase();
        self.items
            .iter()
            .position(|item| item.title.to_lowercase().contains(&needle))
    }

    /// Ids of items whose tags contain any of `tags`, ignoring case.
    ///
    /// Tags match as given, surrounding whitespace included; blank tags are
    /// skipped. Ids are unique and in catalog order.
    pub fn tag_seeds<S: AsRef<str>>(&self, tags: &[S]) -> Vec<usize> {
        let needles: Vec<String> = tags
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_lowercase)
            .collect();
        if needles.is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|item| {
                let haystack = item.tags.to_lowercase();
                needles.iter().any(|n| haystack.contains(n.as_str()))
            })
            .map(|item| item.id)
            .collect()
    }

    /// Top `k` items most similar to `id`, excluding `id` itself
    pub fn neighbors(&self, id: usize, k: usize) -> Vec<(usize, f32)> {
        if id >= self.items.len() || k == 0 {
            return Vec::new();
        }
        let scored = self
            .space
            .similarity_row(id)
            .into_iter()
            .enumerate()
            .filter(|&(other, _)| other != id)
            .collect();
        top_k(scored, k)
    }

    /// Recommend items similar to the first title matching `query`
    pub fn recommend_by_title(&self, query: &str, k: usize) -> Result<Recommendations> {
        let seed = self
            .find_title(query)
            .ok_or_else(|| Error::ItemNotFound(query.to_string()))?;

        debug!(query, seed, title = %self.items[seed].title, k, "Title query resolved");

        Ok(Recommendations {
            seeds: vec![seed],
            results: self.materialize(self.neighbors(seed, k)),
        })
    }

    /// Recommend items from the neighborhoods of every item tagged `tag`
    pub fn recommend_by_tag(&self, tag: &str, k: usize) -> Result<Recommendations> {
        let seeds = self.tag_seeds(&[tag]);
        if seeds.is_empty() {
            return Err(Error::NoMatch(format!("'{}'", tag.trim())));
        }
        Ok(self.aggregate(seeds, k))
    }

    /// Recommend items from the neighborhoods of every item carrying any of `tags`
    pub fn recommend_by_tags<S: AsRef<str>>(&self, tags: &[S], k: usize) -> Result<Recommendations> {
        if tags.iter().all(|t| t.as_ref().trim().is_empty()) {
            return Err(Error::NoTags);
        }
        let seeds = self.tag_seeds(tags);
        if seeds.is_empty() {
            let listed: Vec<&str> = tags.iter().map(|t| t.as_ref().trim()).collect();
            return Err(Error::NoMatch(format!("{listed:?}")));
        }
        Ok(self.aggregate(seeds, k))
    }

    /// Merge per-seed neighbor lists, keeping each candidate's best score
    fn aggregate(&self, seeds: Vec<usize>, k: usize) -> Recommendations {
        let per_seed: Vec<Vec<(usize, f32)>> =
            seeds.par_iter().map(|&seed| self.neighbors(seed, k)).collect();

        let mut best: AHashMap<usize, f32> = AHashMap::new();
        for (candidate, score) in per_seed.into_iter().flatten() {
            let entry = best.entry(candidate).or_insert(score);
            if score > *entry {
                *entry = score;
            }
        }

        debug!(seeds = seeds.len(), candidates = best.len(), k, "Aggregated tag neighborhoods");

        let ranked = top_k(best.into_iter().collect(), k);
        Recommendations {
            seeds,
            results: self.materialize(ranked),
        }
    }

    fn materialize(&self, ranked: Vec<(usize, f32)>) -> Vec<Recommendation> {
        ranked
            .into_iter()
            .filter_map(|(id, score)| self.items.get(id).map(|item| Recommendation::new(item, score)))
            .collect()
    }
}

/// The `k` best `(id, score)` pairs, by descending score then ascending id
fn top_k(mut scored: Vec<(usize, f32)>, k: usize) -> Vec<(usize, f32)> {
    if k == 0 {
        return Vec::new();
    }
    let key = |&(id, score): &(usize, f32)| (Reverse(OrderedFloat(score)), id);
    if scored.len() > k {
        scored.select_nth_unstable_by_key(k - 1, key);
        scored.truncate(k);
    }
    scored.sort_unstable_by_key(key);
    scored
}
