//! Catalog statistics
//!
//! Aggregate counts over a catalog for dashboards: item types, tag
//! frequencies and release years.

use crate::catalog::CatalogItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub distinct_tags: usize,
    /// Most frequent tags, highest count first, ties alphabetical
    pub top_tags: Vec<(String, usize)>,
    pub by_year: BTreeMap<i32, usize>,
}

impl CatalogStats {
    pub fn compute(items: &[CatalogItem], top_n: usize) -> Self {
        let mut by_type = BTreeMap::new();
        let mut by_year = BTreeMap::new();
        let mut tag_counts: BTreeMap<&str, usize> = BTreeMap::new();

        for item in items {
            *by_type.entry(item.kind.clone()).or_insert(0) += 1;
            *by_year.entry(item.release_year).or_insert(0) += 1;
            for tag in item.tag_list() {
                *tag_counts.entry(tag).or_insert(0) += 1;
            }
        }

        let distinct_tags = tag_counts.len();
        let mut top_tags: Vec<(String, usize)> = tag_counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();
        // BTreeMap order is alphabetical, a stable sort keeps it for ties
        top_tags.sort_by(|a, b| b.1.cmp(&a.1));
        top_tags.truncate(top_n);

        Self {
            total: items.len(),
            by_type,
            distinct_tags,
            top_tags,
            by_year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute() {
        let items = vec![
            CatalogItem::new("a").with_kind("Movie").with_tags("Drama, Crime").with_release_year(2019),
            CatalogItem::new("b").with_kind("Series").with_tags("Comedy, Drama").with_release_year(2019),
            CatalogItem::new("c").with_kind("Movie").with_tags("Crime").with_release_year(2021),
        ];
        let stats = CatalogStats::compute(&items, 2);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_type["Movie"], 2);
        assert_eq!(stats.distinct_tags, 3);
        assert_eq!(
            stats.top_tags,
            vec![("Crime".to_string(), 2), ("Drama".to_string(), 2)]
        );
        assert_eq!(stats.by_year[&2019], 2);
        assert_eq!(stats.by_year[&2021], 1);
    }

    #[test]
    fn test_empty() {
        let stats = CatalogStats::compute(&[], 10);
        assert_eq!(stats, CatalogStats::default());
    }
}
