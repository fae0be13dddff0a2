//! Feature fusion
//!
//! Builds the composite document for an item: `tags cast director
//! description`, in that order, run through [`normalize`].
//!
//! Attributes that were filled with a default during reconciliation
//! contribute an empty string unless [`FusionConfig::include_defaults`] is
//! set. Otherwise the sentinel "Unknown" would become one of the most common
//! terms in a sparse catalog and pull unrelated items together.

use crate::catalog::CatalogItem;
use crate::schema::Attribute;
use reelmatch_core::normalize;
use serde::{Deserialize, Serialize};

/// Attributes fused into the composite document, in order
pub const FUSED_ATTRIBUTES: [Attribute; 4] = [
    Attribute::Tags,
    Attribute::Cast,
    Attribute::Director,
    Attribute::Description,
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FusionConfig {
    /// Keep default sentinel values in the fused text
    pub include_defaults: bool,
}

/// Fuse an item's text attributes into its normalized composite document
pub fn fuse(item: &CatalogItem, config: &FusionConfig) -> String {
    let raw = FUSED_ATTRIBUTES
        .iter()
        .map(|&attr| {
            if !config.include_defaults && item.is_defaulted(attr) {
                return "";
            }
            match attr {
                Attribute::Tags => item.tags.as_str(),
                Attribute::Cast => item.cast.as_str(),
                Attribute::Director => item.director.as_str(),
                _ => item.description.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    normalize(Some(&raw))
}
