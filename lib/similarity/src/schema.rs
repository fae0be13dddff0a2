//! Catalog schema definitions
//!
//! Source catalogs come in more than one column layout: a "friendly" export
//! with snake_case names (`title`, `listed_in`, `release_year`, ...) and a
//! "raw" export with descriptive capitalized names (`Title`, `Genre`,
//! `Release Date`, ...). The [`CatalogSchema`] is a declarative mapping from
//! each canonical [`Attribute`] to the ordered list of source columns that may
//! feed it, plus the default used when no column or no value is available.
//! It is resolved once per load against the file's header row.

use reelmatch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fallback release year for rows with a missing or unparsable date
pub const DEFAULT_FALLBACK_YEAR: i32 = 2020;

/// Sentinel used for missing text attributes, including titles
pub const UNKNOWN: &str = "Unknown";

/// Canonical catalog attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Title,
    #[serde(rename = "type")]
    Kind,
    Tags,
    Cast,
    Director,
    Description,
    ReleaseYear,
    PosterUrl,
}

impl Attribute {
    /// Every attribute, in canonical column order
    pub const ALL: [Attribute; 8] = [
        Attribute::Title,
        Attribute::Kind,
        Attribute::Tags,
        Attribute::Cast,
        Attribute::Director,
        Attribute::Description,
        Attribute::ReleaseYear,
        Attribute::PosterUrl,
    ];

    /// Canonical column name
    pub fn canonical_name(self) -> &'static str {
        match self {
            Attribute::Title => "title",
            Attribute::Kind => "type",
            Attribute::Tags => "tags",
            Attribute::Cast => "cast",
            Attribute::Director => "director",
            Attribute::Description => "description",
            Attribute::ReleaseYear => "release_year",
            Attribute::PosterUrl => "poster_url",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Source columns accepted for one attribute, and its default
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMapping {
    /// Accepted source column names, most preferred first
    pub aliases: Vec<String>,

    /// Value used when no column or no value is available.
    /// Ignored for `release_year`, which uses [`CatalogSchema::fallback_year`].
    #[serde(default)]
    pub default: String,
}

impl FieldMapping {
    pub fn new(aliases: &[&str], default: &str) -> Self {
        Self {
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
            default: default.to_string(),
        }
    }
}

/// Declarative mapping from source columns to canonical attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogSchema {
    #[serde(default = "default_fields")]
    pub fields: BTreeMap<Attribute, FieldMapping>,

    #[serde(default = "default_fallback_year")]
    pub fallback_year: i32,
}

fn default_fields() -> BTreeMap<Attribute, FieldMapping> {
    BTreeMap::from([
        (Attribute::Title, FieldMapping::new(&["title", "Title"], UNKNOWN)),
        (Attribute::Kind, FieldMapping::new(&["type", "Series or Movie"], UNKNOWN)),
        (Attribute::Tags, FieldMapping::new(&["tags", "listed_in", "Genre"], UNKNOWN)),
        (Attribute::Cast, FieldMapping::new(&["cast", "Actors"], UNKNOWN)),
        (Attribute::Director, FieldMapping::new(&["director", "Director"], UNKNOWN)),
        (Attribute::Description, FieldMapping::new(&["description", "Summary"], UNKNOWN)),
        (Attribute::ReleaseYear, FieldMapping::new(&["release_year", "Release Date"], "")),
        (Attribute::PosterUrl, FieldMapping::new(&["poster_url", "Image"], "")),
    ])
}

fn default_fallback_year() -> i32 {
    DEFAULT_FALLBACK_YEAR
}

impl Default for CatalogSchema {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            fallback_year: DEFAULT_FALLBACK_YEAR,
        }
    }
}

impl CatalogSchema {
    /// Validate the schema
    /// - every attribute has a mapping with at least one alias
    /// - the fallback year is plausible
    pub fn validate(&self) -> Result<()> {
        for attr in Attribute::ALL {
            match self.fields.get(&attr) {
                None => {
                    return Err(Error::InvalidConfig(format!("schema has no mapping for '{attr}'")))
                }
                Some(mapping) if mapping.aliases.iter().all(|a| a.trim().is_empty()) => {
                    return Err(Error::InvalidConfig(format!("schema mapping for '{attr}' has no aliases")))
                }
                Some(_) => {}
            }
        }
        if !(1800..=2200).contains(&self.fallback_year) {
            return Err(Error::InvalidConfig(format!(
                "fallback_year {} is out of range",
                self.fallback_year
            )));
        }
        Ok(())
    }

    /// Default value for a text attribute
    pub fn default_for(&self, attr: Attribute) -> &str {
        self.fields.get(&attr).map_or("", |m| m.default.as_str())
    }

    /// Resolve every attribute against a header row.
    ///
    /// Header names are trimmed and a leading UTF-8 byte order mark is
    /// ignored. For each attribute the first alias present wins.
    pub fn resolve<'h, I>(&self, headers: I) -> ResolvedSchema
    where
        I: IntoIterator<Item = &'h str>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let columns = Attribute::ALL
            .iter()
            .map(|&attr| {
                let found = self.fields.get(&attr).and_then(|mapping| {
                    mapping.aliases.iter().find_map(|alias| {
                        headers
                            .iter()
                            .position(|h| h == alias)
                            .map(|idx| SourceColumn {
                                index: idx,
                                name: alias.clone(),
                            })
                    })
                });
                (attr, found)
            })
            .collect();

        ResolvedSchema { columns }
    }
}

/// A source column feeding a canonical attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    pub index: usize,
    pub name: String,
}

/// Outcome of resolving a [`CatalogSchema`] against one file's headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    columns: BTreeMap<Attribute, Option<SourceColumn>>,
}

impl ResolvedSchema {
    /// Column feeding `attr`, or `None` when the attribute is synthesized
    pub fn column(&self, attr: Attribute) -> Option<&SourceColumn> {
        self.columns.get(&attr).and_then(Option::as_ref)
    }

    /// Source column name per attribute
    pub fn sources(&self) -> BTreeMap<Attribute, Option<String>> {
        self.columns
            .iter()
            .map(|(attr, col)| (*attr, col.as_ref().map(|c| c.name.clone())))
            .collect()
    }
}
