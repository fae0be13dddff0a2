//! Catalog loading and schema reconciliation
//!
//! Reads a CSV catalog, maps its columns onto the canonical attributes with a
//! [`CatalogSchema`] and repairs missing or malformed values with defaults.
//! Individual rows are never rejected: a bad cell degrades to its
//! attribute's default, and only an unreadable source fails the load.

use crate::schema::{Attribute, CatalogSchema, ResolvedSchema};
use chrono::{Datelike, NaiveDate};
use reelmatch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Date layouts seen in raw catalog exports
const DATE_FORMATS: &[&str] = &[
    "%d-%b-%y",
    "%d-%b-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// One reconciled catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Row position in the loaded catalog
    pub id: usize,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Comma-delimited genre/category labels
    pub tags: String,
    pub cast: String,
    pub director: String,
    pub description: String,
    pub release_year: i32,
    pub poster_url: String,

    /// Fused, normalized document. Filled when an engine is built.
    #[serde(skip)]
    pub composite_document: String,

    /// Attributes that were filled with defaults during reconciliation
    #[serde(skip)]
    defaulted: BTreeSet<Attribute>,
}

impl CatalogItem {
    /// A new item with every attribute except the title defaulted
    pub fn new(title: impl Into<String>) -> Self {
        let schema = CatalogSchema::default();
        Self {
            id: 0,
            title: title.into(),
            kind: schema.default_for(Attribute::Kind).to_string(),
            tags: schema.default_for(Attribute::Tags).to_string(),
            cast: schema.default_for(Attribute::Cast).to_string(),
            director: schema.default_for(Attribute::Director).to_string(),
            description: schema.default_for(Attribute::Description).to_string(),
            release_year: schema.fallback_year,
            poster_url: String::new(),
            composite_document: String::new(),
            defaulted: [
                Attribute::Kind,
                Attribute::Tags,
                Attribute::Cast,
                Attribute::Director,
                Attribute::Description,
                Attribute::ReleaseYear,
                Attribute::PosterUrl,
            ]
            .into_iter()
            .collect(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self.defaulted.remove(&Attribute::Kind);
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self.defaulted.remove(&Attribute::Tags);
        self
    }

    pub fn with_cast(mut self, cast: impl Into<String>) -> Self {
        self.cast = cast.into();
        self.defaulted.remove(&Attribute::Cast);
        self
    }

    pub fn with_director(mut self, director: impl Into<String>) -> Self {
        self.director = director.into();
        self.defaulted.remove(&Attribute::Director);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self.defaulted.remove(&Attribute::Description);
        self
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = year;
        self.defaulted.remove(&Attribute::ReleaseYear);
        self
    }

    pub fn with_poster_url(mut self, url: impl Into<String>) -> Self {
        self.poster_url = url.into();
        self.defaulted.remove(&Attribute::PosterUrl);
        self
    }

    /// Whether `attr` holds a default rather than source data
    #[inline]
    pub fn is_defaulted(&self, attr: Attribute) -> bool {
        self.defaulted.contains(&attr)
    }

    pub fn defaulted(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.defaulted.iter().copied()
    }

    /// Individual tags: split on commas, trimmed, blanks dropped
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags.split(',').map(str::trim).filter(|t| !t.is_empty())
    }
}

/// What happened while reconciling a source file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub rows: usize,
    /// Source column used per attribute, `None` when synthesized
    pub sources: BTreeMap<Attribute, Option<String>>,
    /// Number of rows that received the default, per attribute
    pub defaults: BTreeMap<Attribute, usize>,
    /// The file was not valid UTF-8 and was decoded as Latin-1
    pub latin1_fallback: bool,
}

impl LoadReport {
    pub fn total_defaults(&self) -> usize {
        self.defaults.values().sum()
    }

    /// Attributes that received defaults: `(attribute, source column, rows)`.
    ///
    /// The column is `None` when the file has no column for the attribute and
    /// every row was synthesized.
    pub fn substitutions(&self) -> impl Iterator<Item = (Attribute, Option<&str>, usize)> + '_ {
        self.defaults
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(&attr, &count)| {
                let column = self.sources.get(&attr).and_then(|c| c.as_deref());
                (attr, column, count)
            })
    }

    fn log_substitutions(&self) {
        for (attr, column, count) in self.substitutions() {
            match column {
                Some(column) => warn!(
                    attribute = %attr,
                    column = %column,
                    rows = count,
                    "Filled missing values with default"
                ),
                None => warn!(
                    attribute = %attr,
                    rows = count,
                    "No source column, attribute filled with default"
                ),
            }
        }
    }
}

/// An ordered, reconciled set of catalog items
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    report: LoadReport,
    fingerprint: String,
}

impl Catalog {
    /// Load a CSV catalog from disk.
    ///
    /// Fails with [`Error::DatasetNotFound`] when the file cannot be read.
    pub fn load(path: impl AsRef<Path>, schema: &CatalogSchema) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::DatasetNotFound {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let catalog = Self::from_bytes(&bytes, schema)?;
        info!(
            path = %path.display(),
            items = catalog.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Load a CSV catalog from any reader
    pub fn from_reader<R: Read>(mut reader: R, schema: &CatalogSchema) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes, schema)
    }

    fn from_bytes(bytes: &[u8], schema: &CatalogSchema) -> Result<Self> {
        let (text, latin1_fallback) = match std::str::from_utf8(bytes) {
            Ok(text) => (text.to_string(), false),
            Err(_) => {
                warn!("Catalog is not valid UTF-8, decoding as Latin-1");
                (bytes.iter().map(|&b| char::from(b)).collect(), true)
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers().map_err(|e| Error::Csv(e.to_string()))?.clone();
        let resolved = schema.resolve(headers.iter());

        let mut items = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::Csv(e.to_string()))?;
            let id = items.len();
            items.push(reconcile_row(id, &record, &resolved, schema));
        }

        let report = LoadReport {
            sources: resolved.sources(),
            latin1_fallback,
            ..Self::summarize(&items)
        };
        report.log_substitutions();

        Ok(Self {
            fingerprint: fingerprint(&items),
            items,
            report,
        })
    }

    /// Build a catalog from already-reconciled items.
    ///
    /// Ids are reassigned to row positions.
    pub fn from_items(mut items: Vec<CatalogItem>) -> Self {
        for (id, item) in items.iter_mut().enumerate() {
            item.id = id;
            item.composite_document.clear();
        }
        let report = Self::summarize(&items);
        Self {
            fingerprint: fingerprint(&items),
            items,
            report,
        }
    }

    fn summarize(items: &[CatalogItem]) -> LoadReport {
        let mut defaults: BTreeMap<Attribute, usize> =
            Attribute::ALL.iter().map(|&a| (a, 0)).collect();
        for item in items {
            for attr in item.defaulted() {
                *defaults.entry(attr).or_insert(0) += 1;
            }
        }
        LoadReport {
            rows: items.len(),
            sources: BTreeMap::new(),
            defaults,
            latin1_fallback: false,
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

    pub fn get(&self, id: usize) -> Option<&CatalogItem> {
        self.items.get(id)
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// SHA-256 over the canonical fields of every item, in order
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Every distinct tag, trimmed and sorted
    pub fn all_tags(&self) -> Vec<String> {
        all_tags(&self.items)
    }

    pub(crate) fn into_items(self) -> (Vec<CatalogItem>, String) {
        (self.items, self.fingerprint)
    }
}

/// Distinct tags across `items`: split on commas, trimmed, sorted
pub fn all_tags(items: &[CatalogItem]) -> Vec<String> {
    items
        .iter()
        .flat_map(CatalogItem::tag_list)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn reconcile_row(
    id: usize,
    record: &csv::StringRecord,
    resolved: &ResolvedSchema,
    schema: &CatalogSchema,
) -> CatalogItem {
    let mut defaulted = BTreeSet::new();

    let cell = |attr: Attribute| {
        resolved
            .column(attr)
            .and_then(|col| record.get(col.index))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let mut text = |attr: Attribute| -> String {
        match cell(attr) {
            Some(value) => value.to_string(),
            None => {
                defaulted.insert(attr);
                schema.default_for(attr).to_string()
            }
        }
    };

    let title = text(Attribute::Title);
    let kind = text(Attribute::Kind);
    let tags = text(Attribute::Tags);
    let cast = text(Attribute::Cast);
    let director = text(Attribute::Director);
    let description = text(Attribute::Description);
    let poster_url = text(Attribute::PosterUrl);

    let release_year = match cell(Attribute::ReleaseYear).and_then(parse_year) {
        Some(year) => year,
        None => {
            defaulted.insert(Attribute::ReleaseYear);
            schema.fallback_year
        }
    };

    CatalogItem {
        id,
        title,
        kind,
        tags,
        cast,
        director,
        description,
        release_year,
        poster_url,
        composite_document: String::new(),
        defaulted,
    }
}

/// Parse a year from a bare number (`2019`, `2019.0`) or a full date
pub fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    if let Ok(year) = value.parse::<i32>() {
        return Some(year);
    }
    if let Ok(year) = value.parse::<f64>() {
        if year.is_finite() && year.fract() == 0.0 && year.abs() < 10_000.0 {
            return Some(year as i32);
        }
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|date| date.year())
}

fn fingerprint(items: &[CatalogItem]) -> String {
    let mut hasher = Sha256::new();
    for item in items {
        for field in [
            item.title.as_str(),
            item.kind.as_str(),
            item.tags.as_str(),
            item.cast.as_str(),
            item.director.as_str(),
            item.description.as_str(),
            item.poster_url.as_str(),
        ] {
            hasher.update(field.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update(item.release_year.to_le_bytes());
        for attr in item.defaulted() {
            hasher.update(attr.canonical_name().as_bytes());
        }
        hasher.update([0x1e]);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRIENDLY: &str = "\
title,type,listed_in,cast,director,description,release_year
Breaking Bad,TV Show,\"Crime, Drama\",Bryan Cranston,Vince Gilligan,A teacher turns to crime.,2008
Better Call Saul,TV Show,\"Crime, Drama\",Bob Odenkirk,,A lawyer's descent.,
";

    const RAW: &str = "\
Title,Genre,Actors,Summary,Series or Movie,Release Date,Image
The Office,Comedy,Steve Carell,Mockumentary about office life.,Series,24-Mar-05,https://img/office.jpg
Dark,\"Sci-Fi, Thriller\",,Time travel in a small town.,Series,not a date,
";

    fn load(csv: &str) -> Catalog {
        Catalog::from_reader(csv.as_bytes(), &CatalogSchema::default()).unwrap()
    }

    #[test]
    fn test_substitutions_cover_missing_columns() {
        let catalog = load(FRIENDLY);
        let subs: Vec<_> = catalog.report().substitutions().collect();
        assert!(subs.contains(&(Attribute::Director, Some("director"), 1)));
        // no poster column at all: every row is synthesized and still reported
        assert!(subs.contains(&(Attribute::PosterUrl, None, 2)));
        assert!(subs.iter().all(|&(_, _, rows)| rows > 0));
    }

    #[test]
    fn test_friendly_schema() {
        let catalog = load(FRIENDLY);
        assert_eq!(catalog.len(), 2);

        let bb = catalog.get(0).unwrap();
        assert_eq!(bb.id, 0);
        assert_eq!(bb.tags, "Crime, Drama");
        assert_eq!(bb.kind, "TV Show");
        assert_eq!(bb.release_year, 2008);
        assert_eq!(bb.poster_url, "");
        assert!(bb.is_defaulted(Attribute::PosterUrl));
        assert!(!bb.is_defaulted(Attribute::Cast));

        let bcs = catalog.get(1).unwrap();
        assert_eq!(bcs.director, "Unknown");
        assert!(bcs.is_defaulted(Attribute::Director));
        assert_eq!(bcs.release_year, 2020);

        let report = catalog.report();
        assert_eq!(report.sources[&Attribute::Tags].as_deref(), Some("listed_in"));
        assert_eq!(report.sources[&Attribute::PosterUrl], None);
        assert_eq!(report.defaults[&Attribute::Director], 1);
        assert_eq!(report.defaults[&Attribute::PosterUrl], 2);
    }

    #[test]
    fn test_raw_schema() {
        let catalog = load(RAW);
        let office = catalog.get(0).unwrap();
        assert_eq!(office.title, "The Office");
        assert_eq!(office.kind, "Series");
        assert_eq!(office.tags, "Comedy");
        assert_eq!(office.release_year, 2005);
        assert_eq!(office.poster_url, "https://img/office.jpg");
        // no director column in this layout
        assert_eq!(office.director, "Unknown");

        let dark = catalog.get(1).unwrap();
        assert_eq!(dark.cast, "Unknown");
        assert_eq!(dark.release_year, 2020);
        assert!(dark.is_defaulted(Attribute::ReleaseYear));
    }

    #[test]
    fn test_missing_title_column_uses_sentinel() {
        let catalog = load("name,listed_in\nFoo,Drama\n");
        assert_eq!(catalog.get(0).unwrap().title, "Unknown");
        assert!(catalog.get(0).unwrap().is_defaulted(Attribute::Title));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let catalog = load("title,listed_in,cast\nShort Row\nFull,Drama,Someone\n");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().tags, "Unknown");
        assert_eq!(catalog.get(1).unwrap().cast, "Someone");
    }

    #[test]
    fn test_latin1_fallback() {
        let mut bytes = b"title,listed_in\nAm".to_vec();
        bytes.push(0xe9); // 'é' in Latin-1
        bytes.extend_from_slice(b"lie,Romance\n");
        let catalog = Catalog::from_reader(bytes.as_slice(), &CatalogSchema::default()).unwrap();
        assert_eq!(catalog.get(0).unwrap().title, "Amélie");
        assert!(catalog.report().latin1_fallback);
    }

    #[test]
    fn test_missing_file() {
        let err = Catalog::load("/definitely/not/here.csv", &CatalogSchema::default()).unwrap_err();
        assert!(matches!(err, Error::DatasetNotFound { .. }));
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year("2019.0"), Some(2019));
        assert_eq!(parse_year("01-May-20"), Some(2020));
        assert_eq!(parse_year("January 01, 2015"), Some(2015));
        assert_eq!(parse_year("Jan 01, 2015"), Some(2015));
        assert_eq!(parse_year("2015-06-30"), Some(2015));
        assert_eq!(parse_year("06/30/2015"), Some(2015));
        assert_eq!(parse_year("30 Jun 2015"), Some(2015));
        assert_eq!(parse_year("soon"), None);
        assert_eq!(parse_year("2019.5"), None);
    }

    #[test]
    fn test_all_tags_sorted_unique() {
        let catalog = load(FRIENDLY);
        assert_eq!(catalog.all_tags(), vec!["Crime", "Drama"]);

        let catalog = Catalog::from_items(vec![
            CatalogItem::new("a").with_tags("Drama,  Comedy ,"),
            CatalogItem::new("b").with_tags("Comedy, Action"),
        ]);
        assert_eq!(catalog.all_tags(), vec!["Action", "Comedy", "Drama"]);
    }

    #[test]
    fn test_from_items_assigns_ids() {
        let catalog = Catalog::from_items(vec![CatalogItem::new("a"), CatalogItem::new("b")]);
        assert_eq!(catalog.get(1).unwrap().id, 1);
        assert_eq!(catalog.report().defaults[&Attribute::Tags], 2);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = load(FRIENDLY);
        let b = load(FRIENDLY);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        assert_ne!(a.fingerprint(), load(RAW).fingerprint());
    }
}
