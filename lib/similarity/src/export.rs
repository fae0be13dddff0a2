//! Ranked-result export
//!
//! A thin serialization of [`Recommendation`] lists to CSV or JSON.

use crate::engine::Recommendation;
use reelmatch_core::{Error, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Column order of the CSV export
pub const EXPORT_COLUMNS: [&str; 8] = [
    "rank",
    "title",
    "type",
    "tags",
    "release_year",
    "similarity_percentage",
    "poster_url",
    "description",
];

#[derive(Serialize)]
struct ExportRow<'a> {
    rank: usize,
    title: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    tags: &'a str,
    release_year: i32,
    similarity_percentage: String,
    poster_url: &'a str,
    description: &'a str,
}

/// Score as a whole percentage, truncated: `0.4567` becomes `"45%"`
pub fn similarity_percentage(score: f32) -> String {
    format!("{}%", (score * 100.0) as i32)
}

/// Write ranked results as CSV, ranks starting at 1
pub fn write_csv<W: Write>(results: &[Recommendation], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (i, rec) in results.iter().enumerate() {
        csv.serialize(ExportRow {
            rank: i + 1,
            title: &rec.title,
            kind: &rec.kind,
            tags: &rec.tags,
            release_year: rec.release_year,
            similarity_percentage: similarity_percentage(rec.similarity_score),
            poster_url: rec.poster_url.as_deref().unwrap_or(""),
            description: &rec.description,
        })
        .map_err(|e| Error::Csv(e.to_string()))?;
    }
    if results.is_empty() {
        csv.write_record(EXPORT_COLUMNS)
            .map_err(|e| Error::Csv(e.to_string()))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write ranked results as CSV to `path`
pub fn export_csv(results: &[Recommendation], path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(results, file)
}

/// Ranked results as pretty-printed JSON
pub fn to_json(results: &[Recommendation]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(title: &str, score: f32, poster: Option<&str>) -> Recommendation {
        Recommendation {
            id: 0,
            title: title.to_string(),
            kind: "Series".to_string(),
            tags: "Crime, Drama".to_string(),
            description: "A lawyer's descent.".to_string(),
            release_year: 2015,
            poster_url: poster.map(str::to_string),
            similarity_score: score,
        }
    }

    #[test]
    fn test_percentage_truncates() {
        assert_eq!(similarity_percentage(0.4567), "45%");
        assert_eq!(similarity_percentage(1.0), "100%");
        assert_eq!(similarity_percentage(0.0), "0%");
    }

    #[test]
    fn test_csv_layout() {
        let mut out = Vec::new();
        write_csv(
            &[rec("Better Call Saul", 0.8123, Some("https://img/bcs.jpg")), rec("The Office", 0.0, None)],
            &mut out,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], EXPORT_COLUMNS.join(","));
        assert_eq!(
            lines[1],
            "1,Better Call Saul,Series,\"Crime, Drama\",2015,81%,https://img/bcs.jpg,A lawyer's descent."
        );
        assert!(lines[2].starts_with("2,The Office,"));
        assert!(lines[2].contains(",0%,,"));
    }

    #[test]
    fn test_empty_csv_has_header() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), EXPORT_COLUMNS.join(","));
    }

    #[test]
    fn test_json_omits_missing_poster() {
        let json = to_json(&[rec("The Office", 0.25, None)]).unwrap();
        assert!(json.contains("\"type\": \"Series\""));
        assert!(!json.contains("poster_url"));
    }
}
