//! Engine configuration
//!
//! Everything that shapes a build lives in one serde struct so it can be kept
//! in a JSON file next to the catalog. Every section has defaults; a file
//! only needs the keys it overrides.

use crate::fuse::FusionConfig;
use crate::schema::CatalogSchema;
use reelmatch_core::{Result, VectorizerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub vectorizer: VectorizerConfig,
    pub fusion: FusionConfig,
    pub schema: CatalogSchema,
}

impl EngineConfig {
    /// Read and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.schema.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelmatch_core::Error;
    use std::io::Write;

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "vectorizer": {{ "max_features": 100 }}, "fusion": {{ "include_defaults": true }} }}"#
        )
        .unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.vectorizer.max_features, 100);
        assert_eq!(config.vectorizer.min_df, 2);
        assert!(config.fusion.include_defaults);
        assert_eq!(config.schema, CatalogSchema::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "vectorizer": {{ "min_df": 0 }} }}"#).unwrap();
        assert!(matches!(
            EngineConfig::from_file(file.path()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            EngineConfig::from_file(file.path()),
            Err(Error::Serialization(_))
        ));
    }
}
