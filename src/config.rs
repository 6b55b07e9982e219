//! Region registry configuration.
//!
//! A TOML file lists the regions and the two searchable column names:
//!
//! ```toml
//! data_dir = "/srv/rolls/2002"
//!
//! [fields]
//! primary = "FM_NAME_V2"
//! related = "RLN_FM_NM_V2"
//!
//! [[regions]]
//! label = "116 - திருப்பூர் (Tiruppur)"
//! file = "AC_116_Tiruppur.parquet"
//! ```
//!
//! Relative `file` entries resolve against `data_dir`; `s3://` URLs and
//! absolute paths are used as given. Without a config file the built-in
//! Tiruppur district list is used.

use std::fs;
use std::path::{Path, PathBuf};
use serde::Deserialize;
use crate::ParquetSource;
use crate::error::ConfigError;

/// Column names of the two searchable fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchFields {
    /// Voter name column.
    pub primary: String,
    /// Father / husband name column.
    pub related: String,
}

impl Default for SearchFields {
    fn default() -> Self {
        Self {
            primary: "FM_NAME_V2".to_string(),
            related: "RLN_FM_NM_V2".to_string(),
        }
    }
}

/// One `[[regions]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionEntry {
    /// Display label, conventionally starting with the numeric constituency code.
    pub label: String,
    /// Parquet file name, path or `s3://` URL.
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryConfig {
    /// Directory that relative region files resolve against.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub fields: SearchFields,
    #[serde(default)]
    pub regions: Vec<RegionEntry>,
}

/// Tiruppur district assembly constituencies, 2002 rolls.
const TIRUPPUR_REGIONS: &[(&str, &str)] = &[
    ("102 - அவினாசி (தனி) (Avanashi (SC))", "AC_102_Avanashi.parquet"),
    ("111 - உடுமலைப்பேட்டை (Udumalpet)", "AC_111_Udumalpet.parquet"),
    ("112 - தாராபுரம் (தனி) (Dharapuram (SC))", "AC_112_Dharapuram.parquet"),
    ("113 - வெள்ளகோவில் (Vellakoil)", "AC_113_Vellakovil.parquet"),
    ("114 - பொங்கலூர் (Pongalur)", "AC_114_Pongalur.parquet"),
    ("115 - பல்லடம் (Palladam)", "AC_115_Palladam.parquet"),
    ("116 - திருப்பூர் (Tiruppur)", "AC_116_Tiruppur.parquet"),
    ("117 - காங்கேயம் (Kangayam)", "AC_117_Kangayam.parquet"),
];

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            fields: SearchFields::default(),
            regions: TIRUPPUR_REGIONS.iter()
                .map(|(label, file)| RegionEntry {
                    label: label.to_string(),
                    file: file.to_string(),
                })
                .collect(),
        }
    }
}

impl RegistryConfig {
    /// Parses a config from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        if config.regions.is_empty() {
            return Err(ConfigError::NoRegions { path: path.to_path_buf() });
        }
        if config.fields.primary == config.fields.related {
            return Err(ConfigError::SameSearchColumn {
                path: path.to_path_buf(),
                column: config.fields.primary,
            });
        }
        Ok(config)
    }

    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Resolves a region's `file` entry to a loader source.
    pub fn source_for(&self, entry: &RegionEntry) -> ParquetSource {
        let file = entry.file.as_str();
        if file.contains("://") || Path::new(file).is_absolute() {
            return ParquetSource::Path(file.to_string());
        }
        match &self.data_dir {
            Some(dir) => ParquetSource::Path(dir.join(file).to_string_lossy().to_string()),
            None => ParquetSource::Path(file.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_tiruppur_district() {
        let config = RegistryConfig::default();
        assert_eq!(config.regions.len(), 8);
        assert_eq!(config.fields.primary, "FM_NAME_V2");
        assert_eq!(config.fields.related, "RLN_FM_NM_V2");
        assert!(config.regions.iter().any(|r| r.file == "AC_116_Tiruppur.parquet"));
    }

    #[test]
    fn test_parse_full_config() {
        let text = r#"
            data_dir = "/srv/rolls"

            [fields]
            primary = "name"
            related = "relation"

            [[regions]]
            label = "7 - North"
            file = "north.parquet"

            [[regions]]
            label = "3 - South"
            file = "s3://rolls/south.parquet?anon=true"
        "#;
        let config = RegistryConfig::from_toml(text, Path::new("rolls.toml")).unwrap();
        assert_eq!(config.fields.primary, "name");
        assert_eq!(config.regions.len(), 2);

        match config.source_for(&config.regions[0]) {
            ParquetSource::Path(p) => assert_eq!(Path::new(&p), Path::new("/srv/rolls/north.parquet")),
            other => panic!("unexpected source {:?}", other),
        }
        match config.source_for(&config.regions[1]) {
            ParquetSource::Path(p) => assert_eq!(p, "s3://rolls/south.parquet?anon=true"),
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_fields_default_when_omitted() {
        let text = r#"
            [[regions]]
            label = "1 - Only"
            file = "only.parquet"
        "#;
        let config = RegistryConfig::from_toml(text, Path::new("rolls.toml")).unwrap();
        assert_eq!(config.fields, SearchFields::default());
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn test_no_regions_rejected() {
        let err = RegistryConfig::from_toml("data_dir = \"/x\"", Path::new("rolls.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NoRegions { .. }));
    }

    #[test]
    fn test_same_column_for_both_fields_rejected() {
        let text = r#"
            [fields]
            primary = "FM_NAME_V2"
            related = "FM_NAME_V2"

            [[regions]]
            label = "1 - Only"
            file = "only.parquet"
        "#;
        let err = RegistryConfig::from_toml(text, Path::new("rolls.toml")).unwrap_err();
        match err {
            ConfigError::SameSearchColumn { column, .. } => assert_eq!(column, "FM_NAME_V2"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_bad_toml_rejected() {
        let err = RegistryConfig::from_toml("[[regions]\nlabel=", Path::new("rolls.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn test_missing_file_reported() {
        let err = RegistryConfig::load(Path::new("/nonexistent/rolls.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
