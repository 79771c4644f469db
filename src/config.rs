use crate::collate::{CollateOptions, OutputFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Output settings, loaded only from a file passed with `--config`.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct CollateConfig {
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub separator: String,
    pub sort: bool,
    pub include: Option<String>,
    pub skip_invalid: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            separator: ", ".to_string(),
            sort: false,
            include: None,
            skip_invalid: false,
        }
    }
}

impl CollateConfig {
    /// Load config from an explicitly requested file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");

        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Build collation options, compiling the include pattern.
    pub fn options(&self) -> Result<CollateOptions, ConfigError> {
        let include = match &self.output.include {
            Some(p) => Some(glob::Pattern::new(p).map_err(|e| ConfigError::Pattern {
                pattern: p.clone(),
                source: e,
            })?),
            None => None,
        };

        Ok(CollateOptions {
            format: self.output.format,
            separator: self.output.separator.clone(),
            sort: self.output.sort,
            include,
            skip_invalid: self.output.skip_invalid,
        })
    }
}

/// Errors from loading or interpreting the config file.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config {}: {source}", path.display())
            }
            ConfigError::Pattern { pattern, source } => {
                write!(f, "invalid include pattern {pattern:?}: {source}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Pattern { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            CollateConfig::load(&dir.path().join("collate.toml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn defaults_match_fixed_csv_output() {
        let cfg = CollateConfig::default();
        assert_eq!(cfg.output.format, OutputFormat::Csv);
        assert_eq!(cfg.output.separator, ", ");
        assert!(!cfg.output.sort);
        assert!(!cfg.output.skip_invalid);
        assert!(cfg.output.include.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("collate.toml");
        std::fs::write(&path, "[output]\nsort = true\n").unwrap();
        let cfg = CollateConfig::load(&path).unwrap();
        assert!(cfg.output.sort);
        assert_eq!(cfg.output.separator, ", ");
        assert_eq!(cfg.output.format, OutputFormat::Csv);
    }

    #[test]
    fn full_file_parses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("collate.toml");
        std::fs::write(
            &path,
            r#"
[output]
format = "jsonl"
separator = ";"
sort = true
include = "*.log"
skip_invalid = true
"#,
        )
        .unwrap();
        let cfg = CollateConfig::load(&path).unwrap();
        let opts = cfg.options().unwrap();
        assert_eq!(opts.format, OutputFormat::Jsonl);
        assert_eq!(opts.separator, ";");
        assert!(opts.sort);
        assert!(opts.skip_invalid);
        assert!(opts.include.unwrap().matches("run.log"));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("collate.toml");
        std::fs::write(&path, "[output\nsort = ").unwrap();
        assert!(matches!(
            CollateConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn unknown_format_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("collate.toml");
        std::fs::write(&path, "[output]\nformat = \"xml\"\n").unwrap();
        assert!(matches!(
            CollateConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn invalid_include_pattern_is_error() {
        let cfg = CollateConfig {
            output: OutputConfig {
                include: Some("[".to_string()),
                ..Default::default()
            },
        };
        assert!(matches!(cfg.options(), Err(ConfigError::Pattern { .. })));
    }
}
