// iislens - platform/config.rs
//
// Platform path resolution and config.toml loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use std::path::{Path, PathBuf};

/// Resolved platform paths for iislens configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/iislens/ or %APPDATA%\iislens\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[discovery]` section.
    pub discovery: DiscoverySection,
    /// `[filter]` section.
    pub filter: FilterSection,
    /// `[export]` section.
    pub export: ExportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Maximum directory recursion depth.
    pub max_depth: Option<usize>,
    /// Maximum files to discover per scan.
    pub max_files: Option<usize>,
    /// Include glob patterns.
    pub include_patterns: Option<Vec<String>>,
    /// Exclude glob patterns.
    pub exclude_patterns: Option<Vec<String>>,
}

/// `[filter]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FilterSection {
    /// Default account allow-list, comma-separated. The CLI flag overrides.
    pub accounts: Option<String>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Default export format: "csv" or "json". The CLI flag overrides.
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: trace, debug, info, warn, error.
    pub level: Option<String>,
}

/// Load and validate config.toml from `path`.
///
/// A missing file is not an error: defaults apply. A present-but-invalid
/// file IS an error — silently ignoring a typo'd config leads to confusing
/// behaviour.
pub fn load_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(RawConfig::default());
        }
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let config: RawConfig = toml::from_str(&text).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    validate(&config)?;
    tracing::debug!(path = %path.display(), "Config loaded");
    Ok(config)
}

/// Startup validation: reject values that cannot be clamped meaningfully.
fn validate(config: &RawConfig) -> Result<(), ConfigError> {
    if let Some(max_files) = config.discovery.max_files {
        if max_files == 0 {
            return Err(ConfigError::ValueOutOfRange {
                field: "discovery.max_files".to_string(),
                value: "0".to_string(),
                expected: format!("1..={}", constants::ABSOLUTE_MAX_FILES),
            });
        }
    }

    if let Some(ref format) = config.export.format {
        if format != "csv" && format != "json" {
            return Err(ConfigError::ValueOutOfRange {
                field: "export.format".to_string(),
                value: format.clone(),
                expected: "csv or json".to_string(),
            });
        }
    }

    if let Some(ref level) = config.logging.level {
        let known = ["trace", "debug", "info", "warn", "error"];
        if !known.contains(&level.as_str()) {
            return Err(ConfigError::ValueOutOfRange {
                field: "logging.level".to_string(),
                value: level.clone(),
                expected: known.join(", "),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.toml")).unwrap();
        assert!(config.filter.accounts.is_none());
        assert!(config.export.format.is_none());
        assert!(config.discovery.max_files.is_none());
    }

    #[test]
    fn test_full_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[discovery]
max_depth = 3
max_files = 42
include_patterns = ["*.log"]

[filter]
accounts = "user42, user99"

[export]
format = "json"

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.filter.accounts.as_deref(), Some("user42, user99"));
        assert_eq!(config.export.format.as_deref(), Some("json"));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.discovery.max_depth, Some(3));
        assert_eq!(config.discovery.max_files, Some(42));
        assert_eq!(
            config.discovery.include_patterns,
            Some(vec!["*.log".to_string()])
        );
    }

    #[test]
    fn test_unknown_keys_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[future_section]\nnew_key = true\n").unwrap();
        assert!(load_config(&path).is_ok());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid toml [[[").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::TomlParse { .. })
        ));
    }

    #[test]
    fn test_zero_max_files_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[discovery]\nmax_files = 0\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_unknown_export_format_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[export]\nformat = \"xlsx\"\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
    }
}
