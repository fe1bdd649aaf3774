//! CLI configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MIMEPARSE_CONFIG` (environment variable)
//! 2. `~/.config/mimeparse/config.toml` (Linux/macOS)
//!    `%APPDATA%\mimeparse\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! The library itself never reads this file; callers hand the parser a
//! [`ParseOptions`] built from [`ParserConfig`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::parser::{ParseOptions, MAX_DEPTH};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub parser: ParserConfig,
    pub export: ExportConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
}

/// Parser limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// How many levels of nested multipart are flattened.
    pub max_nesting_depth: usize,
}

/// Export defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where `extract` writes attachments when `-o` is not given.
    pub default_output_dir: Option<PathBuf>,
    /// Pretty-print JSON output by default.
    pub pretty_json: bool,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache_dir: None,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: MAX_DEPTH,
        }
    }
}

impl From<&ParserConfig> for ParseOptions {
    fn from(config: &ParserConfig) -> Self {
        Self {
            max_depth: config.max_nesting_depth,
        }
    }
}

impl Config {
    /// Engine options derived from the `[parser]` section.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::from(&self.parser)
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Config::default(),
    }
}

/// Load configuration from an explicit file, falling back to defaults.
pub fn load_config_from(path: &std::path::Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(cfg) => {
                tracing::info!(path = %path.display(), "Loaded config");
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to parse config, using defaults"
                );
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            Config::default()
        }
    }
}

/// Determine the config file path (env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MIMEPARSE_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("mimeparse").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mimeparse")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("mimeparse.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.parser.max_nesting_depth, 10);
        assert!(!cfg.export.pretty_json);
        assert_eq!(cfg.parse_options(), ParseOptions::default());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.parser.max_nesting_depth = 3;
        cfg.export.default_output_dir = Some(PathBuf::from("/tmp/out"));
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.parser.max_nesting_depth, 3);
        assert_eq!(parsed.export.default_output_dir, cfg.export.default_output_dir);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[parser]
max_nesting_depth = 2
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.parse_options().max_depth, 2);
        assert_eq!(cfg.general.log_level, "warn");
        assert!(cfg.general.cache_dir.is_none());
    }

    #[test]
    fn test_load_config_from_broken_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[parser\nmax_nesting_depth = ").expect("write");
        let cfg = load_config_from(&path);
        assert_eq!(cfg.parser.max_nesting_depth, MAX_DEPTH);
    }

    #[test]
    fn test_load_config_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_from(&dir.path().join("absent.toml"));
        assert_eq!(cfg.parse_options(), ParseOptions::default());
        assert!(cfg.export.default_output_dir.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[export]\npretty_json = true\n").expect("write");
        assert!(load_config_from(&path).export.pretty_json);
    }

    #[test]
    fn test_log_file_in_cache_dir() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/var/tmp/mp"));
        assert_eq!(log_file_path(&cfg), PathBuf::from("/var/tmp/mp/mimeparse.log"));
    }
}
