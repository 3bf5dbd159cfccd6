//! Dev pipeline configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use hotcomp_cache::DEFAULT_CAPACITY;
use hotcomp_compiler::CompileOptions;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::PipelineError;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Configuration for the dev pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevConfig {
    /// Whether unchanged files are served from the artifact cache.
    #[serde(default = "default_use_transform_cache")]
    pub use_transform_cache: bool,

    /// Maximum number of cached artifacts.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Request path patterns to include.
    #[serde(default)]
    pub include: Vec<String>,

    /// Request path patterns to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// File extensions handled by the compiler.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Log verbosity.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Options forwarded to the compiler.
    #[serde(default = "CompileOptions::dev")]
    pub compiler: CompileOptions,

    /// Directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_use_transform_cache() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_extensions() -> Vec<String> {
    vec![".svelte".to_string()]
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// No output at all.
    Silent,
}

impl LogLevel {
    /// Returns the matching `EnvFilter` directive.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Silent => "off",
        }
    }
}

impl DevConfig {
    /// Configuration file names, in lookup order.
    pub const CONFIG_FILES: &'static [&'static str] = &["hotcomp.json", ".hotcomp.json"];

    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            use_transform_cache: true,
            cache_capacity: DEFAULT_CAPACITY,
            include: Vec::new(),
            exclude: Vec::new(),
            extensions: default_extensions(),
            log_level: LogLevel::Info,
            compiler: CompileOptions::dev(),
            base_dir: None,
        }
    }

    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| PipelineError::config(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json(&content)?;

        if let Some(parent) = path.parent() {
            config.base_dir = Some(parent.to_path_buf());
        }

        Ok(config)
    }

    /// Looks for one of `CONFIG_FILES` in `dir` and loads the first one found.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Option<Self>, PipelineError> {
        let dir = dir.as_ref();
        for name in Self::CONFIG_FILES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Self::from_file(candidate).map(Some);
            }
        }
        Ok(None)
    }

    /// Parses configuration from JSON string with schema validation.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| PipelineError::config(format!("Invalid JSON: {}", e)))?;

        let schema = CONFIG_SCHEMA.get_or_init(|| {
            let schema_json: serde_json::Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded config schema");
            Validator::new(&schema_json).expect("Invalid config schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            let error_msg = format!("{} at {}", e, e.instance_path());
            return Err(PipelineError::config(format!(
                "Config validation failed: {}",
                error_msg
            )));
        }

        let mut config: Self = serde_json::from_value(value)
            .map_err(|e| PipelineError::config(format!("Invalid config: {}", e)))?;
        config.normalize();
        Ok(config)
    }

    /// Cleans up the extension list.
    ///
    /// `.html` is dropped because the dev transform cannot serve it, missing
    /// leading dots are added, and an empty list falls back to the default.
    pub fn normalize(&mut self) {
        if self.extensions.iter().any(|ext| ext == ".html" || ext == "html") {
            warn!("the .html extension is not supported by the dev transform and will be ignored");
            self.extensions.retain(|ext| ext != ".html" && ext != "html");
        }

        for ext in &mut self.extensions {
            if !ext.starts_with('.') {
                ext.insert(0, '.');
            }
        }

        if self.extensions.is_empty() {
            self.extensions = default_extensions();
        }

        self.cache_capacity = self.cache_capacity.max(1);
    }

    /// Computes a hash of the configuration.
    pub fn hash(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

impl Default for DevConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::tempdir;

    #[test]
    fn test_config_new() {
        let config = DevConfig::new();
        assert!(config.use_transform_cache);
        assert_eq!(config.cache_capacity, 10_000);
        assert_eq!(config.extensions, vec![".svelte".to_string()]);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.compiler.dev);
    }

    #[test]
    fn test_config_from_empty_json_matches_default() {
        let config = DevConfig::from_json("{}").unwrap();
        let default = DevConfig::default();

        assert_eq!(config.use_transform_cache, default.use_transform_cache);
        assert_eq!(config.cache_capacity, default.cache_capacity);
        assert_eq!(config.extensions, default.extensions);
        assert_eq!(config.compiler, default.compiler);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "useTransformCache": false,
            "cacheCapacity": 64,
            "include": ["src/**"],
            "exclude": ["**/node_modules/**"],
            "extensions": [".svelte", ".svx"],
            "logLevel": "debug",
            "compiler": { "hot": false, "customElement": true }
        }"#;

        let config = DevConfig::from_json(json).unwrap();

        assert!(!config.use_transform_cache);
        assert_eq!(config.cache_capacity, 64);
        assert_eq!(config.include, vec!["src/**".to_string()]);
        assert_eq!(config.exclude.len(), 1);
        assert_eq!(config.extensions.len(), 2);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.compiler.hot);
        assert!(config.compiler.extra.contains_key("customElement"));
    }

    #[test]
    fn test_config_drops_html_extension() {
        let json = r#"{ "extensions": [".svelte", ".html"] }"#;
        let config = DevConfig::from_json(json).unwrap();
        assert_eq!(config.extensions, vec![".svelte".to_string()]);
    }

    #[test]
    fn test_config_adds_leading_dot() {
        let json = r#"{ "extensions": ["svx"] }"#;
        let config = DevConfig::from_json(json).unwrap();
        assert_eq!(config.extensions, vec![".svx".to_string()]);
    }

    #[test]
    fn test_config_only_html_falls_back_to_default() {
        let json = r#"{ "extensions": [".html"] }"#;
        let config = DevConfig::from_json(json).unwrap();
        assert_eq!(config.extensions, vec![".svelte".to_string()]);
    }

    #[rstest]
    #[case::unknown_property(r#"{ "useTransformCach": true }"#, "Config validation failed")]
    #[case::type_mismatch(r#"{ "useTransformCache": "yes" }"#, "Config validation failed")]
    #[case::zero_capacity(r#"{ "cacheCapacity": 0 }"#, "Config validation failed")]
    #[case::invalid_log_level(r#"{ "logLevel": "verbose" }"#, "Config validation failed")]
    #[case::invalid_json(r#"{ "include": [ "#, "Invalid JSON")]
    fn test_config_validation_errors(#[case] json: &str, #[case] expected_error_part: &str) {
        let result = DevConfig::from_json(json);
        assert!(result.is_err(), "Expected error for JSON: {}", json);
        let err = result.unwrap_err();
        assert!(
            err.to_string().contains(expected_error_part),
            "Error message '{}' should contain '{}'",
            err,
            expected_error_part
        );
    }

    #[rstest]
    #[case(LogLevel::Debug, "debug")]
    #[case(LogLevel::Info, "info")]
    #[case(LogLevel::Warn, "warn")]
    #[case(LogLevel::Error, "error")]
    #[case(LogLevel::Silent, "off")]
    fn test_log_level_filter(#[case] level: LogLevel, #[case] expected: &str) {
        assert_eq!(level.as_filter(), expected);
    }

    #[test]
    fn test_config_from_file_sets_base_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hotcomp.json");
        fs::write(&path, r#"{ "cacheCapacity": 5 }"#).unwrap();

        let config = DevConfig::from_file(&path).unwrap();

        assert_eq!(config.cache_capacity, 5);
        assert_eq!(config.base_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_config_discover() {
        let dir = tempdir().unwrap();
        assert!(DevConfig::discover(dir.path()).unwrap().is_none());

        fs::write(dir.path().join(".hotcomp.json"), r#"{ "logLevel": "warn" }"#).unwrap();
        let config = DevConfig::discover(dir.path()).unwrap().unwrap();
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_config_hash_changes_with_content() {
        let a = DevConfig::new();
        let mut b = DevConfig::new();
        b.cache_capacity = 1;

        assert_eq!(a.hash(), DevConfig::new().hash());
        assert_ne!(a.hash(), b.hash());
    }
}
