//! Configuration management for the DFM renderer.
//!
//! Parses `dfm.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [markdown]
//! working_folder = "docs"
//! max_include_depth = 10
//! gfm = true
//!
//! [cache]
//! enabled = false
//! ```
//!
//! Host-side settings can be applied after loading via [`ConfigOverrides`].
//!
//! ## Environment Variable Expansion
//!
//! `markdown.working_folder` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//! - a leading `~` expands to the home directory

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "dfm.toml";

/// Default limit on nested inclusions.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 10;

/// Upper bound accepted for `markdown.max_include_depth`.
const MAX_INCLUDE_DEPTH_LIMIT: usize = 64;

/// Settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    /// Override the working folder.
    pub working_folder: Option<PathBuf>,
    /// Override the include depth limit.
    pub max_include_depth: Option<usize>,
    /// Override the cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown configuration (paths are relative strings from TOML).
    markdown: MarkdownConfigRaw,
    /// Content cache configuration.
    pub cache: CacheConfig,

    /// Resolved markdown configuration (set after loading).
    #[serde(skip)]
    pub markdown_resolved: MarkdownConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw markdown configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MarkdownConfigRaw {
    working_folder: Option<String>,
    max_include_depth: Option<usize>,
    gfm: Option<bool>,
}

/// Resolved markdown configuration with an absolute working folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownConfig {
    /// Directory `~/` include paths resolve against.
    pub working_folder: PathBuf,
    /// Maximum number of nested inclusions below a page.
    pub max_include_depth: usize,
    /// Whether tables, strikethrough and task lists are enabled.
    pub gfm: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            working_folder: PathBuf::from("docs"),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            gfm: true,
        }
    }
}

/// Content cache configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether included content is memoized by resolved path.
    pub enabled: bool,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`markdown.working_folder`").
        field: String,
        /// Error message (e.g., "${`DOCS_ROOT`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from a file.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `dfm.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or a value is out of range.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        match Self::discover_config() {
            Some(discovered) => Self::load_from_file(&discovered),
            None => {
                tracing::debug!("No dfm.toml found, using defaults");
                Ok(Self::default_with_cwd())
            }
        }
    }

    /// Apply overrides on top of the loaded values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if an overridden value is out of range.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(working_folder) = &overrides.working_folder {
            self.markdown_resolved
                .working_folder
                .clone_from(working_folder);
        }
        if let Some(depth) = overrides.max_include_depth {
            self.markdown_resolved.max_include_depth = depth;
        }
        if let Some(cache_enabled) = overrides.cache_enabled {
            self.cache.enabled = cache_enabled;
        }
        self.validate()
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            markdown: MarkdownConfigRaw::default(),
            cache: CacheConfig::default(),
            markdown_resolved: MarkdownConfig {
                working_folder: base.join("docs"),
                ..MarkdownConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            working_folder = %config.markdown_resolved.working_folder.display(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let markdown = &self.markdown_resolved;

        if markdown.working_folder.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "markdown.working_folder cannot be empty".to_owned(),
            ));
        }

        if !(1..=MAX_INCLUDE_DEPTH_LIMIT).contains(&markdown.max_include_depth) {
            return Err(ConfigError::Validation(format!(
                "markdown.max_include_depth must be between 1 and {MAX_INCLUDE_DEPTH_LIMIT}"
            )));
        }

        Ok(())
    }

    /// Expand and resolve raw values against the config directory.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let working_folder = match self.markdown.working_folder.as_deref() {
            Some(raw) => {
                let expanded = expand::expand_path(raw, "markdown.working_folder")?;
                if expanded.is_empty() {
                    PathBuf::new()
                } else {
                    config_dir.join(expanded)
                }
            }
            None => config_dir.join("docs"),
        };

        self.markdown_resolved = MarkdownConfig {
            working_folder,
            max_include_depth: self
                .markdown
                .max_include_depth
                .unwrap_or(DEFAULT_MAX_INCLUDE_DEPTH),
            gfm: self.markdown.gfm.unwrap_or(true),
        };

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(
            config.markdown_resolved.working_folder,
            PathBuf::from("/test/docs")
        );
        assert_eq!(config.markdown_resolved.max_include_depth, 10);
        assert!(config.markdown_resolved.gfm);
        assert!(!config.cache.enabled);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.markdown.working_folder.is_none());
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[markdown]
working_folder = "content"
max_include_depth = 4
gfm = false

[cache]
enabled = true
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve(Path::new("/project")).unwrap();

        assert_eq!(
            config.markdown_resolved,
            MarkdownConfig {
                working_folder: PathBuf::from("/project/content"),
                max_include_depth: 4,
                gfm: false,
            }
        );
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_absolute_working_folder_kept() {
        let toml = r#"
[markdown]
working_folder = "/srv/docs"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve(Path::new("/project")).unwrap();

        assert_eq!(
            config.markdown_resolved.working_folder,
            PathBuf::from("/srv/docs")
        );
    }

    #[test]
    fn test_working_folder_env_expansion() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("DFM_TEST_DOCS_ROOT", "/srv/site");
        }

        let toml = r#"
[markdown]
working_folder = "${DFM_TEST_DOCS_ROOT}/docs"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve(Path::new("/project")).unwrap();

        assert_eq!(
            config.markdown_resolved.working_folder,
            PathBuf::from("/srv/site/docs")
        );

        unsafe {
            std::env::remove_var("DFM_TEST_DOCS_ROOT");
        }
    }

    #[test]
    fn test_working_folder_missing_env_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DFM_TEST_MISSING_ROOT");
        }

        let toml = r#"
[markdown]
working_folder = "${DFM_TEST_MISSING_ROOT}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.resolve(Path::new("/project")).unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("DFM_TEST_MISSING_ROOT"));
    }

    #[test]
    fn test_unknown_field_type_is_parse_error() {
        let result: Result<Config, _> = toml::from_str("[markdown]\ngfm = \"yes\"\n");
        assert!(result.is_err());
    }

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_depth_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.markdown_resolved.max_include_depth = 0;
        assert_validation_error(&config, &["max_include_depth", "64"]);
    }

    #[test]
    fn test_validate_depth_too_high() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.markdown_resolved.max_include_depth = 65;
        assert_validation_error(&config, &["max_include_depth"]);
    }

    #[test]
    fn test_validate_depth_bounds_inclusive() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.markdown_resolved.max_include_depth = 1;
        assert!(config.validate().is_ok());
        config.markdown_resolved.max_include_depth = 64;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_working_folder() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.markdown_resolved.working_folder = PathBuf::new();
        assert_validation_error(&config, &["working_folder", "empty"]);
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = ConfigOverrides {
            working_folder: Some(PathBuf::from("/custom/docs")),
            cache_enabled: Some(true),
            ..Default::default()
        };

        config.apply_overrides(&overrides).unwrap();

        assert_eq!(
            config.markdown_resolved.working_folder,
            PathBuf::from("/custom/docs")
        );
        assert!(config.cache.enabled);
        assert_eq!(config.markdown_resolved.max_include_depth, 10); // Unchanged
    }

    #[test]
    fn test_apply_overrides_validates() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = ConfigOverrides {
            max_include_depth: Some(100),
            ..Default::default()
        };

        assert!(config.apply_overrides(&overrides).is_err());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/dfm.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dfm.toml");
        std::fs::write(&path, "[markdown]\nworking_folder = \"site\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(
            config.markdown_resolved.working_folder,
            dir.path().join("site")
        );
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_rejects_invalid_depth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dfm.toml");
        std::fs::write(&path, "[markdown]\nmax_include_depth = 0\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dfm.toml");
        std::fs::write(&path, "[markdown\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_discover_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("dfm.toml"), "").unwrap();

        let found = Config::discover_from(&nested).unwrap();

        assert_eq!(found, dir.path().join("dfm.toml"));
    }
}
