//! Configuration File Loading
//!
//! Handles loading and saving configuration files from the standard
//! locations, with TOML and JSON support and a fallback to defaults.

use super::{Config, PollPolicy};
use crate::credentials::SecretDigest;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "OMEGATERM_CONFIG";

/// Upper bound for the typed-line delay
const MAX_LINE_DELAY_MS: u64 = 10_000;

/// Configuration file loader
pub struct ConfigLoader {
    /// File named by the environment, tried as-is before the search paths
    explicit_path: Option<PathBuf>,
    /// Search paths for configuration files (without extension)
    search_paths: Vec<PathBuf>,
    /// Supported configuration file formats, in priority order
    supported_formats: Vec<ConfigFormat>,
    /// Current configuration file path (if loaded)
    current_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }

    /// Format for a path, defaulting to TOML for unknown extensions
    fn for_path(path: &Path) -> Self {
        super::utils::get_config_format(path).unwrap_or(ConfigFormat::Toml)
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Whether to fall back to the default config if none exists
    pub create_default: bool,
    /// Whether to validate configuration after loading
    pub validate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            create_default: true,
            validate: true,
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        let explicit_path = env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self {
            search_paths: Self::get_search_paths(explicit_path.as_deref()),
            explicit_path,
            supported_formats: vec![ConfigFormat::Toml, ConfigFormat::Json],
            current_path: None,
        }
    }

    /// Load configuration from the search paths
    pub fn load_with_options(&mut self, options: LoadOptions) -> Result<Config> {
        if let Some((path, config)) = self.find_and_load_config()? {
            debug!("Configuration found at {}", path.display());
            self.current_path = Some(path);

            if options.validate {
                self.validate_config(&config)?;
            }
            return Ok(config);
        }

        if options.create_default {
            let config = Config::default();
            if options.validate {
                self.validate_config(&config)?;
            }
            Ok(config)
        } else {
            Err(Error::ConfigNotFound)
        }
    }

    /// Load and validate a configuration file at an explicit path
    pub fn load_from_path(&mut self, path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(Error::ConfigLoadFailed {
                path: path.to_path_buf(),
                reason: "Configuration file does not exist".to_string(),
            });
        }

        let config = self.load_config_file(path, ConfigFormat::for_path(path))?;
        self.validate_config(&config)?;
        self.current_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Save configuration to a specific path, choosing the format by extension
    pub fn save_to_path(&self, config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let format = ConfigFormat::for_path(path);
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| {
                Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                }
            })?,
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })?
            }
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Find and load configuration from search paths
    fn find_and_load_config(&self) -> Result<Option<(PathBuf, Config)>> {
        if let Some(path) = self.explicit_path.as_ref().filter(|p| p.is_file()) {
            match self.load_config_file(path, ConfigFormat::for_path(path)) {
                Ok(config) => return Ok(Some((path.clone(), config))),
                Err(e) => warn!("Failed to load config from {}: {}", path.display(), e),
            }
        }

        for path in &self.search_paths {
            for format in &self.supported_formats {
                let config_path = path.with_extension(format.extension());

                if config_path.exists() {
                    match self.load_config_file(&config_path, *format) {
                        Ok(config) => return Ok(Some((config_path, config))),
                        Err(e) => {
                            warn!(
                                "Failed to load config from {}: {}",
                                config_path.display(),
                                e
                            );
                            continue;
                        }
                    }
                }
            }
        }

        Ok(None)
    }

    /// Load a specific configuration file
    fn load_config_file(&self, path: &Path, format: ConfigFormat) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        match format {
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                format: format.name().to_string(),
                reason: e.to_string(),
            }),
            ConfigFormat::Json => {
                serde_json::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Get default search paths for configuration files
    fn get_search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(explicit) = explicit {
            // Strip the extension so every supported format is probed
            paths.push(explicit.with_extension(""));
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("omegaterm").join("config"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".omegaterm").join("config"));
        }

        if let Ok(cwd) = env::current_dir() {
            paths.push(cwd.join("omegaterm"));
        }

        paths
    }

    /// Validate configuration
    pub fn validate_config(&self, config: &Config) -> Result<()> {
        if config.credentials.username.is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "credentials.username".to_string(),
                reason: "Username cannot be empty".to_string(),
            });
        }

        SecretDigest::parse(
            "credentials.password_digest",
            &config.credentials.password_digest,
        )?;
        SecretDigest::parse(
            "credentials.passcode_digest",
            &config.credentials.passcode_digest,
        )?;

        if config.feed.line_delay_ms > MAX_LINE_DELAY_MS {
            return Err(Error::ConfigValidationFailed {
                field: "feed.line_delay_ms".to_string(),
                reason: format!("Line delay cannot exceed {} ms", MAX_LINE_DELAY_MS),
            });
        }

        if config.status.endpoint.trim().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "status.endpoint".to_string(),
                reason: "Status endpoint cannot be empty".to_string(),
            });
        }

        if config.status.poll == PollPolicy::Continuous && config.status.poll_interval_secs == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "status.poll_interval_secs".to_string(),
                reason: "Poll interval must be greater than 0 for continuous polling".to_string(),
            });
        }

        if config.status.timeout_secs == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "status.timeout_secs".to_string(),
                reason: "Request timeout must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the current configuration file path
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// List all search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Clear all search paths and add a single path
    pub fn set_search_path(&mut self, path: PathBuf) {
        self.explicit_path = None;
        self.search_paths = vec![path];
    }

    /// Use `path` as the environment-named file, replacing the search paths
    pub fn set_explicit_path(&mut self, path: PathBuf) {
        self.search_paths = Self::get_search_paths(Some(&path));
        self.search_paths.truncate(1);
        self.explicit_path = Some(path);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
