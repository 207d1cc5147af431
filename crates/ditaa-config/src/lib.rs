//! Configuration management for ditaa-docs.
//!
//! Parses `ditaa.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Values are layered, highest precedence first:
//!
//! 1. CLI settings ([`CliSettings`])
//! 2. the config file
//! 3. renderer environment variables ([`RendererEnv`], read once at setup)
//! 4. built-in defaults
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in `docs.source_dir`,
//! `docs.output_dir`, `ditaa.command` and every `ditaa.args` entry.

mod expand;

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "ditaa.toml";

/// Environment variable naming the renderer executable.
pub const COMMAND_ENV_VAR: &str = "DITAA_CMD";

/// Environment variable holding colon-separated global renderer arguments.
pub const ARGS_ENV_VAR: &str = "DITAA_ARGS";

/// Default renderer executable.
pub const DEFAULT_COMMAND: &str = "ditaa";

/// Default image directory, relative to the output directory.
pub const DEFAULT_IMAGE_DIR: &str = "_images";

/// Default prefix of cached diagram file names.
pub const DEFAULT_PREFIX: &str = "ditaa";

/// Output formats understood by the writer.
const FORMATS: &[&str] = &["html", "markdown"];

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
    /// Override output format ("html" or "markdown").
    pub format: Option<String>,
    /// Override renderer executable.
    pub command: Option<String>,
    /// Override render logging.
    pub log_enabled: Option<bool>,
}

/// Renderer settings taken from the process environment.
///
/// Captured once when the configuration is set up; renders never consult the
/// environment again.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RendererEnv {
    /// Value of [`COMMAND_ENV_VAR`].
    pub command: Option<String>,
    /// Raw value of [`ARGS_ENV_VAR`] (colon-separated).
    pub args: Option<String>,
}

impl RendererEnv {
    /// Snapshot the renderer variables from the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            command: std::env::var(COMMAND_ENV_VAR).ok(),
            args: std::env::var(ARGS_ENV_VAR).ok(),
        }
    }

    /// Global arguments split on `:`, empty segments dropped.
    #[must_use]
    pub fn split_args(&self) -> Vec<String> {
        self.args
            .as_deref()
            .map(|raw| {
                raw.split(':')
                    .filter(|arg| !arg.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Renderer configuration as written in the file.
    ditaa: DitaaConfigRaw,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved renderer configuration (set after loading).
    #[serde(skip)]
    pub ditaa_resolved: DitaaConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."), &RendererEnv::default())
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    format: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default, Clone)]
pub struct DocsConfig {
    /// Source directory for markdown files.
    pub source_dir: PathBuf,
    /// Build output directory.
    pub output_dir: PathBuf,
    /// Output format name ("html" or "markdown").
    pub format: String,
}

/// Raw renderer configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DitaaConfigRaw {
    command: Option<String>,
    args: Option<Vec<String>>,
    log_enabled: Option<bool>,
    image_dir: Option<String>,
    prefix: Option<String>,
}

/// Resolved renderer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DitaaConfig {
    /// Renderer executable name or path.
    pub command: String,
    /// Global arguments passed before per-diagram options.
    pub args: Vec<String>,
    /// Log each diagram that is actually rendered.
    pub log_enabled: bool,
    /// Image directory, relative to the output directory.
    pub image_dir: String,
    /// File name prefix for cached artifacts.
    pub prefix: String,
}

impl DitaaConfig {
    fn from_env(env: &RendererEnv) -> Self {
        Self {
            command: env
                .command
                .clone()
                .unwrap_or_else(|| DEFAULT_COMMAND.to_owned()),
            args: env.split_args(),
            ..Self::default()
        }
    }
}

impl Default for DitaaConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_owned(),
            args: Vec::new(),
            log_enabled: true,
            image_dir: DEFAULT_IMAGE_DIR.to_owned(),
            prefix: DEFAULT_PREFIX.to_owned(),
        }
    }
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
        /// Config field path (e.g., "`ditaa.command`").
        field: String,
        /// Error message (e.g., "${`DITAA_HOME`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `ditaa.toml` in current directory and parents.
    /// The renderer environment variables are read here, once.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, cli_settings, &RendererEnv::from_process())
    }

    /// Same as [`load`](Self::load) with an explicit renderer environment.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with_env(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
        env: &RendererEnv,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path, env)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered, env)?
        } else {
            let cwd = std::env::current_dir().unwrap_or_default();
            Self::default_with_base(&cwd, env)
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.docs_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(format) = &settings.format {
            self.docs_resolved.format.clone_from(format);
        }
        if let Some(command) = &settings.command {
            self.ditaa_resolved.command.clone_from(command);
        }
        if let Some(log_enabled) = settings.log_enabled {
            self.ditaa_resolved.log_enabled = log_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path, env: &RendererEnv) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            ditaa: DitaaConfigRaw::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                output_dir: base.join("_build"),
                format: "html".to_owned(),
            },
            ditaa_resolved: DitaaConfig::from_env(env),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path, env: &RendererEnv) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir, env);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !FORMATS.contains(&self.docs_resolved.format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "docs.format must be one of {}, got '{}'",
                FORMATS.join(", "),
                self.docs_resolved.format
            )));
        }
        self.validate_ditaa()
    }

    fn validate_ditaa(&self) -> Result<(), ConfigError> {
        let ditaa = &self.ditaa_resolved;
        require_non_empty(&ditaa.command, "ditaa.command")?;
        require_non_empty(&ditaa.prefix, "ditaa.prefix")?;

        if ditaa.prefix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "ditaa.prefix cannot contain path separators".to_owned(),
            ));
        }

        // The image dir is joined onto the output dir and used in page URIs
        let escapes = Path::new(&ditaa.image_dir)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ConfigError::Validation(format!(
                "ditaa.image_dir must be a relative path inside the output directory, got '{}'",
                ditaa.image_dir
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.docs.source_dir {
            self.docs.source_dir = Some(expand::expand_env(dir, "docs.source_dir")?);
        }
        if let Some(ref dir) = self.docs.output_dir {
            self.docs.output_dir = Some(expand::expand_env(dir, "docs.output_dir")?);
        }
        if let Some(ref command) = self.ditaa.command {
            self.ditaa.command = Some(expand::expand_env(command, "ditaa.command")?);
        }
        if let Some(ref args) = self.ditaa.args {
            self.ditaa.args = Some(expand::expand_env_list(args, "ditaa.args")?);
        }
        Ok(())
    }

    /// Resolve relative paths and fill unset values from env and defaults.
    fn resolve(&mut self, config_dir: &Path, env: &RendererEnv) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
            output_dir: resolve(self.docs.output_dir.as_deref(), "_build"),
            format: self
                .docs
                .format
                .clone()
                .unwrap_or_else(|| "html".to_owned()),
        };

        let fallback = DitaaConfig::from_env(env);
        self.ditaa_resolved = DitaaConfig {
            command: self.ditaa.command.clone().unwrap_or(fallback.command),
            args: self.ditaa.args.clone().unwrap_or(fallback.args),
            log_enabled: self.ditaa.log_enabled.unwrap_or(fallback.log_enabled),
            image_dir: self.ditaa.image_dir.clone().unwrap_or(fallback.image_dir),
            prefix: self.ditaa.prefix.clone().unwrap_or(fallback.prefix),
        };
    }
}
