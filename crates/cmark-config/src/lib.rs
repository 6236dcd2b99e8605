//! Configuration for the cmark HTML renderer.
//!
//! Parses `cmark.toml` files with serde and provides auto-discovery of the
//! file in the current directory and its parents. Every section and field is
//! optional; missing values fall back to the renderer defaults.
//!
//! ```toml
//! [html]
//! softbreak = "\n"
//! escape_html = false
//! sanitize_urls = true
//! percent_encode_urls = true
//! omit_single_paragraph_p = false
//! allowed_protocols = ["http", "https", "mailto", "data"]
//!
//! [extensions]
//! enabled = ["tables", "strikethrough"]
//!
//! [heading_anchor]
//! id_prefix = ""
//! id_suffix = ""
//! default_id = "id"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "cmark.toml";

/// Renderer configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTML output options.
    pub html: HtmlConfig,
    /// Enabled extensions.
    pub extensions: ExtensionsConfig,
    /// Heading anchor extension options.
    pub heading_anchor: HeadingAnchorConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// HTML output options.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HtmlConfig {
    /// Text emitted for soft line breaks.
    pub softbreak: String,
    /// Escape raw HTML instead of passing it through.
    pub escape_html: bool,
    /// Drop link and image URLs with protocols outside `allowed_protocols`.
    pub sanitize_urls: bool,
    /// Percent-encode link and image URLs.
    pub percent_encode_urls: bool,
    /// Drop the `<p>` around a document made of a single paragraph.
    pub omit_single_paragraph_p: bool,
    /// Protocols kept by URL sanitization.
    pub allowed_protocols: Vec<String>,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            softbreak: "\n".to_owned(),
            escape_html: false,
            sanitize_urls: false,
            percent_encode_urls: false,
            omit_single_paragraph_p: false,
            allowed_protocols: ["http", "https", "mailto", "data"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Extension selection.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Extension names, applied in order.
    pub enabled: Vec<String>,
}

/// Heading anchor extension options.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeadingAnchorConfig {
    /// Prepended to every generated id.
    pub id_prefix: String,
    /// Appended to every generated id.
    pub id_suffix: String,
    /// Id for headings without usable text.
    pub default_id: String,
}

impl Default for HeadingAnchorConfig {
    fn default() -> Self {
        Self {
            id_prefix: String::new(),
            id_suffix: String::new(),
            default_id: "id".to_owned(),
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
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `cmark.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if reading,
    /// parsing or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        let discovered = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd));
        match discovered {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading
        config.validate()?;

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
        self.validate_html()?;
        self.validate_heading_anchor()?;
        Ok(())
    }

    fn validate_html(&self) -> Result<(), ConfigError> {
        for protocol in &self.html.allowed_protocols {
            require_non_empty(protocol, "html.allowed_protocols entry")?;
            if protocol.contains(':') {
                return Err(ConfigError::Validation(format!(
                    "html.allowed_protocols entry `{protocol}` must not contain ':'"
                )));
            }
        }
        Ok(())
    }

    fn validate_heading_anchor(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.heading_anchor.default_id, "heading_anchor.default_id")
    }
}
