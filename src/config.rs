use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{JenkinsError, Result};

/// Configuration file structure for the Jenkins client.
///
/// Holds the server connection, plugin download settings and output
/// preferences so they do not have to be repeated on every invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Jenkins server connection
    #[serde(default)]
    pub jenkins: JenkinsConfig,

    /// Plugin download and upload settings
    #[serde(default)]
    pub plugin: PluginConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JenkinsConfig {
    /// Jenkins root URL, including any context path
    #[serde(default = "default_jenkins_url")]
    pub url: String,

    /// User name for basic auth
    pub username: Option<String>,

    /// API token (or password) for basic auth
    pub token: Option<String>,

    /// Log every request and response status
    #[serde(default)]
    pub debug: bool,

    /// Per-request timeout applied by the HTTP client
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginConfig {
    /// Download versioned plugins from the mirror instead of the update center
    #[serde(default)]
    pub use_mirror: bool,

    /// Mirror root replacing the update center download prefix
    #[serde(default = "default_mirror_url")]
    pub mirror_url: String,

    /// Update center download prefix
    #[serde(default = "default_update_center_url")]
    pub update_center_url: String,

    /// Show a progress bar while uploading plugin packages
    #[serde(default)]
    pub show_progress: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            url: default_jenkins_url(),
            username: None,
            token: None,
            debug: false,
            timeout_secs: None,
        }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            use_mirror: false,
            mirror_url: default_mirror_url(),
            update_center_url: default_update_center_url(),
            show_progress: false,
        }
    }
}

fn default_jenkins_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_mirror_url() -> String {
    "https://mirrors.tuna.tsinghua.edu.cn/jenkins/".to_string()
}

fn default_update_center_url() -> String {
    "https://updates.jenkins-ci.org/download/".to_string()
}

const CANDIDATES: [&str; 4] = ["jclient.toml", "jclient.json", "jclient.yaml", "jclient.yml"];

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path (must exist)
    /// 2. ./jclient.toml, ./jclient.json, ./jclient.yaml, ./jclient.yml
    /// 3. `<config dir>/jclient/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let found = CANDIDATES
            .iter()
            .map(PathBuf::from)
            .chain(user_config_path())
            .find(|path| path.exists());

        match found {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            JenkinsError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        let parse_error =
            |e: &dyn std::fmt::Display| JenkinsError::Config(format!("{}: {e}", path.display()));

        match extension {
            "toml" => toml::from_str(&contents).map_err(|e| parse_error(&e)),
            "json" => serde_json::from_str(&contents).map_err(|e| parse_error(&e)),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| parse_error(&e)),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .map_err(|e| parse_error(&e)),
        }
    }

    /// Save configuration to a file, format chosen by extension (TOML default).
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)
                .map_err(|e| JenkinsError::Config(format!("Failed to encode TOML: {e}")))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jclient").join("config.toml"))
}
