use std::fmt;

use serde::{Deserialize, Serialize};

/// A plugin installed on the server, from `/pluginManager/api/json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstalledPlugin {
    pub short_name: String,
    pub long_name: String,
    pub version: String,
    pub url: Option<String>,
    pub active: bool,
    pub enabled: bool,
    pub bundled: bool,
    pub deleted: bool,
    pub downgradable: bool,
    pub has_update: bool,
    pub pinned: bool,
    pub required_core_version: Option<String>,
    pub minimum_java_version: Option<String>,
    pub supports_dynamic_load: Option<String>,
    pub backup_version: Option<String>,
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dependency {
    pub short_name: String,
    pub version: String,
    pub optional: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct InstalledPluginList {
    pub plugins: Vec<InstalledPlugin>,
}

/// A plugin offered by the update center, from `/pluginManager/plugins`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailablePlugin {
    pub name: String,
    pub title: Option<String>,
    pub version: Option<String>,
    pub website: Option<String>,
    pub installed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AvailablePluginList {
    pub status: String,
    pub data: Vec<AvailablePlugin>,
}

/// How a plugin gets installed, parsed from `name` or `name@version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallMode {
    /// Let Jenkins resolve the newest version from its update center.
    Latest(String),
    /// Download the exact package, then upload it to Jenkins.
    Versioned { name: String, version: String },
}

impl InstallMode {
    /// `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        Some(match raw.split_once('@') {
            Some((name, version)) => Self::Versioned {
                name: name.to_string(),
                version: version.to_string(),
            },
            None => Self::Latest(raw.to_string()),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Latest(name) | Self::Versioned { name, .. } => name,
        }
    }
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest(name) => f.write_str(name),
            Self::Versioned { name, version } => write!(f, "{name}@{version}"),
        }
    }
}
