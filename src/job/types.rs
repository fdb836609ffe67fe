//! Job, build and pipeline structures returned by the Jenkins API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transport::TransportResponse;

pub const STRING_PARAMETER_DEFINITION: &str = "StringParameterDefinition";
pub const FILE_PARAMETER_DEFINITION: &str = "FileParameterDefinition";

/// A job as returned by `<job>/api/json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    #[serde(rename = "_class")]
    pub class: String,
    pub name: String,
    pub url: String,
    pub color: Option<String>,
    pub buildable: bool,
    pub concurrent_build: bool,
    pub next_build_number: u32,
    /// Build references only carry number and URL
    pub builds: Vec<SimpleJobBuild>,
    pub property: Vec<ParametersDefinitionProperty>,
}

impl Job {
    /// All parameters declared on the job, across its properties.
    pub fn parameter_definitions(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.property
            .iter()
            .flat_map(|property| property.parameter_definitions.iter())
    }

    pub fn is_parameterized(&self) -> bool {
        self.parameter_definitions().next().is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParametersDefinitionProperty {
    pub parameter_definitions: Vec<ParameterDefinition>,
}

/// A parameter declared on a job or on a pending input step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterDefinition {
    pub name: String,
    pub description: Option<String>,
    /// Jenkins definition type, e.g. `StringParameterDefinition`
    #[serde(rename = "type")]
    pub kind: String,
    pub default_parameter_value: Option<DefaultParameterValue>,
    pub choices: Vec<String>,
}

impl ParameterDefinition {
    pub fn is_file(&self) -> bool {
        self.kind == FILE_PARAMETER_DEFINITION
    }

    /// Default value rendered as the string Jenkins expects in a build request.
    pub fn default_value(&self) -> Option<String> {
        let value = self.default_parameter_value.as_ref()?.value.as_ref()?;
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefaultParameterValue {
    pub name: Option<String>,
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleJobBuild {
    pub number: u32,
    pub url: String,
}

/// A single build as returned by `<job>/<number>/api/json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Build {
    pub number: u32,
    pub url: String,
    pub id: String,
    pub building: bool,
    pub description: Option<String>,
    pub display_name: String,
    pub full_display_name: String,
    /// Milliseconds
    pub duration: i64,
    /// Milliseconds
    pub estimated_duration: i64,
    pub keep_log: bool,
    pub queue_id: i64,
    /// `None` while the build is running
    pub result: Option<String>,
    /// Start time, epoch milliseconds
    pub timestamp: i64,
    pub previous_build: Option<SimpleJobBuild>,
    pub next_build: Option<SimpleJobBuild>,
}

impl Build {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.duration).unwrap_or_default())
    }

    pub fn status(&self) -> &str {
        if self.building {
            "BUILDING"
        } else {
            self.result.as_deref().unwrap_or("UNKNOWN")
        }
    }
}

/// Which build of a job an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSelector {
    Last,
    Number(u32),
}

impl BuildSelector {
    pub(crate) fn segment(self) -> String {
        match self {
            Self::Last => "lastBuild".to_string(),
            Self::Number(number) => number.to_string(),
        }
    }
}

/// Non-positive numbers select the last build.
impl From<i64> for BuildSelector {
    fn from(number: i64) -> Self {
        match u32::try_from(number) {
            Ok(number) if number > 0 => Self::Number(number),
            _ => Self::Last,
        }
    }
}

impl From<u32> for BuildSelector {
    fn from(number: u32) -> Self {
        Self::from(i64::from(number))
    }
}

/// A build triggered through the `restFul/build` endpoint together with the
/// cause Jenkins echoed back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityBuild {
    pub build: Build,
    pub cause: IdentityCause,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityCause {
    pub uuid: String,
    pub short_description: String,
    pub message: String,
}

/// Pipeline script of a job, from `<job>/restFul`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pipeline {
    pub script: String,
    pub sandbox: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub min_to_show: i32,
    pub order: i32,
    pub items: Vec<CategoryItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryItem {
    pub display_name: String,
    pub description: String,
    pub order: i32,
    /// Fully qualified class name used as `mode` when creating a job
    pub class: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CategoryList {
    pub categories: Vec<Category>,
}

/// A pending `input` step of a running pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputItem {
    pub id: String,
    pub message: String,
    pub proceed_text: String,
    pub proceed_url: String,
    pub abort_url: String,
    pub redirect_approval_url: String,
    pub inputs: Vec<ParameterDefinition>,
}

/// A job entry from the item search endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JenkinsItem {
    pub name: String,
    pub display_name: String,
    pub full_name: String,
    pub url: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub buildable: bool,
    pub building: bool,
    pub in_queue: bool,
    pub parameterized: bool,
    pub disabled: bool,
    pub weather_score: i32,
    pub parameters: Vec<ParameterDefinition>,
}

/// Form payload for `createItem`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateJobPayload {
    pub name: String,
    /// Job type class name, see [`CategoryItem::class`]
    pub mode: String,
    /// Existing job to copy from, empty for none
    pub from: String,
}

/// One chunk of console output from the progressive log endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressiveLog {
    pub text: String,
    pub has_more: bool,
    /// Offset to pass as `start` on the next poll
    pub next_start: i64,
    /// HTTP status of the poll; anything but 200 yields an empty chunk
    pub status: u16,
}

impl ProgressiveLog {
    pub(crate) fn from_response(response: &TransportResponse) -> Self {
        let status = response.status.as_u16();
        if status != 200 {
            return Self {
                status,
                ..Self::default()
            };
        }

        Self {
            text: response.text(),
            has_more: response
                .header_str("X-More-Data")
                .is_some_and(|value| value.eq_ignore_ascii_case("true")),
            next_start: response
                .header_str("X-Text-Size")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(0),
            status,
        }
    }
}
