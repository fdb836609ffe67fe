//! Request bodies for parameterized builds.
//!
//! Jenkins takes build parameters as a `json` form field shaped like
//! `{"parameter": ...}`. File parameters additionally need their content
//! uploaded, which forces a multipart body.

use std::path::{Path, PathBuf};

use log::debug;
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use super::types::ParameterDefinition;
use crate::error::Result;
use crate::transport::{RequestBody, APPLICATION_FORM};

/// A value supplied for one build parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildParameter {
    String { name: String, value: String },
    File { name: String, path: PathBuf },
}

impl BuildParameter {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::String {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::String { name, .. } | Self::File { name, .. } => name,
        }
    }

    /// Builds a parameter for a declared definition.
    ///
    /// `value` overrides the definition's default; for file definitions it is
    /// the local path to upload. Returns `None` when a file definition has no
    /// value, since there is nothing to upload.
    pub fn from_definition(definition: &ParameterDefinition, value: Option<&str>) -> Option<Self> {
        if definition.is_file() {
            return value.map(|path| Self::file(&definition.name, path));
        }

        let value = value
            .map(str::to_string)
            .or_else(|| definition.default_value())
            .unwrap_or_default();
        Some(Self::string(&definition.name, value))
    }
}

/// Wire form of a string parameter inside the `json` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterValue {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
struct FileParameter {
    name: String,
    path: PathBuf,
}

/// Build parameters split into string and file subsets.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    strings: Vec<ParameterValue>,
    files: Vec<FileParameter>,
}

impl BuildRequest {
    pub fn new(parameters: impl IntoIterator<Item = BuildParameter>) -> Self {
        let mut request = Self::default();
        for parameter in parameters {
            match parameter {
                BuildParameter::String { name, value } => {
                    request.strings.push(ParameterValue { name, value })
                }
                BuildParameter::File { name, path } => {
                    request.files.push(FileParameter { name, path })
                }
            }
        }
        request
    }

    pub fn is_multipart(&self) -> bool {
        !self.files.is_empty()
    }

    /// The `{"parameter": ...}` document for the string parameters.
    pub fn parameter_json(&self) -> Result<String> {
        Ok(parameter_document(&self.strings)?.to_string())
    }

    /// Encodes the request, reading every file parameter from disk.
    ///
    /// Any unreadable file fails the whole payload.
    pub async fn into_payload(self) -> Result<ParameterPayload> {
        let json = self.parameter_json()?;

        if self.files.is_empty() {
            return Ok(ParameterPayload::Form(vec![("json".to_string(), json)]));
        }

        // File parts are keyed by their local path.
        let mut form = Form::new();
        for file in self.files {
            let content = tokio::fs::read(&file.path).await?;
            let field = file.path.display().to_string();
            debug!("Attaching {field} for file parameter {}", file.name);
            let part = Part::bytes(content).file_name(file_name(&file.path));
            form = form.part(field, part);
        }

        Ok(ParameterPayload::Multipart(form.text("json", json)))
    }
}

/// A single string parameter is sent as an object, anything else as an array.
pub(crate) fn parameter_document(values: &[ParameterValue]) -> Result<serde_json::Value> {
    let parameter = match values {
        [single] => serde_json::to_value(single)?,
        _ => serde_json::to_value(values)?,
    };
    Ok(serde_json::json!({ "parameter": parameter }))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// An encoded build request body.
pub enum ParameterPayload {
    Form(Vec<(String, String)>),
    Multipart(Form),
}

impl ParameterPayload {
    pub fn content_type(&self) -> String {
        match self {
            Self::Form(_) => APPLICATION_FORM.to_string(),
            Self::Multipart(form) => format!("multipart/form-data; boundary={}", form.boundary()),
        }
    }

    pub fn into_body(self) -> RequestBody {
        match self {
            Self::Form(pairs) => RequestBody::Form(pairs),
            Self::Multipart(form) => RequestBody::Multipart(form),
        }
    }
}
