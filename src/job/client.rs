use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use log::{debug, info};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use super::payload::{BuildParameter, BuildRequest, ParameterValue};
use super::types::{
    Build, BuildSelector, Category, CategoryList, CreateJobPayload, IdentityBuild, InputItem,
    JenkinsItem, Job, Pipeline, ProgressiveLog,
};
use crate::batch::{self, Batch};
use crate::error::{JenkinsError, Result};
use crate::paths::resolve_job_path;
use crate::transport::{send, send_json, Transport, TransportRequest, APPLICATION_FORM};

/// Job, build and pipeline operations.
///
/// Job names follow [`resolve_job_path`]: folders are separated by spaces.
pub struct JobClient<T> {
    transport: Arc<T>,
    parent: String,
}

/// Body of an input step submission.
#[derive(Serialize)]
struct InputParametersRequest {
    parameter: Vec<ParameterValue>,
}

impl<T: Transport> JobClient<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            parent: String::new(),
        }
    }

    /// Restricts [`JobClient::search`] to a parent folder.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    /// Finds jobs by name and type under the configured parent folder.
    pub async fn search(
        &self,
        name: &str,
        kind: &str,
        start: u32,
        limit: u32,
    ) -> Result<Vec<JenkinsItem>> {
        let request = TransportRequest::get("/items/list")
            .query("name", name)
            .query("type", kind)
            .query("start", start)
            .query("limit", limit)
            .query("parent", &self.parent);
        send_json(self.transport.as_ref(), request, &[200]).await
    }

    /// Triggers a build without parameters.
    pub async fn build(&self, job_name: &str) -> Result<()> {
        let path = format!("{}/build", resolve_job_path(job_name));
        send(self.transport.as_ref(), TransportRequest::post(path), &[201]).await?;
        info!("Triggered build of {job_name}");
        Ok(())
    }

    /// Triggers a build and returns its handle plus the identifying cause.
    ///
    /// `timeout` and `delay` are seconds; unset values are left to the server.
    pub async fn build_and_return(
        &self,
        job_name: &str,
        cause: Option<&str>,
        timeout: Option<u32>,
        delay: Option<u32>,
    ) -> Result<IdentityBuild> {
        let path = format!("{}/restFul/build", resolve_job_path(job_name));
        let mut request = TransportRequest::post(path).query("1", 1);
        if let Some(timeout) = timeout {
            request = request.query("timeout", timeout);
        }
        if let Some(delay) = delay {
            request = request.query("delay", delay);
        }
        if let Some(cause) = cause.filter(|cause| !cause.is_empty()) {
            request = request.query("identifyCause", cause);
        }

        let build: IdentityBuild = send_json(self.transport.as_ref(), request, &[200]).await?;
        info!("Triggered build #{} of {job_name}", build.build.number);
        Ok(build)
    }

    /// Triggers a build with string and file parameters.
    pub async fn build_with_params(
        &self,
        job_name: &str,
        parameters: impl IntoIterator<Item = BuildParameter>,
    ) -> Result<()> {
        let path = format!("{}/build", resolve_job_path(job_name));
        let payload = BuildRequest::new(parameters).into_payload().await?;
        debug!("Build payload content type: {}", payload.content_type());

        let request = TransportRequest::post(path).body(payload.into_body());
        send(self.transport.as_ref(), request, &[201]).await?;
        info!("Triggered parameterized build of {job_name}");
        Ok(())
    }

    pub async fn get_build(
        &self,
        job_name: &str,
        build: impl Into<BuildSelector>,
    ) -> Result<Build> {
        let path = format!(
            "{}/{}/api/json",
            resolve_job_path(job_name),
            build.into().segment()
        );
        send_json(self.transport.as_ref(), TransportRequest::get(path), &[200]).await
    }

    pub async fn get_job(&self, job_name: &str) -> Result<Job> {
        let path = format!("{}/api/json", resolve_job_path(job_name));
        send_json(self.transport.as_ref(), TransportRequest::get(path), &[200]).await
    }

    /// Fetches every build the job lists, one request per build.
    ///
    /// Builds are fetched in the order the job reports them and the first
    /// failure stops the walk; builds fetched before it are kept.
    pub async fn history(&self, job_name: &str) -> Batch<Build> {
        let job = match self.get_job(job_name).await {
            Ok(job) => job,
            Err(error) => {
                return Batch {
                    items: Vec::new(),
                    error: Some(error),
                }
            }
        };

        let numbers = job.builds.iter().map(|build| build.number);
        batch::sequential(numbers, move |number| {
            self.get_build(job_name, BuildSelector::Number(number))
        })
        .await
    }

    /// Deletes one build record.
    pub async fn delete_build(&self, job_name: &str, number: u32) -> Result<()> {
        let path = format!("{}/{number}/doDelete", resolve_job_path(job_name));
        send(self.transport.as_ref(), TransportRequest::post(path), &[200]).await?;
        info!("Deleted build #{number} of {job_name}");
        Ok(())
    }

    pub async fn enable(&self, job_name: &str) -> Result<()> {
        let path = format!("{}/enable", resolve_job_path(job_name));
        send(self.transport.as_ref(), TransportRequest::post(path), &[200]).await?;
        info!("Enabled {job_name}");
        Ok(())
    }

    pub async fn disable(&self, job_name: &str) -> Result<()> {
        let path = format!("{}/disable", resolve_job_path(job_name));
        send(self.transport.as_ref(), TransportRequest::post(path), &[200]).await?;
        info!("Disabled {job_name}");
        Ok(())
    }

    /// Aborts a running build.
    pub async fn stop(&self, job_name: &str, build: impl Into<BuildSelector>) -> Result<()> {
        let path = format!("{}/{}/stop", resolve_job_path(job_name), build.into().segment());
        send(self.transport.as_ref(), TransportRequest::post(path), &[200]).await?;
        info!("Stopped build of {job_name}");
        Ok(())
    }

    /// Deletes the job. Jenkins answers with either 200 or a redirect.
    pub async fn delete(&self, job_name: &str) -> Result<()> {
        let path = format!("{}/doDelete", resolve_job_path(job_name));
        let request = TransportRequest::post(path)
            .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_FORM));
        send(self.transport.as_ref(), request, &[200, 302]).await?;
        info!("Deleted {job_name}");
        Ok(())
    }

    /// Declares parameters on a job; `parameters` is the JSON list Jenkins expects.
    pub async fn add_parameters(&self, job_name: &str, parameters: &str) -> Result<()> {
        let path = format!("{}/restFul/addParameter", resolve_job_path(job_name));
        let request =
            TransportRequest::post(path).form(vec![("params".to_string(), parameters.to_string())]);
        send(self.transport.as_ref(), request, &[200]).await?;
        Ok(())
    }

    /// Removes declared parameters, given as a comma separated list of names.
    pub async fn remove_parameters(&self, job_name: &str, parameters: &str) -> Result<()> {
        let path = format!("{}/restFul/removeParameter", resolve_job_path(job_name));
        let request = TransportRequest::post(path).query("params", parameters);
        send(self.transport.as_ref(), request, &[200]).await?;
        Ok(())
    }

    /// Job types that can be created, grouped by category.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let request = TransportRequest::get("/view/all/itemCategories").query("depth", 3);
        let list: CategoryList = send_json(self.transport.as_ref(), request, &[200]).await?;
        Ok(list.categories)
    }

    pub async fn get_pipeline(&self, job_name: &str) -> Result<Pipeline> {
        let path = format!("{}/restFul", resolve_job_path(job_name));
        send_json(self.transport.as_ref(), TransportRequest::get(path), &[200]).await
    }

    /// Replaces the pipeline script of a job.
    pub async fn update_pipeline(&self, job_name: &str, script: &str) -> Result<()> {
        let path = format!("{}/restFul/update", resolve_job_path(job_name));
        let request = TransportRequest::post(path).query("script", script);
        send(self.transport.as_ref(), request, &[200]).await?;
        info!("Updated pipeline script of {job_name}");
        Ok(())
    }

    /// Reads one chunk of console output starting at byte offset `start`.
    ///
    /// Statuses other than 200 are not errors: they yield an empty chunk with
    /// `has_more == false` so pollers simply stop. Only transport failures
    /// are returned as errors.
    pub async fn log(
        &self,
        job_name: &str,
        build: impl Into<BuildSelector>,
        start: i64,
    ) -> Result<ProgressiveLog> {
        let path = format!(
            "{}/{}/logText/progressiveText",
            resolve_job_path(job_name),
            build.into().segment()
        );
        let request = TransportRequest::get(path).query("start", start);
        let response = self.transport.execute(request).await?;

        let log = ProgressiveLog::from_response(&response);
        if log.status != 200 {
            debug!("Progressive log of {job_name} answered {}", log.status);
        }
        Ok(log)
    }

    /// Polls the console output until Jenkins reports no more data.
    ///
    /// Each non-empty chunk is handed to `sink`. Returns the final offset.
    /// Fails with [`JenkinsError::LogStalled`] when Jenkins reports more data
    /// but its offset moves backwards, or stays put while text was returned.
    pub async fn follow_log(
        &self,
        job_name: &str,
        build: impl Into<BuildSelector>,
        interval: Duration,
        mut sink: impl FnMut(&str),
    ) -> Result<i64> {
        let build = build.into();
        let mut start = 0;
        loop {
            let chunk = self.log(job_name, build, start).await?;
            if !chunk.text.is_empty() {
                sink(&chunk.text);
            }
            if !chunk.has_more {
                return Ok(chunk.next_start.max(start));
            }
            let stalled = chunk.next_start < start
                || (chunk.next_start == start && !chunk.text.is_empty());
            if stalled {
                return Err(JenkinsError::LogStalled {
                    start,
                    next: chunk.next_start,
                });
            }
            start = chunk.next_start;
            tokio::time::sleep(interval).await;
        }
    }

    pub async fn create(&self, payload: &CreateJobPayload) -> Result<()> {
        self.create_in_folder(payload, "").await
    }

    /// Creates a job inside `folder` (space separated, empty for the root).
    pub async fn create_in_folder(&self, payload: &CreateJobPayload, folder: &str) -> Result<()> {
        let form = vec![
            ("json".to_string(), serde_json::to_string(payload)?),
            ("name".to_string(), payload.name.clone()),
            ("mode".to_string(), payload.mode.clone()),
            ("from".to_string(), payload.from.clone()),
        ];
        let path = format!("/view/all{}/createItem", resolve_job_path(folder));
        send(
            self.transport.as_ref(),
            TransportRequest::post(path).form(form),
            &[200, 302],
        )
        .await?;
        info!("Created job {}", payload.name);
        Ok(())
    }

    /// Input steps of a build waiting for a decision.
    pub async fn pending_inputs(&self, job_name: &str, build: u32) -> Result<Vec<InputItem>> {
        let path = format!(
            "{}/{build}/wfapi/pendingInputActions",
            resolve_job_path(job_name)
        );
        send_json(self.transport.as_ref(), TransportRequest::get(path), &[200]).await
    }

    /// Proceeds with or aborts a pending input step.
    pub async fn submit_input(
        &self,
        job_name: &str,
        input_id: &str,
        build: u32,
        abort: bool,
        parameters: &IndexMap<String, String>,
    ) -> Result<()> {
        let action = if abort { "abort" } else { "proceed" };
        let path = format!(
            "{}/{build}/input/{input_id}/{action}",
            resolve_job_path(job_name)
        );

        let body = InputParametersRequest {
            parameter: parameters
                .iter()
                .map(|(name, value)| ParameterValue {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
        };
        let request = TransportRequest::post(path).query("json", serde_json::to_string(&body)?);
        send(self.transport.as_ref(), request, &[200]).await?;
        info!("Submitted {action} for input {input_id} of {job_name} #{build}");
        Ok(())
    }
}
