//! Async client for the Jenkins REST API.
//!
//! [`Jenkins`] wraps one [`Transport`] and hands out the per-area clients:
//! [`JobClient`] for jobs, builds and pipelines, [`PluginManager`] for the
//! plugin manager, [`CascClient`] for configuration as code and
//! [`BlueOceanClient`] for Blue Ocean lookups.
//!
//! ```no_run
//! use jenkins_client::job::BuildSelector;
//! use jenkins_client::{Config, Jenkins};
//!
//! # async fn run() -> jenkins_client::Result<()> {
//! let jenkins = Jenkins::from_config(&Config::load(None)?)?;
//! let build = jenkins.jobs().get_build("team app", BuildSelector::Last).await?;
//! println!("#{} {}", build.number, build.status());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod batch;
pub mod blueocean;
pub mod casc;
pub mod client;
pub mod config;
pub mod error;
pub mod job;
pub mod paths;
pub mod plugin;
pub mod progress;
pub mod transport;

pub use auth::Credentials;
pub use batch::Batch;
pub use blueocean::BlueOceanClient;
pub use casc::CascClient;
pub use client::Jenkins;
pub use config::{Config, JenkinsConfig, OutputConfig, OutputFormat, PluginConfig};
pub use error::{JenkinsError, Result};
pub use job::JobClient;
pub use paths::{resolve_job_path, resolve_pipeline_path};
pub use plugin::{InstallMode, PluginManager};
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
