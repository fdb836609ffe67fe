use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};

use super::types::{
    AvailablePlugin, AvailablePluginList, InstallMode, InstalledPlugin, InstalledPluginList,
};
use crate::batch::{self, Batch};
use crate::config::PluginConfig;
use crate::error::{JenkinsError, Result};
use crate::progress::UploadProgress;
use crate::transport::{send, send_json, Transport, TransportRequest, TransportResponse};

/// Plugin manager operations.
pub struct PluginManager<T> {
    transport: Arc<T>,
    config: PluginConfig,
    /// Fetches packages from the update center, outside of Jenkins
    downloader: Client,
}

impl<T: Transport> PluginManager<T> {
    pub fn new(transport: Arc<T>, config: PluginConfig) -> Self {
        Self {
            transport,
            config,
            downloader: Client::new(),
        }
    }

    /// Installed plugins; `depth` below 1 is raised to 1.
    pub async fn installed(&self, depth: u32) -> Result<Vec<InstalledPlugin>> {
        let request =
            TransportRequest::get("/pluginManager/api/json").query("depth", depth.max(1));
        let list: InstalledPluginList =
            send_json(self.transport.as_ref(), request, &[200]).await?;
        Ok(list.plugins)
    }

    /// Plugins offered by the server's update center.
    pub async fn available(&self) -> Result<Vec<AvailablePlugin>> {
        let request = TransportRequest::get("/pluginManager/plugins");
        let list: AvailablePluginList =
            send_json(self.transport.as_ref(), request, &[200]).await?;
        debug!("Update center answered with status {:?}", list.status);
        Ok(list.data)
    }

    pub async fn find_installed(&self, name: &str) -> Result<Option<InstalledPlugin>> {
        let plugins = self.installed(1).await?;
        Ok(plugins.into_iter().find(|plugin| plugin.short_name == name))
    }

    /// Asks Jenkins to refresh its update center metadata.
    pub async fn check_update(&self) -> Result<()> {
        let request = TransportRequest::post("/pluginManager/checkUpdatesServer");
        let response = self.transport.execute(request).await?;
        accept_success_or_redirect(response)?;
        info!("Requested update center refresh");
        Ok(())
    }

    /// Installs plugins given as `name` or `name@version`, one at a time.
    ///
    /// Blank names are skipped. The first failure stops the run; the names
    /// installed before it are reported in the batch.
    pub async fn install<S: AsRef<str>>(&self, names: &[S]) -> Batch<String> {
        let modes = names
            .iter()
            .filter_map(|name| InstallMode::parse(name.as_ref()));

        batch::sequential(modes, move |mode| async move {
            match &mode {
                InstallMode::Latest(name) => self.install_latest(name).await?,
                InstallMode::Versioned { name, version } => {
                    self.install_version(name, version).await?
                }
            }
            Ok::<_, JenkinsError>(mode.to_string())
        })
        .await
    }

    async fn install_latest(&self, name: &str) -> Result<()> {
        let request =
            TransportRequest::post("/pluginManager/install").query(format!("plugin.{name}"), "");
        let response = self.transport.execute(request).await?;

        if response.status == StatusCode::BAD_REQUEST {
            let message = response
                .headers
                .get_all("X-Error")
                .iter()
                .filter_map(|value| value.to_str().ok())
                .last()
                .map(str::to_string)
                .unwrap_or_else(|| format!("cannot find plugin {name}"));
            return Err(JenkinsError::PluginInstall(message));
        }

        accept_success_or_redirect(response)?;
        info!("Installing plugin {name}");
        Ok(())
    }

    async fn install_version(&self, name: &str, version: &str) -> Result<()> {
        let content = self.download(name, version).await?;
        self.upload_bytes(format!("{name}.hpi"), content).await?;
        info!("Installed plugin {name}@{version}");
        Ok(())
    }

    /// Where the package for `name@version` is downloaded from.
    pub fn download_url(&self, name: &str, version: &str) -> String {
        let root = if self.config.use_mirror {
            &self.config.mirror_url
        } else {
            &self.config.update_center_url
        };
        format!(
            "{}/plugins/{name}/{version}/{name}.hpi",
            root.trim_end_matches('/')
        )
    }

    async fn download(&self, name: &str, version: &str) -> Result<Vec<u8>> {
        let url = self.download_url(name, version);
        debug!("Downloading {url}");

        let response = self.downloader.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        if status != StatusCode::OK {
            return Err(JenkinsError::UnexpectedStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }

    pub async fn uninstall(&self, name: &str) -> Result<()> {
        let path = format!("/pluginManager/plugin/{name}/doUninstall");
        let response = self.transport.execute(TransportRequest::post(path)).await?;
        if self.transport.debug() && response.status != StatusCode::OK {
            debug!("Uninstall of {name} answered:\n{}", response.text());
        }
        response.ensure_status(&[200])?;
        info!("Uninstalled plugin {name}");
        Ok(())
    }

    /// Uploads a local `.hpi`/`.jpi` package.
    pub async fn upload(&self, path: &Path) -> Result<()> {
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.upload_bytes(file_name, content).await
    }

    async fn upload_bytes(&self, file_name: String, content: Vec<u8>) -> Result<()> {
        let length = content.len() as u64;
        let progress = self
            .config
            .show_progress
            .then(|| UploadProgress::new(length, &file_name));

        let part = match &progress {
            Some(progress) => Part::stream_with_length(progress.body(content), length),
            None => Part::bytes(content),
        };
        let form = Form::new().part("@name", part.file_name(file_name.clone()));

        let request = TransportRequest::post("/pluginManager/uploadPlugin").multipart(form);
        let outcome = send(self.transport.as_ref(), request, &[200]).await;

        if let Some(progress) = &progress {
            match &outcome {
                Ok(_) => progress.finish(),
                Err(_) => progress.abandon(),
            }
        }
        outcome?;
        info!("Uploaded plugin package {file_name}");
        Ok(())
    }
}

fn accept_success_or_redirect(response: TransportResponse) -> Result<TransportResponse> {
    if response.status.is_success() || response.status.is_redirection() {
        Ok(response)
    } else {
        Err(JenkinsError::UnexpectedStatus {
            status: response.status.as_u16(),
            body: response.text(),
        })
    }
}
