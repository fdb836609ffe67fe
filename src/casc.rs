use std::sync::Arc;

use log::info;

use crate::error::Result;
use crate::transport::{send, Transport, TransportRequest};

const CASC_ROOT: &str = "/configuration-as-code";

/// Client for the configuration-as-code plugin endpoints.
pub struct CascClient<T> {
    transport: Arc<T>,
}

impl<T: Transport> CascClient<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Reloads the configuration from its configured sources.
    pub async fn reload(&self) -> Result<()> {
        self.post("reload").await?;
        info!("Reloaded configuration as code");
        Ok(())
    }

    /// Applies the configuration currently on disk.
    pub async fn apply(&self) -> Result<()> {
        self.post("apply").await?;
        info!("Applied configuration as code");
        Ok(())
    }

    /// Current configuration as YAML text.
    pub async fn export(&self) -> Result<String> {
        self.post("export").await
    }

    pub async fn export_value(&self) -> Result<serde_yaml::Value> {
        let text = self.export().await?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// JSON schema of the configuration document.
    pub async fn schema(&self) -> Result<String> {
        self.post("schema").await
    }

    async fn post(&self, action: &str) -> Result<String> {
        let request = TransportRequest::post(format!("{CASC_ROOT}/{action}"));
        let response = send(self.transport.as_ref(), request, &[200]).await?;
        Ok(response.text())
    }
}
