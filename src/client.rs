use std::sync::Arc;

use crate::blueocean::BlueOceanClient;
use crate::casc::CascClient;
use crate::config::{Config, PluginConfig};
use crate::error::Result;
use crate::job::JobClient;
use crate::plugin::PluginManager;
use crate::transport::{HttpTransport, Transport};

/// Entry point bundling every API client over one shared transport.
pub struct Jenkins<T = HttpTransport> {
    transport: Arc<T>,
    plugin_config: PluginConfig,
}

impl Jenkins<HttpTransport> {
    /// Connects using the `jenkins` and `plugin` sections of a config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::from_config(&config.jenkins)?;
        Ok(Self::new(transport).with_plugin_config(config.plugin.clone()))
    }
}

impl<T: Transport> Jenkins<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            plugin_config: PluginConfig::default(),
        }
    }

    pub fn with_plugin_config(mut self, config: PluginConfig) -> Self {
        self.plugin_config = config;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn jobs(&self) -> JobClient<T> {
        JobClient::new(Arc::clone(&self.transport))
    }

    pub fn plugins(&self) -> PluginManager<T> {
        PluginManager::new(Arc::clone(&self.transport), self.plugin_config.clone())
    }

    pub fn casc(&self) -> CascClient<T> {
        CascClient::new(Arc::clone(&self.transport))
    }

    pub fn blue_ocean(&self, organization: impl Into<String>) -> BlueOceanClient<T> {
        BlueOceanClient::new(Arc::clone(&self.transport), organization)
    }
}
