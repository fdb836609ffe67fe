mod manager;
mod types;

#[cfg(test)]
mod tests;

pub use manager::PluginManager;
pub use types::{AvailablePlugin, Dependency, InstallMode, InstalledPlugin};
