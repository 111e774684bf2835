pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{HarborConfig, TomlConfig};
pub use crate::core::{client::HarborClient, provider::Provider, server::PluginServer};
pub use utils::error::{ProviderError, Result};
