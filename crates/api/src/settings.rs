//! Server Configuration
//!
//! Settings come from `GEOSHIELD_`-prefixed environment variables with
//! deployment-friendly defaults (bind all interfaces, the original service
//! port, models resolved relative to the working directory).

use model_store::ResolverConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Optional override for the model search base directory
    pub model_base_dir: Option<String>,
    /// Whether the synthesized tier may fit models in-process
    pub enable_synthesis: bool,
}

impl ServerConfig {
    /// Load settings from the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5001)?
            .set_default("enable_synthesis", true)?
            .add_source(config::Environment::with_prefix("GEOSHIELD"))
            .build()?
            .try_deserialize()
    }

    /// Socket address string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolver settings derived from these server settings
    pub fn resolver_config(&self) -> ResolverConfig {
        let mut resolver = ResolverConfig {
            enable_synthesis: self.enable_synthesis,
            ..ResolverConfig::default()
        };
        if let Some(base) = &self.model_base_dir {
            resolver.base_dir = PathBuf::from(base);
        }
        resolver
    }
}
