//! Configuration Loader
//!
//! Layered configuration loading: an optional TOML file overlaid with
//! `ATSE_`-prefixed environment variables. The loaded value is validated
//! and logged (sanitized to names only) before use.

use std::path::Path;

use config::{Config, Environment, File};
use tracing::debug;

use super::OrchestratorConfig;
use crate::orchestration::errors::{OrchestrationError, OrchestrationResult};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from defaults, an optional file, and the
    /// environment. Missing file means defaults plus environment.
    pub fn load(config_file: Option<&Path>) -> OrchestrationResult<OrchestratorConfig> {
        let mut builder = Config::builder();

        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading orchestrator configuration file");
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix("ATSE").separator("__"))
            .build()
            .map_err(|e| OrchestrationError::configuration(e.to_string()))?;

        let config: OrchestratorConfig = settings
            .try_deserialize()
            .map_err(|e| OrchestrationError::configuration(e.to_string()))?;

        config
            .validate()
            .map_err(OrchestrationError::configuration)?;

        debug!(
            wp_no_match_retry = config.policy.wp_no_match_retry,
            cso_enabled = config.policy.cso_enabled,
            "Orchestrator configuration loaded"
        );

        Ok(config)
    }
}
