use crate::domain::EmptyOrgPolicy;
use common::telemetry::TelemetryConfig;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Service name reported in telemetry output
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// JSON log output; plain fmt when false
    #[serde(default = "default_json_logs")]
    pub json_logs: bool,

    /// Treatment of stakeholder targets with no organization memberships
    #[serde(default)]
    pub empty_org_policy: EmptyOrgPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "dugo-jurisdiction".to_string()
}

fn default_json_logs() -> bool {
    true
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("DUGO"))
            .build()?
            .try_deserialize()
    }

    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            service_name: self.service_name.clone(),
            log_level: self.log_level.clone(),
            json_output: self.json_logs,
        }
    }
}
