use serde::Deserialize;
use thiserror::Error;

use crate::link_resolver::AppDomains;
use crate::models::SectionOption;

/// Id of the `<script type="application/json">` element holding the config.
pub const CONFIG_ELEMENT_ID: &str = "dashboard-config";
/// Page global mapping environment names to base URLs.
pub const APP_DOMAINS_GLOBAL: &str = "APP_DOMAINS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("dashboard config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{APP_DOMAINS_GLOBAL} could not be decoded: {0}")]
    Domains(String),
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub add_entry_action: String,
    pub sections: Vec<SectionOption>,
    pub static_prefix: String,
    pub uploads_prefix: String,
    pub preview_debounce_ms: u32,
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            add_entry_action: "/add_link_entry".to_string(),
            sections: Vec::new(),
            static_prefix: "/static/".to_string(),
            uploads_prefix: "uploads/".to_string(),
            preview_debounce_ms: 750,
            log_level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level
            .trim()
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }
}

/// Drops blank entries; the resolver treats a missing key as "not configured".
pub fn normalize_domains(domains: AppDomains) -> AppDomains {
    domains
        .into_iter()
        .map(|(env, base)| (env.trim().to_string(), base.trim().to_string()))
        .filter(|(env, base)| !env.is_empty() && !base.is_empty())
        .collect()
}
