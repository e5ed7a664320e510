//! Layered configuration: compiled defaults, then an optional TOML file, then
//! `LEAVE_*` environment variables.
use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_PAGE_SIZE;
use crate::validation::ValidationPolicy;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub policy: ValidationPolicy,
    pub history: HistoryConfig,
    pub notifications: NotificationConfig,
    pub commit: CommitConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub page_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub duration_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { duration_ms: 4000 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitMode {
    /// Record the request without any network call
    #[default]
    Local,
    /// POST the request to the leave service first
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    pub mode: CommitMode,
    pub base_url: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            mode: CommitMode::Local,
            base_url: "http://localhost:8000".to_string(),
            endpoint: "/api/leave".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Defaults, `./leave.toml` if present, then `LEAVE_*` variables.
pub fn load_config() -> Result<WorkflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WorkflowConfig::default()))
        .merge(Toml::file("leave.toml"))
        .merge(env_provider())
        .extract()
}

/// Defaults, the file at `path`, then `LEAVE_*` variables.
pub fn load_config_from_path(path: &Path) -> Result<WorkflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WorkflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Defaults overlaid with a TOML document. No environment lookup.
pub fn load_config_from_str(toml_content: &str) -> Result<WorkflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WorkflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

// LEAVE_POLICY_MIN_REASON_LEN -> policy.min_reason_len
fn env_provider() -> Env {
    Env::prefixed("LEAVE_").map(|key| {
        key.as_str()
            .to_ascii_lowercase()
            .replacen("policy_", "policy.", 1)
            .replacen("history_", "history.", 1)
            .replacen("notifications_", "notifications.", 1)
            .replacen("commit_", "commit.", 1)
            .into()
    })
}
