use crate::error::SyncError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub sync: EngineConfig,
}

/// Where the gateway's admin API lives and how patiently to talk to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Max in-flight create/delete requests.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// `size` query parameter on list requests. Larger collections are
    /// truncated; there is no pagination.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Export target / import source.
    #[serde(default = "default_file")]
    pub file: PathBuf,
}

// ── Defaults ──────────────────────────────────────────────────

pub const DEFAULT_URL: &str = "http://localhost:8001";

fn default_url() -> String { DEFAULT_URL.into() }
fn default_timeout_secs() -> u64 { 10 }
fn default_concurrency() -> usize { 10 }
fn default_page_size() -> u32 { 500 }
fn default_file() -> PathBuf { PathBuf::from("config.json") }

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            page_size: default_page_size(),
            file: default_file(),
        }
    }
}

impl SyncConfig {
    /// Defaults, then the optional YAML file, then `GONGFIG_` env overrides
    /// (`GONGFIG_ADMIN__URL`, `GONGFIG_SYNC__CONCURRENCY`, ...).
    pub fn load(path: Option<&Path>) -> Result<Self, SyncError> {
        let mut figment = Figment::from(Serialized::defaults(SyncConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: SyncConfig = figment
            .merge(Env::prefixed("GONGFIG_").split("__"))
            .extract()
            .map_err(|e| SyncError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if self.sync.concurrency == 0 {
            return Err(SyncError::Config("sync.concurrency must be at least 1".into()));
        }
        if self.sync.page_size == 0 {
            return Err(SyncError::Config("sync.page_size must be at least 1".into()));
        }
        if self.admin.url.trim().is_empty() {
            return Err(SyncError::Config("admin.url must not be empty".into()));
        }
        Ok(())
    }
}
