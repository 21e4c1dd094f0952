use crate::route::Route;
use serde::{Deserialize, Serialize};

/// Service definition, as the Kong admin API returns it.
///
/// In an exported document a service owns its routes; on the wire the two
/// are separate collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub port: u16,

    #[serde(default)]
    pub protocol: String,

    /// Timeouts in milliseconds.
    #[serde(default)]
    pub connect_timeout: u64,
    #[serde(default)]
    pub read_timeout: u64,
    #[serde(default)]
    pub write_timeout: u64,

    /// Routes nested under this service (export/import document only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

impl Service {
    /// The body POSTed to create this service: no id, no nested routes.
    pub fn bare(&self) -> Service {
        Service {
            id: String::new(),
            routes: Vec::new(),
            ..self.clone()
        }
    }

    /// Sort key for deterministic exports.
    pub fn sort_key(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}
