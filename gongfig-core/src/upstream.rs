use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upstream (virtual host for load balancing), as the Kong admin API returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Number of slots in the load balancer ring.
    #[serde(default)]
    pub slots: u32,

    /// Health check configuration, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthchecks: Option<Value>,

    /// Hashing input: "none", "consumer", "ip", "header" or "cookie".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_fallback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_on_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_fallback_header: Option<String>,

    /// Targets nested under this upstream (document only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<Target>,
}

/// Backend address of an upstream. Has no identity of its own in a document;
/// it is always re-created from scratch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// `host:port`
    #[serde(default)]
    pub target: String,

    #[serde(default)]
    pub weight: u32,
}

impl Upstream {
    pub fn bare(&self) -> Upstream {
        Upstream {
            id: String::new(),
            targets: Vec::new(),
            ..self.clone()
        }
    }
}
