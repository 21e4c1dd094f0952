use serde::{Deserialize, Serialize};

/// TLS certificate definition, as the Kong admin API returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// PEM-encoded certificate.
    #[serde(default)]
    pub cert: String,

    /// PEM-encoded private key.
    #[serde(default)]
    pub key: String,

    /// SNI hostnames this cert applies to.
    #[serde(default)]
    pub snis: Vec<String>,
}

impl Certificate {
    pub fn bare(&self) -> Certificate {
        Certificate {
            id: String::new(),
            ..self.clone()
        }
    }
}
