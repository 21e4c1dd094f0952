use crate::resource::ResourceInstance;
use serde::{Deserialize, Serialize};

/// Consumer definition, as the Kong admin API returns it.
///
/// `key` is not a consumer field on the wire: export splices the consumer's
/// key-auth credential into it and import splits it back out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default)]
    pub custom_id: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    /// Key-auth credential (document only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Consumer {
    pub fn bare(&self) -> Consumer {
        Consumer {
            id: String::new(),
            key: None,
            ..self.clone()
        }
    }

    /// Credential key, ignoring empty strings.
    pub fn credential(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Key-auth credential. Only ever exists transiently while a credential is
/// being spliced onto (or split off) its consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyAuth {
    #[serde(default)]
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer: Option<ResourceInstance>,

    /// Legacy flat owner reference used by older admin APIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
}

impl KeyAuth {
    /// Request body for `consumers/{id}/key-auth`.
    pub fn for_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            consumer: None,
            consumer_id: None,
        }
    }

    /// Identifier of the owning consumer, whichever form the API used.
    pub fn owner_id(&self) -> Option<&str> {
        self.consumer
            .as_ref()
            .map(|c| c.id.as_str())
            .or(self.consumer_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}
