use crate::resource::ResourceInstance;
use serde::{Deserialize, Serialize};

/// A Route defines how incoming requests are matched to a service.
/// Modeled after the Kong admin API route object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Route identifier. Kept in exports so plugins can refer to it.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// URI path prefixes
    #[serde(default)]
    pub paths: Option<Vec<String>>,

    /// Owning service. Cleared once the route is nested under it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ResourceInstance>,

    #[serde(default)]
    pub strip_path: bool,

    #[serde(default)]
    pub preserve_host: bool,

    #[serde(default)]
    pub regex_priority: i64,

    /// Host header matching
    #[serde(default)]
    pub hosts: Option<Vec<String>>,

    #[serde(default)]
    pub protocols: Option<Vec<String>>,

    /// Allowed HTTP methods (null = all methods)
    #[serde(default)]
    pub methods: Option<Vec<String>>,
}

impl Route {
    /// Identifier of the owning service, if the route still carries one.
    pub fn service_id(&self) -> Option<&str> {
        self.service
            .as_ref()
            .map(|s| s.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Copy of this route as it appears nested under its service.
    pub fn nested(&self) -> Route {
        Route {
            service: None,
            ..self.clone()
        }
    }

    /// The body POSTed to create this route: no id, no back-reference.
    pub fn bare(&self) -> Route {
        Route {
            id: String::new(),
            service: None,
            ..self.clone()
        }
    }
}
