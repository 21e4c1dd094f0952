use crate::resource::ResourceInstance;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Plugin instance, as the Kong admin API returns it.
///
/// The foreign keys hold *local* identifiers while read from a document and
/// must be rewritten to the gateway's identifiers before creation. Both the
/// flat `service_id` form and the nested `"service": {"id": ...}` form are
/// accepted on input; only the flat form is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PluginRecord")]
pub struct Plugin {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub name: String,

    /// Plugin-specific configuration, passed through untouched.
    pub config: Map<String, Value>,

    pub enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// Wire shape of a plugin, with either form of foreign key.
#[derive(Deserialize)]
struct PluginRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    config: Map<String, Value>,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    service_id: Option<String>,
    #[serde(default)]
    route_id: Option<String>,
    #[serde(default)]
    consumer_id: Option<String>,
    #[serde(default)]
    service: Option<ResourceInstance>,
    #[serde(default)]
    route: Option<ResourceInstance>,
    #[serde(default)]
    consumer: Option<ResourceInstance>,
}

/// Nested reference first, then the flat field; empty ids count as absent.
fn reference(nested: Option<ResourceInstance>, flat: Option<String>) -> Option<String> {
    nested
        .map(|r| r.id)
        .filter(|id| !id.is_empty())
        .or(flat.filter(|id| !id.is_empty()))
}

impl From<PluginRecord> for Plugin {
    fn from(record: PluginRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            config: record.config,
            enabled: record.enabled,
            service_id: reference(record.service, record.service_id),
            route_id: reference(record.route, record.route_id),
            consumer_id: reference(record.consumer, record.consumer_id),
        }
    }
}

impl Default for Plugin {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            config: Map::new(),
            enabled: true,
            service_id: None,
            route_id: None,
            consumer_id: None,
        }
    }
}

impl Plugin {
    /// Rewrite every non-empty foreign key through `resolve`.
    ///
    /// A key that does not resolve is dropped, exactly as if the plugin never
    /// carried it.
    pub fn rewrite_references<F>(&mut self, mut resolve: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        for field in [&mut self.service_id, &mut self.route_id, &mut self.consumer_id] {
            *field = field
                .take()
                .filter(|local| !local.is_empty())
                .and_then(|local| resolve(&local));
        }
    }

    pub fn bare(&self) -> Plugin {
        Plugin {
            id: String::new(),
            ..self.clone()
        }
    }
}
