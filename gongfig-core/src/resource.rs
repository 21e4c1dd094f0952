//! Tagged-variant view over every resource the catalog knows about.
//!
//! Items arrive from the admin API as untyped JSON. Each one is decoded
//! against the struct its catalog kind declares, never against a guess.

use crate::catalog::ResourceKind;
use crate::certificate::Certificate;
use crate::consumer::{Consumer, KeyAuth};
use crate::plugin::Plugin;
use crate::route::Route;
use crate::service::Service;
use crate::upstream::{Target, Upstream};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Projection exposing only an identifier. Used both for `{"id": ...}`
/// references embedded in other resources and to read the id out of an
/// otherwise untyped item or creation response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInstance {
    #[serde(default)]
    pub id: String,
}

impl ResourceInstance {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Read the id out of any JSON value. Anything without a string `id`
    /// yields an empty id.
    pub fn project(value: &Value) -> Self {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { id }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Service(Service),
    Route(Route),
    Certificate(Certificate),
    Consumer(Consumer),
    KeyAuth(KeyAuth),
    Plugin(Plugin),
    Upstream(Upstream),
    Target(Target),
}

impl Resource {
    /// Decode `value` as the struct declared for `kind`.
    pub fn decode(kind: ResourceKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ResourceKind::Service => Resource::Service(serde_json::from_value(value)?),
            ResourceKind::Route => Resource::Route(serde_json::from_value(value)?),
            ResourceKind::Certificate => Resource::Certificate(serde_json::from_value(value)?),
            ResourceKind::Consumer => Resource::Consumer(serde_json::from_value(value)?),
            ResourceKind::KeyAuth => Resource::KeyAuth(serde_json::from_value(value)?),
            ResourceKind::Plugin => Resource::Plugin(serde_json::from_value(value)?),
            ResourceKind::Upstream => Resource::Upstream(serde_json::from_value(value)?),
            ResourceKind::Target => Resource::Target(serde_json::from_value(value)?),
        })
    }

    /// Decode, degrading to the kind's zero value on failure.
    pub fn decode_or_empty(kind: ResourceKind, value: Value) -> Self {
        match Self::decode(kind, value) {
            Ok(resource) => resource,
            Err(e) => {
                tracing::warn!(kind = kind.path(), error = %e, "item could not be decoded, using empty record");
                Self::empty(kind)
            }
        }
    }

    pub fn empty(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Service => Resource::Service(Service::default()),
            ResourceKind::Route => Resource::Route(Route::default()),
            ResourceKind::Certificate => Resource::Certificate(Certificate::default()),
            ResourceKind::Consumer => Resource::Consumer(Consumer::default()),
            ResourceKind::KeyAuth => Resource::KeyAuth(KeyAuth::default()),
            ResourceKind::Plugin => Resource::Plugin(Plugin::default()),
            ResourceKind::Upstream => Resource::Upstream(Upstream::default()),
            ResourceKind::Target => Resource::Target(Target::default()),
        }
    }
}

/// A struct that is the declared shape of exactly one catalog kind.
pub trait CatalogEntity: DeserializeOwned + Serialize + Default + Send + 'static {
    const KIND: ResourceKind;

    fn from_resource(resource: Resource) -> Option<Self>;

    /// Decode a batch of raw items, degrading undecodable ones to defaults.
    fn decode_all(items: &[Value]) -> Vec<Self> {
        items
            .iter()
            .cloned()
            .map(|item| Self::from_resource(Resource::decode_or_empty(Self::KIND, item)).unwrap_or_default())
            .collect()
    }
}

macro_rules! catalog_entity {
    ($ty:ty, $variant:ident) => {
        impl CatalogEntity for $ty {
            const KIND: ResourceKind = ResourceKind::$variant;

            fn from_resource(resource: Resource) -> Option<Self> {
                match resource {
                    Resource::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

catalog_entity!(Service, Service);
catalog_entity!(Route, Route);
catalog_entity!(Certificate, Certificate);
catalog_entity!(Consumer, Consumer);
catalog_entity!(KeyAuth, KeyAuth);
catalog_entity!(Plugin, Plugin);
catalog_entity!(Upstream, Upstream);
catalog_entity!(Target, Target);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_uses_declared_shape() {
        let r = Resource::decode(ResourceKind::Route, json!({"id": "r1", "paths": ["/a"]})).unwrap();
        match r {
            Resource::Route(route) => assert_eq!(route.id, "r1"),
            other => panic!("expected route, got {other:?}"),
        }
    }

    #[test]
    fn undecodable_item_becomes_empty_record() {
        // port must be a number
        let r = Resource::decode_or_empty(ResourceKind::Service, json!({"id": "s1", "port": "eighty"}));
        assert_eq!(r, Resource::Service(Service::default()));
    }

    #[test]
    fn decode_all_keeps_item_count() {
        let items = vec![json!({"id": "c1", "cert": "A"}), json!("not-an-object")];
        let certs = Certificate::decode_all(&items);
        assert_eq!(certs.len(), 2);
        assert_eq!(certs[0].id, "c1");
        assert_eq!(certs[1], Certificate::default());
    }

    #[test]
    fn projection_reads_only_the_id() {
        let inst = ResourceInstance::project(&json!({"id": "p1", "name": "cors"}));
        assert_eq!(inst.id, "p1");
        assert_eq!(ResourceInstance::project(&json!({"name": "x"})).id, "");
        assert_eq!(ResourceInstance::project(&json!({"id": 7})).id, "");
    }
}
