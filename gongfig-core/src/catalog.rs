//! Static description of every resource type Gongfig moves around.
//!
//! Admin API layout:
//! ```text
//! /routes                         GET, DELETE /routes/{id}
//! /services                       GET, POST, DELETE /services/{id}
//! /services/{name}/routes         POST
//! /certificates                   GET, POST, DELETE /certificates/{id}
//! /key-auths                      GET
//! /consumers/{id}/key-auth        POST
//! /plugins                        GET, POST, DELETE /plugins/{id}
//! /upstreams                      GET, POST, DELETE /upstreams/{id}
//! /upstreams/{name}/targets       GET, POST
//! /consumers                      GET, POST, DELETE /consumers/{id}
//! ```
//!
//! Catalog order is child before parent. Flush walks it forwards.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Route,
    Service,
    Certificate,
    KeyAuth,
    Plugin,
    Target,
    Upstream,
    Consumer,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,

    /// Top-level collection path. `None` when only reachable through a parent.
    pub path: Option<&'static str>,

    /// Parent kind and the path segment used below `{parent}/{key}/`.
    pub nested_under: Option<(ResourceKind, &'static str)>,

    /// Deleted explicitly during flush. Entries that disappear with their
    /// parent are left out.
    pub flushed: bool,

    /// A 404 on delete means the parent already took it with it.
    pub cascade_deleted: bool,
}

pub const CATALOG: &[ResourceDescriptor] = &[
    ResourceDescriptor {
        kind: ResourceKind::Route,
        path: Some("routes"),
        nested_under: Some((ResourceKind::Service, "routes")),
        flushed: true,
        cascade_deleted: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Service,
        path: Some("services"),
        nested_under: None,
        flushed: true,
        cascade_deleted: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Certificate,
        path: Some("certificates"),
        nested_under: None,
        flushed: true,
        cascade_deleted: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::KeyAuth,
        path: Some("key-auths"),
        nested_under: Some((ResourceKind::Consumer, "key-auth")),
        flushed: false,
        cascade_deleted: true,
    },
    ResourceDescriptor {
        kind: ResourceKind::Plugin,
        path: Some("plugins"),
        nested_under: None,
        flushed: true,
        cascade_deleted: true,
    },
    ResourceDescriptor {
        kind: ResourceKind::Target,
        path: None,
        nested_under: Some((ResourceKind::Upstream, "targets")),
        flushed: false,
        cascade_deleted: true,
    },
    ResourceDescriptor {
        kind: ResourceKind::Upstream,
        path: Some("upstreams"),
        nested_under: None,
        flushed: true,
        cascade_deleted: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Consumer,
        path: Some("consumers"),
        nested_under: None,
        flushed: true,
        cascade_deleted: false,
    },
];

impl ResourceKind {
    pub fn descriptor(self) -> &'static ResourceDescriptor {
        CATALOG
            .iter()
            .find(|d| d.kind == self)
            .unwrap_or_else(|| unreachable!("{self:?} missing from catalog"))
    }

    /// Collection path, or the nested segment for kinds without one.
    pub fn path(self) -> &'static str {
        let d = self.descriptor();
        d.path
            .or(d.nested_under.map(|(_, segment)| segment))
            .unwrap_or_default()
    }

    /// Path segment below the parent, e.g. `routes` in `services/{name}/routes`.
    pub fn nested_segment(self) -> Option<&'static str> {
        self.descriptor().nested_under.map(|(_, segment)| segment)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Kinds with a top-level collection, in catalog order. This is what a full
/// inventory fetch requests.
pub fn fetched_kinds() -> Vec<ResourceKind> {
    CATALOG
        .iter()
        .filter(|d| d.path.is_some())
        .map(|d| d.kind)
        .collect()
}

/// Kinds deleted during flush, children first.
pub fn flush_order() -> Vec<ResourceKind> {
    CATALOG.iter().filter(|d| d.flushed).map(|d| d.kind).collect()
}
