use dashmap::DashMap;
use std::sync::Arc;

/// Local identifier → identifier assigned by the gateway.
///
/// Written concurrently while independent resources are created, read only
/// after every writer has finished. A miss is indistinguishable from a
/// reference that was never there.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    inner: Arc<DashMap<String, String>>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mapping. Empty identifiers on either side carry no
    /// information and are ignored.
    pub fn add(&self, local: &str, remote: &str) {
        if local.is_empty() || remote.is_empty() {
            return;
        }
        self.inner.insert(local.to_string(), remote.to_string());
    }

    pub fn resolve(&self, local: &str) -> Option<String> {
        self.inner.get(local).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
