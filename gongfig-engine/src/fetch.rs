use crate::client::AdminClient;
use gongfig_core::{ResourceKind, SyncError};
use serde_json::Value;
use std::collections::HashMap;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Flat per-kind collections as the admin API returned them.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    collections: HashMap<ResourceKind, Vec<Value>>,
}

impl Inventory {
    /// Items fetched for `kind`; empty when the kind was not fetched.
    pub fn items(&self, kind: ResourceKind) -> &[Value] {
        self.collections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.collections.keys().copied()
    }

    /// Record one delivery. A kind is only ever delivered once.
    pub fn insert(&mut self, kind: ResourceKind, items: Vec<Value>) -> Result<(), SyncError> {
        if self.collections.insert(kind, items).is_some() {
            return Err(SyncError::Internal(format!("{kind} delivered twice")));
        }
        Ok(())
    }

    pub fn total(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }
}

/// Fetch every kind in `kinds` concurrently, one request each, and join
/// exactly `kinds.len()` results.
///
/// A transport failure on any request fails the whole fetch; the other
/// requests are abandoned.
pub async fn fetch_inventory(
    client: &AdminClient,
    kinds: &[ResourceKind],
    page_size: u32,
) -> Result<Inventory, SyncError> {
    let mut tasks = JoinSet::new();
    for &kind in kinds {
        let client = client.clone();
        tasks.spawn(async move {
            let items = client.list(&[kind.path()], page_size).await?;
            debug!(kind = %kind, count = items.len(), "collection fetched");
            Ok::<_, SyncError>((kind, items))
        });
    }

    let mut inventory = Inventory::default();
    for _ in 0..kinds.len() {
        let delivered = tasks
            .join_next()
            .await
            .ok_or_else(|| SyncError::Internal("fetch task vanished".into()))?
            .map_err(|e| SyncError::Internal(format!("fetch task failed: {e}")))?;
        let (kind, items) = delivered?;
        inventory.insert(kind, items)?;
    }

    info!(kinds = kinds.len(), items = inventory.total(), "inventory fetched");
    Ok(inventory)
}
