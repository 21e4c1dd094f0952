use crate::client::{AdminClient, Deletion};
use crate::fetch::{Inventory, fetch_inventory};
use crate::pool::WorkerPool;
use gongfig_core::catalog::flush_order;
use gongfig_core::{ResourceInstance, ResourceKind, SyncError};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub deleted: BTreeMap<ResourceKind, usize>,
    /// Deletes answered with 404 because a parent already took them along.
    pub already_gone: BTreeMap<ResourceKind, usize>,
}

impl FlushReport {
    pub fn deleted(&self, kind: ResourceKind) -> usize {
        self.deleted.get(&kind).copied().unwrap_or(0)
    }

    pub fn already_gone(&self, kind: ResourceKind) -> usize {
        self.already_gone.get(&kind).copied().unwrap_or(0)
    }
}

/// Deletes every managed resource from the gateway.
///
/// Kinds are processed one after the other in catalog flush order (children
/// first); instances of one kind are deleted concurrently.
pub struct Flusher {
    client: AdminClient,
    concurrency: usize,
    page_size: u32,
}

impl Flusher {
    pub fn new(client: AdminClient, concurrency: usize, page_size: u32) -> Self {
        Self {
            client,
            concurrency,
            page_size,
        }
    }

    pub async fn flush(&self) -> Result<FlushReport, SyncError> {
        let order = flush_order();
        let inventory = fetch_inventory(&self.client, &order, self.page_size).await?;
        self.delete_all(&inventory, &order).await
    }

    /// Delete everything in `inventory`, kind by kind, in `order`.
    pub async fn delete_all(
        &self,
        inventory: &Inventory,
        order: &[ResourceKind],
    ) -> Result<FlushReport, SyncError> {
        let mut report = FlushReport::default();

        for &kind in order {
            let deleted = Arc::new(AtomicUsize::new(0));
            let gone = Arc::new(AtomicUsize::new(0));
            let mut pool = WorkerPool::new(self.concurrency);

            for item in inventory.items(kind) {
                let instance = ResourceInstance::project(item);
                if instance.id.is_empty() {
                    warn!(kind = %kind, "item without an id, skipped");
                    continue;
                }
                let client = self.client.clone();
                let deleted = Arc::clone(&deleted);
                let gone = Arc::clone(&gone);
                pool.spawn(async move {
                    let outcome = match client.delete(kind.path(), &instance.id).await {
                        Ok(Deletion::Deleted) => {
                            deleted.fetch_add(1, Ordering::Relaxed);
                            Ok(())
                        }
                        Ok(Deletion::NotFound) if kind.descriptor().cascade_deleted => {
                            info!(kind = %kind, id = %instance.id, "already deleted along with its parent");
                            gone.fetch_add(1, Ordering::Relaxed);
                            Ok(())
                        }
                        Ok(Deletion::NotFound) => Err(SyncError::UnexpectedStatus {
                            method: "DELETE",
                            url: client.url(&[kind.path(), instance.id.as_str()]).to_string(),
                            status: 404,
                            message: None,
                        }),
                        Err(e) => Err(e),
                    };
                    outcome.inspect_err(|e| error!(kind = %kind, id = %instance.id, error = %e, "failed to delete"))
                })
                .await?;
            }

            // Parents are only touched once all their children are gone.
            pool.drain().await?;

            let (deleted, gone) = (deleted.load(Ordering::Relaxed), gone.load(Ordering::Relaxed));
            info!(kind = %kind, deleted, already_gone = gone, "collection flushed");
            report.deleted.insert(kind, deleted);
            if gone > 0 {
                report.already_gone.insert(kind, gone);
            }
        }

        Ok(report)
    }
}
