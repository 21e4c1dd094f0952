//! Export composition: flat per-kind collections → nested document.
//!
//! Each resource family that needs denormalising has its own strategy.
//! Everything else is copied through unchanged by `Passthrough`.

use crate::client::AdminClient;
use crate::fetch::Inventory;
use async_trait::async_trait;
use gongfig_core::certificate::Certificate;
use gongfig_core::consumer::{Consumer, KeyAuth};
use gongfig_core::plugin::Plugin;
use gongfig_core::route::Route;
use gongfig_core::service::Service;
use gongfig_core::upstream::{Target, Upstream};
use gongfig_core::{CatalogEntity, ConfigDocument, ResourceKind, SyncError};
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Shared inputs of every strategy.
pub struct ComposeContext<'a> {
    pub inventory: &'a Inventory,
    pub client: &'a AdminClient,
    pub page_size: u32,
}

#[async_trait]
pub trait CompositionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Inventory kinds this strategy folds into the document.
    fn consumes(&self) -> &'static [ResourceKind];

    async fn compose(&self, ctx: &ComposeContext<'_>, doc: &mut ConfigDocument) -> Result<(), SyncError>;
}

/// Routes nested under their owning service; services sorted by name.
pub struct ServiceRoutes;

#[async_trait]
impl CompositionStrategy for ServiceRoutes {
    fn name(&self) -> &'static str {
        "service-routes"
    }

    fn consumes(&self) -> &'static [ResourceKind] {
        &[ResourceKind::Service, ResourceKind::Route]
    }

    async fn compose(&self, ctx: &ComposeContext<'_>, doc: &mut ConfigDocument) -> Result<(), SyncError> {
        let mut services = Service::decode_all(ctx.inventory.items(ResourceKind::Service));
        let index: HashMap<String, usize> = services
            .iter()
            .enumerate()
            .map(|(pos, s)| (s.id.clone(), pos))
            .collect();

        for route in Route::decode_all(ctx.inventory.items(ResourceKind::Route)) {
            let owner = route.service_id().unwrap_or_default();
            let Some(&pos) = index.get(owner) else {
                return Err(SyncError::OrphanRoute {
                    route: route.id.clone(),
                    service: owner.to_string(),
                });
            };
            services[pos].routes.push(route.nested());
        }

        services.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
        doc.services = services;
        Ok(())
    }
}

/// Key-auth credential spliced onto its consumer as `key`.
pub struct ConsumerCredentials;

#[async_trait]
impl CompositionStrategy for ConsumerCredentials {
    fn name(&self) -> &'static str {
        "consumer-credentials"
    }

    fn consumes(&self) -> &'static [ResourceKind] {
        &[ResourceKind::Consumer, ResourceKind::KeyAuth]
    }

    async fn compose(&self, ctx: &ComposeContext<'_>, doc: &mut ConfigDocument) -> Result<(), SyncError> {
        let mut consumers = Consumer::decode_all(ctx.inventory.items(ResourceKind::Consumer));
        let index: HashMap<String, usize> = consumers
            .iter()
            .enumerate()
            .map(|(pos, c)| (c.id.clone(), pos))
            .collect();

        for key_auth in KeyAuth::decode_all(ctx.inventory.items(ResourceKind::KeyAuth)) {
            match key_auth.owner_id().and_then(|owner| index.get(owner)) {
                Some(&pos) => consumers[pos].key = Some(key_auth.key),
                None => warn!(owner = ?key_auth.owner_id(), "key-auth without a known consumer, skipped"),
            }
        }

        doc.consumers = consumers;
        Ok(())
    }
}

/// Targets fetched per upstream (there is no bulk targets collection).
pub struct UpstreamTargets;

#[async_trait]
impl CompositionStrategy for UpstreamTargets {
    fn name(&self) -> &'static str {
        "upstream-targets"
    }

    fn consumes(&self) -> &'static [ResourceKind] {
        &[ResourceKind::Upstream]
    }

    async fn compose(&self, ctx: &ComposeContext<'_>, doc: &mut ConfigDocument) -> Result<(), SyncError> {
        let mut upstreams = Upstream::decode_all(ctx.inventory.items(ResourceKind::Upstream));
        let targets_segment = ResourceKind::Target.path();

        for upstream in &mut upstreams {
            if upstream.id.is_empty() {
                continue;
            }
            let items = ctx
                .client
                .list(
                    &[ResourceKind::Upstream.path(), upstream.id.as_str(), targets_segment],
                    ctx.page_size,
                )
                .await?;
            upstream.targets = Target::decode_all(&items);
            debug!(upstream = %upstream.name, targets = upstream.targets.len(), "targets fetched");
        }

        doc.upstreams = upstreams;
        Ok(())
    }
}

/// Slot in the document for kinds copied through as-is.
pub trait DocumentEntity: CatalogEntity + Sync {
    fn slot(doc: &mut ConfigDocument) -> &mut Vec<Self>;
}

impl DocumentEntity for Certificate {
    fn slot(doc: &mut ConfigDocument) -> &mut Vec<Self> {
        &mut doc.certificates
    }
}

impl DocumentEntity for Plugin {
    fn slot(doc: &mut ConfigDocument) -> &mut Vec<Self> {
        &mut doc.plugins
    }
}

/// Items decoded and copied into the document unchanged.
pub struct Passthrough<T>(PhantomData<fn() -> T>);

impl<T> Passthrough<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Passthrough<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: DocumentEntity> CompositionStrategy for Passthrough<T> {
    fn name(&self) -> &'static str {
        T::KIND.path()
    }

    fn consumes(&self) -> &'static [ResourceKind] {
        std::slice::from_ref(&T::KIND.descriptor().kind)
    }

    async fn compose(&self, ctx: &ComposeContext<'_>, doc: &mut ConfigDocument) -> Result<(), SyncError> {
        *T::slot(doc) = T::decode_all(ctx.inventory.items(T::KIND));
        Ok(())
    }
}

/// Strategy registry, run in order.
pub struct ExportComposer {
    strategies: Vec<Box<dyn CompositionStrategy>>,
}

impl Default for ExportComposer {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ServiceRoutes),
            Box::new(UpstreamTargets),
            Box::new(ConsumerCredentials),
            Box::new(Passthrough::<Certificate>::new()),
            Box::new(Passthrough::<Plugin>::new()),
        ])
    }
}

impl ExportComposer {
    pub fn new(strategies: Vec<Box<dyn CompositionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Inventory kinds some strategy handles.
    pub fn covered_kinds(&self) -> Vec<ResourceKind> {
        let mut kinds: Vec<ResourceKind> = self
            .strategies
            .iter()
            .flat_map(|s| s.consumes().iter().copied())
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    pub async fn compose(
        &self,
        inventory: &Inventory,
        client: &AdminClient,
        page_size: u32,
    ) -> Result<ConfigDocument, SyncError> {
        let covered = self.covered_kinds();
        for kind in inventory.kinds() {
            if !covered.contains(&kind) {
                warn!(kind = %kind, "no composition strategy, collection left out of the export");
            }
        }

        let ctx = ComposeContext {
            inventory,
            client,
            page_size,
        };
        let mut doc = ConfigDocument::default();
        for strategy in &self.strategies {
            strategy.compose(&ctx, &mut doc).await?;
            debug!(strategy = strategy.name(), "composed");
        }
        Ok(doc)
    }
}
