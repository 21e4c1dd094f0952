use crate::client::AdminClient;
use crate::pool::WorkerPool;
use crate::remap::IdMap;
use dashmap::DashMap;
use gongfig_core::certificate::Certificate;
use gongfig_core::consumer::{Consumer, KeyAuth};
use gongfig_core::plugin::Plugin;
use gongfig_core::service::Service;
use gongfig_core::upstream::Upstream;
use gongfig_core::{ConfigDocument, ResourceKind, SyncError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Resources created per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: BTreeMap<ResourceKind, usize>,
}

impl ImportReport {
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.created.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.created.values().sum()
    }
}

#[derive(Clone, Default)]
struct Tally(Arc<DashMap<ResourceKind, usize>>);

impl Tally {
    fn bump(&self, kind: ResourceKind) {
        *self.0.entry(kind).or_insert(0) += 1;
    }

    fn report(&self) -> ImportReport {
        ImportReport {
            created: self.0.iter().map(|e| (*e.key(), *e.value())).collect(),
        }
    }
}

/// Creates a document's resources on the gateway.
///
/// Phase 1 creates the independent families (services with their routes,
/// upstreams with their targets, certificates, consumers with their
/// credential) concurrently. Phase 2 creates plugins, whose references are
/// rewritten to the identifiers phase 1 got back, and only starts once every
/// phase 1 task has finished.
///
/// Nothing is checked for prior existence: importing twice creates
/// everything twice.
pub struct Importer {
    client: AdminClient,
    concurrency: usize,
}

impl Importer {
    pub fn new(client: AdminClient, concurrency: usize) -> Self {
        Self { client, concurrency }
    }

    pub async fn import(&self, doc: ConfigDocument) -> Result<ImportReport, SyncError> {
        let ids = IdMap::new();
        let tally = Tally::default();
        let mut pool = WorkerPool::new(self.concurrency);

        for service in doc.services {
            let task = create_service_with_routes(self.client.clone(), service, ids.clone(), tally.clone());
            pool.spawn(task).await?;
        }
        for upstream in doc.upstreams {
            let task = create_upstream_with_targets(self.client.clone(), upstream, tally.clone());
            pool.spawn(task).await?;
        }
        for certificate in doc.certificates {
            let task = create_certificate(self.client.clone(), certificate, ids.clone(), tally.clone());
            pool.spawn(task).await?;
        }
        for consumer in doc.consumers {
            let task = create_consumer_with_key_auth(self.client.clone(), consumer, ids.clone(), tally.clone());
            pool.spawn(task).await?;
        }

        pool.drain().await?;
        info!(mapped = ids.len(), "independent resources created");

        for mut plugin in doc.plugins {
            let name = plugin.name.clone();
            plugin.rewrite_references(|local| {
                let remote = ids.resolve(local);
                if remote.is_none() {
                    warn!(plugin = %name, local, "referenced resource was not created in this run, reference dropped");
                }
                remote
            });
            let task = create_plugin(self.client.clone(), plugin, tally.clone());
            pool.spawn(task).await?;
        }
        pool.drain().await?;

        let report = tally.report();
        info!(created = report.total(), "import finished");
        Ok(report)
    }
}

/// Path segment addressing a freshly created parent: its name when it has
/// one, its new identifier otherwise.
fn parent_segment(name: Option<&str>, remote_id: &str, child: ResourceKind) -> Result<String, SyncError> {
    name.filter(|n| !n.is_empty())
        .or(Some(remote_id).filter(|id| !id.is_empty()))
        .map(str::to_string)
        .ok_or(SyncError::MissingParent { kind: child.path() })
}

fn child_segment(kind: ResourceKind) -> &'static str {
    kind.nested_segment().unwrap_or_else(|| kind.path())
}

async fn create_service_with_routes(
    client: AdminClient,
    service: Service,
    ids: IdMap,
    tally: Tally,
) -> Result<(), SyncError> {
    let services = ResourceKind::Service.path();
    let remote_id = client
        .create(&[services], &service.bare())
        .await
        .inspect_err(|e| error!(service = ?service.name, error = %e, "failed to create service"))?;
    ids.add(&service.id, &remote_id);
    tally.bump(ResourceKind::Service);

    if service.routes.is_empty() {
        return Ok(());
    }

    // Routes go one by one: they hang off the service just created.
    let parent = parent_segment(service.name.as_deref(), &remote_id, ResourceKind::Route)?;
    let segments = [services, parent.as_str(), child_segment(ResourceKind::Route)];
    for route in &service.routes {
        let route_id = client
            .create(&segments, &route.bare())
            .await
            .inspect_err(|e| error!(service = %parent, paths = ?route.paths, error = %e, "failed to create route"))?;
        ids.add(&route.id, &route_id);
        tally.bump(ResourceKind::Route);
    }
    Ok(())
}

async fn create_upstream_with_targets(
    client: AdminClient,
    upstream: Upstream,
    tally: Tally,
) -> Result<(), SyncError> {
    let upstreams = ResourceKind::Upstream.path();
    let remote_id = client
        .create(&[upstreams], &upstream.bare())
        .await
        .inspect_err(|e| error!(upstream = %upstream.name, error = %e, "failed to create upstream"))?;
    tally.bump(ResourceKind::Upstream);

    if upstream.targets.is_empty() {
        return Ok(());
    }

    let parent = parent_segment(Some(&upstream.name), &remote_id, ResourceKind::Target)?;
    let segments = [upstreams, parent.as_str(), child_segment(ResourceKind::Target)];
    for target in &upstream.targets {
        client
            .create(&segments, target)
            .await
            .inspect_err(|e| error!(upstream = %parent, target = %target.target, error = %e, "failed to create target"))?;
        tally.bump(ResourceKind::Target);
    }
    Ok(())
}

async fn create_certificate(
    client: AdminClient,
    certificate: Certificate,
    ids: IdMap,
    tally: Tally,
) -> Result<(), SyncError> {
    let remote_id = client
        .create(&[ResourceKind::Certificate.path()], &certificate.bare())
        .await
        .inspect_err(|e| error!(snis = ?certificate.snis, error = %e, "failed to create certificate"))?;
    ids.add(&certificate.id, &remote_id);
    tally.bump(ResourceKind::Certificate);
    Ok(())
}

async fn create_consumer_with_key_auth(
    client: AdminClient,
    consumer: Consumer,
    ids: IdMap,
    tally: Tally,
) -> Result<(), SyncError> {
    let consumers = ResourceKind::Consumer.path();
    let remote_id = client
        .create(&[consumers], &consumer.bare())
        .await
        .inspect_err(|e| error!(consumer = ?consumer.username, error = %e, "failed to create consumer"))?;
    ids.add(&consumer.id, &remote_id);
    tally.bump(ResourceKind::Consumer);

    let Some(key) = consumer.credential() else {
        return Ok(());
    };

    let parent = parent_segment(None, &remote_id, ResourceKind::KeyAuth)?;
    client
        .create(
            &[consumers, parent.as_str(), child_segment(ResourceKind::KeyAuth)],
            &KeyAuth::for_key(key),
        )
        .await
        .inspect_err(|e| error!(consumer = %parent, error = %e, "failed to create key-auth"))?;
    tally.bump(ResourceKind::KeyAuth);
    Ok(())
}

async fn create_plugin(client: AdminClient, plugin: Plugin, tally: Tally) -> Result<(), SyncError> {
    client
        .create(&[ResourceKind::Plugin.path()], &plugin.bare())
        .await
        .inspect_err(|e| error!(plugin = %plugin.name, error = %e, "failed to create plugin"))?;
    tally.bump(ResourceKind::Plugin);
    Ok(())
}
