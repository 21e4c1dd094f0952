use crate::client::AdminClient;
use crate::compose::ExportComposer;
use crate::fetch::fetch_inventory;
use crate::flush::{FlushReport, Flusher};
use crate::import::{ImportReport, Importer};
use crate::persist;
use gongfig_core::catalog::fetched_kinds;
use gongfig_core::config::SyncConfig;
use gongfig_core::{ConfigDocument, SyncError};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Export / import / flush against one gateway.
///
/// Each operation runs to completion or returns the first fatal error; there
/// is no retry and no rollback.
pub struct SyncEngine {
    client: AdminClient,
    concurrency: usize,
    page_size: u32,
    composer: ExportComposer,
}

impl SyncEngine {
    pub fn new(client: AdminClient, concurrency: usize, page_size: u32) -> Self {
        Self {
            client,
            concurrency,
            page_size,
            composer: ExportComposer::default(),
        }
    }

    /// Engine over a real HTTP transport, as configured.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        config.validate()?;
        let client = AdminClient::http(&config.admin.url, Duration::from_secs(config.admin.timeout_secs))?;
        Ok(Self::new(client, config.sync.concurrency, config.sync.page_size))
    }

    /// Fetch the gateway's state and compose it into a document.
    pub async fn export_document(&self) -> Result<ConfigDocument, SyncError> {
        let inventory = fetch_inventory(&self.client, &fetched_kinds(), self.page_size).await?;
        self.composer.compose(&inventory, &self.client, self.page_size).await
    }

    pub async fn export(&self, path: &Path) -> Result<ConfigDocument, SyncError> {
        let doc = self.export_document().await?;
        persist::write_document(path, &doc)?;
        if doc.is_empty() {
            warn!(path = %path.display(), "gateway has no managed resources, exported an empty document");
        }
        info!(
            path = %path.display(),
            services = doc.services.len(),
            routes = doc.route_count(),
            upstreams = doc.upstreams.len(),
            consumers = doc.consumers.len(),
            certificates = doc.certificates.len(),
            plugins = doc.plugins.len(),
            "configuration exported"
        );
        Ok(doc)
    }

    pub async fn import_document(&self, doc: ConfigDocument) -> Result<ImportReport, SyncError> {
        Importer::new(self.client.clone(), self.concurrency).import(doc).await
    }

    /// Read `path` and create everything in it. The file is parsed in full
    /// before the first request goes out.
    pub async fn import(&self, path: &Path) -> Result<ImportReport, SyncError> {
        let doc = persist::read_document(path)?;
        info!(path = %path.display(), "configuration loaded");
        self.import_document(doc).await
    }

    pub async fn flush(&self) -> Result<FlushReport, SyncError> {
        Flusher::new(self.client.clone(), self.concurrency, self.page_size)
            .flush()
            .await
    }
}
