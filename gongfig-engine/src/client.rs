//! Admin API access.
//!
//! `AdminTransport` is the seam between the engine and the network: the
//! engine only ever sees `(status, body)` pairs or a transport error.
//! `AdminClient` layers URL composition, status checks and envelope
//! decoding on top of it.

use async_trait::async_trait;
use gongfig_core::{ResourceInstance, SyncError};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Raw admin API response.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `message` field of an error body, if there is one.
    pub fn message(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<String>,
        }
        serde_json::from_slice::<ErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.message)
    }
}

#[async_trait]
pub trait AdminTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Reply, SyncError>;
    async fn post(&self, url: &Url, body: &Value) -> Result<Reply, SyncError>;
    async fn delete(&self, url: &Url) -> Result<Reply, SyncError>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        method: &'static str,
        url: &Url,
        request: reqwest::RequestBuilder,
    ) -> Result<Reply, SyncError> {
        let transport_error = |e: reqwest::Error| SyncError::Transport {
            method,
            url: url.to_string(),
            reason: e.to_string(),
        };
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?.to_vec();
        debug!(method, url = %url, status, "admin API responded");
        Ok(Reply { status, body })
    }
}

#[async_trait]
impl AdminTransport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Reply, SyncError> {
        self.send("GET", url, self.client.get(url.clone())).await
    }

    async fn post(&self, url: &Url, body: &Value) -> Result<Reply, SyncError> {
        self.send("POST", url, self.client.post(url.clone()).json(body)).await
    }

    async fn delete(&self, url: &Url) -> Result<Reply, SyncError> {
        self.send("DELETE", url, self.client.delete(url.clone())).await
    }
}

/// `{"data": [...]}` list envelope.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<Value>,
}

/// Outcome of a DELETE the caller may still want to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    NotFound,
}

/// Cheap-to-clone handle on the admin API at one base URL.
#[derive(Clone)]
pub struct AdminClient {
    transport: Arc<dyn AdminTransport>,
    base: Url,
}

impl AdminClient {
    pub fn new(transport: Arc<dyn AdminTransport>, base_url: &str) -> Result<Self, SyncError> {
        let invalid = |reason: String| SyncError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL".into()));
        }
        Ok(Self { transport, base })
    }

    /// `reqwest` transport with the given request timeout.
    pub fn http(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        Self::new(Arc::new(HttpTransport::new(timeout)?), base_url)
    }

    /// Append `segments` to the base path.
    /// e.g. `http://localhost:8001` + `[services, mail, routes]`
    /// → `http://localhost:8001/services/mail/routes`
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET a collection and unwrap its envelope.
    ///
    /// Anything that is not a list envelope yields no items.
    pub async fn list(&self, segments: &[&str], page_size: u32) -> Result<Vec<Value>, SyncError> {
        let mut url = self.url(segments);
        url.query_pairs_mut()
            .append_pair("size", &page_size.to_string());

        let reply = self.transport.get(&url).await?;
        if !reply.is_success() {
            warn!(url = %url, status = reply.status, message = ?reply.message(), "list request was not successful");
        }
        match serde_json::from_slice::<Envelope>(&reply.body) {
            Ok(envelope) => Ok(envelope.data),
            Err(e) => {
                warn!(url = %url, error = %e, "list response could not be decoded, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// POST `body` and return the identifier the gateway assigned.
    /// An unreadable response body yields an empty identifier.
    pub async fn create<T: Serialize>(&self, segments: &[&str], body: &T) -> Result<String, SyncError> {
        let url = self.url(segments);
        let body = serde_json::to_value(body)?;
        let reply = self.transport.post(&url, &body).await?;
        if !reply.is_success() {
            return Err(SyncError::UnexpectedStatus {
                method: "POST",
                url: url.to_string(),
                status: reply.status,
                message: reply.message(),
            });
        }
        let created = serde_json::from_slice::<Value>(&reply.body)
            .map(|v| ResourceInstance::project(&v))
            .unwrap_or_default();
        Ok(created.id)
    }

    /// DELETE `{path}/{id}`. A 404 is reported rather than failed so the
    /// caller can decide whether it was expected.
    pub async fn delete(&self, path: &str, id: &str) -> Result<Deletion, SyncError> {
        let url = self.url(&[path, id]);
        let reply = self.transport.delete(&url).await?;
        match reply.status {
            s if (200..300).contains(&s) => Ok(Deletion::Deleted),
            404 => Ok(Deletion::NotFound),
            status => Err(SyncError::UnexpectedStatus {
                method: "DELETE",
                url: url.to_string(),
                status,
                message: reply.message(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Answers every request with the same reply and remembers the URLs.
    struct Canned {
        reply: Reply,
        seen: Mutex<Vec<String>>,
    }

    impl Canned {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Reply { status, body: body.as_bytes().to_vec() },
                seen: Mutex::new(Vec::new()),
            })
        }

        fn record(&self, url: &Url) -> Result<Reply, SyncError> {
            self.seen.lock().unwrap().push(url.to_string());
            Ok(self.reply.clone())
        }
    }

    #[async_trait]
    impl AdminTransport for Canned {
        async fn get(&self, url: &Url) -> Result<Reply, SyncError> {
            self.record(url)
        }
        async fn post(&self, url: &Url, _body: &Value) -> Result<Reply, SyncError> {
            self.record(url)
        }
        async fn delete(&self, url: &Url) -> Result<Reply, SyncError> {
            self.record(url)
        }
    }

    #[test]
    fn url_appends_segments_to_base_path() {
        let client = AdminClient::new(Canned::new(200, "{}"), "http://kong:8001/admin/").unwrap();
        assert_eq!(
            client.url(&["services", "mail", "routes"]).as_str(),
            "http://kong:8001/admin/services/mail/routes"
        );
        let root = AdminClient::new(Canned::new(200, "{}"), "http://localhost:8001").unwrap();
        assert_eq!(root.url(&["plugins"]).as_str(), "http://localhost:8001/plugins");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            AdminClient::new(Canned::new(200, "{}"), "not a url"),
            Err(SyncError::InvalidUrl { .. })
        ));
        assert!(matches!(
            AdminClient::new(Canned::new(200, "{}"), "mailto:ops@example.com"),
            Err(SyncError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn list_sends_page_size_and_unwraps_envelope() {
        let transport = Canned::new(200, r#"{"data": [{"id": "a"}, {"id": "b"}], "next": null}"#);
        let client = AdminClient::new(transport.clone(), "http://localhost:8001").unwrap();
        let items = client.list(&["services"], 500).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            transport.seen.lock().unwrap()[0],
            "http://localhost:8001/services?size=500"
        );
    }

    #[tokio::test]
    async fn undecodable_list_is_empty() {
        let client = AdminClient::new(Canned::new(200, "<html>"), "http://localhost:8001").unwrap();
        assert!(client.list(&["routes"], 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_returns_remote_id() {
        let client = AdminClient::new(Canned::new(201, r#"{"id": "remote-1"}"#), "http://localhost:8001").unwrap();
        let id = client.create(&["services"], &serde_json::json!({"name": "a"})).await.unwrap();
        assert_eq!(id, "remote-1");
    }

    #[tokio::test]
    async fn create_failure_carries_server_message() {
        let client = AdminClient::new(
            Canned::new(400, r#"{"message": "schema violation (host: required field missing)"}"#),
            "http://localhost:8001",
        )
        .unwrap();
        let err = client.create(&["services"], &serde_json::json!({})).await.unwrap_err();
        assert_eq!(err.server_message(), Some("schema violation (host: required field missing)"));
        assert!(matches!(err, SyncError::UnexpectedStatus { status: 400, .. }));
    }

    #[tokio::test]
    async fn delete_distinguishes_not_found() {
        let gone = AdminClient::new(Canned::new(404, ""), "http://localhost:8001").unwrap();
        assert_eq!(gone.delete("plugins", "p1").await.unwrap(), Deletion::NotFound);
        let ok = AdminClient::new(Canned::new(204, ""), "http://localhost:8001").unwrap();
        assert_eq!(ok.delete("plugins", "p1").await.unwrap(), Deletion::Deleted);
        let broken = AdminClient::new(Canned::new(500, ""), "http://localhost:8001").unwrap();
        assert!(broken.delete("certificates", "c1").await.is_err());
    }
}
