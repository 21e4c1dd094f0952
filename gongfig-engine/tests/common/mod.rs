//! In-memory admin API used by the engine integration tests.
//!
//! Every request is recorded. Collections are keyed by URL path
//! (`services`, `upstreams/u1/targets`, ...); POST assigns `remote-N`
//! identifiers, GET wraps a collection in `{"data": [...]}`, DELETE answers
//! 204 unless told otherwise.

#![allow(dead_code)]

use async_trait::async_trait;
use gongfig_engine::client::{AdminClient, AdminTransport, Reply};
use gongfig_core::SyncError;
use reqwest::Url;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "http://kong.test:8001";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<Value>>,
    calls: Vec<Call>,
    canned: HashMap<(Method, String), (u16, Value)>,
    refused: Vec<String>,
    next_id: usize,
}

#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<State>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn client(self: &Arc<Self>) -> AdminClient {
        AdminClient::new(self.clone(), BASE_URL).unwrap()
    }

    /// Seed a collection.
    pub fn seed(&self, path: &str, items: Vec<Value>) -> &Self {
        self.state
            .lock()
            .unwrap()
            .collections
            .insert(path.to_string(), items);
        self
    }

    /// Answer `method path` with `status` and `body` instead of the default.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.state
            .lock()
            .unwrap()
            .canned
            .insert((method, path.to_string()), (status, body));
        self
    }

    /// Fail every request to `path` at the transport level.
    pub fn refuse(&self, path: &str) -> &Self {
        self.state.lock().unwrap().refused.push(path.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }

    /// Bodies POSTed to `path`, in request order.
    pub fn posted(&self, path: &str) -> Vec<Value> {
        self.calls_to(Method::Post, path)
            .into_iter()
            .filter_map(|c| c.body)
            .collect()
    }

    pub fn collection(&self, path: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    fn handle(&self, method: Method, url: &Url, body: Option<&Value>) -> Result<Reply, SyncError> {
        let path = url.path().trim_start_matches('/').to_string();
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            method,
            path: path.clone(),
            body: body.cloned(),
        });

        if state.refused.contains(&path) {
            return Err(SyncError::Transport {
                method: match method {
                    Method::Get => "GET",
                    Method::Post => "POST",
                    Method::Delete => "DELETE",
                },
                url: url.to_string(),
                reason: "connection refused".into(),
            });
        }
        if let Some((status, body)) = state.canned.get(&(method, path.clone())) {
            return Ok(reply(*status, body));
        }

        Ok(match method {
            Method::Get => {
                let items = state.collections.get(&path).cloned().unwrap_or_default();
                reply(200, &json!({ "data": items, "next": null }))
            }
            Method::Post => {
                state.next_id += 1;
                let mut item = body.cloned().unwrap_or_else(|| json!({}));
                item["id"] = json!(format!("remote-{}", state.next_id));
                state.collections.entry(path).or_default().push(item.clone());
                reply(201, &item)
            }
            Method::Delete => {
                if let Some((collection, id)) = path.rsplit_once('/')
                    && let Some(items) = state.collections.get_mut(collection)
                {
                    items.retain(|item| item["id"] != id);
                }
                Reply { status: 204, body: Vec::new() }
            }
        })
    }
}

fn reply(status: u16, body: &Value) -> Reply {
    Reply {
        status,
        body: serde_json::to_vec(body).unwrap(),
    }
}

#[async_trait]
impl AdminTransport for FakeGateway {
    async fn get(&self, url: &Url) -> Result<Reply, SyncError> {
        self.handle(Method::Get, url, None)
    }

    async fn post(&self, url: &Url, body: &Value) -> Result<Reply, SyncError> {
        self.handle(Method::Post, url, Some(body))
    }

    async fn delete(&self, url: &Url) -> Result<Reply, SyncError> {
        self.handle(Method::Delete, url, None)
    }
}
