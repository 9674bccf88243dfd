//! In-memory upstream for unit tests.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::planning_center::api::{paged_url, Fetch};

/// Serves canned documents by exact URL; unknown URLs answer 404.
#[derive(Default)]
pub struct FakeUpstream {
    responses: HashMap<String, Value>,
    failures: Vec<(String, String)>,
    calls: Mutex<Vec<String>>,
}

impl FakeUpstream {
    pub fn with(mut self, url: &str, body: Value) -> Self {
        self.responses.insert(url.to_string(), body);
        self
    }

    /// Single-page collection at `url`
    pub fn page(self, url: &str, items: Value) -> Self {
        self.with(&paged_url(url), json!({ "data": items, "links": {} }))
    }

    /// Member resource at `url`
    pub fn record(self, url: &str, resource: Value) -> Self {
        self.with(url, json!({ "data": resource }))
    }

    /// Every URL starting with `prefix` fails with a 500 carrying `message`
    pub fn failing(mut self, prefix: &str, message: &str) -> Self {
        self.failures.push((prefix.to_string(), message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for FakeUpstream {
    async fn fetch_resource(&self, url: &str) -> Result<Value> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some((_, message)) = self.failures.iter().find(|(prefix, _)| url.starts_with(prefix.as_str())) {
            return Err(Error::pco_status(message.clone(), 500));
        }
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| Error::pco_status("Resource Not Found", 404))
    }
}
