// file: src/client/mock.rs
// description: in-memory transport that records calls, for client tests

use super::Transport;
use crate::error::{ApiError, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

enum Reply {
    Json(Value),
    Status(StatusCode),
}

pub(crate) struct MockTransport {
    service: &'static str,
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new(service: &'static str) -> Self {
        Self {
            service,
            replies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_json(mut self, path: &str, body: Value) -> Self {
        self.replies.insert(path.to_string(), Reply::Json(body));
        self
    }

    pub fn with_status(mut self, path: &str, status: StatusCode) -> Self {
        self.replies.insert(path.to_string(), Reply::Status(status));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.path == path)
            .collect()
    }
}

impl Transport for MockTransport {
    fn service(&self) -> &'static str {
        self.service
    }

    fn base_url(&self) -> &str {
        "https://example.atlassian.net"
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });

        match self.replies.get(path) {
            Some(Reply::Json(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(ApiError::from_status(self.service, *status, path)),
            None => Err(ApiError::from_status(self.service, StatusCode::NOT_FOUND, path)),
        }
    }
}
