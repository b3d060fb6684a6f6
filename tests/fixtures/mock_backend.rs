//! In-memory `CourierBackend` that records calls and replays canned replies.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Value, json};

use courier_sync::client::CourierBackend;
use courier_sync::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// Batch endpoints report every posted record as inserted unless overridden.
#[derive(Debug, Default)]
pub struct MockBackend {
    gets: HashMap<String, Value>,
    posts: HashMap<String, Value>,
    failures: HashMap<(&'static str, String), u16>,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(mut self, path: &str, reply: Value) -> Self {
        self.gets.insert(path.to_string(), reply);
        self
    }

    pub fn on_post(mut self, path: &str, reply: Value) -> Self {
        self.posts.insert(path.to_string(), reply);
        self
    }

    pub fn fail(mut self, method: &'static str, path: &str, status: u16) -> Self {
        self.failures.insert((method, path.to_string()), status);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method && call.path == path)
            .collect()
    }

    /// `METHOD path` for every call, in order.
    pub fn trace(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| format!("{} {}", call.method, call.path))
            .collect()
    }

    fn record(&self, method: &'static str, path: &str, body: Option<&Value>) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });
        match self.failures.get(&(method, path.to_string())) {
            Some(&status) => Err(status_error(status, path)),
            None => Ok(()),
        }
    }
}

pub fn status_error(status: u16, path: &str) -> ApiError {
    ApiError::Status {
        status,
        url: format!("mock://{}", path),
        body: "{\"error\": \"mock\"}".to_string(),
    }
}

impl CourierBackend for MockBackend {
    fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.record("GET", path, None)?;
        self.gets
            .get(path)
            .cloned()
            .ok_or_else(|| status_error(404, path))
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.record("POST", path, Some(body))?;
        if let Some(reply) = self.posts.get(path) {
            return Ok(reply.clone());
        }
        if path.ends_with("-batch") {
            let inserted = body.as_array().map(Vec::len).unwrap_or(0);
            return Ok(json!({"inserted": inserted, "updated": 0}));
        }
        Ok(Value::Null)
    }

    fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.record("DELETE", path, None)?;
        Ok(Value::Null)
    }
}
