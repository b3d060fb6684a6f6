//! Fetches solver request/response documents for a task id.

use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::client::{build_http_client, send};
use crate::config::SolverLogConfig;
use crate::error::ApiError;
use crate::mvrp::{SolverRequest, SolverResponse, SolverSolution};
use crate::retry::{RetryPolicy, retry};

#[derive(Debug, Clone)]
pub struct SolverLogClient {
    config: SolverLogConfig,
    retry: RetryPolicy,
    client: reqwest::blocking::Client,
}

impl SolverLogClient {
    /// The solver log accepts the same token as the courier backend.
    pub fn new(config: SolverLogConfig, token: &str) -> Result<Self, ApiError> {
        let client = build_http_client(token, config.timeout_secs)?;
        Ok(Self {
            config,
            retry: RetryPolicy::default(),
            client,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn fetch_request(&self, task_id: &str) -> Result<SolverRequest, ApiError> {
        self.fetch("request", task_id)
    }

    pub fn fetch_solution(&self, task_id: &str) -> Result<SolverSolution, ApiError> {
        let response: SolverResponse = self.fetch("response", task_id)?;
        Ok(response.result)
    }

    fn fetch<T: DeserializeOwned>(&self, role: &str, task_id: &str) -> Result<T, ApiError> {
        let url = self.config.document_url(role, task_id);
        let value = retry(self.retry, ApiError::is_transient, || {
            send(&self.client, Method::GET, &url, None)
        })?;
        tracing::info!(task_id, role, "fetched solver document");
        serde_json::from_value(value).map_err(|source| ApiError::Decode { url, source })
    }
}
