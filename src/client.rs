//! Courier backend HTTP adapter.

use std::collections::HashMap;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{CourierConfig, ServiceDate};
use crate::error::ApiError;
use crate::records::{BackendOrder, BackendRoute, BatchResult, FixedOrders, RouteOrder};

/// The three verbs the pipelines need, with paths relative to the company URL
/// (e.g. `routes?date=2024-03-05`).
///
/// Implementations must return `ApiError::Status` for any HTTP status >= 400.
pub trait CourierBackend {
    fn get(&self, path: &str) -> Result<Value, ApiError>;
    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
    fn delete(&self, path: &str) -> Result<Value, ApiError>;
}

#[derive(Debug, Clone)]
pub struct CourierClient {
    config: CourierConfig,
    client: reqwest::blocking::Client,
}

impl CourierClient {
    pub fn new(config: CourierConfig) -> Result<Self, ApiError> {
        let client = build_http_client(&config.token, config.timeout_secs)?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.company_url(), path.trim_start_matches('/'))
    }

    /// Issue a request against an absolute URL.
    pub fn request(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        send(&self.client, method, url, body)
    }
}

impl CourierBackend for CourierClient {
    fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, &self.url(path), None)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::POST, &self.url(path), Some(body))
    }

    fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, &self.url(path), None)
    }
}

/// Blocking client that attaches the backend auth headers to every request.
pub(crate) fn build_http_client(
    token: &str,
    timeout_secs: u64,
) -> Result<reqwest::blocking::Client, ApiError> {
    let mut auth =
        HeaderValue::from_str(&format!("Auth {}", token)).map_err(ApiError::InvalidToken)?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = reqwest::blocking::Client::builder()
        .default_headers(headers)
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

pub(crate) fn send(
    client: &reqwest::blocking::Client,
    method: Method,
    url: &str,
    body: Option<&Value>,
) -> Result<Value, ApiError> {
    tracing::debug!(method = method.as_str(), url, "sending request");
    let mut builder = client.request(method, url);
    if let Some(body) = body {
        builder = builder.json(body);
    }

    let response = builder.send()?;
    let status = response.status();
    let text = response.text()?;

    if status.as_u16() >= 400 {
        tracing::error!(status = status.as_u16(), url, "{}", text);
        return Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body: text,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        url: path.to_string(),
        source,
    })
}

pub fn fetch_routes<B: CourierBackend + ?Sized>(
    backend: &B,
    date: &str,
) -> Result<Vec<BackendRoute>, ApiError> {
    let path = format!("routes?date={}", date);
    decode(&path, backend.get(&path)?)
}

pub fn fetch_route_orders<B: CourierBackend + ?Sized>(
    backend: &B,
    route_id: u64,
) -> Result<Vec<RouteOrder>, ApiError> {
    let path = format!("orders?route_id={}", route_id);
    decode(&path, backend.get(&path)?)
}

/// Order id (as text) to order number, for every order on `date`.
pub fn fetch_order_numbers<B: CourierBackend + ?Sized>(
    backend: &B,
    date: &str,
) -> Result<HashMap<String, String>, ApiError> {
    let path = format!("order-numbers?date={}", date);
    decode(&path, backend.get(&path)?)
}

pub fn fetch_orders<B: CourierBackend + ?Sized>(
    backend: &B,
    date: &ServiceDate,
) -> Result<Vec<BackendOrder>, ApiError> {
    let path = format!("orders?date={}", date);
    decode(&path, backend.get(&path)?)
}

/// Upsert `records` through one of the `*-batch` endpoints.
pub fn post_batch<B, T>(backend: &B, path: &str, records: &[T]) -> Result<BatchResult, ApiError>
where
    B: CourierBackend + ?Sized,
    T: Serialize,
{
    let body = serde_json::to_value(records).map_err(ApiError::Encode)?;
    decode(path, backend.post(path, &body)?)
}

pub fn clear_fixed_orders<B: CourierBackend + ?Sized>(
    backend: &B,
    route_id: u64,
) -> Result<(), ApiError> {
    backend.delete(&format!("routes/{}/fix-orders", route_id))?;
    Ok(())
}

pub fn set_fixed_orders<B: CourierBackend + ?Sized>(
    backend: &B,
    route_id: u64,
    orders: &[String],
) -> Result<(), ApiError> {
    let body = serde_json::to_value(FixedOrders { orders }).map_err(ApiError::Encode)?;
    backend.post(&format!("routes/{}/fix-orders", route_id), &body)?;
    Ok(())
}

pub fn delete_order<B: CourierBackend + ?Sized>(backend: &B, order_id: u64) -> Result<(), ApiError> {
    backend.delete(&format!("orders/{}", order_id))?;
    Ok(())
}

pub fn delete_route<B: CourierBackend + ?Sized>(backend: &B, route_id: u64) -> Result<(), ApiError> {
    backend.delete(&format!("routes/{}", route_id))?;
    Ok(())
}
