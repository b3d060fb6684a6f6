//! Records exchanged with the courier backend.

use serde::{Deserialize, Serialize};
use serde_json::Number;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepotRecord {
    pub number: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_duration_s: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_interval: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourierRecord {
    pub number: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRecord {
    pub number: String,
    pub date: String,
    pub depot_number: String,
    pub courier_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub number: String,
    pub lat: f64,
    pub lon: f64,
    pub address: String,
    pub phone: String,
    pub service_duration_s: Number,
    pub status: String,
    pub customer_name: String,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_interval: Option<String>,
    pub route_number: String,
}

/// Reply of every `*-batch` endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BatchResult {
    #[serde(default)]
    pub inserted: usize,
    #[serde(default)]
    pub updated: usize,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendRoute {
    pub id: u64,
    pub number: String,
}

/// Order as listed by `orders?route_id=`; only the id is relied upon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteOrder {
    pub id: u64,
    #[serde(default)]
    pub number: Option<String>,
}

/// Order as listed by `orders?date=`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendOrder {
    pub number: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub time_interval: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixedOrders<'a> {
    pub orders: &'a [String],
}
