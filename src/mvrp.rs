//! Routing solver request and solution documents.
//!
//! Only the fields the uploader reads are modelled; everything else in the
//! solver documents is ignored on deserialization.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Solver entity id. The solver accepts both numbers and strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(id) => write!(f, "{}", id),
            EntityId::Text(id) => f.write_str(id),
        }
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        EntityId::Number(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Text(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub id: EntityId,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub point: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_duration_s: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
}

impl Depot {
    /// Backend depot number: the ref when present, the id otherwise.
    pub fn number(&self) -> String {
        self.reference.clone().unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: EntityId,
    #[serde(rename = "ref")]
    pub reference: String,
    pub point: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_duration_s: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: EntityId,
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverRequest {
    pub depot: Depot,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: EntityId,
}

/// Payload of a route node. Depot and break nodes carry different fields,
/// so everything is optional here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: NodeValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNode {
    pub node: Node,
    #[serde(default)]
    pub multi_order: bool,
}

impl RouteNode {
    /// The node payload, if this node visits a location.
    pub fn location(&self) -> Option<&NodeValue> {
        (self.node.kind == "location").then_some(&self.node.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub vehicle_id: EntityId,
    pub shift: Shift,
    #[serde(default)]
    pub route: Vec<RouteNode>,
}

impl Route {
    pub fn locations(&self) -> impl Iterator<Item = (&NodeValue, bool)> {
        self.route
            .iter()
            .filter_map(|node| node.location().map(|value| (value, node.multi_order)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedLocation {
    pub id: EntityId,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSolution {
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub dropped_locations: Vec<DroppedLocation>,
}

impl SolverSolution {
    pub fn vehicle_ids_in_routes(&self) -> HashSet<&EntityId> {
        self.routes.iter().map(|route| &route.vehicle_id).collect()
    }

    pub fn vehicle(&self, id: &EntityId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| &vehicle.id == id)
    }
}

/// The solver's response document wraps the solution under `result`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SolverResponse {
    pub result: SolverSolution,
}

/// Backend route number: `{vehicle_ref}-{shift_id}-{date}`.
pub fn route_number(vehicle_ref: &str, shift_id: &EntityId, date: &str) -> String {
    format!("{}-{}-{}", vehicle_ref, shift_id, date)
}

/// Refs starting with these prefixes are solver placeholders, never real orders.
pub const PLACEHOLDER_PREFIXES: [&str; 2] = ["respawn_", "FAKE"];

pub fn is_placeholder(reference: &str) -> bool {
    PLACEHOLDER_PREFIXES
        .iter()
        .any(|prefix| reference.starts_with(prefix))
}
