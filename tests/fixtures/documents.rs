//! Builders for solver documents.

use courier_sync::mvrp::{
    Depot, DroppedLocation, EntityId, Location, Node, NodeValue, Options, Point, Route, RouteNode,
    Shift, SolverRequest, SolverSolution, Vehicle,
};

pub const DATE: &str = "2024-03-05";

pub fn location(id: u64, reference: &str) -> Location {
    Location {
        id: EntityId::Number(id),
        reference: reference.to_string(),
        point: Point {
            lat: 55.75 + id as f64 * 0.001,
            lon: 37.61,
        },
        service_duration_s: Some(300.into()),
        time_window: Some("09:00-18:00".to_string()),
    }
}

pub fn vehicle(id: u64, reference: &str) -> Vehicle {
    Vehicle {
        id: EntityId::Number(id),
        reference: reference.to_string(),
    }
}

pub fn depot() -> Depot {
    Depot {
        id: EntityId::Number(0),
        reference: Some("main-depot".to_string()),
        point: Point { lat: 55.7, lon: 37.5 },
        service_duration_s: Some(600.into()),
        time_window: None,
    }
}

/// Route node visiting `location`.
pub fn visit(location: &Location, multi_order: bool) -> RouteNode {
    RouteNode {
        node: Node {
            kind: "location".to_string(),
            value: NodeValue {
                id: Some(location.id.clone()),
                reference: Some(location.reference.clone()),
            },
        },
        multi_order,
    }
}

pub fn depot_node() -> RouteNode {
    RouteNode {
        node: Node {
            kind: "depot".to_string(),
            value: NodeValue {
                id: Some(EntityId::Number(0)),
                reference: Some("main-depot".to_string()),
            },
        },
        multi_order: false,
    }
}

pub fn route(vehicle_id: u64, shift: u64, nodes: Vec<RouteNode>) -> Route {
    Route {
        vehicle_id: EntityId::Number(vehicle_id),
        shift: Shift {
            id: EntityId::Number(shift),
        },
        route: nodes,
    }
}

pub fn request(vehicles: Vec<Vehicle>, locations: Vec<Location>) -> SolverRequest {
    SolverRequest {
        depot: depot(),
        vehicles,
        locations,
        options: Options {
            date: Some(DATE.to_string()),
        },
    }
}

pub fn solution(vehicles: Vec<Vehicle>, routes: Vec<Route>, dropped: &[&Location]) -> SolverSolution {
    SolverSolution {
        options: Options {
            date: Some(DATE.to_string()),
        },
        vehicles,
        routes,
        dropped_locations: dropped
            .iter()
            .map(|location| DroppedLocation {
                id: location.id.clone(),
                reference: Some(location.reference.clone()),
            })
            .collect(),
    }
}
