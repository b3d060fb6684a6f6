//! Upload pipeline tests
//!
//! Drives `upload_data` against an in-memory backend and checks what was sent.

mod fixtures;

use serde_json::json;

use courier_sync::config::ServiceDate;
use courier_sync::error::{UploadError, ValidationError};
use courier_sync::mvrp::{SolverRequest, SolverSolution};
use courier_sync::refs::{MAX_REF_LEN, normalize_refs};
use courier_sync::upload::{UploadOptions, upload_data};

use fixtures::*;

const ROUTE: &str = "van-1-0-2024-03-05";

// ============================================================================
// Scenario
// ============================================================================

/// One used vehicle, one idle vehicle. The route visits a two-order stop
/// (A, B), a single stop C and a respawn placeholder. D is dropped by the
/// solver and E is neither routed nor dropped.
fn documents() -> (SolverRequest, SolverSolution) {
    let a = location(1, "A");
    let b = location(2, "B");
    let c = location(3, "C");
    let respawn = location(4, "respawn_1");
    let d = location(5, "D");
    let e = location(6, "E");

    let vehicles = vec![vehicle(1, "van-1"), vehicle(2, "spare")];
    let routes = vec![route(
        1,
        0,
        vec![
            depot_node(),
            visit(&a, true),
            visit(&b, true),
            visit(&c, false),
            visit(&respawn, false),
            depot_node(),
        ],
    )];
    let solution = solution(vehicles.clone(), routes, &[&d]);
    let request = request(vehicles, vec![a, b, c, respawn, d, e]);
    (request, solution)
}

/// Backend state: route already exists with B and a stale order D pinned.
fn backend() -> MockBackend {
    MockBackend::new()
        .on_get(
            "routes?date=2024-03-05",
            json!([{"id": 11, "number": ROUTE, "date": DATE}]),
        )
        .on_get("order-numbers?date=2024-03-05", json!({"101": "B", "102": "D"}))
        .on_get("orders?route_id=11", json!([{"id": 101}, {"id": 102}]))
}

fn posted_orders(backend: &MockBackend) -> Vec<serde_json::Value> {
    backend
        .calls_to("POST", "orders-batch")
        .into_iter()
        .flat_map(|call| call.body.and_then(|b| b.as_array().cloned()).unwrap_or_default())
        .collect()
}

// ============================================================================
// Happy path
// ============================================================================

#[test]
fn uploads_in_dependency_order() {
    let (mut request, mut solution) = documents();
    let backend = backend();

    upload_data(&backend, &mut request, &mut solution, &UploadOptions::default()).unwrap();

    assert_eq!(
        backend.trace(),
        vec![
            "POST depots-batch",
            "POST couriers-batch",
            "POST routes-batch",
            "POST orders-batch",
            "GET routes?date=2024-03-05",
            "GET order-numbers?date=2024-03-05",
            "GET orders?route_id=11",
            "DELETE routes/11/fix-orders",
            "POST routes/11/fix-orders",
        ]
    );
}

#[test]
fn depot_route_and_courier_records() {
    let (mut request, mut solution) = documents();
    let backend = backend();

    upload_data(&backend, &mut request, &mut solution, &UploadOptions::default()).unwrap();

    let depot = backend.calls_to("POST", "depots-batch")[0].body.clone().unwrap();
    assert_eq!(
        depot,
        json!([{
            "number": "main-depot",
            "name": "main-depot",
            "address": "Склад",
            "lat": 55.7,
            "lon": 37.5,
            "service_duration_s": 600
        }])
    );

    let couriers = backend.calls_to("POST", "couriers-batch")[0].body.clone().unwrap();
    assert_eq!(couriers, json!([{"number": "1", "name": "van-1"}]));

    let routes = backend.calls_to("POST", "routes-batch")[0].body.clone().unwrap();
    assert_eq!(
        routes,
        json!([{
            "number": ROUTE,
            "date": DATE,
            "depot_number": "main-depot",
            "courier_number": "1"
        }])
    );
}

#[test]
fn orders_exclude_placeholders_dropped_and_skipped() {
    let (mut request, mut solution) = documents();
    let backend = backend();

    let report =
        upload_data(&backend, &mut request, &mut solution, &UploadOptions::default()).unwrap();

    let numbers = posted_orders(&backend)
        .iter()
        .map(|order| order["number"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(numbers, vec!["A", "B", "C"]);
    assert_eq!(report.orders.uploaded, 3);
    assert_eq!(report.orders.dropped, 1);
    assert_eq!(report.orders.skipped, 1);
    assert_eq!(report.orders.placeholders, 1);
    assert_eq!(report.couriers, 1);
    assert_eq!(report.routes, 1);
}

#[test]
fn multi_order_stop_has_zero_service_duration() {
    let (mut request, mut solution) = documents();
    let backend = backend();

    upload_data(&backend, &mut request, &mut solution, &UploadOptions::default()).unwrap();

    let orders = posted_orders(&backend);
    assert_eq!(orders[0]["service_duration_s"], json!(0));
    assert_eq!(orders[1]["service_duration_s"], json!(0));
    assert_eq!(orders[2]["service_duration_s"], json!(300));
    assert_eq!(orders[2]["route_number"], json!(ROUTE));
    assert_eq!(orders[2]["time_interval"], json!("09:00-18:00"));
}

#[test]
fn fixed_orders_keep_stale_orders_in_front() {
    let (mut request, mut solution) = documents();
    let backend = backend();

    let report =
        upload_data(&backend, &mut request, &mut solution, &UploadOptions::default()).unwrap();

    let fix = backend.calls_to("POST", "routes/11/fix-orders");
    assert_eq!(fix.len(), 1);
    assert_eq!(fix[0].body, Some(json!({"orders": ["D", "A", "B", "C"]})));
    assert_eq!(report.fixed.fixed, vec![ROUTE.to_string()]);
}

#[test]
fn date_override_applies_to_route_numbers() {
    let (mut request, mut solution) = documents();
    let backend = MockBackend::new()
        .on_get(
            "routes?date=2024-04-01",
            json!([{"id": 11, "number": "van-1-0-2024-04-01"}]),
        )
        .on_get("order-numbers?date=2024-04-01", json!({}))
        .on_get("orders?route_id=11", json!([]));
    let options = UploadOptions {
        date: Some("2024-04-01".parse::<ServiceDate>().unwrap()),
        ..UploadOptions::default()
    };

    let report = upload_data(&backend, &mut request, &mut solution, &options).unwrap();

    assert_eq!(report.date, "2024-04-01");
    assert_eq!(request.options.date.as_deref(), Some("2024-04-01"));
    let routes = backend.calls_to("POST", "routes-batch")[0].body.clone().unwrap();
    assert_eq!(routes[0]["number"], json!("van-1-0-2024-04-01"));
    assert_eq!(routes[0]["date"], json!("2024-04-01"));
}

#[test]
fn orders_are_sent_in_chunks() {
    let locations = (1..=5)
        .map(|id| location(id, &format!("order-{}", id)))
        .collect::<Vec<_>>();
    let nodes = locations.iter().map(|l| visit(l, false)).collect();
    let vehicles = vec![vehicle(1, "van-1")];
    let mut solution = solution(vehicles.clone(), vec![route(1, 0, nodes)], &[]);
    let mut request = request(vehicles, locations);
    let options = UploadOptions {
        batch_size: 2,
        ..UploadOptions::default()
    };

    let backend = backend();

    let report = upload_data(&backend, &mut request, &mut solution, &options).unwrap();

    assert_eq!(report.orders.uploaded, 5);
    let sizes = backend
        .calls_to("POST", "orders-batch")
        .iter()
        .map(|call| call.body.as_ref().unwrap().as_array().unwrap().len())
        .collect::<Vec<_>>();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[test]
fn long_refs_are_truncated_consistently() {
    let long = "x".repeat(120);
    let a = location(1, &long);
    let vehicles = vec![vehicle(1, "van-1")];
    let mut solution = solution(vehicles.clone(), vec![route(1, 0, vec![visit(&a, false)])], &[]);
    let mut request = request(vehicles, vec![a]);
    let backend = backend();

    normalize_refs(&mut request, &mut solution, MAX_REF_LEN).unwrap();
    upload_data(&backend, &mut request, &mut solution, &UploadOptions::default()).unwrap();

    let truncated = "x".repeat(MAX_REF_LEN);
    assert_eq!(posted_orders(&backend)[0]["number"], json!(truncated));
    let fix = backend.calls_to("POST", "routes/11/fix-orders");
    assert_eq!(fix[0].body, Some(json!({"orders": ["B", "D", truncated]})));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn order_count_mismatch_is_fatal() {
    let (mut request, mut solution) = documents();
    let backend = backend().on_post("orders-batch", json!({"inserted": 1, "updated": 1}));

    let err = upload_data(&backend, &mut request, &mut solution, &UploadOptions::default())
        .unwrap_err();

    match err {
        UploadError::CountMismatch {
            entity,
            expected,
            inserted,
            updated,
        } => {
            assert_eq!(entity, "orders");
            assert_eq!(expected, 3);
            assert_eq!((inserted, updated), (1, 1));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(backend.calls_to("POST", "routes/11/fix-orders").is_empty());
}

#[test]
fn depot_count_mismatch_stops_the_run() {
    let (mut request, mut solution) = documents();
    let backend = backend().on_post("depots-batch", json!({"inserted": 0, "updated": 0}));

    let err = upload_data(&backend, &mut request, &mut solution, &UploadOptions::default())
        .unwrap_err();

    assert!(matches!(err, UploadError::CountMismatch { entity: "depot", .. }));
    assert_eq!(backend.trace(), vec!["POST depots-batch"]);
}

#[test]
fn route_not_ready_for_clearing_is_skipped() {
    for status in [422, 500] {
        let (mut request, mut solution) = documents();
        let backend = backend().fail("DELETE", "routes/11/fix-orders", status);

        let report =
            upload_data(&backend, &mut request, &mut solution, &UploadOptions::default()).unwrap();

        assert!(backend.calls_to("POST", "routes/11/fix-orders").is_empty());
        assert_eq!(report.fixed.not_ready, vec![ROUTE.to_string()]);
        assert!(report.fixed.fixed.is_empty());
    }
}

#[test]
fn other_clearing_errors_are_fatal() {
    let (mut request, mut solution) = documents();
    let backend = backend().fail("DELETE", "routes/11/fix-orders", 403);

    let err = upload_data(&backend, &mut request, &mut solution, &UploadOptions::default())
        .unwrap_err();

    match err {
        UploadError::Api(api) => assert_eq!(api.status(), Some(403)),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn missing_backend_route_is_fatal() {
    let (mut request, mut solution) = documents();
    let backend = MockBackend::new()
        .on_get("routes?date=2024-03-05", json!([]))
        .on_get("order-numbers?date=2024-03-05", json!({}));

    let err = upload_data(&backend, &mut request, &mut solution, &UploadOptions::default())
        .unwrap_err();

    assert!(matches!(err, UploadError::MissingRoute(number) if number == ROUTE));
}

#[test]
fn duplicate_location_refs_fail_before_any_request() {
    let (mut request, mut solution) = documents();
    request.locations.push(location(99, "A"));
    let backend = backend();

    let err = upload_data(&backend, &mut request, &mut solution, &UploadOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        UploadError::Validation(ValidationError::DuplicateLocationRefs(ref refs)) if refs == &["A".to_string()]
    ));
    assert!(backend.calls().is_empty());
}

#[test]
fn duplicate_refs_only_logged_when_not_strict() {
    let (mut request, mut solution) = documents();
    solution.vehicles.push(vehicle(3, "van-1"));
    let backend = backend();
    let options = UploadOptions {
        strict_refs: false,
        ..UploadOptions::default()
    };

    assert!(upload_data(&backend, &mut request, &mut solution, &options).is_ok());
}
