//! Upload pipeline: pushes one solver solution into the courier backend.
//!
//! Entities go up in dependency order (depot, couriers, routes, orders) and
//! every batch reply is checked against the number of records sent. The run
//! ends by reconciling each route's fixed-order list.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Number;

use crate::client::{CourierBackend, post_batch};
use crate::config::ServiceDate;
use crate::error::UploadError;
use crate::fixed_orders::{FixOrdersReport, fix_orders};
use crate::mvrp::{
    Depot, EntityId, Location, SolverRequest, SolverSolution, Vehicle, is_placeholder, route_number,
};
use crate::records::{BatchResult, CourierRecord, DepotRecord, OrderRecord, RouteRecord};
use crate::refs::{check_request, check_solution};

/// Backend limit on records per `orders-batch` call.
pub const ORDERS_BATCH_SIZE: usize = 500;
pub const DEFAULT_PHONE: &str = "+71111111111";
pub const DEFAULT_CUSTOMER_NAME: &str = "Клиентский сервис";
pub const DEFAULT_DEPOT_ADDRESS: &str = "Склад";

/// Extra order attributes the solver documents don't carry, keyed by order ref.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderDetails {
    #[serde(default, alias = "point_address")]
    pub address: Option<String>,
    #[serde(default, alias = "customer_phone")]
    pub phone: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Overrides the date in both solver documents.
    pub date: Option<ServiceDate>,
    pub depot_address: String,
    pub default_phone: String,
    pub default_customer_name: String,
    pub order_details: HashMap<String, OrderDetails>,
    /// Fail on duplicate location or vehicle refs instead of only logging them.
    pub strict_refs: bool,
    pub batch_size: usize,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            date: None,
            depot_address: DEFAULT_DEPOT_ADDRESS.to_string(),
            default_phone: DEFAULT_PHONE.to_string(),
            default_customer_name: DEFAULT_CUSTOMER_NAME.to_string(),
            order_details: HashMap::new(),
            strict_refs: true,
            batch_size: ORDERS_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersReport {
    pub uploaded: usize,
    pub dropped: usize,
    pub skipped: usize,
    pub placeholders: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub date: String,
    pub couriers: usize,
    pub routes: usize,
    pub orders: OrdersReport,
    pub fixed: FixOrdersReport,
}

/// Run the whole pipeline: checks, depot, couriers, routes, orders, fixed orders.
pub fn upload_data<B: CourierBackend + ?Sized>(
    backend: &B,
    request: &mut SolverRequest,
    solution: &mut SolverSolution,
    options: &UploadOptions,
) -> Result<UploadReport, UploadError> {
    check_request(request, options.strict_refs)?;
    check_solution(solution, options.strict_refs)?;

    if let Some(date) = options.date {
        solution.options.date = Some(date.to_string());
        request.options.date = Some(date.to_string());
    }
    let date = solution
        .options
        .date
        .clone()
        .or_else(|| request.options.date.clone())
        .ok_or(UploadError::MissingDate)?;
    tracing::info!(date = %date, "uploading data");

    upload_depot(backend, &request.depot, &options.depot_address)?;

    let used = solution.vehicle_ids_in_routes();
    let couriers = request
        .vehicles
        .iter()
        .filter(|vehicle| used.contains(&vehicle.id))
        .collect::<Vec<_>>();
    let couriers = upload_couriers(backend, &couriers)?;

    let routes = upload_routes(backend, solution, &request.depot, &date)?;
    let orders = upload_orders(backend, &request.locations, solution, &date, options)?;
    let fixed = fix_orders(backend, solution, &date)?;

    tracing::info!(date = %date, "data uploaded successfully");
    Ok(UploadReport {
        date,
        couriers,
        routes,
        orders,
        fixed,
    })
}

fn expect_count(
    entity: &'static str,
    expected: usize,
    result: BatchResult,
) -> Result<(), UploadError> {
    if result.total() == expected {
        Ok(())
    } else {
        Err(UploadError::CountMismatch {
            entity,
            expected,
            inserted: result.inserted,
            updated: result.updated,
        })
    }
}

pub fn depot_record(depot: &Depot, address: &str) -> DepotRecord {
    let number = depot.number();
    DepotRecord {
        name: number.clone(),
        number,
        address: address.to_string(),
        lat: depot.point.lat,
        lon: depot.point.lon,
        service_duration_s: depot.service_duration_s.clone(),
        time_interval: depot.time_window.clone(),
    }
}

pub fn upload_depot<B: CourierBackend + ?Sized>(
    backend: &B,
    depot: &Depot,
    address: &str,
) -> Result<(), UploadError> {
    let result = post_batch(backend, "depots-batch", &[depot_record(depot, address)])?;
    expect_count("depot", 1, result)?;
    tracing::info!("depot uploaded");
    Ok(())
}

/// Couriers are numbered by vehicle id so vehicles sharing a ref stay apart.
pub fn upload_couriers<B: CourierBackend + ?Sized>(
    backend: &B,
    vehicles: &[&Vehicle],
) -> Result<usize, UploadError> {
    let records = vehicles
        .iter()
        .map(|vehicle| CourierRecord {
            number: vehicle.id.to_string(),
            name: vehicle.reference.clone(),
        })
        .collect::<Vec<_>>();
    let result = post_batch(backend, "couriers-batch", &records)?;
    expect_count("couriers", records.len(), result)?;
    tracing::info!("{} couriers uploaded", records.len());
    Ok(records.len())
}

fn vehicle_ref<'a>(solution: &'a SolverSolution, id: &EntityId) -> Result<&'a str, UploadError> {
    solution
        .vehicle(id)
        .map(|vehicle| vehicle.reference.as_str())
        .ok_or_else(|| UploadError::UnknownVehicle(id.to_string()))
}

/// Backend route numbers, in solution route order.
pub fn route_numbers(solution: &SolverSolution, date: &str) -> Result<Vec<String>, UploadError> {
    solution
        .routes
        .iter()
        .map(|route| -> Result<String, UploadError> {
            let vehicle = vehicle_ref(solution, &route.vehicle_id)?;
            Ok(route_number(vehicle, &route.shift.id, date))
        })
        .collect()
}

pub fn upload_routes<B: CourierBackend + ?Sized>(
    backend: &B,
    solution: &SolverSolution,
    depot: &Depot,
    date: &str,
) -> Result<usize, UploadError> {
    let depot_number = depot.number();
    let records = solution
        .routes
        .iter()
        .zip(route_numbers(solution, date)?)
        .map(|(route, number)| RouteRecord {
            number,
            date: date.to_string(),
            depot_number: depot_number.clone(),
            courier_number: route.vehicle_id.to_string(),
        })
        .collect::<Vec<_>>();

    let result = post_batch(backend, "routes-batch", &records)?;
    expect_count("routes", records.len(), result)?;
    tracing::info!("{} routes uploaded for date {}", records.len(), date);
    Ok(records.len())
}

/// Where the solution placed a location.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Assignment {
    route_number: String,
    multi_order: bool,
}

fn assignments(
    solution: &SolverSolution,
    date: &str,
) -> Result<HashMap<EntityId, Assignment>, UploadError> {
    let mut assigned = HashMap::new();
    for (route, number) in solution.routes.iter().zip(route_numbers(solution, date)?) {
        for (value, multi_order) in route.locations() {
            if let Some(id) = &value.id {
                assigned.insert(
                    id.clone(),
                    Assignment {
                        route_number: number.clone(),
                        multi_order,
                    },
                );
            }
        }
    }
    Ok(assigned)
}

fn order_record(location: &Location, assignment: &Assignment, options: &UploadOptions) -> OrderRecord {
    let details = options
        .order_details
        .get(&location.reference)
        .cloned()
        .unwrap_or_default();

    // Service time of a multi-order stop is counted once per stop.
    let service_duration_s = match &location.service_duration_s {
        Some(duration) if !assignment.multi_order => duration.clone(),
        _ => Number::from(0),
    };

    OrderRecord {
        number: location.reference.clone(),
        lat: location.point.lat,
        lon: location.point.lon,
        address: details.address.unwrap_or_else(|| "-".to_string()),
        phone: details.phone.unwrap_or_else(|| options.default_phone.clone()),
        service_duration_s,
        status: "confirmed".to_string(),
        customer_name: details
            .customer_name
            .unwrap_or_else(|| options.default_customer_name.clone()),
        weight: details.weight_kg.unwrap_or(0.0),
        time_interval: location.time_window.clone(),
        route_number: assignment.route_number.clone(),
    }
}

/// Upload routed locations as orders, `options.batch_size` at a time.
pub fn upload_orders<B: CourierBackend + ?Sized>(
    backend: &B,
    locations: &[Location],
    solution: &SolverSolution,
    date: &str,
    options: &UploadOptions,
) -> Result<OrdersReport, UploadError> {
    let assigned = assignments(solution, date)?;
    let dropped: HashSet<&EntityId> = solution
        .dropped_locations
        .iter()
        .map(|location| &location.id)
        .collect();

    let mut report = OrdersReport::default();
    for chunk in locations.chunks(options.batch_size.max(1)) {
        let mut records = Vec::with_capacity(chunk.len());
        let mut chunk_report = OrdersReport::default();

        for location in chunk {
            if is_placeholder(&location.reference) {
                chunk_report.placeholders += 1;
                tracing::debug!(reference = %location.reference, "placeholder location ignored");
            } else if let Some(assignment) = assigned.get(&location.id) {
                records.push(order_record(location, assignment, options));
            } else if dropped.contains(&location.id) {
                chunk_report.dropped += 1;
                tracing::error!("order {} is dropped, skipping it", location.reference);
            } else {
                chunk_report.skipped += 1;
                tracing::error!("order {} was skipped", location.reference);
            }
        }

        let expected =
            chunk.len() - chunk_report.dropped - chunk_report.skipped - chunk_report.placeholders;
        if !records.is_empty() {
            let result = post_batch(backend, "orders-batch", &records)?;
            expect_count("orders", expected, result)?;
        }
        chunk_report.uploaded = records.len();
        tracing::info!(
            uploaded = chunk_report.uploaded,
            total = chunk.len(),
            "order chunk uploaded"
        );

        report.uploaded += chunk_report.uploaded;
        report.dropped += chunk_report.dropped;
        report.skipped += chunk_report.skipped;
        report.placeholders += chunk_report.placeholders;
    }

    tracing::info!("{} locations uploaded", report.uploaded);
    Ok(report)
}
