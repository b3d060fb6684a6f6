//! Reconciles each route's pinned ("fixed") order list with a fresh solution.

use std::collections::HashMap;

use crate::client::{
    CourierBackend, clear_fixed_orders, fetch_order_numbers, fetch_route_orders, fetch_routes,
    set_fixed_orders,
};
use crate::error::{ApiError, UploadError};
use crate::mvrp::{Route, SolverSolution, is_placeholder};
use crate::upload::route_numbers;

/// Backend refuses to clear a route's fixed orders while the route is in a
/// state that doesn't allow it. Such routes are left alone, not failed.
#[derive(Debug, Clone, Copy)]
pub struct RouteNotReadyForClearing;

impl RouteNotReadyForClearing {
    pub const STATUSES: [u16; 2] = [422, 500];

    pub fn matches(err: &ApiError) -> bool {
        err.status()
            .is_some_and(|status| Self::STATUSES.contains(&status))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixOrdersReport {
    /// Route numbers whose fixed list was rewritten.
    pub fixed: Vec<String>,
    /// Route numbers skipped under [`RouteNotReadyForClearing`].
    pub not_ready: Vec<String>,
}

/// Order refs of a solution route, placeholders excluded, in visiting order.
pub fn route_order_refs(route: &Route) -> Vec<String> {
    route
        .locations()
        .filter_map(|(value, _)| value.reference.as_deref())
        .filter(|reference| !is_placeholder(reference))
        .map(str::to_string)
        .collect()
}

/// Orders currently on the route that the new solution no longer lists keep
/// their place at the front; the new orders follow in solution order.
pub fn merge_fixed_orders(current: &[String], new_orders: &[String]) -> Vec<String> {
    current
        .iter()
        .filter(|number| !new_orders.contains(number))
        .chain(new_orders)
        .cloned()
        .collect()
}

pub fn fix_orders<B: CourierBackend + ?Sized>(
    backend: &B,
    solution: &SolverSolution,
    date: &str,
) -> Result<FixOrdersReport, UploadError> {
    let route_ids: HashMap<String, u64> = fetch_routes(backend, date)?
        .into_iter()
        .map(|route| (route.number, route.id))
        .collect();
    let order_numbers = fetch_order_numbers(backend, date)?;

    let mut report = FixOrdersReport::default();
    for (route, number) in solution.routes.iter().zip(route_numbers(solution, date)?) {
        let route_id = *route_ids
            .get(&number)
            .ok_or_else(|| UploadError::MissingRoute(number.clone()))?;

        let new_orders = route_order_refs(route);
        tracing::info!("got {} new orders in route {}", new_orders.len(), number);

        let current = fetch_route_orders(backend, route_id)?
            .into_iter()
            .map(|order| {
                order_numbers
                    .get(&order.id.to_string())
                    .cloned()
                    .or(order.number)
                    .ok_or(UploadError::MissingOrderNumber(order.id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let merged = merge_fixed_orders(&current, &new_orders);
        let old_count = merged.len() - new_orders.len();
        tracing::info!("found {} old orders in route {}", old_count, number);

        match clear_fixed_orders(backend, route_id) {
            Ok(()) => tracing::info!("route {} was cleared from fixed orders", number),
            Err(err) if RouteNotReadyForClearing::matches(&err) => {
                tracing::warn!("route {} is not ready for clearing, leaving it as is", number);
                report.not_ready.push(number);
                continue;
            }
            Err(err) => return Err(err.into()),
        }

        set_fixed_orders(backend, route_id, &merged)?;
        tracing::info!(
            "route {} with {}+{} orders was fixed",
            number,
            old_count,
            new_orders.len()
        );
        report.fixed.push(number);
    }
    Ok(report)
}
