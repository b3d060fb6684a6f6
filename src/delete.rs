//! Deletes every route of a day together with its orders.

use rayon::prelude::*;

use crate::client::{CourierBackend, delete_order, delete_route, fetch_route_orders, fetch_routes};
use crate::config::ServiceDate;
use crate::error::{ApiError, DeleteError};
use crate::records::BackendRoute;

/// Routes are deleted by this many workers at once.
pub const DELETE_WORKERS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub routes: usize,
    pub orders: usize,
}

/// Delete the route's orders one by one, then the route itself.
pub fn delete_route_and_orders<B: CourierBackend + ?Sized>(
    backend: &B,
    route: &BackendRoute,
) -> Result<usize, ApiError> {
    let orders = fetch_route_orders(backend, route.id)?;
    for order in &orders {
        delete_order(backend, order.id)?;
    }
    tracing::info!("{} orders from route {} were deleted", orders.len(), route.number);

    delete_route(backend, route.id)?;
    tracing::info!("route {} was deleted", route.number);
    Ok(orders.len())
}

/// Delete all routes and orders on `date`, `workers` routes at a time.
///
/// The first failing request aborts the run; routes already deleted stay deleted.
pub fn delete_routes_and_orders<B: CourierBackend + Sync + ?Sized>(
    backend: &B,
    date: &ServiceDate,
    workers: usize,
) -> Result<DeletionReport, DeleteError> {
    let routes = fetch_routes(backend, &date.to_string())?;
    tracing::info!("found {} routes for date {}", routes.len(), date);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|index| format!("route-delete-{}", index))
        .build()?;

    let orders = pool.install(|| {
        routes
            .par_iter()
            .map(|route| delete_route_and_orders(backend, route))
            .try_reduce(|| 0, |left, right| Ok(left + right))
    })?;

    tracing::info!(routes = routes.len(), orders, "data deleted successfully");
    Ok(DeletionReport {
        routes: routes.len(),
        orders,
    })
}
