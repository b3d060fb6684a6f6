//! Aligns delivery windows of orders that belong to the same customer.
//!
//! Orders sharing a phone number are one customer's multi-order. When their
//! time intervals disagree, every order in the group takes the interval that
//! starts earliest.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::client::{CourierBackend, fetch_orders, post_batch};
use crate::config::ServiceDate;
use crate::error::{FixerError, IntervalError};
use crate::records::{BackendOrder, BatchResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalUpdate {
    pub number: String,
    pub time_interval: String,
}

/// Seconds from midnight for `HH`, `HH:MM` or `HH:MM:SS`.
pub fn parse_time(text: &str) -> Option<u32> {
    let parts = text.trim().split(':').collect::<Vec<_>>();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut fields = [0u32; 3];
    for (field, part) in fields.iter_mut().zip(&parts) {
        if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *field = part.parse().ok()?;
    }
    let [hours, minutes, seconds] = fields;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Parse `"start - end"` into second offsets from midnight.
pub fn parse_interval(interval: &str) -> Result<(u32, u32), IntervalError> {
    let malformed = || IntervalError::Malformed(interval.to_string());
    let (start, end) = interval.split_once('-').ok_or_else(malformed)?;
    let start = parse_time(start).ok_or_else(malformed)?;
    let end = parse_time(end).ok_or_else(malformed)?;
    Ok((start, end))
}

/// Rewrite disagreeing intervals within each phone group to the earliest one.
///
/// Returns only the orders whose interval changed. An order without an
/// interval is an error only when its group disagrees.
pub fn fix_time_intervals(orders: &[BackendOrder]) -> Result<Vec<IntervalUpdate>, IntervalError> {
    let mut by_phone: BTreeMap<&str, Vec<&BackendOrder>> = BTreeMap::new();
    for order in orders {
        if let Some(phone) = order.phone.as_deref().filter(|phone| !phone.is_empty()) {
            by_phone.entry(phone).or_default().push(order);
        }
    }

    let mut fixed = Vec::new();
    for group in by_phone.values().filter(|group| group.len() > 1) {
        let intervals: BTreeSet<Option<&str>> = group
            .iter()
            .map(|order| order.time_interval.as_deref())
            .collect();
        if intervals.len() == 1 {
            continue;
        }
        if let Some(order) = group.iter().find(|order| order.time_interval.is_none()) {
            return Err(IntervalError::Missing(order.number.clone()));
        }

        let mut earliest: Option<((u32, u32), &str)> = None;
        for interval in intervals.into_iter().flatten() {
            let key = (parse_interval(interval)?, interval);
            if earliest.is_none_or(|current| key < current) {
                earliest = Some(key);
            }
        }
        let Some((_, earliest)) = earliest else {
            continue;
        };

        for order in group {
            let current = order.time_interval.as_deref().unwrap_or_default();
            if current != earliest {
                tracing::info!("{}: {} -> {}", order.number, current, earliest);
                fixed.push(IntervalUpdate {
                    number: order.number.clone(),
                    time_interval: earliest.to_string(),
                });
            }
        }
    }
    Ok(fixed)
}

/// Fetch the day's orders, fix intervals and upload only the changed orders.
///
/// The backend's counts are reported back, not checked.
pub fn run_fixer<B: CourierBackend + ?Sized>(
    backend: &B,
    date: &ServiceDate,
) -> Result<Option<BatchResult>, FixerError> {
    let orders = fetch_orders(backend, date)?;
    let fixed = fix_time_intervals(&orders)?;
    if fixed.is_empty() {
        tracing::info!("no multi-orders with conflicting time intervals on {}", date);
        return Ok(None);
    }

    let result = post_batch(backend, "orders-batch", &fixed)?;
    tracing::info!(
        updated = result.updated,
        inserted = result.inserted,
        "time intervals uploaded"
    );
    Ok(Some(result))
}
