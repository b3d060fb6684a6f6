//! Bulk update of order service durations from tab-separated input.

use std::io::BufRead;

use serde::Serialize;

use crate::client::{CourierBackend, post_batch};
use crate::error::ApiError;
use crate::records::BatchResult;

pub const DELIMITER: char = '\t';
pub const LINE_FORMAT: &str = "<order_number>\\t<service_duration_in_seconds>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDurationUpdate {
    pub number: String,
    pub service_duration_s: u32,
}

/// Parse input lines; malformed ones are reported by index and skipped.
pub fn parse_lines<R: BufRead>(input: R) -> std::io::Result<Vec<ServiceDurationUpdate>> {
    let mut updates = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let fields = line.trim_end_matches('\r').split(DELIMITER).collect::<Vec<_>>();
        let parsed = match fields.as_slice() {
            [number, duration] if !number.is_empty() => duration
                .trim()
                .parse()
                .ok()
                .map(|service_duration_s| ServiceDurationUpdate {
                    number: number.to_string(),
                    service_duration_s,
                }),
            _ => None,
        };
        match parsed {
            Some(update) => updates.push(update),
            None => tracing::warn!(
                "line {} has incorrect format and is skipped, expected {}",
                index,
                LINE_FORMAT
            ),
        }
    }
    Ok(updates)
}

pub fn upload_service_durations<B: CourierBackend + ?Sized>(
    backend: &B,
    updates: &[ServiceDurationUpdate],
) -> Result<Option<BatchResult>, ApiError> {
    if updates.is_empty() {
        tracing::info!("empty input, nothing uploaded");
        return Ok(None);
    }
    let result = post_batch(backend, "orders-batch", updates)?;
    tracing::info!(updated = result.updated, "service durations uploaded");
    Ok(Some(result))
}
