//! Reference normalization and duplicate detection.
//!
//! The backend limits order numbers to [`MAX_REF_LEN`] characters. Solver
//! refs are cut to that length, but only when doing so keeps every distinct
//! ref distinct.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::ValidationError;
use crate::mvrp::{SolverRequest, SolverSolution};

pub const MAX_REF_LEN: usize = 80;

/// First `max_len` characters of `reference`.
pub fn truncate_ref(reference: &str, max_len: usize) -> &str {
    match reference.char_indices().nth(max_len) {
        Some((end, _)) => &reference[..end],
        None => reference,
    }
}

/// Values seen more than once, in the order their first repeat appears.
pub fn duplicates<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut dupes = Vec::new();
    for value in values {
        let count = seen.entry(value).or_insert(0);
        *count += 1;
        if *count == 2 {
            dupes.push(value.to_string());
        }
    }
    dupes
}

/// Truncate every location ref in both documents to `max_len` characters.
///
/// Fails without touching anything if truncation would merge two distinct refs.
pub fn normalize_refs(
    request: &mut SolverRequest,
    solution: &mut SolverSolution,
    max_len: usize,
) -> Result<(), ValidationError> {
    let distinct: HashSet<&str> = request
        .locations
        .iter()
        .map(|location| location.reference.as_str())
        .collect();
    let truncated: HashSet<&str> = distinct
        .iter()
        .map(|reference| truncate_ref(reference, max_len))
        .collect();
    if distinct.len() != truncated.len() {
        return Err(ValidationError::AmbiguousRefs {
            distinct: distinct.len(),
            truncated: truncated.len(),
            max_len,
        });
    }

    let mut changed = 0;
    for location in &mut request.locations {
        if truncate_in_place(&mut location.reference, max_len) {
            changed += 1;
        }
    }
    for route in &mut solution.routes {
        for node in &mut route.route {
            if let Some(reference) = node.node.value.reference.as_mut() {
                truncate_in_place(reference, max_len);
            }
        }
    }
    for dropped in &mut solution.dropped_locations {
        if let Some(reference) = dropped.reference.as_mut() {
            truncate_in_place(reference, max_len);
        }
    }

    if changed > 0 {
        tracing::warn!(changed, max_len, "truncated long location refs");
    }
    Ok(())
}

fn truncate_in_place(reference: &mut String, max_len: usize) -> bool {
    let len = truncate_ref(reference.as_str(), max_len).len();
    if len < reference.len() {
        reference.truncate(len);
        true
    } else {
        false
    }
}

/// Report duplicate location refs. Only fatal when `strict`.
pub fn check_request(request: &SolverRequest, strict: bool) -> Result<(), ValidationError> {
    let dupes = duplicates(request.locations.iter().map(|l| l.reference.as_str()));
    if dupes.is_empty() {
        return Ok(());
    }
    tracing::error!("duplicate locations found: {:?}", dupes);
    log_offenders(
        request
            .locations
            .iter()
            .filter(|location| location.reference == dupes[0]),
    );
    if strict {
        Err(ValidationError::DuplicateLocationRefs(dupes))
    } else {
        Ok(())
    }
}

/// Report duplicate vehicle refs. Only fatal when `strict`.
pub fn check_solution(solution: &SolverSolution, strict: bool) -> Result<(), ValidationError> {
    let dupes = duplicates(solution.vehicles.iter().map(|v| v.reference.as_str()));
    if dupes.is_empty() {
        return Ok(());
    }
    tracing::error!("duplicate vehicles found: {:?}", dupes);
    log_offenders(
        solution
            .vehicles
            .iter()
            .filter(|vehicle| vehicle.reference == dupes[0]),
    );
    if strict {
        Err(ValidationError::DuplicateVehicleRefs(dupes))
    } else {
        Ok(())
    }
}

fn log_offenders<'a, T, I>(records: I)
where
    T: Serialize + 'a,
    I: Iterator<Item = &'a T>,
{
    for record in records {
        match serde_json::to_string_pretty(record) {
            Ok(dump) => tracing::error!("{}", dump),
            Err(err) => tracing::error!("failed to dump record: {}", err),
        }
    }
}
