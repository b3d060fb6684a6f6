//! Error types shared by the sync pipelines.

use thiserror::Error;

/// Failures talking to the courier backend or the solver log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} responded with HTTP {status}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("auth token is not a valid header value")]
    InvalidToken(#[source] reqwest::header::InvalidHeaderValue),
}

impl ApiError {
    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Connection timeouts and refused connections are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

/// Identifier problems detected before anything is uploaded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "location refs are ambiguous after truncation to {max_len} chars: \
         {distinct} distinct refs collapse into {truncated}"
    )]
    AmbiguousRefs {
        distinct: usize,
        truncated: usize,
        max_len: usize,
    },
    #[error("duplicate location refs: {0:?}")]
    DuplicateLocationRefs(Vec<String>),
    #[error("duplicate vehicle refs: {0:?}")]
    DuplicateVehicleRefs(Vec<String>),
}

/// Errors that abort an upload run.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} upload mismatch: expected {expected}, inserted {inserted}, updated {updated}")]
    CountMismatch {
        entity: &'static str,
        expected: usize,
        inserted: usize,
        updated: usize,
    },
    #[error("no service date given and the solution has none")]
    MissingDate,
    #[error("route references unknown vehicle {0}")]
    UnknownVehicle(String),
    #[error("route {0} not found in the backend")]
    MissingRoute(String),
    #[error("order {0} has no known number")]
    MissingOrderNumber(u64),
}

/// Errors that abort a deletion run.
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to start deletion workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("malformed time interval {0:?}")]
    Malformed(String),
    #[error("order {0} has no time interval to compare")]
    Missing(String),
}

/// Errors from the time-interval fixer.
#[derive(Debug, Error)]
pub enum FixerError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Interval(#[from] IntervalError),
}
