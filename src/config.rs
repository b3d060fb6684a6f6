//! Connection settings and the service date type.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use time::Date;
use time::macros::format_description;

pub const DEFAULT_API_URL: &str = "https://courier.common.yandex.ru/api/v1";
pub const DEFAULT_SOLVER_LOG_URL: &str = "https://courier.common.yandex.ru/vrs/api/v1/log";

#[derive(Debug, Clone)]
pub struct CourierConfig {
    pub api_url: String,
    pub company_id: u64,
    pub token: String,
    pub timeout_secs: u64,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            company_id: 0,
            token: String::new(),
            timeout_secs: 60,
        }
    }
}

impl CourierConfig {
    pub fn new(company_id: u64, token: impl Into<String>) -> Self {
        Self {
            company_id,
            token: token.into(),
            ..Self::default()
        }
    }

    /// Base URL that every backend path is resolved against.
    pub fn company_url(&self) -> String {
        format!(
            "{}/companies/{}",
            self.api_url.trim_end_matches('/'),
            self.company_id
        )
    }
}

#[derive(Debug, Clone)]
pub struct SolverLogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SolverLogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SOLVER_LOG_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl SolverLogConfig {
    /// `role` is either `request` or `response`.
    pub fn document_url(&self, role: &str, task_id: &str) -> String {
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), role, task_id)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid date {0:?}, expected YYYY-MM-DD")]
pub struct InvalidDate(pub String);

/// A calendar day in `YYYY-MM-DD` form, as the backend expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceDate(Date);

impl ServiceDate {
    pub fn date(&self) -> Date {
        self.0
    }
}

impl FromStr for ServiceDate {
    type Err = InvalidDate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
            .map(ServiceDate)
            .map_err(|_| InvalidDate(s.to_string()))
    }
}

impl fmt::Display for ServiceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}
