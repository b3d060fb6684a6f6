//! Pieces shared by the command-line tools.

use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::config::{CourierConfig, DEFAULT_API_URL};

/// Backend credentials, taken from flags or the environment.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Courier backend auth token.
    #[arg(long, env = "YA_COURIER_TOKEN", hide_env_values = true)]
    pub token: String,
    /// Company id in the courier backend.
    #[arg(long, env = "YA_COURIER_COMPANY_ID")]
    pub company_id: u64,
    #[arg(long, env = "YA_COURIER_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

impl ConnectionArgs {
    pub fn config(&self) -> CourierConfig {
        CourierConfig {
            api_url: self.api_url.clone(),
            ..CourierConfig::new(self.company_id, self.token.clone())
        }
    }
}

/// Log to stderr at `info` unless `RUST_LOG` says otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
