//! Uploads a routing solver solution to the courier backend, or clears a day.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use clap::Parser;

use courier_sync::cli::{ConnectionArgs, init_tracing};
use courier_sync::client::CourierClient;
use courier_sync::config::{ServiceDate, SolverLogConfig};
use courier_sync::delete::{DELETE_WORKERS, delete_routes_and_orders};
use courier_sync::refs::{MAX_REF_LEN, normalize_refs};
use courier_sync::solver_log::SolverLogClient;
use courier_sync::upload::{DEFAULT_DEPOT_ADDRESS, OrderDetails, UploadOptions, upload_data};

#[derive(Debug, Parser)]
#[command(
    name = "courier-uploader",
    about = "Upload a routing solver solution to the courier backend",
    version
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Solver task id whose request and solution are uploaded.
    #[arg(long, required_unless_present = "clear")]
    task_id: Option<String>,
    /// Upload to this date (YYYY-MM-DD) instead of the solution's own.
    #[arg(long)]
    date: Option<ServiceDate>,
    /// Delete ALL routes and orders for --date instead of uploading.
    #[arg(long, requires = "date")]
    clear: bool,
    /// Fail on duplicate location or vehicle refs.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    strict_refs: bool,
    /// JSON object of per-order details keyed by order ref.
    #[arg(long, value_name = "path")]
    order_details: Option<PathBuf>,
    #[arg(long, env = "SOLVER_LOG_URL", default_value = courier_sync::config::DEFAULT_SOLVER_LOG_URL)]
    solver_log_url: String,
}

fn main() {
    init_tracing();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("courier-uploader: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let backend = CourierClient::new(cli.connection.config())?;

    if cli.clear {
        let date = cli.date.ok_or("--clear requires --date")?;
        let report = delete_routes_and_orders(&backend, &date, DELETE_WORKERS)?;
        println!("Deleted {} routes and {} orders", report.routes, report.orders);
        return Ok(());
    }

    let task_id = cli.task_id.ok_or("--task-id is required")?;
    let solver_log = SolverLogClient::new(
        SolverLogConfig {
            base_url: cli.solver_log_url,
            ..SolverLogConfig::default()
        },
        &cli.connection.token,
    )?;
    let mut request = solver_log.fetch_request(&task_id)?;
    let mut solution = solver_log.fetch_solution(&task_id)?;
    normalize_refs(&mut request, &mut solution, MAX_REF_LEN)?;

    let order_details: HashMap<String, OrderDetails> = match &cli.order_details {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => HashMap::new(),
    };
    let options = UploadOptions {
        date: cli.date,
        depot_address: request
            .depot
            .reference
            .clone()
            .unwrap_or_else(|| DEFAULT_DEPOT_ADDRESS.to_string()),
        order_details,
        strict_refs: cli.strict_refs,
        ..UploadOptions::default()
    };

    let report = upload_data(&backend, &mut request, &mut solution, &options)?;
    println!(
        "Uploaded {} couriers, {} routes, {} orders for {} ({} dropped, {} skipped)",
        report.couriers,
        report.routes,
        report.orders.uploaded,
        report.date,
        report.orders.dropped,
        report.orders.skipped
    );
    if !report.fixed.not_ready.is_empty() {
        println!(
            "Fixed orders left untouched on routes not ready for clearing: {}",
            report.fixed.not_ready.join(", ")
        );
    }
    Ok(())
}
