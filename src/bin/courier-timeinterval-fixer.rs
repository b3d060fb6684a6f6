//! Gives every order of a multi-order customer the same, earliest time interval.

use clap::Parser;

use courier_sync::cli::{ConnectionArgs, init_tracing};
use courier_sync::client::CourierClient;
use courier_sync::config::ServiceDate;
use courier_sync::time_intervals::run_fixer;

#[derive(Debug, Parser)]
#[command(
    name = "courier-timeinterval-fixer",
    about = "Align time intervals of orders sharing a phone number",
    long_about = "Gets the orders for a date and groups them by phone number. \
                  When one customer's orders have different time intervals, \
                  the earliest one is applied to all of them.",
    version
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// The date to fix (YYYY-MM-DD).
    #[arg(long)]
    date: ServiceDate,
}

fn main() {
    init_tracing();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("courier-timeinterval-fixer: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let backend = CourierClient::new(cli.connection.config())?;
    match run_fixer(&backend, &cli.date)? {
        Some(result) => println!(
            "Data uploaded successfully:\n\tOrders updated: {}\n\tOrders inserted: {}",
            result.updated, result.inserted
        ),
        None => println!("No multi-orders with different time intervals detected."),
    }
    Ok(())
}
