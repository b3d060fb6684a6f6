//! Reads `<order_number>\t<service_duration_in_seconds>` lines from stdin and
//! updates the orders' service durations.

use std::io;

use clap::Parser;

use courier_sync::cli::{ConnectionArgs, init_tracing};
use courier_sync::client::CourierClient;
use courier_sync::service_duration::{parse_lines, upload_service_durations};

#[derive(Debug, Parser)]
#[command(
    name = "courier-service-duration-uploader",
    about = "Update order service durations from tab-separated stdin",
    version
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
}

fn main() {
    init_tracing();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("courier-service-duration-uploader: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let updates = parse_lines(io::stdin().lock())?;
    let backend = CourierClient::new(cli.connection.config())?;
    match upload_service_durations(&backend, &updates)? {
        Some(result) => println!(
            "Data uploaded successfully:\n\tOrders updated: {}",
            result.updated
        ),
        None => println!("Empty input data. No data was uploaded."),
    }
    Ok(())
}
