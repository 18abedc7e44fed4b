use clap::Parser;
use tracing_subscriber::EnvFilter;

use finsim::config::{AppConfig, Cli, Command};

// stdout is reserved for `simulate` output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finsim=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    match Cli::parse().command {
        Command::Serve(args) => {
            if let Err(e) = finsim::api::run_http_server(AppConfig::from(args)).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Simulate(args) => match finsim::api::simulate_file(args.kind, &args.input) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Simulation error: {e}");
                std::process::exit(1);
            }
        },
    }
}
