use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use quadmotor_runtime::config::{DEFAULT_BAUD, DEFAULT_PORT, IDLE_WINDOW};

/// Serial command runtime for a 4-channel DC motor power stage
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Serial port carrying the command stream
    #[arg(long, default_value = DEFAULT_PORT)]
    port: String,

    /// Baud rate of the command stream
    #[arg(long, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Idle window in milliseconds before all channels are braked
    #[arg(long)]
    idle_window_ms: Option<u64>,
}

fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();
    let idle_window = args
        .idle_window_ms
        .map(Duration::from_millis)
        .unwrap_or(IDLE_WINDOW);

    if let Err(e) = quadmotor_runtime::runtime::run(&args.port, args.baud, idle_window) {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
