//! Run a single transfer and print its score.
//!
//! Host A sends the configured number of random bytes to host B through a router, over links
//! that lose frames with the configured probability. Call example:
//!
//! * `ustack-sim --bytes 1000000 --loss 0.05 --seed 7`
//!
//! Logging is controlled through `RUST_LOG`, e.g. `RUST_LOG=ustack=trace` shows every dropped
//! packet and retransmission.
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;
use ustack_sim::config::Config;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let config = Config::from_args();

    let score = match ustack_sim::run(&config) {
        Ok(score) => score,
        Err(err) => {
            error!(%err, "transfer failed");
            eprintln!("[-] {}", err);
            return ExitCode::FAILURE;
        },
    };

    if config.json {
        match serde_json::to_string_pretty(&score) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                error!(%err, "could not serialize score");
                return ExitCode::FAILURE;
            },
        }
    } else {
        println!("[+] {}", score);
    }

    ExitCode::SUCCESS
}
