use clap::Parser;

use ustack::layer::tcp;
use ustack::time::Duration;

const INITIAL_RTO_MS: u64 = tcp::Config::INITIAL_RTO.as_millis() as u64;

/// Parameters of a simulated transfer.
#[derive(Clone, Debug, Parser)]
#[command(name = "ustack-sim", about = "Transfer data over TCP between two simulated hosts and a router")]
pub struct Config {
    /// Number of bytes host A sends to host B.
    #[arg(long, default_value_t = 100_000)]
    pub bytes: usize,

    /// Probability that a link loses a frame, between 0 and 1.
    #[arg(long, default_value_t = 0.0, value_parser = probability)]
    pub loss: f64,

    /// Seed of the random generator for data, sequence numbers and loss.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Capacity of each stream, in bytes.
    #[arg(long, default_value_t = tcp::Config::DEFAULT_CAPACITY)]
    pub capacity: u64,

    /// The most payload in a single segment, in bytes.
    #[arg(long, default_value_t = tcp::Config::MAX_PAYLOAD_SIZE, value_parser = payload_size)]
    pub payload_size: usize,

    /// Initial retransmission timeout, in milliseconds.
    #[arg(long, default_value_t = INITIAL_RTO_MS)]
    pub rto_ms: u64,

    /// Consecutive retransmissions after which a host gives up.
    #[arg(long, default_value_t = tcp::Config::MAX_RETRANSMISSIONS)]
    pub max_retransmissions: u64,

    /// Simulated time per step, in milliseconds.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Simulated time after which the transfer is abandoned, in milliseconds.
    #[arg(long, default_value_t = 600_000)]
    pub time_limit_ms: u64,

    /// Print the score as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Config {
    /// Parse the configuration from the command line.
    pub fn from_args() -> Self {
        Parser::parse()
    }

    /// The connection tunables of both hosts.
    pub fn tcp(&self) -> tcp::Config {
        tcp::Config {
            capacity: self.capacity,
            max_payload_size: self.payload_size,
            initial_rto: Duration::from_millis(self.rto_ms),
            max_retransmissions: self.max_retransmissions,
        }
    }

    /// Simulated time per step.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Simulated time after which the transfer is abandoned.
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from(["ustack-sim"])
    }
}

fn probability(arg: &str) -> Result<f64, String> {
    let value: f64 = arg.parse().map_err(|err| format!("{}", err))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is not between 0 and 1", value))
    }
}

fn payload_size(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(0) => Err("segments must carry at least one byte".into()),
        Ok(size) => Ok(size),
        Err(err) => Err(format!("{}", err)),
    }
}
