//! Whole transfers through the components of `ustack`.
//!
//! Two hosts on different networks are connected through a router. Every frame crosses an
//! in-memory link that may lose it. Host A writes a block of random data into its connection,
//! host B reads it back, and both close their side. The result of a successful run is a
//! [`Score`], anything else is an [`Error`].
//!
//! ```text
//!  host A            router             host B
//!  10.0.0.2 ----- 10.0.0.1 | 10.0.1.1 ----- 10.0.1.2
//! ```
mod host;
mod peer;
mod score;
mod simulation;

pub mod config;

pub use host::Host;
pub use peer::Peer;
pub use score::Score;
pub use simulation::Simulation;

use ustack::time::Duration;

/// Why a transfer did not complete.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A sender retransmitted too often without the peer making progress.
    #[error("{host} gave up after {retransmissions} consecutive retransmissions")]
    Aborted {
        /// Name of the host that gave up.
        host: String,
        /// The consecutive retransmissions at that point.
        retransmissions: u64,
    },

    /// A stream of the connection entered its error state.
    #[error("connection reset on {host}")]
    Reset {
        /// Name of the host with the failed stream.
        host: String,
    },

    /// Host B read something other than what host A wrote.
    #[error("received data differs from sent data at byte {offset}")]
    Mismatch {
        /// Index of the first differing byte.
        offset: u64,
    },

    /// The time limit passed before the transfer completed.
    #[error("transfer incomplete after {elapsed:?}")]
    Timeout {
        /// Simulated time at which the run was stopped.
        elapsed: Duration,
    },

    /// The network could not be set up.
    #[error("invalid network configuration: {0}")]
    Setup(#[from] ustack::layer::Error),
}

/// Run one transfer with the given configuration.
#[tracing::instrument(skip(config), fields(bytes = config.bytes, loss = config.loss, seed = config.seed))]
pub fn run(config: &config::Config) -> Result<Score, Error> {
    Simulation::new(config)?.run()
}
