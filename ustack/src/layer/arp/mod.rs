//! The neighbor cache of the address resolution protocol.
//!
//! Restricted to resolving IPv4 addresses to Ethernet addresses on behalf of an interface, see
//! [`eth::Interface`] for the sending and answering of ARP messages themselves.
//!
//! [`eth::Interface`]: ../eth/struct.Interface.html
use crate::time::Duration;

mod neighbor;

pub use neighbor::{
    Neighbor,
    Answer as NeighborAnswer,
    Cache as NeighborCache,
};

/// Lifetimes of the neighbor cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// How long a learned mapping is used before it must be learned again.
    pub entry_lifetime: Duration,
    /// How long to wait for a reply before another request for the same address may be sent.
    pub request_lifetime: Duration,
}

impl Config {
    /// Neighbor entry lifetime.
    pub const ENTRY_LIFETIME: Duration = Duration::from_secs(30);

    /// Minimum delay between requests for the same address.
    pub const REQUEST_LIFETIME: Duration = Duration::from_secs(5);
}

impl Default for Config {
    fn default() -> Self {
        Config {
            entry_lifetime: Self::ENTRY_LIFETIME,
            request_lifetime: Self::REQUEST_LIFETIME,
        }
    }
}
