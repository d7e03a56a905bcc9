// Heads up! Before working on this file you should read, at least,
// the parts of RFC 1122 that discuss ARP.
use std::collections::HashMap;

use crate::time::{Duration, Timer};
use crate::wire::{EthernetAddress, Ipv4Address};
use super::Config;

/// A cached neighbor.
///
/// A neighbor mapping translates from a protocol address to a hardware address. Its age counts
/// from the last time the mapping was learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    hardware_addr: EthernetAddress,
    age: Timer,
}

/// An answer to a neighbor cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// The neighbor address is in the cache and not expired.
    Found(EthernetAddress),
    /// The neighbor address is not in the cache, or has expired.
    NotFound,
    /// The neighbor address is not in the cache but a request has been sent recently.
    RateLimited,
}

/// A neighbor cache backed by a map.
///
/// Learned mappings and outstanding requests age independently, each against its own lifetime
/// from the [`Config`]. Expired entries are evicted on the next [`tick`](#method.tick).
///
/// # Examples
///
/// ```rust
/// use ustack::layer::arp::{Config, NeighborAnswer, NeighborCache};
/// use ustack::time::Duration;
/// use ustack::wire::{EthernetAddress, Ipv4Address};
///
/// let peer = Ipv4Address::new(10, 0, 0, 2);
/// let mut cache = NeighborCache::new(Config::default());
/// assert_eq!(cache.lookup(peer), NeighborAnswer::NotFound);
///
/// cache.requesting(peer);
/// assert_eq!(cache.lookup(peer), NeighborAnswer::RateLimited);
///
/// cache.fill(peer, EthernetAddress([2, 0, 0, 0, 0, 2]));
/// assert_eq!(cache.lookup(peer), NeighborAnswer::Found(EthernetAddress([2, 0, 0, 0, 0, 2])));
///
/// cache.tick(Duration::from_secs(30));
/// assert_eq!(cache.lookup(peer), NeighborAnswer::NotFound);
/// ```
///
/// [`Config`]: struct.Config.html
#[derive(Clone, Debug)]
pub struct Cache {
    config: Config,
    entries: HashMap<Ipv4Address, Neighbor>,
    requests: HashMap<Ipv4Address, Timer>,
}

impl Neighbor {
    /// The hardware address of the neighbor.
    pub fn hardware_addr(&self) -> EthernetAddress {
        self.hardware_addr
    }

    /// The time since the mapping was learned.
    pub fn age(&self) -> Duration {
        self.age.elapsed()
    }
}

impl Cache {
    /// Create an empty cache.
    pub fn new(config: Config) -> Self {
        Cache {
            config,
            entries: HashMap::new(),
            requests: HashMap::new(),
        }
    }

    /// Find the hardware address of a neighbor.
    pub fn lookup(&self, protocol_addr: Ipv4Address) -> Answer {
        if let Some(neighbor) = self.entries.get(&protocol_addr) {
            Answer::Found(neighbor.hardware_addr)
        } else if self.requests.contains_key(&protocol_addr) {
            Answer::RateLimited
        } else {
            Answer::NotFound
        }
    }

    /// Learn or refresh a mapping.
    ///
    /// The age of the mapping starts over and any outstanding request for it is answered.
    pub fn fill(&mut self, protocol_addr: Ipv4Address, hardware_addr: EthernetAddress) {
        self.entries.insert(protocol_addr, Neighbor {
            hardware_addr,
            age: Timer::new(),
        });
        self.requests.remove(&protocol_addr);
    }

    /// Indicate a request for an address has just been sent.
    ///
    /// Lookups are rate limited until the request is answered or expires.
    pub fn requesting(&mut self, protocol_addr: Ipv4Address) {
        self.requests.insert(protocol_addr, Timer::new());
    }

    /// Age all mappings and requests, evicting those that expired.
    pub fn tick(&mut self, elapsed: Duration) {
        let Config { entry_lifetime, request_lifetime } = self.config;
        self.entries.retain(|_, neighbor| !neighbor.age.tick(elapsed).expired(entry_lifetime));
        self.requests.retain(|_, request| !request.tick(elapsed).expired(request_lifetime));
    }

    /// The current mapping of an address, if any.
    pub fn neighbor(&self, protocol_addr: Ipv4Address) -> Option<&Neighbor> {
        self.entries.get(&protocol_addr)
    }

    /// Iterate over all current mappings.
    pub fn neighbors(&self) -> impl Iterator<Item=(Ipv4Address, &Neighbor)> + '_ {
        self.entries.iter().map(|(&addr, neighbor)| (addr, neighbor))
    }

    /// The number of addresses with an outstanding request.
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    /// The lifetimes in use.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PEER_A: Ipv4Address = Ipv4Address::new(10, 0, 0, 2);
    const PEER_B: Ipv4Address = Ipv4Address::new(10, 0, 0, 3);
    const HW_A: EthernetAddress = EthernetAddress([2, 0, 0, 0, 0, 2]);
    const HW_B: EthernetAddress = EthernetAddress([2, 0, 0, 0, 0, 3]);

    #[test]
    fn entries_age_independently() {
        let mut cache = Cache::new(Config::default());
        cache.fill(PEER_A, HW_A);
        cache.tick(Duration::from_secs(20));
        cache.fill(PEER_B, HW_B);
        cache.tick(Duration::from_secs(9));
        assert_eq!(cache.lookup(PEER_A), Answer::Found(HW_A));
        assert_eq!(cache.neighbor(PEER_A).map(Neighbor::age), Some(Duration::from_secs(29)));

        cache.tick(Duration::from_secs(1));
        assert_eq!(cache.lookup(PEER_A), Answer::NotFound);
        assert_eq!(cache.lookup(PEER_B), Answer::Found(HW_B));

        cache.tick(Duration::from_secs(20));
        assert_eq!(cache.lookup(PEER_B), Answer::NotFound);
        assert_eq!(cache.neighbors().count(), 0);
    }

    #[test]
    fn refresh_restarts_age() {
        let mut cache = Cache::new(Config::default());
        cache.fill(PEER_A, HW_A);
        cache.tick(Duration::from_secs(25));
        cache.fill(PEER_A, HW_B);
        cache.tick(Duration::from_secs(25));
        assert_eq!(cache.lookup(PEER_A), Answer::Found(HW_B));
    }

    #[test]
    fn requests_expire() {
        let mut cache = Cache::new(Config::default());
        cache.requesting(PEER_A);
        cache.tick(Duration::from_millis(4999));
        assert_eq!(cache.lookup(PEER_A), Answer::RateLimited);
        cache.tick(Duration::from_millis(1));
        assert_eq!(cache.lookup(PEER_A), Answer::NotFound);
        assert_eq!(cache.pending_requests(), 0);
    }

    #[test]
    fn fill_answers_request() {
        let mut cache = Cache::new(Config::default());
        cache.requesting(PEER_A);
        cache.requesting(PEER_B);
        cache.fill(PEER_A, HW_A);
        assert_eq!(cache.pending_requests(), 1);
        assert_eq!(cache.lookup(PEER_B), Answer::RateLimited);
    }
}
