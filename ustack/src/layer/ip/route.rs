//! The forwarding table, classless prefixes as in rfc1519 and rfc4632.
use std::collections::HashMap;

use crate::layer::{Error, Result};
use crate::wire::Ipv4Address;

/// Where datagrams of a matched prefix are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route {
    /// Index of the outgoing interface of the router.
    pub interface: usize,

    /// Next hop for this network.
    ///
    /// `None` for a network attached directly to the interface, the destination of the datagram
    /// is then its own next hop.
    pub next_hop: Option<Ipv4Address>,
}

/// A forwarding table with longest-prefix matching.
///
/// The table is partitioned by prefix length. Each partition maps the significant bits of a
/// prefix, shifted to the right, to its route. A lookup probes the partitions from the most
/// specific `/32` down to the default route `/0`.
#[derive(Debug, Clone)]
pub struct Routes {
    by_len: Vec<HashMap<u32, Route>>,
}

impl Routes {
    /// An empty table.
    pub fn new() -> Self {
        Routes {
            by_len: vec![HashMap::new(); 33],
        }
    }

    /// Add or replace the route of a prefix.
    ///
    /// Only the `prefix_len` most significant bits of `prefix` are relevant. Returns
    /// `Err(Error::Illegal)` if the prefix is longer than 32 bits.
    pub fn add(&mut self, prefix: Ipv4Address, prefix_len: u8, route: Route) -> Result<()> {
        let table = self.by_len.get_mut(usize::from(prefix_len))
            .ok_or(Error::Illegal)?;
        table.insert(Self::key(prefix, prefix_len), route);
        Ok(())
    }

    /// Find the route of the longest prefix containing `addr`.
    pub fn lookup(&self, addr: Ipv4Address) -> Option<Route> {
        (0..=32u8).rev().find_map(|len| {
            self.by_len[usize::from(len)].get(&Self::key(addr, len)).copied()
        })
    }

    /// The number of routes.
    pub fn len(&self) -> usize {
        self.by_len.iter().map(HashMap::len).sum()
    }

    /// Whether there is no route at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(addr: Ipv4Address, prefix_len: u8) -> u32 {
        addr.to_bits()
            .checked_shr(32 - u32::from(prefix_len))
            .unwrap_or(0)
    }
}

impl Default for Routes {
    fn default() -> Self {
        Routes::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn direct(interface: usize) -> Route {
        Route { interface, next_hop: None }
    }

    #[test]
    fn longest_prefix_wins() {
        let mut routes = Routes::new();
        routes.add(Ipv4Address::new(10, 0, 0, 0), 8, direct(0)).unwrap();
        routes.add(Ipv4Address::new(10, 1, 2, 0), 24, direct(1)).unwrap();
        routes.add(Ipv4Address::new(10, 1, 2, 3), 32, direct(2)).unwrap();

        assert_eq!(routes.lookup(Ipv4Address::new(10, 1, 2, 4)), Some(direct(1)));
        assert_eq!(routes.lookup(Ipv4Address::new(10, 1, 3, 4)), Some(direct(0)));
        assert_eq!(routes.lookup(Ipv4Address::new(10, 1, 2, 3)), Some(direct(2)));
        assert_eq!(routes.lookup(Ipv4Address::new(11, 1, 2, 3)), None);
        assert_eq!(routes.len(), 3);
    }

    #[test]
    fn default_route() {
        let mut routes = Routes::new();
        let gateway = Route { interface: 3, next_hop: Some(Ipv4Address::new(192, 168, 0, 1)) };
        // Host bits of the prefix are irrelevant.
        routes.add(Ipv4Address::new(1, 2, 3, 4), 0, gateway).unwrap();
        assert_eq!(routes.lookup(Ipv4Address::new(8, 8, 8, 8)), Some(gateway));
        assert_eq!(routes.lookup(Ipv4Address::BROADCAST), Some(gateway));
    }

    #[test]
    fn replace_route() {
        let mut routes = Routes::new();
        routes.add(Ipv4Address::new(10, 0, 0, 0), 8, direct(0)).unwrap();
        routes.add(Ipv4Address::new(10, 255, 0, 0), 8, direct(1)).unwrap();
        assert_eq!(routes.lookup(Ipv4Address::new(10, 0, 0, 1)), Some(direct(1)));
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn prefix_too_long() {
        let mut routes = Routes::new();
        assert_eq!(routes.add(Ipv4Address::new(10, 0, 0, 0), 33, direct(0)), Err(Error::Illegal));
        assert!(routes.is_empty());
    }
}
