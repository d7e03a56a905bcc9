use tracing::{debug, trace};

use crate::layer::eth::Interface;
use crate::layer::Result;
use crate::nic::Port;
use crate::time::Duration;
use crate::wire::Ipv4Address;
use super::{Route, Routes};

/// Forwards datagrams between the networks of its interfaces.
///
/// The router owns its interfaces, which are addressed by the index returned from
/// [`add_interface`](#method.add_interface). Routing a datagram decrements its time-to-live and
/// sends it on the interface of the longest matching prefix.
#[derive(Debug)]
pub struct Router<P> {
    interfaces: Vec<Interface<P>>,
    routes: Routes,
}

impl<P: Port> Router<P> {
    /// A router without interfaces or routes.
    pub fn new() -> Self {
        Router {
            interfaces: Vec::new(),
            routes: Routes::new(),
        }
    }

    /// Attach an interface, returning its index.
    pub fn add_interface(&mut self, interface: Interface<P>) -> usize {
        self.interfaces.push(interface);
        self.interfaces.len() - 1
    }

    /// Access an interface by index.
    pub fn interface(&self, index: usize) -> Option<&Interface<P>> {
        self.interfaces.get(index)
    }

    /// Mutably access an interface by index.
    pub fn interface_mut(&mut self, index: usize) -> Option<&mut Interface<P>> {
        self.interfaces.get_mut(index)
    }

    /// The number of interfaces.
    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    /// Route datagrams for `prefix/prefix_len` out of `interface`.
    ///
    /// Without a `next_hop` the network is directly attached and the datagram is sent to its
    /// destination address.
    pub fn add_route(
        &mut self,
        prefix: Ipv4Address,
        prefix_len: u8,
        next_hop: Option<Ipv4Address>,
        interface: usize,
    ) -> Result<()> {
        match next_hop {
            Some(next_hop) => debug!(%prefix, prefix_len, %next_hop, interface, "adding route"),
            None => debug!(%prefix, prefix_len, interface, "adding direct route"),
        }

        self.routes.add(prefix, prefix_len, Route { interface, next_hop })
    }

    /// The forwarding table.
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Forward every datagram received on any interface.
    pub fn route(&mut self) {
        for index in 0..self.interfaces.len() {
            let received: Vec<_> = self.interfaces[index].datagrams_received().drain(..).collect();
            for mut datagram in received {
                let dst_addr = datagram.header.dst_addr;
                if datagram.header.ttl <= 1 {
                    trace!(%dst_addr, "time to live exceeded");
                    continue;
                }

                datagram.header.ttl -= 1;
                datagram.header.compute_checksum();

                let route = match self.routes.lookup(dst_addr) {
                    Some(route) => route,
                    None => {
                        trace!(%dst_addr, "no route");
                        continue;
                    },
                };

                let next_hop = route.next_hop.unwrap_or(dst_addr);
                match self.interfaces.get_mut(route.interface) {
                    Some(interface) => interface.send_datagram(datagram, next_hop),
                    None => trace!(%dst_addr, interface = route.interface, "route to missing interface"),
                }
            }
        }
    }

    /// Advance time on every interface.
    pub fn tick(&mut self, elapsed: Duration) {
        for interface in &mut self.interfaces {
            interface.tick(elapsed);
        }
    }
}

impl<P: Port> Default for Router<P> {
    fn default() -> Self {
        Router::new()
    }
}
