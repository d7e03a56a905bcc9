use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use crate::layer::arp::{self, NeighborAnswer, NeighborCache};
use crate::nic::Port;
use crate::time::Duration;
use crate::wire::{ArpOperation, ArpRepr, EthernetAddress, EthernetFrame, EthernetProtocol};
use crate::wire::{EthernetRepr, Ipv4Address, Ipv4Datagram, Wire};

/// A network interface connecting the IP layer to an Ethernet link.
///
/// Outgoing datagrams are addressed to the hardware address of their next hop. Unknown hardware
/// addresses are resolved with ARP while the datagrams wait in a queue per next hop. Incoming
/// frames are filtered by their destination, datagrams are queued for the caller and ARP
/// messages are answered and learned from.
///
/// All frames leave through the port `P`.
#[derive(Debug)]
pub struct Interface<P> {
    name: String,
    port: P,
    ethernet_addr: EthernetAddress,
    ip_addr: Ipv4Address,
    neighbors: NeighborCache,
    /// Datagrams waiting for a next hop to be resolved.
    waiting: HashMap<Ipv4Address, Vec<Ipv4Datagram>>,
    received: VecDeque<Ipv4Datagram>,
}

impl<P: Port> Interface<P> {
    /// Create an interface with the default ARP lifetimes.
    pub fn new(
        name: impl Into<String>,
        port: P,
        ethernet_addr: EthernetAddress,
        ip_addr: Ipv4Address,
    ) -> Self {
        Interface::with_config(name, port, ethernet_addr, ip_addr, arp::Config::default())
    }

    /// Create an interface with custom ARP lifetimes.
    pub fn with_config(
        name: impl Into<String>,
        port: P,
        ethernet_addr: EthernetAddress,
        ip_addr: Ipv4Address,
        config: arp::Config,
    ) -> Self {
        let name = name.into();
        debug!(interface = %name, %ethernet_addr, %ip_addr, "network interface up");
        Interface {
            name,
            port,
            ethernet_addr,
            ip_addr,
            neighbors: NeighborCache::new(config),
            waiting: HashMap::new(),
            received: VecDeque::new(),
        }
    }

    /// Send a datagram towards the next hop on the link.
    ///
    /// The next hop is the destination itself on a directly attached network and a router
    /// otherwise. If its hardware address is not known the datagram is queued and, unless one is
    /// already outstanding, an ARP request is broadcast.
    pub fn send_datagram(&mut self, datagram: Ipv4Datagram, next_hop: Ipv4Address) {
        match self.neighbors.lookup(next_hop) {
            NeighborAnswer::Found(hardware_addr) => self.transmit_datagram(&datagram, hardware_addr),
            NeighborAnswer::RateLimited => {
                trace!(interface = %self.name, %next_hop, "queueing datagram, resolution pending");
                self.waiting.entry(next_hop).or_default().push(datagram);
            },
            NeighborAnswer::NotFound => {
                trace!(interface = %self.name, %next_hop, "resolving next hop");
                self.waiting.entry(next_hop).or_default().push(datagram);
                self.neighbors.requesting(next_hop);
                let request = ArpRepr {
                    operation: ArpOperation::Request,
                    sender_hardware_addr: self.ethernet_addr,
                    sender_protocol_addr: self.ip_addr,
                    target_hardware_addr: EthernetAddress::default(),
                    target_protocol_addr: next_hop,
                };
                self.transmit_arp(&request, EthernetAddress::BROADCAST);
            },
        }
    }

    /// Process a frame received from the link.
    pub fn recv_frame(&mut self, frame: &EthernetFrame) {
        let header = frame.header;
        if header.dst_addr != self.ethernet_addr && !header.dst_addr.is_broadcast() {
            trace!(interface = %self.name, dst = %header.dst_addr, "frame not for us");
            return;
        }

        match header.ethertype {
            EthernetProtocol::Ipv4 => match Ipv4Datagram::parse(&frame.payload) {
                Ok(datagram) => self.received.push_back(datagram),
                Err(err) => trace!(interface = %self.name, %err, "dropping datagram"),
            },
            EthernetProtocol::Arp => match ArpRepr::parse(&frame.payload) {
                Ok(message) => self.recv_arp(&message),
                Err(err) => trace!(interface = %self.name, %err, "dropping arp message"),
            },
            other => trace!(interface = %self.name, ethertype = %other, "unknown ethertype"),
        }
    }

    fn recv_arp(&mut self, message: &ArpRepr) {
        let sender_ip = message.sender_protocol_addr;
        let sender_hw = message.sender_hardware_addr;
        debug!(interface = %self.name, ip = %sender_ip, hw = %sender_hw, "learned neighbor");
        self.neighbors.fill(sender_ip, sender_hw);

        if message.operation == ArpOperation::Request && message.target_protocol_addr == self.ip_addr {
            let reply = ArpRepr {
                operation: ArpOperation::Reply,
                sender_hardware_addr: self.ethernet_addr,
                sender_protocol_addr: self.ip_addr,
                target_hardware_addr: sender_hw,
                target_protocol_addr: sender_ip,
            };
            self.transmit_arp(&reply, sender_hw);
        }

        if let Some(waiting) = self.waiting.remove(&sender_ip) {
            for datagram in waiting {
                self.transmit_datagram(&datagram, sender_hw);
            }
        }
    }

    /// Advance time for the neighbor cache.
    ///
    /// Expired mappings must be resolved again. An expired request allows a new one to be sent
    /// with the next datagram for that address.
    pub fn tick(&mut self, elapsed: Duration) {
        self.neighbors.tick(elapsed);
    }

    fn transmit_datagram(&mut self, datagram: &Ipv4Datagram, dst_addr: EthernetAddress) {
        self.transmit(dst_addr, EthernetProtocol::Ipv4, datagram.serialize());
    }

    fn transmit_arp(&mut self, message: &ArpRepr, dst_addr: EthernetAddress) {
        self.transmit(dst_addr, EthernetProtocol::Arp, message.serialize());
    }

    fn transmit(&mut self, dst_addr: EthernetAddress, ethertype: EthernetProtocol, payload: Vec<u8>) {
        let header = EthernetRepr {
            dst_addr,
            src_addr: self.ethernet_addr,
            ethertype,
        };
        self.port.transmit(EthernetFrame::new(header, payload));
    }
}

impl<P> Interface<P> {
    /// Datagrams received and not yet taken by the caller, oldest first.
    pub fn datagrams_received(&mut self) -> &mut VecDeque<Ipv4Datagram> {
        &mut self.received
    }

    /// The datagrams queued for a next hop that is being resolved.
    pub fn waiting(&self, next_hop: Ipv4Address) -> &[Ipv4Datagram] {
        self.waiting.get(&next_hop).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The name given on creation, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The hardware address of the interface.
    pub fn ethernet_addr(&self) -> EthernetAddress {
        self.ethernet_addr
    }

    /// The protocol address of the interface.
    pub fn ip_addr(&self) -> Ipv4Address {
        self.ip_addr
    }

    /// The neighbor cache.
    pub fn neighbors(&self) -> &NeighborCache {
        &self.neighbors
    }

    /// The port frames are sent on.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutably access the port, e.g. to take transmitted frames off a queue.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}
