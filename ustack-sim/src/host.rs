use tracing::trace;

use ustack::layer::eth::Interface;
use ustack::nic::Queue;
use ustack::time::Duration;
use ustack::wire::{EthernetFrame, IpProtocol, Ipv4Address, Ipv4Datagram, Ipv4Header};
use ustack::wire::{TcpChecksum, TcpRepr};

use crate::Peer;

/// A machine with a single interface and a single connection.
///
/// Segments of the connection are wrapped into datagrams to the remote address and sent
/// through the gateway. Received datagrams addressed to the host carry the segments of the
/// remote endpoint.
#[derive(Debug)]
pub struct Host {
    interface: Interface<Queue>,
    gateway: Ipv4Address,
    remote: Ipv4Address,
    peer: Peer,
}

impl Host {
    /// Create a host talking to `remote` through `gateway`.
    pub fn new(interface: Interface<Queue>, gateway: Ipv4Address, remote: Ipv4Address, peer: Peer) -> Self {
        Host {
            interface,
            gateway,
            remote,
            peer,
        }
    }

    /// Send what the connection allows.
    pub fn push(&mut self) {
        for segment in self.peer.push() {
            self.send(&segment);
        }
    }

    /// Advance time for the connection and the neighbor cache.
    pub fn tick(&mut self, elapsed: Duration) {
        self.interface.tick(elapsed);
        for segment in self.peer.tick(elapsed) {
            self.send(&segment);
        }
    }

    /// Process a frame arriving on the link.
    pub fn recv_frame(&mut self, frame: &EthernetFrame) {
        self.interface.recv_frame(frame);

        while let Some(datagram) = self.interface.datagrams_received().pop_front() {
            let header = datagram.header;
            if header.dst_addr != self.interface.ip_addr() {
                trace!(host = self.interface.name(), dst = %header.dst_addr, "datagram not for us");
                continue;
            }

            if header.protocol != IpProtocol::Tcp {
                trace!(host = self.interface.name(), protocol = %header.protocol, "unknown protocol");
                continue;
            }

            let checksum = TcpChecksum::Manual {
                src_addr: header.src_addr,
                dst_addr: header.dst_addr,
            };
            let segment = match TcpRepr::parse_with(&datagram.payload, checksum) {
                Ok(segment) => segment,
                Err(err) => {
                    trace!(host = self.interface.name(), %err, "dropping segment");
                    continue;
                },
            };

            if let Some(ack) = self.peer.receive(segment) {
                self.send(&ack);
            }
        }
    }

    /// Take the frames waiting to be put onto the link.
    pub fn take_frames(&mut self) -> Vec<EthernetFrame> {
        self.interface.port_mut().drain().collect()
    }

    fn send(&mut self, segment: &TcpRepr) {
        let src_addr = self.interface.ip_addr();
        let dst_addr = self.remote;
        let mut datagram = Ipv4Datagram {
            header: Ipv4Header::new(src_addr, dst_addr, IpProtocol::Tcp),
            payload: segment.serialize_with(TcpChecksum::Manual { src_addr, dst_addr }),
        };
        datagram.compute_checksum();
        self.interface.send_datagram(datagram, self.gateway);
    }

    /// The name of the interface.
    pub fn name(&self) -> &str {
        self.interface.name()
    }

    /// The network interface.
    pub fn interface(&self) -> &Interface<Queue> {
        &self.interface
    }

    /// The endpoint of the connection.
    pub fn peer(&self) -> &Peer {
        &self.peer
    }

    /// Mutably access the endpoint, to write into and read from its streams.
    pub fn peer_mut(&mut self) -> &mut Peer {
        &mut self.peer
    }
}
