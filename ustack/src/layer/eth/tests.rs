use super::*;
use crate::nic::Queue;
use crate::time::Duration;
use crate::wire::{ArpOperation, ArpRepr, EthernetAddress, EthernetFrame, EthernetProtocol};
use crate::wire::{EthernetRepr, IpProtocol, Ipv4Address, Ipv4Datagram, Ipv4Header, Wire};

const MAC_HOST: EthernetAddress = EthernetAddress([0x02, 0, 0, 0, 0, 0x01]);
const MAC_PEER: EthernetAddress = EthernetAddress([0x02, 0, 0, 0, 0, 0x02]);
const IP_HOST: Ipv4Address = Ipv4Address::new(10, 0, 0, 1);
const IP_PEER: Ipv4Address = Ipv4Address::new(10, 0, 0, 2);
const IP_REMOTE: Ipv4Address = Ipv4Address::new(192, 168, 0, 1);

fn interface() -> Interface<Queue> {
    Interface::new("eth0", Queue::new(), MAC_HOST, IP_HOST)
}

fn datagram(dst_addr: Ipv4Address, payload: &[u8]) -> Ipv4Datagram {
    let mut datagram = Ipv4Datagram {
        header: Ipv4Header::new(IP_HOST, dst_addr, IpProtocol::Tcp),
        payload: payload.to_vec(),
    };
    datagram.compute_checksum();
    datagram
}

fn arp_frame(operation: ArpOperation, dst_addr: EthernetAddress, target: Ipv4Address) -> EthernetFrame {
    let message = ArpRepr {
        operation,
        sender_hardware_addr: MAC_PEER,
        sender_protocol_addr: IP_PEER,
        target_hardware_addr: if dst_addr.is_broadcast() { EthernetAddress::default() } else { dst_addr },
        target_protocol_addr: target,
    };
    EthernetFrame::new(
        EthernetRepr {
            dst_addr,
            src_addr: MAC_PEER,
            ethertype: EthernetProtocol::Arp,
        },
        message.serialize())
}

fn take_arp(iface: &mut Interface<Queue>) -> (EthernetRepr, ArpRepr) {
    let frame = iface.port_mut().pop().expect("an arp frame");
    assert_eq!(frame.header.ethertype, EthernetProtocol::Arp);
    (frame.header, ArpRepr::parse(&frame.payload).expect("valid arp"))
}

fn take_datagram(iface: &mut Interface<Queue>) -> (EthernetRepr, Ipv4Datagram) {
    let frame = iface.port_mut().pop().expect("an ipv4 frame");
    assert_eq!(frame.header.ethertype, EthernetProtocol::Ipv4);
    (frame.header, Ipv4Datagram::parse(&frame.payload).expect("valid datagram"))
}

#[test]
fn resolves_before_sending() {
    let mut iface = interface();
    iface.send_datagram(datagram(IP_PEER, b"one"), IP_PEER);

    let (header, request) = take_arp(&mut iface);
    assert_eq!(header.dst_addr, EthernetAddress::BROADCAST);
    assert_eq!(header.src_addr, MAC_HOST);
    assert_eq!(request.operation, ArpOperation::Request);
    assert_eq!(request.sender_protocol_addr, IP_HOST);
    assert_eq!(request.target_protocol_addr, IP_PEER);
    assert!(iface.port().is_empty());
    assert_eq!(iface.waiting(IP_PEER).len(), 1);

    // Only one request while waiting for the reply.
    iface.send_datagram(datagram(IP_PEER, b"two"), IP_PEER);
    assert!(iface.port().is_empty());
    assert_eq!(iface.waiting(IP_PEER).len(), 2);

    iface.recv_frame(&arp_frame(ArpOperation::Reply, MAC_HOST, IP_HOST));
    let (header, first) = take_datagram(&mut iface);
    assert_eq!(header.dst_addr, MAC_PEER);
    assert_eq!(first.payload, b"one");
    let (_, second) = take_datagram(&mut iface);
    assert_eq!(second.payload, b"two");
    assert!(iface.waiting(IP_PEER).is_empty());
    assert_eq!(iface.neighbors().pending_requests(), 0);

    // Now cached.
    iface.send_datagram(datagram(IP_PEER, b"three"), IP_PEER);
    let (header, third) = take_datagram(&mut iface);
    assert_eq!(header.dst_addr, MAC_PEER);
    assert_eq!(third.payload, b"three");
}

#[test]
fn next_hop_differs_from_destination() {
    let mut iface = interface();
    iface.recv_frame(&arp_frame(ArpOperation::Reply, MAC_HOST, IP_HOST));
    iface.send_datagram(datagram(IP_REMOTE, b"routed"), IP_PEER);
    let (header, sent) = take_datagram(&mut iface);
    assert_eq!(header.dst_addr, MAC_PEER);
    assert_eq!(sent.header.dst_addr, IP_REMOTE);
}

#[test]
fn answers_requests_for_us() {
    let mut iface = interface();
    iface.recv_frame(&arp_frame(ArpOperation::Request, EthernetAddress::BROADCAST, IP_HOST));

    let (header, reply) = take_arp(&mut iface);
    assert_eq!(header.dst_addr, MAC_PEER);
    assert_eq!(reply.operation, ArpOperation::Reply);
    assert_eq!(reply.sender_hardware_addr, MAC_HOST);
    assert_eq!(reply.sender_protocol_addr, IP_HOST);
    assert_eq!(reply.target_hardware_addr, MAC_PEER);
    assert_eq!(reply.target_protocol_addr, IP_PEER);

    // The requester was learned as well.
    iface.send_datagram(datagram(IP_PEER, b"x"), IP_PEER);
    let (header, _) = take_datagram(&mut iface);
    assert_eq!(header.dst_addr, MAC_PEER);
}

#[test]
fn learns_but_ignores_other_requests() {
    let mut iface = interface();
    iface.recv_frame(&arp_frame(ArpOperation::Request, EthernetAddress::BROADCAST, IP_REMOTE));
    assert!(iface.port().is_empty());
    assert!(iface.neighbors().neighbor(IP_PEER).is_some());
}

#[test]
fn filters_destination() {
    let mut iface = interface();
    let other = EthernetAddress([0x02, 0, 0, 0, 0, 0x99]);
    iface.recv_frame(&arp_frame(ArpOperation::Request, other, IP_HOST));
    assert!(iface.port().is_empty());
    assert!(iface.neighbors().neighbor(IP_PEER).is_none());

    let payload = datagram(IP_HOST, b"data").serialize();
    let frame = |dst_addr| EthernetFrame::new(
        EthernetRepr { dst_addr, src_addr: MAC_PEER, ethertype: EthernetProtocol::Ipv4 },
        payload.clone());
    iface.recv_frame(&frame(other));
    assert!(iface.datagrams_received().is_empty());
    iface.recv_frame(&frame(MAC_HOST));
    iface.recv_frame(&frame(EthernetAddress::BROADCAST));
    assert_eq!(iface.datagrams_received().len(), 2);
    let received = iface.datagrams_received().pop_front().unwrap();
    assert_eq!(received.payload, b"data");
}

#[test]
fn drops_malformed() {
    let mut iface = interface();
    let mut payload = datagram(IP_HOST, b"data").serialize();
    payload[10] ^= 0xff;
    iface.recv_frame(&EthernetFrame::new(
        EthernetRepr { dst_addr: MAC_HOST, src_addr: MAC_PEER, ethertype: EthernetProtocol::Ipv4 },
        payload));
    iface.recv_frame(&EthernetFrame::new(
        EthernetRepr { dst_addr: MAC_HOST, src_addr: MAC_PEER, ethertype: EthernetProtocol::Arp },
        vec![0; 4]));
    assert!(iface.datagrams_received().is_empty());
    assert!(iface.port().is_empty());
}

#[test]
fn request_is_retried_after_expiry() {
    let mut iface = interface();
    iface.send_datagram(datagram(IP_PEER, b"one"), IP_PEER);
    take_arp(&mut iface);

    iface.tick(Duration::from_millis(4999));
    iface.send_datagram(datagram(IP_PEER, b"two"), IP_PEER);
    assert!(iface.port().is_empty());

    iface.tick(Duration::from_millis(1));
    iface.send_datagram(datagram(IP_PEER, b"three"), IP_PEER);
    let (_, request) = take_arp(&mut iface);
    assert_eq!(request.target_protocol_addr, IP_PEER);

    // Everything queued so far is delivered on the reply.
    iface.recv_frame(&arp_frame(ArpOperation::Reply, MAC_HOST, IP_HOST));
    assert_eq!(iface.port().len(), 3);
}

#[test]
fn mapping_expires() {
    let mut iface = interface();
    iface.recv_frame(&arp_frame(ArpOperation::Reply, MAC_HOST, IP_HOST));
    iface.tick(Duration::from_millis(29_999));
    iface.send_datagram(datagram(IP_PEER, b"one"), IP_PEER);
    take_datagram(&mut iface);

    iface.tick(Duration::from_millis(1));
    iface.send_datagram(datagram(IP_PEER, b"two"), IP_PEER);
    let (_, request) = take_arp(&mut iface);
    assert_eq!(request.target_protocol_addr, IP_PEER);
}
