use super::*;
use crate::layer::eth::Interface;
use crate::layer::Error;
use crate::nic::Queue;
use crate::time::Duration;
use crate::wire::{ArpOperation, ArpRepr, EthernetAddress, EthernetFrame, EthernetProtocol};
use crate::wire::{EthernetRepr, IpProtocol, Ipv4Address, Ipv4Datagram, Ipv4Header, Wire};

const MAC_HOST: EthernetAddress = EthernetAddress([0x02, 0, 0, 0, 0xff, 0x01]);
const MAC_NEIGHBOR: EthernetAddress = EthernetAddress([0x02, 0, 0, 0, 0xff, 0x02]);
const IP_HOST: Ipv4Address = Ipv4Address::new(10, 0, 0, 2);
const IP_NEIGHBOR: Ipv4Address = Ipv4Address::new(10, 0, 1, 7);
const IP_GATEWAY: Ipv4Address = Ipv4Address::new(192, 168, 0, 2);

/// A router with three interfaces.
///
/// * `10.0.0.0/24` is attached to interface 0.
/// * `10.0.1.0/24` is attached to interface 1.
/// * Everything else in `10.0.0.0/8` goes through a gateway on interface 2.
fn router() -> Router<Queue> {
    let mut router = Router::new();
    let addrs = [
        (EthernetAddress([0x02, 0, 0, 0, 0, 0]), Ipv4Address::new(10, 0, 0, 1)),
        (EthernetAddress([0x02, 0, 0, 0, 0, 1]), Ipv4Address::new(10, 0, 1, 1)),
        (EthernetAddress([0x02, 0, 0, 0, 0, 2]), Ipv4Address::new(192, 168, 0, 1)),
    ];
    for (index, &(mac, ip)) in addrs.iter().enumerate() {
        let name = format!("eth{}", index);
        assert_eq!(router.add_interface(Interface::new(name, Queue::new(), mac, ip)), index);
    }

    router.add_route(Ipv4Address::new(10, 0, 0, 0), 24, None, 0).unwrap();
    router.add_route(Ipv4Address::new(10, 0, 1, 0), 24, None, 1).unwrap();
    router.add_route(Ipv4Address::new(10, 0, 0, 0), 8, Some(IP_GATEWAY), 2).unwrap();
    router
}

fn datagram(dst_addr: Ipv4Address, ttl: u8) -> Ipv4Datagram {
    let mut datagram = Ipv4Datagram {
        header: Ipv4Header::new(IP_HOST, dst_addr, IpProtocol::Tcp),
        payload: b"payload".to_vec(),
    };
    datagram.header.ttl = ttl;
    datagram.compute_checksum();
    datagram
}

fn deliver(router: &mut Router<Queue>, index: usize, datagram: &Ipv4Datagram) {
    let interface = router.interface_mut(index).unwrap();
    let frame = EthernetFrame::new(
        EthernetRepr {
            dst_addr: interface.ethernet_addr(),
            src_addr: MAC_HOST,
            ethertype: EthernetProtocol::Ipv4,
        },
        datagram.serialize());
    interface.recv_frame(&frame);
}

/// Let interface 1 learn the hardware address of the neighbor.
fn learn_neighbor(router: &mut Router<Queue>) {
    let interface = router.interface_mut(1).unwrap();
    let announcement = ArpRepr {
        operation: ArpOperation::Reply,
        sender_hardware_addr: MAC_NEIGHBOR,
        sender_protocol_addr: IP_NEIGHBOR,
        target_hardware_addr: interface.ethernet_addr(),
        target_protocol_addr: interface.ip_addr(),
    };
    let frame = EthernetFrame::new(
        EthernetRepr {
            dst_addr: interface.ethernet_addr(),
            src_addr: MAC_NEIGHBOR,
            ethertype: EthernetProtocol::Arp,
        },
        announcement.serialize());
    interface.recv_frame(&frame);
}

fn sent(router: &mut Router<Queue>, index: usize) -> Vec<EthernetFrame> {
    router.interface_mut(index).unwrap().port_mut().drain().collect()
}

fn arp_target(frame: &EthernetFrame) -> Ipv4Address {
    assert_eq!(frame.header.ethertype, EthernetProtocol::Arp);
    ArpRepr::parse(&frame.payload).unwrap().target_protocol_addr
}

#[test]
fn forwards_to_attached_network() {
    let mut router = router();
    learn_neighbor(&mut router);
    deliver(&mut router, 0, &datagram(IP_NEIGHBOR, 64));
    router.route();

    let frames = sent(&mut router, 1);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].header.dst_addr, MAC_NEIGHBOR);
    let forwarded = Ipv4Datagram::parse(&frames[0].payload).unwrap();
    assert_eq!(forwarded.header.ttl, 63);
    assert_eq!(forwarded.header.dst_addr, IP_NEIGHBOR);
    assert_eq!(forwarded.payload, b"payload");
    assert!(router.interface(0).unwrap().port().is_empty());
    assert!(router.interface(2).unwrap().port().is_empty());
}

#[test]
fn longest_prefix_and_gateway() {
    let mut router = router();
    // Matches both the /8 and the /24 of interface 1.
    deliver(&mut router, 0, &datagram(Ipv4Address::new(10, 0, 1, 9), 64));
    // Matches only the /8.
    deliver(&mut router, 0, &datagram(Ipv4Address::new(10, 7, 7, 7), 64));
    router.route();

    let frames = sent(&mut router, 1);
    assert_eq!(frames.len(), 1);
    assert_eq!(arp_target(&frames[0]), Ipv4Address::new(10, 0, 1, 9));

    // Resolves the gateway, not the destination.
    let frames = sent(&mut router, 2);
    assert_eq!(frames.len(), 1);
    assert_eq!(arp_target(&frames[0]), IP_GATEWAY);
    assert_eq!(router.interface(2).unwrap().waiting(IP_GATEWAY).len(), 1);
}

#[test]
fn drops_expiring_ttl() {
    let mut router = router();
    learn_neighbor(&mut router);
    deliver(&mut router, 0, &datagram(IP_NEIGHBOR, 1));
    deliver(&mut router, 0, &datagram(IP_NEIGHBOR, 0));
    router.route();
    assert!(sent(&mut router, 1).is_empty());

    deliver(&mut router, 0, &datagram(IP_NEIGHBOR, 2));
    router.route();
    let frames = sent(&mut router, 1);
    assert_eq!(frames.len(), 1);
    assert_eq!(Ipv4Datagram::parse(&frames[0].payload).unwrap().header.ttl, 1);
}

#[test]
fn drops_unroutable() {
    let mut router = router();
    deliver(&mut router, 1, &datagram(Ipv4Address::new(172, 16, 0, 1), 64));
    router.add_route(Ipv4Address::new(172, 17, 0, 0), 16, None, 9).unwrap();
    deliver(&mut router, 1, &datagram(Ipv4Address::new(172, 17, 0, 1), 64));
    router.route();

    for index in 0..router.interface_count() {
        assert!(sent(&mut router, index).is_empty());
        assert!(router.interface_mut(index).unwrap().datagrams_received().is_empty());
    }
}

#[test]
fn forwards_back_out_of_the_same_interface() {
    let mut router = router();
    deliver(&mut router, 0, &datagram(Ipv4Address::new(10, 0, 0, 3), 64));
    router.route();
    let frames = sent(&mut router, 0);
    assert_eq!(arp_target(&frames[0]), Ipv4Address::new(10, 0, 0, 3));
}

#[test]
fn tick_reaches_interfaces() {
    let mut router = router();
    deliver(&mut router, 0, &datagram(IP_NEIGHBOR, 64));
    router.route();
    assert_eq!(sent(&mut router, 1).len(), 1);

    router.tick(Duration::from_secs(5));
    deliver(&mut router, 0, &datagram(IP_NEIGHBOR, 64));
    router.route();
    let frames = sent(&mut router, 1);
    assert_eq!(frames.len(), 1);
    assert_eq!(arp_target(&frames[0]), IP_NEIGHBOR);
}

#[test]
fn rejects_long_prefix() {
    let mut router = router();
    let routes = router.routes().len();
    assert_eq!(router.add_route(Ipv4Address::new(10, 0, 0, 0), 33, None, 0), Err(Error::Illegal));
    assert_eq!(router.routes().len(), routes);
}
