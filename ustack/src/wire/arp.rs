use byteorder::{ByteOrder, NetworkEndian};
use core::fmt;

use super::{Error, Result, Wire};
use super::{EthernetAddress, EthernetProtocol, Ipv4Address};

enum_with_unknown! {
    /// ARP hardware type.
    pub(crate) enum Hardware(u16) {
        Ethernet = 1
    }
}

enum_with_unknown! {
    /// ARP operation type.
    pub enum Operation(u16) {
        Request = 1,
        Reply = 2
    }
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const HTYPE: Field = 0..2;
    pub(crate) const PTYPE: Field = 2..4;
    pub(crate) const HLEN: usize = 4;
    pub(crate) const PLEN: usize = 5;
    pub(crate) const OPER: Field = 6..8;
    // Fixed offsets since only Ethernet and IPv4 are recognized.
    pub(crate) const SHA: Field = 8..14;
    pub(crate) const SPA: Field = 14..18;
    pub(crate) const THA: Field = 18..24;
    pub(crate) const TPA: Field = 24..28;
}

/// A high-level representation of an ARP message for IPv4 over Ethernet.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Repr {
    /// Whether this is a request or a reply.
    pub operation: Operation,
    /// Hardware address of the sender.
    pub sender_hardware_addr: EthernetAddress,
    /// Protocol address of the sender.
    pub sender_protocol_addr: Ipv4Address,
    /// Hardware address of the target, all zero in requests.
    pub target_hardware_addr: EthernetAddress,
    /// Protocol address of the target.
    pub target_protocol_addr: Ipv4Address,
}

impl Wire for Repr {
    /// Parse an ARP message, or return `Err(Error::Unrecognized)` for any hardware or protocol
    /// combination other than Ethernet and IPv4.
    fn parse(buffer: &[u8]) -> Result<Repr> {
        if buffer.len() < field::OPER.end {
            return Err(Error::Truncated);
        }

        let hardware = Hardware::from(NetworkEndian::read_u16(&buffer[field::HTYPE]));
        let protocol = EthernetProtocol::from(NetworkEndian::read_u16(&buffer[field::PTYPE]));
        match (hardware, protocol, buffer[field::HLEN], buffer[field::PLEN]) {
            (Hardware::Ethernet, EthernetProtocol::Ipv4, 6, 4) => (),
            _ => return Err(Error::Unrecognized),
        }

        if buffer.len() < field::TPA.end {
            return Err(Error::Truncated);
        }

        Ok(Repr {
            operation: NetworkEndian::read_u16(&buffer[field::OPER]).into(),
            sender_hardware_addr: EthernetAddress::from_bytes(&buffer[field::SHA]),
            sender_protocol_addr: Ipv4Address::from_bytes(&buffer[field::SPA]),
            target_hardware_addr: EthernetAddress::from_bytes(&buffer[field::THA]),
            target_protocol_addr: Ipv4Address::from_bytes(&buffer[field::TPA]),
        })
    }

    fn buffer_len(&self) -> usize {
        field::TPA.end
    }

    fn emit(&self, buffer: &mut [u8]) {
        NetworkEndian::write_u16(&mut buffer[field::HTYPE], Hardware::Ethernet.into());
        NetworkEndian::write_u16(&mut buffer[field::PTYPE], EthernetProtocol::Ipv4.into());
        buffer[field::HLEN] = 6;
        buffer[field::PLEN] = 4;
        NetworkEndian::write_u16(&mut buffer[field::OPER], self.operation.into());
        buffer[field::SHA].copy_from_slice(self.sender_hardware_addr.as_bytes());
        buffer[field::SPA].copy_from_slice(self.sender_protocol_addr.as_bytes());
        buffer[field::THA].copy_from_slice(self.target_hardware_addr.as_bytes());
        buffer[field::TPA].copy_from_slice(self.target_protocol_addr.as_bytes());
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ARP type=Ethernet+IPv4 src={}/{} tgt={}/{} op={:?}",
               self.sender_hardware_addr, self.sender_protocol_addr,
               self.target_hardware_addr, self.target_protocol_addr,
               self.operation)
    }
}
