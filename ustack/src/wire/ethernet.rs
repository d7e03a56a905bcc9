use core::{fmt, str::FromStr};
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result, Wire};

enum_with_unknown! {
    /// Ethernet protocol type.
    pub enum EtherType(u16) {
        Ipv4 = 0x0800,
        Arp  = 0x0806,
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EtherType::Ipv4 => write!(f, "IPv4"),
            EtherType::Arp  => write!(f, "ARP"),
            EtherType::Unknown(id) => write!(f, "0x{:04x}", id)
        }
    }
}

/// A six-octet Ethernet II address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 6]);

impl Address {
    /// The broadcast address.
    pub const BROADCAST: Address = Address([0xff; 6]);

    /// Construct an Ethernet address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not six octets long.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; 6];
        bytes.copy_from_slice(data);
        Address(bytes)
    }

    /// Return an Ethernet address as a sequence of octets, in big-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether the address is an unicast address.
    pub fn is_unicast(&self) -> bool {
        !(self.is_broadcast() ||
          self.is_multicast())
    }

    /// Query whether this address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Query whether the "multicast" bit in the OUI is set.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
               bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5])
    }
}

/// Error returned when an Ethernet address can not be parsed from text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseAddressError {
    /// One of the components was not a hexadecimal octet.
    #[error("invalid ethernet component")]
    Component,
    /// There were not exactly six components.
    #[error("unexpected number of ethernet address components (should be 6)")]
    Separator,
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(src: &str) -> core::result::Result<Self, ParseAddressError> {
        let mut parsed = [0; 6];
        let mut components = src.split(':');
        for c in parsed.iter_mut() {
            let part = components
                .next()
                .ok_or(ParseAddressError::Separator)?;
            *c = u8::from_str_radix(part, 16)
                .map_err(|_| ParseAddressError::Component)?;
        }

        match components.next() {
            Some(_) => Err(ParseAddressError::Separator),
            None => Ok(Address(parsed)),
        }
    }
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const DESTINATION: Field = 0..6;
    pub(crate) const SOURCE: Field = 6..12;
    pub(crate) const ETHERTYPE: Field = 12..14;
    pub(crate) const PAYLOAD: usize = 14;
}

/// A high-level representation of an Ethernet II header.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Repr {
    /// The hardware address the frame is addressed to.
    pub dst_addr: Address,
    /// The hardware address of the sending interface.
    pub src_addr: Address,
    /// The protocol of the payload.
    pub ethertype: EtherType,
}

impl Repr {
    /// The length of every emitted header.
    pub const HEADER_LEN: usize = field::PAYLOAD;
}

impl Wire for Repr {
    fn parse(buffer: &[u8]) -> Result<Repr> {
        if buffer.len() < field::PAYLOAD {
            return Err(Error::Truncated);
        }

        Ok(Repr {
            dst_addr: Address::from_bytes(&buffer[field::DESTINATION]),
            src_addr: Address::from_bytes(&buffer[field::SOURCE]),
            ethertype: NetworkEndian::read_u16(&buffer[field::ETHERTYPE]).into(),
        })
    }

    fn buffer_len(&self) -> usize {
        field::PAYLOAD
    }

    fn emit(&self, buffer: &mut [u8]) {
        buffer[field::DESTINATION].copy_from_slice(self.dst_addr.as_bytes());
        buffer[field::SOURCE].copy_from_slice(self.src_addr.as_bytes());
        NetworkEndian::write_u16(&mut buffer[field::ETHERTYPE], self.ethertype.into());
    }
}

/// An Ethernet II frame, the unit an interface hands to its port.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Frame {
    /// The link layer header.
    pub header: Repr,
    /// The serialized upper layer packet.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Wrap an upper layer packet.
    pub fn new(header: Repr, payload: Vec<u8>) -> Self {
        Frame { header, payload }
    }
}

impl Wire for Frame {
    fn parse(buffer: &[u8]) -> Result<Frame> {
        let header = Repr::parse(buffer)?;
        Ok(Frame {
            header,
            payload: buffer[field::PAYLOAD..].to_vec(),
        })
    }

    fn buffer_len(&self) -> usize {
        self.header.buffer_len() + self.payload.len()
    }

    fn emit(&self, buffer: &mut [u8]) {
        self.header.emit(buffer);
        buffer[field::PAYLOAD..][..self.payload.len()].copy_from_slice(&self.payload);
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EthernetII src={} dst={} type={} len={}",
               self.header.src_addr, self.header.dst_addr,
               self.header.ethertype, self.payload.len())
    }
}
