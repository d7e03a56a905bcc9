use core::{fmt, str::FromStr};
use byteorder::{ByteOrder, NetworkEndian};

use super::{checksum, Error, Result, Wire};

enum_with_unknown! {
    /// IP datagram encapsulated protocol.
    pub enum Protocol(u8) {
        Icmp = 0x01,
        Tcp  = 0x06,
        Udp  = 0x11,
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Protocol::Icmp => write!(f, "ICMP"),
            Protocol::Tcp  => write!(f, "TCP"),
            Protocol::Udp  => write!(f, "UDP"),
            Protocol::Unknown(id) => write!(f, "0x{:02x}", id),
        }
    }
}

/// A four-octet IPv4 address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 4]);

impl Address {
    /// An unspecified address.
    pub const UNSPECIFIED: Address = Address([0x00; 4]);

    /// The broadcast address.
    pub const BROADCAST: Address = Address([0xff; 4]);

    /// Construct an IPv4 address from parts.
    pub const fn new(a0: u8, a1: u8, a2: u8, a3: u8) -> Address {
        Address([a0, a1, a2, a3])
    }

    /// Construct an IPv4 address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not four octets long.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(data);
        Address(bytes)
    }

    /// Return an IPv4 address as a sequence of octets, in big-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The address as a host integer, the first octet being most significant.
    pub fn to_bits(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Construct an address from a host integer, the most significant octet coming first.
    pub fn from_bits(bits: u32) -> Self {
        Address(bits.to_be_bytes())
    }

    /// Query whether the address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl From<std::net::Ipv4Addr> for Address {
    fn from(x: std::net::Ipv4Addr) -> Address {
        Address(x.octets())
    }
}

impl From<Address> for std::net::Ipv4Addr {
    fn from(Address(x): Address) -> std::net::Ipv4Addr {
        x.into()
    }
}

impl FromStr for Address {
    type Err = std::net::AddrParseError;

    fn from_str(src: &str) -> core::result::Result<Self, Self::Err> {
        src.parse::<std::net::Ipv4Addr>().map(Address::from)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(f, "{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const VER_IHL:  usize = 0;
    pub(crate) const DSCP_ECN: usize = 1;
    pub(crate) const LENGTH:   Field = 2..4;
    pub(crate) const IDENT:    Field = 4..6;
    pub(crate) const FLG_OFF:  Field = 6..8;
    pub(crate) const TTL:      usize = 8;
    pub(crate) const PROTOCOL: usize = 9;
    pub(crate) const CHECKSUM: Field = 10..12;
    pub(crate) const SRC_ADDR: Field = 12..16;
    pub(crate) const DST_ADDR: Field = 16..20;
}

const FLAG_DONT_FRAG: u16 = 0x4000;
const FLAG_MORE_FRAGS: u16 = 0x2000;
const FRAG_OFFSET_MASK: u16 = 0x1fff;

/// The header of an IPv4 datagram without options.
///
/// All fields are kept as they were received so that a forwarding node can re-emit the header
/// with only the time-to-live and checksum changed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Header {
    /// The type-of-service octet, DSCP and ECN together.
    pub tos: u8,
    /// Length of header and payload, in octets.
    pub total_len: u16,
    /// Identification of the datagram.
    pub ident: u16,
    /// The don't-fragment flag.
    pub dont_frag: bool,
    /// Remaining hops until the datagram is discarded.
    pub ttl: u8,
    /// The encapsulated protocol.
    pub protocol: Protocol,
    /// The header checksum as stored, see `compute_checksum`.
    pub checksum: u16,
    /// The source address.
    pub src_addr: Address,
    /// The destination address.
    pub dst_addr: Address,
}

impl Header {
    /// The length of every header, we never emit options.
    pub const LEN: usize = field::DST_ADDR.end;

    /// The time-to-live of newly originated datagrams.
    pub const DEFAULT_TTL: u8 = 64;

    /// A header for a new datagram without payload.
    ///
    /// The checksum is left at zero, call `compute_checksum` once all fields are final.
    pub fn new(src_addr: Address, dst_addr: Address, protocol: Protocol) -> Self {
        Header {
            tos: 0,
            total_len: Self::LEN as u16,
            ident: 0,
            dont_frag: true,
            ttl: Self::DEFAULT_TTL,
            protocol,
            checksum: 0,
            src_addr,
            dst_addr,
        }
    }

    /// The number of payload octets announced by the header.
    pub fn payload_len(&self) -> usize {
        usize::from(self.total_len).saturating_sub(Self::LEN)
    }

    /// Recompute the checksum over the current field values.
    pub fn compute_checksum(&mut self) {
        self.checksum = 0;
        let mut buffer = [0; Self::LEN];
        self.emit(&mut buffer);
        self.checksum = !checksum::data(&buffer);
    }
}

impl Wire for Header {
    fn parse(buffer: &[u8]) -> Result<Header> {
        if buffer.len() < Self::LEN {
            return Err(Error::Truncated);
        }

        let version = buffer[field::VER_IHL] >> 4;
        let header_len = usize::from(buffer[field::VER_IHL] & 0x0f) * 4;
        let total_len = NetworkEndian::read_u16(&buffer[field::LENGTH]);

        if version != 4 { return Err(Error::Malformed) }
        if header_len < Self::LEN { return Err(Error::Malformed) }
        // Options are not supported.
        if header_len > Self::LEN { return Err(Error::Unsupported) }
        if usize::from(total_len) < header_len { return Err(Error::Malformed) }
        if checksum::data(&buffer[..Self::LEN]) != !0 { return Err(Error::WrongChecksum) }

        let flg_off = NetworkEndian::read_u16(&buffer[field::FLG_OFF]);
        if flg_off & FLAG_MORE_FRAGS != 0 || flg_off & FRAG_OFFSET_MASK != 0 {
            return Err(Error::Unsupported);
        }

        Ok(Header {
            tos: buffer[field::DSCP_ECN],
            total_len,
            ident: NetworkEndian::read_u16(&buffer[field::IDENT]),
            dont_frag: flg_off & FLAG_DONT_FRAG != 0,
            ttl: buffer[field::TTL],
            protocol: buffer[field::PROTOCOL].into(),
            checksum: NetworkEndian::read_u16(&buffer[field::CHECKSUM]),
            src_addr: Address::from_bytes(&buffer[field::SRC_ADDR]),
            dst_addr: Address::from_bytes(&buffer[field::DST_ADDR]),
        })
    }

    fn buffer_len(&self) -> usize {
        Self::LEN
    }

    fn emit(&self, buffer: &mut [u8]) {
        buffer[field::VER_IHL] = 0x40 | (Self::LEN / 4) as u8;
        buffer[field::DSCP_ECN] = self.tos;
        NetworkEndian::write_u16(&mut buffer[field::LENGTH], self.total_len);
        NetworkEndian::write_u16(&mut buffer[field::IDENT], self.ident);
        let flg_off = if self.dont_frag { FLAG_DONT_FRAG } else { 0 };
        NetworkEndian::write_u16(&mut buffer[field::FLG_OFF], flg_off);
        buffer[field::TTL] = self.ttl;
        buffer[field::PROTOCOL] = self.protocol.into();
        NetworkEndian::write_u16(&mut buffer[field::CHECKSUM], self.checksum);
        buffer[field::SRC_ADDR].copy_from_slice(self.src_addr.as_bytes());
        buffer[field::DST_ADDR].copy_from_slice(self.dst_addr.as_bytes());
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "IPv4 src={} dst={} proto={} ttl={} tlen={}",
               self.src_addr, self.dst_addr, self.protocol, self.ttl, self.total_len)
    }
}

/// An IPv4 datagram: the header and the payload octets it announces.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Datagram {
    /// The network layer header.
    pub header: Header,
    /// The serialized upper layer packet.
    pub payload: Vec<u8>,
}

impl Datagram {
    /// Set the total length from the payload and recompute the header checksum.
    pub fn compute_checksum(&mut self) {
        self.header.total_len = (Header::LEN + self.payload.len()) as u16;
        self.header.compute_checksum();
    }
}

impl Wire for Datagram {
    /// Parse a datagram, ignoring any link layer padding behind the announced total length.
    fn parse(buffer: &[u8]) -> Result<Datagram> {
        let header = Header::parse(buffer)?;
        let end = usize::from(header.total_len);
        if buffer.len() < end {
            return Err(Error::Truncated);
        }

        Ok(Datagram {
            header,
            payload: buffer[Header::LEN..end].to_vec(),
        })
    }

    fn buffer_len(&self) -> usize {
        Header::LEN + self.payload.len()
    }

    fn emit(&self, buffer: &mut [u8]) {
        self.header.emit(buffer);
        buffer[Header::LEN..][..self.payload.len()].copy_from_slice(&self.payload);
    }
}

impl fmt::Display for Datagram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.header)
    }
}
