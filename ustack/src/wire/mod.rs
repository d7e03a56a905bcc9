/*! Low-level packet access and construction.

# An overview over packet representations

The `wire` module deals with the packet *representation* of everything the stack exchanges with
its surroundings. Each supported header has a compact, owned `Repr` that can be created from
parsing a sequence of octets and emitted back into one:

 * [`EthernetFrame`] is an Ethernet II header together with its payload octets.
 * [`ArpRepr`] is an ARP message for IPv4 over Ethernet.
 * [`Ipv4Datagram`] is an IPv4 header (without options) together with its payload octets.
 * [`TcpRepr`] is a TCP header (without options) together with its payload octets.

All of them implement [`Wire`], the codec boundary the layers rely on: `parse` a received buffer
and `serialize` an outgoing representation. `parse` never panics. Any failure is reported as an
[`Error`] and the layers treat every such error alike, the packet is dropped.

[`EthernetFrame`]: struct.EthernetFrame.html
[`ArpRepr`]: struct.ArpRepr.html
[`Ipv4Datagram`]: struct.Ipv4Datagram.html
[`TcpRepr`]: struct.TcpRepr.html
[`Wire`]: trait.Wire.html
[`Error`]: enum.Error.html

# Examples

To emit an IPv4 datagram into an octet buffer, and then parse it back:

```rust
use ustack::wire::*;

let mut datagram = Ipv4Datagram {
    header: Ipv4Header::new(
        Ipv4Address::new(10, 0, 0, 1),
        Ipv4Address::new(10, 0, 0, 2),
        IpProtocol::Tcp),
    payload: b"hello".to_vec(),
};
datagram.compute_checksum();

let buffer = datagram.serialize();
let parsed = Ipv4Datagram::parse(&buffer).expect("well-formed datagram");
assert_eq!(parsed, datagram);
```
*/
// Field layouts and the checksum routine follow `smoltcp` (0-clause BSD),
// Copyright (C) 2016 whitequark@whitequark.org

mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
}

mod arp;
mod error;
mod ethernet;
mod ipv4;
mod tcp;

pub use self::error::{
    Error,
    Result};

pub use self::ethernet::{
    EtherType as EthernetProtocol,
    Address as EthernetAddress,
    Frame as EthernetFrame,
    ParseAddressError as EthernetParseAddressError,
    Repr as EthernetRepr};

pub use self::arp::{
    Operation as ArpOperation,
    Repr as ArpRepr};

pub use self::ipv4::{
    Address as Ipv4Address,
    Datagram as Ipv4Datagram,
    Header as Ipv4Header,
    Protocol as IpProtocol};

pub use self::tcp::{
    Checksum as TcpChecksum,
    Flags as TcpFlags,
    Repr as TcpRepr,
    SeqNumber as TcpSeqNumber};

/// A header representation that can be read from and written to octets.
pub trait Wire: Sized {
    /// Parse a representation from a received buffer.
    ///
    /// Trailing octets beyond the representation are ignored where the format allows it.
    fn parse(buffer: &[u8]) -> Result<Self>;

    /// The exact number of octets `emit` writes.
    fn buffer_len(&self) -> usize;

    /// Emit the representation into a buffer.
    ///
    /// # Panics
    /// This panics if `buffer` is shorter than `buffer_len`.
    fn emit(&self, buffer: &mut [u8]);

    /// Emit the representation into a freshly allocated buffer.
    fn serialize(&self) -> Vec<u8> {
        let mut buffer = vec![0; self.buffer_len()];
        self.emit(&mut buffer);
        buffer
    }
}

pub(crate) mod checksum {
    use byteorder::{ByteOrder, NetworkEndian};

    use super::{IpProtocol, Ipv4Address};

    fn propagate_carries(word: u32) -> u16 {
        let sum = (word >> 16) + (word & 0xffff);
        ((sum >> 16) as u16) + (sum as u16)
    }

    /// Compute an RFC 1071 compliant checksum (without the final complement).
    pub(crate) fn data(mut data: &[u8]) -> u16 {
        let mut accum = 0;

        while data.len() >= 2 {
            accum += NetworkEndian::read_u16(data) as u32;
            data = &data[2..];
        }

        // Add the last remaining odd byte, if any.
        if let Some(&value) = data.first() {
            accum += (value as u32) << 8;
        }

        propagate_carries(accum)
    }

    /// Combine several RFC 1071 compliant checksums.
    pub(crate) fn combine(checksums: &[u16]) -> u16 {
        let mut accum: u32 = 0;
        for &word in checksums {
            accum += word as u32;
        }
        propagate_carries(accum)
    }

    /// Compute the IPv4 pseudo header checksum of an upper layer packet.
    pub(crate) fn pseudo_header(
        src_addr: Ipv4Address,
        dst_addr: Ipv4Address,
        protocol: IpProtocol,
        length: u16,
    ) -> u16 {
        let mut proto_len = [0u8; 4];
        proto_len[1] = protocol.into();
        NetworkEndian::write_u16(&mut proto_len[2..4], length);

        combine(&[
            data(src_addr.as_bytes()),
            data(dst_addr.as_bytes()),
            data(&proto_len[..]),
        ])
    }

}
