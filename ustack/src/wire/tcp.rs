use core::{fmt, ops};
use byteorder::{ByteOrder, NetworkEndian};

use super::{checksum, Error, IpProtocol, Ipv4Address, Result, Wire};

/// A TCP sequence number.
///
/// A sequence number is an absolute stream index offset by the initial sequence number of the
/// connection, modulo 2<sup>32</sup>. `wrap` and `unwrap` translate between the two.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct SeqNumber(pub u32);

impl SeqNumber {
    /// Translate an absolute index into the sequence number space starting at `zero_point`.
    pub fn wrap(absolute: u64, zero_point: SeqNumber) -> SeqNumber {
        // Truncation is the reduction modulo 2^32.
        SeqNumber(zero_point.0.wrapping_add(absolute as u32))
    }

    /// Find the absolute index nearest to `checkpoint` that wraps to this sequence number.
    ///
    /// Only the 2<sup>32</sup> region of the checkpoint and its two neighbours are candidates.
    /// Among two equidistant candidates the lower one is chosen.
    ///
    /// ```
    /// # use ustack::wire::TcpSeqNumber;
    /// let zero = TcpSeqNumber(0);
    /// assert_eq!(TcpSeqNumber(1).unwrap(zero, u64::from(u32::MAX)), (1 << 32) + 1);
    /// ```
    pub fn unwrap(self, zero_point: SeqNumber, checkpoint: u64) -> u64 {
        const SPAN: u64 = 1 << 32;
        let offset = u64::from(self.0.wrapping_sub(zero_point.0));
        let candidate = (checkpoint & !(SPAN - 1)) | offset;

        if candidate > checkpoint {
            match candidate.checked_sub(SPAN) {
                Some(lower) if checkpoint - lower <= candidate - checkpoint => lower,
                _ => candidate,
            }
        } else {
            match candidate.checked_add(SPAN) {
                Some(upper) if upper - checkpoint < checkpoint - candidate => upper,
                _ => candidate,
            }
        }
    }
}

impl fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ops::Add<u32> for SeqNumber {
    type Output = SeqNumber;

    fn add(self, rhs: u32) -> SeqNumber {
        SeqNumber(self.0.wrapping_add(rhs))
    }
}

impl ops::AddAssign<u32> for SeqNumber {
    fn add_assign(&mut self, rhs: u32) {
        *self = *self + rhs;
    }
}

/// A set of tcp flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags(pub u16);

mod field {
    use crate::wire::field::Field;

    pub(crate) const SRC_PORT: Field = 0..2;
    pub(crate) const DST_PORT: Field = 2..4;
    pub(crate) const SEQ_NUM:  Field = 4..8;
    pub(crate) const ACK_NUM:  Field = 8..12;
    pub(crate) const FLAGS:    Field = 12..14;
    pub(crate) const WIN_SIZE: Field = 14..16;
    pub(crate) const CHECKSUM: Field = 16..18;
    pub(crate) const URGENT:   Field = 18..20;

    pub(crate) const FLG_FIN: u16 = 0x001;
    pub(crate) const FLG_SYN: u16 = 0x002;
    pub(crate) const FLG_RST: u16 = 0x004;
    pub(crate) const FLG_PSH: u16 = 0x008;
    pub(crate) const FLG_ACK: u16 = 0x010;
}

impl Flags {
    const MASK: u16 = 0x01ff;

    /// Return the FIN flag.
    #[inline]
    pub fn fin(&self) -> bool {
        self.0 & field::FLG_FIN != 0
    }

    /// Return the SYN flag.
    #[inline]
    pub fn syn(&self) -> bool {
        self.0 & field::FLG_SYN != 0
    }

    /// Return the RST flag.
    #[inline]
    pub fn rst(&self) -> bool {
        self.0 & field::FLG_RST != 0
    }

    /// Return the PSH flag.
    #[inline]
    pub fn psh(&self) -> bool {
        self.0 & field::FLG_PSH != 0
    }

    /// Return the ACK flag.
    #[inline]
    pub fn ack(&self) -> bool {
        self.0 & field::FLG_ACK != 0
    }

    /// Set the FIN flag.
    #[inline]
    pub fn set_fin(&mut self, value: bool) {
        self.set(field::FLG_FIN, value)
    }

    /// Set the SYN flag.
    #[inline]
    pub fn set_syn(&mut self, value: bool) {
        self.set(field::FLG_SYN, value)
    }

    /// Set the RST flag.
    #[inline]
    pub fn set_rst(&mut self, value: bool) {
        self.set(field::FLG_RST, value)
    }

    /// Set the PSH flag.
    #[inline]
    pub fn set_psh(&mut self, value: bool) {
        self.set(field::FLG_PSH, value)
    }

    /// Set the ACK flag.
    #[inline]
    pub fn set_ack(&mut self, value: bool) {
        self.set(field::FLG_ACK, value)
    }

    fn set(&mut self, flag: u16, value: bool) {
        let without = self.0 & !flag;
        self.0 = without | if value { flag } else { 0 };
    }

    /// Return the length of the control flags, in terms of sequence space.
    pub fn sequence_len(self) -> usize {
        usize::from(self.syn()) + usize::from(self.fin())
    }
}

/// How the checksum of a segment is treated.
///
/// The checksum covers a pseudo header of the network layer consisting of the source and
/// destination address, which the segment itself does not carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Checksum {
    /// Fill the checksum when emitting and verify it when parsing.
    Manual {
        /// Source address of the enclosing datagram.
        src_addr: Ipv4Address,
        /// Destination address of the enclosing datagram.
        dst_addr: Ipv4Address,
    },

    /// Never inspect the checksum, and emit it as zero.
    ///
    /// This assumes that some layer below has already performed the necessary checks.
    Ignored,
}

/// A high-level representation of a TCP segment without options.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Repr {
    /// The port of the sending endpoint.
    pub src_port: u16,
    /// The port of the receiving endpoint.
    pub dst_port: u16,
    /// Control flags. The ACK flag is managed through `ack_number`.
    pub flags: Flags,
    /// Sequence number of the first octet, or of the SYN.
    pub seq_number: SeqNumber,
    /// The acknowledgement number, if the ACK flag is set.
    pub ack_number: Option<SeqNumber>,
    /// The advertised receive window.
    pub window_len: u16,
    /// The segment payload.
    pub payload: Vec<u8>,
}

impl Repr {
    /// The length of every emitted header.
    pub const HEADER_LEN: usize = field::URGENT.end;

    /// The number of sequence numbers this segment occupies.
    pub fn sequence_len(&self) -> usize {
        self.payload.len() + self.flags.sequence_len()
    }

    /// Parse a segment, verifying the checksum if requested.
    ///
    /// Options are skipped over and not interpreted. Everything behind the header is payload.
    pub fn parse_with(buffer: &[u8], checksum: Checksum) -> Result<Repr> {
        if buffer.len() < field::URGENT.end {
            return Err(Error::Truncated);
        }

        let header_len = usize::from(buffer[field::FLAGS.start] >> 4) * 4;
        if header_len < field::URGENT.end { return Err(Error::Malformed) }
        if buffer.len() < header_len { return Err(Error::Truncated) }

        let src_port = NetworkEndian::read_u16(&buffer[field::SRC_PORT]);
        let dst_port = NetworkEndian::read_u16(&buffer[field::DST_PORT]);
        // Source and destination ports must be present.
        if src_port == 0 || dst_port == 0 { return Err(Error::Malformed) }

        if let Checksum::Manual { src_addr, dst_addr } = checksum {
            let length = u16::try_from(buffer.len()).map_err(|_| Error::Malformed)?;
            let sum = checksum::combine(&[
                checksum::pseudo_header(src_addr, dst_addr, IpProtocol::Tcp, length),
                checksum::data(buffer),
            ]);
            if sum != !0 { return Err(Error::WrongChecksum) }
        }

        let mut flags = Flags(NetworkEndian::read_u16(&buffer[field::FLAGS]) & Flags::MASK);
        let ack_number = if flags.ack() {
            Some(SeqNumber(NetworkEndian::read_u32(&buffer[field::ACK_NUM])))
        } else {
            None
        };
        flags.set_ack(false);

        Ok(Repr {
            src_port,
            dst_port,
            flags,
            seq_number: SeqNumber(NetworkEndian::read_u32(&buffer[field::SEQ_NUM])),
            ack_number,
            window_len: NetworkEndian::read_u16(&buffer[field::WIN_SIZE]),
            payload: buffer[header_len..].to_vec(),
        })
    }

    /// Emit the segment, filling the checksum if requested.
    pub fn emit_with(&self, buffer: &mut [u8], checksum: Checksum) {
        let mut flags = self.flags;
        flags.set_ack(self.ack_number.is_some());
        let ack_number = self.ack_number.unwrap_or_default();

        NetworkEndian::write_u16(&mut buffer[field::SRC_PORT], self.src_port);
        NetworkEndian::write_u16(&mut buffer[field::DST_PORT], self.dst_port);
        NetworkEndian::write_u32(&mut buffer[field::SEQ_NUM], self.seq_number.0);
        NetworkEndian::write_u32(&mut buffer[field::ACK_NUM], ack_number.0);
        let header_len = (Self::HEADER_LEN as u16 / 4) << 12;
        NetworkEndian::write_u16(&mut buffer[field::FLAGS], header_len | flags.0);
        NetworkEndian::write_u16(&mut buffer[field::WIN_SIZE], self.window_len);
        NetworkEndian::write_u16(&mut buffer[field::CHECKSUM], 0);
        NetworkEndian::write_u16(&mut buffer[field::URGENT], 0);
        let end = Self::HEADER_LEN + self.payload.len();
        buffer[Self::HEADER_LEN..end].copy_from_slice(&self.payload);

        if let Checksum::Manual { src_addr, dst_addr } = checksum {
            let sum = !checksum::combine(&[
                checksum::pseudo_header(src_addr, dst_addr, IpProtocol::Tcp, end as u16),
                checksum::data(&buffer[..end]),
            ]);
            NetworkEndian::write_u16(&mut buffer[field::CHECKSUM], sum);
        }
    }

    /// Emit the segment into a new buffer, filling the checksum if requested.
    pub fn serialize_with(&self, checksum: Checksum) -> Vec<u8> {
        let mut buffer = vec![0; self.buffer_len()];
        self.emit_with(&mut buffer, checksum);
        buffer
    }
}

impl Wire for Repr {
    /// Parse without looking at the checksum.
    fn parse(buffer: &[u8]) -> Result<Repr> {
        Repr::parse_with(buffer, Checksum::Ignored)
    }

    fn buffer_len(&self) -> usize {
        Self::HEADER_LEN + self.payload.len()
    }

    fn emit(&self, buffer: &mut [u8]) {
        self.emit_with(buffer, Checksum::Ignored)
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TCP src={} dst={}", self.src_port, self.dst_port)?;
        if self.flags.syn() { write!(f, " syn")? }
        if self.flags.fin() { write!(f, " fin")? }
        if self.flags.rst() { write!(f, " rst")? }
        if self.flags.psh() { write!(f, " psh")? }
        write!(f, " seq={}", self.seq_number)?;
        if let Some(ack_number) = self.ack_number {
            write!(f, " ack={}", ack_number)?;
        }
        write!(f, " win={} len={}", self.window_len, self.payload.len())
    }
}
