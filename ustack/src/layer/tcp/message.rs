use crate::wire::TcpSeqNumber;

/// What a sender tells the receiving side of its peer.
///
/// The sequence number identifies the first slot the message occupies, which is the SYN if it
/// is set and the first payload byte otherwise. FIN occupies the slot after the payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SenderMessage {
    /// Sequence number of the first occupied slot.
    pub seqno: TcpSeqNumber,
    /// Start of the stream.
    pub syn: bool,
    /// Stream data.
    pub payload: Vec<u8>,
    /// End of the stream.
    pub fin: bool,
    /// The sending side has failed.
    pub rst: bool,
}

impl SenderMessage {
    /// The number of sequence numbers the message occupies.
    pub fn sequence_length(&self) -> u64 {
        u64::from(self.syn) + self.payload.len() as u64 + u64::from(self.fin)
    }
}

/// What a receiver tells the sending side of its peer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReceiverMessage {
    /// The next sequence number expected, once the SYN was seen.
    pub ackno: Option<TcpSeqNumber>,
    /// The number of bytes the receiver accepts beyond `ackno`.
    pub window_size: u16,
    /// The receiving side has failed.
    pub rst: bool,
}
