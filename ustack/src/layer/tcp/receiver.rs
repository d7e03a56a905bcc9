use tracing::debug;

use crate::storage::{ByteStream, Reader, Reassembler};
use crate::wire::TcpSeqNumber;
use super::{ReceiverMessage, SenderMessage};

/// The receiving half of a connection.
///
/// Translates the sequence numbers of incoming messages into stream indices, reassembles the
/// payload into its stream and reports the acknowledgement and window back to the peer.
#[derive(Clone, Debug)]
pub struct Receiver {
    reassembler: Reassembler,
    /// Sequence number of the SYN, once seen.
    zero_point: Option<TcpSeqNumber>,
}

impl Receiver {
    /// Create a receiver whose stream buffers at most `capacity` bytes.
    pub fn new(capacity: u64) -> Self {
        Receiver {
            reassembler: Reassembler::new(capacity),
            zero_point: None,
        }
    }

    /// Process a message of the peer's sender.
    ///
    /// Anything before the SYN is ignored, as is everything once the stream has failed. A reset
    /// fails the stream.
    pub fn receive(&mut self, message: SenderMessage) {
        if self.reassembler.stream().has_error() {
            return;
        }

        if message.rst {
            debug!("connection reset by peer");
            self.reassembler.set_error();
            return;
        }

        let zero_point = match self.zero_point {
            Some(zero_point) => zero_point,
            None if message.syn => {
                debug!(isn = %message.seqno, "connection opened by peer");
                *self.zero_point.insert(message.seqno)
            },
            None => return,
        };

        // The SYN occupies the absolute sequence number zero, stream index zero comes after.
        let checkpoint = self.reassembler.stream().bytes_pushed() + 1;
        let absolute = message.seqno.unwrap(zero_point, checkpoint);
        let stream_index = match (absolute + u64::from(message.syn)).checked_sub(1) {
            Some(index) => index,
            // Data claiming the slot of the SYN.
            None => return,
        };

        self.reassembler.insert(stream_index, &message.payload, message.fin);
    }

    /// The acknowledgement and window to report to the peer.
    pub fn send(&self) -> ReceiverMessage {
        let stream = self.reassembler.stream();
        let window_size = u16::try_from(stream.available_capacity()).unwrap_or(u16::MAX);
        let ackno = self.zero_point.map(|zero_point| {
            let next = stream.bytes_pushed() + 1 + u64::from(stream.is_closed());
            TcpSeqNumber::wrap(next, zero_point)
        });

        ReceiverMessage {
            ackno,
            window_size,
            rst: stream.has_error(),
        }
    }

    /// The reassembler in front of the inbound stream.
    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    /// The inbound stream.
    pub fn stream(&self) -> &ByteStream {
        self.reassembler.stream()
    }

    /// Read from the inbound stream.
    pub fn reader(&mut self) -> Reader<'_> {
        self.reassembler.reader()
    }
}
