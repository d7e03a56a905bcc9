use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::storage::{ByteStream, Writer};
use crate::time::Duration;
use crate::wire::TcpSeqNumber;
use super::{Config, ReceiverMessage, RetransmissionTimer, SenderMessage};

/// Where a sender puts the messages it wants on the wire.
///
/// Implemented for every closure taking a message, which is the usual way to collect them.
pub trait Transmit {
    /// Send one message to the peer.
    fn transmit(&mut self, message: &SenderMessage);
}

impl<F: FnMut(&SenderMessage)> Transmit for F {
    fn transmit(&mut self, message: &SenderMessage) {
        self(message)
    }
}

/// The sending half of a connection.
///
/// Segments its outbound stream into messages as far as the peer's window allows, keeps every
/// message until it is fully acknowledged and retransmits the oldest one when the retransmission
/// timer expires.
#[derive(Clone, Debug)]
pub struct Sender {
    input: ByteStream,
    isn: TcpSeqNumber,
    initial_rto: Duration,
    max_payload_size: usize,
    timer: RetransmissionTimer,

    syn_sent: bool,
    fin_sent: bool,

    /// Absolute sequence number of the next new slot.
    next_seqno: u64,
    /// Absolute sequence number of the first unacknowledged slot.
    ack_seqno: u64,
    /// The last window advertised by the peer, one before the first acknowledgement.
    window_size: u16,
    outstanding: VecDeque<SenderMessage>,

    in_flight: u64,
    retransmissions: u64,
}

impl Sender {
    /// Create a sender starting at the initial sequence number `isn`.
    pub fn new(isn: TcpSeqNumber, config: &Config) -> Self {
        Sender {
            input: ByteStream::new(config.capacity),
            isn,
            initial_rto: config.initial_rto,
            max_payload_size: config.max_payload_size.max(1),
            timer: RetransmissionTimer::new(config.initial_rto),
            syn_sent: false,
            fin_sent: false,
            next_seqno: 0,
            ack_seqno: 0,
            window_size: 1,
            outstanding: VecDeque::new(),
            in_flight: 0,
            retransmissions: 0,
        }
    }

    /// Segment as much of the outbound stream as the window allows.
    ///
    /// A window of zero is treated as a window of one so that the peer keeps being probed and
    /// eventually reports that space opened up again.
    pub fn push(&mut self, mut transmit: impl Transmit) {
        let window = u64::from(self.window_size.max(1));

        while window > self.in_flight && !self.fin_sent {
            let mut message = self.make_empty_message();
            if !self.syn_sent {
                message.syn = true;
                self.syn_sent = true;
            }

            let remaining = window - self.in_flight;
            let room = usize::try_from(remaining - message.sequence_length())
                .unwrap_or(usize::MAX)
                .min(self.max_payload_size);
            while self.input.bytes_buffered() != 0 && message.payload.len() < room {
                let chunk = self.input.peek();
                let take = chunk.len().min(room - message.payload.len());
                message.payload.extend_from_slice(&chunk[..take]);
                self.input.reader().pop(take as u64);
            }

            if remaining > message.sequence_length() && self.input.is_finished() {
                message.fin = true;
                self.fin_sent = true;
            }

            if message.sequence_length() == 0 {
                break;
            }

            transmit.transmit(&message);
            if !self.timer.is_running() {
                self.timer.start();
            }

            self.next_seqno += message.sequence_length();
            self.in_flight += message.sequence_length();
            self.outstanding.push_back(message);
        }
    }

    /// A message occupying no sequence numbers, for acknowledgements and resets.
    pub fn make_empty_message(&self) -> SenderMessage {
        SenderMessage {
            seqno: TcpSeqNumber::wrap(self.next_seqno, self.isn),
            rst: self.input.has_error(),
            ..SenderMessage::default()
        }
    }

    /// Process an acknowledgement and window update of the peer.
    pub fn receive(&mut self, message: &ReceiverMessage) {
        if self.input.has_error() {
            return;
        }

        if message.rst {
            debug!("connection reset by peer");
            self.input.writer().set_error();
            return;
        }

        self.window_size = message.window_size;
        let ackno = match message.ackno {
            Some(ackno) => ackno.unwrap(self.isn, self.next_seqno),
            None => return,
        };

        if ackno > self.next_seqno {
            trace!(ackno, next = self.next_seqno, "ignoring acknowledgement of unsent data");
            return;
        }

        let mut progress = false;
        while let Some(oldest) = self.outstanding.front() {
            let end = self.ack_seqno + oldest.sequence_length();
            if end > ackno {
                break;
            }

            self.ack_seqno = end;
            self.in_flight -= oldest.sequence_length();
            self.outstanding.pop_front();
            progress = true;
        }

        if progress {
            self.retransmissions = 0;
            self.timer.reload(self.initial_rto);
            if self.outstanding.is_empty() {
                self.timer.stop();
            } else {
                self.timer.start();
            }
        }
    }

    /// Advance time, retransmitting the oldest outstanding message on expiry.
    ///
    /// The timeout only backs off while the peer's window is open. A closed window is not a sign
    /// of congestion and is probed at the initial rate.
    pub fn tick(&mut self, elapsed: Duration, mut transmit: impl Transmit) {
        if !self.timer.tick(elapsed).is_expired() {
            return;
        }

        let oldest = match self.outstanding.front() {
            Some(oldest) => oldest,
            None => return,
        };

        trace!(seqno = %oldest.seqno, rto = ?self.timer.rto(), "retransmitting");
        transmit.transmit(oldest);
        if self.window_size != 0 {
            self.retransmissions += 1;
            self.timer.backoff();
        }

        self.timer.reset();
    }

    /// The number of sequence numbers sent but not yet acknowledged.
    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.in_flight
    }

    /// The number of retransmissions since the peer last made progress.
    pub fn consecutive_retransmissions(&self) -> u64 {
        self.retransmissions
    }

    /// Write into the outbound stream.
    pub fn writer(&mut self) -> Writer<'_> {
        self.input.writer()
    }

    /// The outbound stream.
    pub fn stream(&self) -> &ByteStream {
        &self.input
    }

    /// The retransmission timer.
    pub fn timer(&self) -> &RetransmissionTimer {
        &self.timer
    }
}
