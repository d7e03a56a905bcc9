use ustack::layer::tcp::{self, Receiver, ReceiverMessage, Sender, SenderMessage};
use ustack::time::Duration;
use ustack::wire::{TcpFlags, TcpRepr, TcpSeqNumber};

/// One endpoint of a connection, both halves together.
///
/// Every outgoing segment carries a message of the sender together with the acknowledgement
/// and window of the receiver. Incoming segments are split the same way.
#[derive(Clone, Debug)]
pub struct Peer {
    sender: Sender,
    receiver: Receiver,
    local_port: u16,
    remote_port: u16,
    segments: u64,
    retransmissions: u64,
}

impl Peer {
    /// Create an endpoint with its initial sequence number.
    pub fn new(isn: TcpSeqNumber, local_port: u16, remote_port: u16, config: &tcp::Config) -> Self {
        Peer {
            sender: Sender::new(isn, config),
            receiver: Receiver::new(config.capacity),
            local_port,
            remote_port,
            segments: 0,
            retransmissions: 0,
        }
    }

    /// Segment what the window allows of the outbound stream.
    pub fn push(&mut self) -> Vec<TcpRepr> {
        let reply = self.receiver.send();
        let (src_port, dst_port) = (self.local_port, self.remote_port);
        let mut segments = Vec::new();
        self.sender.push(|message: &SenderMessage| {
            segments.push(segment(src_port, dst_port, message, &reply));
        });

        self.segments += segments.len() as u64;
        segments
    }

    /// Advance time, returning a retransmission if the timer expired.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<TcpRepr> {
        let reply = self.receiver.send();
        let (src_port, dst_port) = (self.local_port, self.remote_port);
        let mut segments = Vec::new();
        self.sender.tick(elapsed, |message: &SenderMessage| {
            segments.push(segment(src_port, dst_port, message, &reply));
        });

        self.segments += segments.len() as u64;
        self.retransmissions += segments.len() as u64;
        segments
    }

    /// Process a segment of the remote endpoint, returning an acknowledgement if one is due.
    ///
    /// Segments occupying sequence numbers are always acknowledged. So is an empty segment just
    /// before the acknowledged position, a probe of whether the connection is still alive.
    pub fn receive(&mut self, segment: TcpRepr) -> Option<TcpRepr> {
        let flags = segment.flags;
        let reply = ReceiverMessage {
            ackno: segment.ack_number,
            window_size: segment.window_len,
            rst: flags.rst(),
        };
        let message = SenderMessage {
            seqno: segment.seq_number,
            syn: flags.syn(),
            payload: segment.payload,
            fin: flags.fin(),
            rst: flags.rst(),
        };

        let occupies = message.sequence_length() != 0;
        let seqno = message.seqno;
        self.receiver.receive(message);
        self.sender.receive(&reply);

        let ack = self.receiver.send();
        let keep_alive = !occupies && ack.ackno == Some(seqno + 1);
        if !occupies && !keep_alive {
            return None;
        }

        self.segments += 1;
        let empty = self.sender.make_empty_message();
        Some(self::segment(self.local_port, self.remote_port, &empty, &ack))
    }

    /// The sending half.
    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    /// Mutably access the sending half, to write into the outbound stream.
    pub fn sender_mut(&mut self) -> &mut Sender {
        &mut self.sender
    }

    /// The receiving half.
    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Mutably access the receiving half, to read from the inbound stream.
    pub fn receiver_mut(&mut self) -> &mut Receiver {
        &mut self.receiver
    }

    /// Segments sent so far, acknowledgements included.
    pub fn segments(&self) -> u64 {
        self.segments
    }

    /// Segments sent again after a timeout.
    pub fn retransmissions(&self) -> u64 {
        self.retransmissions
    }
}

fn segment(src_port: u16, dst_port: u16, message: &SenderMessage, reply: &ReceiverMessage) -> TcpRepr {
    let mut flags = TcpFlags::default();
    flags.set_syn(message.syn);
    flags.set_fin(message.fin);
    flags.set_rst(message.rst || reply.rst);

    TcpRepr {
        src_port,
        dst_port,
        flags,
        seq_number: message.seqno,
        ack_number: reply.ackno,
        window_len: reply.window_size,
        payload: message.payload.clone(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pair() -> (Peer, Peer) {
        let config = tcp::Config::default();
        let a = Peer::new(TcpSeqNumber(1000), 40000, 5001, &config);
        let b = Peer::new(TcpSeqNumber(u32::MAX - 2), 5001, 40000, &config);
        (a, b)
    }

    #[test]
    fn handshake_and_data() {
        let (mut a, mut b) = pair();
        a.sender_mut().writer().push(b"hello");

        let syn = a.push();
        assert_eq!(syn.len(), 1);
        assert!(syn[0].flags.syn());
        assert_eq!(syn[0].ack_number, None);
        assert_eq!((syn[0].src_port, syn[0].dst_port), (40000, 5001));

        let ack = b.receive(syn[0].clone()).unwrap();
        assert_eq!(ack.ack_number, Some(TcpSeqNumber(1001)));
        assert!(ack.payload.is_empty());
        assert_eq!(a.receive(ack), None);
        assert_eq!(a.sender().sequence_numbers_in_flight(), 0);

        let data = a.push();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].payload, b"hello");
        let ack = b.receive(data[0].clone()).unwrap();
        assert_eq!(ack.ack_number, Some(TcpSeqNumber(1006)));
        assert_eq!(b.receiver().stream().peek(), b"hello");
        assert_eq!(a.segments(), 2);
        assert_eq!(b.segments(), 2);
    }

    #[test]
    fn keep_alive_acknowledged() {
        let (mut a, mut b) = pair();
        let syn = a.push();
        let ack = b.receive(syn[0].clone()).unwrap();
        a.receive(ack);

        let mut probe = a.push().pop().unwrap_or_else(|| {
            let mut probe = syn[0].clone();
            probe.flags.set_syn(false);
            probe
        });
        probe.seq_number = TcpSeqNumber(1000);
        assert!(probe.payload.is_empty());
        assert!(b.receive(probe.clone()).is_some());

        // An empty segment at the acknowledged position needs no answer.
        probe.seq_number = TcpSeqNumber(1001);
        assert_eq!(b.receive(probe), None);
    }

    #[test]
    fn retransmission_counted() {
        let (mut a, _) = pair();
        a.push();
        assert!(a.tick(Duration::from_millis(999)).is_empty());
        let again = a.tick(Duration::from_millis(1));
        assert_eq!(again.len(), 1);
        assert!(again[0].flags.syn());
        assert_eq!(a.retransmissions(), 1);
        assert_eq!(a.sender().consecutive_retransmissions(), 1);
    }

    #[test]
    fn reset_fails_both_halves() {
        let (mut a, mut b) = pair();
        let mut syn = a.push().remove(0);
        b.receive(syn.clone());
        syn.flags.set_syn(false);
        syn.flags.set_rst(true);
        b.receive(syn);
        assert!(b.receiver().stream().has_error());
        assert!(b.sender().stream().has_error());
    }
}
