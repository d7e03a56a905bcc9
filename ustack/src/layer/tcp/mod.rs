//! The TCP layer abstraction.
//!
//! A connection is made of two independent halves. The [`Sender`] turns the bytes written into
//! its outbound stream into [`SenderMessage`]s, the [`Receiver`] turns the peer's messages back
//! into an inbound stream and answers with [`ReceiverMessage`]s carrying acknowledgement and
//! window. Neither half knows about ports, addresses or the header layout; combining a sender
//! message with the current receiver message into a segment is left to the caller, see
//! [`wire::TcpRepr`].
//!
//! ## Flow control
//!
//! The receiver advertises the free capacity of its stream as window. The sender never has more
//! sequence numbers in flight than that window, but treats a window of zero as one so that it
//! keeps probing a peer that stopped reading.
//!
//! ## Retransmission
//!
//! There is a single retransmission timer per sender, started with the first outstanding
//! message. When it expires the oldest unacknowledged message is sent again and the timeout is
//! doubled. Acknowledgement of new data reloads the initial timeout and resets the count of
//! consecutive retransmissions. Giving up on the connection is a policy of the caller, see
//! [`Config::max_retransmissions`].
//!
//! There is no congestion control beyond the window of the receiver.
//!
//! [`Sender`]: struct.Sender.html
//! [`Receiver`]: struct.Receiver.html
//! [`SenderMessage`]: struct.SenderMessage.html
//! [`ReceiverMessage`]: struct.ReceiverMessage.html
//! [`wire::TcpRepr`]: ../../wire/struct.TcpRepr.html
//! [`Config::max_retransmissions`]: struct.Config.html#structfield.max_retransmissions
use crate::time::Duration;

mod message;
mod receiver;
mod sender;
mod timer;


pub use self::message::{
    ReceiverMessage,
    SenderMessage};

pub use self::receiver::Receiver;

pub use self::sender::{
    Sender,
    Transmit};

pub use self::timer::RetransmissionTimer;

/// Tunables of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Capacity of the inbound and outbound streams, in bytes.
    pub capacity: u64,
    /// The most payload put into a single message.
    ///
    /// Must be at least one for any data to be sent, a sender treats zero as one.
    pub max_payload_size: usize,
    /// The retransmission timeout before any backoff.
    pub initial_rto: Duration,
    /// The number of consecutive retransmissions after which a caller should abandon the
    /// connection.
    pub max_retransmissions: u64,
}

impl Config {
    /// Default capacity of a stream.
    pub const DEFAULT_CAPACITY: u64 = 64_000;

    /// Default payload limit, well below any Ethernet MTU.
    pub const MAX_PAYLOAD_SIZE: usize = 1000;

    /// Default retransmission timeout.
    pub const INITIAL_RTO: Duration = Duration::from_millis(1000);

    /// Default number of retransmissions before giving up.
    pub const MAX_RETRANSMISSIONS: u64 = 8;
}

impl Default for Config {
    fn default() -> Self {
        Config {
            capacity: Self::DEFAULT_CAPACITY,
            max_payload_size: Self::MAX_PAYLOAD_SIZE,
            initial_rto: Self::INITIAL_RTO,
            max_retransmissions: Self::MAX_RETRANSMISSIONS,
        }
    }
}
