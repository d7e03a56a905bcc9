//! The process logic of protocol layers.
//!
//! ## Layering
//!
//! Each protocol layer is split into two parts; the packet representation contained in `wire`
//! and the processing part in this module. Every layer keeps the local state of its protocol in
//! plain structures that are driven from the outside: inbound data is handed to them, outbound
//! data is pulled out of them or pushed into a sink the caller provides.
//!
//! * [`tcp`] holds both halves of a connection, the receiver that reassembles and acknowledges
//!   and the sender that segments, retransmits and respects the peer's window.
//! * [`arp`] is the neighbor cache that maps IPv4 to Ethernet addresses.
//! * [`eth`] is a network interface, turning datagrams into frames and back.
//! * [`ip`] is a router forwarding datagrams between interfaces.
//!
//! ## Errors
//!
//! Protocol errors are not reported through `Result`. A peer resetting the connection marks the
//! stream, malformed packets are dropped. The [`Error`] of this module is reserved for misuse of
//! the configuration interfaces.
//!
//! [`tcp`]: tcp/index.html
//! [`arp`]: arp/index.html
//! [`eth`]: eth/index.html
//! [`ip`]: ip/index.html
//! [`Error`]: enum.Error.html

pub mod arp;
pub mod eth;
pub mod ip;
pub mod tcp;

/// The result type of layer configuration.
pub type Result<T> = core::result::Result<T, Error>;

/// An error in configuring a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// The operation was not permitted.
    ///
    /// Returned for requests that could never succeed, such as a route with a prefix longer than
    /// the address.
    #[error("illegal operation")]
    Illegal,
}
