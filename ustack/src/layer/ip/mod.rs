//! The IP layer.
//!
//! A [`Router`] forwards IPv4 datagrams between the [`eth::Interface`]s it owns. It is the only
//! component of the stack that looks at datagrams it does not terminate, hosts unwrap the
//! datagrams received on their interface themselves.
//!
//! ## Forwarding
//!
//! For every received datagram the time-to-live is checked and decremented, with the header
//! checksum recomputed afterwards. The destination is then matched against the [`Routes`] with
//! the longest prefix winning. A route either names the next hop or marks the network as directly
//! attached, in which case the destination itself is the next hop. The interface resolves the
//! hardware address of the next hop on its own.
//!
//! Datagrams that can not be forwarded are dropped silently, there is no ICMP.
//!
//! [`Router`]: struct.Router.html
//! [`Routes`]: struct.Routes.html
//! [`eth::Interface`]: ../eth/struct.Interface.html
mod route;
mod router;
#[cfg(test)]
mod tests;

pub use route::{Route, Routes};
pub use router::Router;
