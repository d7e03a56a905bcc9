//! The ethernet layer.
//!
//! This is tasked with putting IPv4 datagrams into ethernet frames addressed to the next hop,
//! and with taking them out of frames received for us. Resolving the hardware address of a next
//! hop is done with ARP, whose state lives in the [`arp`] layer while the messages are sent and
//! answered here.
//!
//! [`arp`]: ../arp/index.html
mod interface;
#[cfg(test)]
mod tests;

pub use interface::Interface;
