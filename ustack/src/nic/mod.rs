//! Encapsulates the link an interface sends its frames on.
//!
//! The stack never owns a device. An [`Interface`] is handed a [`Port`] and gives every outgoing
//! frame to it, receiving is the business of whoever drives the interface. This keeps the core
//! free of I/O: the port may be a real device, a simulated link or just the [`Queue`] of this
//! module which collects frames for inspection.
//!
//! [`Interface`]: ../layer/eth/struct.Interface.html
//! [`Port`]: trait.Port.html
//! [`Queue`]: struct.Queue.html
mod queue;

use crate::wire::EthernetFrame;

pub use self::queue::Queue;

/// A sink for outgoing Ethernet frames.
pub trait Port {
    /// Put a frame on the link.
    ///
    /// Delivery is best effort, a port may drop frames.
    fn transmit(&mut self, frame: EthernetFrame);
}

impl<P: Port + ?Sized> Port for &'_ mut P {
    fn transmit(&mut self, frame: EthernetFrame) {
        (**self).transmit(frame)
    }
}
