//! Byte buffers between the wire and the application.
//!
//! A [`ByteStream`] is the bounded pipe an application writes into and reads out of. Its
//! capacity is the only back pressure in the stack: a receiver advertises what is left of it as
//! its window and a sender only segments what has been written into it.
//!
//! The [`Reassembler`] sits in front of an inbound stream and turns possibly overlapping,
//! reordered and duplicated ranges of the stream into the single in-order prefix the stream
//! accepts.
//!
//! [`ByteStream`]: struct.ByteStream.html
//! [`Reassembler`]: struct.Reassembler.html
mod byte_stream;
mod reassembler;

pub use self::byte_stream::{ByteStream, Reader, Writer};
pub use self::reassembler::Reassembler;
