//! A user-space core of the TCP/IP mechanics that sit beneath a socket.
//!
//! ## Table of contents
//!
//! This is also a recommended reading order, each chapter tries to be somewhat self-contained.
//!
//! 1. [Design](#design-and-relevant-core-concepts)
//! 2. [The storage module](storage/index.html)
//!    1. [Byte streams](storage/struct.ByteStream.html)
//!    1. [Reassembly](storage/struct.Reassembler.html)
//! 3. [The wire module](wire/index.html)
//! 4. [The layers](layer/index.html)
//!    1. [Tcp](layer/tcp/index.html)
//!    1. [Arp](layer/arp/index.html)
//!    1. [The eth layer](layer/eth/index.html)
//!    1. [Ip forwarding](layer/ip/index.html)
//! 5. [Network interfaces](nic/index.html)
//!
//! ## Design and relevant core concepts
//!
//! Every component is plain single-threaded state driven by a caller. Nothing here spawns a
//! thread, blocks, or reads a clock. Inbound segments and frames are handed in by the driver,
//! output is produced into caller supplied sinks, and time only advances when the driver calls
//! one of the `tick` methods with the elapsed [`Duration`].
//!
//! Errors of the protocol itself are not Rust errors. A reset or an overrun puts the affected
//! [`ByteStream`] into its error state which the driver inspects, malformed packets are dropped
//! and data outside of the receive window is ignored, just as a kernel stack would do. The
//! `Result` types of this crate are reserved for parsing (see [`wire::Error`]) and for
//! configuration mistakes (see [`layer::Error`]).
//!
//! [`Duration`]: time::Duration
//! [`ByteStream`]: storage::ByteStream
#![warn(missing_docs)]
#![warn(unreachable_pub)]

#[macro_use] mod macros;
pub mod layer;
pub mod nic;
pub mod storage;
pub mod time;
pub mod wire;
