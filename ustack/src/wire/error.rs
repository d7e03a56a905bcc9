/// The error type for parsing of the network stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An incoming packet could not be parsed because it was shorter than assumed.
    ///
    /// The packet may be shorter than the minimum length specified or announce a size longer
    /// than the actual received data.
    #[error("truncated packet")]
    Truncated,

    /// An incoming packet had an incorrect checksum and was dropped.
    #[error("checksum error")]
    WrongChecksum,

    /// An incoming packet could not be recognized and was dropped.
    ///
    /// E.g. an ARP message for a hardware or protocol type other than Ethernet and IPv4.
    #[error("unrecognized packet")]
    Unrecognized,

    /// An incoming packet was recognized but was self-contradictory.
    ///
    /// Examples: an IPv4 header claiming a version other than 4, a total length shorter than its
    /// own header, a TCP data offset pointing into the fixed header.
    #[error("malformed packet")]
    Malformed,

    /// Parsing depends on a feature that is not implemented.
    ///
    /// IPv4 options and fragments fall into this category.
    #[error("unsupported option")]
    Unsupported,
}

/// The result type for parsing.
pub type Result<T> = core::result::Result<T, Error>;
