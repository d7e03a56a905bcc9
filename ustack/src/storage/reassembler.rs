use std::collections::BTreeMap;

use super::{ByteStream, Reader};

/// Reorders ranges of a stream into the in-order stream itself.
///
/// Ranges are identified by the absolute index of their first byte. They may arrive in any
/// order, overlap each other, or repeat. Bytes that continue the stream are pushed into the
/// output right away. Everything else within the output's remaining capacity is kept aside
/// until the gap before it is filled, anything beyond the capacity is discarded.
///
/// ```
/// # use ustack::storage::Reassembler;
/// let mut reassembler = Reassembler::new(64);
/// reassembler.insert(2, b"cd", false);
/// reassembler.insert(0, b"ab", false);
/// reassembler.insert(4, b"", true);
/// assert_eq!(reassembler.stream().peek(), b"abcd");
/// assert!(reassembler.stream().is_closed());
/// ```
#[derive(Clone, Debug)]
pub struct Reassembler {
    output: ByteStream,
    /// Ranges beyond the write position, never overlapping.
    pending: BTreeMap<u64, Vec<u8>>,
    bytes_pending: u64,
    end_index: Option<u64>,
}

impl Reassembler {
    /// Create a reassembler in front of a new stream of the given capacity.
    pub fn new(capacity: u64) -> Self {
        Reassembler::with_stream(ByteStream::new(capacity))
    }

    /// Create a reassembler writing into an existing stream.
    pub fn with_stream(output: ByteStream) -> Self {
        Reassembler {
            output,
            pending: BTreeMap::new(),
            bytes_pending: 0,
            end_index: None,
        }
    }

    /// Insert a range of the stream starting at the absolute index `first_index`.
    ///
    /// When `is_last` is set, the range ends the stream. The end is only remembered if the range
    /// was not cut short by the capacity, and the stream is closed once every byte before it was
    /// pushed.
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last: bool) {
        if is_last && data.is_empty() {
            self.end_index = Some(first_index);
        } else {
            self.insert_range(first_index, data, is_last);
        }

        self.flush();

        if self.end_index == Some(self.output.bytes_pushed()) {
            self.output.writer().close();
        }
    }

    fn insert_range(&mut self, first_index: u64, data: &[u8], is_last: bool) {
        let window_start = self.output.bytes_pushed();
        let window_end = window_start + self.output.available_capacity();
        // Saturates past any window, so such a range is clipped and never ends the stream.
        let last_index = first_index.saturating_add(data.len() as u64);

        if is_last && last_index <= window_end {
            self.end_index = Some(last_index);
        }

        let start = first_index.max(window_start);
        let end = last_index.min(window_end);
        if start >= end {
            return;
        }

        let data = &data[(start - first_index) as usize..(end - first_index) as usize];

        self.split(start);
        self.split(end);
        let covered: Vec<u64> = self.pending.range(start..end).map(|(&key, _)| key).collect();
        for key in covered {
            if let Some(old) = self.pending.remove(&key) {
                self.bytes_pending -= old.len() as u64;
            }
        }

        self.bytes_pending += data.len() as u64;
        self.pending.insert(start, data.to_vec());
    }

    /// Ensure no pending range crosses `at`.
    fn split(&mut self, at: u64) {
        let (&key, range) = match self.pending.range_mut(..at).next_back() {
            Some(entry) => entry,
            None => return,
        };

        let offset = at - key;
        if offset >= range.len() as u64 {
            return;
        }

        let tail = range.split_off(offset as usize);
        self.pending.insert(at, tail);
    }

    fn flush(&mut self) {
        while let Some(entry) = self.pending.first_entry() {
            if *entry.key() != self.output.bytes_pushed() {
                break;
            }

            let data = entry.remove();
            self.bytes_pending -= data.len() as u64;
            // Pending ranges always fit into the window they were accepted in.
            self.output.writer().push(&data);
        }
    }

    /// The number of bytes kept aside, waiting for the gap before them.
    pub fn bytes_pending(&self) -> u64 {
        self.bytes_pending
    }

    /// The index after the last byte of the stream, once it is known.
    pub fn end_index(&self) -> Option<u64> {
        self.end_index
    }

    /// The output stream.
    pub fn stream(&self) -> &ByteStream {
        &self.output
    }

    /// Read from the output stream.
    pub fn reader(&mut self) -> Reader<'_> {
        self.output.reader()
    }

    /// Put the output stream into the error state.
    pub fn set_error(&mut self) {
        self.output.writer().set_error();
    }
}
