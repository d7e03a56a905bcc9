use core::ops;
use std::collections::VecDeque;

/// A bounded, in-order pipe of bytes.
///
/// One side writes, the other reads. Both sides are modelled as borrowed views, [`Writer`] and
/// [`Reader`], so that the owner of a stream decides who may push and who may pop. The counters
/// only ever grow and `bytes_pushed - bytes_popped` never exceeds the capacity.
///
/// ```
/// # use ustack::storage::ByteStream;
/// let mut stream = ByteStream::new(4);
/// assert_eq!(stream.writer().push(b"hello"), 4);
/// assert_eq!(stream.peek(), b"hell");
/// stream.reader().pop(2);
/// assert_eq!(stream.available_capacity(), 2);
/// ```
///
/// [`Writer`]: struct.Writer.html
/// [`Reader`]: struct.Reader.html
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteStream {
    capacity: u64,
    buffer: VecDeque<u8>,
    bytes_pushed: u64,
    bytes_popped: u64,
    closed: bool,
    error: bool,
}

/// The writing role of a byte stream.
#[derive(Debug)]
pub struct Writer<'a>(&'a mut ByteStream);

/// The reading role of a byte stream.
#[derive(Debug)]
pub struct Reader<'a>(&'a mut ByteStream);

impl ByteStream {
    /// Create an empty stream holding at most `capacity` bytes at any time.
    pub fn new(capacity: u64) -> Self {
        ByteStream {
            capacity,
            buffer: VecDeque::new(),
            bytes_pushed: 0,
            bytes_popped: 0,
            closed: false,
            error: false,
        }
    }

    /// Borrow the writing side.
    pub fn writer(&mut self) -> Writer<'_> {
        Writer(self)
    }

    /// Borrow the reading side.
    pub fn reader(&mut self) -> Reader<'_> {
        Reader(self)
    }

    /// Whether the writer has finished the stream.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the stream is closed and every byte has been read.
    pub fn is_finished(&self) -> bool {
        self.closed && self.buffer.is_empty()
    }

    /// Whether either side signalled an error.
    pub fn has_error(&self) -> bool {
        self.error
    }

    /// The total number of bytes accepted from the writer.
    pub fn bytes_pushed(&self) -> u64 {
        self.bytes_pushed
    }

    /// The total number of bytes removed by the reader.
    pub fn bytes_popped(&self) -> u64 {
        self.bytes_popped
    }

    /// The number of bytes written but not yet read.
    pub fn bytes_buffered(&self) -> u64 {
        self.bytes_pushed - self.bytes_popped
    }

    /// The number of bytes the writer may still push.
    pub fn available_capacity(&self) -> u64 {
        self.capacity - self.bytes_buffered()
    }

    /// The maximum number of buffered bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// A prefix of the buffered bytes.
    ///
    /// The slice is empty only if nothing is buffered. It need not hold all buffered bytes, pop
    /// what was used and peek again for the remainder.
    pub fn peek(&self) -> &[u8] {
        let (front, back) = self.buffer.as_slices();
        if front.is_empty() { back } else { front }
    }
}

impl Writer<'_> {
    /// Append as much of `data` as fits, returning the number of accepted bytes.
    ///
    /// Nothing is accepted once the stream is closed or has an error.
    pub fn push(&mut self, data: &[u8]) -> usize {
        if self.0.closed || self.0.error {
            return 0;
        }

        let available = usize::try_from(self.0.available_capacity()).unwrap_or(usize::MAX);
        let accepted = &data[..data.len().min(available)];
        self.0.buffer.extend(accepted);
        self.0.bytes_pushed += accepted.len() as u64;
        accepted.len()
    }

    /// Signal that no more bytes will be written.
    pub fn close(&mut self) {
        self.0.closed = true;
    }

    /// Put the stream into the error state.
    pub fn set_error(&mut self) {
        self.0.error = true;
    }
}

impl Reader<'_> {
    /// Remove `len` bytes from the front.
    ///
    /// Popping more than is buffered is a usage error of the reader: the stream enters its error
    /// state and nothing is removed.
    pub fn pop(&mut self, len: u64) {
        if len > self.0.bytes_buffered() {
            self.0.error = true;
            return;
        }

        // Bounded by the buffer length, which is a usize.
        self.0.buffer.drain(..len as usize);
        self.0.bytes_popped += len;
    }

    /// Move every buffered byte into `out`, returning how many were read.
    pub fn read_to_end(&mut self, out: &mut Vec<u8>) -> usize {
        let len = self.0.buffer.len();
        out.extend(self.0.buffer.drain(..));
        self.0.bytes_popped += len as u64;
        len
    }

    /// Put the stream into the error state.
    pub fn set_error(&mut self) {
        self.0.error = true;
    }
}

impl ops::Deref for Writer<'_> {
    type Target = ByteStream;

    fn deref(&self) -> &ByteStream {
        self.0
    }
}

impl ops::Deref for Reader<'_> {
    type Target = ByteStream;

    fn deref(&self) -> &ByteStream {
        self.0
    }
}
