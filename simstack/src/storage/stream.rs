//! A flow-controlled, in-memory byte stream.
//!
//! The stream has exactly two roles. A producer writes into it through a [`Writer`] and a consumer
//! reads out of it through a [`Reader`]. Both are views onto the same [`ByteStream`] and not
//! separate objects, so the producer and consumer can never disagree about its state. Since they
//! are only obtainable by a mutable borrow of the stream, at most one of them is active at any
//! time.
//!
//! ## Example
//!
//! ```
//! # use simstack::storage::ByteStream;
//! let mut stream = ByteStream::new(4);
//!
//! // Excess bytes are truncated, capacity is backpressure and not an error.
//! stream.writer().push(b"hello");
//! assert_eq!(stream.bytes_pushed(), 4);
//!
//! assert_eq!(stream.reader().peek(), b"hell");
//! stream.reader().pop(2);
//! assert_eq!(stream.available_capacity(), 2);
//! ```
//!
//! [`ByteStream`]: struct.ByteStream.html
//! [`Writer`]: struct.Writer.html
//! [`Reader`]: struct.Reader.html
use core::ops;

/// A bounded FIFO buffer of bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteStream {
    capacity: u64,
    /// Buffered bytes start at `head`, everything before is already popped.
    buffer: Vec<u8>,
    head: usize,
    pushed: u64,
    popped: u64,
    closed: bool,
    error: bool,
}

/// The producer view of a `ByteStream`.
#[derive(Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct Writer {
    stream: ByteStream,
}

/// The consumer view of a `ByteStream`.
#[derive(Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct Reader {
    stream: ByteStream,
}

impl ByteStream {
    /// Create an empty stream that buffers at most `capacity` bytes.
    pub fn new(capacity: u64) -> Self {
        ByteStream {
            capacity,
            buffer: Vec::new(),
            head: 0,
            pushed: 0,
            popped: 0,
            closed: false,
            error: false,
        }
    }

    /// Borrow the producer view.
    pub fn writer(&mut self) -> &mut Writer {
        // SAFETY: this is safe due to repr(transparent)
        unsafe { &mut *(self as *mut ByteStream as *mut Writer) }
    }

    /// Borrow the consumer view.
    pub fn reader(&mut self) -> &mut Reader {
        // SAFETY: this is safe due to repr(transparent)
        unsafe { &mut *(self as *mut ByteStream as *mut Reader) }
    }

    /// The maximum number of bytes that can be buffered.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of bytes that can be pushed right now.
    pub fn available_capacity(&self) -> u64 {
        self.capacity - self.bytes_buffered()
    }

    /// Number of bytes currently buffered, pushed but not yet popped.
    pub fn bytes_buffered(&self) -> u64 {
        self.pushed - self.popped
    }

    /// Total number of bytes ever accepted.
    pub fn bytes_pushed(&self) -> u64 {
        self.pushed
    }

    /// Total number of bytes ever popped.
    pub fn bytes_popped(&self) -> u64 {
        self.popped
    }

    /// If the producer has signalled the end of the stream.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// If the stream has ended and every byte has been consumed.
    pub fn is_finished(&self) -> bool {
        self.closed && self.bytes_buffered() == 0
    }

    /// If the stream suffered an unrecoverable error.
    pub fn has_error(&self) -> bool {
        self.error
    }

    fn buffered(&self) -> &[u8] {
        &self.buffer[self.head..]
    }
}

impl Writer {
    /// Push bytes into the stream.
    ///
    /// Accepts as many bytes as there is capacity for and silently drops the rest. Does nothing
    /// once the stream is closed.
    pub fn push(&mut self, data: &[u8]) {
        let stream = &mut self.stream;
        if stream.closed || data.is_empty() {
            return;
        }

        let accepted = data.len().min(stream.available_capacity() as usize);
        stream.buffer.extend_from_slice(&data[..accepted]);
        stream.pushed += accepted as u64;
    }

    /// Signal that no more bytes will be pushed.
    pub fn close(&mut self) {
        self.stream.closed = true;
    }

    /// Mark the stream as permanently failed.
    pub fn set_error(&mut self) {
        self.stream.error = true;
    }
}

impl Reader {
    /// A view of all currently buffered bytes, without consuming them.
    pub fn peek(&self) -> &[u8] {
        self.stream.buffered()
    }

    /// Remove up to `len` bytes from the front of the stream.
    pub fn pop(&mut self, len: u64) {
        let stream = &mut self.stream;
        let len = len.min(stream.bytes_buffered()) as usize;
        stream.head += len;
        stream.popped += len as u64;

        // Reclaim the consumed prefix once it dominates the allocation.
        if stream.head == stream.buffer.len() {
            stream.buffer.clear();
            stream.head = 0;
        } else if stream.head > stream.buffer.len() / 2 {
            stream.buffer.drain(..stream.head);
            stream.head = 0;
        }
    }

    /// Pop up to `len` bytes and append them to `out`.
    pub fn read_into(&mut self, len: u64, out: &mut Vec<u8>) {
        let len = len.min(self.stream.bytes_buffered()) as usize;
        out.extend_from_slice(&self.peek()[..len]);
        self.pop(len as u64);
    }

    /// Mark the stream as permanently failed.
    pub fn set_error(&mut self) {
        self.stream.error = true;
    }
}

impl ops::Deref for Writer {
    type Target = ByteStream;

    fn deref(&self) -> &ByteStream {
        &self.stream
    }
}

impl ops::Deref for Reader {
    type Target = ByteStream;

    fn deref(&self) -> &ByteStream {
        &self.stream
    }
}
