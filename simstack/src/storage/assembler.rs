//! Reassembly of out-of-order byte ranges into a stream.
use std::collections::BTreeMap;

use super::stream::Writer;

/// A buffer (re)assembler.
///
/// Accepts substrings of a stream, each tagged with the index of its first byte, in any order and
/// with arbitrary overlap. It writes the longest contiguous prefix it knows into a [`Writer`] and
/// holds everything else back until the gap in front of it has been filled.
///
/// Only bytes inside the acceptance window are kept. The window starts at the first byte not yet
/// written and spans the currently available capacity of the output stream. Anything past its end
/// is cut off, so the memory held by pending ranges is bounded by the stream capacity.
///
/// Pending ranges are keyed by their start index. Two ranges with the same start are not merged,
/// the longer one wins. Ranges that start at different indices are stored side by side even when
/// they overlap.
///
/// ## Example
///
/// ```
/// # use simstack::storage::{ByteStream, Reassembler};
/// let mut stream = ByteStream::new(64);
/// let mut asm = Reassembler::new();
///
/// asm.insert(3, b"def", true, stream.writer());
/// assert_eq!(asm.bytes_pending(), 3);
///
/// asm.insert(0, b"abc", false, stream.writer());
/// assert_eq!(stream.reader().peek(), b"abcdef");
/// assert!(stream.is_closed());
/// ```
///
/// [`Writer`]: ../stream/struct.Writer.html
#[derive(Clone, Debug, Default)]
pub struct Reassembler {
    /// Index of the next byte the output expects.
    first_unassembled: u64,
    /// Ranges that arrived ahead of `first_unassembled`.
    pending: BTreeMap<u64, Vec<u8>>,
    /// The index one past the last byte of the stream, once known.
    end: Option<u64>,
}

impl Reassembler {
    /// Create an assembler expecting the stream to start at index `0`.
    pub fn new() -> Self {
        Reassembler::default()
    }

    /// Insert a substring of the stream that starts at `first_index`.
    ///
    /// `is_last` marks the substring as the end of the stream. The output is closed as soon as all
    /// bytes up to that end have been written.
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last: bool, output: &mut Writer) {
        let first_unacceptable = self.first_unassembled + output.available_capacity();
        let last_index = first_index + data.len() as u64;

        // Already written, only an empty marker right at the front is let through.
        let stale = if data.is_empty() {
            first_index < self.first_unassembled
        } else {
            last_index <= self.first_unassembled
        };

        if stale || first_index > first_unacceptable {
            net_trace!("reassembler: drop [{}, {}) outside window", first_index, last_index);
            return;
        }

        let (data, is_last) = if last_index > first_unacceptable {
            // The end of stream marker was cut off along with the tail.
            let keep = (first_unacceptable - first_index) as usize;
            (&data[..keep], false)
        } else {
            (data, is_last)
        };

        if is_last {
            self.end = Some(first_index + data.len() as u64);
        }

        let replace = match self.pending.get(&first_index) {
            Some(existing) => data.len() > existing.len(),
            None => true,
        };

        if replace {
            self.pending.insert(first_index, data.to_vec());
        }

        self.drain(output);

        if self.end == Some(self.first_unassembled) {
            output.close();
        }
    }

    /// Write out all pending data that connects to the front of the stream.
    fn drain(&mut self, output: &mut Writer) {
        loop {
            let start = match self.pending.keys().next().copied() {
                Some(start) if start <= self.first_unassembled => start,
                _ => break,
            };

            let data = match self.pending.remove(&start) {
                Some(data) => data,
                None => break,
            };

            let end = start + data.len() as u64;
            if end <= self.first_unassembled {
                // Superseded by data that was written already.
                continue;
            }

            let skip = (self.first_unassembled - start) as usize;
            output.push(&data[skip..]);
            self.first_unassembled = end;
        }
    }

    /// Number of bytes stored but not yet written.
    ///
    /// Overlapping ranges are only counted once.
    pub fn bytes_pending(&self) -> u64 {
        let mut count = 0;
        let mut covered = self.first_unassembled;

        for (&start, data) in self.pending.iter() {
            let end = start + data.len() as u64;
            if end > covered {
                count += end - start.max(covered);
                covered = end;
            }
        }

        count
    }

    /// The index of the next byte the output stream expects.
    pub fn first_unassembled(&self) -> u64 {
        self.first_unassembled
    }
}
