//! Sequence numbers and the segment descriptors exchanged by the tcp layer.
//!
//! The byte layout of a TCP header is not handled here. Segments are passed between a sender and
//! a receiver as plain values, the medium in between is the harness's concern.
use core::{fmt, ops};

/// A 32-bit sequence number as it appears on the wire.
///
/// Sequence numbers are relative to an initial sequence number, the zero point, and wrap around
/// modulo `2^32`. Within a connection all byte offsets are instead tracked as absolute 64-bit
/// indices, where index `0` is the SYN. This type converts between the two.
///
/// ## Example
///
/// ```
/// # use simstack::wire::TcpSeqNumber as SeqNumber;
/// let isn = SeqNumber(u32::max_value() - 1);
/// let wrapped = SeqNumber::wrap(3, isn);
/// assert_eq!(wrapped, SeqNumber(1));
/// assert_eq!(wrapped.unwrap(isn, 0), 3);
/// assert_eq!(wrapped.unwrap(isn, 1 << 33), (1 << 33) + 3);
/// ```
#[derive(Debug, Default, Hash, PartialEq, Eq, Clone, Copy)]
pub struct SeqNumber(pub u32);

impl SeqNumber {
    const MODULUS: u64 = 1 << 32;

    /// Convert an absolute index into a sequence number relative to `zero_point`.
    pub fn wrap(absolute: u64, zero_point: SeqNumber) -> SeqNumber {
        // Truncation is the reduction modulo 2^32.
        zero_point + absolute as u32
    }

    /// Find the absolute index that wraps to this sequence number and lies closest to
    /// `checkpoint`.
    ///
    /// Candidates are all indices congruent to `self - zero_point` modulo `2^32`. If the two
    /// nearest ones are equally far away the larger one is chosen. Indices can not be negative so
    /// a checkpoint near zero only ever resolves upwards.
    pub fn unwrap(self, zero_point: SeqNumber, checkpoint: u64) -> u64 {
        let offset = self.0.wrapping_sub(SeqNumber::wrap(checkpoint, zero_point).0);
        let above = checkpoint + u64::from(offset);

        if u64::from(offset) > Self::MODULUS / 2 && above >= Self::MODULUS {
            above - Self::MODULUS
        } else {
            above
        }
    }
}

impl ops::Add<u32> for SeqNumber {
    type Output = SeqNumber;

    fn add(self, rhs: u32) -> SeqNumber {
        SeqNumber(self.0.wrapping_add(rhs))
    }
}

impl fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A segment as emitted by a sender.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct SenderMessage {
    /// Sequence number of the first sequence slot occupied by this segment.
    pub seqno: SeqNumber,
    /// The segment opens the stream.
    pub syn: bool,
    /// Stream bytes.
    pub payload: Vec<u8>,
    /// The segment closes the stream.
    pub fin: bool,
}

impl SenderMessage {
    /// Number of sequence numbers occupied.
    ///
    /// SYN and FIN each count as one, in addition to the payload bytes.
    pub fn sequence_length(&self) -> u64 {
        u64::from(self.syn) + self.payload.len() as u64 + u64::from(self.fin)
    }
}

/// Acknowledgment and flow control feedback, emitted by a receiver.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct ReceiverMessage {
    /// The next sequence number the receiver needs, absent before it has seen a SYN.
    pub ackno: Option<SeqNumber>,
    /// Number of sequence numbers the receiver accepts starting at `ackno`.
    pub window_size: u16,
}

/// A full segment between two peers, carrying both directions of a connection.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Message {
    /// The outbound stream part.
    pub sender: SenderMessage,
    /// The acknowledgment of the inbound stream.
    pub receiver: ReceiverMessage,
}
