use crate::storage::{ByteStream, Reassembler, Writer};
use crate::wire::{TcpReceiverMessage, TcpSenderMessage, TcpSeqNumber};

/// The receiving half of a connection.
///
/// Translates the sequence numbers of incoming segments into stream indices for a [`Reassembler`]
/// and produces the acknowledgment and window to report back. Apart from the initial sequence
/// number of the remote it holds no state, everything else is derived from the inbound stream.
///
/// [`Reassembler`]: ../../storage/struct.Reassembler.html
#[derive(Clone, Debug, Default)]
pub struct Receiver {
    /// The zero point of the remote's sequence space, fixed by the first SYN.
    isn: Option<TcpSeqNumber>,
}

impl Receiver {
    /// The largest window that fits the 16-bit window field.
    pub const MAX_WINDOW: u16 = u16::max_value();

    /// Create a receiver that has not seen a SYN.
    pub fn new() -> Self {
        Receiver::default()
    }

    /// The initial sequence number of the remote, once known.
    pub fn isn(&self) -> Option<TcpSeqNumber> {
        self.isn
    }

    /// Process an incoming segment.
    ///
    /// Segments before the first SYN are ignored. Everything else is handed to the reassembler
    /// which drops whatever falls outside the window of `inbound`.
    pub fn receive(
        &mut self,
        segment: &TcpSenderMessage,
        reassembler: &mut Reassembler,
        inbound: &mut Writer,
    ) {
        let isn = match (self.isn, segment.syn) {
            (Some(isn), _) => isn,
            (None, true) => {
                self.isn = Some(segment.seqno);
                net_trace!("tcp: receiver synchronized at {}", segment.seqno);
                segment.seqno
            },
            (None, false) => return,
        };

        // Absolute sequence number of the next byte we need. Index 0 belongs to the SYN.
        let checkpoint = 1 + inbound.bytes_pushed();
        let absolute = segment.seqno.unwrap(isn, checkpoint);

        // The payload starts one after the SYN, if this segment carries it.
        let first_index = match (absolute + u64::from(segment.syn)).checked_sub(1) {
            Some(index) => index,
            // Claims to carry data at the SYN's own slot.
            None => return,
        };

        reassembler.insert(first_index, &segment.payload, segment.fin, inbound);
    }

    /// The acknowledgment and window to advertise for the current state of `inbound`.
    pub fn send(&self, inbound: &ByteStream) -> TcpReceiverMessage {
        let ackno = self.isn.map(|isn| {
            let next = 1 + inbound.bytes_pushed() + u64::from(inbound.is_closed());
            TcpSeqNumber::wrap(next, isn)
        });

        let window_size = if inbound.available_capacity() > u64::from(Self::MAX_WINDOW) {
            Self::MAX_WINDOW
        } else {
            inbound.available_capacity() as u16
        };

        TcpReceiverMessage {
            ackno,
            window_size,
        }
    }
}
