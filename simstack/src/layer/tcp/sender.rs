use std::collections::VecDeque;

use super::Config;
use crate::storage::Reader;
use crate::time::Duration;
use crate::wire::{TcpReceiverMessage, TcpSenderMessage, TcpSeqNumber};

/// The sending half of a connection.
///
/// Cuts the outbound stream into segments that fit the window advertised by the remote, keeps
/// every segment until it is acknowledged and retransmits the oldest one on timeout.
///
/// All offsets are tracked as absolute sequence numbers where `0` is the SYN. They are only
/// wrapped into the 32-bit sequence space when a segment is built.
#[derive(Clone, Debug)]
pub struct Sender {
    isn: TcpSeqNumber,
    max_payload_size: usize,

    syn_sent: bool,
    fin_sent: bool,

    /// Absolute sequence number of the next new sequence slot.
    next_seqno: u64,
    /// Everything before this was acknowledged.
    acked: u64,
    /// The window last advertised by the remote.
    window: u16,

    /// Sent segments not yet acknowledged, in sequence order.
    outstanding: VecDeque<Outstanding>,
    /// Segments built but not yet handed out by `maybe_send`.
    queued: VecDeque<Queued>,

    timer: Timer,
    consecutive_retransmissions: u32,
}

#[derive(Clone, Debug)]
struct Outstanding {
    /// Absolute sequence number one past the segment.
    end: u64,
    message: TcpSenderMessage,
}

#[derive(Clone, Debug)]
struct Queued {
    message: TcpSenderMessage,
    /// A copy of the oldest outstanding segment, already recorded.
    retransmit: bool,
}

/// The retransmission timer.
#[derive(Clone, Copy, Debug)]
struct Timer {
    active: bool,
    elapsed: Duration,
    initial_rto: Duration,
    rto: Duration,
}

impl Sender {
    /// Create a sender that has not sent its SYN yet.
    ///
    /// The initial sequence number is taken from the configuration or chosen at random.
    pub fn new(config: &Config) -> Self {
        let isn = config.isn.unwrap_or_else(|| TcpSeqNumber(rand::random()));

        Sender {
            isn,
            max_payload_size: config.max_payload_size,
            syn_sent: false,
            fin_sent: false,
            next_seqno: 0,
            acked: 0,
            // Enough to get the SYN out before the remote told us anything.
            window: 1,
            outstanding: VecDeque::new(),
            queued: VecDeque::new(),
            timer: Timer::new(config.rto),
            consecutive_retransmissions: 0,
        }
    }

    /// The initial sequence number of the outbound stream.
    pub fn isn(&self) -> TcpSeqNumber {
        self.isn
    }

    /// Number of sequence numbers sent but not yet acknowledged.
    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.next_seqno - self.acked
    }

    /// Number of retransmissions since the last forward progress.
    pub fn consecutive_retransmissions(&self) -> u32 {
        self.consecutive_retransmissions
    }

    /// The current retransmission timeout.
    pub fn rto(&self) -> Duration {
        self.timer.rto
    }

    /// If the FIN has been sent and everything up to it was acknowledged.
    pub fn is_finished(&self) -> bool {
        self.fin_sent && self.sequence_numbers_in_flight() == 0
    }

    /// Build as many segments from `outbound` as the window allows.
    ///
    /// A zero window is treated as a window of one so that a probe can discover when it opens.
    /// The segments are queued and handed out by [`maybe_send`].
    ///
    /// [`maybe_send`]: #method.maybe_send
    pub fn push(&mut self, outbound: &mut Reader) {
        let window = u64::from(self.window.max(1));

        while !self.fin_sent && self.sequence_numbers_in_flight() < window {
            let in_flight = self.sequence_numbers_in_flight();
            let mut message = TcpSenderMessage {
                seqno: TcpSeqNumber::wrap(self.next_seqno, self.isn),
                syn: !self.syn_sent,
                payload: Vec::new(),
                fin: false,
            };

            let room = window - in_flight - u64::from(message.syn);
            let len = room
                .min(outbound.bytes_buffered())
                .min(self.max_payload_size as u64);
            outbound.read_into(len, &mut message.payload);

            // The FIN must fit strictly behind everything else in this segment.
            let used = in_flight + u64::from(message.syn) + message.payload.len() as u64;
            if outbound.is_finished() && used < window {
                message.fin = true;
            }

            if message.sequence_length() == 0 {
                break;
            }

            self.syn_sent = true;
            self.fin_sent |= message.fin;
            self.next_seqno += message.sequence_length();
            self.queued.push_back(Queued {
                message,
                retransmit: false,
            });
        }
    }

    /// Hand out the next queued segment, if any.
    ///
    /// New segments are recorded as outstanding and start the timer if it is not running. A
    /// retransmission whose original was acknowledged in the meantime leaves the timer alone.
    pub fn maybe_send(&mut self) -> Option<TcpSenderMessage> {
        let Queued { message, retransmit } = self.queued.pop_front()?;

        if !retransmit {
            let end = message.seqno.unwrap(self.isn, self.next_seqno) + message.sequence_length();
            self.outstanding.push_back(Outstanding {
                end,
                message: message.clone(),
            });
        }

        if !self.outstanding.is_empty() {
            self.timer.start();
        }
        Some(message)
    }

    /// A segment that occupies no sequence numbers, for carrying acknowledgments.
    pub fn send_empty_message(&self) -> TcpSenderMessage {
        TcpSenderMessage {
            seqno: TcpSeqNumber::wrap(self.next_seqno, self.isn),
            .. TcpSenderMessage::default()
        }
    }

    /// Process acknowledgment and window feedback from the remote.
    ///
    /// An acknowledgment of data never sent, or one that lies before an earlier acknowledgment, is
    /// ignored completely.
    pub fn receive(&mut self, message: &TcpReceiverMessage) {
        if let Some(ackno) = message.ackno {
            let acked = ackno.unwrap(self.isn, self.next_seqno);
            if acked > self.next_seqno || acked < self.acked {
                net_trace!("tcp: ignoring ack {} outside of {}..={}", acked, self.acked, self.next_seqno);
                return;
            }
            self.acked = acked;
        }

        self.window = message.window_size;

        while let Some(front) = self.outstanding.front() {
            if front.end > self.acked {
                break;
            }

            self.outstanding.pop_front();
            if self.window != 0 {
                self.timer.reset();
                self.consecutive_retransmissions = 0;
            }
        }

        if self.outstanding.is_empty() {
            self.timer.stop();
        }
    }

    /// Advance the retransmission timer.
    ///
    /// On expiry the oldest outstanding segment is queued again. The timeout doubles unless the
    /// window is zero, in which case the segment is a probe and not a sign of congestion.
    pub fn tick(&mut self, elapsed: Duration) {
        let oldest = match self.outstanding.front() {
            Some(oldest) => oldest,
            None => {
                self.timer.stop();
                return;
            },
        };

        if !self.timer.advance(elapsed) {
            return;
        }

        net_debug!("tcp: retransmitting seqno {} after {:?}", oldest.message.seqno, self.timer.rto);
        self.queued.push_back(Queued {
            message: oldest.message.clone(),
            retransmit: true,
        });

        if self.window != 0 {
            self.consecutive_retransmissions += 1;
            self.timer.back_off(self.consecutive_retransmissions);
        }

        self.timer.elapsed = Duration::from_millis(0);
    }
}

impl Timer {
    fn new(initial_rto: Duration) -> Self {
        Timer {
            active: false,
            elapsed: Duration::from_millis(0),
            initial_rto,
            rto: initial_rto,
        }
    }

    /// Start the timer if it is not running.
    fn start(&mut self) {
        if !self.active {
            self.active = true;
            self.elapsed = Duration::from_millis(0);
        }
    }

    fn stop(&mut self) {
        self.active = false;
    }

    /// Restart the count and forget any back off.
    fn reset(&mut self) {
        self.elapsed = Duration::from_millis(0);
        self.rto = self.initial_rto;
    }

    /// Returns whether the timeout was reached.
    fn advance(&mut self, elapsed: Duration) -> bool {
        if !self.active {
            return false;
        }

        self.elapsed += elapsed;
        self.elapsed >= self.rto
    }

    /// Set the timeout to `initial * 2^retransmissions`, saturating.
    fn back_off(&mut self, retransmissions: u32) {
        self.rto = 1u32.checked_shl(retransmissions)
            .and_then(|factor| self.initial_rto.checked_mul(factor))
            .unwrap_or(Duration::from_secs(u64::max_value()));
    }
}
