//! The TCP layer abstraction.
//!
//! Offers a receiver and a sender for one direction of a connection each, and a [`Peer`] that
//! combines both into one endpoint of a full duplex connection. Segments are plain values of
//! [`SenderMessage`] and [`ReceiverMessage`]; how they get to the remote is up to the caller.
//!
//! The main difference to the lower layers is that reliability requires state across calls. The
//! sender keeps every segment until it has been acknowledged and retransmits the oldest one when
//! its timer runs out. There is no timer of its own, time only advances by [`Sender::tick`].
//!
//! There are a number of simplifying assumptions compared to a full implementation:
//! * There is no congestion control. The only limit on the data in flight is the window
//!   advertised by the receiver.
//! * There is no connection teardown beyond sequencing the FIN. Once both directions are closed
//!   and acknowledged the connection is simply dropped by its owner.
//! * A zero window is treated as a window of one, so that a probe segment goes out and the sender
//!   learns when the window opens again. Retransmissions of such a probe do not back off.
//!
//! ## Example
//!
//! ```
//! # use simstack::layer::tcp::{Config, Peer};
//! # use simstack::time::Duration;
//! let mut client = Peer::new(Config::default());
//! let mut server = Peer::new(Config::default());
//!
//! client.outbound().push(b"hello");
//! client.outbound().close();
//!
//! for _ in 0..4 {
//!     client.push();
//!     while let Some(segment) = client.maybe_send() {
//!         server.receive(segment);
//!     }
//!     server.push();
//!     while let Some(segment) = server.maybe_send() {
//!         client.receive(segment);
//!     }
//!     client.tick(Duration::from_millis(10));
//! }
//!
//! assert_eq!(server.inbound().peek(), b"hello");
//! assert!(server.inbound().is_closed());
//! ```
//!
//! [`Peer`]: struct.Peer.html
//! [`SenderMessage`]: ../../wire/tcp/struct.SenderMessage.html
//! [`ReceiverMessage`]: ../../wire/tcp/struct.ReceiverMessage.html
//! [`Sender::tick`]: struct.Sender.html#method.tick
use crate::time::Duration;
use crate::wire::TcpSeqNumber;

mod peer;
mod receiver;
mod sender;

#[cfg(test)]
mod tests;

pub use peer::Peer;
pub use receiver::Receiver;
pub use sender::Sender;

/// Parameters of one connection endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// The initial retransmission timeout.
    pub rto: Duration,

    /// The initial sequence number of the outbound stream.
    ///
    /// Chosen at random when not set.
    pub isn: Option<TcpSeqNumber>,

    /// The maximum number of payload bytes in a single segment.
    pub max_payload_size: usize,

    /// Capacity of the outbound byte stream.
    pub send_capacity: u64,

    /// Capacity of the inbound byte stream, which bounds the advertised window.
    pub recv_capacity: u64,
}

impl Config {
    /// Default payload size limit, conservative enough to fit a typical link MTU.
    pub const MAX_PAYLOAD_SIZE: usize = 1000;

    /// Default initial retransmission timeout.
    pub const TIMEOUT_DEFAULT: Duration = Duration::from_millis(1000);

    /// Default capacity of both byte streams.
    pub const DEFAULT_CAPACITY: u64 = 64_000;
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rto: Config::TIMEOUT_DEFAULT,
            isn: None,
            max_payload_size: Config::MAX_PAYLOAD_SIZE,
            send_capacity: Config::DEFAULT_CAPACITY,
            recv_capacity: Config::DEFAULT_CAPACITY,
        }
    }
}
