//! The process logic of protocol layers.
//!
//! ## Layering
//!
//! Each protocol layer is split into two parts; the packet logic contained in `wire` and the
//! processing part in this module. A layer holds the local state of a protocol and is driven
//! entirely by its caller. The state is open to modifications as part of a simulation while
//! processing does not take place, similar to reconfiguration on the OS level with utilities such
//! as `arp` or `ip route`.
//!
//! ## Stimuli
//!
//! No layer owns a thread or a clock. Every operation is one of:
//! * an arrival, such as `recv_frame` or `receive`, which processes data handed in by the caller,
//! * a time advance, `tick`, with a caller supplied duration,
//! * a poll, such as `maybe_send`, which hands out at most one queued unit of output.
//!
//! Work that can not complete right away, such as a datagram waiting for address resolution or a
//! segment waiting for retransmission, is queued until a later stimulus releases it.
//!
//! ## Errors
//!
//! Packets that fail to parse, are addressed elsewhere or lie outside a window are dropped
//! silently. The [`Error`] type is returned only by configuration calls.
//!
//! [`Error`]: enum.Error.html

pub mod arp;
pub mod ip;
pub mod tcp;

/// The result type of layer configuration.
pub type Result<T> = core::result::Result<T, Error>;

/// The error type of layer configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The operation was not permitted.
    ///
    /// Returned when a parameter is out of its valid range, e.g. a prefix length above 32.
    Illegal,

    /// The referenced interface or destination does not exist.
    Unreachable,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Error::Illegal => write!(f, "illegal operation"),
            Error::Unreachable => write!(f, "unreachable"),
        }
    }
}

impl std::error::Error for Error {}

/// Can convert from a wire error.
///
/// This indicates some layer tried to operate on a packet but failed.
impl From<crate::wire::Error> for Error {
    fn from(_: crate::wire::Error) -> Self {
        Error::Illegal
    }
}
