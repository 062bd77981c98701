//! The protocol core of a minimal TCP/IP stack, driven by a simulation harness.
//!
//! ## Table of contents
//!
//! 1. [Design](#design)
//! 2. [The storage module](storage/index.html)
//!    1. [Byte streams](storage/stream/index.html)
//!    1. [Reassembly](storage/assembler/index.html)
//! 3. [The wire module](wire/index.html)
//! 4. [The layers](layer/index.html)
//!    1. [Tcp](layer/tcp/index.html)
//!    1. [Arp](layer/arp/index.html)
//!    1. [Ip forwarding](layer/ip/index.html)
//!
//! ## Design
//!
//! Nothing in here performs I/O, spawns a thread or reads a clock. Every component is a plain
//! state machine that reacts to exactly three kinds of stimuli:
//!
//! * arrival of data (a segment, a frame, bytes written into a stream),
//! * passage of time, always supplied by the caller through a `tick`,
//! * polling for output (`maybe_send`, `peek`, `pop`, `route`).
//!
//! Each call either completes immediately or leaves state behind that a later stimulus picks up,
//! such as a datagram waiting for address resolution or a segment waiting for retransmission.
//! A harness wires the components together, moves their outputs across a (possibly lossy and
//! reordering) medium and observes the results.
//!
//! The data flow for a connection is
//!
//! ```text
//! Writer -> Sender -> segments -> medium -> Receiver -> Reassembler -> Writer -> Reader
//! ```
//!
//! while IP datagrams flow from a [`Router`] into an ARP resolving [`Interface`] onto the link and
//! back in the reverse direction.
//!
//! Malformed or out-of-window input is treated as expected network noise and dropped where it is
//! detected. Apart from configuration calls nothing returns an error.
//!
//! [`Router`]: layer/ip/struct.Router.html
//! [`Interface`]: layer/arp/struct.Interface.html
#![warn(missing_docs)]
#![warn(unreachable_pub)]

#[macro_use] mod macros;
pub mod layer;
pub mod storage;
pub mod time;
pub mod wire;
