//! The IP layer.
//!
//! Forwarding of IPv4 datagrams between several interfaces. There is no local delivery, every
//! datagram that reaches the router is sent on towards its destination.
//!
//! ## Structure
//!
//! The [`Router`] owns its interfaces, each wrapped in a [`Port`] that queues the datagrams it
//! accepted, and a table of [`Routes`]. A route matches by the longest prefix and names the
//! outgoing interface and, unless the network is directly attached, the next router.
//!
//! ## Forwarding
//!
//! The time to live of every forwarded datagram is decremented and its header checksum
//! recomputed. A datagram that arrives with a time to live of one or less is dropped, as is one
//! without any matching route. Neither is reported anywhere. It does **not** provide fragment
//! reassembly or ICMP.
//!
//! Resolution of the next hop's hardware address is left to the ARP [`Interface`] of the
//! outgoing port.
//!
//! [`Router`]: struct.Router.html
//! [`Port`]: struct.Port.html
//! [`Routes`]: struct.Routes.html
//! [`Interface`]: ../arp/struct.Interface.html
mod route;
mod router;

pub use route::{Route, Routes};
pub use router::{Port, Router};
