//! Address resolution for IPv4 over Ethernet.
//!
//! Restricted to the simple use of answering requests for the own address and resolving the next
//! hops of outgoing datagrams. Mappings are learned from every ARP message seen on the link, not
//! only from replies to our own requests.
mod cache;
mod interface;
#[cfg(test)]
mod tests;

pub use cache::{Cache, Neighbor};
pub use interface::Interface;
