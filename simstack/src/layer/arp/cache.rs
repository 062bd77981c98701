// Heads up! Before working on this file you should read, at least,
// the parts of RFC 1122 that discuss ARP.
use std::collections::BTreeMap;

use crate::time::{Duration, Expiration, Instant};
use crate::wire::{EthernetAddress, Ipv4Address};

/// A cached neighbor.
///
/// A neighbor mapping translates from a protocol address to a hardware address, and contains the
/// timestamp past which the mapping should be considered invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    hardware_addr: EthernetAddress,
    expires_at: Expiration,
}

/// The address resolution cache of an interface.
///
/// Holds the learned mappings and remembers for which addresses a request was sent recently, so
/// that a burst of datagrams to an unknown host results in a single request.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: BTreeMap<Ipv4Address, Neighbor>,
    /// Outstanding requests and the time until which no other request should be sent.
    silent_until: BTreeMap<Ipv4Address, Instant>,
}

impl Cache {
    /// Minimum delay between requests for the same address.
    pub const REQUEST_SILENCE: Duration = Duration::from_millis(5_000);

    /// Neighbor entry lifetime.
    pub const ENTRY_LIFETIME: Duration = Duration::from_millis(30_000);

    /// Create an empty cache.
    pub fn new() -> Self {
        Cache::default()
    }

    /// Add or refresh an entry containing a MAC address.
    ///
    /// Provide the current timestamp or `None` to disable expiration. Any outstanding request for
    /// the address is considered answered.
    pub fn fill(
        &mut self,
        protocol_addr: Ipv4Address,
        hardware_addr: EthernetAddress,
        timestamp: Option<Instant>,
    ) {
        let neighbor = Neighbor {
            hardware_addr,
            expires_at: timestamp.map(|ts| ts + Self::ENTRY_LIFETIME).into(),
        };

        net_trace!("arp: learned {} at {}, expires {:?}", protocol_addr, hardware_addr, neighbor.expires_at);
        self.entries.insert(protocol_addr, neighbor);
        self.silent_until.remove(&protocol_addr);
    }

    /// Find the hardware address of a neighbor, if it is known and not expired.
    pub fn lookup(&self, protocol_addr: Ipv4Address, timestamp: Instant) -> Option<EthernetAddress> {
        let entry = self.entries.get(&protocol_addr)?;
        if entry.expires_at.is_reached(timestamp) {
            return None;
        }

        Some(entry.hardware_addr)
    }

    /// Record that a request for the address is about to be sent.
    ///
    /// Returns `false` without changing anything if a request was already sent within the last
    /// [`REQUEST_SILENCE`], in which case the caller should stay quiet.
    ///
    /// [`REQUEST_SILENCE`]: #associatedconstant.REQUEST_SILENCE
    pub fn start_request(&mut self, protocol_addr: Ipv4Address, timestamp: Instant) -> bool {
        if let Some(&until) = self.silent_until.get(&protocol_addr) {
            if timestamp < until {
                return false;
            }
        }

        self.silent_until.insert(protocol_addr, timestamp + Self::REQUEST_SILENCE);
        true
    }

    /// If a request for the address is outstanding.
    pub fn is_requesting(&self, protocol_addr: Ipv4Address, timestamp: Instant) -> bool {
        match self.silent_until.get(&protocol_addr) {
            Some(&until) => timestamp < until,
            None => false,
        }
    }

    /// Remove expired entries and outstanding requests.
    pub fn expire(&mut self, timestamp: Instant) {
        self.silent_until.retain(|_, until| timestamp < *until);
        self.entries.retain(|_, neighbor| !neighbor.expires_at.is_reached(timestamp));
    }

    /// Number of cached mappings, including those not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// If no mapping is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Neighbor {
    /// The hardware address of this neighbor.
    pub fn hardware_addr(&self) -> EthernetAddress {
        self.hardware_addr
    }

    /// The point in time from which this mapping is no longer valid.
    pub fn expires_at(&self) -> Expiration {
        self.expires_at
    }
}
