use std::collections::VecDeque;
use std::mem;

use super::Cache;
use crate::time::{Duration, Instant};
use crate::wire::{ArpOperation, ArpRepr, EtherType, EthernetAddress, EthernetFrame, EthernetHeader};
use crate::wire::{Ipv4Address, Ipv4Datagram};

/// An Ethernet interface with an IPv4 address.
///
/// Translates between IPv4 datagrams and Ethernet frames, resolving the hardware address of each
/// next hop with ARP. Outgoing frames are queued until the caller polls them with [`maybe_send`].
///
/// Datagrams to a next hop that is not resolved yet wait inside the interface. They are sent in
/// their original order once any ARP message from that host is seen, solicited or not. There is
/// no limit on how long they wait.
///
/// [`maybe_send`]: #method.maybe_send
#[derive(Debug, Clone)]
pub struct Interface {
    ethernet_addr: EthernetAddress,
    ip_addr: Ipv4Address,
    now: Instant,
    cache: Cache,
    /// Frames ready to be put on the link.
    ready: VecDeque<EthernetFrame>,
    /// Datagrams waiting for their next hop to be resolved.
    waiting: Vec<(Ipv4Datagram, Ipv4Address)>,
}

impl Interface {
    /// Create an interface with an empty cache, at time zero.
    pub fn new(ethernet_addr: EthernetAddress, ip_addr: Ipv4Address) -> Self {
        net_debug!("arp: interface has ethernet address {} and ip address {}", ethernet_addr, ip_addr);

        Interface {
            ethernet_addr,
            ip_addr,
            now: Instant::ZERO,
            cache: Cache::new(),
            ready: VecDeque::new(),
            waiting: Vec::new(),
        }
    }

    /// The hardware address of the interface.
    pub fn ethernet_address(&self) -> EthernetAddress {
        self.ethernet_addr
    }

    /// The IPv4 address of the interface.
    pub fn ip_address(&self) -> Ipv4Address {
        self.ip_addr
    }

    /// The local clock, advanced by `tick`.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// The neighbor cache.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Mutable access to the neighbor cache, e.g. to add static entries.
    pub fn cache_mut(&mut self) -> &mut Cache {
        &mut self.cache
    }

    /// Number of datagrams waiting for address resolution.
    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }

    /// Send a datagram to the host `next_hop` on the link.
    ///
    /// Usually the next hop is a router, or the destination itself when it is directly attached.
    /// If its hardware address is unknown the datagram is held back and a request is broadcast,
    /// unless one was sent recently.
    pub fn send_datagram(&mut self, datagram: Ipv4Datagram, next_hop: Ipv4Address) {
        if let Some(dst) = self.cache.lookup(next_hop, self.now) {
            self.enqueue(dst, EtherType::Ipv4, datagram.serialize());
            return;
        }

        self.waiting.push((datagram, next_hop));

        if self.cache.start_request(next_hop, self.now) {
            net_trace!("arp: requesting {} at {}", next_hop, self.now);
            let request = ArpRepr {
                operation: ArpOperation::Request,
                source_hardware_addr: self.ethernet_addr,
                source_protocol_addr: self.ip_addr,
                target_hardware_addr: EthernetAddress::default(),
                target_protocol_addr: next_hop,
            };
            self.enqueue(EthernetAddress::BROADCAST, EtherType::Arp, request.serialize());
        }
    }

    /// Process a frame from the link.
    ///
    /// Returns the datagram if the frame carried one addressed to this interface. ARP messages
    /// update the cache and may produce a reply. Everything else is dropped.
    pub fn recv_frame(&mut self, frame: &EthernetFrame) -> Option<Ipv4Datagram> {
        match frame.header.ethertype {
            EtherType::Ipv4 => {
                if frame.header.dst != self.ethernet_addr {
                    return None;
                }
                Ipv4Datagram::parse(&frame.payload).ok()
            },
            EtherType::Arp => {
                if let Ok(message) = ArpRepr::parse(&frame.payload) {
                    self.recv_arp(message);
                }
                None
            },
            EtherType::Unknown(_) => None,
        }
    }

    fn recv_arp(&mut self, message: ArpRepr) {
        let sender_ip = message.source_protocol_addr;
        let sender_eth = message.source_hardware_addr;

        self.cache.fill(sender_ip, sender_eth, Some(self.now));
        self.release_waiting();

        if message.operation == ArpOperation::Request && message.target_protocol_addr == self.ip_addr {
            let reply = ArpRepr {
                operation: ArpOperation::Reply,
                source_hardware_addr: self.ethernet_addr,
                source_protocol_addr: self.ip_addr,
                target_hardware_addr: sender_eth,
                target_protocol_addr: sender_ip,
            };
            self.enqueue(sender_eth, EtherType::Arp, reply.serialize());
        }
    }

    /// Send every waiting datagram whose next hop is now known, in order.
    fn release_waiting(&mut self) {
        let now = self.now;
        let cache = &self.cache;
        let (resolved, waiting): (Vec<_>, Vec<_>) = mem::replace(&mut self.waiting, Vec::new())
            .into_iter()
            .partition(|(_, next_hop)| cache.lookup(*next_hop, now).is_some());
        self.waiting = waiting;

        for (datagram, next_hop) in resolved {
            self.send_datagram(datagram, next_hop);
        }
    }

    /// Advance the local clock and forget stale cache entries and requests.
    pub fn tick(&mut self, elapsed: Duration) {
        self.now += elapsed;
        self.cache.expire(self.now);
    }

    /// Take the next frame to put on the link.
    pub fn maybe_send(&mut self) -> Option<EthernetFrame> {
        self.ready.pop_front()
    }

    fn enqueue(&mut self, dst: EthernetAddress, ethertype: EtherType, payload: Vec<u8>) {
        self.ready.push_back(EthernetFrame {
            header: EthernetHeader {
                dst,
                src: self.ethernet_addr,
                ethertype,
            },
            payload,
        });
    }
}
