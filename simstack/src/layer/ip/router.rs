use std::collections::VecDeque;

use super::{Route, Routes};
use crate::layer::{arp, Error, Result};
use crate::time::Duration;
use crate::wire::{EthernetFrame, Ipv4Address, Ipv4Datagram};

/// An interface attached to a router.
///
/// Accepted datagrams are kept until the router takes them with [`maybe_receive`].
///
/// [`maybe_receive`]: #method.maybe_receive
#[derive(Debug, Clone)]
pub struct Port {
    interface: arp::Interface,
    received: VecDeque<Ipv4Datagram>,
}

/// Forwards IPv4 datagrams between interfaces.
///
/// Each call to [`route`] drains the received datagrams of all interfaces, in interface order, and
/// sends every one of them towards the best matching route. Datagrams without route or whose time
/// to live runs out are dropped silently.
///
/// [`route`]: #method.route
#[derive(Debug, Clone, Default)]
pub struct Router {
    ports: Vec<Port>,
    routes: Routes,
}

impl Port {
    /// Attach an interface.
    pub fn new(interface: arp::Interface) -> Self {
        Port {
            interface,
            received: VecDeque::new(),
        }
    }

    /// The underlying interface.
    pub fn interface(&self) -> &arp::Interface {
        &self.interface
    }

    /// Mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut arp::Interface {
        &mut self.interface
    }

    /// Process a frame from the link, keeping any datagram it carried.
    pub fn recv_frame(&mut self, frame: &EthernetFrame) {
        if let Some(datagram) = self.interface.recv_frame(frame) {
            self.received.push_back(datagram);
        }
    }

    /// Take the oldest received datagram.
    pub fn maybe_receive(&mut self) -> Option<Ipv4Datagram> {
        self.received.pop_front()
    }

    /// Take the next frame to put on the link.
    pub fn maybe_send(&mut self) -> Option<EthernetFrame> {
        self.interface.maybe_send()
    }

    /// Send a datagram to `next_hop` on the link.
    pub fn send_datagram(&mut self, datagram: Ipv4Datagram, next_hop: Ipv4Address) {
        self.interface.send_datagram(datagram, next_hop)
    }

    /// Advance the clock of the interface.
    pub fn tick(&mut self, elapsed: Duration) {
        self.interface.tick(elapsed)
    }
}

impl Router {
    /// Create a router without interfaces or routes.
    pub fn new() -> Self {
        Router::default()
    }

    /// Attach an interface, returning its index.
    pub fn add_interface(&mut self, interface: arp::Interface) -> usize {
        self.ports.push(Port::new(interface));
        self.ports.len() - 1
    }

    /// The interface with the given index.
    pub fn interface(&self, index: usize) -> Option<&Port> {
        self.ports.get(index)
    }

    /// The interface with the given index, mutably.
    pub fn interface_mut(&mut self, index: usize) -> Option<&mut Port> {
        self.ports.get_mut(index)
    }

    /// The routing table.
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Add a route to the network `prefix/prefix_len` through the interface `interface`.
    ///
    /// With a `next_hop` matching datagrams are sent to that router, otherwise the network is
    /// considered directly attached. Fails if the prefix length exceeds 32 or the interface does
    /// not exist.
    pub fn add_route(
        &mut self,
        prefix: Ipv4Address,
        prefix_len: u8,
        next_hop: Option<Ipv4Address>,
        interface: usize,
    ) -> Result<()> {
        if interface >= self.ports.len() {
            return Err(Error::Unreachable);
        }

        net_debug!("ip: adding route {}/{} => {:?} on interface {}", prefix, prefix_len, next_hop, interface);
        self.routes.add_route(Route {
            prefix,
            prefix_len,
            next_hop,
            interface,
        })
    }

    /// Send a datagram one hop closer to its destination.
    pub fn forward_datagram(&mut self, mut datagram: Ipv4Datagram) {
        if datagram.header.ttl <= 1 {
            net_debug!("ip: time to live exceeded for {}", datagram);
            return;
        }

        let dst = datagram.header.dst;
        let (next_hop, interface) = match self.routes.lookup(dst) {
            Some(route) => (route.next_hop.unwrap_or(dst), route.interface),
            None => {
                net_debug!("ip: no route to {}", dst);
                return;
            },
        };

        let port = match self.ports.get_mut(interface) {
            Some(port) => port,
            None => return,
        };

        datagram.header.ttl -= 1;
        datagram.compute_checksum();
        net_trace!("ip: forwarding {} via {} on interface {}", datagram, next_hop, interface);
        port.send_datagram(datagram, next_hop);
    }

    /// Forward every datagram received on any interface.
    pub fn route(&mut self) {
        for index in 0..self.ports.len() {
            while let Some(datagram) = self.ports[index].maybe_receive() {
                self.forward_datagram(datagram);
            }
        }
    }

    /// Advance the clocks of all interfaces.
    pub fn tick(&mut self, elapsed: Duration) {
        for port in self.ports.iter_mut() {
            port.tick(elapsed);
        }
    }
}
