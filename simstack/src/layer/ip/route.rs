//! CIDR, relevant rfc1519, rfc4632.
//!
use crate::layer::{Error, Result};
use crate::wire::Ipv4Address;

/// A prefix of addresses that should be routed via an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// The network routed through this route.
    ///
    /// Bits past the prefix length are ignored when matching.
    pub prefix: Ipv4Address,

    /// Number of leading bits of `prefix` that must match.
    pub prefix_len: u8,

    /// The router to send matching datagrams to.
    ///
    /// `None` if the network is directly attached, datagrams then go straight to their
    /// destination.
    pub next_hop: Option<Ipv4Address>,

    /// Index of the outgoing interface.
    pub interface: usize,
}

impl Route {
    /// Returns a route matching `0.0.0.0/0` via the `gateway`.
    ///
    /// This route is a worst match for all addresses so that it can be used as a sink, for
    /// example.
    pub fn new_ipv4_gateway(gateway: Ipv4Address, interface: usize) -> Route {
        Route {
            prefix: Ipv4Address::UNSPECIFIED,
            prefix_len: 0,
            next_hop: Some(gateway),
            interface,
        }
    }

    /// The network mask in host order.
    pub fn mask(&self) -> u32 {
        match self.prefix_len {
            0 => 0,
            len => u32::max_value() << (32 - u32::from(len.min(32))),
        }
    }

    /// If the address is within the routed network.
    pub fn contains(&self, addr: Ipv4Address) -> bool {
        let mask = self.mask();
        addr.to_bits() & mask == self.prefix.to_bits() & mask
    }
}

/// A routing table.
///
/// Routes are kept in the order they were added and are not deduplicated.
///
/// # Examples
///
/// ```rust
/// use simstack::layer::ip::{Route, Routes};
/// use simstack::wire::Ipv4Address;
///
/// let mut routes = Routes::new();
/// routes.add_route(Route::new_ipv4_gateway(Ipv4Address::new(192, 168, 0, 1), 1)).unwrap();
/// routes.add_route(Route {
///     prefix: Ipv4Address::new(10, 0, 0, 0),
///     prefix_len: 8,
///     next_hop: None,
///     interface: 0,
/// }).unwrap();
///
/// assert_eq!(routes.lookup(Ipv4Address::new(10, 1, 2, 3)).map(|r| r.interface), Some(0));
/// assert_eq!(routes.lookup(Ipv4Address::new(8, 8, 8, 8)).map(|r| r.interface), Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Routes {
    storage: Vec<Route>,
}

impl Routes {
    /// Creates an empty routing table.
    pub fn new() -> Self {
        Routes::default()
    }

    /// Append a route.
    ///
    /// Fails with `Error::Illegal` if the prefix length exceeds 32.
    pub fn add_route(&mut self, route: Route) -> Result<()> {
        if route.prefix_len > 32 {
            return Err(Error::Illegal);
        }

        self.storage.push(route);
        Ok(())
    }

    /// All routes, in insertion order.
    pub fn routes(&self) -> &[Route] {
        &self.storage
    }

    /// Find the route with the longest prefix containing `addr`.
    ///
    /// Of several equally long matches, the one added first wins.
    pub fn lookup(&self, addr: Ipv4Address) -> Option<&Route> {
        let mut best_match: Option<&Route> = None;
        for route in self.storage.iter() {
            // Ignored routes with mismatching net.
            if !route.contains(addr) {
                continue;
            }

            match best_match {
                Some(best) if best.prefix_len >= route.prefix_len => (),
                _ => best_match = Some(route),
            }
        }
        best_match
    }
}
