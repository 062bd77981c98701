use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use crate::wire::{Error, Result};

enum_with_unknown! {
    /// Ethernet protocol type.
    pub enum EtherType(u16) {
        /// An IPv4 datagram.
        Ipv4 = 0x0800,
        /// An address resolution message.
        Arp  = 0x0806,
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EtherType::Ipv4 => write!(f, "IPv4"),
            EtherType::Arp  => write!(f, "ARP"),
            EtherType::Unknown(id) => write!(f, "0x{:04x}", id)
        }
    }
}

/// A six-octet Ethernet II address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 6]);

impl Address {
    /// The broadcast address.
    pub const BROADCAST: Address = Address([0xff; 6]);

    /// Construct an Ethernet address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not six octets long.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; 6];
        bytes.copy_from_slice(data);
        Address(bytes)
    }

    /// Return an Ethernet address as a sequence of octets, in big-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether the address is an unicast address.
    pub fn is_unicast(&self) -> bool {
        !(self.is_broadcast() ||
          self.is_multicast())
    }

    /// Query whether this address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Query whether the "multicast" bit in the OUI is set.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(f, "{:02x}-{:02x}-{:02x}-{:02x}-{:02x}-{:02x}",
               bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5])
    }
}

mod field {
    use crate::wire::field::*;

    pub(crate) const DESTINATION: Field = 0..6;
    pub(crate) const SOURCE:      Field = 6..12;
    pub(crate) const ETHERTYPE:   Field = 12..14;
    pub(crate) const PAYLOAD:     Rest  = 14..;
}

/// The header of an Ethernet II frame.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Header {
    /// The link address the frame is sent to.
    pub dst: Address,
    /// The link address of the sender.
    pub src: Address,
    /// The kind of payload.
    pub ethertype: EtherType,
}

/// An Ethernet II frame with an owned payload.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Frame {
    /// The parsed header.
    pub header: Header,
    /// The encapsulated bytes, not interpreted.
    pub payload: Vec<u8>,
}

impl Header {
    /// The length of an emitted header.
    pub const LEN: usize = field::PAYLOAD.start;

    /// Parse the header from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Header> {
        if data.len() < Self::LEN {
            return Err(Error::Truncated);
        }

        Ok(Header {
            dst: Address::from_bytes(&data[field::DESTINATION]),
            src: Address::from_bytes(&data[field::SOURCE]),
            ethertype: NetworkEndian::read_u16(&data[field::ETHERTYPE]).into(),
        })
    }

    /// Emit the header into the first `Header::LEN` octets of `data`.
    ///
    /// # Panics
    /// This function panics if `data` is shorter than `Header::LEN`.
    pub fn emit(&self, data: &mut [u8]) {
        data[field::DESTINATION].copy_from_slice(self.dst.as_bytes());
        data[field::SOURCE].copy_from_slice(self.src.as_bytes());
        NetworkEndian::write_u16(&mut data[field::ETHERTYPE], self.ethertype.into());
    }
}

impl Frame {
    /// Parse a complete frame.
    pub fn parse(data: &[u8]) -> Result<Frame> {
        let header = Header::parse(data)?;
        Ok(Frame {
            header,
            payload: data[field::PAYLOAD].to_vec(),
        })
    }

    /// Serialize the frame into a fresh buffer.
    pub fn serialize(&self) -> Vec<u8> {
        let mut data = vec![0; Header::LEN + self.payload.len()];
        self.header.emit(&mut data);
        data[field::PAYLOAD].copy_from_slice(&self.payload);
        data
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EthernetII src={} dst={} type={} len={}",
               self.header.src, self.header.dst, self.header.ethertype, self.payload.len())
    }
}
