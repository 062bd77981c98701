use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{checksum, Error, Result};

/// A four-octet IPv4 address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 4]);

impl Address {
    /// An unspecified address.
    pub const UNSPECIFIED: Address = Address([0x00; 4]);

    /// Construct an IPv4 address from parts.
    pub const fn new(a0: u8, a1: u8, a2: u8, a3: u8) -> Address {
        Address([a0, a1, a2, a3])
    }

    /// Construct an IPv4 address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not four octets long.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(data);
        Address(bytes)
    }

    /// Return an IPv4 address as a sequence of octets, in big-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The address as a host order integer.
    pub fn to_bits(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Construct the address from its host order integer.
    pub fn from_bits(bits: u32) -> Address {
        Address(bits.to_be_bytes())
    }
}

impl From<u32> for Address {
    fn from(bits: u32) -> Self {
        Address::from_bits(bits)
    }
}

impl From<Address> for u32 {
    fn from(addr: Address) -> Self {
        addr.to_bits()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(f, "{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

mod field {
    use crate::wire::field::*;

    pub(crate) const VER_IHL:  usize = 0;
    pub(crate) const DSCP_ECN: usize = 1;
    pub(crate) const LENGTH:   Field = 2..4;
    pub(crate) const IDENT:    Field = 4..6;
    pub(crate) const FLG_OFF:  Field = 6..8;
    pub(crate) const TTL:      usize = 8;
    pub(crate) const PROTOCOL: usize = 9;
    pub(crate) const CHECKSUM: Field = 10..12;
    pub(crate) const SRC_ADDR: Field = 12..16;
    pub(crate) const DST_ADDR: Field = 16..20;
}

/// The fixed header of an IPv4 datagram.
///
/// Options are not supported. The total length is not stored but derived from the payload of the
/// surrounding [`Datagram`].
///
/// [`Datagram`]: struct.Datagram.html
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Header {
    /// Type of service, DSCP and ECN bits.
    pub tos: u8,
    /// Identification for fragment reassembly.
    pub ident: u16,
    /// The don't-fragment flag.
    pub dont_frag: bool,
    /// The more-fragments flag.
    pub more_frags: bool,
    /// Fragment offset, in units of 8 octets.
    pub frag_offset: u16,
    /// Remaining hop count.
    pub ttl: u8,
    /// The encapsulated protocol number.
    pub protocol: u8,
    /// The header checksum as last computed or parsed.
    pub checksum: u16,
    /// The source address.
    pub src: Address,
    /// The destination address.
    pub dst: Address,
}

/// An IPv4 datagram with an owned payload.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Datagram {
    /// The parsed header.
    pub header: Header,
    /// The encapsulated bytes, not interpreted.
    pub payload: Vec<u8>,
}

impl Header {
    /// The length of an emitted header.
    pub const LEN: usize = field::DST_ADDR.end;

    /// The protocol number of TCP.
    pub const PROTOCOL_TCP: u8 = 6;

    /// The default initial time to live.
    pub const DEFAULT_TTL: u8 = 64;

    /// The largest payload whose total length still fits the 16-bit length field.
    pub const MAX_PAYLOAD_LEN: usize = u16::max_value() as usize - Self::LEN;

    fn emit(&self, data: &mut [u8], payload_len: usize) {
        data[field::VER_IHL] = 0x40 | (Self::LEN / 4) as u8;
        data[field::DSCP_ECN] = self.tos;
        NetworkEndian::write_u16(&mut data[field::LENGTH], (Self::LEN + payload_len) as u16);
        NetworkEndian::write_u16(&mut data[field::IDENT], self.ident);
        let flags = (u16::from(self.dont_frag) << 14)
            | (u16::from(self.more_frags) << 13)
            | (self.frag_offset & 0x1fff);
        NetworkEndian::write_u16(&mut data[field::FLG_OFF], flags);
        data[field::TTL] = self.ttl;
        data[field::PROTOCOL] = self.protocol;
        NetworkEndian::write_u16(&mut data[field::CHECKSUM], self.checksum);
        data[field::SRC_ADDR].copy_from_slice(self.src.as_bytes());
        data[field::DST_ADDR].copy_from_slice(self.dst.as_bytes());
    }
}

impl Datagram {
    /// Create a datagram with a valid checksum.
    ///
    /// Fails with `Error::Malformed` if the payload is longer than `Header::MAX_PAYLOAD_LEN`.
    pub fn new(src: Address, dst: Address, protocol: u8, payload: Vec<u8>) -> Result<Self> {
        if payload.len() > Header::MAX_PAYLOAD_LEN {
            return Err(Error::Malformed);
        }

        let mut datagram = Datagram {
            header: Header {
                tos: 0,
                ident: 0,
                dont_frag: true,
                more_frags: false,
                frag_offset: 0,
                ttl: Header::DEFAULT_TTL,
                protocol,
                checksum: 0,
                src,
                dst,
            },
            payload,
        };
        datagram.compute_checksum();
        Ok(datagram)
    }

    /// Parse a datagram, verifying its header checksum.
    pub fn parse(data: &[u8]) -> Result<Datagram> {
        if data.len() < Header::LEN {
            return Err(Error::Truncated);
        }

        let ver_ihl = data[field::VER_IHL];
        if ver_ihl >> 4 != 4 {
            return Err(Error::Unrecognized);
        }

        let header_len = usize::from(ver_ihl & 0x0f) * 4;
        if header_len < Header::LEN {
            return Err(Error::Malformed);
        }
        if header_len > Header::LEN {
            // Options are not supported.
            return Err(Error::Unrecognized);
        }

        let total_len = usize::from(NetworkEndian::read_u16(&data[field::LENGTH]));
        if total_len < header_len {
            return Err(Error::Malformed);
        }
        if data.len() < total_len {
            return Err(Error::Truncated);
        }

        if checksum::data(&data[..header_len]) != !0 {
            return Err(Error::WrongChecksum);
        }

        let flags = NetworkEndian::read_u16(&data[field::FLG_OFF]);
        Ok(Datagram {
            header: Header {
                tos: data[field::DSCP_ECN],
                ident: NetworkEndian::read_u16(&data[field::IDENT]),
                dont_frag: flags & 0x4000 != 0,
                more_frags: flags & 0x2000 != 0,
                frag_offset: flags & 0x1fff,
                ttl: data[field::TTL],
                protocol: data[field::PROTOCOL],
                checksum: NetworkEndian::read_u16(&data[field::CHECKSUM]),
                src: Address::from_bytes(&data[field::SRC_ADDR]),
                dst: Address::from_bytes(&data[field::DST_ADDR]),
            },
            payload: data[header_len..total_len].to_vec(),
        })
    }

    /// Serialize the datagram with the checksum stored in its header.
    ///
    /// The payload must not exceed `Header::MAX_PAYLOAD_LEN`, the length field would wrap.
    pub fn serialize(&self) -> Vec<u8> {
        let mut data = vec![0; Header::LEN + self.payload.len()];
        self.header.emit(&mut data, self.payload.len());
        data[Header::LEN..].copy_from_slice(&self.payload);
        data
    }

    /// Recompute the header checksum, e.g. after the time to live was changed.
    pub fn compute_checksum(&mut self) {
        let mut data = [0; Header::LEN];
        self.header.checksum = 0;
        self.header.emit(&mut data, self.payload.len());
        self.header.checksum = !checksum::data(&data);
    }
}

impl fmt::Display for Datagram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "IPv4 src={} dst={} proto={} ttl={} len={}",
               self.header.src, self.header.dst, self.header.protocol,
               self.header.ttl, self.payload.len())
    }
}
