use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};
use super::{EtherType, EthernetAddress, Ipv4Address};

enum_with_unknown! {
    /// ARP hardware type.
    pub enum Hardware(u16) {
        /// Ethernet, the only supported hardware.
        Ethernet = 1
    }
}

enum_with_unknown! {
    /// ARP operation type.
    pub enum Operation(u16) {
        /// Ask for the hardware address of the target.
        Request = 1,
        /// Answer with the hardware address of the sender.
        Reply = 2
    }
}

mod field {
    #![allow(non_snake_case)]

    use crate::wire::field::*;

    pub(crate) const HTYPE: Field = 0..2;
    pub(crate) const PTYPE: Field = 2..4;
    pub(crate) const HLEN: usize = 4;
    pub(crate) const PLEN: usize = 5;
    pub(crate) const OPER: Field = 6..8;

    // Offsets for Ethernet over IPv4, the only combination we parse.
    pub(crate) const SHA: Field = 8..14;
    pub(crate) const SPA: Field = 14..18;
    pub(crate) const THA: Field = 18..24;
    pub(crate) const TPA: Field = 24..28;
}

/// A high-level representation of an Ethernet/IPv4 Address Resolution Protocol message.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Repr {
    /// Request or reply.
    pub operation: Operation,
    /// Hardware address of the sender.
    pub source_hardware_addr: EthernetAddress,
    /// Protocol address of the sender.
    pub source_protocol_addr: Ipv4Address,
    /// Hardware address of the target, zero in requests.
    pub target_hardware_addr: EthernetAddress,
    /// Protocol address of the target.
    pub target_protocol_addr: Ipv4Address,
}

impl Repr {
    /// The length of an emitted message.
    pub const LEN: usize = field::TPA.end;

    /// Parse an Address Resolution Protocol message.
    ///
    /// Only Ethernet/IPv4 requests and replies are recognized.
    pub fn parse(data: &[u8]) -> Result<Repr> {
        if data.len() < field::OPER.end {
            return Err(Error::Truncated);
        }

        let hardware = Hardware::from(NetworkEndian::read_u16(&data[field::HTYPE]));
        let protocol = EtherType::from(NetworkEndian::read_u16(&data[field::PTYPE]));
        let operation = Operation::from(NetworkEndian::read_u16(&data[field::OPER]));

        match (hardware, protocol, data[field::HLEN], data[field::PLEN], operation) {
            (Hardware::Ethernet, EtherType::Ipv4, 6, 4, Operation::Request)
            | (Hardware::Ethernet, EtherType::Ipv4, 6, 4, Operation::Reply) => (),
            _ => return Err(Error::Unrecognized),
        }

        if data.len() < Self::LEN {
            return Err(Error::Truncated);
        }

        Ok(Repr {
            operation,
            source_hardware_addr: EthernetAddress::from_bytes(&data[field::SHA]),
            source_protocol_addr: Ipv4Address::from_bytes(&data[field::SPA]),
            target_hardware_addr: EthernetAddress::from_bytes(&data[field::THA]),
            target_protocol_addr: Ipv4Address::from_bytes(&data[field::TPA]),
        })
    }

    /// Emit the message into the first `Repr::LEN` octets of `data`.
    ///
    /// # Panics
    /// This function panics if `data` is shorter than `Repr::LEN`.
    pub fn emit(&self, data: &mut [u8]) {
        NetworkEndian::write_u16(&mut data[field::HTYPE], Hardware::Ethernet.into());
        NetworkEndian::write_u16(&mut data[field::PTYPE], EtherType::Ipv4.into());
        data[field::HLEN] = 6;
        data[field::PLEN] = 4;
        NetworkEndian::write_u16(&mut data[field::OPER], self.operation.into());
        data[field::SHA].copy_from_slice(self.source_hardware_addr.as_bytes());
        data[field::SPA].copy_from_slice(self.source_protocol_addr.as_bytes());
        data[field::THA].copy_from_slice(self.target_hardware_addr.as_bytes());
        data[field::TPA].copy_from_slice(self.target_protocol_addr.as_bytes());
    }

    /// Serialize the message into a fresh buffer.
    pub fn serialize(&self) -> Vec<u8> {
        let mut data = vec![0; Self::LEN];
        self.emit(&mut data);
        data
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ARP type=Ethernet+IPv4 src={}/{} tgt={}/{} op={:?}",
               self.source_hardware_addr, self.source_protocol_addr,
               self.target_hardware_addr, self.target_protocol_addr,
               self.operation)
    }
}
