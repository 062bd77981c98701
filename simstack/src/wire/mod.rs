/*! Packet formats and their representation.

# An overview over packet representations

The `wire` module deals with the packet *representation* of the formats that cross the simulated
links. It parses sequences of octets into compact, owned structures and serializes them back.

 * [`ethernet`] frames carry either an address resolution message or an IPv4 datagram.
 * [`arp`] messages map IPv4 addresses to Ethernet addresses. Only the Ethernet/IPv4 flavour is
   recognized.
 * [`ipv4`] datagrams are routed hop by hop. Header options are not supported and the header
   checksum is verified on parsing.
 * [`tcp`] provides the wrapping sequence numbers and the segment descriptors passed between
   senders and receivers.

Parsing never panics on untrusted input. Everything that fails to parse yields an [`Error`] and
the layers drop such packets.

[`ethernet`]: ethernet/index.html
[`arp`]: arp/index.html
[`ipv4`]: ipv4/index.html
[`tcp`]: tcp/index.html
[`Error`]: enum.Error.html
*/
mod field {
    use core::ops;

    pub(crate) type Field = ops::Range<usize>;
    pub(crate) type Rest = ops::RangeFrom<usize>;
}

mod error;

pub mod arp;
pub mod ethernet;
pub mod ipv4;
pub mod tcp;

pub use self::error::{Error, Result};

pub use self::arp::{
    Operation as ArpOperation,
    Repr as ArpRepr};

pub use self::ethernet::{
    Address as EthernetAddress,
    EtherType,
    Frame as EthernetFrame,
    Header as EthernetHeader};

pub use self::ipv4::{
    Address as Ipv4Address,
    Datagram as Ipv4Datagram,
    Header as Ipv4Header};

pub use self::tcp::{
    Message as TcpMessage,
    ReceiverMessage as TcpReceiverMessage,
    SenderMessage as TcpSenderMessage,
    SeqNumber as TcpSeqNumber};

/// The internet checksum.
pub mod checksum {
    use byteorder::{ByteOrder, NetworkEndian};

    fn propagate_carries(word: u32) -> u16 {
        let sum = (word >> 16) + (word & 0xffff);
        ((sum >> 16) as u16) + (sum as u16)
    }

    /// Compute an RFC 1071 compliant checksum (without the final complement).
    ///
    /// Data containing a correct checksum field sums to `0xffff`.
    pub fn data(mut data: &[u8]) -> u16 {
        let mut accum = 0;

        // For each 32-byte chunk...
        const CHUNK_SIZE: usize = 32;
        while data.len() >= CHUNK_SIZE {
            let mut d = &data[..CHUNK_SIZE];
            // ... take by 2 bytes and sum them.
            while d.len() >= 2 {
                accum += u32::from(NetworkEndian::read_u16(d));
                d = &d[2..];
            }

            data = &data[CHUNK_SIZE..];
        }

        // Sum the rest that does not fit the last 32-byte chunk,
        // taking by 2 bytes.
        while data.len() >= 2 {
            accum += u32::from(NetworkEndian::read_u16(data));
            data = &data[2..];
        }

        // Add the last remaining odd byte, if any.
        if let Some(&value) = data.first() {
            accum += u32::from(value) << 8;
        }

        propagate_carries(accum)
    }

}
