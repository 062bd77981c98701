use super::*;
use crate::time::Duration;
use crate::wire::{ArpOperation, ArpRepr, EtherType, EthernetAddress, EthernetFrame, EthernetHeader};
use crate::wire::{Ipv4Address, Ipv4Datagram, Ipv4Header};

const MAC_ADDR_HOST: EthernetAddress = EthernetAddress([0, 1, 2, 3, 4, 5]);
const IP_ADDR_HOST: Ipv4Address = Ipv4Address::new(10, 0, 0, 1);
const MAC_ADDR_OTHER: EthernetAddress = EthernetAddress([6, 5, 4, 3, 2, 1]);
const IP_ADDR_OTHER: Ipv4Address = Ipv4Address::new(10, 0, 0, 2);
const MAC_ADDR_THIRD: EthernetAddress = EthernetAddress([2, 2, 2, 2, 2, 2]);
const IP_ADDR_THIRD: Ipv4Address = Ipv4Address::new(10, 0, 0, 3);

fn datagram(payload: &[u8]) -> Ipv4Datagram {
    Ipv4Datagram::new(IP_ADDR_HOST, Ipv4Address::new(1, 2, 3, 4), Ipv4Header::PROTOCOL_TCP, payload.to_vec())
        .unwrap()
}

fn arp_frame(operation: ArpOperation, src: (EthernetAddress, Ipv4Address), target: Ipv4Address) -> EthernetFrame {
    let dst = match operation {
        ArpOperation::Request => EthernetAddress::BROADCAST,
        _ => MAC_ADDR_HOST,
    };

    EthernetFrame {
        header: EthernetHeader { dst, src: src.0, ethertype: EtherType::Arp },
        payload: ArpRepr {
            operation,
            source_hardware_addr: src.0,
            source_protocol_addr: src.1,
            target_hardware_addr: EthernetAddress::default(),
            target_protocol_addr: target,
        }.serialize(),
    }
}

fn expect_request(frame: Option<EthernetFrame>, target: Ipv4Address) {
    let frame = frame.expect("an ARP request");
    assert_eq!(frame.header.dst, EthernetAddress::BROADCAST);
    assert_eq!(frame.header.src, MAC_ADDR_HOST);
    assert_eq!(frame.header.ethertype, EtherType::Arp);

    let request = ArpRepr::parse(&frame.payload).unwrap();
    assert_eq!(request, ArpRepr {
        operation: ArpOperation::Request,
        source_hardware_addr: MAC_ADDR_HOST,
        source_protocol_addr: IP_ADDR_HOST,
        target_hardware_addr: EthernetAddress::default(),
        target_protocol_addr: target,
    });
}

fn expect_datagram(frame: Option<EthernetFrame>, dst: EthernetAddress, payload: &[u8]) {
    let frame = frame.expect("an IPv4 frame");
    assert_eq!(frame.header.dst, dst);
    assert_eq!(frame.header.src, MAC_ADDR_HOST);
    assert_eq!(frame.header.ethertype, EtherType::Ipv4);
    assert_eq!(Ipv4Datagram::parse(&frame.payload), Ok(datagram(payload)));
}

#[test]
fn resolves_before_sending() {
    let mut iface = Interface::new(MAC_ADDR_HOST, IP_ADDR_HOST);

    iface.send_datagram(datagram(b"first"), IP_ADDR_OTHER);
    expect_request(iface.maybe_send(), IP_ADDR_OTHER);
    assert_eq!(iface.maybe_send(), None);

    // Suppressed, a request is already on the way.
    iface.tick(Duration::from_millis(4_999));
    iface.send_datagram(datagram(b"second"), IP_ADDR_OTHER);
    assert_eq!(iface.maybe_send(), None);
    assert_eq!(iface.waiting(), 2);

    iface.recv_frame(&arp_frame(ArpOperation::Reply, (MAC_ADDR_OTHER, IP_ADDR_OTHER), IP_ADDR_HOST));
    expect_datagram(iface.maybe_send(), MAC_ADDR_OTHER, b"first");
    expect_datagram(iface.maybe_send(), MAC_ADDR_OTHER, b"second");
    assert_eq!(iface.maybe_send(), None);
    assert_eq!(iface.waiting(), 0);

    // Known now, sent right away.
    iface.send_datagram(datagram(b"third"), IP_ADDR_OTHER);
    expect_datagram(iface.maybe_send(), MAC_ADDR_OTHER, b"third");
}

#[test]
fn rerequests_after_silence() {
    let mut iface = Interface::new(MAC_ADDR_HOST, IP_ADDR_HOST);

    iface.send_datagram(datagram(b"first"), IP_ADDR_OTHER);
    expect_request(iface.maybe_send(), IP_ADDR_OTHER);

    iface.tick(Duration::from_millis(5_000));
    iface.send_datagram(datagram(b"second"), IP_ADDR_OTHER);
    expect_request(iface.maybe_send(), IP_ADDR_OTHER);
    assert_eq!(iface.waiting(), 2);
}

#[test]
fn releases_only_resolved() {
    let mut iface = Interface::new(MAC_ADDR_HOST, IP_ADDR_HOST);

    iface.send_datagram(datagram(b"to other"), IP_ADDR_OTHER);
    iface.send_datagram(datagram(b"to third"), IP_ADDR_THIRD);
    expect_request(iface.maybe_send(), IP_ADDR_OTHER);
    expect_request(iface.maybe_send(), IP_ADDR_THIRD);

    // An unsolicited request from the third host teaches us its address as well.
    iface.recv_frame(&arp_frame(ArpOperation::Request, (MAC_ADDR_THIRD, IP_ADDR_THIRD), IP_ADDR_OTHER));
    expect_datagram(iface.maybe_send(), MAC_ADDR_THIRD, b"to third");
    // Not for us, no reply.
    assert_eq!(iface.maybe_send(), None);
    assert_eq!(iface.waiting(), 1);
}

#[test]
fn answers_request() {
    let mut iface = Interface::new(MAC_ADDR_HOST, IP_ADDR_HOST);

    let request = arp_frame(ArpOperation::Request, (MAC_ADDR_OTHER, IP_ADDR_OTHER), IP_ADDR_HOST);
    assert_eq!(iface.recv_frame(&request), None);

    let reply = iface.maybe_send().expect("an ARP reply");
    assert_eq!(reply.header.dst, MAC_ADDR_OTHER);
    assert_eq!(reply.header.src, MAC_ADDR_HOST);
    assert_eq!(ArpRepr::parse(&reply.payload), Ok(ArpRepr {
        operation: ArpOperation::Reply,
        source_hardware_addr: MAC_ADDR_HOST,
        source_protocol_addr: IP_ADDR_HOST,
        target_hardware_addr: MAC_ADDR_OTHER,
        target_protocol_addr: IP_ADDR_OTHER,
    }));

    // The requester was learned on the way.
    assert_eq!(iface.cache().lookup(IP_ADDR_OTHER, iface.now()), Some(MAC_ADDR_OTHER));
    iface.send_datagram(datagram(b"data"), IP_ADDR_OTHER);
    expect_datagram(iface.maybe_send(), MAC_ADDR_OTHER, b"data");
}

#[test]
fn cache_entries_expire() {
    let mut iface = Interface::new(MAC_ADDR_HOST, IP_ADDR_HOST);
    iface.recv_frame(&arp_frame(ArpOperation::Reply, (MAC_ADDR_OTHER, IP_ADDR_OTHER), IP_ADDR_HOST));

    iface.tick(Duration::from_millis(29_999));
    iface.send_datagram(datagram(b"fresh"), IP_ADDR_OTHER);
    expect_datagram(iface.maybe_send(), MAC_ADDR_OTHER, b"fresh");

    iface.tick(Duration::from_millis(1));
    assert!(iface.cache().is_empty());
    iface.send_datagram(datagram(b"stale"), IP_ADDR_OTHER);
    expect_request(iface.maybe_send(), IP_ADDR_OTHER);
}

#[test]
fn receives_datagrams() {
    let mut iface = Interface::new(MAC_ADDR_HOST, IP_ADDR_HOST);
    let payload = datagram(b"payload");

    let mut frame = EthernetFrame {
        header: EthernetHeader { dst: MAC_ADDR_HOST, src: MAC_ADDR_OTHER, ethertype: EtherType::Ipv4 },
        payload: payload.serialize(),
    };
    assert_eq!(iface.recv_frame(&frame), Some(payload));

    // Not addressed to us.
    frame.header.dst = MAC_ADDR_THIRD;
    assert_eq!(iface.recv_frame(&frame), None);
    frame.header.dst = EthernetAddress::BROADCAST;
    assert_eq!(iface.recv_frame(&frame), None);

    // Corrupted.
    frame.header.dst = MAC_ADDR_HOST;
    frame.payload[8] ^= 0xff;
    assert_eq!(iface.recv_frame(&frame), None);

    // Truncated ARP is dropped without learning.
    let mut arp = arp_frame(ArpOperation::Reply, (MAC_ADDR_OTHER, IP_ADDR_OTHER), IP_ADDR_HOST);
    arp.payload.truncate(20);
    assert_eq!(iface.recv_frame(&arp), None);
    assert!(iface.cache().is_empty());
    assert_eq!(iface.maybe_send(), None);
}
