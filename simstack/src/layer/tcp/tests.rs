//! Tcp layer tests.
//!
//! The sender and receiver are tested against hand-crafted segments. End-to-end transfers over a
//! lossy medium live in the integration tests of the crate.
use super::*;
use crate::storage::{ByteStream, Reassembler};
use crate::wire::{TcpMessage, TcpReceiverMessage, TcpSenderMessage, TcpSeqNumber};

const ISN: u32 = 1000;

fn config() -> Config {
    Config {
        rto: Duration::from_millis(100),
        isn: Some(TcpSeqNumber(ISN)),
        .. Config::default()
    }
}

fn segment(seqno: u32, syn: bool, payload: &[u8], fin: bool) -> TcpSenderMessage {
    TcpSenderMessage {
        seqno: TcpSeqNumber(seqno),
        syn,
        payload: payload.to_vec(),
        fin,
    }
}

fn ack(ackno: u32, window_size: u16) -> TcpReceiverMessage {
    TcpReceiverMessage {
        ackno: Some(TcpSeqNumber(ackno)),
        window_size,
    }
}

/// A sender that got its SYN acknowledged with the given window.
fn synchronized(stream: &mut ByteStream, window: u16) -> Sender {
    let mut sender = Sender::new(&config());
    sender.push(stream.reader());
    let syn = sender.maybe_send().expect("SYN is sent first");
    assert!(syn.syn);
    sender.receive(&ack(ISN + 1, window));
    assert_eq!(sender.sequence_numbers_in_flight(), 0);
    sender
}

#[test]
fn receiver_waits_for_syn() {
    let mut stream = ByteStream::new(10);
    let mut asm = Reassembler::new();
    let mut receiver = Receiver::new();

    assert_eq!(receiver.send(&stream), TcpReceiverMessage { ackno: None, window_size: 10 });

    receiver.receive(&segment(6, false, b"ab", false), &mut asm, stream.writer());
    assert_eq!(stream.bytes_pushed(), 0);
    assert_eq!(receiver.isn(), None);
    assert_eq!(receiver.send(&stream).ackno, None);

    receiver.receive(&segment(5, true, b"ab", false), &mut asm, stream.writer());
    assert_eq!(receiver.isn(), Some(TcpSeqNumber(5)));
    assert_eq!(stream.reader().peek(), b"ab");
    assert_eq!(receiver.send(&stream), ack(8, 8));
}

#[test]
fn receiver_reorders() {
    let mut stream = ByteStream::new(10);
    let mut asm = Reassembler::new();
    let mut receiver = Receiver::new();

    receiver.receive(&segment(5, true, b"ab", false), &mut asm, stream.writer());
    receiver.receive(&segment(10, false, b"ef", false), &mut asm, stream.writer());
    assert_eq!(stream.bytes_pushed(), 2);
    assert_eq!(asm.bytes_pending(), 2);
    assert_eq!(receiver.send(&stream), ack(8, 8));

    receiver.receive(&segment(8, false, b"cd", false), &mut asm, stream.writer());
    assert_eq!(stream.reader().peek(), b"abcdef");
    assert_eq!(receiver.send(&stream), ack(12, 4));

    // The FIN occupies one more sequence number.
    receiver.receive(&segment(12, false, b"", true), &mut asm, stream.writer());
    assert!(stream.is_closed());
    assert_eq!(receiver.send(&stream), ack(13, 4));
}

#[test]
fn receiver_drops_data_at_syn_slot() {
    let mut stream = ByteStream::new(10);
    let mut asm = Reassembler::new();
    let mut receiver = Receiver::new();

    receiver.receive(&segment(5, true, b"", false), &mut asm, stream.writer());
    receiver.receive(&segment(5, false, b"zz", false), &mut asm, stream.writer());
    assert_eq!(stream.bytes_pushed(), 0);
    assert_eq!(asm.bytes_pending(), 0);
    assert_eq!(receiver.send(&stream), ack(6, 10));
}

#[test]
fn receiver_wraps_around() {
    let mut stream = ByteStream::new(10);
    let mut asm = Reassembler::new();
    let mut receiver = Receiver::new();

    receiver.receive(&segment(u32::max_value(), true, b"", false), &mut asm, stream.writer());
    assert_eq!(receiver.send(&stream).ackno, Some(TcpSeqNumber(0)));

    receiver.receive(&segment(0, false, b"abc", true), &mut asm, stream.writer());
    assert_eq!(stream.reader().peek(), b"abc");
    assert!(stream.is_closed());
    assert_eq!(receiver.send(&stream).ackno, Some(TcpSeqNumber(4)));
}

#[test]
fn receiver_caps_window() {
    let stream = ByteStream::new(100_000);
    let receiver = Receiver::new();
    assert_eq!(receiver.send(&stream).window_size, Receiver::MAX_WINDOW);
}

#[test]
fn sender_starts_with_lone_syn() {
    let mut stream = ByteStream::new(100);
    stream.writer().push(b"abc");

    let mut sender = Sender::new(&config());
    assert_eq!(sender.isn(), TcpSeqNumber(ISN));
    sender.push(stream.reader());

    // The initial window only has room for the SYN.
    assert_eq!(sender.maybe_send(), Some(segment(ISN, true, b"", false)));
    assert_eq!(sender.maybe_send(), None);
    assert_eq!(sender.sequence_numbers_in_flight(), 1);

    // Pushing again does not repeat the SYN.
    sender.push(stream.reader());
    assert_eq!(sender.maybe_send(), None);

    sender.receive(&ack(ISN + 1, 10));
    sender.push(stream.reader());
    assert_eq!(sender.maybe_send(), Some(segment(ISN + 1, false, b"abc", false)));
    assert_eq!(sender.sequence_numbers_in_flight(), 3);
}

#[test]
fn sender_splits_at_payload_limit() {
    let mut stream = ByteStream::new(5000);
    stream.writer().push(&[0x55; 2500]);
    let mut sender = synchronized(&mut stream, 5000);

    sender.push(stream.reader());
    let sizes: Vec<_> = std::iter::from_fn(|| sender.maybe_send())
        .map(|segment| segment.payload.len())
        .collect();
    assert_eq!(sizes, [1000, 1000, 500]);
    assert_eq!(sender.sequence_numbers_in_flight(), 2500);
}

#[test]
fn sender_respects_window() {
    let mut stream = ByteStream::new(100);
    stream.writer().push(b"abcdefgh");
    let mut sender = synchronized(&mut stream, 3);

    sender.push(stream.reader());
    assert_eq!(sender.maybe_send(), Some(segment(ISN + 1, false, b"abc", false)));
    assert_eq!(sender.maybe_send(), None);

    // Partial acknowledgment opens the window by the acknowledged amount only.
    sender.receive(&ack(ISN + 3, 3));
    sender.push(stream.reader());
    assert_eq!(sender.maybe_send(), Some(segment(ISN + 4, false, b"de", false)));
    assert_eq!(sender.sequence_numbers_in_flight(), 3);
}

#[test]
fn fin_needs_room_in_window() {
    let mut stream = ByteStream::new(100);
    stream.writer().push(b"abc");
    stream.writer().close();
    let mut sender = synchronized(&mut stream, 3);

    sender.push(stream.reader());
    assert_eq!(sender.maybe_send(), Some(segment(ISN + 1, false, b"abc", false)));
    assert_eq!(sender.maybe_send(), None);

    sender.receive(&ack(ISN + 4, 1));
    sender.push(stream.reader());
    assert_eq!(sender.maybe_send(), Some(segment(ISN + 4, false, b"", true)));

    // Nothing is sent after the FIN.
    sender.receive(&ack(ISN + 5, 10));
    sender.push(stream.reader());
    assert_eq!(sender.maybe_send(), None);
    assert!(sender.is_finished());
}

#[test]
fn fin_piggybacks_on_data() {
    let mut stream = ByteStream::new(100);
    stream.writer().push(b"abc");
    stream.writer().close();
    let mut sender = synchronized(&mut stream, 10);

    sender.push(stream.reader());
    assert_eq!(sender.maybe_send(), Some(segment(ISN + 1, false, b"abc", true)));
    assert_eq!(sender.sequence_numbers_in_flight(), 4);
    assert!(!sender.is_finished());
}

#[test]
fn retransmission_backs_off() {
    let mut stream = ByteStream::new(100);
    let mut sender = Sender::new(&config());
    sender.push(stream.reader());
    let syn = sender.maybe_send().unwrap();

    sender.tick(Duration::from_millis(99));
    assert_eq!(sender.maybe_send(), None);
    sender.tick(Duration::from_millis(1));
    assert_eq!(sender.maybe_send(), Some(syn.clone()));
    assert_eq!(sender.consecutive_retransmissions(), 1);
    assert_eq!(sender.rto(), Duration::from_millis(200));

    sender.tick(Duration::from_millis(199));
    assert_eq!(sender.maybe_send(), None);
    sender.tick(Duration::from_millis(1));
    assert_eq!(sender.maybe_send(), Some(syn));
    assert_eq!(sender.consecutive_retransmissions(), 2);
    assert_eq!(sender.rto(), Duration::from_millis(400));

    // Retransmissions do not count twice.
    assert_eq!(sender.sequence_numbers_in_flight(), 1);

    sender.receive(&ack(ISN + 1, 10));
    assert_eq!(sender.consecutive_retransmissions(), 0);
    assert_eq!(sender.rto(), Duration::from_millis(100));
    assert_eq!(sender.sequence_numbers_in_flight(), 0);

    // The timer is stopped with nothing outstanding.
    sender.tick(Duration::from_millis(1000));
    assert_eq!(sender.maybe_send(), None);
}

#[test]
fn retransmits_oldest_only() {
    let mut stream = ByteStream::new(100);
    stream.writer().push(b"abcdef");
    let mut sender = synchronized(&mut stream, 10);

    sender.push(stream.reader());
    let first = sender.maybe_send().unwrap();
    assert_eq!(first.payload, b"abcdef");

    stream.writer().push(b"gh");
    sender.push(stream.reader());
    let second = sender.maybe_send().unwrap();
    assert_eq!(second.payload, b"gh");

    sender.tick(Duration::from_millis(100));
    assert_eq!(sender.maybe_send(), Some(first));
    assert_eq!(sender.maybe_send(), None);

    // Acknowledging the first segment leaves the second outstanding and resets the timer.
    sender.receive(&ack(ISN + 7, 10));
    assert_eq!(sender.sequence_numbers_in_flight(), 2);
    assert_eq!(sender.rto(), Duration::from_millis(100));
    sender.tick(Duration::from_millis(99));
    assert_eq!(sender.maybe_send(), None);
    sender.tick(Duration::from_millis(1));
    assert_eq!(sender.maybe_send(), Some(second));
}

#[test]
fn stale_retransmission_keeps_timer_stopped() {
    let mut stream = ByteStream::new(100);
    stream.writer().push(b"abc");
    let mut sender = synchronized(&mut stream, 10);

    sender.push(stream.reader());
    let first = sender.maybe_send().unwrap();
    sender.tick(Duration::from_millis(100));

    // The copy is still queued when the original gets acknowledged.
    sender.receive(&ack(ISN + 4, 10));
    assert_eq!(sender.sequence_numbers_in_flight(), 0);
    assert_eq!(sender.maybe_send(), Some(first));
    sender.tick(Duration::from_millis(150));

    // A fresh segment gets a full timeout.
    stream.writer().push(b"de");
    sender.push(stream.reader());
    let second = sender.maybe_send().unwrap();
    assert_eq!(second.payload, b"de");

    sender.tick(Duration::from_millis(1));
    assert_eq!(sender.maybe_send(), None);
    sender.tick(Duration::from_millis(98));
    assert_eq!(sender.maybe_send(), None);
    assert_eq!(sender.consecutive_retransmissions(), 0);
    assert_eq!(sender.rto(), Duration::from_millis(100));

    sender.tick(Duration::from_millis(1));
    assert_eq!(sender.maybe_send(), Some(second));
    assert_eq!(sender.consecutive_retransmissions(), 1);
}

#[test]
fn zero_window_probe_does_not_back_off() {
    let mut stream = ByteStream::new(100);
    stream.writer().push(b"ab");
    let mut sender = synchronized(&mut stream, 0);

    sender.push(stream.reader());
    assert_eq!(sender.maybe_send(), Some(segment(ISN + 1, false, b"a", false)));
    assert_eq!(sender.maybe_send(), None);

    sender.tick(Duration::from_millis(100));
    assert_eq!(sender.maybe_send(), Some(segment(ISN + 1, false, b"a", false)));
    assert_eq!(sender.consecutive_retransmissions(), 0);
    assert_eq!(sender.rto(), Duration::from_millis(100));

    sender.receive(&ack(ISN + 2, 5));
    sender.push(stream.reader());
    assert_eq!(sender.maybe_send(), Some(segment(ISN + 2, false, b"b", false)));
}

#[test]
fn sender_ignores_impossible_acks() {
    let mut stream = ByteStream::new(100);
    let mut sender = Sender::new(&config());
    sender.push(stream.reader());
    sender.maybe_send().unwrap();

    // Acknowledges a sequence number never sent.
    sender.receive(&ack(ISN + 2, 10));
    assert_eq!(sender.sequence_numbers_in_flight(), 1);

    sender.receive(&ack(ISN + 1, 10));
    assert_eq!(sender.sequence_numbers_in_flight(), 0);

    // Regresses, the window of this message is ignored as well.
    sender.receive(&ack(ISN, 0));
    stream.writer().push(b"abc");
    sender.push(stream.reader());
    assert_eq!(sender.maybe_send(), Some(segment(ISN + 1, false, b"abc", false)));
}

#[test]
fn empty_message_has_next_seqno() {
    let mut stream = ByteStream::new(100);
    stream.writer().push(b"abc");
    let mut sender = synchronized(&mut stream, 10);
    sender.push(stream.reader());
    sender.maybe_send().unwrap();

    assert_eq!(sender.send_empty_message(), segment(ISN + 4, false, b"", false));
    // Empty messages are not tracked.
    assert_eq!(sender.sequence_numbers_in_flight(), 3);
}

#[test]
fn random_isn() {
    let config = Config::default();
    let isns: Vec<_> = (0..8).map(|_| Sender::new(&config).isn()).collect();
    assert!(isns.iter().any(|isn| *isn != isns[0]));
}

#[test]
fn peer_acknowledges_data() {
    let mut client = Peer::new(config());
    let mut server = Peer::new(Config { isn: Some(TcpSeqNumber(7)), .. config() });

    client.push();
    let syn = client.maybe_send().unwrap();
    assert!(syn.sender.syn);
    assert_eq!(syn.receiver.ackno, None);
    server.receive(syn);

    // The server has nothing to say but must acknowledge, along with its own SYN.
    server.push();
    let syn_ack = server.maybe_send().unwrap();
    assert!(syn_ack.sender.syn);
    assert_eq!(syn_ack.receiver.ackno, Some(TcpSeqNumber(ISN + 1)));
    assert_eq!(server.maybe_send(), None);
    client.receive(syn_ack);

    // A pure acknowledgment of the server's SYN.
    assert_eq!(client.maybe_send(), Some(TcpMessage {
        sender: segment(ISN + 1, false, b"", false),
        receiver: ack(8, Config::DEFAULT_CAPACITY as u16),
    }));
    assert_eq!(client.maybe_send(), None);
}

#[test]
fn peer_finishes() {
    let mut client = Peer::new(config());
    let mut server = Peer::new(config());
    client.outbound().push(b"ping");
    client.outbound().close();
    server.outbound().push(b"pong");
    server.outbound().close();

    for _ in 0..8 {
        client.push();
        while let Some(segment) = client.maybe_send() {
            server.receive(segment);
        }
        server.push();
        while let Some(segment) = server.maybe_send() {
            client.receive(segment);
        }
    }

    assert_eq!(client.inbound().peek(), b"pong");
    assert_eq!(server.inbound().peek(), b"ping");
    assert!(client.is_finished());
    assert!(server.is_finished());
    assert!(!client.has_error());

    client.inbound().set_error();
    assert!(client.has_error());
}
