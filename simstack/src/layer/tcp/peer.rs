use super::{Config, Receiver, Sender};
use crate::storage::{ByteStream, Reader, Reassembler, Writer};
use crate::time::Duration;
use crate::wire::TcpMessage;

/// One endpoint of a full duplex connection.
///
/// Owns both byte streams of the connection. The application writes into [`outbound`] and reads
/// from [`inbound`], the peer moves the bytes in between through its [`Sender`] and [`Receiver`].
/// Every segment it emits carries the current acknowledgment of the inbound direction.
///
/// [`outbound`]: #method.outbound
/// [`inbound`]: #method.inbound
/// [`Sender`]: struct.Sender.html
/// [`Receiver`]: struct.Receiver.html
#[derive(Clone, Debug)]
pub struct Peer {
    outbound: ByteStream,
    inbound: ByteStream,
    reassembler: Reassembler,
    receiver: Receiver,
    sender: Sender,
    /// A segment occupying sequence numbers arrived and was not yet acknowledged.
    ack_pending: bool,
}

impl Peer {
    /// Create an endpoint with empty streams.
    pub fn new(config: Config) -> Self {
        Peer {
            outbound: ByteStream::new(config.send_capacity),
            inbound: ByteStream::new(config.recv_capacity),
            reassembler: Reassembler::new(),
            receiver: Receiver::new(),
            sender: Sender::new(&config),
            ack_pending: false,
        }
    }

    /// The stream of bytes to send.
    pub fn outbound(&mut self) -> &mut Writer {
        self.outbound.writer()
    }

    /// The stream of bytes received.
    pub fn inbound(&mut self) -> &mut Reader {
        self.inbound.reader()
    }

    /// The sending half.
    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    /// The receiving half.
    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Bytes received out of order and waiting for a gap to fill.
    pub fn bytes_pending(&self) -> u64 {
        self.reassembler.bytes_pending()
    }

    /// Process a segment from the remote.
    pub fn receive(&mut self, message: TcpMessage) {
        if message.sender.sequence_length() > 0 {
            self.ack_pending = true;
        }

        self.receiver.receive(&message.sender, &mut self.reassembler, self.inbound.writer());
        self.sender.receive(&message.receiver);
    }

    /// Segment as much of the outbound stream as the remote window allows.
    pub fn push(&mut self) {
        self.sender.push(self.outbound.reader());
    }

    /// Hand out the next segment.
    ///
    /// When no data segment is queued but received data still needs an acknowledgment, this is an
    /// empty segment.
    pub fn maybe_send(&mut self) -> Option<TcpMessage> {
        let sender = match self.sender.maybe_send() {
            Some(sender) => sender,
            None if self.ack_pending => self.sender.send_empty_message(),
            None => return None,
        };

        self.ack_pending = false;
        Some(TcpMessage {
            sender,
            receiver: self.receiver.send(&self.inbound),
        })
    }

    /// Advance the retransmission timer.
    pub fn tick(&mut self, elapsed: Duration) {
        self.sender.tick(elapsed);
    }

    /// If both directions are closed.
    ///
    /// The outbound direction must be acknowledged up to and including its FIN. The inbound
    /// direction must have been closed by the remote, bytes may still be left to read.
    pub fn is_finished(&self) -> bool {
        self.sender.is_finished() && self.inbound.is_closed()
    }

    /// If either stream suffered an unrecoverable error.
    pub fn has_error(&self) -> bool {
        self.outbound.has_error() || self.inbound.has_error()
    }
}
