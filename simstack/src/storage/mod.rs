//! Buffers that sit between the protocol layers and the application.
//!
//! A [`ByteStream`] is the flow-controlled pipe that carries application bytes into the sender
//! and out of the receiver. A [`Reassembler`] restores stream order for bytes that arrived out of
//! order before they enter such a pipe.
//!
//! [`ByteStream`]: struct.ByteStream.html
//! [`Reassembler`]: struct.Reassembler.html
pub mod assembler;
pub mod stream;

pub use self::assembler::Reassembler;
pub use self::stream::{ByteStream, Reader, Writer};
