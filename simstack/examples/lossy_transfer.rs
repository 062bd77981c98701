//! Transfers bytes between two peers over a simulated lossy link.
//!
//! # Usage
//!
//! The example sends `len` random bytes from a client to a server. Every segment is dropped with
//! probability `loss` and otherwise delayed by up to `max_delay` milliseconds, so segments also
//! arrive out of order. The run is reproducible for a given `seed`.
//!
//!   > $ RUST_LOG=simstack=debug cargo run --example lossy_transfer -- 100000 0.1 40 7
//!
//! Retransmissions are logged at debug level.
use std::io::{stdout, Write};
use structopt::StructOpt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simstack::layer::tcp::{Config as TcpConfig, Peer};
use simstack::time::Duration;
use simstack::wire::TcpMessage;

const STEP: Duration = Duration::from_millis(1);

fn main() {
    env_logger::init();

    let Config {
        len,
        loss,
        max_delay,
        seed,
    } = Config::from_args();

    let mut rng = StdRng::seed_from_u64(seed);
    let tcp = TcpConfig {
        rto: Duration::from_millis(4 * max_delay.max(10)),
        .. TcpConfig::default()
    };
    let mut client = Peer::new(tcp);
    let mut server = Peer::new(tcp);

    let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
    let mut written = 0;
    let mut received = Vec::with_capacity(len);

    let mut now = 0u64;
    let mut to_server: Vec<(u64, TcpMessage)> = Vec::new();
    let mut to_client: Vec<(u64, TcpMessage)> = Vec::new();
    let (mut sent, mut dropped) = (0usize, 0usize);

    while !(client.is_finished() && server.is_finished()) {
        let outbound = client.outbound();
        let before = outbound.bytes_pushed();
        outbound.push(&data[written..]);
        written += (outbound.bytes_pushed() - before) as usize;
        if written == len {
            outbound.close();
        }
        server.outbound().close();

        client.push();
        server.push();
        for (peer, link) in vec![(&mut client, &mut to_server), (&mut server, &mut to_client)] {
            while let Some(message) = peer.maybe_send() {
                sent += 1;
                if rng.gen_bool(loss) {
                    dropped += 1;
                    continue;
                }
                link.push((now + rng.gen_range(0..=max_delay), message));
            }
        }

        now += STEP.as_millis() as u64;
        deliver(&mut to_server, now, &mut server);
        deliver(&mut to_client, now, &mut client);

        let inbound = server.inbound();
        let available = inbound.bytes_buffered();
        inbound.read_into(available, &mut received);

        client.tick(STEP);
        server.tick(STEP);
    }

    let out = stdout();
    let mut out = out.lock();
    writeln!(out, "transferred {} bytes in {}ms of simulated time", received.len(), now).unwrap();
    writeln!(out, "{} segments sent, {} dropped", sent, dropped).unwrap();
    writeln!(out, "intact: {}", received == data).unwrap();
}

fn deliver(link: &mut Vec<(u64, TcpMessage)>, now: u64, to: &mut Peer) {
    link.sort_by_key(|(arrival, _)| *arrival);
    let arrived = link.iter().take_while(|(arrival, _)| *arrival <= now).count();
    for (_, message) in link.drain(..arrived) {
        to.receive(message);
    }
}

#[derive(StructOpt)]
struct Config {
    len: usize,
    loss: f64,
    max_delay: u64,
    seed: u64,
}
