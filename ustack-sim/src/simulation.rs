use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use ustack::layer::eth::Interface;
use ustack::layer::ip::Router;
use ustack::nic::Queue;
use ustack::time::Duration;
use ustack::wire::{EthernetAddress, EthernetFrame, Ipv4Address, TcpSeqNumber};

use crate::config::Config;
use crate::{Error, Host, Peer, Score};

const MAC_A: EthernetAddress = EthernetAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x0a]);
const MAC_B: EthernetAddress = EthernetAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x0b]);
const MAC_ROUTER_A: EthernetAddress = EthernetAddress([0x02, 0x00, 0x00, 0x00, 0x01, 0x00]);
const MAC_ROUTER_B: EthernetAddress = EthernetAddress([0x02, 0x00, 0x00, 0x00, 0x01, 0x01]);

const IP_A: Ipv4Address = Ipv4Address::new(10, 0, 0, 2);
const IP_B: Ipv4Address = Ipv4Address::new(10, 0, 1, 2);
const IP_ROUTER_A: Ipv4Address = Ipv4Address::new(10, 0, 0, 1);
const IP_ROUTER_B: Ipv4Address = Ipv4Address::new(10, 0, 1, 1);

const PORT_A: u16 = 40000;
const PORT_B: u16 = 5001;

/// Which side of a link a frame is put on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    A,
    B,
}

/// Two hosts exchanging data through a router, advanced in fixed steps.
///
/// Host A writes the data and then closes its stream. Host B only reads, its own outbound
/// stream is closed right away. Each link between a host and the router loses frames with the
/// configured probability, in both directions.
#[derive(Debug)]
pub struct Simulation {
    host_a: Host,
    host_b: Host,
    router: Router<Queue>,
    rng: StdRng,
    loss: f64,
    tick: Duration,
    time_limit: Duration,
    max_retransmissions: u64,

    data: Vec<u8>,
    /// Bytes of `data` written into the stream of host A.
    written: usize,
    /// Bytes read by host B, all equal to the prefix of `data`.
    read: usize,

    elapsed: Duration,
    frames: u64,
    frames_lost: u64,
}

impl Simulation {
    /// Set up the network and generate the data to transfer.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut data = vec![0; config.bytes];
        rng.fill(&mut data[..]);

        let tcp = config.tcp();
        let peer_a = Peer::new(TcpSeqNumber(rng.gen()), PORT_A, PORT_B, &tcp);
        let peer_b = Peer::new(TcpSeqNumber(rng.gen()), PORT_B, PORT_A, &tcp);

        let host_a = Host::new(
            Interface::new("host-a", Queue::new(), MAC_A, IP_A),
            IP_ROUTER_A,
            IP_B,
            peer_a);
        let mut host_b = Host::new(
            Interface::new("host-b", Queue::new(), MAC_B, IP_B),
            IP_ROUTER_B,
            IP_A,
            peer_b);
        host_b.peer_mut().sender_mut().writer().close();

        let mut router = Router::new();
        let to_a = router.add_interface(Interface::new("router-a", Queue::new(), MAC_ROUTER_A, IP_ROUTER_A));
        let to_b = router.add_interface(Interface::new("router-b", Queue::new(), MAC_ROUTER_B, IP_ROUTER_B));
        router.add_route(Ipv4Address::new(10, 0, 0, 0), 24, None, to_a)?;
        router.add_route(Ipv4Address::new(10, 0, 1, 0), 24, None, to_b)?;

        debug!(bytes = data.len(), ?tcp, "network ready");

        Ok(Simulation {
            host_a,
            host_b,
            router,
            rng,
            loss: config.loss,
            tick: config.tick(),
            time_limit: config.time_limit(),
            max_retransmissions: tcp.max_retransmissions,
            data,
            written: 0,
            read: 0,
            elapsed: Duration::from_millis(0),
            frames: 0,
            frames_lost: 0,
        })
    }

    /// Step until the transfer completes or fails.
    pub fn run(mut self) -> Result<Score, Error> {
        info!("starting transfer");
        loop {
            if let Some(score) = self.step()? {
                info!(elapsed_ms = score.elapsed_ms, retransmissions = score.retransmissions, "transfer complete");
                return Ok(score);
            }
        }
    }

    /// Advance the whole network by one tick.
    ///
    /// Returns the score once the transfer is complete, and `None` while it is ongoing.
    pub fn step(&mut self) -> Result<Option<Score>, Error> {
        self.write();
        self.host_a.push();
        self.host_b.push();

        self.carry(Side::A);
        self.carry(Side::B);
        self.router.route();
        self.carry(Side::A);
        self.carry(Side::B);

        self.read()?;
        self.check()?;
        if let Some(score) = self.score() {
            return Ok(Some(score));
        }

        self.elapsed += self.tick;
        if self.elapsed > self.time_limit {
            return Err(Error::Timeout { elapsed: self.elapsed });
        }

        self.router.tick(self.tick);
        self.host_a.tick(self.tick);
        self.host_b.tick(self.tick);
        Ok(None)
    }

    /// Write as much of the data into host A as its stream takes.
    fn write(&mut self) {
        let mut sender = self.host_a.peer_mut().sender_mut().writer();
        if sender.is_closed() {
            return;
        }

        self.written += sender.push(&self.data[self.written..]);
        if self.written == self.data.len() {
            trace!("all data written");
            sender.close();
        }
    }

    /// Move frames in both directions of the link between a host and the router.
    fn carry(&mut self, side: Side) {
        let (host, index) = match side {
            Side::A => (&mut self.host_a, 0),
            Side::B => (&mut self.host_b, 1),
        };

        let interface = match self.router.interface_mut(index) {
            Some(interface) => interface,
            None => return,
        };

        for frame in host.take_frames() {
            if lose(&mut self.rng, self.loss, &mut self.frames, &mut self.frames_lost, &frame) {
                continue;
            }
            interface.recv_frame(&frame);
        }

        let frames: Vec<_> = interface.port_mut().drain().collect();
        for frame in frames {
            if lose(&mut self.rng, self.loss, &mut self.frames, &mut self.frames_lost, &frame) {
                continue;
            }
            host.recv_frame(&frame);
        }
    }

    /// Read everything host B received and compare it to the data.
    fn read(&mut self) -> Result<(), Error> {
        let mut received = Vec::new();
        self.host_b.peer_mut().receiver_mut().reader().read_to_end(&mut received);
        // Host B never writes, but its FIN still has to be consumed.
        self.host_a.peer_mut().receiver_mut().reader().read_to_end(&mut Vec::new());

        let expected = self.data.get(self.read..).unwrap_or(&[]);
        let matching = received.iter()
            .zip(expected)
            .take_while(|(got, want)| got == want)
            .count();
        if matching != received.len() {
            return Err(Error::Mismatch { offset: (self.read + matching) as u64 });
        }

        self.read += received.len();
        Ok(())
    }

    /// Fail on a reset or a host that would give up.
    fn check(&self) -> Result<(), Error> {
        for host in [&self.host_a, &self.host_b] {
            let peer = host.peer();
            if peer.sender().stream().has_error() || peer.receiver().stream().has_error() {
                return Err(Error::Reset { host: host.name().to_owned() });
            }

            let retransmissions = peer.sender().consecutive_retransmissions();
            if retransmissions > self.max_retransmissions {
                return Err(Error::Aborted { host: host.name().to_owned(), retransmissions });
            }
        }

        Ok(())
    }

    /// The score, if both directions are closed and acknowledged.
    fn score(&self) -> Option<Score> {
        let (a, b) = (self.host_a.peer(), self.host_b.peer());
        let done = a.receiver().stream().is_finished()
            && b.receiver().stream().is_finished()
            && self.read == self.data.len()
            && a.sender().sequence_numbers_in_flight() == 0
            && b.sender().sequence_numbers_in_flight() == 0;
        if !done {
            return None;
        }

        Some(Score {
            bytes: self.read as u64,
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
            segments: a.segments() + b.segments(),
            retransmissions: a.retransmissions() + b.retransmissions(),
            frames: self.frames,
            frames_lost: self.frames_lost,
        })
    }

    /// Simulated time so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Host A, the writing side.
    pub fn host_a(&self) -> &Host {
        &self.host_a
    }

    /// Host B, the reading side.
    pub fn host_b(&self) -> &Host {
        &self.host_b
    }

    /// The router between the hosts.
    pub fn router(&self) -> &Router<Queue> {
        &self.router
    }
}

fn lose(rng: &mut StdRng, loss: f64, frames: &mut u64, lost: &mut u64, frame: &EthernetFrame) -> bool {
    *frames += 1;
    if loss > 0.0 && rng.gen_bool(loss) {
        trace!(%frame, "frame lost");
        *lost += 1;
        return true;
    }
    false
}
