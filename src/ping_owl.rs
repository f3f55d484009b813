use crate::details::icmp::v4::{Socket, TSocket};
use crate::details::{HaltHandle, PingResult, PingSession, Statistics};
use crate::{PingOutput, PingOutputSink};
use std::net::Ipv4Addr;
use std::time::Duration;

pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_millis(1000);

#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug)]
pub struct PingOwlConfig {
    /// How long to wait for the reply to a request. Bounding it to a sane range is up to the caller.
    pub timeout: Duration,
    /// Spacing between two consecutive requests.
    pub pacing_interval: Duration,
    /// Echo identifier of the session.
    pub identifier: u16,
    pub socket_type: SocketType,
    /// Drop replies whose checksum does not match their header.
    pub verify_checksum: bool,
}

impl PingOwlConfig {
    pub fn new(timeout: Duration) -> Self {
        PingOwlConfig {
            timeout,
            pacing_interval: DEFAULT_PACING_INTERVAL,
            identifier: default_identifier(),
            socket_type: SocketType::DGRAM,
            verify_checksum: true,
        }
    }
}

// The low 16 bits of the process id.
#[allow(clippy::cast_possible_truncation)]
fn default_identifier() -> u16 {
    std::process::id() as u16
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocketType {
    /// Unprivileged ICMP datagram socket (`net.ipv4.ping_group_range` on Linux).
    DGRAM,
    /// Raw ICMP socket; needs root or `CAP_NET_RAW`.
    RAW,
}

/// A ping session against one destination.
pub struct Pinger(PingSession<Socket>);

impl Pinger {
    /// Pings until halted through a [`HaltHandle`]. Returns an error only if the socket fails.
    pub fn run<O>(&mut self, output: &mut O) -> PingResult<()>
    where
        O: PingOutputSink,
    {
        self.0.run(output)
    }

    pub fn run_rounds<O>(&mut self, count: u64, output: &mut O) -> PingResult<()>
    where
        O: PingOutputSink,
    {
        self.0.run_rounds(count, output)
    }

    /// Runs a single round right away, without pacing.
    pub fn ping_once<O>(&mut self, output: &mut O) -> PingResult<PingOutput>
    where
        O: PingOutputSink,
    {
        self.0.ping_once(output)
    }

    pub fn halt_handle(&self) -> HaltHandle {
        self.0.halt_handle()
    }

    pub fn statistics(&self) -> &Statistics {
        self.0.statistics()
    }

    pub fn destination(&self) -> Ipv4Addr {
        self.0.destination()
    }

    pub fn identifier(&self) -> u16 {
        self.0.identifier()
    }
}

/// Opens the socket and creates a session for `destination`.
pub fn create(config: &PingOwlConfig, destination: Ipv4Addr) -> PingResult<Pinger> {
    let socket = Socket::new(config.socket_type, config.identifier)?;
    Ok(Pinger(create_with_socket(config, destination, socket)))
}

fn create_with_socket<S>(config: &PingOwlConfig, destination: Ipv4Addr, socket: S) -> PingSession<S>
where
    S: TSocket,
{
    let identifier = socket.local_identifier().unwrap_or(config.identifier);
    if identifier != config.identifier {
        tracing::debug!("socket overrides identifier {} with {}", config.identifier, identifier);
    }
    tracing::debug!("pinging {} with identifier {}", destination, identifier);
    PingSession::new(socket, destination, &PingOwlConfig { identifier, ..config.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::icmp::v4::tests::SocketMock;

    #[test]
    fn default_config() {
        let config = PingOwlConfig::new(Duration::from_millis(5000));
        assert_eq!(Duration::from_millis(5000), config.timeout);
        assert_eq!(Duration::from_secs(1), config.pacing_interval);
        assert_eq!(SocketType::DGRAM, config.socket_type);
        assert!(config.verify_checksum);
        assert_eq!(default_identifier(), config.identifier);
    }

    #[test]
    fn ping_localhost_succeeds() {
        let config = PingOwlConfig { identifier: 0x0102, ..PingOwlConfig::new(Duration::from_secs(1)) };
        let localhost = Ipv4Addr::new(127, 0, 0, 1);

        let mut pinger = create_with_socket(&config, localhost, SocketMock::new_default());
        let ping_output = pinger.ping_once(&mut |_: PingOutput| {});

        assert!(ping_output.is_ok());
        assert_eq!(localhost, pinger.destination());
        assert_eq!(0x0102, pinger.identifier());
        assert_eq!(1, pinger.statistics().received());
    }

    #[test]
    fn identifier_assigned_by_socket_is_adopted() {
        let config = PingOwlConfig { identifier: 0, ..PingOwlConfig::new(Duration::from_secs(1)) };
        let socket = SocketMock::new_default().with_local_identifier(41233);

        let mut pinger = create_with_socket(&config, Ipv4Addr::new(127, 0, 0, 1), socket.clone());
        let ping_output = pinger.ping_once(&mut |_: PingOutput| {}).unwrap();

        assert_eq!(41233, pinger.identifier());
        assert!(!ping_output.is_timeout());
        assert_eq!(1, pinger.statistics().received());
        socket.should_send_number_of_messages(1).should_receive_number_of_messages(1);
    }
}
