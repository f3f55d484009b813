use std::io;
use std::net::Ipv4Addr;

#[derive(Debug, thiserror::Error)]
pub enum PingError {
    /// A received datagram is too short to hold an echo header behind its network-layer prefix.
    #[error("short buffer: need {needed} bytes, got {actual}")]
    ShortBuffer { needed: usize, actual: usize },

    #[error("destination {0} is unreachable")]
    AddressUnreachable(Ipv4Addr),

    #[error("socket error: {0}")]
    Transport(#[from] io::Error),

    /// The session was halted while a round was in flight.
    #[error("timer cancelled")]
    TimerCancelled,
}

impl PingError {
    pub(crate) fn from_send_error(error: io::Error, destination: Ipv4Addr) -> Self {
        match error.kind() {
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable | io::ErrorKind::AddrNotAvailable => {
                PingError::AddressUnreachable(destination)
            }
            _ => PingError::Transport(error),
        }
    }
}
