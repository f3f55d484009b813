use super::TSocket;
use socket2::{Domain, Protocol, Type};
use std::net::IpAddr;
use std::{io, time::Duration};

/// Unprivileged ICMP "ping socket". The kernel strips the IPv4 header and filters replies by identifier.
pub(crate) struct DgramSocket {
    socket: socket2::Socket,
    local_identifier: Option<u16>,
}

impl DgramSocket {
    pub(crate) fn new(identifier: u16) -> Result<Self, io::Error> {
        tracing::trace!("creating DgramSocket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::ICMPV4))?;
        // Linux rewrites the echo identifier to the local port of a ping socket. Port 0 lets the kernel pick
        // one, so the identifier is read back after binding.
        #[cfg(target_os = "linux")]
        let local_identifier = {
            let local = std::net::SocketAddrV4::new(std::net::Ipv4Addr::UNSPECIFIED, identifier);
            socket.bind(&local.into())?;
            socket.local_addr()?.as_socket_ipv4().map(|addr| addr.port())
        };
        #[cfg(not(target_os = "linux"))]
        let local_identifier = {
            let _ = identifier;
            None
        };
        Ok(DgramSocket { socket, local_identifier })
    }
}

impl TSocket for DgramSocket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
        super::recv_into(&self.socket, buf)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.socket.set_read_timeout(timeout)
    }

    fn local_identifier(&self) -> Option<u16> {
        self.local_identifier
    }
}
