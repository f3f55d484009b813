use crate::SocketType;
use std::mem::MaybeUninit;
use std::net::IpAddr;
use std::{io, time::Duration};

use super::{DgramSocket, RawSocket};

pub(crate) mod dgram_socket;
pub(crate) mod raw_socket;

pub(crate) trait TSocket: Send + Sync {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)>;
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// The echo identifier the kernel writes into outgoing requests, if it overrides ours.
    fn local_identifier(&self) -> Option<u16> {
        None
    }
}

pub(crate) enum Socket {
    Raw(RawSocket),
    Dgram(DgramSocket),
}

impl Socket {
    pub(crate) fn new(socket_type: SocketType, identifier: u16) -> Result<Self, io::Error> {
        match socket_type {
            SocketType::DGRAM => Ok(Socket::Dgram(DgramSocket::new(identifier)?)),
            SocketType::RAW => Ok(Socket::Raw(RawSocket::new()?)),
        }
    }
}

impl TSocket for Socket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        match self {
            Socket::Dgram(socket) => socket.send_to(buf, addr),
            Socket::Raw(socket) => socket.send_to(buf, addr),
        }
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
        match self {
            Socket::Dgram(socket) => socket.recv_from(buf),
            Socket::Raw(socket) => socket.recv_from(buf),
        }
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            Socket::Dgram(socket) => socket.set_read_timeout(timeout),
            Socket::Raw(socket) => socket.set_read_timeout(timeout),
        }
    }

    fn local_identifier(&self) -> Option<u16> {
        match self {
            Socket::Dgram(socket) => socket.local_identifier(),
            Socket::Raw(socket) => socket.local_identifier(),
        }
    }
}

pub(super) fn recv_into(socket: &socket2::Socket, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
    // Socket2 gives a safety guaranty which allows us to do an unsafe cast from `&mut [u8]`
    // to `&mut [std::mem::MaybeUninit<u8>]`: it never writes uninitialized bytes into the buffer.
    // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
    let (n_bytes, socket_addr) =
        socket.recv_from(unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) })?;
    let ip_addr = socket_addr
        .as_socket()
        .map(|addr| addr.ip())
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "received from a non-IP address"))?;
    Ok((n_bytes, ip_addr))
}
