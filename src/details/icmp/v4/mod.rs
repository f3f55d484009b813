pub(crate) mod echo_codec;
pub(crate) use echo_codec::EchoMessage;

mod sequence_number;
pub(crate) use sequence_number::SequenceNumber;

mod socket;
pub(crate) use socket::dgram_socket::DgramSocket;
pub(crate) use socket::raw_socket::RawSocket;
pub(crate) use socket::Socket;
pub(crate) use socket::TSocket;

#[cfg(test)]
pub(crate) use socket::tests;
