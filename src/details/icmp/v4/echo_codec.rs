//! Wire format of the ICMPv4 echo header.
//!
//! Only the 8-byte header travels on the wire: type/code, checksum, identifier and sequence number, each a
//! big-endian 16-bit word. No payload is sent.

use crate::details::icmp::v4::SequenceNumber;
use crate::details::PingError;
use pnet_packet::icmp::echo_reply::EchoReplyPacket;

pub const ECHO_HEADER_LEN: usize = 8;

pub const ECHO_REPLY: u8 = 0;
pub const ECHO_REQUEST: u8 = 8;

// Index of the checksum word, skipped while summing.
const CHECKSUM_WORD: usize = 1;

/// Header fields of a decoded echo message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EchoMessage {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence_number: u16,
}

impl EchoMessage {
    pub fn is_reply(&self) -> bool {
        self.icmp_type == ECHO_REPLY
    }

    pub fn is_request(&self) -> bool {
        self.icmp_type == ECHO_REQUEST
    }

    /// Recomputes the checksum over the header with the checksum field zeroed.
    pub fn has_valid_checksum(&self) -> bool {
        let header = header_bytes(self.icmp_type, self.code, self.identifier, self.sequence_number);
        checksum(&header) == self.checksum
    }
}

/// Builds an echo request header with a valid checksum.
pub fn encode(identifier: u16, sequence_number: u16) -> [u8; ECHO_HEADER_LEN] {
    let mut header = header_bytes(ECHO_REQUEST, 0, identifier, sequence_number);
    let sum = checksum(&header);
    header[2..4].copy_from_slice(&sum.to_be_bytes());
    header
}

pub(crate) fn encode_request(identifier: u16, sequence_number: SequenceNumber) -> [u8; ECHO_HEADER_LEN] {
    encode(identifier, sequence_number.into())
}

/// Decodes the echo header of a captured datagram.
///
/// The datagram may start with an IPv4 header; its length is the low nibble of the first octet in 32-bit
/// words. A datagram from an ICMP datagram socket starts directly with the echo header, whose first octet
/// (the type) has a low nibble of zero for replies, so nothing is skipped. The checksum is not validated.
pub fn decode(buf: &[u8]) -> Result<EchoMessage, PingError> {
    let prefix_len = match buf.first() {
        Some(first) => usize::from(first & 0x0F) * 4,
        None => 0,
    };
    let needed = prefix_len + ECHO_HEADER_LEN;
    let short_buffer = PingError::ShortBuffer { needed, actual: buf.len() };
    if buf.len() < needed {
        return Err(short_buffer);
    }

    let packet = EchoReplyPacket::new(&buf[prefix_len..needed]).ok_or(short_buffer)?;
    Ok(EchoMessage {
        icmp_type: packet.get_icmp_type().0,
        code: packet.get_icmp_code().0,
        checksum: packet.get_checksum(),
        identifier: packet.get_identifier(),
        sequence_number: packet.get_sequence_number(),
    })
}

/// Internet checksum (RFC 1071) of an echo header, the checksum word taken as zero.
pub fn checksum(header: &[u8; ECHO_HEADER_LEN]) -> u16 {
    pnet_packet::util::checksum(header, CHECKSUM_WORD)
}

fn header_bytes(icmp_type: u8, code: u8, identifier: u16, sequence_number: u16) -> [u8; ECHO_HEADER_LEN] {
    let mut header = [0u8; ECHO_HEADER_LEN];
    header[0] = icmp_type;
    header[1] = code;
    header[4..6].copy_from_slice(&identifier.to_be_bytes());
    header[6..8].copy_from_slice(&sequence_number.to_be_bytes());
    header
}
