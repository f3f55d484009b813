#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub use details::{HaltHandle, PingError, PingResult, PingStatistics, Statistics};
pub use ping_output::*;
pub use ping_owl::*;

/// Encoding and decoding of ICMPv4 echo headers.
pub mod echo_codec {
    pub use crate::details::icmp::v4::echo_codec::{
        checksum, decode, encode, EchoMessage, ECHO_HEADER_LEN, ECHO_REPLY, ECHO_REQUEST,
    };
}

mod details;
mod ping_output;
mod ping_owl;
