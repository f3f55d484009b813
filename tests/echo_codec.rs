use ping_owl::echo_codec::{self, ECHO_HEADER_LEN, ECHO_REQUEST};
use ping_owl::{PingError, Statistics};
use std::time::Duration;

#[test]
fn encoded_request_is_a_bare_header() {
    let request = echo_codec::encode(0x4242, 17);
    assert_eq!(ECHO_HEADER_LEN, request.len());
    assert_eq!(ECHO_REQUEST, request[0]);
    assert_eq!(0, request[1]);
}

#[test]
fn captured_request_decodes_behind_ipv4_header() {
    let mut datagram = vec![0x46, 0, 0, 0, 0, 0, 0, 0, 64, 1, 0, 0, 10, 0, 0, 1, 10, 0, 0, 2, 0, 0, 0, 0];
    datagram.extend_from_slice(&echo_codec::encode(0x4242, 17));

    let message = echo_codec::decode(&datagram).unwrap();

    assert!(message.is_request());
    assert_eq!(0x4242, message.identifier);
    assert_eq!(17, message.sequence_number);
    assert!(message.has_valid_checksum());
}

#[test]
fn short_datagram_is_rejected() {
    let result = echo_codec::decode(&[0x45, 0x00, 0x00]);
    assert!(matches!(result, Err(PingError::ShortBuffer { needed: 28, actual: 3 })));
}

#[test]
fn statistics_over_public_api() {
    let mut statistics = Statistics::new();
    for millis in [10, 20, 30] {
        statistics.record_latency(Duration::from_millis(millis));
    }
    statistics.record_timeout();

    let snapshot = statistics.snapshot();
    assert_eq!(4, snapshot.total_sent);
    assert_eq!(25.0, snapshot.loss_percent());
    assert_eq!(Duration::from_millis(20), snapshot.average);
    assert_eq!(Duration::from_millis(20), snapshot.median);
}
