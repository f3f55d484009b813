use ping_owl::{PingOutcome, PingOutput, PingOwlConfig, SocketType};
use std::net::Ipv4Addr;
use std::sync::Once;
use std::time::Duration;

use more_asserts as ma;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

static SETUP: Once = Once::new();

fn setup() {
    SETUP.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    });
}

/*
* Note: Datagram ICMP sockets need the group of the user in net.ipv4.ping_group_range.
*/
#[test]
#[ignore = "needs permission to open an ICMP datagram socket"]
fn test_ping_to_localhost_with_dgram_socket() {
    setup();

    let localhost = Ipv4Addr::new(127, 0, 0, 1);
    let config = PingOwlConfig { pacing_interval: Duration::ZERO, ..PingOwlConfig::new(Duration::from_secs(1)) };

    let mut pinger = ping_owl::create(&config, localhost).unwrap();
    let output = pinger.ping_once(&mut |_: PingOutput| {}).unwrap();

    assert_eq!(localhost, output.ip_addr);
    assert_eq!(0, output.sequence_number);
    if let PingOutcome::Reply { ping_duration } = output.outcome {
        ma::assert_gt!(ping_duration, Duration::from_secs(0));
    } else {
        panic!("ping to localhost timed out");
    }
}

#[test]
#[ignore = "needs permission to open an ICMP datagram socket"]
fn test_multiple_rounds_to_localhost_with_dgram_socket() {
    setup();

    let localhost = Ipv4Addr::new(127, 0, 0, 1);
    let config = PingOwlConfig {
        pacing_interval: Duration::from_millis(10),
        socket_type: SocketType::DGRAM,
        ..PingOwlConfig::new(Duration::from_secs(1))
    };

    let mut pinger = ping_owl::create(&config, localhost).unwrap();
    let mut outputs = vec![];
    pinger.run_rounds(3, &mut |output: PingOutput| outputs.push(output)).unwrap();

    assert_eq!(3, outputs.len());
    assert_eq!(3, pinger.statistics().total_sent());
    assert_eq!(0.0, pinger.statistics().loss_ratio());
    ma::assert_le!(pinger.statistics().min(), pinger.statistics().median());
    ma::assert_le!(pinger.statistics().median(), pinger.statistics().max());
}
