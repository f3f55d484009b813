use ping_owl::{PingOutcome, PingOutput, PingOwlConfig, PingStatistics, SocketType};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

type GenericError = Box<dyn std::error::Error + Send + Sync + 'static>;

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug)]
struct Error {
    pub message: String,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "Error")?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[derive(argh::FromArgs)]
/// ping - send ICMP ECHO_REQUEST to a host and report round-trip statistics
struct Args {
    #[argh(option, short = 't', default = "5000")]
    /// number of milliseconds before a request times out (100 - 10000)
    timeout: u64,

    #[argh(option, short = 'i', default = "1000")]
    /// milliseconds between two requests
    interval: u64,

    #[argh(option, short = 'c')]
    /// stop after <count> rounds (default: until interrupted with Ctrl-C)
    count: Option<u64>,

    #[argh(switch)]
    /// use a raw socket instead of an ICMP datagram socket
    raw: bool,

    #[argh(switch, short = 'v')]
    /// log trace output
    verbose: bool,

    #[argh(positional)]
    /// IPv4 address or host name
    destination: String,
}

fn resolve(destination: &str) -> Result<Ipv4Addr, GenericError> {
    if let Ok(ip) = destination.parse::<Ipv4Addr>() {
        return Ok(ip);
    }
    let ips: Vec<IpAddr> = dns_lookup::lookup_host(destination)?;
    ips.into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(ipv4) => Some(ipv4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| {
            Error { message: format!("unable to resolve {destination} to an IPv4 address") }.into()
        })
}

fn to_milliseconds(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn print_statistics(statistics: &PingStatistics) {
    println!("{} packets transmitted, {:.3}% loss", statistics.total_sent, statistics.loss_percent());
    println!(
        "min/avg/max/median = {:.3}/{:.3}/{:.3}/{:.3} ms",
        to_milliseconds(statistics.min),
        to_milliseconds(statistics.average),
        to_milliseconds(statistics.max),
        to_milliseconds(statistics.median),
    );
}

fn print_output(output: PingOutput) {
    let PingOutput { ip_addr, sequence_number, outcome, statistics } = output;
    match outcome {
        PingOutcome::Reply { ping_duration } => {
            println!("{ip_addr}: seq={sequence_number}, time={:.3} ms", to_milliseconds(ping_duration));
        }
        PingOutcome::Timeout { timeout } => {
            println!("{ip_addr}: seq={sequence_number}, request timed out (>{} ms)", timeout.as_millis());
        }
    }
    print_statistics(&statistics);
    println!();
}

fn main() -> Result<(), GenericError> {
    let args: Args = argh::from_env();

    let max_level = if args.verbose { tracing::Level::TRACE } else { tracing::Level::WARN };
    let subscriber = tracing_subscriber::FmtSubscriber::builder().with_max_level(max_level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&args.timeout) {
        return Err(Error { message: format!("timeout must be within [{MIN_TIMEOUT_MS}, {MAX_TIMEOUT_MS}]") }.into());
    }

    let destination = resolve(&args.destination)?;
    tracing::trace!("resolved {} to {}", args.destination, destination);

    let config = PingOwlConfig {
        pacing_interval: Duration::from_millis(args.interval),
        socket_type: if args.raw { SocketType::RAW } else { SocketType::DGRAM },
        ..PingOwlConfig::new(Duration::from_millis(args.timeout))
    };

    let mut pinger = ping_owl::create(&config, destination).map_err(|e| {
        eprintln!("You may need to run this program as root");
        e
    })?;
    let halt_handle = pinger.halt_handle();
    ctrlc::set_handler(move || halt_handle.halt())?;

    let mut output = print_output;
    match args.count {
        Some(count) => pinger.run_rounds(count, &mut output)?,
        None => pinger.run(&mut output)?,
    }

    println!("--- {destination} ping statistics ---");
    print_statistics(&pinger.statistics().snapshot());
    Ok(())
}
