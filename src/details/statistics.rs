use std::time::Duration;

/// Running statistics of a ping session: every observed round-trip latency and the number of timeouts.
///
/// Latencies are kept sorted (duplicates allowed) so min, max and median are plain lookups. Nothing is
/// ever removed.
#[derive(Clone, Debug, Default)]
pub struct Statistics {
    latencies: Vec<Duration>,
    latency_sum: Duration,
    timeouts: u64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_latency(&mut self, latency: Duration) {
        let idx = self.latencies.partition_point(|l| *l <= latency);
        self.latencies.insert(idx, latency);
        self.latency_sum = self.latency_sum.saturating_add(latency);
    }

    pub fn record_timeout(&mut self) {
        self.timeouts += 1;
    }

    pub fn received(&self) -> u64 {
        self.latencies.len() as u64
    }

    pub fn timeouts(&self) -> u64 {
        self.timeouts
    }

    pub fn total_sent(&self) -> u64 {
        self.received() + self.timeouts
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn loss_ratio(&self) -> f64 {
        match self.total_sent() {
            0 => 0.0,
            total_sent => self.timeouts as f64 / total_sent as f64,
        }
    }

    pub fn min(&self) -> Duration {
        self.latencies.first().copied().unwrap_or_default()
    }

    pub fn max(&self) -> Duration {
        self.latencies.last().copied().unwrap_or_default()
    }

    pub fn average(&self) -> Duration {
        match self.latencies.len() {
            0 => Duration::ZERO,
            n => {
                let nanos = self.latency_sum.as_nanos() / n as u128;
                Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
            }
        }
    }

    pub fn median(&self) -> Duration {
        let n = self.latencies.len();
        match n {
            0 => Duration::ZERO,
            _ if n % 2 == 1 => self.latencies[n / 2],
            _ => (self.latencies[n / 2 - 1] + self.latencies[n / 2]) / 2,
        }
    }

    pub fn snapshot(&self) -> PingStatistics {
        PingStatistics {
            total_sent: self.total_sent(),
            received: self.received(),
            timeouts: self.timeouts,
            loss_ratio: self.loss_ratio(),
            min: self.min(),
            average: self.average(),
            max: self.max(),
            median: self.median(),
        }
    }
}

/// Point-in-time copy of [`Statistics`], handed out with every ping output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PingStatistics {
    pub total_sent: u64,
    pub received: u64,
    pub timeouts: u64,
    pub loss_ratio: f64,
    pub min: Duration,
    pub average: Duration,
    pub max: Duration,
    pub median: Duration,
}

impl PingStatistics {
    pub fn loss_percent(&self) -> f64 {
        self.loss_ratio * 100.0
    }
}
