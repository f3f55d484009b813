use crate::PingStatistics;
use std::net::Ipv4Addr;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PingOutcome {
    Reply { ping_duration: Duration },
    Timeout { timeout: Duration },
}

/// Result of one completed round, emitted once per round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PingOutput {
    pub ip_addr: Ipv4Addr,
    pub sequence_number: u16,
    pub outcome: PingOutcome,
    pub statistics: PingStatistics,
}

impl PingOutput {
    pub fn ping_duration(&self) -> Option<Duration> {
        match self.outcome {
            PingOutcome::Reply { ping_duration } => Some(ping_duration),
            PingOutcome::Timeout { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.outcome, PingOutcome::Timeout { .. })
    }
}

/// Receives the output of every completed round.
pub trait PingOutputSink {
    fn emit(&mut self, output: PingOutput);
}

impl<F> PingOutputSink for F
where
    F: FnMut(PingOutput),
{
    fn emit(&mut self, output: PingOutput) {
        self(output);
    }
}
