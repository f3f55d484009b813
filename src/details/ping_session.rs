use crate::details::icmp::v4::{echo_codec, EchoMessage, SequenceNumber, TSocket};
use crate::details::{PingError, PingResult, Statistics};
use crate::{PingOutcome, PingOutput, PingOutputSink, PingOwlConfig};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::mpsc;
use std::time::{Duration, Instant};

const RECV_BUFFER_LEN: usize = 128;
// Upper bound of a single blocking receive, so a halt request is noticed while a round is in flight.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
// A zero read timeout would block forever.
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RoundState {
    Idle,
    Sent {
        sequence_number: SequenceNumber,
        send_time: Instant,
        deadline: Instant,
    },
    // The guard against counting a round twice: once resolved, neither a late reply nor the timer changes
    // anything until the next request is sent.
    Resolved {
        sequence_number: SequenceNumber,
        next_send: Instant,
    },
}

enum SessionEvent {
    Datagram { len: usize, receive_time: Instant },
    TimerFired,
}

#[derive(Clone)]
pub struct HaltHandle(mpsc::Sender<()>);

impl HaltHandle {
    /// Stops the session at its next suspension point. A round in flight is abandoned.
    pub fn halt(&self) {
        // mpsc::Sender::send() returns error only if the session is already gone.
        let _ = self.0.send(());
    }
}

pub(crate) struct PingSession<S> {
    socket: S,
    destination: Ipv4Addr,
    identifier: u16,
    timeout: Duration,
    pacing_interval: Duration,
    verify_checksum: bool,
    sequence_number: SequenceNumber,
    round: RoundState,
    statistics: Statistics,
    halted: bool,
    halt_tx: mpsc::Sender<()>,
    halt_rx: mpsc::Receiver<()>,
}

impl<S> PingSession<S>
where
    S: TSocket,
{
    pub(crate) fn new(socket: S, destination: Ipv4Addr, config: &PingOwlConfig) -> Self {
        let (halt_tx, halt_rx) = mpsc::channel::<()>();
        PingSession {
            socket,
            destination,
            identifier: config.identifier,
            timeout: config.timeout,
            pacing_interval: config.pacing_interval,
            verify_checksum: config.verify_checksum,
            sequence_number: SequenceNumber::start_value(),
            round: RoundState::Idle,
            statistics: Statistics::new(),
            halted: false,
            halt_tx,
            halt_rx,
        }
    }

    pub(crate) fn destination(&self) -> Ipv4Addr {
        self.destination
    }

    pub(crate) fn identifier(&self) -> u16 {
        self.identifier
    }

    pub(crate) fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub(crate) fn halt_handle(&self) -> HaltHandle {
        HaltHandle(self.halt_tx.clone())
    }

    /// Pings until halted. Returns an error only if the socket fails.
    pub(crate) fn run<O>(&mut self, output: &mut O) -> PingResult<()>
    where
        O: PingOutputSink,
    {
        loop {
            if !self.wait_for_next_send() {
                return Ok(());
            }
            match self.ping_once(output) {
                Ok(_) => {}
                Err(PingError::TimerCancelled) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// Pings `count` rounds, or fewer if halted.
    pub(crate) fn run_rounds<O>(&mut self, count: u64, output: &mut O) -> PingResult<()>
    where
        O: PingOutputSink,
    {
        for _ in 0..count {
            if !self.wait_for_next_send() {
                break;
            }
            match self.ping_once(output) {
                Ok(_) => {}
                Err(PingError::TimerCancelled) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// One round: send a request, then wait for the matching reply or the timeout, whichever comes first.
    /// Does not pace.
    pub(crate) fn ping_once<O>(&mut self, output: &mut O) -> PingResult<PingOutput>
    where
        O: PingOutputSink,
    {
        let deadline = self.send_request()?;
        let mut buf = [0u8; RECV_BUFFER_LEN];
        loop {
            let resolved = match self.next_event(deadline, &mut buf)? {
                SessionEvent::Datagram { len, receive_time } => self.on_datagram(&buf[..len], receive_time),
                SessionEvent::TimerFired => self.on_timer_fired(),
            };
            if let Some(ping_output) = resolved {
                output.emit(ping_output);
                return Ok(ping_output);
            }
        }
    }

    fn send_request(&mut self) -> PingResult<Instant> {
        let sequence_number = self.sequence_number;
        let request = echo_codec::encode_request(self.identifier, sequence_number);
        let addr: socket2::SockAddr = SocketAddr::V4(SocketAddrV4::new(self.destination, 0)).into();

        let send_time = Instant::now();
        self.socket
            .send_to(&request, &addr)
            .map_err(|e| PingError::from_send_error(e, self.destination))?;
        tracing::trace!("echo request {} sent to {}", u16::from(sequence_number), self.destination);

        let deadline = send_time + self.timeout;
        self.round = RoundState::Sent { sequence_number, send_time, deadline };
        Ok(deadline)
    }

    fn next_event(&mut self, deadline: Instant, buf: &mut [u8]) -> PingResult<SessionEvent> {
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(SessionEvent::TimerFired);
            }
            if self.halt_requested() {
                return Err(PingError::TimerCancelled);
            }

            let read_timeout = (deadline - now).min(POLL_INTERVAL).max(MIN_READ_TIMEOUT);
            self.socket.set_read_timeout(Some(read_timeout))?;
            match self.socket.recv_from(buf) {
                Ok((len, ip_addr)) => {
                    let receive_time = Instant::now();
                    tracing::trace!("received {} bytes from {}", len, ip_addr);
                    return Ok(SessionEvent::Datagram { len, receive_time });
                }
                Err(e) if is_read_timeout(&e) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Handles an inbound datagram. Anything but the reply to the outstanding request is dropped.
    pub(crate) fn on_datagram(&mut self, datagram: &[u8], receive_time: Instant) -> Option<PingOutput> {
        let RoundState::Sent { sequence_number, send_time, .. } = self.round else {
            tracing::trace!("discarding datagram: no request outstanding");
            return None;
        };

        let message = match echo_codec::decode(datagram) {
            Ok(message) => message,
            Err(e) => {
                tracing::trace!("discarding datagram: {}", e);
                return None;
            }
        };
        if !self.accepts(&message, sequence_number) {
            tracing::trace!(
                "discarding icmp type {} id {} seq {}",
                message.icmp_type,
                message.identifier,
                message.sequence_number
            );
            return None;
        }
        if self.verify_checksum && !message.has_valid_checksum() {
            tracing::warn!("discarding echo reply {} with bad checksum", message.sequence_number);
            return None;
        }

        let ping_duration = receive_time.saturating_duration_since(send_time);
        self.statistics.record_latency(ping_duration);
        // The latency counts towards the pacing interval.
        let next_send = send_time + self.pacing_interval;
        Some(self.resolve(sequence_number, next_send, PingOutcome::Reply { ping_duration }))
    }

    /// Handles the expiry of the round's deadline.
    pub(crate) fn on_timer_fired(&mut self) -> Option<PingOutput> {
        let RoundState::Sent { sequence_number, .. } = self.round else {
            return None;
        };

        tracing::warn!("echo request {} to {} timed out", u16::from(sequence_number), self.destination);
        self.statistics.record_timeout();
        let next_send = Instant::now() + self.pacing_interval;
        Some(self.resolve(sequence_number, next_send, PingOutcome::Timeout { timeout: self.timeout }))
    }

    fn accepts(&self, message: &EchoMessage, outstanding: SequenceNumber) -> bool {
        message.is_reply()
            && message.identifier == self.identifier
            && message.sequence_number == u16::from(outstanding)
    }

    fn resolve(&mut self, sequence_number: SequenceNumber, next_send: Instant, outcome: PingOutcome) -> PingOutput {
        self.round = RoundState::Resolved { sequence_number, next_send };
        self.sequence_number = sequence_number.next();
        tracing::debug!("round {} resolved: {:?}", u16::from(sequence_number), outcome);
        PingOutput {
            ip_addr: self.destination,
            sequence_number: sequence_number.into(),
            outcome,
            statistics: self.statistics.snapshot(),
        }
    }

    // Waits until the next request is due. Returns false if halted.
    fn wait_for_next_send(&mut self) -> bool {
        let RoundState::Resolved { next_send, .. } = self.round else {
            return !self.halt_requested();
        };
        loop {
            let now = Instant::now();
            if now >= next_send {
                return !self.halt_requested();
            }
            match self.halt_rx.recv_timeout(next_send - now) {
                Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                    self.halted = true;
                    return false;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
            }
        }
    }

    fn halt_requested(&mut self) -> bool {
        if !self.halted {
            match self.halt_rx.try_recv() {
                Ok(()) | Err(mpsc::TryRecvError::Disconnected) => self.halted = true,
                Err(mpsc::TryRecvError::Empty) => {}
            }
        }
        self.halted
    }
}

fn is_read_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
