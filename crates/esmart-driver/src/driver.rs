use std::time::Instant;

use esmart_frame::{Command, FrameAssembler};
use esmart_telemetry::{TelemetryDecoder, TelemetrySink};
use esmart_transport::{Result as TransportResult, Transport};
use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::DriverConfig;
use crate::error::{DriverError, Result};

/// Running totals since the driver was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub bytes_read: u64,
    pub frames_assembled: u64,
    /// Telemetry records decoded, with or without a sink registered.
    pub records_decoded: u64,
    pub frames_ignored: u64,
    pub polls_sent: u64,
    pub recoveries: u64,
    pub stale_frames: u64,
}

/// What a single [`PollDriver::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub bytes_read: usize,
    pub frames: usize,
    pub records: usize,
    pub poll_sent: bool,
    pub recovered: bool,
}

/// Keeps telemetry flowing from one controller.
///
/// Call [`tick`](Self::tick) repeatedly from any scheduler. Each tick drains
/// the bytes already waiting on the transport, dispatches complete frames to
/// the sink, and sends a telemetry request when the poll interval has passed.
/// A transport failure makes the tick block until the link is reopened and
/// produces data again.
pub struct PollDriver<T, C = SystemClock> {
    transport: T,
    clock: C,
    config: DriverConfig,
    assembler: FrameAssembler,
    decoder: TelemetryDecoder,
    sink: Option<Box<dyn TelemetrySink + Send>>,
    last_poll: Option<Instant>,
    last_rx: Option<Instant>,
    stats: DriverStats,
}

impl<T: Transport> PollDriver<T> {
    /// Create a driver using wall-clock time.
    pub fn new(transport: T, decoder: TelemetryDecoder, config: DriverConfig) -> Self {
        Self::with_clock(transport, decoder, config, SystemClock)
    }
}

impl<T: Transport, C: Clock> PollDriver<T, C> {
    /// Create a driver with an explicit time source.
    pub fn with_clock(
        transport: T,
        decoder: TelemetryDecoder,
        config: DriverConfig,
        clock: C,
    ) -> Self {
        Self {
            transport,
            clock,
            config,
            assembler: FrameAssembler::new(),
            decoder,
            sink: None,
            last_poll: None,
            last_rx: None,
            stats: DriverStats::default(),
        }
    }

    /// Register the record consumer, replacing any previous one.
    ///
    /// Without a sink, decoded records are discarded.
    pub fn set_sink(&mut self, sink: impl TelemetrySink + Send + 'static) {
        self.sink = Some(Box::new(sink));
    }

    /// Builder form of [`set_sink`](Self::set_sink).
    pub fn with_sink(mut self, sink: impl TelemetrySink + Send + 'static) -> Self {
        self.set_sink(sink);
        self
    }

    /// Open the transport for the first time.
    pub fn open(&mut self) -> Result<()> {
        self.transport.open().map_err(DriverError::Open)?;
        info!(port = %self.transport.identifier(), "driver started");
        Ok(())
    }

    /// Release the transport.
    pub fn close(&mut self) {
        self.transport.close();
    }

    /// Run one iteration of the driver loop.
    ///
    /// Only fails when recovery gives up after
    /// [`max_reconnect_attempts`](DriverConfig::max_reconnect_attempts).
    pub fn tick(&mut self) -> Result<TickSummary> {
        let mut summary = TickSummary::default();
        let now = self.clock.now();

        if let Err(err) = self.service(now, &mut summary) {
            warn!(
                port = %self.transport.identifier(),
                error = %err,
                "transport failure, resyncing"
            );
            self.recover(&mut summary)?;
            summary.recovered = true;
        }

        Ok(summary)
    }

    /// Transmit an explicit command such as a load switch.
    ///
    /// A write failure resyncs the link before the error is returned.
    pub fn send_command(&mut self, command: Command) -> Result<()> {
        match self.transport.write_all(command.as_bytes()) {
            Ok(()) => {
                debug!(%command, "command sent");
                Ok(())
            }
            Err(source) => {
                warn!(%command, error = %source, "command write failed, resyncing");
                self.recover(&mut TickSummary::default())?;
                Err(DriverError::CommandFailed { command, source })
            }
        }
    }

    /// Switch the load output on or off.
    pub fn set_load(&mut self, on: bool) -> Result<()> {
        self.send_command(if on { Command::LoadOn } else { Command::LoadOff })
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the driver and return the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn service(&mut self, now: Instant, summary: &mut TickSummary) -> TransportResult<()> {
        self.drain(now, summary)?;

        let due = match self.last_poll {
            None => true,
            Some(last) => now.duration_since(last) >= self.config.poll_interval,
        };
        if due {
            self.transport.write_all(Command::RequestTelemetry.as_bytes())?;
            self.last_poll = Some(now);
            self.stats.polls_sent += 1;
            summary.poll_sent = true;
            trace!("telemetry requested");
        }

        Ok(())
    }

    fn drain(&mut self, now: Instant, summary: &mut TickSummary) -> TransportResult<()> {
        let mut buf = vec![0u8; self.config.read_chunk_size.max(1)];
        loop {
            let n = if self.transport.bytes_waiting()? > 0 {
                self.transport.read(&mut buf)?
            } else {
                0
            };
            if n == 0 {
                self.expire_stale_frame(now);
                return Ok(());
            }
            self.last_rx = Some(now);
            self.ingest(&buf[..n], summary);
        }
    }

    /// Called only once the transport has nothing waiting, so the time since
    /// `last_rx` is observed silence.
    fn expire_stale_frame(&mut self, now: Instant) {
        let (Some(timeout), Some(last)) = (self.config.frame_timeout, self.last_rx) else {
            return;
        };
        if self.assembler.is_accumulating() && now.duration_since(last) >= timeout {
            let discarded = self.assembler.reset();
            self.stats.stale_frames += 1;
            debug!(discarded, "abandoned stale partial frame");
        }
    }

    fn ingest(&mut self, bytes: &[u8], summary: &mut TickSummary) {
        summary.bytes_read += bytes.len();
        self.stats.bytes_read += bytes.len() as u64;

        for frame in self.assembler.feed(bytes) {
            summary.frames += 1;
            self.stats.frames_assembled += 1;

            let Some(record) = self.decoder.decode(&frame) else {
                self.stats.frames_ignored += 1;
                continue;
            };

            summary.records += 1;
            self.stats.records_decoded += 1;
            match self.sink.as_mut() {
                Some(sink) => sink.on_record(record),
                None => trace!("no sink registered, record discarded"),
            }
        }
    }

    /// Block until the transport is reopened and yields data.
    fn recover(&mut self, summary: &mut TickSummary) -> Result<()> {
        self.stats.recoveries += 1;
        self.transport.close();
        self.assembler.reset();

        let mut probe = vec![0u8; self.config.probe_read_size.max(1)];
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.reopen_and_probe(&mut probe) {
                Ok(n) if n > 0 => {
                    info!(
                        port = %self.transport.identifier(),
                        attempts,
                        "transport recovered"
                    );
                    self.last_rx = Some(self.clock.now());
                    self.ingest(&probe[..n], summary);
                    return Ok(());
                }
                Ok(_) => {
                    debug!(attempt = attempts, "reopened transport is silent");
                    self.transport.close();
                }
                Err(err) => {
                    debug!(attempt = attempts, error = %err, "reopen failed");
                    self.transport.close();
                }
            }

            if let Some(max) = self.config.max_reconnect_attempts {
                if attempts >= max {
                    warn!(attempts, "giving up on transport recovery");
                    return Err(DriverError::RecoveryExhausted { attempts });
                }
            }
            self.clock.sleep(self.config.reconnect_delay);
        }
    }

    fn reopen_and_probe(&mut self, probe: &mut [u8]) -> TransportResult<usize> {
        self.transport.open()?;
        self.transport.read(probe)
    }
}

impl<T: Transport, C> std::fmt::Debug for PollDriver<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollDriver")
            .field("port", &self.transport.identifier())
            .field("assembler", &self.assembler.state())
            .field("has_sink", &self.sink.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}
