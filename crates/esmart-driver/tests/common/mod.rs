#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use bytes::BytesMut;
use esmart_driver::Clock;
use esmart_frame::{encode_frame, FrameHeader};
use esmart_transport::{Result, Transport, TransportError};

/// What the next reopen of a [`MockTransport`] does.
#[derive(Debug, Clone)]
pub enum Reopen {
    /// `open` fails.
    Fail,
    /// `open` succeeds but the probe read comes back empty.
    Silent,
    /// `open` succeeds but the probe read errors.
    ReadFails,
    /// `open` succeeds and these bytes are waiting.
    Data(Vec<u8>),
}

#[derive(Debug, Default)]
pub struct MockState {
    pub open: bool,
    pub incoming: VecDeque<u8>,
    pub written: Vec<Vec<u8>>,
    pub fail_next_read: bool,
    pub fail_next_write: bool,
    pub fail_read: bool,
    /// `open`, `open-failed`, `read-failed` and `close`, in call order.
    pub events: Vec<&'static str>,
    pub script: VecDeque<Reopen>,
    pub opens: usize,
    pub closes: usize,
}

/// In-memory transport. Clones share state so tests can inspect it while the
/// driver owns another handle.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn push_incoming(&self, bytes: &[u8]) {
        self.state().incoming.extend(bytes.iter().copied());
    }

    pub fn script(&self, steps: impl IntoIterator<Item = Reopen>) {
        self.state().script.extend(steps);
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.state().events.clone()
    }

    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state().written.clone()
    }

    pub fn count_written(&self, message: &[u8]) -> usize {
        self.state()
            .written
            .iter()
            .filter(|w| w.as_slice() == message)
            .count()
    }
}

fn broken() -> TransportError {
    TransportError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "cable pulled"))
}

impl Transport for MockTransport {
    fn identifier(&self) -> &str {
        "mock"
    }

    fn open(&mut self) -> Result<()> {
        let mut state = self.state();
        state.opens += 1;
        let step = state.script.pop_front();
        if let Some(Reopen::Fail) = step {
            state.events.push("open-failed");
            return Err(TransportError::Open {
                port: "mock".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such device"),
            });
        }

        state.events.push("open");
        state.open = true;
        match step {
            Some(Reopen::ReadFails) => state.fail_read = true,
            Some(Reopen::Data(bytes)) => state.incoming.extend(bytes),
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self) {
        let mut state = self.state();
        state.closes += 1;
        state.events.push("close");
        state.open = false;
        state.fail_read = false;
        state.incoming.clear();
    }

    fn is_open(&self) -> bool {
        self.state().open
    }

    fn bytes_waiting(&mut self) -> Result<usize> {
        let mut state = self.state();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        if std::mem::take(&mut state.fail_next_read) {
            return Err(broken());
        }
        Ok(state.incoming.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut state = self.state();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        if std::mem::take(&mut state.fail_read) {
            state.events.push("read-failed");
            return Err(broken());
        }
        let n = buf.len().min(state.incoming.len());
        for (slot, byte) in buf.iter_mut().zip(state.incoming.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        if std::mem::take(&mut state.fail_next_write) {
            return Err(broken());
        }
        state.written.push(data.to_vec());
        Ok(())
    }
}

#[derive(Debug)]
struct ClockState {
    now: Instant,
    sleeps: Vec<Duration>,
}

/// Simulated time. `sleep` records the request and advances the clock.
#[derive(Debug, Clone)]
pub struct FakeClock {
    state: Arc<Mutex<ClockState>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState {
                now: Instant::now(),
                sleeps: Vec::new(),
            })),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.state.lock().unwrap().now += by;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().unwrap().sleeps.clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.state.lock().unwrap().now
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap();
        state.sleeps.push(duration);
        state.now += duration;
    }
}

/// A complete 41-byte telemetry frame with the given state of charge.
pub fn telemetry_wire(soc: u8) -> Vec<u8> {
    let mut payload = [0u8; 34];
    payload[4..6].copy_from_slice(&182u16.to_le_bytes()); // pv_volt 18.2
    payload[6..8].copy_from_slice(&134u16.to_le_bytes()); // bat_volt 13.4
    payload[24] = soc;

    let header = FrameHeader {
        prefix: [0x01, 0x01],
        source: 3,
        msg_type: 0,
    };
    let mut buf = BytesMut::new();
    encode_frame(&header, &payload, &mut buf).unwrap();
    buf.to_vec()
}
