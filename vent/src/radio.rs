//! XBee radio link: boundary trait, the bounded command poll, and the
//! serial-port adapter for a module in transparent mode.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use log::warn;
use shared::Command;

use crate::io::IoError;

/// Upper bound on messages drained in one poll window, carried over from
/// the original unit's buffer-clearing sweep.
const DRAIN_LIMIT: usize = 100;

/// Largest inbound payload we accept in one receive.
const RECEIVE_BUF: usize = 256;

/// Point-to-point radio boundary.
pub trait Radio {
    /// Return one buffered inbound payload, if any. Never blocks.
    fn try_receive(&mut self) -> Result<Option<Vec<u8>>, IoError>;

    /// Send one outbound payload.
    fn transmit(&mut self, payload: &[u8]) -> Result<(), IoError>;
}

/// Poll for at most one command without blocking.
///
/// Drains the buffered backlog so the queue cannot grow between cycles,
/// keeping only the newest payload in the window. Lossy on purpose: a
/// stale open/close instruction is meaningless once superseded. Receive
/// failures degrade to [`Command::None`]; polling never stalls the
/// sampling cadence.
pub fn poll_command(radio: &mut dyn Radio) -> Command {
    let mut newest = match radio.try_receive() {
        Ok(Some(payload)) => payload,
        Ok(None) => return Command::None,
        Err(error) => {
            warn!("{}, no command this cycle", error);
            return Command::None;
        }
    };

    for _ in 1..DRAIN_LIMIT {
        match radio.try_receive() {
            Ok(Some(payload)) => newest = payload,
            Ok(None) => break,
            Err(error) => {
                warn!("{} while draining, keeping newest payload", error);
                break;
            }
        }
    }

    Command::decode(&newest)
}

/// An XBee module in transparent mode on a serial port. Each chunk of
/// buffered bytes is treated as one payload; framing beyond that belongs
/// to the radio firmware.
pub struct SerialRadio {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialRadio {
    pub fn open(path: &str, baud: u32) -> Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(Duration::from_millis(10))
            .open()
            .with_context(|| format!("failed to open radio port {}", path))?;

        Ok(Self { port })
    }
}

impl Radio for SerialRadio {
    fn try_receive(&mut self) -> Result<Option<Vec<u8>>, IoError> {
        let pending = self.port.bytes_to_read().map_err(|error| {
            warn!("radio port: {}", error);
            IoError::ReceiveFailure
        })?;
        if pending == 0 {
            return Ok(None);
        }

        let mut buf = vec![0; (pending as usize).min(RECEIVE_BUF)];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(n) => {
                buf.truncate(n);
                Ok(Some(buf))
            }
            Err(ref error) if error.kind() == ErrorKind::TimedOut => Ok(None),
            Err(error) => {
                warn!("radio port: {}", error);
                Err(IoError::ReceiveFailure)
            }
        }
    }

    fn transmit(&mut self, payload: &[u8]) -> Result<(), IoError> {
        self.port
            .write_all(payload)
            .and_then(|_| self.port.flush())
            .map_err(|error| {
                warn!("radio port: {}", error);
                IoError::TransmitFailure
            })
    }
}
