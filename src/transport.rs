// Byte-stream source
//
// The dispatcher needs two things from the transport: how many bytes are
// pending and the next byte. A serial port provides both; tests feed a
// canned script through the same trait.

use serialport::SerialPort;
use std::io::Read;
use std::time::Duration;
use tracing::info;

/// Read timeout on the underlying port. Reads happen only once bytes are
/// pending, so this is a stall guard rather than a pacing mechanism.
const READ_TIMEOUT_MS: u64 = 100;

/// Error types for the command stream
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait ByteSource {
    /// Number of bytes ready to read without blocking.
    fn bytes_pending(&mut self) -> Result<usize, TransportError>;

    /// Read one byte, blocking until it arrives.
    fn read_byte(&mut self) -> Result<u8, TransportError>;
}

/// Serial-port command stream.
pub struct SerialSource {
    port: Box<dyn SerialPort>,
}

impl SerialSource {
    pub fn open(port_name: &str, baud: u32) -> Result<Self, TransportError> {
        info!("Opening command stream on {} at {} baud", port_name, baud);
        let port = serialport::new(port_name, baud)
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .open()?;

        Ok(Self { port })
    }
}

impl ByteSource for SerialSource {
    fn bytes_pending(&mut self) -> Result<usize, TransportError> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let mut byte = [0u8; 1];
        self.port.read_exact(&mut byte)?;
        Ok(byte[0])
    }
}
