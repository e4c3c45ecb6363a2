use crate::error::DisplayError;
use parking_lot::Mutex;
use serialport::SerialPort;
use std::{io::Write, sync::Arc, time::Duration};
use tracing::{debug, info};

/// Line speed of the VFD and Nixie controllers.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial device written through a blocking [`Write`] handle.
#[derive(Debug)]
pub struct SerialDevice<W = Box<dyn SerialPort>> {
    writer: Arc<Mutex<W>>,
}

impl SerialDevice<Box<dyn SerialPort>> {
    /// Open a serial port at `baud_rate`, 8N1.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, DisplayError> {
        let port = serialport::new(path, baud_rate)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|error| DisplayError::Io(format!("{path}: {error}")))?;

        info!(device = path, baud_rate, "opened serial device");
        Ok(Self::new(port))
    }
}

impl<W> SerialDevice<W>
where
    W: Write + Send + 'static,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Write and flush `bytes` on the blocking thread pool.
    pub async fn write(&self, bytes: Vec<u8>) -> Result<(), DisplayError> {
        let writer = Arc::clone(&self.writer);
        let len = bytes.len();

        tokio::task::spawn_blocking(move || {
            let mut writer = writer.lock();
            writer.write_all(&bytes)?;
            writer.flush()
        })
        .await
        .map_err(|error| DisplayError::Io(error.to_string()))??;

        debug!(bytes = len, "wrote to serial device");
        Ok(())
    }
}
