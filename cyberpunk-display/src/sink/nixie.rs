use super::{DisplaySink, Update, serial::SerialDevice};
use crate::error::DisplayError;
use async_trait::async_trait;
use cyberpunk_data::DataError;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use smol_str::SmolStr;
use serialport::SerialPort;
use std::{fmt, io::Write};
use tracing::info;

/// Number of tubes.
pub const DIGITS: usize = 6;

/// Highest accepted brightness level.
pub const MAX_BRIGHTNESS: u8 = 8;

/// Message turning every tube and decimal point off.
pub const BLANK: &[u8; 16] = b"TIMDBBBBBBBBBBBB";

/// `TIMD<6 digits><6 decimal point flags>` display message.
///
/// Each decimal point flag is `L` (lit) or `B` (blank) and sits to the lower left of the
/// digit at the same position.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NixieMessage {
    pub bytes: [u8; 16],
}

impl NixieMessage {
    pub fn digits(&self) -> &str {
        std::str::from_utf8(&self.bytes[4..10]).unwrap_or_default()
    }

    pub fn dots(&self) -> &str {
        std::str::from_utf8(&self.bytes[10..16]).unwrap_or_default()
    }
}

impl fmt::Display for NixieMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TIMD{}{}", self.digits(), self.dots())
    }
}

impl From<Decimal> for NixieMessage {
    fn from(price: Decimal) -> Self {
        let (digits, dot) = encode_digits(price.abs());

        let mut dots = [b'B'; DIGITS];
        if let Some(position) = dot {
            dots[position] = b'L';
        }

        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(b"TIMD");
        bytes[4..10].copy_from_slice(digits.as_bytes());
        bytes[10..16].copy_from_slice(&dots);
        Self { bytes }
    }
}

/// Six digit string and the position of the lit decimal point, if any.
fn encode_digits(price: Decimal) -> (String, Option<usize>) {
    let (int_part, frac_part) = split(price);

    if int_part == "0" {
        return (pad(&frac_part), Some(0));
    }

    if int_part.len() < DIGITS {
        let rounded = price.round_dp((DIGITS - int_part.len()) as u32);
        let (int_part, frac_part) = split(rounded);

        // Rounding may carry into a sixth integer digit, eg/ 99999.97
        if int_part.len() < DIGITS {
            return (pad(&format!("{int_part}{frac_part}")), Some(int_part.len()));
        }
    }

    let (int_part, _) = split(price.round_dp(0));
    (pad(&int_part), None)
}

fn split(price: Decimal) -> (String, String) {
    let text = price.to_string();
    match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), frac_part.to_string()),
        None => (text, String::new()),
    }
}

/// Right-pad with zeros, truncating to [`DIGITS`].
fn pad(digits: &str) -> String {
    let mut digits = format!("{digits:0<DIGITS$}");
    digits.truncate(DIGITS);
    digits
}

/// `TIMB<level>` brightness command.
pub fn brightness_command(level: u8) -> Result<Vec<u8>, DisplayError> {
    if level > MAX_BRIGHTNESS {
        return Err(DisplayError::Brightness(level));
    }
    Ok(format!("TIMB{level}").into_bytes())
}

/// [`DisplaySink`] showing the latest price of one market on six Nixie tubes.
///
/// A message is only written when its encoding differs from the last one sent.
#[derive(Debug)]
pub struct NixieSink<W = Box<dyn SerialPort>> {
    device: SerialDevice<W>,
    symbol: SmolStr,
    last_sent: Option<NixieMessage>,
}

impl<W> NixieSink<W>
where
    W: Write + Send + 'static,
{
    /// Construct a [`NixieSink`] and set the initial tube brightness.
    pub async fn init(
        device: SerialDevice<W>,
        symbol: impl Into<SmolStr>,
        brightness: u8,
    ) -> Result<Self, DisplayError> {
        let command = brightness_command(brightness)?;
        device.write(command).await?;
        info!(brightness, "set nixie brightness");

        Ok(Self {
            device,
            symbol: symbol.into(),
            last_sent: None,
        })
    }

    async fn send(&mut self, message: NixieMessage) -> Result<(), DisplayError> {
        if self.last_sent == Some(message) {
            return Ok(());
        }

        self.device.write(message.bytes.to_vec()).await?;
        info!(%message, "sent to nixie");
        self.last_sent = Some(message);
        Ok(())
    }
}

#[async_trait]
impl<W> DisplaySink for NixieSink<W>
where
    W: Write + Send + 'static,
{
    async fn show(&mut self, update: &Update<'_>) -> Result<(), DisplayError> {
        let Some(price) = update.latest.get(&self.symbol).copied() else {
            return Ok(());
        };

        let decimal = Decimal::from_f64(price).ok_or(DataError::InvalidPrice(price))?;
        self.send(NixieMessage::from(decimal)).await
    }

    async fn close(&mut self) -> Result<(), DisplayError> {
        self.device.write(BLANK.to_vec()).await?;
        self.last_sent = None;
        info!("closed nixie");
        Ok(())
    }
}
