use super::{DisplaySink, Update, serial::SerialDevice};
use crate::{config::MarketConfig, error::DisplayError};
use async_trait::async_trait;
use cyberpunk_data::Market;
use serialport::SerialPort;
use std::{io::Write, time::Duration};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Characters per display line.
pub const LINE_WIDTH: usize = 16;

/// Default period after which line 2 switches to the next coin.
pub const DEFAULT_SWITCH_INTERVAL: Duration = Duration::from_secs(2);

/// Default period without updates after which the last frame is resent.
pub const DEFAULT_RESEND_TIMEOUT: Duration = Duration::from_millis(500);

const BLANK_LINE: &str = "                ";

/// Encode two 16 byte lines into a display frame.
pub fn frame(line1: &str, line2: &str) -> Result<Vec<u8>, DisplayError> {
    let mut frame = Vec::with_capacity(2 * LINE_WIDTH + 7);
    frame.extend_from_slice(&[0xFE, b'H']);
    frame.extend_from_slice(check_width(line1)?);
    frame.extend_from_slice(&[0x00; 4]);
    frame.extend_from_slice(check_width(line2)?);
    frame.push(0xFF);
    Ok(frame)
}

fn check_width(line: &str) -> Result<&[u8], DisplayError> {
    match line.len() {
        LINE_WIDTH => Ok(line.as_bytes()),
        width => Err(DisplayError::LineWidth {
            line: line.to_string(),
            width,
        }),
    }
}

/// Last seen price of a market and its direction of travel.
#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    pub market: Market,
    pub precision: usize,
    /// `None` until the first price arrives.
    pub price: Option<f64>,
    pub trend: char,
}

impl Coin {
    pub fn new(market: Market, precision: usize) -> Self {
        Self {
            market,
            precision,
            price: None,
            trend: '+',
        }
    }

    /// Record a new price. The trend is unchanged when the price is.
    pub fn update(&mut self, price: f64) {
        match self.price {
            Some(last) if price > last => self.trend = '+',
            Some(last) if price < last => self.trend = '-',
            _ => {}
        }
        self.price = Some(price);
    }

    /// Display line, eg/ `ETH:  +  2001.50`. Blank until a price is known.
    pub fn line(&self) -> String {
        let Some(price) = self.price else {
            return BLANK_LINE.to_string();
        };

        format!(
            "{:<6}{}{:>9.precision$}",
            format!("{}:", self.market.name),
            self.trend,
            price,
            precision = self.precision,
        )
    }
}

/// [`DisplaySink`] for a 2x16 VFD.
///
/// Line 1 permanently shows the first coin, line 2 rotates through the remaining coins.
#[derive(Debug)]
pub struct VfdSink<W = Box<dyn SerialPort>> {
    device: SerialDevice<W>,
    coins: Vec<Coin>,
    rotation: usize,
    switch_interval: Duration,
    resend_timeout: Duration,
    last_switch: Instant,
    last_frame: Option<Vec<u8>>,
}

impl<W> VfdSink<W>
where
    W: Write + Send + 'static,
{
    pub fn new(device: SerialDevice<W>, markets: &[MarketConfig]) -> Self {
        Self {
            device,
            coins: markets
                .iter()
                .map(|config| Coin::new(config.market.clone(), config.precision))
                .collect(),
            rotation: 0,
            switch_interval: DEFAULT_SWITCH_INTERVAL,
            resend_timeout: DEFAULT_RESEND_TIMEOUT,
            last_switch: Instant::now(),
            last_frame: None,
        }
    }

    pub fn with_switch_interval(mut self, interval: Duration) -> Self {
        self.switch_interval = interval;
        self
    }

    pub fn with_resend_timeout(mut self, timeout: Duration) -> Self {
        self.resend_timeout = timeout;
        self
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    fn rotate_if_due(&mut self) {
        if self.coins.len() <= 2 || self.last_switch.elapsed() < self.switch_interval {
            return;
        }

        self.rotation = (self.rotation + 1) % (self.coins.len() - 1);
        self.last_switch = Instant::now();
        debug!(rotation = self.rotation, "switched vfd line 2");
    }

    /// Frame for the current rotation.
    pub fn render(&self) -> Result<Vec<u8>, DisplayError> {
        let line1 = self
            .coins
            .first()
            .map(Coin::line)
            .unwrap_or_else(|| BLANK_LINE.to_string());
        let line2 = self
            .coins
            .get(1 + self.rotation)
            .map(Coin::line)
            .unwrap_or_else(|| BLANK_LINE.to_string());
        frame(&line1, &line2)
    }

    async fn send(&mut self, frame: Vec<u8>) -> Result<(), DisplayError> {
        self.device.write(frame.clone()).await?;
        self.last_frame = Some(frame);
        Ok(())
    }
}

#[async_trait]
impl<W> DisplaySink for VfdSink<W>
where
    W: Write + Send + 'static,
{
    async fn show(&mut self, update: &Update<'_>) -> Result<(), DisplayError> {
        for coin in self.coins.iter_mut() {
            if let Some(price) = update.latest.get(&coin.market.symbol) {
                coin.update(*price);
            }
        }
        self.rotate_if_due();

        let frame = self.render()?;
        if self.last_frame.as_ref() == Some(&frame) {
            return Ok(());
        }

        self.send(frame).await?;
        info!(price = %update.price, "sent to vfd");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DisplayError> {
        self.device.write(frame(BLANK_LINE, BLANK_LINE)?).await?;
        self.last_frame = None;
        info!("closed vfd");
        Ok(())
    }

    fn idle_interval(&self) -> Option<Duration> {
        Some(self.resend_timeout)
    }

    async fn idle(&mut self) -> Result<(), DisplayError> {
        self.rotate_if_due();

        let frame = match self.last_frame.take() {
            Some(last) if self.coins.len() <= 2 => last,
            _ => self.render()?,
        };

        warn!("no price update within resend timeout, resending vfd frame");
        self.send(frame).await
    }
}
