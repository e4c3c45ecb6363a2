use crate::{error::DisplayError, render::Frame};
use async_trait::async_trait;
use cyberpunk_data::MarketPrice;
use smol_str::SmolStr;
use std::{collections::HashMap, time::Duration};

/// Awtrix pixel matrix driven over its HTTP draw api.
pub mod awtrix;

/// Nixie tube display driven over a serial byte protocol.
pub mod nixie;

/// Blocking serial device writes off-loaded to the blocking thread pool.
pub mod serial;

/// Coloured block-character matrix printed to a terminal.
pub mod terminal;

/// 2x16 vacuum fluorescent display driven over a serial byte protocol.
pub mod vfd;

/// Latest price of every market seen so far, keyed by symbol.
pub type LatestPrices = HashMap<SmolStr, f64>;

/// Everything a [`DisplaySink`] may draw for one accepted render cycle.
#[derive(Debug, Clone, Copy)]
pub struct Update<'a> {
    /// Price that triggered this update.
    pub price: &'a MarketPrice,
    /// Chart rendered from the sliding window.
    pub frame: &'a Frame,
    /// Latest price of every market.
    pub latest: &'a LatestPrices,
}

/// Display transport consuming rendered [`Update`]s.
#[async_trait]
pub trait DisplaySink: Send {
    /// Draw an update.
    async fn show(&mut self, update: &Update<'_>) -> Result<(), DisplayError>;

    /// Blank or release the display.
    async fn close(&mut self) -> Result<(), DisplayError>;

    /// Interval without updates after which [`DisplaySink::idle`] is invoked.
    fn idle_interval(&self) -> Option<Duration> {
        None
    }

    /// Invoked when no update arrived within [`DisplaySink::idle_interval`].
    async fn idle(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}
