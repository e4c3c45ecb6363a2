//! # Cyberpunk-Display
//! Renders a live trade-price stream onto small physical and virtual displays.
//!
//! The newest prices are kept in a fixed-capacity [`SlidingWindow`], quantized into an
//! 8-row bitmap with per-column trend colours, packed into RGB565 and shipped to a
//! [`DisplaySink`]:
//! - [`AwtrixSink`]: 32x8 Awtrix pixel matrix over HTTP.
//! - [`TerminalSink`]: coloured blocks redrawn in a terminal.
//! - [`VfdSink`]: 2x16 VFD over a serial device.
//! - [`NixieSink`]: 6 digit Nixie tubes over a serial device.
//!
//! Each display has a binary (`matrix`, `awtrix`, `vfd`, `nixie`) configured through
//! environment variables, see [`Config::from_env`].

/// Environment driven [`Config`] shared by every binary.
pub mod config;

/// All [`Error`](std::error::Error)s generated in Cyberpunk-Display.
pub mod error;

/// `tracing` subscriber initialisation.
pub mod logging;

/// Feed task and render loop wiring a [`StreamClient`](cyberpunk_data::StreamClient) to a
/// [`DisplaySink`].
pub mod pipeline;

/// Price window to [`Frame`] rendering and RGB565 packing.
pub mod render;

/// Pixel-font price overlay composed onto a [`Frame`].
pub mod screen;

/// [`DisplaySink`] trait and its implementations.
pub mod sink;

/// Coalescing [`LatestValueSlot`].
pub mod slot;

/// Drop-and-discard [`Throttle`].
pub mod throttle;

/// Rolling price [`SlidingWindow`].
pub mod window;

pub use config::{Config, MarketConfig};
pub use error::DisplayError;
pub use render::{Frame, Rgb888, Trend};
pub use screen::{PriceOverlay, Screen};
pub use sink::{
    DisplaySink, Update, awtrix::AwtrixSink, nixie::NixieSink, terminal::TerminalSink,
    vfd::VfdSink,
};
pub use slot::LatestValueSlot;
pub use throttle::Throttle;
pub use window::SlidingWindow;
