//! # Cyberpunk-Data
//! Resilient streaming of public trade prices from cryptocurrency exchanges.
//!
//! A [`StreamClient`] keeps a WebSocket subscription alive across disconnects and
//! keepalives, delivering one [`MarketPrice`] per trade update in arrival order:
//!
//! ```rust,no_run
//! use cyberpunk_data::{Huobi, Market, StreamClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let markets = vec![Market::from_symbol("btcusdt")];
//!     let mut client = StreamClient::<Huobi>::new(markets).unwrap();
//!
//!     while let Ok(Some(price)) = client.recv_price(None).await {
//!         println!("{price}");
//!     }
//! }
//! ```

/// Resilient [`StreamClient`] that owns and replaces its WebSocket connection.
pub mod client;

/// Serde helpers shared by feed payload types.
pub mod de;

/// All [`Error`](std::error::Error)s generated in Cyberpunk-Data.
pub mod error;

/// [`Connector`] implementations for each supported feed.
pub mod exchange;

/// [`Market`] and [`MarketPrice`] definitions.
pub mod market;

pub use client::{StreamClient, StreamConfig};
pub use error::DataError;
pub use exchange::{Connector, ExchangeId, FeedMessage, binance::Binance, huobi::Huobi};
pub use market::{Market, MarketPrice};
