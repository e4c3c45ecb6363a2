use crate::error::DataError;
use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

/// Market subscribed to on a feed, eg/ symbol `btcusdt` displayed as `BTC`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Display, Deserialize, Serialize, Constructor)]
#[display("{name}({symbol})")]
pub struct Market {
    /// Lower-case exchange symbol used in subscription requests.
    pub symbol: SmolStr,
    /// Short human readable name shown on displays.
    pub name: SmolStr,
}

impl Market {
    /// Construct a [`Market`] from a symbol, deriving the display name by stripping a
    /// trailing `usdt` quote and upper-casing the remainder.
    pub fn from_symbol(symbol: &str) -> Self {
        let symbol = symbol.to_lowercase();
        let base = symbol.strip_suffix("usdt").unwrap_or(&symbol);
        Self {
            name: format_smolstr!("{}", base.to_uppercase()),
            symbol: SmolStr::new(&symbol),
        }
    }
}

/// Look up the configured [`Market`] for a symbol received from a feed.
pub fn find_market<'a>(markets: &'a [Market], symbol: &str) -> Result<&'a Market, DataError> {
    markets
        .iter()
        .find(|market| market.symbol == symbol)
        .ok_or_else(|| DataError::UnknownMarket(symbol.to_string()))
}

/// Latest trade price delivered by a [`StreamClient`](crate::client::StreamClient).
#[derive(Clone, PartialEq, Debug, Display, Deserialize, Serialize)]
#[display("{symbol} {price}")]
pub struct MarketPrice {
    pub symbol: SmolStr,
    pub price: f64,
}

impl MarketPrice {
    /// Construct a [`MarketPrice`], rejecting NaN and infinite prices.
    pub fn new(symbol: impl Into<SmolStr>, price: f64) -> Result<Self, DataError> {
        if !price.is_finite() {
            return Err(DataError::InvalidPrice(price));
        }

        Ok(Self {
            symbol: symbol.into(),
            price,
        })
    }
}
