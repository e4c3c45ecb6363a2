use crate::{
    error::DataError,
    market::{Market, MarketPrice},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::str::FromStr;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Binance `aggTrade` feed: plain-text JSON with WebSocket-level keepalives.
pub mod binance;

/// Huobi `trade.detail` feed: gzip-compressed JSON with application-level ping/pong.
pub mod huobi;

/// Convenient type alias for the WebSocket message type exchanged with a feed.
pub type WsMessage = Message;

/// Unique identifier for a supported market data feed.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeId {
    #[display("huobi")]
    Huobi,
    #[display("binance")]
    Binance,
}

impl FromStr for ExchangeId {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huobi" | "htx" => Ok(ExchangeId::Huobi),
            "binance" => Ok(ExchangeId::Binance),
            other => Err(DataError::UnexpectedMessage(format!(
                "unsupported exchange: {other}"
            ))),
        }
    }
}

/// Application frame decoded by a [`Connector`].
#[derive(Clone, PartialEq, Debug)]
pub enum FeedMessage {
    /// Subscription acknowledged for the contained channel.
    Subscribed(SmolStr),
    /// Keepalive that must be answered immediately with the contained reply.
    Heartbeat(WsMessage),
    /// Latest trade price for a market.
    Trade(MarketPrice),
    /// Frame with no content of interest.
    Ignore,
}

/// Defines how a [`StreamClient`](crate::client::StreamClient) talks to a specific feed.
pub trait Connector {
    /// Unique identifier for the feed.
    const ID: ExchangeId;

    /// Base [`Url`] of the feed server.
    fn url() -> Result<Url, DataError>;

    /// Subscription requests sent after every (re)connect.
    fn requests(markets: &[Market]) -> Vec<WsMessage>;

    /// Decode a `Text` or `Binary` frame into a [`FeedMessage`].
    ///
    /// Any shape the feed does not document is an error, never an [`FeedMessage::Ignore`].
    fn decode(message: WsMessage) -> Result<FeedMessage, DataError>;
}
