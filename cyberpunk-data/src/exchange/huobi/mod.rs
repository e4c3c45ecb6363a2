use self::message::{HuobiMessage, HuobiSubResponse};
use super::{Connector, ExchangeId, FeedMessage, WsMessage};
use crate::{
    error::DataError,
    market::{Market, MarketPrice},
};
use flate2::read::GzDecoder;
use serde_json::json;
use smol_str::SmolStr;
use std::io::Read;
use url::Url;

/// Payload types received from the [`Huobi`] feed.
pub mod message;

/// [`Huobi`] server base url.
///
/// See docs: <https://huobiapi.github.io/docs/spot/v1/en/#websocket-market-data>
pub const BASE_URL_HUOBI: &str = "wss://api.hadax.com/ws";

const CHANNEL_PREFIX: &str = "market.";
const CHANNEL_SUFFIX: &str = ".trade.detail";

/// [`Huobi`] spot exchange.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Huobi;

impl Huobi {
    /// Trade detail channel for a market symbol, eg/ `market.btcusdt.trade.detail`.
    pub fn channel(symbol: &str) -> String {
        format!("{CHANNEL_PREFIX}{symbol}{CHANNEL_SUFFIX}")
    }

    /// Recover the market symbol from a trade detail channel.
    pub fn symbol(channel: &str) -> Result<&str, DataError> {
        channel
            .strip_prefix(CHANNEL_PREFIX)
            .and_then(|rest| rest.strip_suffix(CHANNEL_SUFFIX))
            .ok_or_else(|| DataError::UnexpectedMessage(format!("channel {channel}")))
    }

    /// Pong answering a ping with the same nonce.
    pub fn pong(nonce: u64) -> WsMessage {
        WsMessage::text(json!({ "pong": nonce }).to_string())
    }
}

impl Connector for Huobi {
    const ID: ExchangeId = ExchangeId::Huobi;

    fn url() -> Result<Url, DataError> {
        Url::parse(BASE_URL_HUOBI).map_err(DataError::from)
    }

    fn requests(markets: &[Market]) -> Vec<WsMessage> {
        markets
            .iter()
            .map(|market| {
                WsMessage::text(
                    json!({
                        "sub": Self::channel(&market.symbol),
                        "id": market.symbol.as_str(),
                    })
                    .to_string(),
                )
            })
            .collect()
    }

    fn decode(message: WsMessage) -> Result<FeedMessage, DataError> {
        let payload = match message {
            WsMessage::Binary(bytes) => gunzip(&bytes)?,
            WsMessage::Text(text) => text.as_str().to_owned(),
            other => return Err(DataError::UnexpectedMessage(other.to_string())),
        };

        let message = serde_json::from_str::<HuobiMessage>(&payload)
            .map_err(|error| DataError::deserialise(error, &payload))?;

        match message {
            HuobiMessage::Ping { ping } => Ok(FeedMessage::Heartbeat(Self::pong(ping))),
            HuobiMessage::Subscription(HuobiSubResponse {
                status,
                subbed,
                err_msg,
            }) => {
                if status != "ok" {
                    return Err(DataError::SubscriptionRejected {
                        status: match err_msg {
                            Some(reason) => format!("{status}: {reason}"),
                            None => status,
                        },
                    });
                }
                Ok(FeedMessage::Subscribed(SmolStr::from(
                    subbed.unwrap_or_default(),
                )))
            }
            HuobiMessage::Trade { ch, tick } => {
                let trade = tick
                    .data
                    .first()
                    .ok_or(DataError::MissingField("tick.data"))?;
                MarketPrice::new(Self::symbol(&ch)?, trade.price).map(FeedMessage::Trade)
            }
        }
    }
}

/// Decompress a gzip frame into a UTF-8 JSON string.
pub fn gunzip(bytes: &[u8]) -> Result<String, DataError> {
    let mut payload = String::new();
    GzDecoder::new(bytes)
        .read_to_string(&mut payload)
        .map_err(|error| DataError::Decompress(error.to_string()))?;
    Ok(payload)
}
