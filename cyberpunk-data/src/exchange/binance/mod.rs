use super::{Connector, ExchangeId, FeedMessage, WsMessage};
use crate::{
    error::DataError,
    market::{Market, MarketPrice},
};
use serde::Deserialize;
use serde_json::{Value, json};
use smol_str::SmolStr;
use url::Url;

/// [`Binance`] market data only server base url.
///
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/web-socket-streams>
pub const BASE_URL_BINANCE: &str = "wss://data-stream.binance.vision/ws";

/// [`Binance`] spot exchange, aggregated trade stream.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Binance;

impl Binance {
    /// Aggregated trade stream name for a market symbol, eg/ `btcusdt@aggTrade`.
    pub fn channel(symbol: &str) -> String {
        format!("{}@aggTrade", symbol.to_lowercase())
    }
}

/// ### Raw Payload Examples
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/web-socket-streams#aggregate-trade-streams>
/// ```json
/// {"result": null, "id": 1}
/// {"error": {"code": 2, "msg": "Invalid request"}, "id": 1}
/// {"e": "aggTrade", "E": 1672515782136, "s": "BTCUSDT", "a": 12345, "p": "16578.50", "q": "0.001", "m": true}
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum BinanceMessage {
    Trade {
        #[serde(rename = "e")]
        event: String,
        #[serde(rename = "s")]
        symbol: String,
        #[serde(rename = "p", deserialize_with = "crate::de::de_str")]
        price: f64,
    },
    Error {
        error: Value,
    },
    Response {
        result: Option<Value>,
        id: u64,
    },
}

impl Connector for Binance {
    const ID: ExchangeId = ExchangeId::Binance;

    fn url() -> Result<Url, DataError> {
        Url::parse(BASE_URL_BINANCE).map_err(DataError::from)
    }

    fn requests(markets: &[Market]) -> Vec<WsMessage> {
        vec![WsMessage::text(
            json!({
                "method": "SUBSCRIBE",
                "params": markets
                    .iter()
                    .map(|market| Self::channel(&market.symbol))
                    .collect::<Vec<_>>(),
                "id": 1,
            })
            .to_string(),
        )]
    }

    fn decode(message: WsMessage) -> Result<FeedMessage, DataError> {
        let payload = match message {
            WsMessage::Text(text) => text,
            other => return Err(DataError::UnexpectedMessage(other.to_string())),
        };

        let message = serde_json::from_str::<BinanceMessage>(payload.as_str())
            .map_err(|error| DataError::deserialise(error, payload.as_str()))?;

        match message {
            BinanceMessage::Trade {
                event,
                symbol,
                price,
            } => {
                if event != "aggTrade" {
                    return Err(DataError::UnexpectedMessage(format!("event {event}")));
                }
                MarketPrice::new(symbol.to_lowercase(), price).map(FeedMessage::Trade)
            }
            BinanceMessage::Error { error } => Err(DataError::SubscriptionRejected {
                status: error.to_string(),
            }),
            BinanceMessage::Response { result: None, id } => {
                Ok(FeedMessage::Subscribed(SmolStr::from(id.to_string())))
            }
            BinanceMessage::Response {
                result: Some(result),
                ..
            } => Err(DataError::SubscriptionRejected {
                status: result.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests() {
        let markets = vec![Market::from_symbol("btcusdt"), Market::from_symbol("ethusdt")];

        let actual = Binance::requests(&markets);
        assert_eq!(actual.len(), 1);

        let actual = serde_json::from_str::<Value>(actual[0].to_text().unwrap()).unwrap();
        assert_eq!(
            actual,
            json!({
                "method": "SUBSCRIBE",
                "params": ["btcusdt@aggTrade", "ethusdt@aggTrade"],
                "id": 1
            })
        );
    }

    #[test]
    fn test_decode() {
        struct TestCase {
            input: &'static str,
            expected: Result<FeedMessage, DataError>,
        }

        let tests = vec![
            TestCase {
                // TC0: subscription ack
                input: r#"{"result":null,"id":1}"#,
                expected: Ok(FeedMessage::Subscribed(SmolStr::new("1"))),
            },
            TestCase {
                // TC1: aggregated trade w/ upper-case symbol normalised
                input: r#"{"e":"aggTrade","E":1672515782136,"s":"BTCUSDT","a":12345,"p":"16578.50","q":"0.001","m":true}"#,
                expected: Ok(FeedMessage::Trade(
                    MarketPrice::new("btcusdt", 16578.50).unwrap(),
                )),
            },
            TestCase {
                // TC2: error response is fatal
                input: r#"{"error":{"code":2,"msg":"Invalid request"},"id":1}"#,
                expected: Err(DataError::SubscriptionRejected {
                    status: r#"{"code":2,"msg":"Invalid request"}"#.to_string(),
                }),
            },
            TestCase {
                // TC3: other event kinds are unexpected
                input: r#"{"e":"trade","s":"BTCUSDT","p":"1.0"}"#,
                expected: Err(DataError::UnexpectedMessage("event trade".to_string())),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = Binance::decode(WsMessage::text(test.input));
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_decode_invalid_price_is_fatal() {
        let actual = Binance::decode(WsMessage::text(
            r#"{"e":"aggTrade","s":"BTCUSDT","p":"not-a-number"}"#,
        ));
        assert!(matches!(actual, Err(DataError::Deserialise { .. })));
    }
}
