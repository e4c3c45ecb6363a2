use serde::Deserialize;

/// Every JSON payload the Huobi market feed sends after gzip decompression.
///
/// ### Raw Payload Examples
/// See docs: <https://huobiapi.github.io/docs/spot/v1/en/#trade-detail>
/// ```json
/// {"id": "btcusdt", "status": "ok", "subbed": "market.btcusdt.trade.detail", "ts": 1624332964918}
/// {"ping": 1624332968042}
/// {
///     "ch": "market.btcusdt.trade.detail",
///     "ts": 1624332964575,
///     "tick": {
///         "id": 131421049089,
///         "ts": 1624332964573,
///         "data": [{"tradeId": 102482210043, "amount": 0.006077, "price": 32942.44, "direction": "sell"}]
///     }
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum HuobiMessage {
    Ping {
        ping: u64,
    },
    Subscription(HuobiSubResponse),
    Trade {
        ch: String,
        tick: HuobiTick,
    },
}

/// Huobi subscription response, including rejections.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct HuobiSubResponse {
    pub status: String,
    #[serde(default)]
    pub subbed: Option<String>,
    #[serde(rename = "err-msg", default)]
    pub err_msg: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct HuobiTick {
    pub data: Vec<HuobiTrade>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct HuobiTrade {
    pub price: f64,
}
