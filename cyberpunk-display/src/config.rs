use crate::{
    error::DisplayError,
    screen::PriceOverlay,
    sink::{awtrix, nixie, serial, vfd},
    throttle, window,
};
use cyberpunk_data::{ExchangeId, Market};
use smol_str::SmolStr;
use std::{str::FromStr, time::Duration};
use url::Url;

/// Default decimal places shown for a market price.
pub const DEFAULT_PRECISION: usize = 2;

const DEFAULT_MARKETS: &str = "btcusdt:BTC";
const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";

/// Market subscribed to on the feed plus how displays print it.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    pub market: Market,
    pub precision: usize,
}

impl MarketConfig {
    pub fn new(market: Market, precision: usize) -> Self {
        Self { market, precision }
    }
}

impl FromStr for MarketConfig {
    type Err = DisplayError;

    /// Parse `symbol[:NAME[:precision]]`, eg/ `uniusdt:UNI:4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');

        let symbol = parts
            .next()
            .map(str::trim)
            .filter(|symbol| !symbol.is_empty())
            .ok_or_else(|| DisplayError::Config(format!("empty market in {s:?}")))?;

        let mut market = Market::from_symbol(symbol);
        if let Some(name) = parts.next().map(str::trim).filter(|name| !name.is_empty()) {
            market.name = SmolStr::new(name.to_uppercase());
        }

        let precision = match parts.next() {
            Some(precision) => precision.trim().parse::<usize>().map_err(|error| {
                DisplayError::Config(format!("invalid precision in {s:?}: {error}"))
            })?,
            None => DEFAULT_PRECISION,
        };

        if parts.next().is_some() {
            return Err(DisplayError::Config(format!("too many fields in market {s:?}")));
        }

        Ok(Self { market, precision })
    }
}

/// Parse a comma separated list of [`MarketConfig`]s. At least one is required.
pub fn parse_markets(s: &str) -> Result<Vec<MarketConfig>, DisplayError> {
    let markets = s
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(MarketConfig::from_str)
        .collect::<Result<Vec<_>, _>>()?;

    if markets.is_empty() {
        return Err(DisplayError::Config("no markets configured".to_string()));
    }
    Ok(markets)
}

/// Runtime configuration shared by every display binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub exchange: ExchangeId,
    /// Subscribed markets. The first one is charted.
    pub markets: Vec<MarketConfig>,
    pub ws_url: Option<Url>,
    pub window: usize,
    pub render_interval: Duration,
    pub recv_timeout: Option<Duration>,
    pub reconnect_delay: Duration,
    pub awtrix_host: String,
    pub awtrix_port: u16,
    pub serial_port: String,
    pub serial_baud_rate: u32,
    pub nixie_brightness: u8,
    pub vfd_switch_interval: Duration,
    /// Draw the latest prices in a pixel font over the matrix chart.
    pub price_overlay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exchange: ExchangeId::Huobi,
            markets: vec![MarketConfig::new(
                Market::new("btcusdt".into(), "BTC".into()),
                DEFAULT_PRECISION,
            )],
            ws_url: None,
            window: window::DEFAULT_CAPACITY,
            render_interval: throttle::DEFAULT_MIN_INTERVAL,
            recv_timeout: None,
            reconnect_delay: Duration::ZERO,
            awtrix_host: awtrix::DEFAULT_HOST.to_string(),
            awtrix_port: awtrix::DEFAULT_PORT,
            serial_port: DEFAULT_SERIAL_PORT.to_string(),
            serial_baud_rate: serial::DEFAULT_BAUD_RATE,
            nixie_brightness: nixie::MAX_BRIGHTNESS,
            vfd_switch_interval: vfd::DEFAULT_SWITCH_INTERVAL,
            price_overlay: false,
        }
    }
}

impl Config {
    /// Read configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, DisplayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DisplayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            exchange: parse_or(&var, "CYBERPUNK_EXCHANGE", defaults.exchange)?,
            markets: var("CYBERPUNK_MARKETS")
                .as_deref()
                .map(parse_markets)
                .unwrap_or_else(|| parse_markets(DEFAULT_MARKETS))?,
            ws_url: var("CYBERPUNK_WS_URL")
                .map(|url| {
                    Url::parse(&url).map_err(|error| {
                        DisplayError::Config(format!("CYBERPUNK_WS_URL={url}: {error}"))
                    })
                })
                .transpose()?,
            window: parse_or(&var, "CYBERPUNK_WINDOW", defaults.window)?,
            render_interval: Duration::from_millis(parse_or(
                &var,
                "CYBERPUNK_RENDER_INTERVAL_MS",
                defaults.render_interval.as_millis() as u64,
            )?),
            recv_timeout: var("CYBERPUNK_RECV_TIMEOUT_MS")
                .map(|value| parse_value::<u64>("CYBERPUNK_RECV_TIMEOUT_MS", &value))
                .transpose()?
                .map(Duration::from_millis),
            reconnect_delay: Duration::from_millis(parse_or(
                &var,
                "CYBERPUNK_RECONNECT_DELAY_MS",
                0,
            )?),
            awtrix_host: var("AWTRIX_HOST").unwrap_or(defaults.awtrix_host),
            awtrix_port: parse_or(&var, "AWTRIX_PORT", defaults.awtrix_port)?,
            serial_port: var("SERIAL_PORT").unwrap_or(defaults.serial_port),
            serial_baud_rate: parse_or(&var, "SERIAL_BAUD_RATE", defaults.serial_baud_rate)?,
            nixie_brightness: parse_or(&var, "NIXIE_BRIGHTNESS", defaults.nixie_brightness)
                .and_then(|brightness| match brightness {
                    0..=nixie::MAX_BRIGHTNESS => Ok(brightness),
                    _ => Err(DisplayError::Brightness(brightness)),
                })?,
            vfd_switch_interval: Duration::from_secs(parse_or(
                &var,
                "VFD_SWITCH_SECS",
                defaults.vfd_switch_interval.as_secs(),
            )?),
            price_overlay: parse_or(&var, "CYBERPUNK_PRICE_OVERLAY", defaults.price_overlay)?,
        })
    }

    pub fn with_exchange(mut self, exchange: ExchangeId) -> Self {
        self.exchange = exchange;
        self
    }

    pub fn with_markets(mut self, markets: Vec<MarketConfig>) -> Self {
        self.markets = markets;
        self
    }

    pub fn with_ws_url(mut self, url: Url) -> Self {
        self.ws_url = Some(url);
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_render_interval(mut self, interval: Duration) -> Self {
        self.render_interval = interval;
        self
    }

    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Market whose prices feed the chart.
    pub fn chart_market(&self) -> Result<&Market, DisplayError> {
        self.markets
            .first()
            .map(|config| &config.market)
            .ok_or_else(|| DisplayError::Config("no markets configured".to_string()))
    }

    /// Pixel-font overlay of the first two markets, if enabled.
    pub fn overlay(&self) -> Option<PriceOverlay> {
        if !self.price_overlay {
            return None;
        }
        PriceOverlay::from_markets(&self.markets)
    }

    /// Subscribed markets without display settings.
    pub fn feed_markets(&self) -> Vec<Market> {
        self.markets
            .iter()
            .map(|config| config.market.clone())
            .collect()
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, DisplayError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|error| DisplayError::Config(format!("{key}={value}: {error}")))
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, DisplayError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => parse_value(key, &value),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_market_config_from_str() {
        struct TestCase {
            input: &'static str,
            expected: Result<MarketConfig, ()>,
        }

        let tests = vec![
            TestCase {
                // TC0: symbol only derives the name
                input: "ethusdt",
                expected: Ok(MarketConfig::new(
                    Market::new("ethusdt".into(), "ETH".into()),
                    2,
                )),
            },
            TestCase {
                // TC1: explicit name is upper-cased
                input: "btcusdt:btc",
                expected: Ok(MarketConfig::new(
                    Market::new("btcusdt".into(), "BTC".into()),
                    2,
                )),
            },
            TestCase {
                // TC2: explicit precision
                input: " uniusdt:UNI:4 ",
                expected: Ok(MarketConfig::new(
                    Market::new("uniusdt".into(), "UNI".into()),
                    4,
                )),
            },
            TestCase {
                // TC3: invalid precision
                input: "uniusdt:UNI:four",
                expected: Err(()),
            },
            TestCase {
                // TC4: empty symbol
                input: ":BTC",
                expected: Err(()),
            },
            TestCase {
                // TC5: too many fields
                input: "btcusdt:BTC:2:x",
                expected: Err(()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = MarketConfig::from_str(test.input).map_err(|_| ());
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_parse_markets() {
        let actual = parse_markets("btcusdt:BTC, ethusdt:ETH,,ltcusdt:LTC:3").unwrap();
        let symbols = actual
            .iter()
            .map(|config| config.market.symbol.as_str())
            .collect::<Vec<_>>();

        assert_eq!(symbols, vec!["btcusdt", "ethusdt", "ltcusdt"]);
        assert_eq!(actual[2].precision, 3);
        assert!(parse_markets(" , ").is_err());
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let actual = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(actual, Config::default());
        assert_eq!(actual.window, 32);
        assert_eq!(actual.render_interval, Duration::from_millis(100));
        assert_eq!(actual.chart_market().unwrap().name, "BTC");
        assert_eq!(actual.serial_port, "/dev/ttyUSB0");
        assert_eq!(actual.serial_baud_rate, 9600);
        assert_eq!(actual.overlay(), None);
    }

    #[test]
    fn test_config_from_lookup_overrides() {
        let actual = Config::from_lookup(lookup(&[
            ("CYBERPUNK_EXCHANGE", "binance"),
            ("CYBERPUNK_MARKETS", "ethusdt:ETH,btcusdt:BTC"),
            ("CYBERPUNK_WS_URL", "ws://127.0.0.1:9001"),
            ("CYBERPUNK_WINDOW", "16"),
            ("CYBERPUNK_RENDER_INTERVAL_MS", "250"),
            ("CYBERPUNK_RECV_TIMEOUT_MS", "5000"),
            ("CYBERPUNK_RECONNECT_DELAY_MS", "1000"),
            ("AWTRIX_HOST", "awtrix.local"),
            ("AWTRIX_PORT", "7001"),
            ("SERIAL_PORT", "/dev/ttyACM0"),
            ("SERIAL_BAUD_RATE", "19200"),
            ("NIXIE_BRIGHTNESS", "4"),
            ("VFD_SWITCH_SECS", "5"),
            ("CYBERPUNK_PRICE_OVERLAY", "true"),
        ]))
        .unwrap();

        assert_eq!(actual.exchange, ExchangeId::Binance);
        assert_eq!(actual.chart_market().unwrap().symbol, "ethusdt");
        assert_eq!(actual.feed_markets().len(), 2);
        assert_eq!(actual.ws_url, Some(Url::parse("ws://127.0.0.1:9001").unwrap()));
        assert_eq!(actual.window, 16);
        assert_eq!(actual.render_interval, Duration::from_millis(250));
        assert_eq!(actual.recv_timeout, Some(Duration::from_secs(5)));
        assert_eq!(actual.reconnect_delay, Duration::from_secs(1));
        assert_eq!(actual.awtrix_host, "awtrix.local");
        assert_eq!(actual.awtrix_port, 7001);
        assert_eq!(actual.serial_port, "/dev/ttyACM0");
        assert_eq!(actual.serial_baud_rate, 19200);
        assert_eq!(actual.nixie_brightness, 4);
        assert_eq!(actual.vfd_switch_interval, Duration::from_secs(5));
        assert_eq!(
            actual.overlay(),
            Some(PriceOverlay::new("ethusdt").with_secondary("btcusdt"))
        );
    }

    #[test]
    fn test_config_from_lookup_invalid() {
        struct TestCase {
            input: (&'static str, &'static str),
            expected: DisplayError,
        }

        let tests = vec![
            TestCase {
                // TC0: unsupported exchange
                input: ("CYBERPUNK_EXCHANGE", "okx"),
                expected: DisplayError::Config(String::new()),
            },
            TestCase {
                // TC1: non-numeric window
                input: ("CYBERPUNK_WINDOW", "wide"),
                expected: DisplayError::Config(String::new()),
            },
            TestCase {
                // TC2: brightness above the tube maximum
                input: ("NIXIE_BRIGHTNESS", "9"),
                expected: DisplayError::Brightness(9),
            },
            TestCase {
                // TC3: malformed url
                input: ("CYBERPUNK_WS_URL", "not a url"),
                expected: DisplayError::Config(String::new()),
            },
            TestCase {
                // TC4: port out of range
                input: ("AWTRIX_PORT", "70000"),
                expected: DisplayError::Config(String::new()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = Config::from_lookup(lookup(&[test.input]));
            match (actual, test.expected) {
                (Err(DisplayError::Config(_)), DisplayError::Config(_)) => {
                    // Test passed
                }
                (Err(actual), expected) => {
                    assert_eq!(actual, expected, "TC{} failed", index)
                }
                (Ok(actual), expected) => {
                    panic!("TC{index} failed. \nActual: {actual:?}\nExpected: {expected:?}\n");
                }
            }
        }
    }
}
