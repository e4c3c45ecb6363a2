//! Feed → window/slot → renderer → sink wiring.
//!
//! A producer task owns the [`StreamClient`], pushing chart prices into the
//! [`SlidingWindow`] and every price into the [`LatestValueSlot`]. The render loop drains
//! the slot, drops updates arriving faster than the [`Throttle`] allows, renders the window
//! and hands the resulting [`Frame`] to a [`DisplaySink`].

use crate::{
    config::Config,
    error::DisplayError,
    render::Frame,
    sink::{DisplaySink, LatestPrices, Update},
    slot::LatestValueSlot,
    throttle::Throttle,
    window::SlidingWindow,
};
use cyberpunk_data::{Binance, Connector, ExchangeId, Huobi, MarketPrice, StreamClient};
use smol_str::SmolStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Latest delivered price plus the latest price of every market seen so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub price: MarketPrice,
    pub latest: LatestPrices,
}

/// Handle to the producer task. Resolves with the fatal error that ended the feed.
pub type FeedHandle = JoinHandle<Result<(), DisplayError>>;

/// State shared between the producer task and the render loop.
#[derive(Debug, Clone)]
pub struct Shared {
    pub window: Arc<SlidingWindow>,
    pub slot: Arc<LatestValueSlot<Tick>>,
}

impl Shared {
    pub fn new(window_capacity: usize) -> Self {
        Self {
            window: Arc::new(SlidingWindow::new(window_capacity)),
            slot: Arc::new(LatestValueSlot::new()),
        }
    }
}

/// Spawn the producer task for `client`.
///
/// Prices of `chart` are pushed into the window, every price is put into the slot. The task
/// only ends on a fatal [`DataError`](cyberpunk_data::DataError).
pub fn spawn_feed<Exchange>(
    mut client: StreamClient<Exchange>,
    chart: SmolStr,
    shared: Shared,
    recv_timeout: Option<std::time::Duration>,
) -> FeedHandle
where
    Exchange: Connector + Send + 'static,
{
    tokio::spawn(async move {
        let mut latest = LatestPrices::new();

        loop {
            let price = match client.recv_price(recv_timeout).await {
                Ok(Some(price)) => price,
                Ok(None) => {
                    debug!("no price received within timeout");
                    continue;
                }
                Err(error) => {
                    error!(%error, "price feed failed");
                    return Err(DisplayError::from(error));
                }
            };

            debug!(%price, "received price");
            if price.symbol == chart {
                shared.window.push(price.price);
            }
            latest.insert(price.symbol.clone(), price.price);

            shared.slot.put(Tick {
                price,
                latest: latest.clone(),
            });
        }
    })
}

/// Build the [`StreamClient`] described by `config` and spawn its producer task.
pub fn spawn_configured_feed(config: &Config, shared: Shared) -> Result<FeedHandle, DisplayError> {
    let chart = config.chart_market()?.symbol.clone();

    let handle = match config.exchange {
        ExchangeId::Huobi => spawn_feed(
            client::<Huobi>(config)?,
            chart,
            shared,
            config.recv_timeout,
        ),
        ExchangeId::Binance => spawn_feed(
            client::<Binance>(config)?,
            chart,
            shared,
            config.recv_timeout,
        ),
    };

    Ok(handle)
}

fn client<Exchange>(config: &Config) -> Result<StreamClient<Exchange>, DisplayError>
where
    Exchange: Connector,
{
    let client = StreamClient::<Exchange>::new(config.feed_markets())?
        .with_reconnect_delay(config.reconnect_delay);

    Ok(match &config.ws_url {
        Some(url) => client.with_url(url.clone()),
        None => client,
    })
}

/// Render loop. Returns when the sink fails or the feed task ends.
pub async fn run<Sink>(
    shared: &Shared,
    throttle: &mut Throttle,
    sink: &mut Sink,
    feed: &mut FeedHandle,
) -> Result<(), DisplayError>
where
    Sink: DisplaySink + ?Sized,
{
    loop {
        let idle_interval = sink.idle_interval();

        let tick = tokio::select! {
            result = &mut *feed => {
                return match result {
                    Ok(Ok(())) => Err(DisplayError::FeedEnded),
                    Ok(Err(error)) => Err(error),
                    Err(error) => {
                        error!(%error, "price feed task failed");
                        Err(DisplayError::FeedEnded)
                    }
                };
            }
            tick = next_tick(&shared.slot, idle_interval) => tick,
        };

        let Some(tick) = tick else {
            sink.idle().await?;
            continue;
        };

        if !throttle.try_acquire() {
            debug!(price = %tick.price, "dropped update within render interval");
            continue;
        }

        let prices = match shared.window.snapshot() {
            Ok(prices) => prices,
            Err(DisplayError::EmptyWindow) => {
                debug!(price = %tick.price, "chart window still empty");
                continue;
            }
            Err(error) => return Err(error),
        };

        let frame = Frame::render(&prices);
        debug!(trend = %frame.trend_line(), "rendered frame");

        sink.show(&Update {
            price: &tick.price,
            frame: &frame,
            latest: &tick.latest,
        })
        .await?;
    }
}

/// Next [`Tick`], or `None` if `idle_interval` elapses first.
async fn next_tick(
    slot: &LatestValueSlot<Tick>,
    idle_interval: Option<std::time::Duration>,
) -> Option<Tick> {
    match idle_interval {
        Some(interval) => tokio::time::timeout(interval, slot.take()).await.ok(),
        None => Some(slot.take().await),
    }
}

/// Drive `sink` from the feed described by `config` until a fatal error or Ctrl-C, then
/// close the sink.
pub async fn run_until_shutdown<Sink>(config: &Config, sink: &mut Sink) -> Result<(), DisplayError>
where
    Sink: DisplaySink + ?Sized,
{
    let shared = Shared::new(config.window);
    let mut feed = spawn_configured_feed(config, shared.clone())?;
    let mut throttle = Throttle::new(config.render_interval);

    info!(
        exchange = %config.exchange,
        chart = %config.chart_market()?,
        markets = config.markets.len(),
        window = config.window,
        "starting display pipeline"
    );

    let result = tokio::select! {
        result = run(&shared, &mut throttle, sink, &mut feed) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl-C, shutting down");
            Ok(())
        }
    };

    feed.abort();

    if let Err(error) = sink.close().await {
        error!(%error, "failed to close display");
    }

    result
}
