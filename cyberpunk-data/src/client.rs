//! Resilient feed client.
//!
//! A [`StreamClient`] owns its WebSocket connection exclusively. Disconnects, transport
//! errors and closing frames are recovered by replacing the connection wholesale and
//! resubscribing every configured market, so callers only ever observe prices, the
//! "no data yet" timeout signal, or a fatal protocol [`DataError`].

use crate::{
    error::DataError,
    exchange::{Connector, FeedMessage, WsMessage},
    market::{Market, MarketPrice, find_market},
};
use futures::{SinkExt, Stream, StreamExt, stream};
use std::{marker::PhantomData, time::Duration};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

/// Convenient type alias for the live connection owned by a [`StreamClient`].
pub type WebSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// [`StreamClient`] configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Feed server url.
    pub url: Url,
    /// Markets subscribed to after every (re)connect.
    pub markets: Vec<Market>,
    /// Fixed pause before each reconnect attempt. Zero retries immediately.
    pub reconnect_delay: Duration,
}

/// Streaming trade-price client for a feed [`Connector`].
#[derive(Debug)]
pub struct StreamClient<Exchange> {
    config: StreamConfig,
    connection: Option<WebSocket>,
    connections: u64,
    phantom: PhantomData<fn() -> Exchange>,
}

impl<Exchange> StreamClient<Exchange>
where
    Exchange: Connector,
{
    /// Construct a disconnected client for the [`Connector`] default url.
    pub fn new(markets: Vec<Market>) -> Result<Self, DataError> {
        Ok(Self::with_config(StreamConfig {
            url: Exchange::url()?,
            markets,
            reconnect_delay: Duration::ZERO,
        }))
    }

    /// Construct a disconnected client from a [`StreamConfig`].
    pub fn with_config(config: StreamConfig) -> Self {
        Self {
            config,
            connection: None,
            connections: 0,
            phantom: PhantomData,
        }
    }

    /// Override the feed url.
    pub fn with_url(mut self, url: Url) -> Self {
        self.config.url = url;
        self
    }

    /// Set the fixed reconnect delay.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.reconnect_delay = delay;
        self
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn markets(&self) -> &[Market] {
        &self.config.markets
    }

    /// Number of connections established over the lifetime of this client.
    pub fn connections(&self) -> u64 {
        self.connections
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Connect and subscribe to every configured market, retrying until it succeeds.
    pub async fn connect(&mut self) {
        self.connection = None;

        loop {
            match self.try_connect().await {
                Ok(socket) => {
                    self.connection = Some(socket);
                    self.connections += 1;
                    info!(
                        exchange = %Exchange::ID,
                        url = %self.config.url,
                        markets = self.config.markets.len(),
                        "connected and subscribed"
                    );
                    return;
                }
                Err(error) => {
                    warn!(exchange = %Exchange::ID, %error, "failed to connect, retrying");
                    if self.config.reconnect_delay.is_zero() {
                        tokio::task::yield_now().await;
                    } else {
                        tokio::time::sleep(self.config.reconnect_delay).await;
                    }
                }
            }
        }
    }

    async fn try_connect(&self) -> Result<WebSocket, DataError> {
        info!(exchange = %Exchange::ID, url = %self.config.url, "connecting");
        let (mut socket, _) = connect_async(self.config.url.as_str()).await?;

        for request in Exchange::requests(&self.config.markets) {
            debug!(exchange = %Exchange::ID, payload = %request, "subscribing");
            socket.send(request).await?;
        }

        Ok(socket)
    }

    async fn reconnect(&mut self, reason: &str) {
        warn!(exchange = %Exchange::ID, reason, "connection lost, reconnecting");
        self.connect().await;
    }

    /// Send a message on the current connection, reconnecting if the transport fails.
    async fn send(&mut self, message: WsMessage) {
        let result = match self.connection.as_mut() {
            Some(socket) => socket.send(message).await.map_err(DataError::from),
            None => return,
        };

        if let Err(error) = result {
            self.reconnect(&error.to_string()).await;
        }
    }

    /// Wait for the next trade price.
    ///
    /// Subscription acknowledgements and keepalives are consumed internally. With a
    /// `timeout`, each socket read is bounded and `Ok(None)` is returned on expiry.
    pub async fn recv_price(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Option<MarketPrice>, DataError> {
        loop {
            if self.connection.is_none() {
                self.connect().await;
            }
            let Some(socket) = self.connection.as_mut() else {
                continue;
            };

            let next = match timeout {
                Some(duration) => match tokio::time::timeout(duration, socket.next()).await {
                    Ok(next) => next,
                    Err(_) => return Ok(None),
                },
                None => socket.next().await,
            };

            let message = match next {
                Some(Ok(message)) => message,
                Some(Err(error)) => {
                    self.reconnect(&DataError::from(error).to_string()).await;
                    continue;
                }
                None => {
                    self.reconnect("stream ended").await;
                    continue;
                }
            };

            match message {
                WsMessage::Text(_) | WsMessage::Binary(_) => {}
                WsMessage::Ping(_) => {
                    // Tungstenite queues the matching Pong and flushes it on the next read
                    debug!(exchange = %Exchange::ID, "received ping frame");
                    continue;
                }
                WsMessage::Close(frame) => {
                    let reason = frame
                        .map(|frame| format!("closed by server: {}", frame.reason.as_str()))
                        .unwrap_or_else(|| "closed by server".to_string());
                    self.reconnect(&reason).await;
                    continue;
                }
                WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
            }

            let decoded = match Exchange::decode(message) {
                Ok(decoded) => decoded,
                Err(error) if error.is_terminal() => {
                    self.reconnect(&error.to_string()).await;
                    continue;
                }
                Err(error) => return Err(error),
            };

            match decoded {
                FeedMessage::Subscribed(channel) => {
                    info!(exchange = %Exchange::ID, %channel, "subscription acknowledged");
                }
                FeedMessage::Heartbeat(reply) => {
                    debug!(exchange = %Exchange::ID, payload = %reply, "received ping, sending pong");
                    self.send(reply).await;
                }
                FeedMessage::Trade(price) => {
                    find_market(&self.config.markets, &price.symbol)?;
                    return Ok(Some(price));
                }
                FeedMessage::Ignore => {}
            }
        }
    }

    /// Adapt the client into a [`Stream`] of prices that ends after the first fatal error.
    pub fn into_stream(self) -> impl Stream<Item = Result<MarketPrice, DataError>> {
        stream::unfold(Some(self), |client| async move {
            let mut client = client?;
            loop {
                match client.recv_price(None).await {
                    Ok(Some(price)) => return Some((Ok(price), Some(client))),
                    Ok(None) => continue,
                    Err(error) => return Some((Err(error), None)),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::ExchangeId;

    /// Connector type that is neither `Send` nor `Sync`.
    #[allow(dead_code)]
    struct LocalFeed(PhantomData<*const ()>);

    impl Connector for LocalFeed {
        const ID: ExchangeId = ExchangeId::Huobi;

        fn url() -> Result<Url, DataError> {
            Url::parse("ws://127.0.0.1:9").map_err(DataError::from)
        }

        fn requests(_: &[Market]) -> Vec<WsMessage> {
            Vec::new()
        }

        fn decode(_: WsMessage) -> Result<FeedMessage, DataError> {
            Ok(FeedMessage::Ignore)
        }
    }

    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_stream_client_is_send_for_any_connector() {
        let mut client = StreamClient::<LocalFeed>::new(Vec::new()).unwrap();
        assert_send_sync(&client);

        let recv = client.recv_price(None);
        assert_send(&recv);
    }
}
