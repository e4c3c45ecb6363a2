/// Awtrix - live price chart on an Awtrix 32x8 pixel matrix
///
/// Configure the endpoint with `AWTRIX_HOST` / `AWTRIX_PORT`. Set `CYBERPUNK_PRICE_OVERLAY=true`
/// to draw prices in a pixel font instead of the Awtrix text font.
use cyberpunk_display::{
    AwtrixSink, Config, DisplayError, logging::init_logging, pipeline::run_until_shutdown,
    sink::awtrix::AwtrixLayout,
};
use rustls::crypto::ring::default_provider;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), DisplayError> {
    let _ = default_provider().install_default();
    init_logging();

    let config = Config::from_env().inspect_err(|error| error!(%error, "invalid configuration"))?;
    let mut sink = AwtrixSink::new(&config.awtrix_host, config.awtrix_port)?;
    if let Some(overlay) = config.overlay() {
        sink = sink.with_layout(AwtrixLayout::Overlay(overlay));
    }
    info!(url = sink.url(), "drawing to awtrix");

    run_until_shutdown(&config, &mut sink)
        .await
        .inspect_err(|error| error!(%error, "awtrix display stopped"))
}
