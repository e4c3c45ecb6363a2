/// Nixie - latest chart market price on six Nixie tubes
///
/// Brightness is set once at start-up from `NIXIE_BRIGHTNESS` (0..=8) and the tubes are
/// blanked on shutdown.
use cyberpunk_display::{
    Config, DisplayError, NixieSink, logging::init_logging, pipeline::run_until_shutdown,
    sink::serial::SerialDevice,
};
use rustls::crypto::ring::default_provider;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), DisplayError> {
    let _ = default_provider().install_default();
    init_logging();

    let config = Config::from_env().inspect_err(|error| error!(%error, "invalid configuration"))?;
    let device = SerialDevice::open(&config.serial_port, config.serial_baud_rate)
        .inspect_err(|error| error!(%error, "failed to open nixie"))?;

    let symbol = config.chart_market()?.symbol.clone();
    let mut sink = NixieSink::init(device, symbol, config.nixie_brightness).await?;

    run_until_shutdown(&config, &mut sink)
        .await
        .inspect_err(|error| error!(%error, "nixie display stopped"))
}
