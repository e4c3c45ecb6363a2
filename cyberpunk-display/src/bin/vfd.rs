/// VFD - latest prices on a 2x16 vacuum fluorescent display
///
/// Line 1 shows the first configured market, line 2 cycles through the rest every
/// `VFD_SWITCH_SECS`. The device is written through `SERIAL_PORT`.
use cyberpunk_display::{
    Config, DisplayError, VfdSink, logging::init_logging, pipeline::run_until_shutdown,
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
        .inspect_err(|error| error!(%error, "failed to open vfd"))?;
    let mut sink =
        VfdSink::new(device, &config.markets).with_switch_interval(config.vfd_switch_interval);

    run_until_shutdown(&config, &mut sink)
        .await
        .inspect_err(|error| error!(%error, "vfd display stopped"))
}
