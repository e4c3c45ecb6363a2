/// Matrix - terminal chart of the live price window
///
/// Prints the 8-row trend chart as coloured blocks, redrawn in place on every accepted
/// update. Logs go to stderr.
use cyberpunk_display::{
    Config, DisplayError, TerminalSink, logging::init_logging_stderr,
    pipeline::run_until_shutdown,
};
use rustls::crypto::ring::default_provider;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), DisplayError> {
    let _ = default_provider().install_default();
    init_logging_stderr();

    let config = Config::from_env().inspect_err(|error| error!(%error, "invalid configuration"))?;
    let mut sink = TerminalSink::stdout();
    if let Some(overlay) = config.overlay() {
        sink = sink.with_overlay(overlay);
    }

    run_until_shutdown(&config, &mut sink)
        .await
        .inspect_err(|error| error!(%error, "matrix display stopped"))
}
