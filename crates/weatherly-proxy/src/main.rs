use anyhow::Result;
use tokio_util::sync::CancellationToken;
use weatherly_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Local secrets; a missing file is fine
    dotenv::from_filename(".env.local").ok();

    weatherly_core::init()?;

    let (config, _) = Config::load_validated()?;

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutting down");
                on_signal.cancel();
            }
            Err(e) => tracing::warn!("Cannot listen for Ctrl-C: {}", e),
        }
    });

    weatherly_proxy::serve(config.proxy, shutdown).await
}
