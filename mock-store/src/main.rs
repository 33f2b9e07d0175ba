use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};

/// Install a global fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Same setup as the web binary's `telemetry::init`; the two binaries share
/// no runtime dependency, so each carries its own copy.
fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let port = std::env::var("PORT").unwrap_or_else(|_| "54321".to_string());
    let table = std::env::var("TODO_TABLE").unwrap_or_else(|_| mock_store::DEFAULT_TABLE.to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, %table, "mock store listening");

    axum::serve(listener, mock_store::app_for_table(&table))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
