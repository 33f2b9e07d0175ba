use tokio::net::TcpListener;
use todo_core::{TodoClient, TodoRepository};
use todo_web::{app, telemetry, AppState, Config, UreqTransport};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init()?;

    let config = Config::from_env()?;
    let mut client = TodoClient::new(&config.store_url).with_table(&config.table);
    if let Some(key) = &config.api_key {
        client = client.with_api_key(key);
    }
    let repository = TodoRepository::new(client, UreqTransport::new(config.timeout));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, store = %config.store_url, table = %config.table, "listening");

    axum::serve(listener, app(AppState::new(repository)?))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
