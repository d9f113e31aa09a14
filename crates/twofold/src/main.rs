use twofold::{MemoryHistoryStore, ServerConfig, TwofoldServerBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "twofold=info,twofold_room=info,twofold_session=info".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        ws = %config.ws_addr,
        http = %config.http_addr,
        "starting twofold server"
    );

    let server = TwofoldServerBuilder::new()
        .config(config)
        .build(MemoryHistoryStore::new())
        .await?;

    server.run().await?;
    Ok(())
}
