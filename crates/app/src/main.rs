use std::sync::Arc;

mod settings;
mod snapshot;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "billsplit={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let rooms = match &settings.store.snapshot {
        Some(path) => {
            let rooms = snapshot::load(path)?;
            tracing::info!("Loaded {} rooms from {}", rooms.len(), path.display());
            rooms
        }
        None => Vec::new(),
    };

    let engine = Arc::new(
        engine::Engine::builder()
            .rooms(rooms)
            .code_attempts(settings.store.code_attempts)
            .build()?,
    );

    let listener = tokio::net::TcpListener::bind(settings.addr()).await?;
    server::run_with_listener(engine.clone(), listener, shutdown_signal()).await?;

    if let Some(path) = &settings.store.snapshot {
        let rooms = engine.export().await;
        snapshot::save(path, &rooms)?;
        tracing::info!("Saved {} rooms to {}", rooms.len(), path.display());
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
