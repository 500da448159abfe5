use anyhow::Context;

use libcat_infra::{db, AppConfig, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    libcat_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let pool = db::connect(&config.database_url, 8)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    let store = SqliteStore::new(pool);

    if let Some(admin) = &config.bootstrap_admin {
        store
            .ensure_admin(&admin.username, &admin.password)
            .await
            .context("failed to provision bootstrap admin")?;
    }

    let app = libcat_api::app::build_app(config.jwt, store);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
