use std::net::SocketAddr;

use anyhow::Context;

use pg_hostel::{
    auth::bootstrap::init_providers,
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    routes::app,
    services::ServiceContext,
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        eprintln!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;
    init_tracing(&cfg.logging.rust_log);

    let db_cfg = cfg
        .database
        .clone()
        .context("database configuration is required (APP_DATABASE__URL)")?;
    let auth_cfg = cfg
        .auth
        .clone()
        .context("auth configuration is required (APP_AUTH__JWT_SECRET, APP_AUTH__ADMIN_EMAIL, APP_AUTH__ADMIN_PASSWORD)")?;

    let db = connection::connect(&db_cfg).await?;
    let services = ServiceContext::new(&db);
    let providers = init_providers(&auth_cfg, &services).await?;

    let addr: SocketAddr = cfg
        .bind_addr()
        .parse()
        .with_context(|| format!("invalid host/port: {}", cfg.bind_addr()))?;
    let state = AppState::new(cfg, db, providers);

    tracing::info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
