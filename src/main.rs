mod app;
mod db;
mod prelude;
mod utils;

use anyhow::Context as _;
use axum_server::tls_rustls::RustlsConfig;
use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};
use utils::config::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_filter = tracing_subscriber::filter::Targets::default()
        .with_target("h2", LevelFilter::OFF)
        .with_target("rustls", LevelFilter::OFF)
        .with_target("sqlx", LevelFilter::WARN)
        .with_default(Level::DEBUG);

    tracing_subscriber::fmt()
        .pretty()
        .with_target(true)
        .with_line_number(true)
        .with_max_level(Level::DEBUG)
        .finish()
        .with(log_filter)
        .try_init()?;

    // Load the server config
    let file = std::env::args().nth(1).context("usage: editor-api <config.toml>")?;
    let config = Config::load(&file).await?;

    let app = app::build(config.clone()).await?.into_make_service();
    tracing::info!("Live at {} (listening on {})", &config.app.url, &config.net.addr);

    match config.net.tls {
        // Serve HTTPS with the configured certificate
        Some(tls) => {
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .with_context(|| format!("loading tls cert={:?} key={:?}", tls.cert, tls.key))?;
            axum_server::bind_rustls(config.net.addr, rustls).serve(app).await?;
        }
        // Otherwise, plain HTTP
        None => {
            axum_server::bind(config.net.addr).serve(app).await?;
        }
    }

    Ok(())
}
