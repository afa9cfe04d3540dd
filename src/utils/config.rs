use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context as _;

impl Config {
    /// Load a `.toml` file from disk and parse it as a [`Config`].
    pub async fn load(file: &str) -> anyhow::Result<Config> {
        async fn load_inner(file: &str) -> anyhow::Result<Config> {
            let contents = tokio::fs::read_to_string(file).await?;
            Config::parse(&contents)
        }
        load_inner(file).await.with_context(|| format!("loading config={file}"))
    }

    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        Ok(toml::from_str(contents)?)
    }
}

/// Bag of app configuration values, parsed from a TOML file with serde.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub db: DbConfig,
    pub net: NetConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Webapp configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AppConfig {
    /// Application name, used as the prefix of alert headers, e.g. `bookApi`.
    pub name: String,
    /// Public facing URL, e.g. `https://site.com`. Pagination links are built from it.
    pub url: String,
    /// Send translation keys instead of messages in alert headers.
    #[serde(default)]
    pub enable_translation: bool,
}

/// Database configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct DbConfig {
    /// Path to sqlite3 database file, or `:memory:`.
    pub file: PathBuf,
    pub max_connections: Option<u32>,
}

/// Networking configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct NetConfig {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Serve HTTPS with this certificate instead of plain HTTP.
    pub tls: Option<TlsConfig>,
}

/// PEM encoded TLS certificate and key.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct TlsConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Paged query configuration.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size when the request doesn't specify one.
    pub default_size: u32,
    /// Largest page size a request may ask for.
    pub max_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { default_size: 20, max_size: 2000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let config = Config::parse(
            r#"
            [app]
            name = "bookApi"
            url = "http://localhost:8080"

            [db]
            file = ":memory:"

            [net]
            addr = "127.0.0.1:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.app.name, "bookApi");
        assert!(!config.app.enable_translation);
        assert_eq!(config.db.max_connections, None);
        assert!(config.net.tls.is_none());
        assert_eq!(config.pagination.default_size, 20);
        assert_eq!(config.pagination.max_size, 2000);
    }

    #[test]
    fn parses_full_config() {
        let config = Config::parse(
            r#"
            [app]
            name = "bookApi"
            url = "https://books.example.com"
            enable_translation = true

            [db]
            file = "data/editors.db"
            max_connections = 4

            [net]
            addr = "0.0.0.0:443"
            tls = { cert = "certs/cert.pem", key = "certs/key.pem" }

            [pagination]
            default_size = 50
            "#,
        )
        .unwrap();

        assert!(config.app.enable_translation);
        assert_eq!(config.db.max_connections, Some(4));
        assert_eq!(config.net.tls.unwrap().key, PathBuf::from("certs/key.pem"));
        assert_eq!(config.pagination.default_size, 50);
        assert_eq!(config.pagination.max_size, 2000);
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let err = Config::load("does/not/exist.toml").await.unwrap_err();
        assert!(err.to_string().contains("does/not/exist.toml"));
    }
}
