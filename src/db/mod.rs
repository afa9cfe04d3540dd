use std::sync::Arc;

use anyhow::Context as _;
use sqlx::migrate::MigrateDatabase;
use sqlx::query::{Query, QueryAs, QueryScalar};
use sqlx::sqlite::{SqliteArguments, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Sqlite, SqlitePool};

use crate::utils::config::DbConfig;

pub mod counter;
pub mod editor;
pub mod migration;

use counter::StatementCounter;
use migration::Migration;

/// A handle to the database.
///
/// All statements are issued through [`Db::query`], [`Db::query_as`], or
/// [`Db::query_scalar`], which record them on the attached
/// [`StatementCounter`] if there is one.
#[derive(Clone, Debug)]
pub struct Db {
    pool: SqlitePool,
    counter: Option<Arc<StatementCounter>>,
}

impl Db {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, counter: None }
    }

    /// Attach a statement counter.
    #[cfg(test)]
    pub fn with_counter(mut self, counter: Arc<StatementCounter>) -> Self {
        self.counter = Some(counter);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[cfg(test)]
    pub fn counter(&self) -> Option<&Arc<StatementCounter>> {
        self.counter.as_ref()
    }

    fn record(&self, sql: &str) {
        if let Some(counter) = &self.counter {
            counter.record(sql);
        }
    }

    pub fn query<'q>(&self, sql: &'q str) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        self.record(sql);
        sqlx::query(sql)
    }

    pub fn query_as<'q, T>(&self, sql: &'q str) -> QueryAs<'q, Sqlite, T, SqliteArguments<'q>>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        self.record(sql);
        sqlx::query_as(sql)
    }

    pub fn query_scalar<'q, T>(&self, sql: &'q str) -> QueryScalar<'q, Sqlite, T, SqliteArguments<'q>>
    where
        (T,): for<'r> FromRow<'r, SqliteRow>,
    {
        self.record(sql);
        sqlx::query_scalar(sql)
    }
}

/// Create a new db connection pool, initializing and running migrations if necessary.
pub async fn init(db_config: &DbConfig) -> anyhow::Result<Db> {
    let pool = if db_config.file.as_os_str() == ":memory:" {
        memory_pool().await?
    } else {
        let url = format!("sqlite://{}", db_config.file.display());
        if !Sqlite::database_exists(&url).await? {
            tracing::info!("Creating database {url:?}");
            Sqlite::create_database(&url).await?;
        }
        let mut options = SqlitePoolOptions::new();
        if let Some(max) = db_config.max_connections {
            options = options.max_connections(max);
        }
        options.connect(&url).await.with_context(|| format!("connecting to {url}"))?
    };

    let db = Db::new(pool);
    migrate(&db).await?;
    Ok(db)
}

/// Apply all migrations which haven't been run yet.
pub async fn migrate(db: &Db) -> anyhow::Result<()> {
    Migration::migrate(db).await?;
    Migration::run(db, "create_editors", editor::create_table(db)).await?;
    Ok(())
}

/// A single-connection in-memory pool.
///
/// Every sqlite in-memory connection is its own database, so the pool must
/// never open a second one or drop the first.
async fn memory_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}

/// A migrated in-memory database with a fresh statement counter attached.
#[cfg(test)]
pub async fn test_db() -> (Db, Arc<StatementCounter>) {
    let pool = memory_pool().await.unwrap();
    let db = Db::new(pool);
    migrate(&db).await.unwrap();

    let counter = Arc::new(StatementCounter::new());
    (db.with_counter(Arc::clone(&counter)), counter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig { file: dir.path().join("editors.db"), max_connections: Some(2) };

        let db = init(&config).await.unwrap();
        let tables: i64 = db
            .query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'editors'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(tables, 1);
        assert!(config.file.exists());

        // Reopening an existing database doesn't re-run migrations
        db.pool().close().await;
        init(&config).await.unwrap();
    }

    #[tokio::test]
    async fn counts_only_when_attached() {
        let (db, counter) = test_db().await;
        db.query("SELECT 1").execute(db.pool()).await.unwrap();
        assert_eq!(counter.total(), 1);

        let plain = Db::new(db.pool().clone());
        plain.query("SELECT 1").execute(plain.pool()).await.unwrap();
        assert_eq!(counter.total(), 1);
        assert!(plain.counter().is_none());
    }
}
