use std::future::Future;

use anyhow::Result;

use super::Db;

/// A record of a database migration
#[derive(Debug, sqlx::FromRow)]
#[cfg_attr(not(test), allow(dead_code))]
pub struct Migration {
    pub id: i64,
    pub name: String,
}

impl Migration {
    /// Create the table which tracks applied migrations.
    pub async fn migrate(db: &Db) -> Result<()> {
        db.query(
            "CREATE TABLE IF NOT EXISTS migrations ( \
                id INTEGER PRIMARY KEY NOT NULL, \
                name TEXT NOT NULL UNIQUE \
            )",
        )
        .execute(db.pool())
        .await?;
        Ok(())
    }

    /// Run `func` unless a migration called `name` has already been applied.
    pub async fn run(db: &Db, name: &str, func: impl Future<Output = Result<()>>) -> Result<()> {
        let id: Option<i64> = db
            .query_scalar("SELECT id FROM migrations WHERE name = ?")
            .bind(name)
            .fetch_optional(db.pool())
            .await?;

        if id.is_none() {
            tracing::info!("Running migration {name:?}");
            func.await?;
            db.query("INSERT INTO migrations (name) VALUES (?)")
                .bind(name)
                .execute(db.pool())
                .await?;
        }

        Ok(())
    }

    /// List every applied migration, oldest first.
    #[cfg(test)]
    pub async fn list(db: &Db) -> Result<Vec<Migration>> {
        let migrations = db
            .query_as::<Migration>("SELECT * FROM migrations ORDER BY id")
            .fetch_all(db.pool())
            .await?;
        Ok(migrations)
    }
}
