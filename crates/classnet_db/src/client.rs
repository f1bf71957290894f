//! Connection pool behind the device registry
//!
//! One `sqlx::Any` pool, so the registry SQL runs unchanged against whichever
//! driver the URL names.

use crate::error::DbError;
use classnet_config::DatabaseConfig;
use sqlx::any::{AnyConnectOptions, AnyPoolOptions};
use sqlx::Pool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct DbClient {
    pool: Pool<sqlx::Any>,
}

impl DbClient {
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        if db_config.url.trim().is_empty() {
            return Err(DbError::ConfigError("database.url is empty".to_string()));
        }
        Self::from_url(&db_config.url).await
    }

    /// Connect to `db_url`. A file-backed sqlite database is created on first use.
    pub async fn from_url(db_url: &str) -> Result<Self, DbError> {
        if db_url.trim().is_empty() {
            return Err(DbError::UrlError("empty database url".to_string()));
        }
        sqlx::any::install_default_drivers();

        let options = AnyConnectOptions::from_str(db_url)?;
        let target = SqliteTarget::of(db_url);
        if let SqliteTarget::File(path) = target {
            create_sqlite_file(Path::new(path))?;
        }

        let pool = target
            .pool_options()
            .connect_with(options)
            .await
            .map_err(|e| {
                error!(error = %e, "could not open database pool");
                DbError::PoolError(e.to_string())
            })?;

        info!(in_memory = matches!(target, SqliteTarget::Memory), "database pool ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<sqlx::Any> {
        &self.pool
    }

    /// Run a statement without bind parameters, returning the affected rows.
    pub async fn execute(&self, statement: &str) -> Result<u64, DbError> {
        sqlx::query(statement)
            .execute(&self.pool)
            .await
            .map(|done| done.rows_affected())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// What a database URL means for sqlite-specific pool handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SqliteTarget<'a> {
    Memory,
    File(&'a str),
    NotSqlite,
}

impl<'a> SqliteTarget<'a> {
    fn of(db_url: &'a str) -> Self {
        let Some(rest) = db_url
            .strip_prefix("sqlite://")
            .or_else(|| db_url.strip_prefix("sqlite:"))
        else {
            return Self::NotSqlite;
        };
        if rest.contains(":memory:") || rest.contains("mode=memory") {
            return Self::Memory;
        }
        match rest.split('?').next() {
            Some(path) if !path.is_empty() => Self::File(path),
            _ => Self::NotSqlite,
        }
    }

    fn pool_options(self) -> AnyPoolOptions {
        match self {
            // Each new connection to :memory: is a separate empty database,
            // so the pool holds exactly one for its whole lifetime.
            Self::Memory => AnyPoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .acquire_timeout(ACQUIRE_TIMEOUT),
            _ => AnyPoolOptions::new()
                .max_connections(5)
                .idle_timeout(Duration::from_secs(600))
                .acquire_timeout(ACQUIRE_TIMEOUT),
        }
    }
}

// AnyConnectOptions has no create_if_missing.
fn create_sqlite_file(path: &Path) -> Result<(), DbError> {
    if path.exists() {
        return Ok(());
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| {
            DbError::PoolError(format!("cannot create {}: {}", dir.display(), e))
        })?;
    }
    debug!(path = %path.display(), "creating sqlite database file");
    std::fs::File::create(path)
        .map(|_| ())
        .map_err(|e| DbError::PoolError(format!("cannot create {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_urls() {
        assert_eq!(SqliteTarget::of("sqlite::memory:"), SqliteTarget::Memory);
        assert_eq!(
            SqliteTarget::of("sqlite:file:registry?mode=memory&cache=shared"),
            SqliteTarget::Memory
        );
        assert_eq!(
            SqliteTarget::of("sqlite:data/classnet.db"),
            SqliteTarget::File("data/classnet.db")
        );
        assert_eq!(
            SqliteTarget::of("sqlite://data/classnet.db?mode=rwc"),
            SqliteTarget::File("data/classnet.db")
        );
        assert_eq!(
            SqliteTarget::of("postgres://localhost/classnet"),
            SqliteTarget::NotSqlite
        );
    }

    #[tokio::test]
    async fn in_memory_pool_is_healthy() {
        let client = DbClient::from_url("sqlite::memory:").await.unwrap();
        assert!(client.is_healthy().await);
        assert_eq!(client.execute("CREATE TABLE t (x INTEGER)").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_url_is_rejected() {
        let err = DbClient::from_url("").await.unwrap_err();
        assert!(matches!(err, DbError::UrlError(_)));
    }
}
