use crate::apply_bind_value;
use crate::bind_value::BindValue;
use crate::config::DbConfig;
use crate::error::{Result, SqlxFluentError};
use crate::executor::{ExecResult, Executor};
use crate::observer::{QueryObserver, QueryScope};
use crate::row::Row;
use async_trait::async_trait;
#[cfg(any(feature = "mysql", feature = "sqlite"))]
use sqlx::Pool;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbDriver {
    MySql,
    Sqlite,
}

impl DbDriver {
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Ok(DbDriver::MySql)
        } else if url.starts_with("sqlite://") || url.starts_with("sqlite:") {
            Ok(DbDriver::Sqlite)
        } else {
            Err(SqlxFluentError::UnsupportedDatabase(url.to_string()))
        }
    }
}

/// 连接池，按驱动持有对应的 sqlx Pool
#[derive(Clone)]
pub struct DbPool {
    driver: DbDriver,
    #[cfg(feature = "mysql")]
    mysql: Option<Arc<Pool<sqlx::MySql>>>,
    #[cfg(feature = "sqlite")]
    sqlite: Option<Arc<Pool<sqlx::Sqlite>>>,
    observer: Option<Arc<dyn QueryObserver>>,
}

impl fmt::Debug for DbPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbPool")
            .field("driver", &self.driver)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl DbPool {
    /// 从数据库 URL 连接并创建 DbPool
    pub async fn connect(url: &str) -> Result<Self> {
        let driver = DbDriver::from_url(url)?;
        tracing::debug!(driver = ?driver, "connecting database pool");

        match driver {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => {
                let pool = Pool::<sqlx::MySql>::connect(url).await?;
                Ok(Self::from_mysql_pool(Arc::new(pool)))
            }
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => {
                let pool = Pool::<sqlx::Sqlite>::connect(url).await?;
                Ok(Self::from_sqlite_pool(Arc::new(pool)))
            }
            #[allow(unreachable_patterns)]
            _ => Err(SqlxFluentError::UnsupportedDatabase(format!(
                "Unsupported database driver, only mysql, sqlite is supported, got: {:?}",
                driver
            ))),
        }
    }

    /// 根据配置连接
    pub async fn connect_with(config: &DbConfig) -> Result<Self> {
        Self::connect(&config.to_url()?).await
    }

    /// 从 MySQL Pool 创建 DbPool
    #[cfg(feature = "mysql")]
    pub fn from_mysql_pool(pool: Arc<Pool<sqlx::MySql>>) -> Self {
        Self {
            driver: DbDriver::MySql,
            mysql: Some(pool),
            #[cfg(feature = "sqlite")]
            sqlite: None,
            observer: None,
        }
    }

    /// 从 SQLite Pool 创建 DbPool
    #[cfg(feature = "sqlite")]
    pub fn from_sqlite_pool(pool: Arc<Pool<sqlx::Sqlite>>) -> Self {
        Self {
            driver: DbDriver::Sqlite,
            #[cfg(feature = "mysql")]
            mysql: None,
            sqlite: Some(pool),
            observer: None,
        }
    }

    /// 注入查询观察者，每条语句执行前后都会通知
    pub fn with_observer(mut self, observer: Arc<dyn QueryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub(crate) fn observer(&self) -> Option<Arc<dyn QueryObserver>> {
        self.observer.clone()
    }

    pub fn driver(&self) -> DbDriver {
        self.driver
    }

    #[cfg(feature = "mysql")]
    pub fn mysql_pool(&self) -> Option<&Pool<sqlx::MySql>> {
        self.mysql.as_deref()
    }

    #[cfg(feature = "sqlite")]
    pub fn sqlite_pool(&self) -> Option<&Pool<sqlx::Sqlite>> {
        self.sqlite.as_deref()
    }

    /// 关闭连接池
    pub async fn close(&self) {
        #[cfg(feature = "mysql")]
        if let Some(pool) = self.mysql_pool() {
            pool.close().await;
        }
        #[cfg(feature = "sqlite")]
        if let Some(pool) = self.sqlite_pool() {
            pool.close().await;
        }
    }
}

#[async_trait]
impl Executor for DbPool {
    fn driver(&self) -> DbDriver {
        self.driver
    }

    async fn execute(&mut self, sql: &str, binds: &[BindValue]) -> Result<ExecResult> {
        let scope = QueryScope::start(self.observer.as_deref(), sql, binds);
        let outcome = match self.driver {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => match self.mysql.as_deref() {
                Some(pool) => mysql_execute(pool, sql, binds).await,
                None => Err(SqlxFluentError::NoPoolAvailable),
            },
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => match self.sqlite.as_deref() {
                Some(pool) => sqlite_execute(pool, sql, binds).await,
                None => Err(SqlxFluentError::NoPoolAvailable),
            },
            #[allow(unreachable_patterns)]
            _ => Err(SqlxFluentError::NoPoolAvailable),
        };
        scope.finish(outcome)
    }

    async fn fetch_all(&mut self, sql: &str, binds: &[BindValue]) -> Result<Vec<Row>> {
        let scope = QueryScope::start(self.observer.as_deref(), sql, binds);
        let outcome = match self.driver {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => match self.mysql.as_deref() {
                Some(pool) => mysql_fetch_all(pool, sql, binds).await,
                None => Err(SqlxFluentError::NoPoolAvailable),
            },
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => match self.sqlite.as_deref() {
                Some(pool) => sqlite_fetch_all(pool, sql, binds).await,
                None => Err(SqlxFluentError::NoPoolAvailable),
            },
            #[allow(unreachable_patterns)]
            _ => Err(SqlxFluentError::NoPoolAvailable),
        };
        scope.finish(outcome)
    }
}

#[cfg(feature = "mysql")]
pub(crate) async fn mysql_execute<'c, E>(
    executor: E,
    sql: &str,
    binds: &[BindValue],
) -> Result<ExecResult>
where
    E: sqlx::Executor<'c, Database = sqlx::MySql>,
{
    let mut query = sqlx::query(sql);
    for bind in binds {
        apply_bind_value!(query, bind);
    }
    let result = query.execute(executor).await?;
    Ok(ExecResult {
        rows_affected: result.rows_affected(),
        last_insert_id: result.last_insert_id(),
    })
}

#[cfg(feature = "mysql")]
pub(crate) async fn mysql_fetch_all<'c, E>(
    executor: E,
    sql: &str,
    binds: &[BindValue],
) -> Result<Vec<Row>>
where
    E: sqlx::Executor<'c, Database = sqlx::MySql>,
{
    let mut query = sqlx::query(sql);
    for bind in binds {
        apply_bind_value!(query, bind);
    }
    let rows = query.fetch_all(executor).await?;
    rows.iter().map(crate::row::decode_mysql_row).collect()
}

#[cfg(feature = "sqlite")]
pub(crate) async fn sqlite_execute<'c, E>(
    executor: E,
    sql: &str,
    binds: &[BindValue],
) -> Result<ExecResult>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let mut query = sqlx::query(sql);
    for bind in binds {
        apply_bind_value!(query, bind);
    }
    let result = query.execute(executor).await?;
    Ok(ExecResult {
        rows_affected: result.rows_affected(),
        last_insert_id: u64::try_from(result.last_insert_rowid()).unwrap_or_default(),
    })
}

#[cfg(feature = "sqlite")]
pub(crate) async fn sqlite_fetch_all<'c, E>(
    executor: E,
    sql: &str,
    binds: &[BindValue],
) -> Result<Vec<Row>>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let mut query = sqlx::query(sql);
    for bind in binds {
        apply_bind_value!(query, bind);
    }
    let rows = query.fetch_all(executor).await?;
    rows.iter().map(crate::row::decode_sqlite_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_from_url() {
        assert_eq!(
            DbDriver::from_url("mysql://root@localhost/app").unwrap(),
            DbDriver::MySql
        );
        assert_eq!(
            DbDriver::from_url("mariadb://root@localhost/app").unwrap(),
            DbDriver::MySql
        );
        assert_eq!(DbDriver::from_url("sqlite::memory:").unwrap(), DbDriver::Sqlite);
        assert!(matches!(
            DbDriver::from_url("postgres://localhost/app"),
            Err(SqlxFluentError::UnsupportedDatabase(_))
        ));
    }
}
