use crate::bind_value::BindValue;
use crate::db_pool::{DbDriver, DbPool};
use crate::error::{Result, SqlxFluentError};
use crate::executor::{ExecResult, Executor};
use crate::observer::{QueryObserver, QueryScope};
use crate::row::Row;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// 宏：简化事务闭包的写法，自动处理 `Box::pin`
///
/// 使用示例：
/// ```ignore
/// sqlxfluent::transaction!(pool, |tx| async move {
///     QueryBuilder::new().table("users").insert(tx, data).await
/// }).await?;
/// ```
#[macro_export]
macro_rules! transaction {
    // 匹配引用形式：&pool
    (&$pool:expr, |$tx:ident| async move $body:block) => {
        $pool.transaction(|$tx| {
            Box::pin(async move $body)
        })
    };
    // 匹配值形式：pool（会自动借用）
    ($pool:expr, |$tx:ident| async move $body:block) => {
        $pool.transaction(|$tx| {
            Box::pin(async move $body)
        })
    };
}

enum TxInner {
    #[cfg(feature = "mysql")]
    MySql(sqlx::Transaction<'static, sqlx::MySql>),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlx::Transaction<'static, sqlx::Sqlite>),
}

/// 数据库事务
///
/// 未提交就被 drop 的事务由 sqlx 在连接归还时回滚。
pub struct Transaction {
    inner: TxInner,
    observer: Option<Arc<dyn QueryObserver>>,
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("driver", &self.driver())
            .finish_non_exhaustive()
    }
}

impl Transaction {
    /// 获取事务的驱动类型
    pub fn driver(&self) -> DbDriver {
        match &self.inner {
            #[cfg(feature = "mysql")]
            TxInner::MySql(_) => DbDriver::MySql,
            #[cfg(feature = "sqlite")]
            TxInner::Sqlite(_) => DbDriver::Sqlite,
        }
    }

    /// 提交事务
    pub async fn commit(self) -> Result<()> {
        tracing::debug!(driver = ?self.driver(), "committing transaction");
        match self.inner {
            #[cfg(feature = "mysql")]
            TxInner::MySql(tx) => tx.commit().await?,
            #[cfg(feature = "sqlite")]
            TxInner::Sqlite(tx) => tx.commit().await?,
        }
        Ok(())
    }

    /// 回滚事务
    pub async fn rollback(self) -> Result<()> {
        tracing::debug!(driver = ?self.driver(), "rolling back transaction");
        match self.inner {
            #[cfg(feature = "mysql")]
            TxInner::MySql(tx) => tx.rollback().await?,
            #[cfg(feature = "sqlite")]
            TxInner::Sqlite(tx) => tx.rollback().await?,
        }
        Ok(())
    }
}

#[async_trait]
impl Executor for Transaction {
    fn driver(&self) -> DbDriver {
        Transaction::driver(self)
    }

    async fn execute(&mut self, sql: &str, binds: &[BindValue]) -> Result<ExecResult> {
        let scope = QueryScope::start(self.observer.as_deref(), sql, binds);
        let outcome = match &mut self.inner {
            #[cfg(feature = "mysql")]
            TxInner::MySql(tx) => crate::db_pool::mysql_execute(&mut **tx, sql, binds).await,
            #[cfg(feature = "sqlite")]
            TxInner::Sqlite(tx) => crate::db_pool::sqlite_execute(&mut **tx, sql, binds).await,
        };
        scope.finish(outcome)
    }

    async fn fetch_all(&mut self, sql: &str, binds: &[BindValue]) -> Result<Vec<Row>> {
        let scope = QueryScope::start(self.observer.as_deref(), sql, binds);
        let outcome = match &mut self.inner {
            #[cfg(feature = "mysql")]
            TxInner::MySql(tx) => crate::db_pool::mysql_fetch_all(&mut **tx, sql, binds).await,
            #[cfg(feature = "sqlite")]
            TxInner::Sqlite(tx) => crate::db_pool::sqlite_fetch_all(&mut **tx, sql, binds).await,
        };
        scope.finish(outcome)
    }
}

impl DbPool {
    /// 开始一个事务
    pub async fn begin(&self) -> Result<Transaction> {
        tracing::debug!(driver = ?self.driver(), "beginning transaction");
        let inner = match self.driver() {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => {
                let pool = self.mysql_pool().ok_or(SqlxFluentError::NoPoolAvailable)?;
                TxInner::MySql(pool.begin().await?)
            }
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => {
                let pool = self.sqlite_pool().ok_or(SqlxFluentError::NoPoolAvailable)?;
                TxInner::Sqlite(pool.begin().await?)
            }
            #[allow(unreachable_patterns)]
            _ => return Err(SqlxFluentError::NoPoolAvailable),
        };
        Ok(Transaction {
            inner,
            observer: self.observer(),
        })
    }

    /// 在事务中执行闭包函数：开始事务，等待闭包完成后提交
    ///
    /// 闭包返回错误时不主动回滚，错误直接返回；未提交的事务随之被 drop，
    /// 由 sqlx 在连接归还时回滚。
    ///
    /// # 使用方式
    ///
    /// 方式1：直接使用（需要 `Box::pin`）：
    /// ```ignore
    /// pool.transaction(|tx| {
    ///     Box::pin(async move {
    ///         // 事务代码
    ///         Ok(42)
    ///     })
    /// }).await?;
    /// ```
    ///
    /// 方式2：使用宏（推荐，更简洁）：
    /// ```ignore
    /// sqlxfluent::transaction!(pool, |tx| async move {
    ///     // 事务代码
    ///     Ok(42)
    /// }).await?;
    /// ```
    pub async fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        for<'a> F: FnOnce(
            &'a mut Transaction,
        ) -> Pin<Box<dyn Future<Output = std::result::Result<T, E>> + Send + 'a>>,
        E: From<SqlxFluentError>,
    {
        let mut tx = self.begin().await.map_err(E::from)?;
        let value = f(&mut tx).await?;
        tx.commit().await.map_err(E::from)?;
        Ok(value)
    }
}
