//! 查询观察者：在语句执行前后收到通知

use crate::bind_value::BindValue;
use crate::error::Result;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// 语句执行前后的回调，通过 `DbPool::with_observer` 注入
pub trait QueryObserver: Send + Sync {
    fn before_query(&self, _sql: &str, _binds: &[BindValue]) {}

    fn after_query(&self, _sql: &str, _binds: &[BindValue], _elapsed: Duration) {}
}

/// 一条已执行语句的记录
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRecord {
    pub sql: String,
    pub binds: Vec<BindValue>,
    pub elapsed: Duration,
}

/// 记录已执行语句的观察者
#[derive(Debug, Default)]
pub struct QueryHistory {
    records: Mutex<Vec<QueryRecord>>,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<QueryRecord> {
        self.records.lock().clone()
    }

    /// 最后一条执行的 SQL
    pub fn last_sql(&self) -> Option<String> {
        self.records.lock().last().map(|r| r.sql.clone())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl QueryObserver for QueryHistory {
    fn after_query(&self, sql: &str, binds: &[BindValue], elapsed: Duration) {
        self.records.lock().push(QueryRecord {
            sql: sql.to_string(),
            binds: binds.to_vec(),
            elapsed,
        });
    }
}

/// 单次语句执行的日志与观察者通知
pub(crate) struct QueryScope<'a> {
    observer: Option<&'a dyn QueryObserver>,
    sql: &'a str,
    binds: &'a [BindValue],
    started: Instant,
}

impl<'a> QueryScope<'a> {
    pub(crate) fn start(
        observer: Option<&'a dyn QueryObserver>,
        sql: &'a str,
        binds: &'a [BindValue],
    ) -> Self {
        tracing::debug!(
            target: "sqlxfluent::sql",
            sql = %sql,
            binds = ?binds,
            param_count = binds.len(),
            "executing statement"
        );
        if let Some(observer) = observer {
            observer.before_query(sql, binds);
        }
        Self {
            observer,
            sql,
            binds,
            started: Instant::now(),
        }
    }

    pub(crate) fn finish<T>(self, outcome: Result<T>) -> Result<T> {
        let elapsed = self.started.elapsed();
        match &outcome {
            Ok(_) => tracing::debug!(
                target: "sqlxfluent::sql",
                elapsed_ms = elapsed.as_millis() as u64,
                "statement finished"
            ),
            Err(e) => tracing::warn!(
                target: "sqlxfluent::sql",
                sql = %self.sql,
                error = %e,
                "statement failed"
            ),
        }
        if let Some(observer) = self.observer {
            observer.after_query(self.sql, self.binds, elapsed);
        }
        outcome
    }
}
