//! 查询构建器的执行类方法
//!
//! 所有方法都只借用构建器，执行后条件等状态保持不变，可以继续复用。

use crate::bind_value::{Assignment, BindValue};
use crate::db_pool::DbDriver;
use crate::error::{Result, SqlxFluentError};
use crate::executor::Executor;
use crate::identifier::quote_identifier;
use crate::predicate::Filter;
use crate::query_builder::QueryBuilder;
use crate::row::Row;
use crate::traits::FromRecord;
use serde_json::{Map, Value};

/// 聚合结果转为整数，数字、数字字符串之外的值视为 0
fn value_to_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => s
            .parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
            .unwrap_or_default(),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn value_to_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl QueryBuilder {
    // ========== 查询 ==========

    /// 执行 SELECT，返回全部行
    pub async fn get<E>(&self, executor: &mut E) -> Result<Vec<Row>>
    where
        E: Executor + ?Sized,
    {
        let stmt = self.build()?;
        executor.fetch_all(&stmt.sql, &stmt.binds).await
    }

    /// 执行 SELECT，并将每行映射为记录类型
    pub async fn get_as<T, E>(&self, executor: &mut E) -> Result<Vec<T>>
    where
        T: FromRecord,
        E: Executor + ?Sized,
    {
        self.get(executor)
            .await?
            .into_iter()
            .map(T::from_record)
            .collect()
    }

    /// 第一行（强制 `LIMIT 1`）
    pub async fn first<E>(&self, executor: &mut E) -> Result<Option<Row>>
    where
        E: Executor + ?Sized,
    {
        let rows = self.clone().limit(1).get(executor).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn first_as<T, E>(&self, executor: &mut E) -> Result<Option<T>>
    where
        T: FromRecord,
        E: Executor + ?Sized,
    {
        self.first(executor).await?.map(T::from_record).transpose()
    }

    /// 按 `id` 查找
    pub async fn find<E>(&self, executor: &mut E, id: impl Into<BindValue>) -> Result<Option<Row>>
    where
        E: Executor + ?Sized,
    {
        self.find_by(executor, "id", id).await
    }

    /// 按指定列等值查找第一行
    pub async fn find_by<E>(
        &self,
        executor: &mut E,
        field: &str,
        value: impl Into<BindValue>,
    ) -> Result<Option<Row>>
    where
        E: Executor + ?Sized,
    {
        self.clone().where_eq(field, value).first(executor).await
    }

    pub async fn find_as<T, E>(&self, executor: &mut E, id: impl Into<BindValue>) -> Result<Option<T>>
    where
        T: FromRecord,
        E: Executor + ?Sized,
    {
        self.find(executor, id).await?.map(T::from_record).transpose()
    }

    /// 以 `key` 列的值为键组织结果；给定 `value` 时每个键只保留该列，否则保留整行
    ///
    /// 键重复时后出现的行覆盖前面的行。
    pub async fn lists<E>(
        &self,
        executor: &mut E,
        key: &str,
        value: Option<&str>,
    ) -> Result<Map<String, Value>>
    where
        E: Executor + ?Sized,
    {
        let mut out = Map::new();
        for mut row in self.get(executor).await? {
            let k = row
                .get(key)
                .map(value_to_key)
                .ok_or_else(|| SqlxFluentError::Record(format!("missing column `{}`", key)))?;
            let entry = match value {
                Some(column) => row.remove(column).unwrap_or(Value::Null),
                None => Value::Object(row),
            };
            out.insert(k, entry);
        }
        Ok(out)
    }

    // ========== 表结构 ==========

    /// `SHOW COLUMNS FROM` 当前表
    ///
    /// `full` 为 true 时返回完整的列信息行，否则只返回列名（`Field` 列）。仅支持 MySQL。
    pub async fn scheme<E>(&self, executor: &mut E, full: bool) -> Result<Vec<Value>>
    where
        E: Executor + ?Sized,
    {
        let table = self.target_table()?;
        let driver = executor.driver();
        if driver != DbDriver::MySql {
            return Err(SqlxFluentError::UnsupportedDatabase(format!(
                "SHOW COLUMNS is only available on MySQL, got: {:?}",
                driver
            )));
        }
        let sql = format!("SHOW COLUMNS FROM {}", quote_identifier(table));
        let rows = executor.fetch_all(&sql, &[]).await?;
        if full {
            return Ok(rows.into_iter().map(Value::Object).collect());
        }
        rows.into_iter()
            .map(|mut row| {
                row.remove("Field")
                    .ok_or_else(|| SqlxFluentError::Record("missing column `Field`".to_string()))
            })
            .collect()
    }

    // ========== 聚合 ==========

    async fn aggregate_value<E>(&self, executor: &mut E, func: &str, field: &str) -> Result<Value>
    where
        E: Executor + ?Sized,
    {
        let (builder, key) = self.aggregate(func, field);
        let value = match builder.get(executor).await?.into_iter().next() {
            Some(mut row) => match row.remove(&key) {
                Some(value) => value,
                None => row.into_iter().next().map_or(Value::Null, |(_, v)| v),
            },
            None => Value::Null,
        };
        Ok(value)
    }

    /// `COUNT(field)`，`field` 为 `*` 时即 `COUNT(*)`
    pub async fn count<E>(&self, executor: &mut E, field: &str) -> Result<i64>
    where
        E: Executor + ?Sized,
    {
        let value = self.aggregate_value(executor, "COUNT", field).await?;
        Ok(value_to_i64(&value))
    }

    /// `MAX(field)`，没有数据时为 `Value::Null`
    pub async fn max<E>(&self, executor: &mut E, field: &str) -> Result<Value>
    where
        E: Executor + ?Sized,
    {
        self.aggregate_value(executor, "MAX", field).await
    }

    pub async fn min<E>(&self, executor: &mut E, field: &str) -> Result<Value>
    where
        E: Executor + ?Sized,
    {
        self.aggregate_value(executor, "MIN", field).await
    }

    /// `AVG(field)`；MySQL 对整数列返回 DECIMAL，结果为字符串形式
    pub async fn avg<E>(&self, executor: &mut E, field: &str) -> Result<Value>
    where
        E: Executor + ?Sized,
    {
        self.aggregate_value(executor, "AVG", field).await
    }

    pub async fn sum<E>(&self, executor: &mut E, field: &str) -> Result<Value>
    where
        E: Executor + ?Sized,
    {
        self.aggregate_value(executor, "SUM", field).await
    }

    // ========== 写操作 ==========

    /// 插入一行，返回数据库生成的自增 ID
    pub async fn insert<E, I, K, V>(&self, executor: &mut E, data: I) -> Result<u64>
    where
        E: Executor + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Assignment>,
    {
        let stmt = self.build_insert(data)?;
        let result = executor.execute(&stmt.sql, &stmt.binds).await?;
        Ok(result.last_insert_id)
    }

    /// 更新当前条件匹配的行，返回受影响行数
    pub async fn update<E, I, K, V>(&self, executor: &mut E, data: I) -> Result<u64>
    where
        E: Executor + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Assignment>,
    {
        let stmt = self.build_update(data)?;
        let result = executor.execute(&stmt.sql, &stmt.binds).await?;
        Ok(result.rows_affected)
    }

    /// 删除当前条件匹配的行，返回受影响行数
    pub async fn delete<E>(&self, executor: &mut E) -> Result<u64>
    where
        E: Executor + ?Sized,
    {
        let stmt = self.build_delete()?;
        let result = executor.execute(&stmt.sql, &stmt.binds).await?;
        Ok(result.rows_affected)
    }

    // ========== 分批处理 ==========

    /// 按 `size` 分页重复执行当前查询，每页回调一次，直到某页为空
    pub async fn chunk<E, F>(&self, executor: &mut E, size: u64, mut f: F) -> Result<()>
    where
        E: Executor + ?Sized,
        F: FnMut(Vec<Row>) -> Result<()>,
    {
        if size == 0 {
            return Err(SqlxFluentError::Configuration(
                "Chunk size must be greater than zero".to_string(),
            ));
        }
        let mut offset = 0;
        loop {
            let rows = self.clone().limit(size).offset(offset).get(executor).await?;
            if rows.is_empty() {
                return Ok(());
            }
            tracing::trace!(offset, rows = rows.len(), "processing chunk");
            f(rows)?;
            offset += size;
        }
    }

    /// 逐行回调，第二个参数为跨页累计的行序号（从 0 开始）
    pub async fn each<E, F>(&self, executor: &mut E, size: u64, mut f: F) -> Result<()>
    where
        E: Executor + ?Sized,
        F: FnMut(Row, u64) -> Result<()>,
    {
        let mut index = 0;
        self.chunk(executor, size, |rows| {
            for row in rows {
                f(row, index)?;
                index += 1;
            }
            Ok(())
        })
        .await
    }
}
