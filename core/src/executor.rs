use crate::bind_value::BindValue;
use crate::db_pool::DbDriver;
use crate::error::Result;
use crate::row::Row;
use async_trait::async_trait;

/// 写操作结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// MySQL 的 `LAST_INSERT_ID()` / SQLite 的 `last_insert_rowid()`
    pub last_insert_id: u64,
}

/// 数据库执行器 trait，统一 DbPool 和 Transaction 的接口
///
/// 查询构建器的执行类方法只依赖此 trait，既可在连接池上执行，也可在事务中执行。
///
/// 注意：此 trait 要求 `Send`，因为异步方法需要在不同线程之间传递 Future
#[async_trait]
pub trait Executor: Send {
    /// 获取驱动类型
    fn driver(&self) -> DbDriver;

    /// 执行写语句
    async fn execute(&mut self, sql: &str, binds: &[BindValue]) -> Result<ExecResult>;

    /// 执行查询，返回全部结果行
    async fn fetch_all(&mut self, sql: &str, binds: &[BindValue]) -> Result<Vec<Row>>;
}

/// 绑定到驱动前的参数形式
///
/// 字符串 -> 文本，整数 -> 整数，NULL -> NULL，其余一律按文本绑定：
/// 浮点为十进制文本，布尔为 `1` / `0`，JSON 复合值为 JSON 文本，
/// 日期时间为 `YYYY-MM-DD HH:MM:SS`。
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    Int(i64),
    Null,
}

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl From<&BindValue> for SqlArg {
    fn from(value: &BindValue) -> Self {
        match value {
            BindValue::String(s) => SqlArg::Text(s.clone()),
            BindValue::Int64(i) => SqlArg::Int(*i),
            BindValue::Int32(i) => SqlArg::Int(i64::from(*i)),
            BindValue::Int16(i) => SqlArg::Int(i64::from(*i)),
            BindValue::Float64(f) => SqlArg::Text(f.to_string()),
            BindValue::Float32(f) => SqlArg::Text(f.to_string()),
            BindValue::Bool(b) => SqlArg::Text(if *b { "1" } else { "0" }.to_string()),
            BindValue::Json(v) => SqlArg::Text(v.to_string()),
            BindValue::DateTime(dt) => SqlArg::Text(dt.format(DATETIME_FORMAT).to_string()),
            BindValue::Null => SqlArg::Null,
        }
    }
}

/// 将绑定值依次应用到 sqlx 查询对象上
#[macro_export]
macro_rules! apply_bind_value {
    ($query:expr, $bind:expr) => {
        match $crate::executor::SqlArg::from($bind) {
            $crate::executor::SqlArg::Text(s) => {
                $query = $query.bind(s);
            }
            $crate::executor::SqlArg::Int(i) => {
                $query = $query.bind(i);
            }
            $crate::executor::SqlArg::Null => {
                $query = $query.bind(Option::<String>::None);
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_sql_arg_scalars() {
        assert_eq!(SqlArg::from(&BindValue::Int32(3)), SqlArg::Int(3));
        assert_eq!(SqlArg::from(&BindValue::Int16(-2)), SqlArg::Int(-2));
        assert_eq!(SqlArg::from(&BindValue::Null), SqlArg::Null);
        assert_eq!(
            SqlArg::from(&BindValue::String("a".to_string())),
            SqlArg::Text("a".to_string())
        );
    }

    #[test]
    fn test_sql_arg_float_and_bool_as_text() {
        assert_eq!(
            SqlArg::from(&BindValue::Float64(1.5)),
            SqlArg::Text("1.5".to_string())
        );
        assert_eq!(
            SqlArg::from(&BindValue::Float32(0.25)),
            SqlArg::Text("0.25".to_string())
        );
        assert_eq!(SqlArg::from(&BindValue::Bool(true)), SqlArg::Text("1".to_string()));
        assert_eq!(SqlArg::from(&BindValue::Bool(false)), SqlArg::Text("0".to_string()));
    }

    #[test]
    fn test_sql_arg_json_text() {
        let arg = SqlArg::from(&BindValue::Json(json!({"tags": ["a", "b"]})));
        assert_eq!(arg, SqlArg::Text(r#"{"tags":["a","b"]}"#.to_string()));
    }

    #[test]
    fn test_sql_arg_datetime_text() {
        let dt = NaiveDate::from_ymd_opt(2023, 9, 8)
            .and_then(|d| d.and_hms_opt(7, 6, 5))
            .unwrap();
        assert_eq!(
            SqlArg::from(&BindValue::DateTime(dt)),
            SqlArg::Text("2023-09-08 07:06:05".to_string())
        );
    }
}
