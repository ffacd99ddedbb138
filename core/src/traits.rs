use crate::error::{Result, SqlxFluentError};
use crate::row::Row;
use serde::de::DeserializeOwned;

/// 从一行查询结果构造记录类型
///
/// 可以通过 `#[derive(FromRecord)]` 自动实现：
/// ```ignore
/// #[derive(FromRecord)]
/// struct User {
///     id: i64,
///     #[record(rename = "email_address")]
///     email: String,
///     #[record(default)]
///     nickname: Option<String>,
/// }
/// ```
pub trait FromRecord: Sized {
    fn from_record(row: Row) -> Result<Self>;
}

impl FromRecord for Row {
    fn from_record(row: Row) -> Result<Self> {
        Ok(row)
    }
}

impl FromRecord for serde_json::Value {
    fn from_record(row: Row) -> Result<Self> {
        Ok(serde_json::Value::Object(row))
    }
}

/// 通过 serde 将整行反序列化为 `T`，列名即字段名
pub fn deserialize_record<T: DeserializeOwned>(row: Row) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(row))
        .map_err(|e| SqlxFluentError::Record(e.to_string()))
}

/// 取出单个列并反序列化，供 `#[derive(FromRecord)]` 生成的代码使用，列不存在时返回 `Record` 错误
pub fn take_column<T: DeserializeOwned>(row: &mut Row, column: &str) -> Result<T> {
    let value = row
        .remove(column)
        .ok_or_else(|| SqlxFluentError::Record(format!("missing column `{}`", column)))?;
    serde_json::from_value(value)
        .map_err(|e| SqlxFluentError::Record(format!("column `{}`: {}", column, e)))
}

/// 列不存在或为 NULL 时使用默认值
pub fn take_column_or_default<T: DeserializeOwned + Default>(
    row: &mut Row,
    column: &str,
) -> Result<T> {
    match row.remove(column) {
        None | Some(serde_json::Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| SqlxFluentError::Record(format!("column `{}`: {}", column, e))),
    }
}
