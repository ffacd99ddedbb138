//! 将驱动返回的行解码为按列顺序排列的映射

use crate::error::Result;
use serde_json::{Map, Value};

/// 一行查询结果：列名 -> 值，保持 SELECT 中的列顺序
pub type Row = Map<String, Value>;

#[cfg(feature = "mysql")]
const DATE_FORMAT: &str = "%Y-%m-%d";
#[cfg(feature = "mysql")]
const TIME_FORMAT: &str = "%H:%M:%S";

fn bytes_to_value(bytes: Vec<u8>) -> Value {
    Value::String(String::from_utf8_lossy(&bytes).into_owned())
}

fn float_to_value(f: f64) -> Value {
    serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
}

#[cfg(feature = "mysql")]
pub(crate) fn decode_mysql_row(row: &sqlx::mysql::MySqlRow) -> Result<Row> {
    use sqlx::{Column, Row as _, TypeInfo, ValueRef};

    let mut out = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let type_name = raw.type_info().name().to_uppercase();
            decode_mysql_value(row, index, &type_name)?
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

#[cfg(feature = "mysql")]
fn decode_mysql_value(row: &sqlx::mysql::MySqlRow, index: usize, type_name: &str) -> Result<Value> {
    use crate::executor::DATETIME_FORMAT;
    use sqlx::Row as _;

    let value = match type_name {
        "BOOLEAN" => Value::Bool(row.try_get_unchecked::<bool, _>(index)?),
        name if name.ends_with("UNSIGNED") && name != "DECIMAL UNSIGNED" => {
            Value::from(row.try_get_unchecked::<u64, _>(index)?)
        }
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Value::from(row.try_get_unchecked::<i64, _>(index)?)
        }
        "FLOAT" => float_to_value(f64::from(row.try_get_unchecked::<f32, _>(index)?)),
        "DOUBLE" => float_to_value(row.try_get_unchecked::<f64, _>(index)?),
        "DECIMAL" | "DECIMAL UNSIGNED" => {
            let decimal: bigdecimal::BigDecimal = row.try_get_unchecked(index)?;
            Value::String(decimal.to_string())
        }
        "DATETIME" | "TIMESTAMP" => {
            let dt: chrono::NaiveDateTime = row.try_get_unchecked(index)?;
            Value::String(dt.format(DATETIME_FORMAT).to_string())
        }
        "DATE" => {
            let d: chrono::NaiveDate = row.try_get_unchecked(index)?;
            Value::String(d.format(DATE_FORMAT).to_string())
        }
        "TIME" => match row.try_get_unchecked::<chrono::NaiveTime, _>(index) {
            Ok(t) => Value::String(t.format(TIME_FORMAT).to_string()),
            // 超出 0..24h 的 TIME 值无法解码为 NaiveTime
            Err(_) => text_or_bytes_mysql(row, index)?,
        },
        "JSON" => {
            let text: String = row.try_get_unchecked(index)?;
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        }
        other => {
            tracing::trace!(column_type = other, "decoding mysql column as text");
            text_or_bytes_mysql(row, index)?
        }
    };
    Ok(value)
}

#[cfg(feature = "mysql")]
fn text_or_bytes_mysql(row: &sqlx::mysql::MySqlRow, index: usize) -> Result<Value> {
    use sqlx::Row as _;

    match row.try_get_unchecked::<String, _>(index) {
        Ok(s) => Ok(Value::String(s)),
        Err(_) => Ok(bytes_to_value(row.try_get_unchecked::<Vec<u8>, _>(index)?)),
    }
}

#[cfg(feature = "sqlite")]
pub(crate) fn decode_sqlite_row(row: &sqlx::sqlite::SqliteRow) -> Result<Row> {
    use sqlx::{Column, Row as _, TypeInfo, ValueRef};

    let mut out = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            // SQLite 为动态类型，按值的实际存储类型解码
            let type_name = raw.type_info().name().to_uppercase();
            match type_name.as_str() {
                "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" => float_to_value(row.try_get_unchecked::<f64, _>(index)?),
                "BLOB" => bytes_to_value(row.try_get_unchecked::<Vec<u8>, _>(index)?),
                other => {
                    tracing::trace!(column_type = other, "decoding sqlite column as text");
                    Value::String(row.try_get_unchecked::<String, _>(index)?)
                }
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_to_value() {
        assert_eq!(float_to_value(1.5), serde_json::json!(1.5));
        assert_eq!(float_to_value(f64::NAN), Value::Null);
    }

    #[test]
    fn test_bytes_to_value_lossy() {
        assert_eq!(bytes_to_value(b"abc".to_vec()), Value::String("abc".to_string()));
        assert_eq!(
            bytes_to_value(vec![0x61, 0xff]),
            Value::String("a\u{fffd}".to_string())
        );
    }
}
