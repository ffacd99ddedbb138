use crate::flatten::Arg;
use crate::raw::Raw;
use chrono::{DateTime, NaiveDateTime, Utc};

/// 绑定值，用于安全地传递参数
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    String(String),
    Int64(i64),
    Int32(i32),
    Int16(i16),
    Float64(f64),
    Float32(f32),
    Bool(bool),
    /// 数组、对象等复合值，执行时序列化为 JSON 文本
    Json(serde_json::Value),
    /// 执行时格式化为 `YYYY-MM-DD HH:MM:SS`
    DateTime(NaiveDateTime),
    Null,
}

impl BindValue {
    pub fn is_null(&self) -> bool {
        matches!(self, BindValue::Null)
    }
}

/// INSERT / UPDATE 中单个列的取值：普通绑定值或原生 SQL 片段
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Value(BindValue),
    Raw(Raw),
}

impl From<BindValue> for Assignment {
    fn from(value: BindValue) -> Self {
        Assignment::Value(value)
    }
}

impl From<Raw> for Assignment {
    fn from(raw: Raw) -> Self {
        Assignment::Raw(raw)
    }
}

impl From<BindValue> for Arg<BindValue> {
    fn from(value: BindValue) -> Self {
        Arg::Item(value)
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(BindValue::Null, Into::into)
    }
}

impl<T: Into<BindValue>> From<Option<T>> for Arg<BindValue> {
    fn from(value: Option<T>) -> Self {
        Arg::Item(value.into())
    }
}

impl<T: Into<BindValue>> From<Option<T>> for Assignment {
    fn from(value: Option<T>) -> Self {
        Assignment::Value(value.into())
    }
}

/// 为标量类型生成到 `BindValue` / `Arg<BindValue>` / `Assignment` 的转换
macro_rules! impl_scalar {
    ($($ty:ty => |$v:ident| $conv:expr;)*) => {
        $(
            impl From<$ty> for BindValue {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }

            impl From<$ty> for Arg<BindValue> {
                fn from(value: $ty) -> Self {
                    Arg::Item(BindValue::from(value))
                }
            }

            impl From<$ty> for Assignment {
                fn from(value: $ty) -> Self {
                    Assignment::Value(BindValue::from(value))
                }
            }
        )*
    };
}

impl_scalar! {
    String => |s| BindValue::String(s);
    &str => |s| BindValue::String(s.to_string());
    &String => |s| BindValue::String(s.clone());
    i64 => |i| BindValue::Int64(i);
    i32 => |i| BindValue::Int32(i);
    i16 => |i| BindValue::Int16(i);
    u32 => |i| BindValue::Int64(i64::from(i));
    f64 => |f| BindValue::Float64(f);
    f32 => |f| BindValue::Float32(f);
    bool => |b| BindValue::Bool(b);
    NaiveDateTime => |dt| BindValue::DateTime(dt);
    DateTime<Utc> => |dt| BindValue::DateTime(dt.naive_utc());
    serde_json::Value => |value| match value {
        serde_json::Value::Null => BindValue::Null,
        serde_json::Value::Bool(b) => BindValue::Bool(b),
        serde_json::Value::String(s) => BindValue::String(s),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => BindValue::Int64(i),
            None => BindValue::Float64(n.as_f64().unwrap_or_default()),
        },
        other => BindValue::Json(other),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    // ========== BindValue 转换测试 ==========
    #[test]
    fn test_bind_value_from_string() {
        let bv: BindValue = "test".to_string().into();
        assert!(matches!(bv, BindValue::String(_)));
    }

    #[test]
    fn test_bind_value_from_str() {
        let bv: BindValue = "test".into();
        assert_eq!(bv, BindValue::String("test".to_string()));
    }

    #[test]
    fn test_bind_value_from_integers() {
        assert_eq!(BindValue::from(100i64), BindValue::Int64(100));
        assert_eq!(BindValue::from(50i32), BindValue::Int32(50));
        assert_eq!(BindValue::from(7i16), BindValue::Int16(7));
        assert_eq!(BindValue::from(9u32), BindValue::Int64(9));
    }

    #[test]
    fn test_bind_value_is_null() {
        assert!(BindValue::from(None::<&str>).is_null());
        assert!(BindValue::from(json!(null)).is_null());
        assert!(!BindValue::from(0).is_null());
        assert!(!BindValue::from("").is_null());
    }

    #[test]
    fn test_bind_value_from_option() {
        assert_eq!(BindValue::from(None::<i32>), BindValue::Null);
        assert_eq!(BindValue::from(Some("a")), BindValue::String("a".to_string()));
    }

    #[test]
    fn test_bind_value_from_json() {
        assert_eq!(BindValue::from(json!(null)), BindValue::Null);
        assert_eq!(BindValue::from(json!(3)), BindValue::Int64(3));
        assert_eq!(BindValue::from(json!(1.5)), BindValue::Float64(1.5));
        assert_eq!(BindValue::from(json!("x")), BindValue::String("x".to_string()));
        assert_eq!(
            BindValue::from(json!({"a": [1, 2]})),
            BindValue::Json(json!({"a": [1, 2]}))
        );
    }

    #[test]
    fn test_bind_value_from_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap();
        assert_eq!(BindValue::from(dt), BindValue::DateTime(dt));
    }

    #[test]
    fn test_assignment_from_raw() {
        let a: Assignment = Raw::sql("NOW()").into();
        assert!(matches!(a, Assignment::Raw(_)));
        let v: Assignment = 1.into();
        assert_eq!(v, Assignment::Value(BindValue::Int32(1)));
    }
}
