use crate::bind_value::BindValue;
use crate::flatten::Arg;

/// 原生 SQL 片段
///
/// 片段文本原样插入到语句中，`values` 在片段出现的位置依次追加到绑定列表。
/// 构造后不可修改。
#[derive(Debug, Clone, PartialEq)]
pub struct Raw {
    sql: String,
    values: Vec<BindValue>,
}

impl Raw {
    /// 带绑定值的片段，`values` 支持嵌套列表，会被展开
    ///
    /// ```ignore
    /// Raw::new("`age` > ? AND `age` < ?", vec![18, 60]);
    /// ```
    pub fn new(sql: impl Into<String>, values: impl Into<Arg<BindValue>>) -> Self {
        Self {
            sql: sql.into(),
            values: values.into().flatten(),
        }
    }

    /// 不带绑定值的片段
    pub fn sql(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            values: Vec::new(),
        }
    }

    pub fn as_sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[BindValue] {
        &self.values
    }
}

impl From<&str> for Raw {
    fn from(sql: &str) -> Self {
        Raw::sql(sql)
    }
}

impl From<String> for Raw {
    fn from(sql: String) -> Self {
        Raw::sql(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_flattens_values() {
        let raw = Raw::new("`a` IN (?,?) AND `b` = ?", vec![vec![1, 2], vec![3]]);
        assert_eq!(raw.as_sql(), "`a` IN (?,?) AND `b` = ?");
        assert_eq!(
            raw.values(),
            &[BindValue::Int32(1), BindValue::Int32(2), BindValue::Int32(3)]
        );
    }

    #[test]
    fn test_raw_without_values() {
        let raw: Raw = "NOW()".into();
        assert_eq!(raw.as_sql(), "NOW()");
        assert!(raw.values().is_empty());
    }
}
