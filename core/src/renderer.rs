//! 将条件树与各子句渲染为 SQL，绑定值按占位符出现顺序收集

use crate::bind_value::BindValue;
use crate::error::{Result, SqlxFluentError};
use crate::flatten::Arg;
use crate::identifier::{quote_identifier, ColumnRef};
use crate::predicate::{Conditions, Predicate};
use crate::raw::Raw;

/// 渲染结果：SQL 文本与按顺序排列的绑定值
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// 渲染器，每次渲染使用新的实例，绑定值与 `?` 的输出顺序保持一致
#[derive(Debug, Default)]
pub struct Renderer {
    binds: Vec<BindValue>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个绑定值并返回占位符
    pub fn bind(&mut self, value: BindValue) -> &'static str {
        self.binds.push(value);
        "?"
    }

    /// 转义列 / 表引用；原生片段原样输出并合并其绑定值
    pub fn quote(&mut self, column: &ColumnRef) -> String {
        match column {
            ColumnRef::Name(name) => quote_identifier(name),
            ColumnRef::Raw(raw) => self.raw(raw),
        }
    }

    pub fn raw(&mut self, raw: &Raw) -> String {
        self.binds.extend(raw.values().iter().cloned());
        raw.as_sql().to_string()
    }

    /// 渲染条件列表（不含 WHERE / HAVING 关键字），空分组不输出
    pub fn conditions(&mut self, conditions: &Conditions) -> Result<String> {
        let mut fragments: Vec<String> = Vec::with_capacity(conditions.len());
        for node in conditions.nodes() {
            let fragment = match &node.predicate {
                Predicate::Group(inner) => {
                    if inner.is_empty() {
                        continue;
                    }
                    format!("({})", self.conditions(inner)?)
                }
                Predicate::Raw(raw) => self.raw(raw),
                Predicate::NullCheck { field, negated } => {
                    let field = self.quote(field);
                    if *negated {
                        format!("{} IS NOT NULL", field)
                    } else {
                        format!("{} IS NULL", field)
                    }
                }
                Predicate::Between {
                    field,
                    values,
                    negated,
                } => {
                    let field = self.quote(field);
                    let values = values.clone().flatten();
                    let [low, high]: [BindValue; 2] = values.try_into().map_err(|_| {
                        SqlxFluentError::InvalidArity("Missing BETWEEN values".to_string())
                    })?;
                    let keyword = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
                    format!(
                        "{} {} {} AND {}",
                        field,
                        keyword,
                        self.bind(low),
                        self.bind(high)
                    )
                }
                Predicate::InSet {
                    field,
                    values,
                    negated,
                } => {
                    let field = self.quote(field);
                    if matches!(values, Arg::Item(value) if value.is_null()) {
                        return Err(SqlxFluentError::InvalidArity(
                            "Missing IN values".to_string(),
                        ));
                    }
                    let placeholders: Vec<&str> = values
                        .clone()
                        .flatten()
                        .into_iter()
                        .map(|value| self.bind(value))
                        .collect();
                    let keyword = if *negated { "NOT IN" } else { "IN" };
                    format!("{} {} ({})", field, keyword, placeholders.join(","))
                }
                Predicate::Like { field, value } => {
                    let field = self.quote(field);
                    format!("{} LIKE {}", field, self.bind(value.clone()))
                }
                Predicate::Comparison {
                    field,
                    operator,
                    value,
                } => {
                    let field = self.quote(field);
                    format!("{} {} {}", field, operator, self.bind(value.clone()))
                }
            };

            if fragments.is_empty() {
                fragments.push(fragment);
            } else {
                fragments.push(format!("{} {}", node.combinator.as_str(), fragment));
            }
        }
        Ok(fragments.join(" "))
    }

    /// 带关键字的子句，条件为空时返回空字符串
    pub fn clause(&mut self, keyword: &str, conditions: &Conditions) -> Result<String> {
        let body = self.conditions(conditions)?;
        if body.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!("{} {}", keyword, body))
        }
    }

    pub fn finish(self, sql: String) -> Statement {
        Statement {
            sql,
            binds: self.binds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Filter;

    #[test]
    fn test_render_drops_first_combinator() {
        let c = Conditions::new().or_where_eq("a", 1).where_eq("b", 2);
        let mut r = Renderer::new();
        assert_eq!(r.conditions(&c).unwrap(), "`a` = ? AND `b` = ?");
    }

    #[test]
    fn test_render_skips_empty_group() {
        let c = Conditions::new()
            .where_group(|g| g)
            .or_where_eq("a", 1)
            .where_group(|g| g);
        let mut r = Renderer::new();
        assert_eq!(r.conditions(&c).unwrap(), "`a` = ?");
        assert_eq!(r.finish(String::new()).binds, vec![BindValue::Int32(1)]);
    }

    #[test]
    fn test_render_between_arity() {
        let c = Conditions::new().where_op("id", "BETWEEN", vec![1]).unwrap();
        let err = Renderer::new().conditions(&c).unwrap_err();
        assert!(matches!(err, SqlxFluentError::InvalidArity(_)));

        let c = Conditions::new()
            .where_op("id", "BETWEEN", vec![1, 2, 3])
            .unwrap();
        assert!(Renderer::new().conditions(&c).is_err());
    }

    #[test]
    fn test_render_between_flattens() {
        let c = Conditions::new()
            .where_op("id", "not between", vec![vec![1], vec![5]])
            .unwrap();
        let mut r = Renderer::new();
        assert_eq!(r.conditions(&c).unwrap(), "`id` NOT BETWEEN ? AND ?");
        assert_eq!(
            r.finish(String::new()).binds,
            vec![BindValue::Int32(1), BindValue::Int32(5)]
        );
    }

    #[test]
    fn test_render_in_requires_values() {
        let c = Conditions::new()
            .where_op("id", "IN", BindValue::Null)
            .unwrap();
        let err = Renderer::new().conditions(&c).unwrap_err();
        assert!(matches!(err, SqlxFluentError::InvalidArity(_)));
    }

    #[test]
    fn test_render_in_empty_set() {
        let c = Conditions::new().where_in("id", Vec::<i32>::new());
        let mut r = Renderer::new();
        assert_eq!(r.conditions(&c).unwrap(), "`id` IN ()");
    }

    #[test]
    fn test_render_raw_field_values_come_first() {
        let c = Conditions::new().where_eq(Raw::new("COALESCE(`a`, ?)", 0), 5);
        let mut r = Renderer::new();
        assert_eq!(r.conditions(&c).unwrap(), "COALESCE(`a`, ?) = ?");
        assert_eq!(
            r.finish(String::new()).binds,
            vec![BindValue::Int32(0), BindValue::Int32(5)]
        );
    }

    #[test]
    fn test_clause_empty() {
        let mut r = Renderer::new();
        assert_eq!(r.clause("WHERE", &Conditions::new()).unwrap(), "");
    }
}
