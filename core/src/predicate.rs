//! WHERE / HAVING 条件树

use crate::bind_value::BindValue;
use crate::error::{Result, SqlxFluentError};
use crate::flatten::Arg;
use crate::identifier::ColumnRef;
use crate::operator::{Combinator, Operator};
use crate::raw::Raw;
use crate::utils::resolve_dynamic_where;

/// 单个条件
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field <op> ?`
    Comparison {
        field: ColumnRef,
        operator: Operator,
        value: BindValue,
    },
    /// `field IS [NOT] NULL`
    NullCheck { field: ColumnRef, negated: bool },
    /// `field [NOT] BETWEEN ? AND ?`，值在渲染时展开并校验个数
    Between {
        field: ColumnRef,
        values: Arg<BindValue>,
        negated: bool,
    },
    /// `field [NOT] IN (?,?,..)`，值在渲染时展开
    InSet {
        field: ColumnRef,
        values: Arg<BindValue>,
        negated: bool,
    },
    /// `field LIKE ?`
    Like { field: ColumnRef, value: BindValue },
    Raw(Raw),
    /// 括号包裹的嵌套条件
    Group(Conditions),
}

impl Predicate {
    /// 根据操作符构造条件，操作符不合法时立即返回错误
    pub fn compare(
        field: impl Into<ColumnRef>,
        op: &str,
        value: impl Into<Arg<BindValue>>,
    ) -> Result<Self> {
        let field = field.into();
        let operator = Operator::parse(op)?;
        let predicate = match operator {
            Operator::IsNull | Operator::IsNotNull => Predicate::NullCheck {
                field,
                negated: operator == Operator::IsNotNull,
            },
            Operator::In | Operator::NotIn => Predicate::InSet {
                field,
                values: value.into(),
                negated: operator == Operator::NotIn,
            },
            Operator::Between | Operator::NotBetween => Predicate::Between {
                field,
                values: value.into(),
                negated: operator == Operator::NotBetween,
            },
            Operator::Like => Predicate::Like {
                field,
                value: single_value(operator, value.into())?,
            },
            _ => Predicate::Comparison {
                field,
                operator,
                value: single_value(operator, value.into())?,
            },
        };
        Ok(predicate)
    }
}

fn single_value(operator: Operator, value: Arg<BindValue>) -> Result<BindValue> {
    match value {
        Arg::Item(value) => Ok(value),
        Arg::List(_) => Err(SqlxFluentError::InvalidArity(format!(
            "Operator {} expects a single value",
            operator
        ))),
    }
}

/// 带连接符的条件节点
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub combinator: Combinator,
    pub predicate: Predicate,
}

/// 有序的条件列表，第一个输出节点的连接符在渲染时被忽略
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    nodes: Vec<Node>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn push(&mut self, combinator: Combinator, predicate: Predicate) {
        self.nodes.push(Node {
            combinator,
            predicate,
        });
    }
}

impl Filter for Conditions {
    fn conditions_mut(&mut self) -> &mut Conditions {
        self
    }
}

/// 条件构建方法，`QueryBuilder` 与嵌套分组中的 `Conditions` 共用
///
/// ```ignore
/// QueryBuilder::new()
///     .from("users")
///     .where_op("activated", ">", 0)?
///     .where_group(|g| {
///         g.where_in("status", vec![1, 2, 3])
///             .where_group(|g| g.where_eq("id", 3).or_where_eq("id", 4))
///     });
/// ```
pub trait Filter: Sized {
    fn conditions_mut(&mut self) -> &mut Conditions;

    /// 追加一个条件节点
    fn push_where(mut self, combinator: Combinator, predicate: Predicate) -> Self {
        self.conditions_mut().push(combinator, predicate);
        self
    }

    /// `field = ?`
    fn where_eq(self, field: impl Into<ColumnRef>, value: impl Into<BindValue>) -> Self {
        self.push_where(
            Combinator::And,
            Predicate::Comparison {
                field: field.into(),
                operator: Operator::Eq,
                value: value.into(),
            },
        )
    }

    fn or_where_eq(self, field: impl Into<ColumnRef>, value: impl Into<BindValue>) -> Self {
        self.push_where(
            Combinator::Or,
            Predicate::Comparison {
                field: field.into(),
                operator: Operator::Eq,
                value: value.into(),
            },
        )
    }

    /// 指定操作符的条件，操作符不在允许列表中时返回 `InvalidOperator`
    fn where_op(
        self,
        field: impl Into<ColumnRef>,
        op: &str,
        value: impl Into<Arg<BindValue>>,
    ) -> Result<Self> {
        Ok(self.push_where(Combinator::And, Predicate::compare(field, op, value)?))
    }

    fn or_where_op(
        self,
        field: impl Into<ColumnRef>,
        op: &str,
        value: impl Into<Arg<BindValue>>,
    ) -> Result<Self> {
        Ok(self.push_where(Combinator::Or, Predicate::compare(field, op, value)?))
    }

    fn where_in(self, field: impl Into<ColumnRef>, values: impl Into<Arg<BindValue>>) -> Self {
        self.push_where(Combinator::And, in_set(field, values, false))
    }

    fn or_where_in(self, field: impl Into<ColumnRef>, values: impl Into<Arg<BindValue>>) -> Self {
        self.push_where(Combinator::Or, in_set(field, values, false))
    }

    fn where_not_in(self, field: impl Into<ColumnRef>, values: impl Into<Arg<BindValue>>) -> Self {
        self.push_where(Combinator::And, in_set(field, values, true))
    }

    fn or_where_not_in(
        self,
        field: impl Into<ColumnRef>,
        values: impl Into<Arg<BindValue>>,
    ) -> Self {
        self.push_where(Combinator::Or, in_set(field, values, true))
    }

    fn where_between(
        self,
        field: impl Into<ColumnRef>,
        low: impl Into<BindValue>,
        high: impl Into<BindValue>,
    ) -> Self {
        self.push_where(Combinator::And, between(field, low, high, false))
    }

    fn or_where_between(
        self,
        field: impl Into<ColumnRef>,
        low: impl Into<BindValue>,
        high: impl Into<BindValue>,
    ) -> Self {
        self.push_where(Combinator::Or, between(field, low, high, false))
    }

    fn where_not_between(
        self,
        field: impl Into<ColumnRef>,
        low: impl Into<BindValue>,
        high: impl Into<BindValue>,
    ) -> Self {
        self.push_where(Combinator::And, between(field, low, high, true))
    }

    fn or_where_not_between(
        self,
        field: impl Into<ColumnRef>,
        low: impl Into<BindValue>,
        high: impl Into<BindValue>,
    ) -> Self {
        self.push_where(Combinator::Or, between(field, low, high, true))
    }

    fn where_null(self, field: impl Into<ColumnRef>) -> Self {
        self.push_where(Combinator::And, null_check(field, false))
    }

    fn or_where_null(self, field: impl Into<ColumnRef>) -> Self {
        self.push_where(Combinator::Or, null_check(field, false))
    }

    fn where_not_null(self, field: impl Into<ColumnRef>) -> Self {
        self.push_where(Combinator::And, null_check(field, true))
    }

    fn or_where_not_null(self, field: impl Into<ColumnRef>) -> Self {
        self.push_where(Combinator::Or, null_check(field, true))
    }

    /// `field LIKE ?`，通配符由调用方提供
    fn where_like(self, field: impl Into<ColumnRef>, pattern: impl Into<BindValue>) -> Self {
        self.push_where(
            Combinator::And,
            Predicate::Like {
                field: field.into(),
                value: pattern.into(),
            },
        )
    }

    fn or_where_like(self, field: impl Into<ColumnRef>, pattern: impl Into<BindValue>) -> Self {
        self.push_where(
            Combinator::Or,
            Predicate::Like {
                field: field.into(),
                value: pattern.into(),
            },
        )
    }

    fn where_raw(self, raw: impl Into<Raw>) -> Self {
        self.push_where(Combinator::And, Predicate::Raw(raw.into()))
    }

    fn or_where_raw(self, raw: impl Into<Raw>) -> Self {
        self.push_where(Combinator::Or, Predicate::Raw(raw.into()))
    }

    /// 嵌套分组：闭包在空的 `Conditions` 上构建子条件，结果整体加括号
    fn where_group<F>(self, f: F) -> Self
    where
        F: FnOnce(Conditions) -> Conditions,
    {
        self.push_where(Combinator::And, Predicate::Group(f(Conditions::new())))
    }

    fn or_where_group<F>(self, f: F) -> Self
    where
        F: FnOnce(Conditions) -> Conditions,
    {
        self.push_where(Combinator::Or, Predicate::Group(f(Conditions::new())))
    }

    /// 闭包内需要使用 `where_op` 等可能失败的方法时使用
    fn try_where_group<F>(self, f: F) -> Result<Self>
    where
        F: FnOnce(Conditions) -> Result<Conditions>,
    {
        Ok(self.push_where(Combinator::And, Predicate::Group(f(Conditions::new())?)))
    }

    fn try_or_where_group<F>(self, f: F) -> Result<Self>
    where
        F: FnOnce(Conditions) -> Result<Conditions>,
    {
        Ok(self.push_where(Combinator::Or, Predicate::Group(f(Conditions::new())?)))
    }

    /// `field IS NOT NULL AND field != ''`
    fn where_not_empty(self, field: impl Into<ColumnRef>) -> Self {
        let field = field.into();
        self.where_not_null(field.clone()).push_where(
            Combinator::And,
            Predicate::Comparison {
                field,
                operator: Operator::Ne,
                value: BindValue::String(String::new()),
            },
        )
    }

    /// `OR (field IS NOT NULL AND field != '')`
    fn or_where_not_empty(self, field: impl Into<ColumnRef>) -> Self {
        let field = field.into();
        self.or_where_group(|g| g.where_not_empty(field))
    }

    /// 按方法名追加等值条件，例如 `whereUserId` -> `user_id = ?`，
    /// `orWhereUserId` -> `OR user_id = ?`
    fn where_by(self, method: &str, value: impl Into<BindValue>) -> Result<Self> {
        let (combinator, column) = resolve_dynamic_where(method)?;
        Ok(self.push_where(
            combinator,
            Predicate::Comparison {
                field: column.into(),
                operator: Operator::Eq,
                value: value.into(),
            },
        ))
    }

    /// 按方法名追加指定操作符的条件
    fn where_by_op(
        self,
        method: &str,
        op: &str,
        value: impl Into<Arg<BindValue>>,
    ) -> Result<Self> {
        let (combinator, column) = resolve_dynamic_where(method)?;
        Ok(self.push_where(combinator, Predicate::compare(column, op, value)?))
    }
}

fn in_set(field: impl Into<ColumnRef>, values: impl Into<Arg<BindValue>>, negated: bool) -> Predicate {
    Predicate::InSet {
        field: field.into(),
        values: values.into(),
        negated,
    }
}

fn between(
    field: impl Into<ColumnRef>,
    low: impl Into<BindValue>,
    high: impl Into<BindValue>,
    negated: bool,
) -> Predicate {
    Predicate::Between {
        field: field.into(),
        values: Arg::List(vec![Arg::Item(low.into()), Arg::Item(high.into())]),
        negated,
    }
}

fn null_check(field: impl Into<ColumnRef>, negated: bool) -> Predicate {
    Predicate::NullCheck {
        field: field.into(),
        negated,
    }
}
