use crate::error::{Result, SqlxFluentError};
use std::fmt;
use std::str::FromStr;

/// 条件连接符：AND 或 OR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

/// SQL 操作符枚举
///
/// 允许的操作符：`> < >= <= = != <> IN LIKE BETWEEN NOT BETWEEN NOT IN IS NULL IS NOT NULL`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// 等于: =
    Eq,
    /// 不等于: !=
    Ne,
    /// 不等于: <>
    LtGt,
    /// 大于: >
    Gt,
    /// 大于等于: >=
    Ge,
    /// 小于: <
    Lt,
    /// 小于等于: <=
    Le,
    In,
    NotIn,
    Like,
    Between,
    NotBetween,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// 解析操作符，先去除首尾空白并转为大写，再与允许列表比对
    pub fn parse(op: &str) -> Result<Self> {
        let normalized = op.trim().to_uppercase();
        let operator = match normalized.as_str() {
            "=" => Operator::Eq,
            "!=" => Operator::Ne,
            "<>" => Operator::LtGt,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            "LIKE" => Operator::Like,
            "BETWEEN" => Operator::Between,
            "NOT BETWEEN" => Operator::NotBetween,
            "IS NULL" => Operator::IsNull,
            "IS NOT NULL" => Operator::IsNotNull,
            _ => {
                return Err(SqlxFluentError::InvalidOperator(format!(
                    "Invalid operator: {}",
                    op
                )))
            }
        };
        Ok(operator)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::LtGt => "<>",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Like => "LIKE",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }
}

impl FromStr for Operator {
    type Err = SqlxFluentError;

    fn from_str(s: &str) -> Result<Self> {
        Operator::parse(s)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JOIN 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
        }
    }
}

impl FromStr for JoinKind {
    type Err = SqlxFluentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "INNER" => Ok(JoinKind::Inner),
            "LEFT" => Ok(JoinKind::Left),
            "RIGHT" => Ok(JoinKind::Right),
            _ => Err(SqlxFluentError::InvalidArity(format!(
                "Invalid join type: {}",
                s
            ))),
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = SqlxFluentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(SqlxFluentError::InvalidDirection(format!(
                "Order direction must be ASC or DESC, got: {}",
                s
            ))),
        }
    }
}
