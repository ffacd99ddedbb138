//! 标识符（表名、列名）的引用与转义

use crate::flatten::Arg;
use crate::raw::Raw;

/// 列 / 表引用：普通名称或原生 SQL 片段
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnRef {
    Name(String),
    Raw(Raw),
}

impl ColumnRef {
    /// 普通名称（非原生片段）时返回名称
    pub fn name(&self) -> Option<&str> {
        match self {
            ColumnRef::Name(name) => Some(name),
            ColumnRef::Raw(_) => None,
        }
    }
}

/// 使用反引号转义标识符
///
/// - `*` 原样返回
/// - 含 `.` 时按第一个 `.` 拆成两段分别转义，例如 `u.id` -> `` `u`.`id` ``
/// - 标识符中的反引号会被双写
pub fn quote_identifier(name: &str) -> String {
    if name == "*" {
        return name.to_string();
    }
    match name.split_once('.') {
        Some((owner, column)) => format!("{}.{}", quote_part(owner), quote_part(column)),
        None => quote_part(name),
    }
}

fn quote_part(part: &str) -> String {
    if part == "*" {
        return part.to_string();
    }
    format!("`{}`", part.replace('`', "``"))
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::Name(name)
    }
}

impl From<&String> for ColumnRef {
    fn from(name: &String) -> Self {
        ColumnRef::Name(name.clone())
    }
}

impl From<Raw> for ColumnRef {
    fn from(raw: Raw) -> Self {
        ColumnRef::Raw(raw)
    }
}

impl From<ColumnRef> for Arg<ColumnRef> {
    fn from(column: ColumnRef) -> Self {
        Arg::Item(column)
    }
}

impl From<&str> for Arg<ColumnRef> {
    fn from(name: &str) -> Self {
        Arg::Item(name.into())
    }
}

impl From<String> for Arg<ColumnRef> {
    fn from(name: String) -> Self {
        Arg::Item(name.into())
    }
}

impl From<&String> for Arg<ColumnRef> {
    fn from(name: &String) -> Self {
        Arg::Item(name.into())
    }
}

impl From<Raw> for Arg<ColumnRef> {
    fn from(raw: Raw) -> Self {
        Arg::Item(raw.into())
    }
}
