//! 工具函数模块

use crate::error::{Result, SqlxFluentError};
use crate::operator::Combinator;
use heck::ToSnakeCase;

/// 动态条件方法前缀，较长的前缀在前
const DYNAMIC_WHERE_PREFIXES: &[(&str, Combinator)] =
    &[("orWhere", Combinator::Or), ("where", Combinator::And)];

/// 驼峰转下划线，例如 `UserId` -> `user_id`
pub fn camel_to_snake(name: &str) -> String {
    name.to_snake_case()
}

/// 解析动态条件方法名
///
/// `whereUserId` -> `(And, "user_id")`，`orWhereStatus` -> `(Or, "status")`。
/// 前缀不匹配或缺少列名后缀时返回 `UnknownMethod`。
pub fn resolve_dynamic_where(method: &str) -> Result<(Combinator, String)> {
    for (prefix, combinator) in DYNAMIC_WHERE_PREFIXES {
        if let Some(suffix) = method.strip_prefix(prefix) {
            if suffix.starts_with(|c: char| c.is_ascii_uppercase()) {
                return Ok((*combinator, camel_to_snake(suffix)));
            }
        }
    }
    Err(SqlxFluentError::UnknownMethod(method.to_string()))
}
