use crate::bind_value::{Assignment, BindValue};
use crate::error::{Result, SqlxFluentError};
use crate::flatten::Arg;
use crate::identifier::{quote_identifier, ColumnRef};
use crate::operator::{Combinator, Direction, JoinKind, Operator};
use crate::predicate::{Conditions, Filter, Predicate};
use crate::raw::Raw;
use crate::renderer::{Renderer, Statement};

/// 构建 `(列名, 取值)` 列表，用于 `insert` / `update`
///
/// ```ignore
/// let data = sqlxfluent::values! {
///     "email" => "a@b.com",
///     "updated_at" => Raw::sql("NOW()"),
/// };
/// ```
#[macro_export]
macro_rules! values {
    ($($column:expr => $value:expr),* $(,)?) => {
        vec![$((::std::string::ToString::to_string(&$column), $crate::Assignment::from($value))),*]
    };
}

/// JOIN 的连接条件
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOn {
    /// `left <op> right`，两侧均按列名转义
    Columns {
        left: ColumnRef,
        operator: Operator,
        right: ColumnRef,
    },
    Raw(Raw),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: ColumnRef,
    pub on: JoinOn,
}

/// 链式查询构建器
///
/// `table` / `from` 会重置全部状态，其余链式方法只追加。
/// 渲染不修改构建器，多次调用 `to_sql` 结果一致；执行类方法也不会清空条件。
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    table: Option<String>,
    from: Vec<ColumnRef>,
    select: Vec<ColumnRef>,
    wheres: Conditions,
    havings: Conditions,
    joins: Vec<Join>,
    group_by: Vec<ColumnRef>,
    order_by: Vec<(ColumnRef, Direction)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Filter for QueryBuilder {
    fn conditions_mut(&mut self) -> &mut Conditions {
        &mut self.wheres
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 重置状态并指定目标表（同时作为 FROM 与写操作的目标）
    pub fn table(self, name: &str) -> Self {
        Self {
            table: Some(name.to_string()),
            from: vec![ColumnRef::from(name)],
            ..Self::default()
        }
    }

    /// 重置状态并指定 FROM 列表，第一个普通表名作为写操作的目标
    pub fn from(self, tables: impl Into<Arg<ColumnRef>>) -> Self {
        let from = tables.into().flatten();
        let table = from.first().and_then(|t| t.name()).map(str::to_string);
        Self {
            table,
            from,
            ..Self::default()
        }
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// 追加查询列，支持嵌套列表
    pub fn select(mut self, fields: impl Into<Arg<ColumnRef>>) -> Self {
        self.select.extend(fields.into().flatten());
        self
    }

    pub fn select_raw(mut self, raw: impl Into<Raw>) -> Self {
        self.select.push(ColumnRef::Raw(raw.into()));
        self
    }

    // ========== JOIN ==========

    /// `<kind> JOIN table ON left <op> right`，`kind` 为 INNER / LEFT / RIGHT
    pub fn join(
        mut self,
        table: impl Into<ColumnRef>,
        left: impl Into<ColumnRef>,
        op: &str,
        right: impl Into<ColumnRef>,
        kind: &str,
    ) -> Result<Self> {
        let kind: JoinKind = kind.parse()?;
        let operator = Operator::parse(op)?;
        self.joins.push(Join {
            kind,
            table: table.into(),
            on: JoinOn::Columns {
                left: left.into(),
                operator,
                right: right.into(),
            },
        });
        Ok(self)
    }

    pub fn inner_join(
        self,
        table: impl Into<ColumnRef>,
        left: impl Into<ColumnRef>,
        op: &str,
        right: impl Into<ColumnRef>,
    ) -> Result<Self> {
        self.join(table, left, op, right, "INNER")
    }

    pub fn left_join(
        self,
        table: impl Into<ColumnRef>,
        left: impl Into<ColumnRef>,
        op: &str,
        right: impl Into<ColumnRef>,
    ) -> Result<Self> {
        self.join(table, left, op, right, "LEFT")
    }

    pub fn right_join(
        self,
        table: impl Into<ColumnRef>,
        left: impl Into<ColumnRef>,
        op: &str,
        right: impl Into<ColumnRef>,
    ) -> Result<Self> {
        self.join(table, left, op, right, "RIGHT")
    }

    /// `<kind> JOIN table ON <raw>`，原生条件的绑定值在 JOIN 位置合并
    pub fn join_raw(
        self,
        table: impl Into<ColumnRef>,
        on: impl Into<Raw>,
        kind: &str,
    ) -> Result<Self> {
        let kind: JoinKind = kind.parse()?;
        Ok(self.push_join_raw(kind, table.into(), on.into()))
    }

    pub fn inner_join_raw(self, table: impl Into<ColumnRef>, on: impl Into<Raw>) -> Self {
        self.push_join_raw(JoinKind::Inner, table.into(), on.into())
    }

    pub fn left_join_raw(self, table: impl Into<ColumnRef>, on: impl Into<Raw>) -> Self {
        self.push_join_raw(JoinKind::Left, table.into(), on.into())
    }

    pub fn right_join_raw(self, table: impl Into<ColumnRef>, on: impl Into<Raw>) -> Self {
        self.push_join_raw(JoinKind::Right, table.into(), on.into())
    }

    fn push_join_raw(mut self, kind: JoinKind, table: ColumnRef, on: Raw) -> Self {
        self.joins.push(Join {
            kind,
            table,
            on: JoinOn::Raw(on),
        });
        self
    }

    // ========== GROUP BY / HAVING ==========

    pub fn group_by(mut self, fields: impl Into<Arg<ColumnRef>>) -> Self {
        self.group_by.extend(fields.into().flatten());
        self
    }

    fn push_having(mut self, combinator: Combinator, predicate: Predicate) -> Self {
        self.havings.push(combinator, predicate);
        self
    }

    pub fn having_eq(self, field: impl Into<ColumnRef>, value: impl Into<BindValue>) -> Self {
        self.push_having(Combinator::And, eq(field, value))
    }

    pub fn or_having_eq(self, field: impl Into<ColumnRef>, value: impl Into<BindValue>) -> Self {
        self.push_having(Combinator::Or, eq(field, value))
    }

    pub fn having_op(
        self,
        field: impl Into<ColumnRef>,
        op: &str,
        value: impl Into<Arg<BindValue>>,
    ) -> Result<Self> {
        Ok(self.push_having(Combinator::And, Predicate::compare(field, op, value)?))
    }

    pub fn or_having_op(
        self,
        field: impl Into<ColumnRef>,
        op: &str,
        value: impl Into<Arg<BindValue>>,
    ) -> Result<Self> {
        Ok(self.push_having(Combinator::Or, Predicate::compare(field, op, value)?))
    }

    pub fn having_null(self, field: impl Into<ColumnRef>) -> Self {
        self.push_having(Combinator::And, null_check(field, false))
    }

    pub fn or_having_null(self, field: impl Into<ColumnRef>) -> Self {
        self.push_having(Combinator::Or, null_check(field, false))
    }

    pub fn having_not_null(self, field: impl Into<ColumnRef>) -> Self {
        self.push_having(Combinator::And, null_check(field, true))
    }

    pub fn or_having_not_null(self, field: impl Into<ColumnRef>) -> Self {
        self.push_having(Combinator::Or, null_check(field, true))
    }

    pub fn having_raw(self, raw: impl Into<Raw>) -> Self {
        self.push_having(Combinator::And, Predicate::Raw(raw.into()))
    }

    pub fn or_having_raw(self, raw: impl Into<Raw>) -> Self {
        self.push_having(Combinator::Or, Predicate::Raw(raw.into()))
    }

    /// HAVING 分组，闭包中使用 `where_*` 系列方法构建子条件
    pub fn having_group<F>(self, f: F) -> Self
    where
        F: FnOnce(Conditions) -> Conditions,
    {
        self.push_having(Combinator::And, Predicate::Group(f(Conditions::new())))
    }

    pub fn or_having_group<F>(self, f: F) -> Self
    where
        F: FnOnce(Conditions) -> Conditions,
    {
        self.push_having(Combinator::Or, Predicate::Group(f(Conditions::new())))
    }

    pub fn try_having_group<F>(self, f: F) -> Result<Self>
    where
        F: FnOnce(Conditions) -> Result<Conditions>,
    {
        Ok(self.push_having(Combinator::And, Predicate::Group(f(Conditions::new())?)))
    }

    // ========== ORDER BY / LIMIT ==========

    pub fn order_by(mut self, field: impl Into<ColumnRef>, direction: Direction) -> Self {
        self.order_by.push((field.into(), direction));
        self
    }

    /// 方向以文本给出，只接受 ASC / DESC（不区分大小写）
    pub fn try_order_by(self, field: impl Into<ColumnRef>, direction: &str) -> Result<Self> {
        let direction: Direction = direction.parse()?;
        Ok(self.order_by(field, direction))
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    // ========== 渲染 ==========

    /// 渲染 SELECT 语句及其绑定值
    pub fn build(&self) -> Result<Statement> {
        let mut r = Renderer::new();
        let mut parts: Vec<String> = Vec::new();

        if self.select.is_empty() {
            parts.push("SELECT *".to_string());
        } else {
            let fields: Vec<String> = self.select.iter().map(|c| r.quote(c)).collect();
            parts.push(format!("SELECT {}", fields.join(",")));
        }

        if self.from.is_empty() {
            return Err(SqlxFluentError::Configuration(
                "Missing FROM statement".to_string(),
            ));
        }
        let tables: Vec<String> = self.from.iter().map(|t| r.quote(t)).collect();
        parts.push(format!("FROM {}", tables.join(",")));

        for join in &self.joins {
            let table = r.quote(&join.table);
            let on = match &join.on {
                JoinOn::Columns {
                    left,
                    operator,
                    right,
                } => {
                    let left = r.quote(left);
                    let right = r.quote(right);
                    format!("{} {} {}", left, operator, right)
                }
                JoinOn::Raw(raw) => r.raw(raw),
            };
            parts.push(format!("{} JOIN {} ON {}", join.kind.as_str(), table, on));
        }

        parts.push(r.clause("WHERE", &self.wheres)?);

        if !self.group_by.is_empty() {
            let fields: Vec<String> = self.group_by.iter().map(|c| r.quote(c)).collect();
            parts.push(format!("GROUP BY {}", fields.join(",")));
        }

        parts.push(r.clause("HAVING", &self.havings)?);

        if !self.order_by.is_empty() {
            let orders: Vec<String> = self
                .order_by
                .iter()
                .map(|(c, d)| format!("{} {}", r.quote(c), d.as_str()))
                .collect();
            parts.push(format!("ORDER BY {}", orders.join(",")));
        }

        if let Some(limit) = self.limit {
            match self.offset {
                Some(offset) => parts.push(format!("LIMIT {},{}", offset, limit)),
                None => parts.push(format!("LIMIT {}", limit)),
            }
        }

        let sql = parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(r.finish(sql.trim().to_string()))
    }

    pub fn to_sql(&self) -> Result<String> {
        Ok(self.build()?.sql)
    }

    /// 与 `to_sql` 中 `?` 顺序一致的绑定值
    pub fn binds(&self) -> Result<Vec<BindValue>> {
        Ok(self.build()?.binds)
    }

    pub(crate) fn target_table(&self) -> Result<&str> {
        self.table.as_deref().ok_or_else(|| {
            SqlxFluentError::Configuration("Table name is not specified".to_string())
        })
    }

    /// `INSERT INTO t(cols) VALUES(?,..)`，列顺序与 `data` 迭代顺序一致
    pub fn build_insert<I, K, V>(&self, data: I) -> Result<Statement>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Assignment>,
    {
        let table = self.target_table()?;
        let data = collect_data(data);
        if data.is_empty() {
            return Err(SqlxFluentError::EmptyPayload(
                "Insert data can not be empty".to_string(),
            ));
        }

        let mut r = Renderer::new();
        let mut columns = Vec::with_capacity(data.len());
        let mut values = Vec::with_capacity(data.len());
        for (column, value) in data {
            columns.push(quote_identifier(&column));
            values.push(assign(&mut r, value));
        }
        let sql = format!(
            "INSERT INTO {}({}) VALUES({})",
            quote_identifier(table),
            columns.join(","),
            values.join(",")
        );
        Ok(r.finish(sql))
    }

    /// `UPDATE t SET col=?,.. [WHERE ..]`，SET 的绑定值在 WHERE 之前
    pub fn build_update<I, K, V>(&self, data: I) -> Result<Statement>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Assignment>,
    {
        let table = self.target_table()?;
        let data = collect_data(data);
        if data.is_empty() {
            return Err(SqlxFluentError::EmptyPayload(
                "Update data can not be empty".to_string(),
            ));
        }

        let mut r = Renderer::new();
        let sets: Vec<String> = data
            .into_iter()
            .map(|(column, value)| format!("{}={}", quote_identifier(&column), assign(&mut r, value)))
            .collect();
        let mut sql = format!("UPDATE {} SET {}", quote_identifier(table), sets.join(","));
        let where_clause = r.clause("WHERE", &self.wheres)?;
        if !where_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&where_clause);
        }
        Ok(r.finish(sql))
    }

    /// `DELETE FROM t [WHERE ..]`
    pub fn build_delete(&self) -> Result<Statement> {
        let table = self.target_table()?;
        let mut r = Renderer::new();
        let mut sql = format!("DELETE FROM {}", quote_identifier(table));
        let where_clause = r.clause("WHERE", &self.wheres)?;
        if !where_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&where_clause);
        }
        Ok(r.finish(sql))
    }

    /// 聚合查询：查询列替换为 `FUNC(col)` 并限制一行，返回新构建器和结果列名
    pub(crate) fn aggregate(&self, func: &str, field: &str) -> (QueryBuilder, String) {
        let expression = format!("{}({})", func, quote_identifier(field));
        let mut builder = self.clone();
        builder.select = vec![ColumnRef::Raw(Raw::sql(expression.clone()))];
        builder.limit = Some(1);
        builder.offset = None;
        (builder, expression)
    }
}

fn eq(field: impl Into<ColumnRef>, value: impl Into<BindValue>) -> Predicate {
    Predicate::Comparison {
        field: field.into(),
        operator: Operator::Eq,
        value: value.into(),
    }
}

fn null_check(field: impl Into<ColumnRef>, negated: bool) -> Predicate {
    Predicate::NullCheck {
        field: field.into(),
        negated,
    }
}

fn collect_data<I, K, V>(data: I) -> Vec<(String, Assignment)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Assignment>,
{
    data.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

fn assign(r: &mut Renderer, value: Assignment) -> String {
    match value {
        Assignment::Value(value) => r.bind(value).to_string(),
        Assignment::Raw(raw) => r.raw(&raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values;

    fn users() -> QueryBuilder {
        QueryBuilder::new().from("users")
    }

    fn ints(values: &[i32]) -> Vec<BindValue> {
        values.iter().map(|v| BindValue::Int32(*v)).collect()
    }

    // ========== 基本查询测试 ==========
    #[test]
    fn test_table_select_all() {
        let builder = QueryBuilder::new().table("users");
        assert_eq!(builder.to_sql().unwrap(), "SELECT * FROM `users`");
        assert!(builder.binds().unwrap().is_empty());
    }

    #[test]
    fn test_missing_from() {
        let err = QueryBuilder::new().where_eq("id", 1).to_sql().unwrap_err();
        assert!(matches!(err, SqlxFluentError::Configuration(_)));
    }

    #[test]
    fn test_group_order_limit_offset() {
        let sql = users()
            .limit(10)
            .offset(10)
            .group_by("id")
            .order_by("email", Direction::Desc)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `users` GROUP BY `id` ORDER BY `email` DESC LIMIT 10,10"
        );
    }

    #[test]
    fn test_offset_without_limit_is_ignored() {
        assert_eq!(users().offset(5).to_sql().unwrap(), "SELECT * FROM `users`");
        assert_eq!(users().limit(5).to_sql().unwrap(), "SELECT * FROM `users` LIMIT 5");
    }

    #[test]
    fn test_select_and_or_where() {
        let builder = users()
            .select(vec!["id", "email"])
            .where_eq("id", 1)
            .or_where_op("id", ">=", 3)
            .unwrap();
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT `id`,`email` FROM `users` WHERE `id` = ? OR `id` >= ?"
        );
        assert_eq!(builder.binds().unwrap(), ints(&[1, 3]));
    }

    #[test]
    fn test_select_accumulates_and_flattens() {
        let builder = users()
            .select("id")
            .select(vec![vec!["u.name"], vec!["*"]])
            .select_raw(Raw::new("IF(`age` > ?, 1, 0) AS adult", 17));
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT `id`,`u`.`name`,*,IF(`age` > ?, 1, 0) AS adult FROM `users`"
        );
        assert_eq!(builder.binds().unwrap(), ints(&[17]));
    }

    #[test]
    fn test_from_resets_state() {
        let builder = users().where_eq("id", 1).limit(3).from(vec!["posts", "tags"]);
        assert_eq!(builder.to_sql().unwrap(), "SELECT * FROM `posts`,`tags`");
        assert_eq!(builder.table_name(), Some("posts"));
    }

    #[test]
    fn test_table_resets_state() {
        let builder = users().select("id").order_by("id", Direction::Asc).table("posts");
        assert_eq!(builder.to_sql().unwrap(), "SELECT * FROM `posts`");
    }

    // ========== 条件测试 ==========
    #[test]
    fn test_in_and_not_in() {
        let builder = users()
            .where_eq("id", 1)
            .where_eq("email", "test@mail.com")
            .or_where_in("id", vec![1, 2, 3])
            .where_not_in("status", vec![2, 3, 4]);
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `id` = ? AND `email` = ? OR `id` IN (?,?,?) AND `status` NOT IN (?,?,?)"
        );
        assert_eq!(
            builder.binds().unwrap(),
            vec![
                BindValue::Int32(1),
                BindValue::String("test@mail.com".to_string()),
                BindValue::Int32(1),
                BindValue::Int32(2),
                BindValue::Int32(3),
                BindValue::Int32(2),
                BindValue::Int32(3),
                BindValue::Int32(4),
            ]
        );
    }

    #[test]
    fn test_in_flattens_nested_values() {
        let builder = users().where_op("id", "in", vec![vec![1, 2], vec![3]]).unwrap();
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `id` IN (?,?,?)"
        );
        assert_eq!(builder.binds().unwrap(), ints(&[1, 2, 3]));
    }

    #[test]
    fn test_between() {
        let builder = users()
            .where_between("id", 1, 10)
            .or_where_not_between("age", 20, 30);
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `id` BETWEEN ? AND ? OR `age` NOT BETWEEN ? AND ?"
        );
        assert_eq!(builder.binds().unwrap(), ints(&[1, 10, 20, 30]));
    }

    #[test]
    fn test_between_missing_value() {
        let builder = users().where_op("id", "BETWEEN", vec![1]).unwrap();
        assert!(matches!(
            builder.to_sql(),
            Err(SqlxFluentError::InvalidArity(_))
        ));
    }

    #[test]
    fn test_null_checks() {
        let builder = users()
            .where_null("deleted_at")
            .or_where_not_null("email")
            .where_op("banned_at", "is null", BindValue::Null)
            .unwrap();
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `deleted_at` IS NULL OR `email` IS NOT NULL AND `banned_at` IS NULL"
        );
        assert!(builder.binds().unwrap().is_empty());
    }

    #[test]
    fn test_like() {
        let builder = users().where_like("name", "jo%").or_where_like("email", "%@x.com");
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `name` LIKE ? OR `email` LIKE ?"
        );
        assert_eq!(
            builder.binds().unwrap(),
            vec![
                BindValue::String("jo%".to_string()),
                BindValue::String("%@x.com".to_string())
            ]
        );
    }

    #[test]
    fn test_invalid_operator() {
        let err = users().where_op("id", "===", 1).unwrap_err();
        assert!(matches!(err, SqlxFluentError::InvalidOperator(_)));
    }

    #[test]
    fn test_where_raw() {
        let builder = users()
            .where_eq("status", 1)
            .or_where_raw(Raw::new("`age` > ? AND `age` < ?", vec![18, 60]))
            .where_raw("`deleted_at` IS NULL");
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `status` = ? OR `age` > ? AND `age` < ? AND `deleted_at` IS NULL"
        );
        assert_eq!(builder.binds().unwrap(), ints(&[1, 18, 60]));
    }

    #[test]
    fn test_where_not_empty() {
        let builder = users().where_eq("id", 1).or_where_not_empty("email");
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `id` = ? OR (`email` IS NOT NULL AND `email` != ?)"
        );
        assert_eq!(
            builder.binds().unwrap(),
            vec![BindValue::Int32(1), BindValue::String(String::new())]
        );
    }

    #[test]
    fn test_where_by_dynamic() {
        let builder = users()
            .where_by("whereUserId", 5)
            .unwrap()
            .where_by_op("orWhereCreatedAt", ">", "2024-01-01")
            .unwrap();
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `user_id` = ? OR `created_at` > ?"
        );
    }

    // ========== 条件分组测试 ==========
    #[test]
    fn test_nested_groups() {
        let builder = users()
            .where_op("activated", ">", 0)
            .unwrap()
            .where_group(|g| {
                g.where_in("status", vec![1, 2, 3])
                    .where_group(|g| g.where_eq("id", 3).or_where_eq("id", 4))
            });
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `activated` > ? AND (`status` IN (?,?,?) AND (`id` = ? OR `id` = ?))"
        );
        assert_eq!(builder.binds().unwrap(), ints(&[0, 1, 2, 3, 3, 4]));
    }

    #[test]
    fn test_or_group() {
        let builder = users()
            .where_eq("is_del", 0)
            .or_where_group(|g| g.where_eq("role", "admin").where_not_null("email"));
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `is_del` = ? OR (`role` = ? AND `email` IS NOT NULL)"
        );
    }

    #[test]
    fn test_try_group_propagates_error() {
        let result = users().try_where_group(|g| g.where_op("id", "??", 1));
        assert!(matches!(result, Err(SqlxFluentError::InvalidOperator(_))));

        let builder = users()
            .try_or_where_group(|g| g.where_op("age", ">", 18))
            .unwrap();
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE (`age` > ?)"
        );
    }

    #[test]
    fn test_empty_group_only() {
        let builder = users().where_group(|g| g);
        assert_eq!(builder.to_sql().unwrap(), "SELECT * FROM `users`");
    }

    // ========== JOIN 测试 ==========
    #[test]
    fn test_joins() {
        let builder = QueryBuilder::new()
            .from("users")
            .select(vec!["users.id", "p.title"])
            .left_join("posts", "users.id", "=", "posts.user_id")
            .unwrap()
            .inner_join_raw("tags", Raw::new("`tags`.`post_id` = `posts`.`id` AND `tags`.`kind` = ?", "news"))
            .where_eq("users.id", 1);
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT `users`.`id`,`p`.`title` FROM `users` LEFT JOIN `posts` ON `users`.`id` = `posts`.`user_id` INNER JOIN `tags` ON `tags`.`post_id` = `posts`.`id` AND `tags`.`kind` = ? WHERE `users`.`id` = ?"
        );
        assert_eq!(
            builder.binds().unwrap(),
            vec![BindValue::String("news".to_string()), BindValue::Int32(1)]
        );
    }

    #[test]
    fn test_join_kind_from_text() {
        let sql = users()
            .join("posts", "users.id", "=", "posts.user_id", "right")
            .unwrap()
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `users` RIGHT JOIN `posts` ON `users`.`id` = `posts`.`user_id`"
        );
        assert!(users().join("posts", "a", "=", "b", "CROSS").is_err());
        assert!(users().join_raw("posts", "1 = 1", "OUTER").is_err());
    }

    // ========== GROUP BY 和 HAVING 测试 ==========
    #[test]
    fn test_group_by_multiple_fields() {
        let sql = users().group_by(vec!["status", "role"]).group_by("age").to_sql().unwrap();
        assert_eq!(sql, "SELECT * FROM `users` GROUP BY `status`,`role`,`age`");
    }

    #[test]
    fn test_group_by_with_where_and_having() {
        let builder = users()
            .select("status")
            .select_raw("COUNT(*) AS total")
            .where_eq("is_del", 0)
            .group_by("status")
            .having_op(Raw::sql("COUNT(*)"), ">", 10)
            .unwrap()
            .or_having_raw(Raw::new("SUM(`score`) < ?", 100))
            .order_by("status", Direction::Asc);
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT `status`,COUNT(*) AS total FROM `users` WHERE `is_del` = ? GROUP BY `status` HAVING COUNT(*) > ? OR SUM(`score`) < ? ORDER BY `status` ASC"
        );
        assert_eq!(builder.binds().unwrap(), ints(&[0, 10, 100]));
    }

    #[test]
    fn test_having_null_and_group() {
        let builder = users()
            .group_by("role")
            .having_not_null("role")
            .or_having_group(|g| g.where_eq("role", "admin").or_where_null("role"))
            .having_eq("status", 1);
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT * FROM `users` GROUP BY `role` HAVING `role` IS NOT NULL OR (`role` = ? OR `role` IS NULL) AND `status` = ?"
        );
    }

    // ========== ORDER BY 测试 ==========
    #[test]
    fn test_order_by_multiple() {
        let sql = users()
            .order_by("age", Direction::Desc)
            .try_order_by("name", "asc")
            .unwrap()
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM `users` ORDER BY `age` DESC,`name` ASC");
    }

    #[test]
    fn test_order_by_invalid_direction() {
        let err = users().try_order_by("name", "up").unwrap_err();
        assert!(matches!(err, SqlxFluentError::InvalidDirection(_)));
    }

    // ========== 渲染幂等 ==========
    #[test]
    fn test_render_is_idempotent() {
        let builder = users()
            .where_in("id", vec![1, 2])
            .where_group(|g| g.where_eq("a", 1).or_where_eq("b", 2))
            .having_eq("c", 3);
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.sql.matches('?').count(), first.binds.len());
    }

    // ========== 写操作测试 ==========
    #[test]
    fn test_build_insert() {
        let stmt = QueryBuilder::new()
            .table("users")
            .build_insert(values! {
                "email" => "a@b.com",
                "age" => 20,
                "created_at" => Raw::sql("NOW()"),
            })
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `users`(`email`,`age`,`created_at`) VALUES(?,?,NOW())"
        );
        assert_eq!(
            stmt.binds,
            vec![BindValue::String("a@b.com".to_string()), BindValue::Int32(20)]
        );
    }

    #[test]
    fn test_build_insert_empty() {
        let err = QueryBuilder::new()
            .table("users")
            .build_insert(Vec::<(String, BindValue)>::new())
            .unwrap_err();
        assert!(matches!(err, SqlxFluentError::EmptyPayload(_)));
    }

    #[test]
    fn test_build_insert_without_table() {
        let err = QueryBuilder::new()
            .build_insert(vec![("a", 1)])
            .unwrap_err();
        assert!(matches!(err, SqlxFluentError::Configuration(_)));
    }

    #[test]
    fn test_build_update_binds_set_before_where() {
        let stmt = QueryBuilder::new()
            .table("users")
            .where_eq("id", 7)
            .build_update(values! {
                "email" => "x@y.com",
                "login_count" => Raw::new("`login_count` + ?", 1),
            })
            .unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE `users` SET `email`=?,`login_count`=`login_count` + ? WHERE `id` = ?"
        );
        assert_eq!(
            stmt.binds,
            vec![
                BindValue::String("x@y.com".to_string()),
                BindValue::Int32(1),
                BindValue::Int32(7)
            ]
        );
    }

    #[test]
    fn test_build_update_empty() {
        let err = QueryBuilder::new()
            .table("users")
            .build_update(Vec::<(&str, i32)>::new())
            .unwrap_err();
        assert!(matches!(err, SqlxFluentError::EmptyPayload(_)));
    }

    #[test]
    fn test_build_delete() {
        let stmt = QueryBuilder::new()
            .table("users")
            .where_in("id", vec![1, 2])
            .build_delete()
            .unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `users` WHERE `id` IN (?,?)");
        assert_eq!(stmt.binds, ints(&[1, 2]));

        let stmt = QueryBuilder::new().table("logs").build_delete().unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `logs`");
    }

    #[test]
    fn test_build_delete_without_table() {
        let err = QueryBuilder::new().build_delete().unwrap_err();
        assert!(matches!(err, SqlxFluentError::Configuration(_)));
    }

    // ========== 聚合测试 ==========
    #[test]
    fn test_aggregate_query() {
        let (builder, key) = users()
            .select("id")
            .where_eq("status", 1)
            .limit(20)
            .offset(40)
            .aggregate("COUNT", "*");
        assert_eq!(key, "COUNT(*)");
        assert_eq!(
            builder.to_sql().unwrap(),
            "SELECT COUNT(*) FROM `users` WHERE `status` = ? LIMIT 1"
        );

        let (_, key) = users().aggregate("MAX", "age");
        assert_eq!(key, "MAX(`age`)");
    }
}
