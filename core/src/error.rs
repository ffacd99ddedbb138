use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlxFluentError {
    /// 缺少表名、FROM 等必要的构建上下文
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// 操作符不在允许列表中
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),
    /// 参数个数不符合要求（BETWEEN 需要两个值，IN 需要值列表等）
    #[error("Invalid arity: {0}")]
    InvalidArity(String),
    /// INSERT / UPDATE 数据为空
    #[error("Empty payload: {0}")]
    EmptyPayload(String),
    #[error("Invalid order direction: {0}")]
    InvalidDirection(String),
    /// 动态条件方法名无法解析
    #[error("Call to undefined method: {0}")]
    UnknownMethod(String),
    #[error("Unsupported database URL: {0}")]
    UnsupportedDatabase(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("No connection pool available for driver")]
    NoPoolAvailable,
    /// 行数据映射到记录类型失败
    #[error("Record mapping error: {0}")]
    Record(String),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SqlxFluentError>;
