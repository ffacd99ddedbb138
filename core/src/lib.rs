//! 链式、参数化的 MySQL 方言查询构建器，基于 sqlx 执行
//!
//! ```ignore
//! use sqlxfluent::{DbPool, Direction, Filter, QueryBuilder};
//!
//! let mut pool = DbPool::connect("mysql://root@localhost/app").await?;
//! let users = QueryBuilder::new()
//!     .from("users")
//!     .select(vec!["id", "email"])
//!     .where_eq("status", 1)
//!     .try_where_group(|g| g.where_null("deleted_at").or_where_op("deleted_at", ">", "2024-01-01"))?
//!     .order_by("id", Direction::Desc)
//!     .limit(10)
//!     .get(&mut pool)
//!     .await?;
//! ```

// 让 derive 宏生成的 `sqlxfluent::...` 路径在本 crate 内也能解析
extern crate self as sqlxfluent;

pub mod bind_value;
pub mod config;
pub mod crud;
pub mod db_pool;
pub mod error;
pub mod executor;
pub mod flatten;
pub mod identifier;
pub mod observer;
pub mod operator;
pub mod predicate;
pub mod query_builder;
pub mod raw;
pub mod renderer;
pub mod row;
pub mod traits;
pub mod transaction;
pub mod utils;

pub use bind_value::{Assignment, BindValue};
pub use config::DbConfig;
pub use db_pool::{DbDriver, DbPool};
pub use error::{Result, SqlxFluentError};
pub use executor::{ExecResult, Executor};
pub use flatten::{flatten, Arg};
pub use identifier::{quote_identifier, ColumnRef};
pub use observer::{QueryHistory, QueryObserver, QueryRecord};
pub use operator::{Combinator, Direction, JoinKind, Operator};
pub use predicate::{Conditions, Filter, Predicate};
pub use query_builder::QueryBuilder;
pub use raw::Raw;
pub use renderer::Statement;
pub use row::Row;
pub use traits::{deserialize_record, FromRecord};
pub use transaction::Transaction;

// 重新导出 derive 宏
pub use sqlxfluent_derive::FromRecord;
