use std::sync::Arc;

use serde_json::json;
use sqlxfluent::{
    values, DbPool, Direction, Executor, Filter, FromRecord, QueryBuilder, QueryHistory, Raw,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, FromRecord)]
struct User {
    id: i64,
    username: String,
    email: Option<String>,
    #[record(default)]
    score: i64,
}

fn users() -> QueryBuilder {
    QueryBuilder::new().table("user")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // RUST_LOG=sqlxfluent::sql=debug 可以看到每条执行的 SQL
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:sqlxfluent_demo.db?mode=rwc".to_string());

    println!("Connecting to SQLite database...");
    let history = Arc::new(QueryHistory::new());
    let mut pool = DbPool::connect(&database_url)
        .await?
        .with_observer(history.clone());
    println!("Connected successfully!\n");

    pool.execute("DROP TABLE IF EXISTS user", &[]).await?;
    pool.execute(
        "CREATE TABLE user (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT,
            score INTEGER,
            is_del INTEGER NOT NULL DEFAULT 0
        )",
        &[],
    )
    .await?;

    // ========== 1. INSERT (插入) ==========
    println!("=== 1. INSERT (插入新记录) ===");
    let mut ids = Vec::new();
    for (name, score) in [("alice", 90), ("bob", 72), ("carol", 85), ("dave", 60)] {
        let id = users()
            .insert(
                &mut pool,
                values! {
                    "username" => name,
                    "email" => format!("{}@example.com", name),
                    "score" => score,
                },
            )
            .await?;
        println!("插入成功，ID: {}", id);
        ids.push(id);
    }
    println!();

    // ========== 2. FIND (根据 ID 查找) ==========
    println!("=== 2. FIND (根据 ID 查找) ===");
    let found: Option<User> = users().find_as(&mut pool, ids[0] as i64).await?;
    println!("找到用户: {:?}\n", found);

    // ========== 3. WHERE (条件组合) ==========
    println!("=== 3. WHERE (条件组合) ===");
    let builder = users()
        .select(vec!["id", "username", "score"])
        .where_eq("is_del", 0)
        .try_where_group(|g| Ok(g.where_op("score", ">=", 80)?.or_where_like("username", "d%")))?
        .order_by("score", Direction::Desc);
    println!("SQL: {}", builder.to_sql()?);
    println!("参数: {:?}", builder.binds()?);
    for row in builder.get(&mut pool).await? {
        println!("  {}", serde_json::Value::Object(row));
    }
    println!();

    // ========== 4. AGGREGATE (聚合) ==========
    println!("=== 4. AGGREGATE (聚合) ===");
    println!("总数: {}", users().count(&mut pool, "*").await?);
    println!("最高分: {}", users().max(&mut pool, "score").await?);
    println!("平均分: {}\n", users().avg(&mut pool, "score").await?);

    // ========== 5. UPDATE (更新) ==========
    println!("=== 5. UPDATE (更新) ===");
    let affected = users()
        .where_in("id", vec![ids[1] as i64, ids[3] as i64])
        .update(&mut pool, values! {"score" => Raw::new("`score` + ?", 10)})
        .await?;
    println!("更新了 {} 行\n", affected);

    // ========== 6. LISTS (键值列表) ==========
    println!("=== 6. LISTS (键值列表) ===");
    let names = users().lists(&mut pool, "id", Some("username")).await?;
    println!("{}\n", json!(names));

    // ========== 7. CHUNK (分批处理) ==========
    println!("=== 7. CHUNK (分批处理) ===");
    users()
        .order_by("id", Direction::Asc)
        .chunk(&mut pool, 3, |rows| {
            println!("  本批 {} 行", rows.len());
            Ok(())
        })
        .await?;
    println!();

    // ========== 8. TRANSACTION (事务) ==========
    println!("=== 8. TRANSACTION (事务) ===");
    let id = sqlxfluent::transaction!(pool, |tx| async move {
        let id = users()
            .insert(tx, values! {"username" => "erin", "score" => 77})
            .await?;
        users()
            .where_eq("username", "alice")
            .update(tx, values! {"is_del" => 1})
            .await?;
        Ok::<_, sqlxfluent::SqlxFluentError>(id)
    })
    .await?;
    println!("事务提交成功，新 ID: {}\n", id);

    // ========== 9. DELETE (删除) ==========
    println!("=== 9. DELETE (删除) ===");
    let deleted = users().where_eq("is_del", 1).delete(&mut pool).await?;
    println!("删除了 {} 行\n", deleted);

    // ========== 10. FIRST (记录映射) ==========
    println!("=== 10. FIRST (记录映射) ===");
    let top: Option<User> = users()
        .order_by("score", Direction::Desc)
        .first_as(&mut pool)
        .await?;
    if let Some(user) = top {
        println!(
            "最高分用户: ID={}, username={}, email={:?}, score={}\n",
            user.id, user.username, user.email, user.score
        );
    }

    println!("共执行 {} 条语句", history.len());
    pool.close().await;
    Ok(())
}
