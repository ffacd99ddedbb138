use chrono::Utc;
use serde_json::json;
use sqlxfluent::{values, DbConfig, DbPool, Direction, Executor, Filter, QueryBuilder, Raw};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sqlxfluent=debug")),
        )
        .init();

    // DATABASE_URL 或 DB_HOST / DB_PORT / DB_DATABASE / DB_USERNAME / DB_PASSWORD
    let config = DbConfig::from_env()?;

    println!("Connecting to MySQL database...");
    let mut pool = DbPool::connect_with(&config).await?;
    println!("Connected successfully!\n");

    pool.execute("DROP TABLE IF EXISTS `order_item`", &[]).await?;
    pool.execute("DROP TABLE IF EXISTS `customer`", &[]).await?;
    pool.execute(
        "CREATE TABLE `customer` (
            `id` BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            `name` VARCHAR(64) NOT NULL,
            `level` TINYINT NOT NULL DEFAULT 1,
            `profile` JSON NULL,
            `created_at` DATETIME NULL,
            `deleted_at` DATETIME NULL
        )",
        &[],
    )
    .await?;
    pool.execute(
        "CREATE TABLE `order_item` (
            `id` BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            `customer_id` BIGINT UNSIGNED NOT NULL,
            `amount` DECIMAL(10, 2) NOT NULL
        )",
        &[],
    )
    .await?;

    // ========== 1. INSERT (插入) ==========
    println!("=== 1. INSERT (插入新记录) ===");
    let customers = QueryBuilder::new().table("customer");
    let mut ids = Vec::new();
    for (name, level) in [("alice", 3), ("bob", 1), ("carol", 2)] {
        let id = customers
            .insert(
                &mut pool,
                values! {
                    "name" => name,
                    "level" => level,
                    "profile" => json!({"tags": [name]}),
                    "created_at" => Utc::now(),
                },
            )
            .await?;
        ids.push(id);
    }
    println!("插入成功，ID: {:?}\n", ids);

    let orders = QueryBuilder::new().table("order_item");
    for (index, amount) in [12.5, 30.0, 7.25, 99.9].into_iter().enumerate() {
        let customer_id = ids[index % 2] as i64;
        orders
            .insert(&mut pool, values! {"customer_id" => customer_id, "amount" => amount})
            .await?;
    }

    let fields = customers.scheme(&mut pool, false).await?;
    println!("customer 表字段: {}\n", serde_json::Value::Array(fields));

    // ========== 2. JOIN + GROUP BY + HAVING ==========
    println!("=== 2. JOIN + GROUP BY + HAVING ===");
    let report = QueryBuilder::new()
        .from("customer")
        .select(vec!["customer.id", "customer.name"])
        .select_raw("SUM(`order_item`.`amount`) AS total")
        .left_join("order_item", "order_item.customer_id", "=", "customer.id")?
        .where_null("customer.deleted_at")
        .group_by(vec!["customer.id", "customer.name"])
        .having_op(Raw::sql("SUM(`order_item`.`amount`)"), ">", 20)?
        .order_by("total", Direction::Desc);
    println!("SQL: {}", report.to_sql()?);
    for row in report.get(&mut pool).await? {
        println!("  {}", serde_json::Value::Object(row));
    }
    println!();

    // ========== 3. 动态条件 ==========
    println!("=== 3. 动态条件 (whereLevel / orWhereName) ===");
    let builder = customers
        .clone()
        .where_by("whereLevel", 3)?
        .where_by("orWhereName", "bob")?
        .where_not_empty("name");
    println!("SQL: {}", builder.to_sql()?);
    println!("结果: {} 行\n", builder.get(&mut pool).await?.len());

    // ========== 4. 分页 ==========
    println!("=== 4. 分页 (LIMIT offset,n) ===");
    let page = customers.clone().order_by("id", Direction::Asc).limit(2).offset(1);
    println!("SQL: {}", page.to_sql()?);
    for row in page.get(&mut pool).await? {
        println!("  {}", serde_json::Value::Object(row));
    }
    println!();

    // ========== 5. 聚合 ==========
    println!("=== 5. 聚合 ===");
    println!("订单数: {}", orders.count(&mut pool, "*").await?);
    println!("总金额: {}", orders.sum(&mut pool, "amount").await?);
    println!("最高等级: {}\n", customers.max(&mut pool, "level").await?);

    // ========== 6. 软删除 + 事务 ==========
    println!("=== 6. 软删除 + 事务 ===");
    let target = ids[1] as i64;
    let (updated, removed) = sqlxfluent::transaction!(pool, |tx| async move {
        let updated = QueryBuilder::new()
            .table("customer")
            .where_eq("id", target)
            .update(tx, values! {"deleted_at" => Raw::sql("NOW()")})
            .await?;
        let removed = QueryBuilder::new()
            .table("order_item")
            .where_eq("customer_id", target)
            .delete(tx)
            .await?;
        Ok::<_, sqlxfluent::SqlxFluentError>((updated, removed))
    })
    .await?;
    println!("软删除 {} 个客户，删除 {} 条订单\n", updated, removed);

    // ========== 7. 逐行遍历 ==========
    println!("=== 7. EACH (逐行遍历) ===");
    customers
        .clone()
        .where_null("deleted_at")
        .order_by("id", Direction::Asc)
        .each(&mut pool, 2, |row, index| {
            println!("  #{} {}", index, row["name"]);
            Ok(())
        })
        .await?;

    pool.close().await;
    Ok(())
}
