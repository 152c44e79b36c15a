//! Per-test PostgreSQL databases inside one shared container.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};
use uuid::Uuid;

const USER: &str = "coupons_test";
const PASSWORD: &str = "coupons_test_password";

/// Started on first use and shared by every test in the binary.
static CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

/// Databases queued for dropping once their `TestDb` goes away.
static DROP_QUEUE: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn start_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(USER)
        .with_password(PASSWORD)
        .with_db_name(USER)
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

async fn database_url(database: &str) -> String {
    let container = CONTAINER.get_or_init(start_container).await;

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{USER}:{PASSWORD}@{host}:{port}/{database}")
}

async fn start_drop_queue() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(name) = receiver.recv().await {
            if let Err(error) = drop_database(&name).await {
                eprintln!("Failed to drop test database '{name}': {error}");
            }
        }
    });

    sender
}

async fn drop_database(name: &str) -> Result<(), sqlx::Error> {
    if !is_generated_name(name) {
        return Ok(());
    }

    let mut conn = PgConnection::connect(&database_url("postgres").await).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS \"{name}\""))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// Names are only ever interpolated into DDL after passing this check.
fn is_generated_name(name: &str) -> bool {
    name.strip_prefix("coupons_test_db_")
        .is_some_and(|suffix| suffix.len() == 32 && suffix.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// An isolated, fully migrated database.
///
/// Services commit normally; isolation comes from every test owning its own
/// database, which is dropped in the background when this value is.
#[derive(Debug, Clone)]
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = DROP_QUEUE.get() {
            let _ = sender.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub async fn new() -> Self {
        DROP_QUEUE.get_or_init(start_drop_queue).await;

        let name = format!("coupons_test_db_{}", Uuid::now_v7().simple());

        let mut conn = PgConnection::connect(&database_url("postgres").await)
            .await
            .expect("Failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut conn)
            .await
            .expect("Failed to create test database");

        conn.close().await.expect("Failed to close admin connection");

        let pool = PgPool::connect(&database_url(&name).await)
            .await
            .expect("Failed to create pool for database");

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations on database");

        Self { pool, name }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_generated_names_are_dropped() {
        let generated = format!("coupons_test_db_{}", Uuid::now_v7().simple());

        assert!(is_generated_name(&generated));
        assert!(!is_generated_name("postgres"));
        assert!(!is_generated_name("coupons_test_db_\"; DROP TABLE coupons; --"));
        assert!(!is_generated_name("coupons_test_db_"));
    }

    #[tokio::test]
    async fn test_migrations_create_ledger_tables() {
        let test_db = TestDb::new().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name LIKE 'coupon%' ORDER BY 1 COLLATE \"C\"",
        )
        .fetch_all(test_db.pool())
        .await
        .expect("Failed to list tables");

        assert_eq!(tables, vec!["coupon_assets", "coupon_usages", "coupons"]);
    }

    #[tokio::test]
    async fn test_migrations_create_enum_types() {
        let test_db = TestDb::new().await;

        let types: Vec<String> = sqlx::query_scalar(
            "SELECT typname::text FROM pg_type WHERE typtype = 'e' ORDER BY 1 COLLATE \"C\"",
        )
        .fetch_all(test_db.pool())
        .await
        .expect("Failed to list enum types");

        assert_eq!(
            types,
            vec!["asset_kind", "coupon_kind", "coupon_usage_status", "discount_kind"]
        );
    }

    #[tokio::test]
    async fn test_databases_are_isolated() {
        let first = TestDb::new().await;
        let second = TestDb::new().await;

        sqlx::query("CREATE TABLE scratch (id INTEGER)")
            .execute(first.pool())
            .await
            .expect("Failed to create table");

        let seen = sqlx::query("SELECT COUNT(*) FROM scratch")
            .fetch_one(second.pool())
            .await;

        assert_ne!(first.name, second.name);
        assert!(seen.is_err(), "second database saw the first one's table");
    }
}
