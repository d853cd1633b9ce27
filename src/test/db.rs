//! `PostgreSQL` test databases.
//!
//! One container is started per test binary and shared; every [`TestDb`] gets
//! its own database inside it with migrations applied, dropped again when the
//! `TestDb` goes away.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};

const USER: &str = "urna_test";
const PASSWORD: &str = "urna_test_password";

static POSTGRES_CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> =
    Lazy::new(OnceCell::new);

static CLEANUP_SENDER: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

/// Database names are interpolated into DDL, so only plain identifiers pass.
fn validate_database_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 63 {
        return Err("database name must be 1-63 characters long".to_string());
    }

    if !name
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
    {
        return Err("database name must start with a letter or underscore".to_string());
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("database name can only contain letters, digits and underscores".to_string());
    }

    Ok(())
}

async fn init_postgres_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(USER)
        .with_password(PASSWORD)
        .with_db_name("urna_test")
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("failed to start PostgreSQL container")
}

async fn base_url() -> Option<String> {
    let container = POSTGRES_CONTAINER.get()?;
    let port = container.get_host_port_ipv4(5432).await.ok()?;

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    Some(format!("postgresql://{USER}:{PASSWORD}@{host}:{port}"))
}

async fn init_cleanup_task() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(name) = receiver.recv().await {
            if let Err(error) = drop_database(&name).await {
                tracing::warn!(database = %name, error = %error, "failed to drop test database");
            }
        }
    });

    sender
}

async fn drop_database(name: &str) -> Result<(), sqlx::Error> {
    let Some(base) = base_url().await else {
        return Ok(());
    };

    if validate_database_name(name).is_err() {
        return Ok(());
    }

    let mut conn = PgConnection::connect(&format!("{base}/postgres")).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// An isolated, migrated database in the shared container.
#[derive(Debug, Clone)]
pub(crate) struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = CLEANUP_SENDER.get() {
            let _sent = sender.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub(crate) async fn new() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before unix epoch")
            .as_nanos();

        let thread_id = std::thread::current().id();

        let name = format!("urna_test_{nanos}_{thread_id:?}").replace([':', ' ', '(', ')'], "");

        Self::with_name(&name).await
    }

    async fn with_name(name: &str) -> Self {
        CLEANUP_SENDER.get_or_init(init_cleanup_task).await;

        if let Err(error) = validate_database_name(name) {
            panic!("invalid database name '{name}': {error}");
        }

        POSTGRES_CONTAINER
            .get_or_init(init_postgres_container)
            .await;

        let base = base_url().await.expect("container port not mapped");

        let mut conn = PgConnection::connect(&format!("{base}/postgres"))
            .await
            .expect("failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut conn)
            .await
            .expect("failed to create test database");

        conn.close().await.expect("failed to close connection");

        let pool = PgPool::connect(&format!("{base}/{name}"))
            .await
            .expect("failed to connect to test database");

        crate::database::migrate(&pool)
            .await
            .expect("failed to run migrations");

        Self {
            pool,
            name: name.to_string(),
        }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_are_valid_names() {
        assert!(validate_database_name("urna_test_1").is_ok());
        assert!(validate_database_name("_leading_underscore").is_ok());
    }

    #[test]
    fn names_that_could_escape_the_identifier_are_rejected() {
        assert!(validate_database_name("").is_err());
        assert!(validate_database_name(&"a".repeat(64)).is_err());
        assert!(validate_database_name("1starts_with_digit").is_err());
        assert!(validate_database_name("has\"quote").is_err());
        assert!(validate_database_name("has space").is_err());
    }

    #[tokio::test]
    async fn migrated_database_accepts_queries() {
        let db = TestDb::new().await;

        let elections: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM elections")
            .fetch_one(db.pool())
            .await
            .expect("failed to count elections");

        assert_eq!(elections, 0);
    }
}
