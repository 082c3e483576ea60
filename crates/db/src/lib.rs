//! SQLite pool factory and migration runner for libris.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use libris_kernel::settings::DatabaseSettings;
use libris_kernel::Migration;

/// Open a connection pool for the configured database.
///
/// Foreign keys are enforced on every connection and writers wait up to
/// `busy_timeout_ms` for the write lock. File databases run in WAL mode so
/// readers are not blocked by a writer. In-memory databases are pinned to one
/// connection that never idles out, otherwise the schema would vanish with
/// the first recycled connection.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let in_memory = settings.url.contains(":memory:") || settings.url.contains("mode=memory");

    let mut options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .foreign_keys(true)
        .busy_timeout(settings.busy_timeout());
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections.max(1))
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to '{}'", settings.url))?;

    tracing::info!(target: "libris-db", url = %settings.url, in_memory, "database pool ready");

    Ok(pool)
}

/// Apply every migration that has not been recorded yet.
///
/// Migrations run in the order given, each inside its own transaction
/// together with its bookkeeping row. Returns the number applied.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            module     TEXT NOT NULL,
            id         TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (module, id)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("failed to create migration bookkeeping table")?;

    let mut applied = 0;

    for (module, migration) in migrations {
        let already: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM _migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await
                .context("failed to read migration bookkeeping")?;

        if already.is_some() {
            tracing::debug!(
                target: "libris-db",
                %module,
                id = migration.id,
                "migration already applied"
            );
            continue;
        }

        let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;

        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .with_context(|| format!("failed to commit migration {}/{}", module, migration.id))?;

        tracing::info!(target: "libris-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrations() -> Vec<(String, Migration)> {
        vec![
            (
                "widgets".to_string(),
                Migration {
                    id: "001_init",
                    up: "CREATE TABLE widget (id INTEGER PRIMARY KEY, name TEXT NOT NULL);",
                },
            ),
            (
                "widgets".to_string(),
                Migration {
                    id: "002_seed",
                    up: "INSERT INTO widget (name) VALUES ('a');
                         INSERT INTO widget (name) VALUES ('b');",
                },
            ),
        ]
    }

    #[tokio::test]
    async fn migrations_apply_once() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();

        assert_eq!(run_migrations(&pool, &migrations()).await.unwrap(), 2);
        assert_eq!(run_migrations(&pool, &migrations()).await.unwrap(), 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM widget")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn failed_migration_is_not_recorded() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();
        let broken = vec![(
            "broken".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE oops (;",
            },
        )];

        let err = run_migrations(&pool, &broken).await.unwrap_err();
        assert!(err.to_string().contains("broken/001_init"));

        let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(recorded, 0);
    }

    #[tokio::test]
    async fn file_databases_use_wal() {
        let dir = tempfile::tempdir().unwrap();
        let settings = DatabaseSettings {
            url: format!("sqlite://{}?mode=rwc", dir.path().join("wal.db").display()),
            ..DatabaseSettings::default()
        };
        let pool = connect(&settings).await.unwrap();

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();
        sqlx::raw_sql(
            "CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER REFERENCES parent(id));",
        )
        .execute(&pool)
        .await
        .unwrap();

        let err = sqlx::query("INSERT INTO child (parent_id) VALUES (42)")
            .execute(&pool)
            .await
            .unwrap_err();
        let db_err = err.as_database_error().expect("database error");
        assert!(db_err.is_foreign_key_violation());
    }
}
