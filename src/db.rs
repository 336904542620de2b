use crate::error::AppError;
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig, PgPool};

// Embedded at compile time; applied in order and recorded in schema_migrations
const MIGRATIONS: &[(i32, &str, &str)] = &[
    (1, "create_identities", include_str!("../migrations/0001_create_identities.sql")),
    (2, "create_profiles", include_str!("../migrations/0002_create_profiles.sql")),
    (3, "create_interests", include_str!("../migrations/0003_create_interests.sql")),
    (4, "create_conversations", include_str!("../migrations/0004_create_conversations.sql")),
    (5, "create_messages", include_str!("../migrations/0005_create_messages.sql")),
    (6, "create_contact_submissions", include_str!("../migrations/0006_create_contact_submissions.sql")),
];

pub async fn init_pool(database_url: &str) -> Result<PgPool, AppError> {
    let mut cfg = DbPoolConfig::from_env("matchmate-service").unwrap_or_default();
    if cfg.database_url.is_empty() {
        cfg.service_name = "matchmate-service".to_string();
        cfg.database_url = database_url.to_string();
    }
    cfg.log_config();

    let pool = create_pg_pool(cfg)
        .await
        .map_err(|e| AppError::StartServer(format!("db: {e}")))?;
    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let mut client = pool.get().await?;

    client
        .batch_execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .await?;

    for (version, name, sql) in MIGRATIONS {
        let applied = client
            .query_opt(
                "SELECT version FROM schema_migrations WHERE version = $1",
                &[version],
            )
            .await?
            .is_some();
        if applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(sql).await?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES ($1, $2)",
            &[version, name],
        )
        .await?;
        tx.commit().await?;

        tracing::info!(migration = %version, name = %name, "migration applied");
    }

    Ok(())
}
