use sqlx::PgPool;

/// Execute the schema DDL (CREATE TABLE / CREATE INDEX IF NOT EXISTS), so
/// running it against an already-migrated database is a no-op.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!("../../sql/schema.sql"))
        .execute(pool)
        .await?;
    tracing::info!("database schema up to date");
    Ok(())
}
