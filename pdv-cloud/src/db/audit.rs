//! Audit log operations

use sqlx::SqlitePool;

use crate::error::ServiceResult;

/// Write an audit log entry
pub async fn log(
    pool: &SqlitePool,
    tenant_id: &str,
    action: &str,
    detail: Option<&serde_json::Value>,
    ip_address: Option<&str>,
    now: i64,
) -> ServiceResult<()> {
    let detail = detail.map(serde_json::Value::to_string);
    sqlx::query(
        "INSERT INTO audit_logs (tenant_id, action, detail, ip_address, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(tenant_id)
    .bind(action)
    .bind(detail)
    .bind(ip_address)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Best-effort variant for handlers: a failed audit write never fails the request
pub async fn record(
    pool: &SqlitePool,
    tenant_id: &str,
    action: &str,
    detail: Option<serde_json::Value>,
    now: i64,
) {
    if let Err(e) = log(pool, tenant_id, action, detail.as_ref(), None, now).await {
        tracing::warn!(tenant_id, action, "Failed to write audit log: {e}");
    }
}

#[derive(sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: i64,
    pub action: String,
    pub detail: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: i64,
}

/// Audit entries for a tenant, newest first
pub async fn query(
    pool: &SqlitePool,
    tenant_id: &str,
    limit: i64,
    offset: i64,
) -> ServiceResult<Vec<AuditEntry>> {
    let rows: Vec<AuditEntry> = sqlx::query_as(
        "SELECT id, action, detail, ip_address, created_at FROM audit_logs
         WHERE tenant_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(tenant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
