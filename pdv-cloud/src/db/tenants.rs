//! Tenant Store

use shared::admin::{TenantSummary, TenantUpdate};
use shared::error::{AppError, ErrorCode};
use shared::session::TenantSession;
use shared::{BlockReason, Plan, Settings, TenantStatus};
use sqlx::SqlitePool;

use crate::error::{ServiceError, ServiceResult, is_unique_violation};

#[derive(sqlx::FromRow)]
struct TenantRow {
    id: String,
    login_key: String,
    shop_name: String,
    shop_logo: Option<String>,
    pix_key: Option<String>,
    hashed_password: String,
    plan: String,
    status: String,
    blocked_reason: Option<String>,
    trial_ends_at: i64,
    created_at: i64,
}

/// Tenant record as stored
#[derive(Debug, Clone, PartialEq)]
pub struct Tenant {
    pub id: String,
    pub login_key: String,
    pub shop_name: String,
    pub shop_logo: Option<String>,
    pub pix_key: Option<String>,
    pub hashed_password: String,
    pub plan: Plan,
    pub status: TenantStatus,
    pub blocked_reason: Option<BlockReason>,
    pub trial_ends_at: i64,
    pub created_at: i64,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = ServiceError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        let plan = Plan::from_db(&row.plan)
            .ok_or_else(|| ServiceError::Db(format!("unknown plan in db: {}", row.plan).into()))?;
        let status = TenantStatus::from_db(&row.status).ok_or_else(|| {
            ServiceError::Db(format!("unknown tenant status in db: {}", row.status).into())
        })?;
        Ok(Self {
            id: row.id,
            login_key: row.login_key,
            shop_name: row.shop_name,
            shop_logo: row.shop_logo,
            pix_key: row.pix_key,
            hashed_password: row.hashed_password,
            plan,
            status,
            blocked_reason: row.blocked_reason.as_deref().and_then(BlockReason::from_db),
            trial_ends_at: row.trial_ends_at,
            created_at: row.created_at,
        })
    }
}

impl Tenant {
    pub fn settings(&self) -> Settings {
        Settings {
            shop_name: self.shop_name.clone(),
            shop_logo: self.shop_logo.clone(),
            pix_key: self.pix_key.clone(),
        }
    }

    /// Stored block reason, falling back to an admin block for legacy rows
    pub fn block_reason(&self) -> BlockReason {
        self.blocked_reason.unwrap_or(BlockReason::AdminBlocked)
    }

    pub fn session(&self, is_impersonating: bool) -> TenantSession {
        TenantSession {
            id: self.id.clone(),
            login_key: self.login_key.clone(),
            shop_name: self.shop_name.clone(),
            shop_logo: self.shop_logo.clone(),
            pix_key: self.pix_key.clone(),
            plan: self.plan,
            status: self.status,
            blocked_reason: self.blocked_reason,
            trial_ends_at: self.trial_ends_at,
            created_at: self.created_at,
            is_impersonating,
        }
    }

    pub fn summary(&self) -> TenantSummary {
        TenantSummary {
            id: self.id.clone(),
            login_key: self.login_key.clone(),
            shop_name: self.shop_name.clone(),
            plan: self.plan,
            status: self.status,
            blocked_reason: self.blocked_reason,
            trial_ends_at: self.trial_ends_at,
            created_at: self.created_at,
        }
    }
}

/// Fields for a new tenant; the login key must already be normalized
pub struct NewTenant<'a> {
    pub login_key: &'a str,
    pub shop_name: &'a str,
    pub hashed_password: &'a str,
    pub trial_ends_at: i64,
    pub now: i64,
}

/// Insert a tenant in `trial` on the `starter` plan
pub async fn create(pool: &SqlitePool, new: &NewTenant<'_>) -> ServiceResult<Tenant> {
    if new.login_key.is_empty() {
        return Err(AppError::validation("Login key must contain digits")
            .with_detail("field", "loginKey")
            .into());
    }
    if find_by_login_key(pool, new.login_key).await?.is_some() {
        return Err(AppError::new(ErrorCode::DuplicateLoginKey).into());
    }

    let id = uuid::Uuid::new_v4().to_string();
    let result = sqlx::query(
        "INSERT INTO tenants (id, login_key, shop_name, hashed_password, plan, status, trial_ends_at, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(new.login_key)
    .bind(new.shop_name)
    .bind(new.hashed_password)
    .bind(Plan::Starter.as_db())
    .bind(TenantStatus::Trial.as_db())
    .bind(new.trial_ends_at)
    .bind(new.now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        // Lost a race with a concurrent signup for the same key
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::new(ErrorCode::DuplicateLoginKey).into());
        }
        Err(e) => return Err(e.into()),
    }

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| ServiceError::Db("tenant vanished after insert".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> ServiceResult<Option<Tenant>> {
    let row: Option<TenantRow> = sqlx::query_as("SELECT * FROM tenants WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Tenant::try_from).transpose()
}

/// Look up by normalized login key
pub async fn find_by_login_key(pool: &SqlitePool, login_key: &str) -> ServiceResult<Option<Tenant>> {
    let row: Option<TenantRow> = sqlx::query_as("SELECT * FROM tenants WHERE login_key = ?")
        .bind(login_key)
        .fetch_optional(pool)
        .await?;
    row.map(Tenant::try_from).transpose()
}

/// Like [`find_by_id`] but unknown ids are a `TenantNotFound` error
pub async fn get(pool: &SqlitePool, id: &str) -> ServiceResult<Tenant> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound).into())
}

/// `%term%` for LIKE, with the term's own wildcards escaped by `\`
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// All tenants, newest first; `search` matches shop name or login key
pub async fn list(pool: &SqlitePool, search: Option<&str>) -> ServiceResult<Vec<Tenant>> {
    let rows: Vec<TenantRow> = match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(q) => {
            let pattern = contains_pattern(&q.to_lowercase());
            sqlx::query_as(
                "SELECT * FROM tenants
                 WHERE lower(shop_name) LIKE ? ESCAPE '\\' OR login_key LIKE ? ESCAPE '\\'
                 ORDER BY created_at DESC",
            )
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM tenants ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?
        }
    };
    rows.into_iter().map(Tenant::try_from).collect()
}

/// Tenants the expiration sweep has to look at
pub async fn list_unblocked(pool: &SqlitePool) -> ServiceResult<Vec<Tenant>> {
    let rows: Vec<TenantRow> = sqlx::query_as(
        "SELECT * FROM tenants WHERE status IN ('trial', 'active') ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Tenant::try_from).collect()
}

/// PATCH semantics: only supplied fields change.
///
/// A supplied `status` also rewrites `blocked_reason`: `blocked` becomes an
/// admin block, anything else clears it.
pub async fn update(pool: &SqlitePool, id: &str, patch: &TenantUpdate) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE tenants SET
            shop_name = COALESCE(?, shop_name),
            shop_logo = COALESCE(?, shop_logo),
            pix_key = COALESCE(?, pix_key),
            plan = COALESCE(?, plan),
            trial_ends_at = COALESCE(?, trial_ends_at)
         WHERE id = ?",
    )
    .bind(patch.shop_name.as_deref())
    .bind(patch.shop_logo.as_deref())
    .bind(patch.pix_key.as_deref())
    .bind(patch.plan.map(|p| p.as_db()))
    .bind(patch.trial_ends_at)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::TenantNotFound).into());
    }

    if let Some(status) = patch.status {
        let reason = (status == TenantStatus::Blocked).then_some(BlockReason::AdminBlocked);
        sqlx::query("UPDATE tenants SET status = ?, blocked_reason = ? WHERE id = ?")
            .bind(status.as_db())
            .bind(reason.map(|r| r.as_db()))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Set `status = blocked` with the given reason
pub async fn set_blocked(pool: &SqlitePool, id: &str, reason: BlockReason) -> ServiceResult<()> {
    let result =
        sqlx::query("UPDATE tenants SET status = 'blocked', blocked_reason = ? WHERE id = ?")
            .bind(reason.as_db())
            .bind(id)
            .execute(pool)
            .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::TenantNotFound).into());
    }
    Ok(())
}

/// Block only while the stored status is still `expected`.
///
/// Returns `false` when the row changed or vanished since it was read.
pub async fn block_if_status(
    pool: &SqlitePool,
    id: &str,
    expected: TenantStatus,
    reason: BlockReason,
) -> ServiceResult<bool> {
    let result = sqlx::query(
        "UPDATE tenants SET status = 'blocked', blocked_reason = ?
         WHERE id = ? AND status = ?",
    )
    .bind(reason.as_db())
    .bind(id)
    .bind(expected.as_db())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Set `status = active` and clear any block reason
pub async fn set_active(pool: &SqlitePool, id: &str) -> ServiceResult<()> {
    let result =
        sqlx::query("UPDATE tenants SET status = 'active', blocked_reason = NULL WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::TenantNotFound).into());
    }
    Ok(())
}

/// Delete a tenant with its products, sales and subscription history
pub async fn delete(pool: &SqlitePool, id: &str) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM products WHERE tenant_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM sales WHERE tenant_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM subscriptions WHERE tenant_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM tenants WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        // Dropping the transaction rolls back
        return Err(AppError::new(ErrorCode::TenantNotFound).into());
    }

    tx.commit().await?;
    Ok(())
}
