//! Full-replace snapshot storage (settings, products, sales)

use shared::error::{AppError, ErrorCode};
use shared::{PaymentMethod, Product, Sale, SaleItem, SnapshotPatch, TenantSnapshot};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::db::tenants;
use crate::error::{ServiceError, ServiceResult, is_unique_violation};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: f64,
    image: String,
    category: String,
    stock: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.price,
            image: row.image,
            category: row.category,
            stock: row.stock,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SaleRow {
    id: String,
    items: String,
    total: f64,
    payment_method: String,
    timestamp: i64,
    buyer_name: Option<String>,
    buyer_phone: Option<String>,
}

impl TryFrom<SaleRow> for Sale {
    type Error = ServiceError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        let items: Vec<SaleItem> = serde_json::from_str(&row.items)?;
        let payment_method: PaymentMethod =
            serde_json::from_value(serde_json::Value::String(row.payment_method))?;
        Ok(Sale {
            id: row.id,
            items,
            total: row.total,
            payment_method,
            timestamp: row.timestamp,
            buyer_name: row.buyer_name,
            buyer_phone: row.buyer_phone,
        })
    }
}

fn payment_method_db(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Money => "money",
        PaymentMethod::Pix => "pix",
        PaymentMethod::Card => "card",
    }
}

/// Current server-side state for one tenant
pub async fn load(pool: &SqlitePool, tenant_id: &str) -> ServiceResult<TenantSnapshot> {
    let tenant = tenants::get(pool, tenant_id).await?;

    let products: Vec<ProductRow> = sqlx::query_as(
        "SELECT id, name, price, image, category, stock FROM products
         WHERE tenant_id = ? ORDER BY position",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    let sales: Vec<SaleRow> = sqlx::query_as(
        "SELECT id, items, total, payment_method, timestamp, buyer_name, buyer_phone FROM sales
         WHERE tenant_id = ? ORDER BY position",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    Ok(TenantSnapshot {
        settings: tenant.settings(),
        products: products.into_iter().map(Product::from).collect(),
        sales: sales
            .into_iter()
            .map(Sale::try_from)
            .collect::<ServiceResult<Vec<_>>>()?,
    })
}

/// Apply a push in one transaction.
///
/// Each supplied collection is deleted and re-inserted wholesale; supplied
/// settings overwrite the tenant's branding fields. Any failure rolls the
/// whole push back, so products and sales are never left half replaced.
pub async fn apply(pool: &SqlitePool, tenant_id: &str, patch: &SnapshotPatch) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    match write_patch(&mut tx, tenant_id, patch).await {
        Ok(()) => {
            tx.commit().await?;
            Ok(())
        }
        Err(e) => {
            tx.rollback().await?;
            Err(e)
        }
    }
}

async fn write_patch(
    tx: &mut Transaction<'_, Sqlite>,
    tenant_id: &str,
    patch: &SnapshotPatch,
) -> ServiceResult<()> {
    if let Some(settings) = &patch.settings {
        let result = sqlx::query(
            "UPDATE tenants SET shop_name = ?, shop_logo = ?, pix_key = ? WHERE id = ?",
        )
        .bind(&settings.shop_name)
        .bind(settings.shop_logo.as_deref())
        .bind(settings.pix_key.as_deref())
        .bind(tenant_id)
        .execute(&mut **tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::new(ErrorCode::TenantNotFound).into());
        }
    }

    if let Some(products) = &patch.products {
        sqlx::query("DELETE FROM products WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(&mut **tx)
            .await?;

        for (position, product) in products.iter().enumerate() {
            sqlx::query(
                "INSERT INTO products (tenant_id, id, position, name, price, image, category, stock)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(tenant_id)
            .bind(&product.id)
            .bind(position as i64)
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.image)
            .bind(&product.category)
            .bind(product.stock)
            .execute(&mut **tx)
            .await
            .map_err(|e| duplicate_id(e, "product", &product.id))?;
        }
    }

    if let Some(sales) = &patch.sales {
        sqlx::query("DELETE FROM sales WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(&mut **tx)
            .await?;

        for (position, sale) in sales.iter().enumerate() {
            let items = serde_json::to_string(&sale.items)?;
            sqlx::query(
                "INSERT INTO sales (tenant_id, id, position, items, total, payment_method, timestamp, buyer_name, buyer_phone)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(tenant_id)
            .bind(&sale.id)
            .bind(position as i64)
            .bind(items)
            .bind(sale.total)
            .bind(payment_method_db(sale.payment_method))
            .bind(sale.timestamp)
            .bind(sale.buyer_name.as_deref())
            .bind(sale.buyer_phone.as_deref())
            .execute(&mut **tx)
            .await
            .map_err(|e| duplicate_id(e, "sale", &sale.id))?;
        }
    }

    Ok(())
}

fn duplicate_id(e: sqlx::Error, kind: &str, id: &str) -> ServiceError {
    if is_unique_violation(&e) {
        AppError::with_message(ErrorCode::SnapshotInvalid, format!("duplicate {kind} id"))
            .with_detail("id", id)
            .into()
    } else {
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use shared::Settings;

    async fn seed_tenant(pool: &SqlitePool) -> String {
        tenants::create(
            pool,
            &tenants::NewTenant {
                login_key: "11988887777",
                shop_name: "Quitanda",
                hashed_password: "hash",
                trial_ends_at: 0,
                now: 0,
            },
        )
        .await
        .unwrap()
        .id
    }

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.into(),
            name: format!("Produto {id}"),
            price: 4.5,
            image: String::new(),
            category: "Geral".into(),
            stock,
        }
    }

    fn sale(id: &str) -> Sale {
        Sale {
            id: id.into(),
            items: vec![SaleItem {
                product_id: "a".into(),
                name: "Produto a".into(),
                price: 4.5,
                quantity: 2,
            }],
            total: 9.0,
            payment_method: PaymentMethod::Pix,
            timestamp: 1_700_000_000_000,
            buyer_name: None,
            buyer_phone: Some("11977776666".into()),
        }
    }

    fn snapshot() -> TenantSnapshot {
        TenantSnapshot {
            settings: Settings {
                shop_name: "Quitanda da Ana".into(),
                shop_logo: Some("data:image/png;base64,AAAA".into()),
                pix_key: Some("ana@pix".into()),
            },
            products: vec![product("b", 3), product("a", 10)],
            sales: vec![sale("s1"), sale("s2")],
        }
    }

    #[tokio::test]
    async fn test_fetch_after_push_returns_pushed_snapshot() {
        let pool = test_pool().await;
        let tenant_id = seed_tenant(&pool).await;
        let pushed = snapshot();

        apply(&pool, &tenant_id, &pushed.clone().into()).await.unwrap();

        assert_eq!(load(&pool, &tenant_id).await.unwrap(), pushed);
    }

    #[tokio::test]
    async fn test_pushing_twice_equals_pushing_once() {
        let pool = test_pool().await;
        let tenant_id = seed_tenant(&pool).await;
        let patch: SnapshotPatch = snapshot().into();

        apply(&pool, &tenant_id, &patch).await.unwrap();
        let once = load(&pool, &tenant_id).await.unwrap();
        apply(&pool, &tenant_id, &patch).await.unwrap();
        let twice = load(&pool, &tenant_id).await.unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_push_replaces_rather_than_merges() {
        let pool = test_pool().await;
        let tenant_id = seed_tenant(&pool).await;
        apply(&pool, &tenant_id, &snapshot().into()).await.unwrap();

        let patch = SnapshotPatch {
            products: Some(vec![product("c", 1)]),
            ..Default::default()
        };
        apply(&pool, &tenant_id, &patch).await.unwrap();

        let after = load(&pool, &tenant_id).await.unwrap();
        assert_eq!(after.products, vec![product("c", 1)]);
        // Omitted parts untouched
        assert_eq!(after.sales.len(), 2);
        assert_eq!(after.settings.shop_name, "Quitanda da Ana");
    }

    #[tokio::test]
    async fn test_failure_after_product_delete_rolls_back() {
        let pool = test_pool().await;
        let tenant_id = seed_tenant(&pool).await;
        let before = snapshot();
        apply(&pool, &tenant_id, &before.clone().into()).await.unwrap();

        // Second insert of "x" fails after the old products were deleted
        let broken = SnapshotPatch {
            products: Some(vec![product("x", 1), product("x", 2)]),
            sales: Some(vec![]),
            settings: None,
        };
        let err = apply(&pool, &tenant_id, &broken).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::SnapshotInvalid));

        assert_eq!(load(&pool, &tenant_id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_failure_in_sales_rolls_back_products_too() {
        let pool = test_pool().await;
        let tenant_id = seed_tenant(&pool).await;
        let before = snapshot();
        apply(&pool, &tenant_id, &before.clone().into()).await.unwrap();

        let broken = SnapshotPatch {
            settings: Some(Settings {
                shop_name: "Renamed".into(),
                ..Default::default()
            }),
            products: Some(vec![product("z", 99)]),
            sales: Some(vec![sale("dup"), sale("dup")]),
        };
        assert!(apply(&pool, &tenant_id, &broken).await.is_err());

        assert_eq!(load(&pool, &tenant_id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_same_ids_across_tenants_do_not_clash() {
        let pool = test_pool().await;
        let first = seed_tenant(&pool).await;
        let second = tenants::create(
            &pool,
            &tenants::NewTenant {
                login_key: "2",
                shop_name: "Outra",
                hashed_password: "hash",
                trial_ends_at: 0,
                now: 0,
            },
        )
        .await
        .unwrap()
        .id;

        apply(&pool, &first, &snapshot().into()).await.unwrap();
        apply(&pool, &second, &snapshot().into()).await.unwrap();

        let empty = SnapshotPatch {
            products: Some(vec![]),
            ..Default::default()
        };
        apply(&pool, &second, &empty).await.unwrap();

        assert_eq!(load(&pool, &first).await.unwrap().products.len(), 2);
        assert!(load(&pool, &second).await.unwrap().products.is_empty());
    }

    #[tokio::test]
    async fn test_load_unknown_tenant() {
        let pool = test_pool().await;
        let err = load(&pool, "ghost").await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TenantNotFound));
    }
}
