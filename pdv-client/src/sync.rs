//! Local-first sync engine
//!
//! Every read is served from memory, backed by the local cache. Startup
//! tries the server first under a deadline and otherwise keeps whatever
//! the cache holds. Each mutation lands in the cache synchronously and
//! then spawns a push of the whole snapshot; push failures are logged
//! and dropped, the next push carries everything.
//!
//! Pushes are sent one at a time and each sends the newest pending
//! snapshot, so a slow older request can never land after a newer one.
//! A push that finds nothing pending returns at once: a newer push
//! already carried its state.
//!
//! Concurrent clients of the same tenant overwrite each other
//! (last writer wins).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::{PaymentMethod, Product, Sale, SaleItem, Settings, SnapshotPatch, TenantSnapshot};
use tokio::task::JoinHandle;

use crate::cache::LocalCache;
use crate::{ClientError, ClientResult, SyncConfig};

/// Server side of the sync protocol
#[async_trait]
pub trait SnapshotRemote: Send + Sync {
    async fn fetch(&self, tenant_id: &str) -> ClientResult<TenantSnapshot>;

    async fn push(&self, tenant_id: &str, patch: &SnapshotPatch) -> ClientResult<()>;
}

/// Background push spawned by a mutation; resolves once the server has been
/// sent this mutation's state or a newer one
pub type PushHandle = JoinHandle<()>;

/// Where the startup data came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupSource {
    /// Fresh server snapshot, now also in the cache
    Remote,
    /// Server unavailable; running on cached (possibly empty) data
    Cache { warning: String },
}

/// Sale input from the cart
#[derive(Debug, Clone)]
pub struct NewSale {
    pub items: Vec<SaleItem>,
    pub payment_method: PaymentMethod,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
}

pub struct SyncEngine {
    tenant_id: String,
    remote: Arc<dyn SnapshotRemote>,
    cache: Arc<dyn LocalCache>,
    state: Arc<Mutex<TenantSnapshot>>,
    /// Newest snapshot not yet taken by a push
    pending: Arc<Mutex<Option<TenantSnapshot>>>,
    /// Serializes pushes
    push_lock: Arc<tokio::sync::Mutex<()>>,
    fetch_timeout: Duration,
}

impl SyncEngine {
    pub fn new(
        tenant_id: impl Into<String>,
        remote: Arc<dyn SnapshotRemote>,
        cache: Arc<dyn LocalCache>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            remote,
            cache,
            state: Arc::new(Mutex::new(TenantSnapshot::default())),
            pending: Arc::new(Mutex::new(None)),
            push_lock: Arc::new(tokio::sync::Mutex::new(())),
            fetch_timeout: config.fetch_timeout,
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Load the tenant: server snapshot if it arrives in time, cache otherwise
    pub async fn start(&self) -> ClientResult<StartupSource> {
        let fetched = tokio::time::timeout(self.fetch_timeout, self.remote.fetch(&self.tenant_id))
            .await
            .unwrap_or(Err(ClientError::Timeout));

        match fetched {
            Ok(snapshot) => {
                self.cache.store_snapshot(&self.tenant_id, &snapshot)?;
                *self.state.lock() = snapshot;
                tracing::info!(tenant_id = %self.tenant_id, "Loaded snapshot from server");
                Ok(StartupSource::Remote)
            }
            Err(e) => {
                let cached = self.cache.load_snapshot(&self.tenant_id)?;
                let warning = match cached {
                    Some(_) => format!("Offline, using cached data: {e}"),
                    None => format!("Offline and nothing cached yet: {e}"),
                };
                *self.state.lock() = cached.unwrap_or_default();
                tracing::warn!(tenant_id = %self.tenant_id, error = %e, "Startup fetch failed, using local cache");
                Ok(StartupSource::Cache { warning })
            }
        }
    }

    // ========== Reads ==========

    pub fn snapshot(&self) -> TenantSnapshot {
        self.state.lock().clone()
    }

    pub fn products(&self) -> Vec<Product> {
        self.state.lock().products.clone()
    }

    pub fn sales(&self) -> Vec<Sale> {
        self.state.lock().sales.clone()
    }

    pub fn settings(&self) -> Settings {
        self.state.lock().settings.clone()
    }

    // ========== Mutations ==========
    //
    // Must be called inside a Tokio runtime (the push is spawned).

    /// Add a product; an empty id gets a fresh one
    pub fn add_product(&self, mut product: Product) -> ClientResult<(Product, PushHandle)> {
        if product.id.is_empty() {
            product.id = uuid::Uuid::new_v4().to_string();
        }
        self.mutate(|snapshot| {
            if snapshot.products.iter().any(|p| p.id == product.id) {
                return Err(ClientError::Validation(format!(
                    "Product {} already exists",
                    product.id
                )));
            }
            snapshot.products.push(product.clone());
            Ok(product)
        })
    }

    pub fn update_product(&self, product: Product) -> ClientResult<PushHandle> {
        self.mutate(|snapshot| {
            let slot = snapshot
                .products
                .iter_mut()
                .find(|p| p.id == product.id)
                .ok_or_else(|| ClientError::NotFound(format!("Product {}", product.id)))?;
            *slot = product;
            Ok(())
        })
        .map(|((), handle)| handle)
    }

    pub fn delete_product(&self, product_id: &str) -> ClientResult<PushHandle> {
        self.mutate(|snapshot| {
            let before = snapshot.products.len();
            snapshot.products.retain(|p| p.id != product_id);
            if snapshot.products.len() == before {
                return Err(ClientError::NotFound(format!("Product {product_id}")));
            }
            Ok(())
        })
        .map(|((), handle)| handle)
    }

    /// Record a sale and take its quantities out of stock
    pub fn record_sale(&self, sale: NewSale) -> ClientResult<(Sale, PushHandle)> {
        if sale.items.is_empty() {
            return Err(ClientError::Validation("Sale has no items".into()));
        }
        if let Some(item) = sale.items.iter().find(|i| i.quantity <= 0) {
            return Err(ClientError::Validation(format!(
                "Invalid quantity {} for {}",
                item.quantity, item.product_id
            )));
        }

        let recorded = Sale {
            id: uuid::Uuid::new_v4().to_string(),
            total: Sale::total_of(&sale.items),
            items: sale.items,
            payment_method: sale.payment_method,
            timestamp: shared::util::now_millis(),
            buyer_name: sale.buyer_name,
            buyer_phone: sale.buyer_phone,
        };

        self.mutate(|snapshot| {
            for item in &recorded.items {
                // Items of deleted products still sell
                if let Some(product) = snapshot.products.iter_mut().find(|p| p.id == item.product_id) {
                    product.take_stock(item.quantity);
                }
            }
            snapshot.sales.push(recorded.clone());
            Ok(recorded)
        })
    }

    pub fn update_settings(&self, settings: Settings) -> ClientResult<PushHandle> {
        self.mutate(|snapshot| {
            snapshot.settings = settings;
            Ok(())
        })
        .map(|((), handle)| handle)
    }

    /// Push the current snapshot and wait for the outcome
    pub async fn flush(&self) -> ClientResult<()> {
        let _guard = self.push_lock.lock().await;
        let snapshot = {
            let state = self.state.lock();
            *self.pending.lock() = None;
            state.clone()
        };
        self.remote
            .push(&self.tenant_id, &SnapshotPatch::from(snapshot))
            .await
    }

    /// Apply `f` to a copy of the state, persist it, publish it, then push.
    /// The lock is held across the cache write so mutations land in call order.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut TenantSnapshot) -> ClientResult<T>,
    ) -> ClientResult<(T, PushHandle)> {
        let out = {
            let mut state = self.state.lock();
            let mut next = state.clone();
            let out = f(&mut next)?;
            self.cache.store_snapshot(&self.tenant_id, &next)?;
            *self.pending.lock() = Some(next.clone());
            *state = next;
            out
        };
        Ok((out, self.spawn_push()))
    }

    fn spawn_push(&self) -> PushHandle {
        let remote = self.remote.clone();
        let tenant_id = self.tenant_id.clone();
        let pending = self.pending.clone();
        let push_lock = self.push_lock.clone();
        tokio::spawn(async move {
            let _guard = push_lock.lock().await;
            let next = pending.lock().take();
            let Some(snapshot) = next else {
                tracing::trace!(tenant_id = %tenant_id, "Newer push already carried this state");
                return;
            };
            let patch = SnapshotPatch::from(snapshot);
            match remote.push(&tenant_id, &patch).await {
                Ok(()) => tracing::debug!(tenant_id = %tenant_id, "Snapshot pushed"),
                Err(e) => {
                    tracing::warn!(tenant_id = %tenant_id, error = %e, "Snapshot push failed")
                }
            }
        })
    }
}
