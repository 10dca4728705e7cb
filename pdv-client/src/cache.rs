//! redb-based local cache for tenant snapshots

use redb::{Database, ReadableDatabase, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::TenantSnapshot;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Cache table: key = (tenant_id, key), value = JSON
const CACHE_TABLE: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("tenant_cache");

/// Per-tenant cache entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Sales,
    Settings,
}

impl CacheKey {
    pub const ALL: [CacheKey; 3] = [CacheKey::Products, CacheKey::Sales, CacheKey::Settings];

    pub fn as_str(self) -> &'static str {
        match self {
            CacheKey::Products => "products",
            CacheKey::Sales => "sales",
            CacheKey::Settings => "settings",
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Tenant-scoped key-value store behind the sync engine
pub trait LocalCache: Send + Sync {
    /// Raw JSON stored under `(tenant_id, key)`
    fn read(&self, tenant_id: &str, key: CacheKey) -> CacheResult<Option<Vec<u8>>>;

    /// Write all entries in one transaction
    fn write(&self, tenant_id: &str, entries: &[(CacheKey, Vec<u8>)]) -> CacheResult<()>;

    /// Drop every entry of one tenant
    fn clear(&self, tenant_id: &str) -> CacheResult<()>;
}

fn decode<T: DeserializeOwned>(bytes: Option<Vec<u8>>) -> CacheResult<Option<T>> {
    bytes
        .map(|b| serde_json::from_slice(&b))
        .transpose()
        .map_err(Into::into)
}

fn encode<T: Serialize>(value: &T) -> CacheResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

impl dyn LocalCache {
    /// Cached snapshot, or `None` if this tenant was never cached.
    /// Missing entries of a partially cached tenant come back empty.
    pub fn load_snapshot(&self, tenant_id: &str) -> CacheResult<Option<TenantSnapshot>> {
        let settings = decode(self.read(tenant_id, CacheKey::Settings)?)?;
        let products = decode(self.read(tenant_id, CacheKey::Products)?)?;
        let sales = decode(self.read(tenant_id, CacheKey::Sales)?)?;

        if settings.is_none() && products.is_none() && sales.is_none() {
            return Ok(None);
        }
        Ok(Some(TenantSnapshot {
            settings: settings.unwrap_or_default(),
            products: products.unwrap_or_default(),
            sales: sales.unwrap_or_default(),
        }))
    }

    /// Overwrite all three entries
    pub fn store_snapshot(&self, tenant_id: &str, snapshot: &TenantSnapshot) -> CacheResult<()> {
        self.write(
            tenant_id,
            &[
                (CacheKey::Settings, encode(&snapshot.settings)?),
                (CacheKey::Products, encode(&snapshot.products)?),
                (CacheKey::Sales, encode(&snapshot.sales)?),
            ],
        )
    }
}

/// redb-backed cache (file or in-memory)
#[derive(Clone)]
pub struct RedbCache {
    db: Arc<Database>,
}

impl RedbCache {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        Self::init(Database::create(path)?)
    }

    /// Open in-memory database
    pub fn open_in_memory() -> CacheResult<Self> {
        Self::init(
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?,
        )
    }

    fn init(db: Database) -> CacheResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CACHE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl LocalCache for RedbCache {
    fn read(&self, tenant_id: &str, key: CacheKey) -> CacheResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CACHE_TABLE)?;
        Ok(table
            .get((tenant_id, key.as_str()))?
            .map(|guard| guard.value().to_vec()))
    }

    fn write(&self, tenant_id: &str, entries: &[(CacheKey, Vec<u8>)]) -> CacheResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CACHE_TABLE)?;
            for (key, value) in entries {
                table.insert((tenant_id, key.as_str()), value.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn clear(&self, tenant_id: &str) -> CacheResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CACHE_TABLE)?;
            for key in CacheKey::ALL {
                table.remove((tenant_id, key.as_str()))?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}
