//! Application state

use std::sync::Arc;
use std::time::Instant;

use tenant_core::tenant::{
    demo_tenants, JsonFileBackend, MemoryBackend, SeededBackend, TenantBackend, TenantStore,
};

use crate::config::{ServerConfig, StorageMode};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    tenant_store: TenantStore,
    started_at: Instant,
}

impl AppState {
    /// Build the tenant store described by the configuration
    pub async fn new(config: &ServerConfig) -> tenant_core::Result<Self> {
        let backend: Arc<dyn TenantBackend> = match config.storage {
            StorageMode::File => Arc::new(JsonFileBackend::new(config.tenants_path())),
            StorageMode::Memory => Arc::new(MemoryBackend::new()),
        };
        let backend: Arc<dyn TenantBackend> = if config.seed_demo {
            Arc::new(SeededBackend::new(backend, demo_tenants()))
        } else {
            backend
        };

        let tenant_store = TenantStore::open(backend)
            .await?
            .with_save_timeout(config.save_timeout);
        Ok(Self::with_store(tenant_store))
    }

    /// Wrap an already opened store
    pub fn with_store(tenant_store: TenantStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                tenant_store,
                started_at: Instant::now(),
            }),
        }
    }

    /// Get reference to the tenant store
    pub fn tenant_store(&self) -> &TenantStore {
        &self.inner.tenant_store
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> f64 {
        self.inner.started_at.elapsed().as_secs_f64()
    }
}
