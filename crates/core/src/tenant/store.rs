//! Tenant store
//!
//! The authoritative, ordered collection of tenants. All mutations are
//! serialized behind one write lock and committed to the backend before
//! they become visible.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::Error;
use crate::Result;

use super::backend::{MemoryBackend, TenantBackend};
use super::model::{
    subdomain_key, validate_name, validate_subdomain, CreateTenantRequest, Tenant,
    TenantOverview, UpdateTenantRequest,
};

/// Default deadline for a backend save
pub const DEFAULT_SAVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Thread-safe tenant store over a pluggable backend
#[derive(Clone)]
pub struct TenantStore {
    /// Tenants in insertion order
    tenants: Arc<RwLock<Vec<Tenant>>>,
    backend: Arc<dyn TenantBackend>,
    save_timeout: Duration,
}

impl TenantStore {
    /// Open a store, loading its initial state from the backend.
    ///
    /// Fails with [`Error::Storage`] if the loaded state breaks an invariant.
    pub async fn open(backend: Arc<dyn TenantBackend>) -> Result<Self> {
        let tenants = backend.load().await?;
        check_loaded(&tenants)?;
        debug!(count = tenants.len(), "Loaded tenants");

        Ok(Self {
            tenants: Arc::new(RwLock::new(tenants)),
            backend,
            save_timeout: DEFAULT_SAVE_TIMEOUT,
        })
    }

    /// Empty, volatile store
    pub fn in_memory() -> Self {
        Self {
            tenants: Arc::new(RwLock::new(Vec::new())),
            backend: Arc::new(MemoryBackend::new()),
            save_timeout: DEFAULT_SAVE_TIMEOUT,
        }
    }

    /// Set the deadline applied to each backend save
    pub fn with_save_timeout(mut self, timeout: Duration) -> Self {
        self.save_timeout = timeout;
        self
    }

    /// List all tenants in insertion order
    pub async fn list(&self) -> Vec<Tenant> {
        self.tenants.read().await.clone()
    }

    /// Get a tenant by ID
    pub async fn get(&self, id: Uuid) -> Result<Tenant> {
        let tenants = self.tenants.read().await;
        tenants
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Tenant {} not found", id)))
    }

    /// Get a tenant by subdomain, ignoring case
    pub async fn find_by_subdomain(&self, subdomain: &str) -> Result<Tenant> {
        let key = subdomain_key(subdomain);
        let tenants = self.tenants.read().await;
        tenants
            .iter()
            .find(|t| t.subdomain_key() == key)
            .cloned()
            .ok_or_else(|| {
                Error::NotFound(format!("No tenant owns subdomain '{}'", subdomain.trim()))
            })
    }

    /// Aggregate counts across all tenants
    pub async fn overview(&self) -> TenantOverview {
        let tenants = self.tenants.read().await;
        tenants.iter().collect()
    }

    /// Create a tenant
    pub async fn create(&self, request: CreateTenantRequest) -> Result<Tenant> {
        let name = validate_name(&request.name)?;
        let subdomain = validate_subdomain(&request.subdomain)?;

        let tenants = Arc::clone(&self.tenants).write_owned().await;
        ensure_subdomain_free(&tenants, &subdomain, None)?;

        let mut tenant = Tenant::new(name, subdomain);
        while tenants.iter().any(|t| t.id == tenant.id) {
            tenant.id = Uuid::new_v4();
        }
        if let Some(plan) = request.plan {
            tenant = tenant.with_plan(plan);
        }
        if let Some(status) = request.status {
            tenant = tenant.with_status(status);
        }

        let mut next = tenants.clone();
        next.push(tenant.clone());

        self.commit(tenants, next).await?;

        info!(tenant_id = %tenant.id, subdomain = %tenant.subdomain, "Created tenant");
        Ok(tenant)
    }

    /// Apply a partial update to a tenant
    pub async fn update(&self, id: Uuid, patch: UpdateTenantRequest) -> Result<Tenant> {
        let tenants = Arc::clone(&self.tenants).write_owned().await;

        let index = tenants
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Tenant {} not found", id)))?;

        let mut updated = tenants[index].clone();
        if let Some(name) = patch.name {
            updated.name = validate_name(&name)?;
        }
        if let Some(subdomain) = patch.subdomain {
            let subdomain = validate_subdomain(&subdomain)?;
            ensure_subdomain_free(&tenants, &subdomain, Some(id))?;
            updated.subdomain = subdomain;
        }
        if let Some(plan) = patch.plan {
            updated.plan = plan;
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }
        updated.touch();

        let mut next = tenants.clone();
        next[index] = updated.clone();

        self.commit(tenants, next).await?;

        info!(tenant_id = %updated.id, subdomain = %updated.subdomain, "Updated tenant");
        Ok(updated)
    }

    /// Save `next` through the backend and install it on success.
    ///
    /// The save runs in its own task so the deadline never interrupts a
    /// write halfway. On expiry the caller gets [`Error::Timeout`] while a
    /// reconcile task keeps mutations out until the save settles; a save
    /// that lands late is undone by writing the previous snapshot back.
    async fn commit(
        &self,
        mut tenants: OwnedRwLockWriteGuard<Vec<Tenant>>,
        next: Vec<Tenant>,
    ) -> Result<()> {
        let backend = Arc::clone(&self.backend);
        let mut save = tokio::spawn(async move {
            let result = backend.save(&next).await;
            (next, result)
        });

        match tokio::time::timeout(self.save_timeout, &mut save).await {
            Ok(joined) => {
                let (next, result) = joined
                    .map_err(|e| Error::Storage(format!("Tenant save task failed: {}", e)))?;
                result?;
                *tenants = next;
                Ok(())
            }
            Err(_) => {
                let previous = tenants.downgrade();
                let backend = Arc::clone(&self.backend);
                tokio::spawn(async move {
                    if let Ok((_, Ok(()))) = save.await {
                        if let Err(err) = backend.save(&previous).await {
                            error!(error = %err, "Failed to restore tenants after timed out save");
                        }
                    }
                    drop(previous);
                });
                Err(Error::Timeout(format!(
                    "Saving tenants exceeded {:?}",
                    self.save_timeout
                )))
            }
        }
    }
}

fn ensure_subdomain_free(tenants: &[Tenant], subdomain: &str, except: Option<Uuid>) -> Result<()> {
    let key = subdomain_key(subdomain);
    let taken = tenants
        .iter()
        .filter(|t| Some(t.id) != except)
        .any(|t| t.subdomain_key() == key);
    if taken {
        return Err(Error::Conflict(format!(
            "Subdomain '{}' is already taken",
            subdomain
        )));
    }
    Ok(())
}

fn check_loaded(tenants: &[Tenant]) -> Result<()> {
    let mut ids = HashSet::new();
    let mut subdomains = HashSet::new();

    for tenant in tenants {
        validate_name(&tenant.name)
            .and_then(|_| validate_subdomain(&tenant.subdomain))
            .map_err(|e| {
                Error::Storage(format!("Invalid stored tenant {}: {}", tenant.id, e.message()))
            })?;
        if !ids.insert(tenant.id) {
            return Err(Error::Storage(format!(
                "Duplicate stored tenant id {}",
                tenant.id
            )));
        }
        if !subdomains.insert(tenant.subdomain_key()) {
            return Err(Error::Storage(format!(
                "Duplicate stored subdomain '{}'",
                tenant.subdomain
            )));
        }
    }

    Ok(())
}
