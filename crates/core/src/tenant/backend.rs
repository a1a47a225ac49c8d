//! Tenant backends
//!
//! A backend supplies the initial state of a [`TenantStore`](super::TenantStore)
//! and receives every committed snapshot.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Tenant;
use crate::{Error, Result};

/// Persistence seam injected into the tenant store
#[async_trait]
pub trait TenantBackend: Send + Sync {
    /// Load the initial tenants, in insertion order
    async fn load(&self) -> Result<Vec<Tenant>>;

    /// Persist the full, ordered snapshot after a mutation
    async fn save(&self, tenants: &[Tenant]) -> Result<()>;
}

/// Volatile backend; state lives only in the store.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    seed: Vec<Tenant>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the store with the given tenants
    pub fn with_seed(seed: Vec<Tenant>) -> Self {
        Self { seed }
    }
}

#[async_trait]
impl TenantBackend for MemoryBackend {
    async fn load(&self) -> Result<Vec<Tenant>> {
        Ok(self.seed.clone())
    }

    async fn save(&self, _tenants: &[Tenant]) -> Result<()> {
        Ok(())
    }
}

/// Falls back to a fixed seed when the wrapped backend starts empty.
///
/// Saves always go to the wrapped backend, so the seed is written out on
/// the first mutation.
pub struct SeededBackend {
    inner: Arc<dyn TenantBackend>,
    seed: Vec<Tenant>,
}

impl SeededBackend {
    pub fn new(inner: Arc<dyn TenantBackend>, seed: Vec<Tenant>) -> Self {
        Self { inner, seed }
    }
}

#[async_trait]
impl TenantBackend for SeededBackend {
    async fn load(&self) -> Result<Vec<Tenant>> {
        let tenants = self.inner.load().await?;
        if tenants.is_empty() {
            return Ok(self.seed.clone());
        }
        Ok(tenants)
    }

    async fn save(&self, tenants: &[Tenant]) -> Result<()> {
        self.inner.save(tenants).await
    }
}

/// Stores tenants as a JSON array in a file on disk.
///
/// A missing file loads as an empty collection. Each save writes a sibling
/// temp file, syncs it, and renames it over the target, so readers see
/// either the old or the new array and never a missing file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    file_path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

fn replace_file(target: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let temp_path = dir.join(format!(".tenants-{}.tmp", Uuid::new_v4().simple()));
    let written = std::fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });

    match written.and_then(|()| std::fs::rename(&temp_path, target)) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = std::fs::remove_file(&temp_path);
            Err(err)
        }
    }
}

#[async_trait]
impl TenantBackend for JsonFileBackend {
    async fn load(&self) -> Result<Vec<Tenant>> {
        let content = match tokio::fs::read_to_string(&self.file_path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, tenants: &[Tenant]) -> Result<()> {
        let contents = serde_json::to_vec_pretty(tenants)?;
        let target = self.file_path.clone();

        tokio::task::spawn_blocking(move || replace_file(&target, &contents))
            .await
            .map_err(|e| Error::Storage(format!("Tenant file writer failed: {}", e)))??;
        Ok(())
    }
}
