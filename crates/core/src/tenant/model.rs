//! Tenant model definitions

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Longest subdomain accepted, matching a single DNS label.
pub const MAX_SUBDOMAIN_LEN: usize = 63;

/// Billing tier of a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantPlan {
    Starter,
    Professional,
    Enterprise,
}

impl Default for TenantPlan {
    fn default() -> Self {
        Self::Starter
    }
}

/// Lifecycle state of a tenant
///
/// Any status may be reassigned to any other; `Suspended` is the soft
/// deactivation state since tenants are never hard-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Trial,
    Suspended,
}

impl Default for TenantStatus {
    fn default() -> Self {
        Self::Trial
    }
}

/// One customer organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    /// Unique, never reused identifier
    pub id: Uuid,

    /// Display name (e.g., "Acme Corporation")
    pub name: String,

    /// External namespace key, unique case-insensitively
    pub subdomain: String,

    pub plan: TenantPlan,

    pub status: TenantStatus,

    pub user_count: u64,

    pub project_count: u64,

    /// Timestamp when the tenant was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last successful mutation
    pub last_activity: DateTime<Utc>,
}

impl Tenant {
    /// Create a tenant with default plan and status and zeroed counters.
    ///
    /// Inputs are not validated here; the store does that before insertion.
    pub fn new(name: impl Into<String>, subdomain: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            subdomain: subdomain.into(),
            plan: TenantPlan::default(),
            status: TenantStatus::default(),
            user_count: 0,
            project_count: 0,
            created_at: now,
            last_activity: now,
        }
    }

    /// Set the plan
    pub fn with_plan(mut self, plan: TenantPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: TenantStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the user and project counters
    pub fn with_counts(mut self, user_count: u64, project_count: u64) -> Self {
        self.user_count = user_count;
        self.project_count = project_count;
        self
    }

    /// Set both timestamps, e.g. when reconstructing seeded records
    pub fn with_timestamps(
        mut self,
        created_at: DateTime<Utc>,
        last_activity: DateTime<Utc>,
    ) -> Self {
        self.created_at = created_at;
        self.last_activity = last_activity;
        self
    }

    /// Lowercased subdomain used for uniqueness checks
    pub fn subdomain_key(&self) -> String {
        subdomain_key(&self.subdomain)
    }

    /// Refresh `last_activity`, keeping it strictly after its prior value
    /// and after `created_at` even when the clock has not advanced.
    pub fn touch(&mut self) {
        let floor = self.last_activity.max(self.created_at);
        let now = Utc::now();
        self.last_activity = if now > floor {
            now
        } else {
            floor + Duration::nanoseconds(1)
        };
    }
}

/// Request to create a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub name: String,

    pub subdomain: String,

    /// Defaults to `starter`
    #[serde(default)]
    pub plan: Option<TenantPlan>,

    /// Defaults to `trial`
    #[serde(default)]
    pub status: Option<TenantStatus>,
}

impl CreateTenantRequest {
    pub fn new(name: impl Into<String>, subdomain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subdomain: subdomain.into(),
            plan: None,
            status: None,
        }
    }
}

/// Partial update; absent fields keep their prior values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub plan: Option<TenantPlan>,
    #[serde(default)]
    pub status: Option<TenantStatus>,
}

impl UpdateTenantRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.subdomain.is_none()
            && self.plan.is_none()
            && self.status.is_none()
    }
}

/// Aggregate figures across all tenants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantOverview {
    pub total_tenants: usize,
    pub active_tenants: usize,
    pub trial_tenants: usize,
    pub suspended_tenants: usize,
    pub total_users: u64,
    pub total_projects: u64,
}

impl<'a> FromIterator<&'a Tenant> for TenantOverview {
    fn from_iter<I: IntoIterator<Item = &'a Tenant>>(iter: I) -> Self {
        let mut overview = TenantOverview::default();
        for tenant in iter {
            overview.total_tenants += 1;
            match tenant.status {
                TenantStatus::Active => overview.active_tenants += 1,
                TenantStatus::Trial => overview.trial_tenants += 1,
                TenantStatus::Suspended => overview.suspended_tenants += 1,
            }
            overview.total_users = overview.total_users.saturating_add(tenant.user_count);
            overview.total_projects = overview
                .total_projects
                .saturating_add(tenant.project_count);
        }
        overview
    }
}

/// Trim and reject an empty tenant name.
pub fn validate_name(input: &str) -> Result<String> {
    let name = input.trim();
    if name.is_empty() {
        return Err(Error::Validation("Tenant name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

/// Trim and check a subdomain against the DNS label charset.
///
/// Casing is preserved in the returned value.
pub fn validate_subdomain(input: &str) -> Result<String> {
    let subdomain = input.trim();
    if subdomain.is_empty() {
        return Err(Error::Validation(
            "Tenant subdomain cannot be empty".to_string(),
        ));
    }
    if subdomain.len() > MAX_SUBDOMAIN_LEN {
        return Err(Error::Validation(format!(
            "Tenant subdomain must be at most {} characters",
            MAX_SUBDOMAIN_LEN
        )));
    }
    if !subdomain
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
    {
        return Err(Error::Validation(format!(
            "Tenant subdomain '{}' may only contain letters, digits and '-'",
            subdomain
        )));
    }
    if subdomain.starts_with('-') || subdomain.ends_with('-') {
        return Err(Error::Validation(format!(
            "Tenant subdomain '{}' cannot start or end with '-'",
            subdomain
        )));
    }
    Ok(subdomain.to_string())
}

/// Case-insensitive comparison key for a subdomain
pub fn subdomain_key(subdomain: &str) -> String {
    subdomain.trim().to_ascii_lowercase()
}
