//! Demo tenants used to populate an empty store in development.

use chrono::{DateTime, TimeZone, Utc};

use super::model::{Tenant, TenantPlan, TenantStatus};

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("seed dates are valid calendar days")
}

/// The three sample organizations shown on a fresh tenant page.
pub fn demo_tenants() -> Vec<Tenant> {
    vec![
        Tenant::new("Acme Corporation", "acme")
            .with_plan(TenantPlan::Enterprise)
            .with_status(TenantStatus::Active)
            .with_counts(125, 45)
            .with_timestamps(day(2024, 1, 15), day(2024, 12, 1)),
        Tenant::new("Tech Startup Inc", "techstartup")
            .with_plan(TenantPlan::Professional)
            .with_status(TenantStatus::Active)
            .with_counts(25, 12)
            .with_timestamps(day(2024, 3, 20), day(2024, 11, 28)),
        Tenant::new("Demo Company", "demo")
            .with_plan(TenantPlan::Starter)
            .with_status(TenantStatus::Trial)
            .with_counts(5, 3)
            .with_timestamps(day(2024, 11, 15), day(2024, 11, 30)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::TenantOverview;
    use std::collections::HashSet;

    #[test]
    fn test_demo_tenants_are_consistent() {
        let tenants = demo_tenants();
        assert_eq!(tenants.len(), 3);

        let subdomains: HashSet<_> = tenants.iter().map(Tenant::subdomain_key).collect();
        assert_eq!(subdomains.len(), 3);
        assert!(tenants.iter().all(|t| t.created_at < t.last_activity));

        let overview: TenantOverview = tenants.iter().collect();
        assert_eq!(overview.active_tenants, 2);
        assert_eq!(overview.total_users, 155);
        assert_eq!(overview.total_projects, 60);
    }

    #[test]
    fn test_demo_tenants_carry_their_calendar_dates() {
        let tenants = demo_tenants();
        let acme = &tenants[0];

        assert_eq!(acme.subdomain, "acme");
        assert_eq!(acme.created_at.to_rfc3339(), "2024-01-15T00:00:00+00:00");
        assert_eq!(acme.last_activity.to_rfc3339(), "2024-12-01T00:00:00+00:00");
        assert!(tenants
            .iter()
            .all(|t| t.created_at > DateTime::<Utc>::default()));
    }
}
