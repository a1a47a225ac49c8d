//! Tenant API routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use tenant_core::tenant::{CreateTenantRequest, Tenant, TenantOverview, UpdateTenantRequest};

use crate::error::ApiError;
use crate::state::AppState;

/// A malformed id cannot name any tenant.
fn parse_tenant_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("Tenant {} not found", raw)))
}

async fn list_tenants(State(state): State<AppState>) -> Json<Vec<Tenant>> {
    Json(state.tenant_store().list().await)
}

async fn tenant_overview(State(state): State<AppState>) -> Json<TenantOverview> {
    Json(state.tenant_store().overview().await)
}

async fn create_tenant(
    State(state): State<AppState>,
    payload: Result<Json<CreateTenantRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Tenant>), ApiError> {
    let Json(req) = payload?;
    let created = state.tenant_store().create(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Tenant>, ApiError> {
    let tenant_id = parse_tenant_id(&id)?;
    let tenant = state.tenant_store().get(tenant_id).await?;
    Ok(Json(tenant))
}

async fn get_tenant_by_subdomain(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> Result<Json<Tenant>, ApiError> {
    let tenant = state.tenant_store().find_by_subdomain(&subdomain).await?;
    Ok(Json(tenant))
}

async fn update_tenant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTenantRequest>, JsonRejection>,
) -> Result<Json<Tenant>, ApiError> {
    let tenant_id = parse_tenant_id(&id)?;
    let Json(patch) = payload?;
    let updated = state.tenant_store().update(tenant_id, patch).await?;
    Ok(Json(updated))
}

/// Create the tenant router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tenants", get(list_tenants).post(create_tenant))
        .route("/api/tenants/overview", get(tenant_overview))
        .route(
            "/api/tenants/by-subdomain/{subdomain}",
            get(get_tenant_by_subdomain),
        )
        .route("/api/tenants/{id}", get(get_tenant).patch(update_tenant))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tenant_core::tenant::{demo_tenants, MemoryBackend, TenantStore};
    use tower::ServiceExt;

    use crate::routes::app;
    use crate::state::AppState;

    fn empty_app() -> Router {
        app(AppState::with_store(TenantStore::in_memory()))
    }

    async fn demo_app() -> Router {
        let store = TenantStore::open(Arc::new(MemoryBackend::with_seed(demo_tenants())))
            .await
            .unwrap();
        app(AppState::with_store(store))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, payload)
    }

    #[tokio::test]
    async fn list_tenants_returns_empty_list_initially() {
        let app = empty_app();

        let (status, payload) = send(&app, "GET", "/api/tenants", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload, json!([]));
    }

    #[tokio::test]
    async fn create_tenant_returns_created_tenant_with_defaults() {
        let app = empty_app();

        let (status, payload) = send(
            &app,
            "POST",
            "/api/tenants",
            Some(json!({ "name": "Acme", "subdomain": "acme" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payload["name"], "Acme");
        assert_eq!(payload["subdomain"], "acme");
        assert_eq!(payload["plan"], "starter");
        assert_eq!(payload["status"], "trial");
        assert_eq!(payload["userCount"], 0);
        assert_eq!(payload["projectCount"], 0);
        assert!(payload["id"].is_string());
        assert_eq!(payload["createdAt"], payload["lastActivity"]);

        let id = payload["id"].as_str().unwrap();
        let (status, fetched) = send(&app, "GET", &format!("/api/tenants/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, payload);
    }

    #[tokio::test]
    async fn create_tenant_rejects_empty_name_with_envelope() {
        let app = empty_app();

        let (status, payload) = send(
            &app,
            "POST",
            "/api/tenants",
            Some(json!({ "name": "", "subdomain": "x" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"]["status"], 400);
        assert_eq!(payload["error"]["path"], "/api/tenants");
        assert_eq!(payload["error"]["message"], "Tenant name cannot be empty");
        assert!(payload["error"]["timestamp"].is_string());

        let (_, listed) = send(&app, "GET", "/api/tenants", None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn create_tenant_rejects_duplicate_subdomain_ignoring_case() {
        let app = empty_app();
        send(
            &app,
            "POST",
            "/api/tenants",
            Some(json!({ "name": "Acme", "subdomain": "acme" })),
        )
        .await;

        let (status, payload) = send(
            &app,
            "POST",
            "/api/tenants",
            Some(json!({ "name": "Other", "subdomain": "ACME" })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(payload["error"]["status"], 409);
    }

    #[tokio::test]
    async fn create_tenant_rejects_malformed_json() {
        let app = empty_app();

        let (status, payload) = send(
            &app,
            "POST",
            "/api/tenants",
            Some(json!({ "name": "Acme", "subdomain": "acme", "plan": "platinum" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"]["status"], 400);
        assert_eq!(payload["error"]["path"], "/api/tenants");
    }

    #[tokio::test]
    async fn update_tenant_applies_partial_patch() {
        let app = empty_app();
        let (_, created) = send(
            &app,
            "POST",
            "/api/tenants",
            Some(json!({ "name": "A", "subdomain": "a" })),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, updated) = send(
            &app,
            "PATCH",
            &format!("/api/tenants/{}", id),
            Some(json!({ "plan": "enterprise", "status": "active" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["plan"], "enterprise");
        assert_eq!(updated["status"], "active");
        assert_eq!(updated["name"], "A");
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert_ne!(updated["lastActivity"], created["lastActivity"]);
    }

    #[tokio::test]
    async fn update_unknown_tenant_is_not_found() {
        let app = empty_app();

        let (status, payload) = send(
            &app,
            "PATCH",
            &format!("/api/tenants/{}", uuid::Uuid::new_v4()),
            Some(json!({ "name": "X" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(payload["error"]["status"], 404);

        let (status, _) = send(
            &app,
            "PATCH",
            "/api/tenants/missing-id",
            Some(json!({ "name": "X" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_tenant_rejects_taken_subdomain() {
        let app = demo_app().await;
        let (_, demo) = send(&app, "GET", "/api/tenants/by-subdomain/demo", None).await;
        let id = demo["id"].as_str().unwrap();

        let (status, payload) = send(
            &app,
            "PATCH",
            &format!("/api/tenants/{}", id),
            Some(json!({ "subdomain": "Acme" })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(payload["error"]["path"], format!("/api/tenants/{}", id));
    }

    #[tokio::test]
    async fn list_preserves_seed_order() {
        let app = demo_app().await;

        let (status, payload) = send(&app, "GET", "/api/tenants", None).await;

        assert_eq!(status, StatusCode::OK);
        let subdomains: Vec<_> = payload
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["subdomain"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(subdomains, vec!["acme", "techstartup", "demo"]);
    }

    #[tokio::test]
    async fn find_by_subdomain_ignores_case() {
        let app = demo_app().await;

        let (status, payload) = send(&app, "GET", "/api/tenants/by-subdomain/TechStartup", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["name"], "Tech Startup Inc");

        let (status, _) = send(&app, "GET", "/api/tenants/by-subdomain/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn overview_summarizes_tenants() {
        let app = demo_app().await;

        let (status, payload) = send(&app, "GET", "/api/tenants/overview", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["totalTenants"], 3);
        assert_eq!(payload["activeTenants"], 2);
        assert_eq!(payload["trialTenants"], 1);
        assert_eq!(payload["suspendedTenants"], 0);
        assert_eq!(payload["totalUsers"], 155);
        assert_eq!(payload["totalProjects"], 60);
    }

    #[tokio::test]
    async fn unknown_route_uses_error_envelope() {
        let app = empty_app();

        let (status, payload) = send(&app, "GET", "/api/nothing-here", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(payload["error"]["path"], "/api/nothing-here");
        assert_eq!(payload["error"]["message"], "Route not found");
    }

    #[tokio::test]
    async fn unsupported_method_uses_error_envelope() {
        let app = empty_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/tenants")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let allow = response.headers()["allow"].to_str().unwrap().to_string();
        assert!(allow.contains("GET") && allow.contains("POST"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload["error"]["status"], 405);
        assert_eq!(payload["error"]["path"], "/api/tenants");
        assert_eq!(payload["error"]["message"], "Method Not Allowed");

        let (status, _) = send(&app, "DELETE", "/api/tenants", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        let (status, payload) = send(&app, "GET", "/api/tenants", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload, json!([]));
    }
}
