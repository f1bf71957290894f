// --- File: crates/services/classnet_backend/src/router.rs ---
use axum::{extract::State, routing::get, Json, Router};
use classnet_agent::{agent_routes, bootstrap_routes, enrollment_routes, Distribution};
use classnet_common::features::{
    is_agent_updates_enabled, is_bootstrap_enabled, is_enrollment_enabled,
};
use classnet_common::ClassnetError;
use classnet_db::DbClient;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// `"ok"`, `"unavailable"` or `"memory"` when no database is configured.
    pub database: &'static str,
}

async fn health(State(db): State<Option<DbClient>>) -> Json<HealthResponse> {
    let database = match &db {
        Some(client) if client.is_healthy().await => "ok",
        Some(_) => "unavailable",
        None => "memory",
    };
    Json(HealthResponse {
        status: "ok",
        database,
    })
}

fn api_router(state: &AppState) -> Result<Router, ClassnetError> {
    let config = &state.config;

    let mut router = Router::new().merge(classnet_machines::routes(
        config.clone(),
        state.issuer.clone(),
        state.devices.clone(),
        state.catalog.clone(),
    ));

    if let Some(agent) = config.agent.as_ref().filter(|_| is_agent_updates_enabled(config)) {
        let distribution = Arc::new(Distribution::agent(agent)?);
        info!(files = distribution.files().len(), root = %distribution.root().display(), "Agent updates enabled");
        router = router.nest(
            "/agent/windows",
            agent_routes(state.issuer.clone(), state.devices.clone(), distribution),
        );
    }

    if let Some(agent) = config.agent.as_ref().filter(|_| is_bootstrap_enabled(config)) {
        let distribution = Arc::new(Distribution::bootstrap(agent)?);
        info!(files = distribution.files().len(), "Bootstrap downloads enabled");
        router = router.nest(
            "/agent/windows/bootstrap",
            bootstrap_routes(state.issuer.clone(), state.devices.clone(), distribution),
        );
    }

    if is_enrollment_enabled(config) {
        info!("Enrollment enabled");
        router = router.nest(
            "/enroll",
            enrollment_routes(
                config.clone(),
                state.issuer.clone(),
                state.catalog.clone(),
                state.admins.clone(),
            ),
        );
    }

    Ok(router)
}

#[cfg(feature = "openapi")]
fn swagger_router() -> Router {
    use classnet_agent::doc::AgentApiDoc;
    use classnet_machines::doc::MachinesApiDoc;
    use classnet_policy::doc::PolicyApiDoc;
    use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
    use utoipa::{Modify, OpenApi};
    use utoipa_swagger_ui::SwaggerUi;

    struct BearerAuth;

    impl Modify for BearerAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let components = openapi.components.get_or_insert_with(Default::default);
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }

    #[derive(OpenApi)]
    #[openapi(
        info(
            title = "classnet API",
            version = "0.1.0",
            description = "Device registration, policy delivery and agent distribution"
        ),
        modifiers(&BearerAuth),
        servers((url = "/api", description = "Main API prefix"))
    )]
    struct ApiDoc;

    let mut openapi_doc = ApiDoc::openapi();
    openapi_doc.merge(MachinesApiDoc::openapi());
    openapi_doc.merge(AgentApiDoc::openapi());
    openapi_doc.merge(PolicyApiDoc::openapi());
    info!("Swagger UI available at /api/docs");

    SwaggerUi::new("/api/docs")
        .url("/api/docs/openapi.json", openapi_doc)
        .into()
}

/// The complete application: `/api` routes, policy routes at the root and `/health`.
///
/// The request timeout only bounds `/api`. A slow catalog on the policy feed
/// must still end in a document or the sentinel, never a 408.
pub fn build_router(state: &AppState) -> Result<Router, ClassnetError> {
    let policy = classnet_policy::routes(
        state.issuer.clone(),
        state.devices.clone(),
        state.catalog.clone(),
    );

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs.max(1));
    let api = api_router(state)?.layer(TimeoutLayer::new(timeout));

    #[allow(unused_mut)]
    let mut app = Router::new()
        .route("/health", get(health))
        .with_state(state.db.clone())
        .nest("/api", api)
        .merge(policy);

    #[cfg(feature = "openapi")]
    {
        app = app.merge(swagger_router());
    }

    Ok(app.layer(TraceLayer::new_for_http()))
}
