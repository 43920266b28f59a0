//! Admin-plane HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures tracing middleware, and defines the
//! shared state injected into handlers.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::audit::{AuditDispatcher, EventPublisher, NodeRpc};
use crate::auth::SessionIssuer;
use crate::observability;
use crate::store::AdminStore;
use axum::Router;
use cadence_authz::{ClaimsCodec, SigningConfig};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AdminStore>,
    pub codec: ClaimsCodec,
    pub sessions: Arc<SessionIssuer>,
    pub dispatcher: Arc<AuditDispatcher>,
    pub publisher: Arc<EventPublisher>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire every component over one store backend.
    pub fn new<S>(
        store: Arc<S>,
        signing: Arc<SigningConfig>,
        rpc: Arc<dyn NodeRpc>,
        rpc_timeout: Duration,
    ) -> Self
    where
        S: AdminStore + 'static,
    {
        let codec = ClaimsCodec::new(signing);
        Self {
            sessions: Arc::new(SessionIssuer::new(store.clone(), codec.clone())),
            publisher: Arc::new(EventPublisher::new(store.clone())),
            dispatcher: Arc::new(AuditDispatcher::new(rpc, rpc_timeout)),
            store,
            codec,
            started_at: Utc::now(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route("/v1/user/login", axum::routing::post(api::users::login))
        .route(
            "/v1/user/init_admin",
            axum::routing::post(api::users::init_admin),
        )
        .route("/v1/user/signup", axum::routing::post(api::users::signup))
        .route("/v1/user/group", axum::routing::post(api::users::group_user))
        .route("/v1/user/list", axum::routing::post(api::users::list_users))
        .route("/v1/user/stat", axum::routing::post(api::users::user_stat))
        .route(
            "/v1/user/activity",
            axum::routing::post(api::users::activity),
        )
        .route(
            "/v1/job/history",
            axum::routing::post(api::jobs::job_history),
        )
        .route("/v1/job/audit", axum::routing::post(api::jobs::audit_job))
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/v1/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .with_state(state)
}
