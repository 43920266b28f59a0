//! Job audit and job history handlers.
//!
//! # Key invariants and assumptions
//! - Audit order is guard, then dispatch, then publish. A failed dispatch
//!   returns `remote_unavailable` and records nothing.
//! - History is limited to nodes owned by the caller's group; super group
//!   members see every node.
use crate::api::error::{ApiError, ApiJson, api_internal, api_validation_error};
use crate::api::types::{AuditJobRequest, AuditJobResponse, JobHistoryResponse, ReadMoreRequest};
use crate::app::AppState;
use crate::auth::bearer::require_claims;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use cadence_authz::guard::{self, require};

#[utoipa::path(
    post,
    path = "/v1/job/audit",
    tag = "jobs",
    request_body = AuditJobRequest,
    responses(
        (status = 200, description = "Jobs audited on the node", body = AuditJobResponse),
        (status = 403, description = "Caller may not audit on this node", body = crate::api::types::ErrorResponse),
        (status = 502, description = "Node unreachable or failed", body = crate::api::types::ErrorResponse)
    )
)]
/// Audit a batch of jobs on the node that owns them.
///
/// # Errors
/// - 403 `forbidden` unless the caller is privileged and owns the node.
/// - 502 `remote_unavailable` when the node call fails or times out.
pub(crate) async fn audit_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<AuditJobRequest>,
) -> Result<Json<AuditJobResponse>, ApiError> {
    body.validate().map_err(|msg| api_validation_error(&msg))?;
    let claims = require_claims(&state, &headers)?;
    require(guard::is_privileged(&claims))?;
    require(guard::owns_node(&claims, &body.addr, state.store.as_ref()).await)?;

    let affected = state
        .dispatcher
        .dispatch(&body.addr, body.job_type, &body.job_ids)
        .await?;

    state
        .publisher
        .publish(
            &affected.join(","),
            body.job_type.audit_route().event,
            Some(&body.addr),
            &body,
            &claims,
        )
        .await;
    Ok(Json(AuditJobResponse { affected }))
}

#[utoipa::path(
    post,
    path = "/v1/job/history",
    tag = "jobs",
    request_body = ReadMoreRequest,
    responses(
        (status = 200, description = "Job runs on the caller's nodes", body = JobHistoryResponse)
    )
)]
/// Page through job runs on nodes visible to the caller.
pub(crate) async fn job_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<ReadMoreRequest>,
) -> Result<Json<JobHistoryResponse>, ApiError> {
    body.validate().map_err(|msg| api_validation_error(&msg))?;
    let claims = require_claims(&state, &headers)?;
    let scope = (!guard::is_super(&claims)).then(|| claims.group_id());
    let addrs = state
        .store
        .list_group_addrs(scope)
        .await
        .map_err(|err| api_internal("failed to list group nodes", &err))?;
    let list = state
        .store
        .list_job_history(&addrs, body.page())
        .await
        .map_err(|err| api_internal("failed to list job history", &err))?;
    Ok(Json(JobHistoryResponse {
        list,
        pagesize: body.pagesize,
    }))
}
