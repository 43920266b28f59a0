//! User, group, and session handlers.
//!
//! # Purpose
//! Login, first-admin bootstrap, account and group administration, and the
//! per-user activity and stat views.
//!
//! # Key invariants and assumptions
//! - Every handler resolves the caller and runs the guard before touching
//!   the store; a rejected request writes nothing and publishes nothing.
//! - Events are published only after the write they describe succeeded.
use crate::api::error::{
    ApiError, ApiJson, api_forbidden, api_internal, api_store, api_validation_error,
};
use crate::api::types::{
    ActivityResponse, LoginRequest, LoginResponse, ReadMoreRequest, ServerInfo, SetGroupRequest,
    SignupEventPayload, UserListRequest, UserListResponse, UserRequest, UserStatResponse,
};
use crate::app::AppState;
use crate::auth::bearer::require_claims;
use crate::model::{EventKind, NewUser, User};
use crate::store::{StoreError, UserQuery};
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use cadence_authz::guard::{self, require};
use cadence_authz::{GroupId, SUPER_GROUP_ID, SessionTtl, UserId};
use chrono::Utc;

#[utoipa::path(
    post,
    path = "/v1/user/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::api::types::ErrorResponse)
    )
)]
/// Exchange a username and password for a session token.
///
/// # Errors
/// - 401 `invalid_credentials` for an unknown user or a wrong password; the
///   two are indistinguishable.
/// - 500 `signing_error` if the token cannot be signed.
pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    body.validate().map_err(|msg| api_validation_error(&msg))?;
    let ttl = if body.remember {
        SessionTtl::Remember
    } else {
        SessionTtl::Default
    };
    let session = state
        .sessions
        .authenticate(&body.username, &body.password, ttl)
        .await?;
    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user_id: session.user_id.get(),
        group_id: session.group_id.get(),
        root: session.root,
        mail: session.mail,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/user/init_admin",
    tag = "users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "First administrator created", body = User),
        (status = 403, description = "An administrator already exists", body = crate::api::types::ErrorResponse)
    )
)]
/// Create the first root user in the super group.
///
/// Only succeeds while the super group has no members; afterwards every call
/// is forbidden.
pub(crate) async fn init_admin(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    body.validate().map_err(|msg| api_validation_error(&msg))?;
    let user = state
        .store
        .create_first_in_group(NewUser {
            username: body.username,
            password: body.password,
            mail: body.mail,
            group_id: SUPER_GROUP_ID,
            root: true,
        })
        .await
        .map_err(|err| match err {
            StoreError::Conflict(_) => api_forbidden("administrator already initialized"),
            other => api_internal("failed to create administrator", &other),
        })?;
    tracing::info!(user_id = %user.id, "administrator initialized");
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/v1/user/signup",
    tag = "users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 403, description = "Caller is not in the super group", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Username taken", body = crate::api::types::ErrorResponse)
    )
)]
/// Create an account. Super group only.
pub(crate) async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<UserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    body.validate().map_err(|msg| api_validation_error(&msg))?;
    let claims = require_claims(&state, &headers)?;
    require(guard::is_super(&claims))?;

    let user = state
        .store
        .create_user(NewUser {
            username: body.username.clone(),
            password: body.password.clone(),
            mail: body.mail.clone(),
            group_id: GroupId::new(body.group_id),
            root: body.root,
        })
        .await
        .map_err(|err| api_store("failed to create user", err))?;

    state
        .publisher
        .publish(
            &user.username,
            EventKind::SignupUser,
            None,
            &SignupEventPayload::from(&body),
            &claims,
        )
        .await;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/v1/user/group",
    tag = "users",
    request_body = SetGroupRequest,
    responses(
        (status = 200, description = "User moved", body = User),
        (status = 403, description = "Caller is not in the super group", body = crate::api::types::ErrorResponse),
        (status = 404, description = "User or group not found", body = crate::api::types::ErrorResponse)
    )
)]
/// Move a user into a group and set their root flag. Super group only.
///
/// With `target_group_name` set, the group is created first.
pub(crate) async fn group_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<SetGroupRequest>,
) -> Result<Json<User>, ApiError> {
    body.validate().map_err(|msg| api_validation_error(&msg))?;
    let claims = require_claims(&state, &headers)?;
    require(guard::is_super(&claims))?;

    let target = UserId::new(body.user_id);
    // Fail before creating a group for a user that does not exist.
    state
        .store
        .get_user(target)
        .await
        .map_err(|err| api_store("failed to load user", err))?;

    let group_id = match body.new_group_name() {
        Some(name) => {
            state
                .store
                .create_group(name)
                .await
                .map_err(|err| api_store("failed to create group", err))?
                .id
        }
        None => GroupId::new(body.target_group_id),
    };

    let user = state
        .store
        .set_user_group(target, group_id, body.root)
        .await
        .map_err(|err| api_store("failed to update user group", err))?;

    state
        .publisher
        .publish(&user.username, EventKind::GroupUser, None, &body, &claims)
        .await;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/v1/user/list",
    tag = "users",
    request_body = UserListRequest,
    responses(
        (status = 200, description = "Page of users", body = UserListResponse),
        (status = 403, description = "Group not visible to caller", body = crate::api::types::ErrorResponse)
    )
)]
/// List users of one group, or of every group for super group members.
pub(crate) async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<UserListRequest>,
) -> Result<Json<UserListResponse>, ApiError> {
    body.validate().map_err(|msg| api_validation_error(&msg))?;
    let claims = require_claims(&state, &headers)?;

    let group = if body.is_all {
        require(guard::is_super(&claims))?;
        None
    } else {
        let target = match body.query_group_id {
            0 => claims.group_id(),
            id => GroupId::new(id),
        };
        require(guard::owns_group(&claims, target))?;
        Some(target)
    };

    let total = state
        .store
        .count_users(group)
        .await
        .map_err(|err| api_internal("failed to count users", &err))?;
    let list = state
        .store
        .list_users(UserQuery {
            group,
            offset: body.offset(),
            limit: body.pagesize,
        })
        .await
        .map_err(|err| api_internal("failed to list users", &err))?;
    Ok(Json(UserListResponse {
        list,
        total,
        page: body.page,
        pagesize: body.pagesize,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/user/stat",
    tag = "users",
    responses(
        (status = 200, description = "Node counters for the caller's group", body = UserStatResponse)
    )
)]
/// Aggregated node counters for the caller's group plus server uptime.
pub(crate) async fn user_stat(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserStatResponse>, ApiError> {
    let claims = require_claims(&state, &headers)?;
    let audit_stat = state
        .store
        .node_stats(claims.group_id())
        .await
        .map_err(|err| api_internal("failed to aggregate node stats", &err))?;
    Ok(Json(UserStatResponse {
        server: ServerInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: state.started_at,
            uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        },
        audit_stat,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/user/activity",
    tag = "users",
    request_body = ReadMoreRequest,
    responses(
        (status = 200, description = "The caller's own audit events", body = ActivityResponse)
    )
)]
/// Page through the audit events the caller produced.
pub(crate) async fn activity(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<ReadMoreRequest>,
) -> Result<Json<ActivityResponse>, ApiError> {
    body.validate().map_err(|msg| api_validation_error(&msg))?;
    let claims = require_claims(&state, &headers)?;
    let list = state
        .store
        .list_events(claims.user_id(), body.page())
        .await
        .map_err(|err| api_internal("failed to list activity", &err))?;
    Ok(Json(ActivityResponse {
        list,
        pagesize: body.pagesize,
    }))
}
