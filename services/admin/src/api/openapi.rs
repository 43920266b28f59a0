//! OpenAPI schema aggregation for the admin API.
use crate::api::{
    jobs, system,
    types::{
        ActivityResponse, AuditJobRequest, AuditJobResponse, ErrorResponse, HealthStatus,
        JobHistoryResponse, LoginRequest, LoginResponse, ReadMoreRequest, ServerInfo,
        SetGroupRequest, UserListRequest, UserListResponse, UserRequest, UserStatResponse,
    },
    users,
};
use crate::model::{AuditEvent, EventKind, Group, JobHistory, JobKind, Node, NodeStats, User};
use crate::store::SortOrder;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "cadence-admin",
        version = "v1",
        description = "Cadence admin plane HTTP API"
    ),
    paths(
        system::system_health,
        users::login,
        users::init_admin,
        users::signup,
        users::group_user,
        users::list_users,
        users::user_stat,
        users::activity,
        jobs::job_history,
        jobs::audit_job
    ),
    components(schemas(
        HealthStatus,
        ErrorResponse,
        LoginRequest,
        LoginResponse,
        UserRequest,
        SetGroupRequest,
        UserListRequest,
        UserListResponse,
        ReadMoreRequest,
        SortOrder,
        ActivityResponse,
        JobHistoryResponse,
        AuditJobRequest,
        AuditJobResponse,
        ServerInfo,
        UserStatResponse,
        User,
        Group,
        Node,
        NodeStats,
        AuditEvent,
        EventKind,
        JobHistory,
        JobKind
    )),
    tags(
        (name = "system", description = "Health endpoints"),
        (name = "users", description = "Sessions, accounts, and groups"),
        (name = "jobs", description = "Job audit and history")
    )
)]
pub struct ApiDoc;
