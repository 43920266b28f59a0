//! Group (tenant boundary) records.
use cadence_authz::GroupId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Group {
    #[schema(value_type = u64)]
    pub id: GroupId,
    pub name: String,
}
