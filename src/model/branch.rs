use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Branch {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Downtown")]
    pub name: String,

    /// User id of the manager assigned to this branch
    #[schema(example = 3, nullable = true)]
    pub manager_id: Option<u64>,
}
