use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Customer {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Jane Doe")]
    pub name: String,

    #[schema(example = "jane.doe@mail.com")]
    pub email: String,

    #[schema(example = "+14155550123", nullable = true)]
    pub phone: Option<String>,

    /// Owning login account (1:1 with users)
    #[schema(example = 7)]
    pub user_id: u64,
}
