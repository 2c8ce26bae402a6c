use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "jane.doe@mail.com")]
    pub email: String,
    #[schema(example = "s3cret")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: u64,
    pub email: String,
    pub role: u8,
    pub exp: usize,
    pub jti: String,
}
