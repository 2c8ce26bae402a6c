use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::Claims;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

pub fn generate_access_token(
    user_id: u64,
    email: String,
    role: u8,
    secret: &str,
    ttl: usize,
) -> String {
    let claims = Claims {
        sub: user_id,
        email,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    #[test]
    fn token_subject_is_the_user_id() {
        let token = generate_access_token(
            42,
            "jane.doe@mail.com".to_string(),
            Role::Customer.id(),
            "test-secret",
            900,
        );

        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "jane.doe@mail.com");
        assert_eq!(claims.role, Role::Customer.id());
    }

    #[test]
    fn token_fails_with_wrong_secret() {
        let token =
            generate_access_token(1, "a@b.c".to_string(), Role::Admin.id(), "secret-a", 900);
        assert!(verify_token(&token, "secret-b").is_err());
    }

    #[test]
    fn tokens_carry_unique_jti() {
        let a = generate_access_token(1, "a@b.c".to_string(), 1, "s", 900);
        let b = generate_access_token(1, "a@b.c".to_string(), 1, "s", 900);
        let ca = verify_token(&a, "s").unwrap();
        let cb = verify_token(&b, "s").unwrap();
        assert_ne!(ca.jti, cb.jti);
    }
}
