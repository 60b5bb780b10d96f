use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

/// Claims minted by the external identity service. This engine only
/// verifies them.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) exp: i64,
}

pub(crate) struct JwtService {
    pub(crate) secret: String,
}

impl JwtService {
    pub(crate) fn new(secret: &str) -> Self {
        JwtService {
            secret: secret.into(),
        }
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 10;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(JwtError::Decode)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    use super::{Claims, JwtService};

    fn mint(secret: &str, user_id: i64, exp_offset_secs: i64) -> String {
        let claims = Claims {
            user_id,
            username: "alice".to_string(),
            exp: (Utc::now() + Duration::seconds(exp_offset_secs)).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("token must encode")
    }

    #[test]
    fn verify_accepts_token_signed_with_same_secret() {
        let service = JwtService::new("test-secret-test-secret-test-secret");
        let token = mint("test-secret-test-secret-test-secret", 7, 3600);

        let claims = service.verify_token(&token).expect("token must verify");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn verify_rejects_wrong_secret_and_expired_tokens() {
        let service = JwtService::new("test-secret-test-secret-test-secret");

        let wrong = mint("another-secret-another-secret-zz", 7, 3600);
        assert!(service.verify_token(&wrong).is_err());

        let expired = mint("test-secret-test-secret-test-secret", 7, -3600);
        assert!(service.verify_token(&expired).is_err());
    }
}
