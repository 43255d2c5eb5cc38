use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::state::AppState;

/// Tokens expire exactly one hour after they are issued.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Claims carried by an issued token: the user's email and the expiry
/// timestamp, nothing else. Roles are resolved from the store per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let secret = state.config.jwt.secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, email: &str) -> anyhow::Result<String> {
        let exp = OffsetDateTime::now_utc().unix_timestamp() + TOKEN_TTL_SECS;
        let claims = Claims {
            email: email.to_owned(),
            exp: exp as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(email = %email, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_required_spec_claims(&["exp"]);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(email = %data.claims.email, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let token = keys.sign("alice@example.com").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.email, "alice@example.com");
    }

    #[tokio::test]
    async fn expiry_is_one_hour_from_issue() {
        let keys = make_keys();
        let before = OffsetDateTime::now_utc().unix_timestamp();
        let token = keys.sign("bob@example.com").expect("sign");
        let after = OffsetDateTime::now_utc().unix_timestamp();
        let claims = keys.verify(&token).expect("verify");
        let exp = claims.exp as i64;
        assert!(exp >= before + TOKEN_TTL_SECS);
        assert!(exp <= after + TOKEN_TTL_SECS + 1);
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let keys = make_keys();
        let claims = Claims {
            email: "old@example.com".into(),
            exp: (OffsetDateTime::now_utc().unix_timestamp() - 120) as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_token_signed_with_other_secret() {
        let keys = make_keys();
        let other = EncodingKey::from_secret(b"some-other-secret");
        let claims = Claims {
            email: "mallory@example.com".into(),
            exp: (OffsetDateTime::now_utc().unix_timestamp() + TOKEN_TTL_SECS) as usize,
        };
        let token = encode(&Header::default(), &claims, &other).expect("encode");
        assert!(keys.verify(&token).is_err());
    }
}
