use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// JWT payload: the subject is the stringified user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

impl Claims {
    /// The subject must parse as a non-negative integer identity.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse::<i64>().ok().filter(|id| *id >= 0)
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm: config.algorithm,
            ttl: Duration::from_secs((config.ttl_minutes.max(0) as u64) * 60),
        }
    }

    fn sign_expiring_at(
        &self,
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    pub fn sign(&self, user_id: i64) -> anyhow::Result<String> {
        let expires_at =
            OffsetDateTime::now_utc() + TimeDuration::seconds(self.ttl.as_secs() as i64);
        self.sign_expiring_at(user_id, expires_at)
    }

    /// Verifies signature and expiry; any structural or cryptographic
    /// failure is an error.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(self.algorithm))?;
        debug!(sub = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 5,
        })
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret");
        let token = keys.sign(42).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id(), Some(42));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret");
        // Past the default 60s leeway.
        let expired = OffsetDateTime::now_utc() - TimeDuration::seconds(300);
        let token = keys.sign_expiring_at(7, expired).expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = make_keys("one-secret").sign(7).expect("sign");
        assert!(make_keys("another-secret").verify(&token).is_err());
    }

    #[test]
    fn subject_must_be_a_non_negative_integer() {
        let claims = |sub: &str| Claims {
            sub: sub.to_string(),
            exp: 0,
        };
        assert_eq!(claims("0").user_id(), Some(0));
        assert_eq!(claims("17").user_id(), Some(17));
        assert_eq!(claims("-3").user_id(), None);
        assert_eq!(claims("alice").user_id(), None);
        assert_eq!(claims("").user_id(), None);
    }
}
