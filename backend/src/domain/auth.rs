//! Bearer-credential verification and issuance.
//!
//! The identity verifier is pure: it checks the signature and expiry of a
//! compact JWT and yields the authenticated [`Principal`]. No I/O, no clock
//! dependency beyond the token's own claims.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::DomainError;

/// Access role carried by a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member: may redeem vouchers and submit uploads.
    User,
    /// Administrator: may additionally generate vouchers and view statistics.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Authenticated identity derived from a verified credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable user identifier.
    pub id: Uuid,
    /// Username at the time the token was issued.
    pub username: String,
    /// Access role.
    pub role: Role,
}

impl Principal {
    /// Whether this principal carries administrative rights.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// JWT claim set: the principal plus standard issued-at/expiry claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    username: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Lifetime of issued credentials.
const TOKEN_VALIDITY_HOURS: i64 = 24;

/// Signs credentials for authenticated users.
#[derive(Clone)]
pub struct TokenSigner {
    key: EncodingKey,
}

impl TokenSigner {
    /// Build a signer from the shared HMAC secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
        }
    }

    /// Issue a signed token for the given principal.
    pub fn issue(&self, principal: &Principal) -> Result<String, DomainError> {
        self.issue_expiring_at(principal, Utc::now() + Duration::hours(TOKEN_VALIDITY_HOURS))
    }

    fn issue_expiring_at(
        &self,
        principal: &Principal,
        expiry: chrono::DateTime<Utc>,
    ) -> Result<String, DomainError> {
        let claims = Claims {
            sub: principal.id,
            username: principal.username.clone(),
            role: principal.role,
            iat: Utc::now().timestamp(),
            exp: expiry.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|err| DomainError::internal(format!("failed to sign credential: {err}")))
    }
}

/// Verifies bearer credentials and recovers the principal.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier from the shared HMAC secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify a compact token and return the authenticated principal.
    ///
    /// Fails with `Unauthorized` when the token is malformed, carries a bad
    /// signature, or has expired.
    pub fn verify(&self, token: &str) -> Result<Principal, DomainError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|_| DomainError::unauthorized("invalid or expired credential"))?;
        Ok(Principal {
            id: data.claims.sub,
            username: data.claims.username,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for credential issuance and verification.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    const SECRET: &[u8] = b"test-secret";

    #[fixture]
    fn principal() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            username: "dewi".to_owned(),
            role: Role::User,
        }
    }

    #[rstest]
    fn issued_token_verifies_to_same_principal(principal: Principal) {
        let signer = TokenSigner::new(SECRET);
        let verifier = TokenVerifier::new(SECRET);

        let token = signer.issue(&principal).expect("issue token");
        let verified = verifier.verify(&token).expect("verify token");

        assert_eq!(verified, principal);
    }

    #[rstest]
    fn wrong_secret_is_rejected(principal: Principal) {
        let signer = TokenSigner::new(SECRET);
        let verifier = TokenVerifier::new(b"another-secret");

        let token = signer.issue(&principal).expect("issue token");
        let err = verifier.verify(&token).expect_err("bad signature must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn expired_token_is_rejected(principal: Principal) {
        let signer = TokenSigner::new(SECRET);
        let verifier = TokenVerifier::new(SECRET);

        let token = signer
            .issue_expiring_at(&principal, Utc::now() - Duration::minutes(5))
            .expect("issue token");
        let err = verifier.verify(&token).expect_err("expired token must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[case("")]
    #[case("not-a-token")]
    #[case("aaaa.bbbb.cccc")]
    fn malformed_tokens_are_rejected(#[case] token: &str) {
        let verifier = TokenVerifier::new(SECRET);
        let err = verifier.verify(token).expect_err("malformed token must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn admin_principal_reports_admin(mut principal: Principal) {
        assert!(!principal.is_admin());
        principal.role = Role::Admin;
        assert!(principal.is_admin());
    }

    #[rstest]
    #[case("user", Role::User)]
    #[case("admin", Role::Admin)]
    fn role_round_trips_through_str(#[case] raw: &str, #[case] role: Role) {
        assert_eq!(raw.parse::<Role>().expect("parse role"), role);
        assert_eq!(role.to_string(), raw);
    }
}
