//! User identity and registration validation.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{DomainError, Role};

/// A registered member.
///
/// The points balance is mutable only through ledger operations executed by
/// the persistence layer; the domain treats it as a read-model value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Display name.
    pub fullname: String,
    /// Unique contact address.
    pub email: String,
    /// Access role.
    pub role: Role,
    /// Current point balance; equals the sum of the user's ledger deltas.
    pub points: i64,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Display name.
    pub fullname: String,
    /// Contact address.
    pub email: String,
    /// Login name.
    pub username: String,
    /// Clear-text password, hashed by the persistence adapter.
    pub password: String,
}

impl Registration {
    /// Validate raw registration fields.
    ///
    /// All fields are required and the email must have a plausible
    /// `local@domain.tld` shape.
    pub fn try_from_parts(
        fullname: &str,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, DomainError> {
        for (field, value) in [
            ("fullname", fullname),
            ("email", email),
            ("username", username),
            ("password", password),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::invalid_request("all fields are required")
                    .with_details(json!({ "field": field })));
            }
        }
        if !email_is_plausible(email) {
            return Err(DomainError::invalid_request("invalid email format")
                .with_details(json!({ "field": "email" })));
        }
        Ok(Self {
            fullname: fullname.trim().to_owned(),
            email: email.trim().to_owned(),
            username: username.trim().to_owned(),
            password: password.to_owned(),
        })
    }
}

fn email_is_plausible(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .split_once('.')
        .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty())
        && !email.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for registration validation.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn valid_registration_trims_fields() {
        let reg = Registration::try_from_parts(" Dewi ", "dewi@example.com", " dewi ", "s3cret")
            .expect("valid registration");
        assert_eq!(reg.fullname, "Dewi");
        assert_eq!(reg.username, "dewi");
    }

    #[rstest]
    #[case("", "dewi@example.com", "dewi", "pw", "fullname")]
    #[case("Dewi", "", "dewi", "pw", "email")]
    #[case("Dewi", "dewi@example.com", "", "pw", "username")]
    #[case("Dewi", "dewi@example.com", "dewi", "", "password")]
    fn missing_fields_are_rejected(
        #[case] fullname: &str,
        #[case] email: &str,
        #[case] username: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let err = Registration::try_from_parts(fullname, email, username, password)
            .expect_err("missing field must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details present");
        assert_eq!(details["field"], field);
    }

    #[rstest]
    #[case("no-at-sign.example.com")]
    #[case("@example.com")]
    #[case("dewi@")]
    #[case("dewi@nodot")]
    #[case("dewi@.com")]
    #[case("dewi@example.")]
    #[case("de wi@example.com")]
    fn bad_email_shapes_are_rejected(#[case] email: &str) {
        let err = Registration::try_from_parts("Dewi", email, "dewi", "pw")
            .expect_err("bad email must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "invalid email format");
    }
}
