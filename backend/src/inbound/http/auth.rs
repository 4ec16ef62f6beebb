//! Bearer-credential extraction for HTTP handlers.
//!
//! Handlers declare [`AuthenticatedUser`] or [`AdminUser`] parameters and
//! receive the verified [`Principal`]; extraction failures surface as the
//! usual JSON error responses.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};

use crate::domain::{DomainError, Principal};
use crate::inbound::http::state::HttpState;

/// A request principal verified from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

/// A verified principal that additionally carries the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Principal);

fn missing_credential() -> DomainError {
    DomainError::unauthorized("missing bearer credential")
}

fn principal_from_request(req: &HttpRequest) -> Result<Principal, DomainError> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| DomainError::internal("HTTP state not configured"))?;
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(missing_credential)?;
    let value = header.to_str().map_err(|_| missing_credential())?;
    let token = value.strip_prefix("Bearer ").ok_or_else(missing_credential)?;
    state.token_verifier.verify(token)
}

impl FromRequest for AuthenticatedUser {
    type Error = DomainError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(principal_from_request(req).map(Self))
    }
}

impl FromRequest for AdminUser {
    type Error = DomainError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(principal_from_request(req).and_then(|principal| {
            if principal.is_admin() {
                Ok(Self(principal))
            } else {
                Err(DomainError::forbidden("Admin access required"))
            }
        }))
    }
}
