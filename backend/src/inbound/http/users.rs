//! Account and profile HTTP handlers.
//!
//! ```text
//! POST /api/register
//! POST /api/login
//! GET  /api/profile
//! GET  /api/points/history
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::PointsQueryError;
use crate::domain::{DomainError, Principal, Registration, Role, User};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub fullname: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User payload returned by login and profile endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub role: Role,
    pub points: i64,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            fullname: user.fullname,
            email: user.email,
            role: user.role,
            points: user.points,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Login response: the signed credential plus the authenticated user.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

/// One ledger entry in the history response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointsHistoryItem {
    pub id: String,
    pub points: i32,
    pub description: String,
    pub created_at: String,
}

/// Points balance plus the full ledger, newest first.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointsHistoryResponse {
    pub total_points: i64,
    pub history: Vec<PointsHistoryItem>,
}

fn map_points_error(error: PointsQueryError) -> DomainError {
    match error {
        PointsQueryError::Connection { message } => {
            DomainError::service_unavailable(format!("points ledger unavailable: {message}"))
        }
        PointsQueryError::Query { message } => {
            DomainError::internal(format!("points ledger error: {message}"))
        }
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Invalid request", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "register"
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let registration = Registration::try_from_parts(
        &payload.fullname,
        &payload.email,
        &payload.username,
        &payload.password,
    )?;
    state.login.register(&registration).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Registration successful"
    })))
}

/// Authenticate and receive a bearer credential.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let payload = payload.into_inner();
    let user = state
        .login
        .authenticate(&payload.username, &payload.password)
        .await?;
    let token = state.token_signer.issue(&Principal {
        id: user.id,
        username: user.username.clone(),
        role: user.role,
    })?;
    Ok(web::Json(LoginResponse {
        message: "Login successful".to_owned(),
        token,
        user: UserResponse::from(user),
    }))
}

/// Fetch the authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorised", body = DomainError),
        (status = 404, description = "User not found", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<UserResponse>> {
    let profile = state.profile.fetch(user.0.id).await?;
    Ok(web::Json(UserResponse::from(profile)))
}

/// Fetch the authenticated user's points balance and ledger.
#[utoipa::path(
    get,
    path = "/api/points/history",
    responses(
        (status = 200, description = "Balance and ledger entries", body = PointsHistoryResponse),
        (status = 401, description = "Unauthorised", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "getPointsHistory"
)]
#[get("/points/history")]
pub async fn points_history(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<PointsHistoryResponse>> {
    let user_id = user.0.id;
    let total_points = state
        .points
        .balance(user_id)
        .await
        .map_err(map_points_error)?;
    let history = state
        .points
        .history(user_id)
        .await
        .map_err(map_points_error)?;
    Ok(web::Json(PointsHistoryResponse {
        total_points,
        history: history
            .into_iter()
            .map(|entry| PointsHistoryItem {
                id: entry.id.to_string(),
                points: entry.delta,
                description: entry.description,
                created_at: entry.created_at.to_rfc3339(),
            })
            .collect(),
    }))
}
