//! Administrative statistics handler.
//!
//! ```text
//! GET /api/admin/stats
//! ```

use actix_web::{get, web};

use crate::domain::ports::AdminStats;
use crate::domain::DomainError;
use crate::inbound::http::auth::AdminUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Fetch the dashboard counters (admin only).
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Aggregate counters", body = AdminStats),
        (status = 401, description = "Unauthorised", body = DomainError),
        (status = 403, description = "Admin access required", body = DomainError)
    ),
    tags = ["admin"],
    operation_id = "getAdminStats"
)]
#[get("/admin/stats")]
pub async fn stats(
    state: web::Data<HttpState>,
    _admin: AdminUser,
) -> ApiResult<web::Json<AdminStats>> {
    Ok(web::Json(state.stats.fetch().await?))
}
