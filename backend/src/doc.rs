//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API: every
//! HTTP endpoint from the inbound layer plus the request and response
//! schemas they exchange. The generated document backs Swagger UI in debug
//! builds.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::AdminStats;
use crate::domain::{DomainError, ErrorCode, Role, VoucherType};
use crate::inbound::http::uploads::{UploadItem, UploadResponse};
use crate::inbound::http::users::{
    LoginRequest, LoginResponse, PointsHistoryItem, PointsHistoryResponse, RegisterRequest,
    UserResponse,
};
use crate::inbound::http::vouchers::{
    GenerateVouchersRequest, GenerateVouchersResponse, RedeemRequest, RedeemResponse, VoucherItem,
};

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "FoodFlow backend API",
        description = "HTTP interface for voucher redemption, points accrual, and image uploads."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::profile,
        crate::inbound::http::users::points_history,
        crate::inbound::http::vouchers::redeem,
        crate::inbound::http::vouchers::generate,
        crate::inbound::http::vouchers::list,
        crate::inbound::http::uploads::submit,
        crate::inbound::http::uploads::list,
        crate::inbound::http::uploads::approve,
        crate::inbound::http::uploads::delete,
        crate::inbound::http::admin::stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        DomainError,
        ErrorCode,
        Role,
        VoucherType,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        UserResponse,
        PointsHistoryItem,
        PointsHistoryResponse,
        RedeemRequest,
        RedeemResponse,
        GenerateVouchersRequest,
        GenerateVouchersResponse,
        VoucherItem,
        UploadResponse,
        UploadItem,
        AdminStats,
    )),
    tags(
        (name = "users", description = "Registration, login, and profile access"),
        (name = "vouchers", description = "Voucher redemption and administration"),
        (name = "uploads", description = "Image submissions and their rewards"),
        (name = "admin", description = "Administrative statistics"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
