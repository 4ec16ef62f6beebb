//! Voucher HTTP handlers.
//!
//! ```text
//! POST /api/vouchers/redeem
//! POST /api/vouchers
//! GET  /api/vouchers
//! ```

use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DomainError, Voucher, VoucherBatchRequest, VoucherType};
use crate::inbound::http::auth::{AdminUser, AuthenticatedUser};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Redemption request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RedeemRequest {
    /// Voucher code, e.g. `FF-A1B2C3`.
    pub code: String,
}

/// Redemption response.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedeemResponse {
    pub message: String,
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
    pub value: i32,
}

/// Batch-generation request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct GenerateVouchersRequest {
    #[serde(rename = "type")]
    pub voucher_type: String,
    pub value: i32,
    pub quantity: i64,
    pub brand: String,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

/// Batch-generation response.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateVouchersResponse {
    pub message: String,
    pub codes: Vec<String>,
}

/// One voucher in the admin listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoucherItem {
    pub id: String,
    pub code: String,
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
    pub value: i32,
    pub brand: String,
    pub used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    pub created_at: String,
}

impl From<Voucher> for VoucherItem {
    fn from(voucher: Voucher) -> Self {
        Self {
            id: voucher.id.to_string(),
            code: voucher.code,
            voucher_type: voucher.voucher_type,
            value: voucher.value,
            brand: voucher.brand,
            used: voucher.used,
            used_by: voucher.used_by,
            expiry: voucher.expiry.map(|t| t.to_rfc3339()),
            created_at: voucher.created_at.to_rfc3339(),
        }
    }
}

/// Redeem a voucher code on behalf of the authenticated user.
#[utoipa::path(
    post,
    path = "/api/vouchers/redeem",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Voucher consumed and effect applied", body = RedeemResponse),
        (status = 400, description = "Invalid or used voucher", body = DomainError),
        (status = 401, description = "Unauthorised", body = DomainError),
        (status = 503, description = "Voucher store unavailable", body = DomainError)
    ),
    tags = ["vouchers"],
    operation_id = "redeemVoucher"
)]
#[post("/vouchers/redeem")]
pub async fn redeem(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<RedeemRequest>,
) -> ApiResult<web::Json<RedeemResponse>> {
    let outcome = state.redemption.redeem(user.0.id, &payload.code).await?;
    Ok(web::Json(RedeemResponse {
        message: "Voucher redeemed successfully".to_owned(),
        voucher_type: outcome.voucher_type,
        value: outcome.value,
    }))
}

/// Generate a batch of vouchers (admin only).
#[utoipa::path(
    post,
    path = "/api/vouchers",
    request_body = GenerateVouchersRequest,
    responses(
        (status = 201, description = "Batch generated", body = GenerateVouchersResponse),
        (status = 400, description = "Invalid request", body = DomainError),
        (status = 401, description = "Unauthorised", body = DomainError),
        (status = 403, description = "Admin access required", body = DomainError)
    ),
    tags = ["vouchers"],
    operation_id = "generateVouchers"
)]
#[post("/vouchers")]
pub async fn generate(
    state: web::Data<HttpState>,
    _admin: AdminUser,
    payload: web::Json<GenerateVouchersRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let request = VoucherBatchRequest::try_new(
        &payload.voucher_type,
        payload.value,
        payload.quantity,
        &payload.brand,
        payload.expiry,
    )?;
    let codes = state.voucher_admin.generate(request).await?;
    Ok(HttpResponse::Created().json(GenerateVouchersResponse {
        message: format!("{} vouchers generated", codes.len()),
        codes,
    }))
}

/// List all vouchers (admin only).
#[utoipa::path(
    get,
    path = "/api/vouchers",
    responses(
        (status = 200, description = "All vouchers, newest first", body = [VoucherItem]),
        (status = 401, description = "Unauthorised", body = DomainError),
        (status = 403, description = "Admin access required", body = DomainError)
    ),
    tags = ["vouchers"],
    operation_id = "listVouchers"
)]
#[get("/vouchers")]
pub async fn list(
    state: web::Data<HttpState>,
    _admin: AdminUser,
) -> ApiResult<web::Json<Vec<VoucherItem>>> {
    let vouchers = state.voucher_admin.list().await?;
    Ok(web::Json(
        vouchers.into_iter().map(VoucherItem::from).collect(),
    ))
}

#[cfg(test)]
mod tests {
    //! Handler-level coverage through an in-memory Actix app.
    use super::*;
    use crate::domain::ports::{
        MockLoginService, MockPointsQuery, MockStatsQuery, MockUploadAdmin, MockUploadReward,
        MockUserProfileQuery, MockVoucherAdmin, MockVoucherRedemption, RedemptionOutcome,
    };
    use crate::domain::{Principal, Role};
    use crate::inbound::http::state::HttpStatePorts;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test as actix_test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use uuid::Uuid;

    const SECRET: &[u8] = b"test-secret";

    fn state_with(
        redemption: MockVoucherRedemption,
        voucher_admin: MockVoucherAdmin,
    ) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                login: Arc::new(MockLoginService::new()),
                profile: Arc::new(MockUserProfileQuery::new()),
                points: Arc::new(MockPointsQuery::new()),
                redemption: Arc::new(redemption),
                voucher_admin: Arc::new(voucher_admin),
                upload_reward: Arc::new(MockUploadReward::new()),
                upload_admin: Arc::new(MockUploadAdmin::new()),
                stats: Arc::new(MockStatsQuery::new()),
            },
            SECRET,
        )
    }

    fn bearer_for(state: &HttpState, role: Role) -> String {
        let token = state
            .token_signer
            .issue(&Principal {
                id: Uuid::new_v4(),
                username: "dewi".to_owned(),
                role,
            })
            .expect("issue token");
        format!("Bearer {token}")
    }

    macro_rules! test_app {
        ($state:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .service(web::scope("/api").service(redeem).service(generate).service(list)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn redeeming_returns_the_voucher_effect() {
        let mut redemption = MockVoucherRedemption::new();
        redemption.expect_redeem().returning(|_, _| {
            Ok(RedemptionOutcome {
                voucher_type: VoucherType::Points,
                value: 50,
            })
        });
        let state = state_with(redemption, MockVoucherAdmin::new());
        let bearer = bearer_for(&state, Role::User);
        let app = test_app!(state);

        let request = actix_test::TestRequest::post()
            .uri("/api/vouchers/redeem")
            .insert_header((header::AUTHORIZATION, bearer))
            .set_json(json!({ "code": "FF-ABC123" }))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Voucher redeemed successfully");
        assert_eq!(body["type"], "points");
        assert_eq!(body["value"], 50);
    }

    #[actix_web::test]
    async fn invalid_vouchers_map_to_bad_request() {
        let mut redemption = MockVoucherRedemption::new();
        redemption
            .expect_redeem()
            .returning(|_, _| Err(DomainError::invalid_request("Invalid or used voucher")));
        let state = state_with(redemption, MockVoucherAdmin::new());
        let bearer = bearer_for(&state, Role::User);
        let app = test_app!(state);

        let request = actix_test::TestRequest::post()
            .uri("/api/vouchers/redeem")
            .insert_header((header::AUTHORIZATION, bearer))
            .set_json(json!({ "code": "FF-USED00" }))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Invalid or used voucher");
    }

    #[actix_web::test]
    async fn generation_requires_the_admin_role() {
        let state = state_with(MockVoucherRedemption::new(), MockVoucherAdmin::new());
        let bearer = bearer_for(&state, Role::User);
        let app = test_app!(state);

        let request = actix_test::TestRequest::post()
            .uri("/api/vouchers")
            .insert_header((header::AUTHORIZATION, bearer))
            .set_json(json!({ "type": "points", "value": 50, "quantity": 5, "brand": "KopiKita" }))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn generation_returns_the_created_codes() {
        let mut voucher_admin = MockVoucherAdmin::new();
        voucher_admin.expect_generate().returning(|request| {
            Ok((0..request.quantity)
                .map(|i| format!("FF-CODE{i:02}"))
                .collect())
        });
        let state = state_with(MockVoucherRedemption::new(), voucher_admin);
        let bearer = bearer_for(&state, Role::Admin);
        let app = test_app!(state);

        let request = actix_test::TestRequest::post()
            .uri("/api/vouchers")
            .insert_header((header::AUTHORIZATION, bearer))
            .set_json(json!({ "type": "points", "value": 50, "quantity": 3, "brand": "KopiKita" }))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "3 vouchers generated");
        assert_eq!(body["codes"].as_array().map(Vec::len), Some(3));
    }

    #[actix_web::test]
    async fn missing_brand_is_rejected_before_the_service_runs() {
        // No expectation on the admin mock: a service call would panic.
        let state = state_with(MockVoucherRedemption::new(), MockVoucherAdmin::new());
        let bearer = bearer_for(&state, Role::Admin);
        let app = test_app!(state);

        let request = actix_test::TestRequest::post()
            .uri("/api/vouchers")
            .insert_header((header::AUTHORIZATION, bearer))
            .set_json(json!({ "type": "points", "value": 50, "quantity": 5, "brand": "  " }))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Brand is required");
    }
}
