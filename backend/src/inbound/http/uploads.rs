//! Image upload HTTP handlers.
//!
//! ```text
//! POST   /api/uploads
//! GET    /api/uploads
//! PUT    /api/uploads/{id}/approve
//! DELETE /api/uploads/{id}
//! ```
//!
//! Submissions arrive as `multipart/form-data` with an `image` file field and
//! an optional `description` text field.

use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse};
use futures_util::StreamExt;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{UploadListItem, UploadRewardRequest};
use crate::domain::{DomainError, ImagePayload, MAX_IMAGE_BYTES};
use crate::inbound::http::auth::{AdminUser, AuthenticatedUser};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Response for an accepted submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub upload_id: String,
    pub points_earned: i32,
    pub total_points: i64,
    pub image_url: String,
}

/// One submission in the admin listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadItem {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub approved: bool,
    pub created_at: String,
}

impl From<UploadListItem> for UploadItem {
    fn from(item: UploadListItem) -> Self {
        Self {
            id: item.upload.id.to_string(),
            user_id: item.upload.user_id.to_string(),
            username: item.username,
            image_url: item.upload.image_url,
            description: item.upload.description,
            approved: item.upload.approved,
            created_at: item.upload.created_at.to_rfc3339(),
        }
    }
}

struct Submission {
    image: ImagePayload,
    description: Option<String>,
}

fn map_multipart_error(error: actix_multipart::MultipartError) -> DomainError {
    DomainError::invalid_request(format!("malformed multipart payload: {error}"))
}

/// Buffer the `image` and `description` fields out of a multipart stream.
///
/// The image buffer is capped just past the size limit; once it overflows we
/// stop reading so an oversize upload cannot exhaust memory, and downstream
/// validation rejects it.
async fn read_submission(mut payload: Multipart) -> Result<Submission, DomainError> {
    let mut image: Option<ImagePayload> = None;
    let mut description: Option<String> = None;

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(map_multipart_error)?;
        match field.name() {
            Some("image") => {
                let content_type = field.content_type().map(ToString::to_string);
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(map_multipart_error)?;
                    bytes.extend_from_slice(&chunk);
                    if bytes.len() > MAX_IMAGE_BYTES {
                        break;
                    }
                }
                image = Some(ImagePayload {
                    content_type,
                    bytes,
                });
            }
            Some("description") => {
                let mut text = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(map_multipart_error)?;
                    text.extend_from_slice(&chunk);
                }
                let text = String::from_utf8(text).map_err(|_| {
                    DomainError::invalid_request("description must be valid UTF-8")
                })?;
                if !text.trim().is_empty() {
                    description = Some(text);
                }
            }
            _ => {
                // Drain unknown fields so the stream stays consumable.
                while let Some(chunk) = field.next().await {
                    chunk.map_err(map_multipart_error)?;
                }
            }
        }
    }

    let image = image.ok_or_else(|| DomainError::invalid_request("No image file provided"))?;
    Ok(Submission { image, description })
}

/// Submit an image and earn the fixed reward.
#[utoipa::path(
    post,
    path = "/api/uploads",
    responses(
        (status = 201, description = "Upload recorded and reward credited", body = UploadResponse),
        (status = 400, description = "Invalid upload", body = DomainError),
        (status = 401, description = "Unauthorised", body = DomainError),
        (status = 503, description = "Upload store unavailable", body = DomainError)
    ),
    tags = ["uploads"],
    operation_id = "submitUpload"
)]
#[post("/uploads")]
pub async fn submit(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let submission = read_submission(payload).await?;
    let outcome = state
        .upload_reward
        .reward(UploadRewardRequest {
            user_id: user.0.id,
            image: submission.image,
            description: submission.description,
        })
        .await?;
    Ok(HttpResponse::Created().json(UploadResponse {
        message: "Upload successful".to_owned(),
        upload_id: outcome.upload_id.to_string(),
        points_earned: outcome.points_earned,
        total_points: outcome.total_points,
        image_url: outcome.image_url,
    }))
}

/// List all submissions.
#[utoipa::path(
    get,
    path = "/api/uploads",
    responses(
        (status = 200, description = "All uploads, newest first", body = [UploadItem]),
        (status = 401, description = "Unauthorised", body = DomainError)
    ),
    tags = ["uploads"],
    operation_id = "listUploads"
)]
#[get("/uploads")]
pub async fn list(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<UploadItem>>> {
    let uploads = state.upload_admin.list().await?;
    Ok(web::Json(uploads.into_iter().map(UploadItem::from).collect()))
}

/// Approve a submission (admin only).
#[utoipa::path(
    put,
    path = "/api/uploads/{id}/approve",
    params(("id" = Uuid, Path, description = "Upload identifier")),
    responses(
        (status = 200, description = "Upload approved"),
        (status = 401, description = "Unauthorised", body = DomainError),
        (status = 403, description = "Admin access required", body = DomainError),
        (status = 404, description = "Upload not found", body = DomainError)
    ),
    tags = ["uploads"],
    operation_id = "approveUpload"
)]
#[put("/uploads/{id}/approve")]
pub async fn approve(
    state: web::Data<HttpState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.upload_admin.approve(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Upload approved" })))
}

/// Delete a submission and its stored image (admin only).
#[utoipa::path(
    delete,
    path = "/api/uploads/{id}",
    params(("id" = Uuid, Path, description = "Upload identifier")),
    responses(
        (status = 200, description = "Upload deleted"),
        (status = 401, description = "Unauthorised", body = DomainError),
        (status = 403, description = "Admin access required", body = DomainError),
        (status = 404, description = "Upload not found", body = DomainError)
    ),
    tags = ["uploads"],
    operation_id = "deleteUpload"
)]
#[delete("/uploads/{id}")]
pub async fn delete(
    state: web::Data<HttpState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.upload_admin.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Upload deleted" })))
}

#[cfg(test)]
mod tests {
    //! Handler-level coverage through an in-memory Actix app.
    use super::*;
    use crate::domain::ports::{
        MockLoginService, MockPointsQuery, MockStatsQuery, MockUploadAdmin, MockUploadReward,
        MockUserProfileQuery, MockVoucherAdmin, MockVoucherRedemption, UploadRewardOutcome,
    };
    use crate::domain::{Principal, Role, Upload, UPLOAD_REWARD_POINTS};
    use actix_web::http::{header, StatusCode};
    use actix_web::{test as actix_test, App};
    use chrono::Utc;
    use serde_json::Value;
    use std::sync::Arc;

    const SECRET: &[u8] = b"test-secret";
    const BOUNDARY: &str = "----foodflow-test-boundary";

    fn state_with(
        upload_reward: MockUploadReward,
        upload_admin: MockUploadAdmin,
    ) -> HttpState {
        HttpState::new(
            crate::inbound::http::state::HttpStatePorts {
                login: Arc::new(MockLoginService::new()),
                profile: Arc::new(MockUserProfileQuery::new()),
                points: Arc::new(MockPointsQuery::new()),
                redemption: Arc::new(MockVoucherRedemption::new()),
                voucher_admin: Arc::new(MockVoucherAdmin::new()),
                upload_reward: Arc::new(upload_reward),
                upload_admin: Arc::new(upload_admin),
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

    fn multipart_body(
        content_type: Option<&str>,
        image_bytes: &[u8],
        description: Option<&str>,
    ) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"image\"; filename=\"photo\"\r\n",
        );
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(image_bytes);
        body.extend_from_slice(b"\r\n");
        if let Some(description) = description {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(b"Content-Disposition: form-data; name=\"description\"\r\n\r\n");
            body.extend_from_slice(description.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    macro_rules! test_app {
        ($state:expr) => {
            actix_test::init_service(
                App::new().app_data(web::Data::new($state)).service(
                    web::scope("/api")
                        .service(submit)
                        .service(list)
                        .service(approve)
                        .service(delete),
                ),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn a_valid_submission_returns_the_reward_receipt() {
        let upload_id = Uuid::new_v4();
        let mut reward = MockUploadReward::new();
        reward.expect_reward().returning(move |request| {
            assert_eq!(
                request.image.content_type.as_deref(),
                Some("image/png")
            );
            assert_eq!(request.description.as_deref(), Some("Lunch special"));
            Ok(UploadRewardOutcome {
                upload_id,
                points_earned: UPLOAD_REWARD_POINTS,
                total_points: 35,
                image_url: "/uploads/a.png".to_owned(),
            })
        });
        let state = state_with(reward, MockUploadAdmin::new());
        let bearer = bearer_for(&state, Role::User);
        let app = test_app!(state);

        let request = actix_test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header((header::AUTHORIZATION, bearer))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(
                Some("image/png"),
                &[0u8; 64],
                Some("Lunch special"),
            ))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Upload successful");
        assert_eq!(body["upload_id"], upload_id.to_string());
        assert_eq!(body["points_earned"], UPLOAD_REWARD_POINTS);
        assert_eq!(body["total_points"], 35);
        assert_eq!(body["image_url"], "/uploads/a.png");
        assert!(body.get("uploadId").is_none(), "keys are snake_case");
    }

    #[actix_web::test]
    async fn a_payload_without_an_image_field_is_rejected() {
        // No expectation on the reward mock: a service call would panic.
        let state = state_with(MockUploadReward::new(), MockUploadAdmin::new());
        let bearer = bearer_for(&state, Role::User);
        let app = test_app!(state);

        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"description\"\r\n\r\n");
        body.extend_from_slice(b"no picture attached\r\n");
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        let request = actix_test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header((header::AUTHORIZATION, bearer))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "No image file provided");
    }

    #[actix_web::test]
    async fn submissions_require_a_credential() {
        let state = state_with(MockUploadReward::new(), MockUploadAdmin::new());
        let app = test_app!(state);

        let request = actix_test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(Some("image/png"), &[0u8; 16], None))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn listing_returns_submissions_with_usernames() {
        let mut admin = MockUploadAdmin::new();
        admin.expect_list().returning(|| {
            Ok(vec![UploadListItem {
                upload: Upload {
                    id: Uuid::new_v4(),
                    user_id: Uuid::new_v4(),
                    image_url: "/uploads/a.png".to_owned(),
                    description: None,
                    approved: true,
                    created_at: Utc::now(),
                },
                username: "dewi".to_owned(),
            }])
        });
        let state = state_with(MockUploadReward::new(), admin);
        let bearer = bearer_for(&state, Role::User);
        let app = test_app!(state);

        let request = actix_test::TestRequest::get()
            .uri("/api/uploads")
            .insert_header((header::AUTHORIZATION, bearer))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body[0]["username"], "dewi");
        assert_eq!(body[0]["approved"], true);
    }

    #[actix_web::test]
    async fn deleting_an_unknown_upload_is_not_found() {
        let mut admin = MockUploadAdmin::new();
        admin
            .expect_delete()
            .returning(|_| Err(DomainError::not_found("Upload not found")));
        let state = state_with(MockUploadReward::new(), admin);
        let bearer = bearer_for(&state, Role::Admin);
        let app = test_app!(state);

        let request = actix_test::TestRequest::delete()
            .uri(&format!("/api/uploads/{}", Uuid::new_v4()))
            .insert_header((header::AUTHORIZATION, bearer))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn moderation_requires_the_admin_role() {
        let state = state_with(MockUploadReward::new(), MockUploadAdmin::new());
        let bearer = bearer_for(&state, Role::User);
        let app = test_app!(state);

        let request = actix_test::TestRequest::put()
            .uri(&format!("/api/uploads/{}/approve", Uuid::new_v4()))
            .insert_header((header::AUTHORIZATION, bearer))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
