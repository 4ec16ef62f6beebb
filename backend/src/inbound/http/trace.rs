//! Tracing middleware attaching a request-scoped identifier.
//!
//! Each incoming request is handled inside a tracing span carrying a UUID
//! `request_id`, and the same identifier is echoed back in an
//! `X-Request-Id` response header so client reports can be matched to
//! server logs.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::Error;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::{info_span, Instrument as _};
use uuid::Uuid;

/// Middleware factory for request-scoped tracing.
#[derive(Clone, Copy)]
pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`RequestTrace`].
pub struct RequestTraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "http_request",
            method = %req.method(),
            path = %req.path(),
            request_id = %request_id,
        );
        let fut = self.service.call(req);

        Box::pin(
            async move {
                let mut res = fut.await?;
                if let Ok(value) = HeaderValue::from_str(&request_id) {
                    res.headers_mut()
                        .insert(HeaderName::from_static("x-request-id"), value);
                }
                Ok(res)
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    //! The middleware must stamp every response with a request identifier.
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};

    #[actix_web::test]
    async fn responses_carry_a_request_id_header() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTrace)
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        let header = res
            .headers()
            .get("x-request-id")
            .expect("request id header present");
        let raw = header.to_str().expect("header is ASCII");
        Uuid::parse_str(raw).expect("header is a UUID");
    }

    #[actix_web::test]
    async fn each_request_gets_a_distinct_id() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTrace)
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let first =
            test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        let second =
            test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;

        assert_ne!(
            first.headers().get("x-request-id"),
            second.headers().get("x-request-id")
        );
    }
}
