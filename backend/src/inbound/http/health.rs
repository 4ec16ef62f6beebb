//! Orchestration probes tied to the server's startup lifecycle.
//!
//! The process moves through three phases: `Starting` while migrations run
//! and the pool is built, `Serving` once traffic can be handled, and
//! `Draining` during shutdown. Readiness reports 200 only in `Serving`;
//! liveness reports 200 until `Draining`.

use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{get, http::header, web, HttpResponse};

const STARTING: u8 = 0;
const SERVING: u8 = 1;
const DRAINING: u8 = 2;

/// Shared lifecycle phase backing the two probe endpoints.
#[derive(Default)]
pub struct HealthState {
    phase: AtomicU8,
}

impl HealthState {
    /// Create a state in the `Starting` phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `Serving`. Called once migrations have run and the pool is up.
    pub fn mark_ready(&self) {
        self.phase.store(SERVING, Ordering::Release);
    }

    /// Enter `Draining` so liveness fails ahead of graceful shutdown.
    pub fn begin_drain(&self) {
        self.phase.store(DRAINING, Ordering::Release);
    }

    /// Whether the server accepts traffic.
    pub fn is_ready(&self) -> bool {
        self.phase.load(Ordering::Acquire) == SERVING
    }

    /// Whether the process should stay scheduled.
    pub fn is_alive(&self) -> bool {
        self.phase.load(Ordering::Acquire) != DRAINING
    }
}

fn probe(ok: bool) -> HttpResponse {
    let mut response = if ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    // Probe results must never be cached by intermediaries.
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Readiness probe: 200 once the pool and migrations are initialised.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe(state.is_ready())
}

/// Liveness probe: 200 until the process begins draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe(state.is_alive())
}

#[cfg(test)]
mod tests {
    //! Probe responses across the three lifecycle phases.
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};

    async fn probe_status(state: &web::Data<HealthState>, path: &str) -> StatusCode {
        let app = actix_test::init_service(
            App::new()
                .app_data(state.clone())
                .service(ready)
                .service(live),
        )
        .await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(path).to_request(),
        )
        .await;
        response.status()
    }

    #[actix_web::test]
    async fn a_starting_server_is_live_but_not_ready() {
        let state = web::Data::new(HealthState::new());
        assert_eq!(
            probe_status(&state, "/health/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(probe_status(&state, "/health/live").await, StatusCode::OK);
    }

    #[actix_web::test]
    async fn a_serving_server_passes_both_probes() {
        let state = web::Data::new(HealthState::new());
        state.mark_ready();
        assert_eq!(probe_status(&state, "/health/ready").await, StatusCode::OK);
        assert_eq!(probe_status(&state, "/health/live").await, StatusCode::OK);
    }

    #[actix_web::test]
    async fn a_draining_server_fails_both_probes() {
        let state = web::Data::new(HealthState::new());
        state.mark_ready();
        state.begin_drain();
        assert_eq!(
            probe_status(&state, "/health/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            probe_status(&state, "/health/live").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
