//! Server construction and wiring.
//!
//! Assembles the Diesel-backed adapters, the filesystem blob store, and the
//! HTTP layer into a running Actix server. The binary entry point stays
//! thin: it reads configuration and calls [`create_server`].

mod config;

pub use config::{AppConfig, ConfigError};

use std::sync::Arc;

use actix_files::Files;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::{UploadRewardService, VoucherService};
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::trace::RequestTrace;
use crate::inbound::http::{admin, uploads, users, vouchers};
use crate::outbound::persistence::{
    DbPool, DieselLoginService, DieselPointsQuery, DieselStatsQuery, DieselUploadRepository,
    DieselVoucherRepository, PoolConfig, MIGRATIONS,
};
use crate::outbound::storage::FsImageStore;

/// Wire the Diesel adapters and domain services into the HTTP port bundle.
fn build_ports(pool: &DbPool, images: Arc<FsImageStore>) -> HttpStatePorts {
    let login = Arc::new(DieselLoginService::new(pool.clone()));
    let voucher_service = Arc::new(VoucherService::new(Arc::new(
        DieselVoucherRepository::new(pool.clone()),
    )));
    let upload_service = Arc::new(UploadRewardService::new(
        images,
        Arc::new(DieselUploadRepository::new(pool.clone())),
    ));

    HttpStatePorts {
        login: login.clone(),
        profile: login,
        points: Arc::new(DieselPointsQuery::new(pool.clone())),
        redemption: voucher_service.clone(),
        voucher_admin: voucher_service,
        upload_reward: upload_service.clone(),
        upload_admin: upload_service,
        stats: Arc::new(DieselStatsQuery::new(pool.clone())),
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    upload_dir: std::path::PathBuf,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        upload_dir,
    } = deps;

    let api = web::scope("/api")
        .service(users::register)
        .service(users::login)
        .service(users::profile)
        .service(users::points_history)
        .service(vouchers::redeem)
        .service(vouchers::generate)
        .service(vouchers::list)
        .service(uploads::submit)
        .service(uploads::list)
        .service(uploads::approve)
        .service(uploads::delete)
        .service(admin::stats);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(RequestTrace)
        .service(api)
        .service(Files::new("/uploads", upload_dir))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Apply pending schema migrations before the server starts serving.
async fn run_migrations(database_url: String) -> std::io::Result<()> {
    let applied = tokio::task::spawn_blocking(move || {
        use diesel::Connection as _;
        use diesel_migrations::MigrationHarness as _;

        let mut conn = diesel::PgConnection::establish(&database_url)
            .map_err(|err| std::io::Error::other(format!("connect for migrations: {err}")))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|err| std::io::Error::other(format!("run migrations: {err}")))
    })
    .await
    .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))??;

    info!(applied, "schema migrations up to date");
    Ok(())
}

/// Construct an Actix HTTP server from resolved configuration.
///
/// Runs migrations, opens the connection pool and the blob store, binds the
/// listener, and marks the health state ready once everything is wired.
///
/// # Errors
/// Propagates [`std::io::Error`] when migrations, the pool, the upload
/// directory, or the socket bind fail.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: AppConfig,
) -> std::io::Result<Server> {
    run_migrations(config.database_url.clone()).await?;

    let pool = DbPool::new(
        PoolConfig::new(&config.database_url).with_max_size(config.db_pool_size),
    )
    .await
    .map_err(|err| std::io::Error::other(err.to_string()))?;

    let images = Arc::new(
        FsImageStore::open(config.upload_dir.clone())
            .await
            .map_err(|err| std::io::Error::other(err.to_string()))?,
    );

    let http_state = web::Data::new(HttpState::new(
        build_ports(&pool, images),
        &config.jwt_secret,
    ));

    let server_health_state = health_state.clone();
    let upload_dir = config.upload_dir.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            upload_dir: upload_dir.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    info!(addr = %config.bind_addr, "listening");
    Ok(server)
}
