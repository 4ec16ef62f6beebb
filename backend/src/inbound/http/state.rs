//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, PointsQuery, StatsQuery, UploadAdmin, UploadReward, UserProfileQuery,
    VoucherAdmin, VoucherRedemption,
};
use crate::domain::{TokenSigner, TokenVerifier};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub points: Arc<dyn PointsQuery>,
    pub redemption: Arc<dyn VoucherRedemption>,
    pub voucher_admin: Arc<dyn VoucherAdmin>,
    pub upload_reward: Arc<dyn UploadReward>,
    pub upload_admin: Arc<dyn UploadAdmin>,
    pub stats: Arc<dyn StatsQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub points: Arc<dyn PointsQuery>,
    pub redemption: Arc<dyn VoucherRedemption>,
    pub voucher_admin: Arc<dyn VoucherAdmin>,
    pub upload_reward: Arc<dyn UploadReward>,
    pub upload_admin: Arc<dyn UploadAdmin>,
    pub stats: Arc<dyn StatsQuery>,
    pub token_signer: TokenSigner,
    pub token_verifier: TokenVerifier,
}

impl HttpState {
    /// Construct state from a ports bundle and the shared credential secret.
    #[must_use]
    pub fn new(ports: HttpStatePorts, secret: &[u8]) -> Self {
        let HttpStatePorts {
            login,
            profile,
            points,
            redemption,
            voucher_admin,
            upload_reward,
            upload_admin,
            stats,
        } = ports;
        Self {
            login,
            profile,
            points,
            redemption,
            voucher_admin,
            upload_reward,
            upload_admin,
            stats,
            token_signer: TokenSigner::new(secret),
            token_verifier: TokenVerifier::new(secret),
        }
    }
}
