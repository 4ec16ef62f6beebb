//! Domain ports and supporting types for the hexagonal boundary.

mod image_store;
mod login_service;
mod points_query;
mod stats_query;
mod upload_admin;
mod upload_repository;
mod upload_reward;
mod user_profile_query;
mod voucher_admin;
mod voucher_redemption;
mod voucher_repository;

#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{FixtureImageStore, ImageStore, ImageStoreError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FixtureLoginService, LoginService};
#[cfg(test)]
pub use points_query::MockPointsQuery;
pub use points_query::{PointsQuery, PointsQueryError};
#[cfg(test)]
pub use stats_query::MockStatsQuery;
pub use stats_query::{AdminStats, StatsQuery};
#[cfg(test)]
pub use upload_admin::MockUploadAdmin;
pub use upload_admin::UploadAdmin;
#[cfg(test)]
pub use upload_repository::MockUploadRepository;
pub use upload_repository::{
    FixtureUploadRepository, UploadListItem, UploadReceipt, UploadRepository,
    UploadRepositoryError,
};
#[cfg(test)]
pub use upload_reward::MockUploadReward;
pub use upload_reward::{UploadReward, UploadRewardOutcome, UploadRewardRequest};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use voucher_admin::MockVoucherAdmin;
pub use voucher_admin::VoucherAdmin;
#[cfg(test)]
pub use voucher_redemption::MockVoucherRedemption;
pub use voucher_redemption::{RedemptionOutcome, VoucherRedemption};
#[cfg(test)]
pub use voucher_repository::MockVoucherRepository;
pub use voucher_repository::{
    FixtureVoucherRepository, RedeemedVoucher, VoucherRepository, VoucherRepositoryError,
};
