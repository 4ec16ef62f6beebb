//! Points ledger read-model types and reward constants.
//!
//! Balance mutations happen only inside persistence transactions, paired with
//! exactly one history entry; the domain exposes the ledger as data.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Points credited for every accepted image upload.
pub const UPLOAD_REWARD_POINTS: i32 = 10;

/// Ledger description recorded for voucher redemptions.
pub const REDEMPTION_DESCRIPTION: &str = "Voucher redemption";

/// Ledger description recorded for upload rewards.
pub const UPLOAD_REWARD_DESCRIPTION: &str = "Image upload reward";

/// One append-only ledger entry.
///
/// A user's balance always equals the sum of their entry deltas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsHistoryEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// The user whose balance changed.
    pub user_id: Uuid,
    /// Signed point delta applied by this event.
    pub delta: i32,
    /// Human-readable cause, e.g. "Voucher redemption".
    pub description: String,
    /// When the change was applied.
    pub created_at: DateTime<Utc>,
}
