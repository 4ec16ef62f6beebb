//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered member accounts.
    ///
    /// `points` is the cached balance; it is only ever mutated together with a
    /// matching `points_history` insert inside one transaction.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Display name.
        fullname -> Varchar,
        /// Unique contact address.
        email -> Varchar,
        /// Argon2id password hash in PHC string format.
        password_hash -> Varchar,
        /// Access role: `user` or `admin`.
        role -> Varchar,
        /// Current point balance.
        points -> Int8,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Single-use vouchers.
    ///
    /// `code` carries a unique constraint; `used` flips to true at most once.
    vouchers (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique redemption code, e.g. `FF-A1B2C3`.
        code -> Varchar,
        /// Effect on redemption: `points` or `discount`.
        voucher_type -> Varchar,
        /// Points credited or discount percentage.
        value -> Int4,
        /// Partner brand.
        brand -> Varchar,
        /// Whether the voucher has been consumed.
        used -> Bool,
        /// Redeeming user, when consumed.
        used_by -> Nullable<Uuid>,
        /// Optional expiry timestamp.
        expiry -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only points ledger.
    points_history (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// The user whose balance changed.
        user_id -> Uuid,
        /// Signed point delta.
        points -> Int4,
        /// Human-readable cause.
        description -> Varchar,
        /// When the change was applied.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Image submissions.
    uploads (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Submitting user.
        user_id -> Uuid,
        /// Public URL path of the stored blob.
        image_url -> Varchar,
        /// Optional submitter-provided description.
        description -> Nullable<Text>,
        /// Whether an administrator approved the submission.
        approved -> Bool,
        /// Submission timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(points_history -> users (user_id));
diesel::joinable!(uploads -> users (user_id));
diesel::joinable!(vouchers -> users (used_by));

diesel::allow_tables_to_appear_in_same_query!(users, vouchers, points_history, uploads);
