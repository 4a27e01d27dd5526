//! Diesel table definitions for the account schema.
//!
//! Must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts keyed by UUID; `email` carries a unique index.
    users (id) {
        id -> Uuid,
        /// Email with its domain part lower-cased.
        email -> Varchar,
        name -> Varchar,
        /// PHC string, or a `!`-prefixed marker for accounts without a
        /// usable password.
        password_hash -> Varchar,
        is_active -> Bool,
        is_staff -> Bool,
        is_superuser -> Bool,
        date_joined -> Timestamptz,
    }
}

diesel::table! {
    /// API tokens; at most one per user.
    auth_tokens (key) {
        /// 40 character lower-case hex key.
        key -> Varchar,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(auth_tokens, users);
