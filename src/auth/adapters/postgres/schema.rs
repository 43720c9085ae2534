//! Diesel schema for credential persistence.

diesel::table! {
    /// Principal records with their current refresh-token hash.
    principals (id) {
        /// Principal identifier.
        id -> Uuid,
        /// Unique login name.
        #[max_length = 100]
        username -> Varchar,
        /// Encoded login secret hash.
        secret_hash -> Text,
        /// Hex SHA-256 of the currently valid refresh token.
        #[max_length = 64]
        refresh_token_hash -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Soft-delete marker.
        deleted_at -> Nullable<Timestamptz>,
    }
}
