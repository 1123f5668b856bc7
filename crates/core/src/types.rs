//! Shared type aliases used across crates.

/// UTC timestamp type used for all `created_at`/`updated_at` columns.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
