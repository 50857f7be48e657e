//! Centralized default constants for notekeeper.
//!
//! The server configuration, the storage pool and the tests all read their
//! fallbacks from here instead of repeating literals.

// =============================================================================
// TOKENS
// =============================================================================

/// Token lifetime in seconds when `JWT_EXPIRATION_SECS` is not set.
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

// =============================================================================
// SERVER
// =============================================================================

/// Listen host.
pub const HOST: &str = "0.0.0.0";

/// Listen port.
pub const PORT: u16 = 8080;

/// Maximum accepted request body in bytes.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// DATABASE
// =============================================================================

/// Database URL when `DATABASE_URL` is not set.
pub const DATABASE_URL: &str = "postgres://localhost/notekeeper";

/// Connection pool size.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Pool acquire timeout in seconds.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Idle connection timeout in seconds.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;

// =============================================================================
// LOGGING
// =============================================================================

/// Env filter used when `RUST_LOG` is not set.
pub const LOG_FILTER: &str = "notekeeper_api=debug,notekeeper_core=info,tower_http=debug";
