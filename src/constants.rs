//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default versioned API prefix
pub const DEFAULT_API_VERSION: &str = "/api/v1";

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default maximum accepted request body size
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// STORAGE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// AUTHENTICATION DEFAULTS
// =============================================================================

/// Default session token lifetime in hours
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Default validation token lifetime in minutes
pub const DEFAULT_VALIDATION_TOKEN_TTL_MINUTES: i64 = 60;

/// Default interval between session sweeps
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 300;

/// Argon2 memory cost (KiB), matches `argon2::Params::DEFAULT_M_COST`
pub const DEFAULT_PASSWORD_HASH_MEMORY_KIB: u32 = 19 * 1024;

/// Argon2 iteration count, matches `argon2::Params::DEFAULT_T_COST`
pub const DEFAULT_PASSWORD_HASH_ITERATIONS: u32 = 2;

/// Length of an opaque session token
pub const SESSION_TOKEN_LENGTH: usize = 48;

/// Length of an email-verification / password-reset token
pub const VALIDATION_TOKEN_LENGTH: usize = 32;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: u64 = 1;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: u64 = 128;

/// Username minimum length
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Username maximum length
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Maximum length for names, country and telephone fields
pub const MAX_PROFILE_FIELD_LENGTH: u64 = 100;

// =============================================================================
// TOKEN TRANSPORT
// =============================================================================

/// Token transport names
pub mod transport {
    /// Scheme prefix of the canonical `Authorization` header
    pub const BEARER_PREFIX: &str = "Bearer ";

    /// Legacy header, JSON body field and query parameter name
    pub const LEGACY_TOKEN_FIELD: &str = "authToken";
}

// =============================================================================
// STORAGE KEYS
// =============================================================================

/// Redis key prefixes
pub mod redis_keys {
    /// `session:{digest}` holds a serialized session record
    pub const SESSION_PREFIX: &str = "session";

    /// `user_sessions:{user_id}` is the set of that user's session digests
    pub const USER_SESSIONS_PREFIX: &str = "user_sessions";
}

/// Postgres unique index names
pub mod constraints {
    pub const USERS_EMAIL_KEY: &str = "users_email_key";
    pub const USERS_USER_NAME_KEY: &str = "users_user_name_key";
}

// =============================================================================
// RESPONSE MESSAGES
// =============================================================================

/// Success messages carried in the response envelope
pub mod messages {
    pub const USER_ADDED: &str = "User Added";
    pub const LOGIN_SUCCESSFUL: &str = "Login Successful";
    pub const RESET_INSTRUCTIONS_SENT: &str = "Password reset instructions sent successfully";
    pub const PASSWORD_UPDATED: &str = "Password Update Successfully";
    pub const USER_UPDATED: &str = "User details Updated";
    pub const EMAIL_VERIFIED: &str = "User email verified";
    pub const USER_DELETED: &str = "Deleted the user successfully";
    pub const ALL_USERS_FOUND: &str = "All User Details Found";
    pub const USER_FOUND: &str = "User Details Found";
    pub const LOGGED_OUT: &str = "Logged Out Successfully";
    pub const HEALTHY: &str = "Service is healthy";
}
