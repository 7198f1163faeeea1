//! Utility functions

pub mod crypto;
pub mod validation;

pub use crypto::{generate_secure_token, hash_string};
pub use validation::{normalize_email, sanitize_string, validate_telephone, validate_username};
