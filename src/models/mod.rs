//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod session;
pub mod user;

pub use session::*;
pub use user::*;
