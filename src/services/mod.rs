//! Business logic services

pub mod account_service;
pub mod locks;
pub mod mailer;
pub mod password;
pub mod token_service;

pub use account_service::{AccountService, SignupInput};
pub use mailer::{LogMailer, Mailer};
pub use password::PasswordHasher;
pub use token_service::TokenService;
