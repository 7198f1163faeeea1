//! Out-of-band delivery of validation tokens
//!
//! Email delivery itself lives outside this service. `LogMailer` stands in for
//! it by recording each dispatch.

use async_trait::async_trait;
use tracing::{info, trace};

use crate::models::User;

/// Sends validation tokens to users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Email-verification link after signup
    async fn send_verification(&self, user: &User, token: &str) -> anyhow::Result<()>;

    /// Password-reset link after `resetPassword`
    async fn send_password_reset(&self, user: &User, token: &str) -> anyhow::Result<()>;
}

/// Mailer that only logs; the token itself is emitted at `trace` for local development
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, user: &User, token: &str) -> anyhow::Result<()> {
        info!(user_id = %user.id, "Dispatching email verification");
        trace!(user_id = %user.id, validation_token = %token, "Email verification token");
        Ok(())
    }

    async fn send_password_reset(&self, user: &User, token: &str) -> anyhow::Result<()> {
        info!(user_id = %user.id, "Dispatching password reset instructions");
        trace!(user_id = %user.id, validation_token = %token, "Password reset token");
        Ok(())
    }
}
