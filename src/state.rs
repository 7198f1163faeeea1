//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use chrono::Duration;

use crate::{
    config::Config,
    db::{MemorySessionStore, MemoryUserStore, SessionStore, UserStore},
    error::AppResult,
    services::{AccountService, LogMailer, Mailer, PasswordHasher, TokenService},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Credential store
    users: Arc<dyn UserStore>,

    /// Session token service
    tokens: TokenService,

    /// Account lifecycle operations
    accounts: AccountService,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Wire services over the given stores
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        mailer: Arc<dyn Mailer>,
    ) -> AppResult<Self> {
        let hasher = PasswordHasher::from_config(&config.auth)?;
        Ok(Self::with_hasher(config, users, sessions, mailer, hasher))
    }

    /// Like `new` but with an explicit hasher (tests use cheap Argon2 costs)
    pub fn with_hasher(
        config: Config,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        mailer: Arc<dyn Mailer>,
        hasher: PasswordHasher,
    ) -> Self {
        let tokens = TokenService::new(sessions, Duration::hours(config.auth.session_ttl_hours));
        let accounts = AccountService::new(
            users.clone(),
            tokens.clone(),
            hasher,
            mailer,
            &config.auth,
        );

        Self {
            inner: Arc::new(AppStateInner {
                users,
                tokens,
                accounts,
                config,
            }),
        }
    }

    /// State backed by process-local stores and the logging mailer
    pub fn in_memory(config: Config) -> AppResult<Self> {
        Self::new(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemorySessionStore::new()),
            Arc::new(LogMailer),
        )
    }

    /// Get a reference to the credential store
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.inner.users
    }

    /// Get a reference to the token service
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get a reference to the account service
    pub fn accounts(&self) -> &AccountService {
        &self.inner.accounts
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
