//! Account lifecycle service
//!
//! Orchestrates the credential store, password hasher, token service and
//! mailer for every user-facing operation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    constants::VALIDATION_TOKEN_LENGTH,
    db::UserStore,
    error::{AppError, AppResult},
    middleware::auth::AuthenticatedUser,
    models::{IssuedToken, NewUser, ProfileUpdate, User},
    services::{locks::UserLocks, mailer::Mailer, password::PasswordHasher, token_service::TokenService},
    utils::{generate_secure_token, hash_string, normalize_email, sanitize_string},
};

/// Everything needed to register a user
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub telephone: String,
    pub country: String,
    pub is_admin: bool,
}

/// Account service for business logic
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    hasher: PasswordHasher,
    mailer: Arc<dyn Mailer>,
    locks: Arc<UserLocks>,
    validation_ttl: Duration,
    allow_admin_signup: bool,
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: TokenService,
        hasher: PasswordHasher,
        mailer: Arc<dyn Mailer>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            mailer,
            locks: Arc::new(UserLocks::new()),
            validation_ttl: Duration::minutes(config.validation_token_ttl_minutes),
            allow_admin_signup: config.allow_admin_signup,
        }
    }

    /// Plaintext validation token plus what gets stored for it
    fn mint_validation_token(&self) -> (String, String, chrono::DateTime<Utc>) {
        let token = generate_secure_token(VALIDATION_TOKEN_LENGTH);
        let digest = hash_string(&token);
        (token, digest, Utc::now() + self.validation_ttl)
    }

    /// Register a new user and send the email-verification token
    pub async fn signup(&self, input: SignupInput) -> AppResult<User> {
        if input.is_admin && !self.allow_admin_signup {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be self-registered".to_string(),
            ));
        }

        let password_hash = self.hasher.hash_blocking(input.password).await?;
        let (token, digest, expires_at) = self.mint_validation_token();

        let user = self
            .users
            .insert(NewUser {
                first_name: sanitize_string(&input.first_name),
                last_name: sanitize_string(&input.last_name),
                user_name: input.user_name.trim().to_string(),
                email: normalize_email(&input.email),
                password_hash,
                telephone: input.telephone.trim().to_string(),
                country: sanitize_string(&input.country),
                is_admin: input.is_admin,
                validation_token_hash: Some(digest),
                validation_token_expires_at: Some(expires_at),
            })
            .await?;

        info!(user_id = %user.id, is_admin = user.is_admin, "User signed up");

        if let Err(e) = self.mailer.send_verification(&user, &token).await {
            warn!(user_id = %user.id, error = %e, "Failed to dispatch verification email");
        }

        Ok(user)
    }

    /// Verify credentials and open a new session
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(IssuedToken, User)> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            self.hasher.verify_dummy_blocking(password.to_string()).await?;
            debug!("Login failed: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        // Verify and issue under the user's lock so a concurrent password
        // change either sees this session in its revocation or invalidates
        // the hash before it is checked.
        let _guard = self.locks.lock(user.id).await;
        let Some(user) = self.users.find_by_id(&user.id).await? else {
            debug!("Login failed: user deleted mid-login");
            return Err(AppError::InvalidCredentials);
        };

        let valid = self
            .hasher
            .verify_blocking(password.to_string(), user.password_hash.clone())
            .await?;
        if !valid {
            debug!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let issued = self.tokens.issue(user.id).await?;
        info!(user_id = %user.id, "User logged in");

        Ok((issued, user))
    }

    /// Start a password reset; succeeds whether or not the email is registered
    pub async fn reset_password(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let (token, digest, expires_at) = self.mint_validation_token();
        self.users
            .set_validation_token(&user.id, &digest, expires_at)
            .await?;

        if let Err(e) = self.mailer.send_password_reset(&user, &token).await {
            warn!(user_id = %user.id, error = %e, "Failed to dispatch password reset");
        }

        Ok(())
    }

    /// Finish a password reset with the emailed validation token
    pub async fn update_password(&self, validation_token: &str, new_password: &str) -> AppResult<()> {
        let password_hash = self.hasher.hash_blocking(new_password.to_string()).await?;

        let user = self
            .users
            .consume_validation_token(&hash_string(validation_token), Utc::now())
            .await?
            .ok_or(AppError::InvalidOrExpiredToken)?;

        let _guard = self.locks.lock(user.id).await;
        self.users.set_password(&user.id, &password_hash).await?;
        self.tokens.revoke_all(&user.id, None).await?;

        info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }

    /// Change a password knowing the old one
    ///
    /// Other sessions of the user are revoked; the caller's own session
    /// survives when they change their own password.
    pub async fn change_password(
        &self,
        caller: &AuthenticatedUser,
        user_id: &Uuid,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        caller.ensure_can_manage(user_id)?;

        let _guard = self.locks.lock(*user_id).await;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(user_not_found)?;

        let valid = self
            .hasher
            .verify_blocking(old_password.to_string(), user.password_hash)
            .await?;
        if !valid {
            debug!(user_id = %user_id, "Password change rejected: old password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = self.hasher.hash_blocking(new_password.to_string()).await?;
        self.users.set_password(user_id, &password_hash).await?;

        let keep = (caller.id == *user_id).then_some(caller.token.as_str());
        self.tokens.revoke_all(user_id, keep).await?;

        info!(user_id = %user_id, changed_by = %caller.id, "Password changed");
        Ok(())
    }

    /// Partial profile edit
    pub async fn edit_user(
        &self,
        caller: &AuthenticatedUser,
        user_id: &Uuid,
        update: ProfileUpdate,
    ) -> AppResult<User> {
        caller.ensure_can_manage(user_id)?;

        if update.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        let update = ProfileUpdate {
            first_name: update.first_name.as_deref().map(sanitize_string),
            last_name: update.last_name.as_deref().map(sanitize_string),
            telephone: update.telephone.map(|t| t.trim().to_string()),
        };

        let _guard = self.locks.lock(*user_id).await;
        let user = self.users.update_profile(user_id, &update).await?;

        info!(user_id = %user_id, edited_by = %caller.id, "User details updated");
        Ok(user)
    }

    /// Soft-delete an account and revoke all its sessions
    pub async fn delete_user(&self, caller: &AuthenticatedUser, user_id: &Uuid) -> AppResult<()> {
        caller.ensure_can_manage(user_id)?;

        let _guard = self.locks.lock(*user_id).await;
        self.users.soft_delete(user_id).await?;
        self.tokens.revoke_all(user_id, None).await?;

        info!(user_id = %user_id, deleted_by = %caller.id, "User deleted");
        Ok(())
    }

    /// List every active user (admins only)
    pub async fn get_all_users(&self, caller: &AuthenticatedUser) -> AppResult<Vec<User>> {
        caller.ensure_admin()?;
        self.users.list().await
    }

    /// Get user by ID
    pub async fn get_single_user(&self, user_id: &Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(user_not_found)
    }

    /// Revoke the session presented with this request
    pub async fn logout(&self, caller: &AuthenticatedUser, user_id: &Uuid) -> AppResult<()> {
        caller.ensure_can_manage(user_id)?;

        self.tokens.revoke(&caller.token).await?;

        info!(user_id = %caller.id, "User logged out");
        Ok(())
    }

    /// Mark the email verified and drop any outstanding validation token
    pub async fn verify_email(&self, user_id: &Uuid) -> AppResult<()> {
        let _guard = self.locks.lock(*user_id).await;
        self.users.mark_email_verified(user_id).await?;

        info!(user_id = %user_id, "Email verified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MemorySessionStore, MemoryUserStore, SessionStore},
        models::SessionRecord,
        services::{mailer::MockMailer, password::test_hasher},
    };
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::Mutex;
    use std::time::Duration as StdDuration;

    /// Session store whose inserts stall, widening the gap between a login's
    /// password check and its session becoming visible
    #[derive(Default)]
    struct StallingSessionStore {
        inner: MemorySessionStore,
    }

    #[async_trait]
    impl SessionStore for StallingSessionStore {
        async fn insert(&self, digest: &str, record: SessionRecord) -> AppResult<()> {
            tokio::time::sleep(StdDuration::from_millis(300)).await;
            self.inner.insert(digest, record).await
        }

        async fn get(&self, digest: &str) -> AppResult<Option<SessionRecord>> {
            self.inner.get(digest).await
        }

        async fn revoke(&self, digest: &str, at: DateTime<Utc>) -> AppResult<bool> {
            self.inner.revoke(digest, at).await
        }

        async fn revoke_all_for_user(
            &self,
            user_id: &Uuid,
            keep: Option<&str>,
            at: DateTime<Utc>,
        ) -> AppResult<u64> {
            self.inner.revoke_all_for_user(user_id, keep, at).await
        }

        async fn purge_invalid(&self, now: DateTime<Utc>) -> AppResult<u64> {
            self.inner.purge_invalid(now).await
        }
    }

    struct Harness {
        accounts: AccountService,
        tokens: TokenService,
        users: Arc<MemoryUserStore>,
    }

    fn quiet_mailer() -> MockMailer {
        let mut mailer = MockMailer::new();
        mailer.expect_send_verification().returning(|_, _| Ok(()));
        mailer.expect_send_password_reset().returning(|_, _| Ok(()));
        mailer
    }

    fn harness_with(mailer: MockMailer, config: AuthConfig) -> Harness {
        harness_over(Arc::new(MemorySessionStore::new()), mailer, config)
    }

    fn harness_over(
        sessions: Arc<dyn SessionStore>,
        mailer: MockMailer,
        config: AuthConfig,
    ) -> Harness {
        let users = Arc::new(MemoryUserStore::new());
        let tokens = TokenService::new(sessions, Duration::hours(1));
        let accounts = AccountService::new(
            users.clone(),
            tokens.clone(),
            test_hasher(),
            Arc::new(mailer),
            &config,
        );
        Harness {
            accounts,
            tokens,
            users,
        }
    }

    fn harness() -> Harness {
        harness_with(quiet_mailer(), AuthConfig::default())
    }

    fn signup_input(email: &str, user_name: &str, password: &str) -> SignupInput {
        SignupInput {
            first_name: "Jass".into(),
            last_name: "Preet".into(),
            user_name: user_name.into(),
            email: email.into(),
            password: password.into(),
            telephone: "+91 8725838433".into(),
            country: "India".into(),
            is_admin: false,
        }
    }

    fn caller_for(user: &User, token: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            id: user.id,
            is_admin: user.is_admin,
            token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_hashes_password_and_rejects_duplicates() {
        let h = harness();
        let user = h
            .accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "p1");
        assert!(!user.email_verified);
        assert!(user.validation_token_hash.is_some());

        let err = h
            .accounts
            .signup(signup_input("A@X.com", "beta", "p2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));

        let err = h
            .accounts
            .signup(signup_input("b@x.com", "Alpha", "p2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
    }

    #[tokio::test]
    async fn test_signup_sends_verification_token() {
        let captured = Arc::new(Mutex::new(None::<String>));
        let sink = captured.clone();

        let mut mailer = MockMailer::new();
        mailer
            .expect_send_verification()
            .times(1)
            .returning(move |_, token| {
                *sink.lock().unwrap() = Some(token.to_string());
                Ok(())
            });
        let h = harness_with(mailer, AuthConfig::default());

        let user = h
            .accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();

        let token = captured.lock().unwrap().clone().unwrap();
        assert_eq!(user.validation_token_hash, Some(hash_string(&token)));
    }

    #[tokio::test]
    async fn test_signup_survives_mailer_failure() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send_verification()
            .returning(|_, _| Err(anyhow::anyhow!("smtp down")));
        let h = harness_with(mailer, AuthConfig::default());

        assert!(h
            .accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_admin_signup_can_be_disabled() {
        let config = AuthConfig {
            allow_admin_signup: false,
            ..AuthConfig::default()
        };
        let h = harness_with(quiet_mailer(), config);

        let mut input = signup_input("a@x.com", "alpha", "p1");
        input.is_admin = true;
        assert!(matches!(
            h.accounts.signup(input).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_login_issues_fresh_tokens() {
        let h = harness();
        h.accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();

        let (first, user) = h.accounts.login("a@x.com", "p1").await.unwrap();
        let (second, _) = h.accounts.login(" A@X.COM ", "p1").await.unwrap();

        assert_ne!(first.token, second.token);
        assert_eq!(h.tokens.validate(&first.token).await.unwrap(), user.id);
        assert_eq!(h.tokens.validate(&second.token).await.unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let h = harness();
        h.accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();

        let wrong_password = h.accounts.login("a@x.com", "nope").await.unwrap_err();
        let unknown_email = h.accounts.login("ghost@x.com", "p1").await.unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.status_code(), unknown_email.status_code());
    }

    #[tokio::test]
    async fn test_logout_revokes_presented_token() {
        let h = harness();
        h.accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();
        let (t1, user) = h.accounts.login("a@x.com", "p1").await.unwrap();
        let (t2, _) = h.accounts.login("a@x.com", "p1").await.unwrap();

        let caller = caller_for(&user, &t1.token);
        h.accounts.logout(&caller, &user.id).await.unwrap();

        assert!(matches!(
            h.tokens.validate(&t1.token).await,
            Err(AppError::InvalidToken)
        ));
        assert!(h.tokens.validate(&t2.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_logout_for_other_user_is_forbidden() {
        let h = harness();
        h.accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();
        let (t1, user) = h.accounts.login("a@x.com", "p1").await.unwrap();
        let caller = caller_for(&user, &t1.token);

        assert!(matches!(
            h.accounts.logout(&caller, &Uuid::new_v4()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(h.tokens.validate(&t1.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password() {
        let h = harness();
        h.accounts
            .signup(signup_input("a@x.com", "alpha", "old-pass"))
            .await
            .unwrap();
        let (current, user) = h.accounts.login("a@x.com", "old-pass").await.unwrap();
        let (other, _) = h.accounts.login("a@x.com", "old-pass").await.unwrap();
        let caller = caller_for(&user, &current.token);

        let err = h
            .accounts
            .change_password(&caller, &user.id, "wrong", "new-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        h.accounts
            .change_password(&caller, &user.id, "old-pass", "new-pass")
            .await
            .unwrap();

        assert!(matches!(
            h.accounts.login("a@x.com", "old-pass").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(h.accounts.login("a@x.com", "new-pass").await.is_ok());

        // The caller's session survives, the other one does not
        assert!(h.tokens.validate(&current.token).await.is_ok());
        assert!(h.tokens.validate(&other.token).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_password_changes_do_not_interleave() {
        let h = harness();
        h.accounts
            .signup(signup_input("a@x.com", "alpha", "start"))
            .await
            .unwrap();
        let (current, user) = h.accounts.login("a@x.com", "start").await.unwrap();
        let caller = caller_for(&user, &current.token);
        let user_id = user.id;

        let a = {
            let accounts = h.accounts.clone();
            let caller = caller.clone();
            tokio::spawn(async move {
                accounts
                    .change_password(&caller, &user_id, "start", "from-a")
                    .await
            })
        };
        let b = {
            let accounts = h.accounts.clone();
            let caller = caller.clone();
            tokio::spawn(async move {
                accounts
                    .change_password(&caller, &user_id, "start", "from-b")
                    .await
            })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 1, "exactly one change may win");

        let a_works = h.accounts.login("a@x.com", "from-a").await.is_ok();
        let b_works = h.accounts.login("a@x.com", "from-b").await.is_ok();
        assert!(a_works ^ b_works);
    }

    #[tokio::test]
    async fn test_login_racing_password_change_does_not_survive_it() {
        let h = harness_over(
            Arc::new(StallingSessionStore::default()),
            quiet_mailer(),
            AuthConfig::default(),
        );
        let user = h
            .accounts
            .signup(signup_input("a@x.com", "alpha", "old-pass"))
            .await
            .unwrap();
        let caller = caller_for(&user, "caller-session");
        let user_id = user.id;

        let login = {
            let accounts = h.accounts.clone();
            tokio::spawn(async move { accounts.login("a@x.com", "old-pass").await })
        };
        // Let the login get past its password check
        tokio::time::sleep(StdDuration::from_millis(50)).await;

        h.accounts
            .change_password(&caller, &user_id, "old-pass", "new-pass")
            .await
            .unwrap();

        match login.await.unwrap() {
            Ok((issued, _)) => assert!(
                h.tokens.validate(&issued.token).await.is_err(),
                "a session opened with the old password outlived the change"
            ),
            Err(e) => assert!(matches!(e, AppError::InvalidCredentials)),
        }
    }

    #[tokio::test]
    async fn test_reset_password_flow() {
        let captured = Arc::new(Mutex::new(None::<String>));
        let sink = captured.clone();

        let mut mailer = MockMailer::new();
        mailer.expect_send_verification().returning(|_, _| Ok(()));
        mailer
            .expect_send_password_reset()
            .times(1)
            .returning(move |_, token| {
                *sink.lock().unwrap() = Some(token.to_string());
                Ok(())
            });
        let h = harness_with(mailer, AuthConfig::default());

        h.accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();
        let (session, _) = h.accounts.login("a@x.com", "p1").await.unwrap();

        h.accounts.reset_password("a@x.com").await.unwrap();
        let token = captured.lock().unwrap().clone().unwrap();

        h.accounts.update_password(&token, "p2").await.unwrap();
        assert!(h.accounts.login("a@x.com", "p2").await.is_ok());
        assert!(h.tokens.validate(&session.token).await.is_err());

        // Single use
        assert!(matches!(
            h.accounts.update_password(&token, "p3").await,
            Err(AppError::InvalidOrExpiredToken)
        ));
    }

    #[tokio::test]
    async fn test_reset_password_for_unknown_email_is_silent() {
        let mut mailer = MockMailer::new();
        mailer.expect_send_password_reset().times(0);
        let h = harness_with(mailer, AuthConfig::default());

        assert!(h.accounts.reset_password("ghost@x.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_password_with_unknown_token() {
        let h = harness();
        assert!(matches!(
            h.accounts.update_password("made-up", "p2").await,
            Err(AppError::InvalidOrExpiredToken)
        ));
    }

    #[tokio::test]
    async fn test_edit_user_ownership() {
        let h = harness();
        let owner = h
            .accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();
        let stranger = h
            .accounts
            .signup(signup_input("b@x.com", "bravo", "p1"))
            .await
            .unwrap();
        let caller = caller_for(&stranger, "t");

        let update = ProfileUpdate {
            first_name: Some("Mallory".into()),
            ..Default::default()
        };
        assert!(matches!(
            h.accounts.edit_user(&caller, &owner.id, update.clone()).await,
            Err(AppError::Forbidden(_))
        ));

        let caller = caller_for(&owner, "t");
        let edited = h.accounts.edit_user(&caller, &owner.id, update).await.unwrap();
        assert_eq!(edited.first_name, "Mallory");
        assert_eq!(edited.last_name, "Preet");

        assert!(matches!(
            h.accounts
                .edit_user(&caller, &owner.id, ProfileUpdate::default())
                .await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_revokes_every_session() {
        let h = harness();
        h.accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();
        let (t1, user) = h.accounts.login("a@x.com", "p1").await.unwrap();
        let (t2, _) = h.accounts.login("a@x.com", "p1").await.unwrap();
        let caller = caller_for(&user, &t1.token);

        h.accounts.delete_user(&caller, &user.id).await.unwrap();

        assert!(h.tokens.validate(&t1.token).await.is_err());
        assert!(h.tokens.validate(&t2.token).await.is_err());
        assert!(matches!(
            h.accounts.get_single_user(&user.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            h.accounts.login("a@x.com", "p1").await,
            Err(AppError::InvalidCredentials)
        ));
        // The email stays reserved
        assert!(matches!(
            h.accounts.signup(signup_input("a@x.com", "fresh", "p1")).await,
            Err(AppError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn test_admin_can_delete_others_but_users_cannot() {
        let h = harness();
        let victim = h
            .accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();
        let mut admin_input = signup_input("root@x.com", "root", "p1");
        admin_input.is_admin = true;
        let admin = h.accounts.signup(admin_input).await.unwrap();
        let plain = h
            .accounts
            .signup(signup_input("b@x.com", "bravo", "p1"))
            .await
            .unwrap();

        let caller = caller_for(&plain, "t");
        assert!(matches!(
            h.accounts.delete_user(&caller, &victim.id).await,
            Err(AppError::Forbidden(_))
        ));

        let caller = caller_for(&admin, "t");
        h.accounts.delete_user(&caller, &victim.id).await.unwrap();
        assert!(h.users.find_by_id(&victim.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_admin_only() {
        let h = harness();
        let plain = h
            .accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();
        let mut admin_input = signup_input("root@x.com", "root", "p1");
        admin_input.is_admin = true;
        let admin = h.accounts.signup(admin_input).await.unwrap();

        let caller = caller_for(&plain, "t");
        assert!(matches!(
            h.accounts.get_all_users(&caller).await,
            Err(AppError::Forbidden(_))
        ));

        let caller = caller_for(&admin, "t");
        assert_eq!(h.accounts.get_all_users(&caller).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_verify_email_consumes_validation_token() {
        let h = harness();
        let user = h
            .accounts
            .signup(signup_input("a@x.com", "alpha", "p1"))
            .await
            .unwrap();

        h.accounts.verify_email(&user.id).await.unwrap();

        let stored = h.users.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.email_verified);
        assert!(stored.validation_token_hash.is_none());

        assert!(matches!(
            h.accounts.verify_email(&Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
