//! Database repositories
//!
//! Repositories handle all direct Postgres and Redis interactions.

pub mod session_repo;
pub mod user_repo;

pub use session_repo::SessionRepository;
pub use user_repo::UserRepository;
