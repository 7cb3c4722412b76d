//! Authentication
//!
//! Handles:
//! - Local credential verification (bcrypt)
//! - Google OAuth flow
//! - Signed session tokens
//! - Request extractors for the current user

pub mod credentials;
mod google;
mod middleware;
pub mod session;

pub use credentials::{hash_password, verify_credentials, CredentialFailure};
pub use google::google_auth_router;
pub use middleware::{login_redirect, CurrentUser, MaybeUser, SessionRejection};
pub use session::{
    create_session_token, establish_session, removal_session_cookie, session_cookie,
    verify_session_token, Session, SESSION_COOKIE,
};
