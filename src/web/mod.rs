//! Web layer
//!
//! HTTP handlers for:
//! - Public pages and local login/registration
//! - Protected secrets listing and submission
//! - Flash-message cookies and inline HTML views

pub mod flash;
mod pages;
mod secrets;
pub mod views;

pub use pages::pages_router;
pub use secrets::secrets_router;
