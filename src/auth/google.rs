//! Google OAuth flow
//!
//! Implements the OAuth 2.0 authorization code flow with Google.
//!
//! Identity mapping follows the provider's stable subject id first, then
//! the verified email: a returning Google user is found by `google_id`, a
//! first-time Google user whose email matches an existing local account
//! signs into that account, and anyone else gets a fresh account with a
//! sentinel password.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use serde::Deserialize;

use super::session::establish_session;
use crate::config::AppConfig;
use crate::data::{Database, User};
use crate::error::AppError;
use crate::web::flash;
use crate::AppState;

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// CSRF state cookie for the authorize/callback round trip.
const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Create the Google authentication router
///
/// Routes:
/// - GET /auth/google - Redirect to Google
/// - GET /auth/google/secrets - OAuth callback
pub fn google_auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/google", get(google_redirect))
        .route("/auth/google/secrets", get(google_callback))
}

// =============================================================================
// Authorize redirect
// =============================================================================

/// GET /auth/google
///
/// Generates a CSRF state token, stores it in a cookie, and redirects
/// the user to Google's authorization page.
async fn google_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let state_token = generate_state_token();
    let jar = jar.add(oauth_state_cookie(
        &state_token,
        state.config.should_use_secure_cookies(),
    ));

    let mut authorize_url =
        url::Url::parse(GOOGLE_AUTH_ENDPOINT).map_err(|e| AppError::Internal(e.into()))?;
    authorize_url
        .query_pairs_mut()
        .append_pair("client_id", &state.config.auth.google.client_id)
        .append_pair("redirect_uri", &callback_url(&state.config))
        .append_pair("response_type", "code")
        .append_pair("scope", "openid email profile")
        .append_pair("state", &state_token);

    Ok((jar, Redirect::to(authorize_url.as_str())))
}

// =============================================================================
// Callback
// =============================================================================

/// Query parameters from the Google callback
#[derive(Debug, Deserialize)]
struct GoogleCallbackQuery {
    /// Authorization code
    code: Option<String>,
    /// CSRF state token
    state: Option<String>,
    /// Error code if the user denied access or the request failed
    error: Option<String>,
}

/// Google token response
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// Google userinfo payload
#[derive(Debug, Deserialize)]
struct GoogleProfile {
    /// Stable subject identifier
    id: String,
    email: Option<String>,
    verified_email: Option<bool>,
}

/// GET /auth/google/secrets
///
/// Handles the OAuth callback from Google. On success the session is
/// established and the user lands on /secrets; any failure is logged and
/// redirected to /login, never surfaced as a 5xx.
async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
    jar: CookieJar,
) -> Response {
    let expected_state = jar
        .get(OAUTH_STATE_COOKIE)
        .map(|cookie| cookie.value().to_owned());
    // State cookie is single-use
    let mut state_removal = Cookie::build((OAUTH_STATE_COOKIE, "")).path("/").build();
    state_removal.make_removal();
    let jar = jar.remove(state_removal);

    match complete_sign_in(&state, expected_state.as_deref(), &query).await {
        Ok(user) => match establish_session(&state.config, user.id) {
            Ok(cookie) => {
                tracing::info!(user_id = user.id, "Google sign-in succeeded");
                (jar.add(cookie), Redirect::to("/secrets")).into_response()
            }
            Err(error) => error.into_response(),
        },
        Err(error) => {
            tracing::warn!(%error, "Google sign-in failed");
            let jar = jar.add(flash::flash_cookie("Google sign-in failed. Please try again."));
            (jar, Redirect::to("/login")).into_response()
        }
    }
}

async fn complete_sign_in(
    state: &AppState,
    expected_state: Option<&str>,
    query: &GoogleCallbackQuery,
) -> Result<User, AppError> {
    if let Some(error) = &query.error {
        return Err(AppError::Internal(anyhow::anyhow!(
            "provider returned error: {error}"
        )));
    }

    let code = query
        .code
        .as_deref()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("callback missing code")))?;
    let returned_state = query
        .state
        .as_deref()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("callback missing state")))?;
    let expected_state = expected_state
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("missing OAuth state cookie")))?;
    if returned_state != expected_state {
        return Err(AppError::Internal(anyhow::anyhow!("OAuth state mismatch")));
    }

    let token = exchange_code(state, code).await?;
    let profile = fetch_profile(state, &token.access_token).await?;
    resolve_identity(&state.db, &profile).await
}

/// Exchange the authorization code for an access token.
async fn exchange_code(state: &AppState, code: &str) -> Result<GoogleTokenResponse, AppError> {
    let response = state
        .http_client
        .post(GOOGLE_TOKEN_ENDPOINT)
        .form(&[
            ("client_id", state.config.auth.google.client_id.as_str()),
            (
                "client_secret",
                state.config.auth.google.client_secret.as_str(),
            ),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", &callback_url(&state.config)),
        ])
        .send()
        .await?
        .error_for_status()?;

    Ok(response.json().await?)
}

/// Fetch the user's profile from the Google userinfo endpoint.
async fn fetch_profile(state: &AppState, access_token: &str) -> Result<GoogleProfile, AppError> {
    let response = state
        .http_client
        .get(GOOGLE_USERINFO_ENDPOINT)
        .bearer_auth(access_token)
        .send()
        .await?
        .error_for_status()?;

    Ok(response.json().await?)
}

/// Map a Google profile to a local user, creating one if necessary.
async fn resolve_identity(db: &Database, profile: &GoogleProfile) -> Result<User, AppError> {
    let email = profile
        .email
        .as_deref()
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::InvalidProfile("Google profile has no email".to_string()))?;

    // Absent flag counts as unverified
    if profile.verified_email != Some(true) {
        return Err(AppError::InvalidProfile(
            "Google email is not verified".to_string(),
        ));
    }

    if let Some(user) = db.find_user_by_google_id(&profile.id).await? {
        return Ok(user);
    }

    db.upsert_google_user(email, &profile.id).await
}

// =============================================================================
// Helpers
// =============================================================================

fn callback_url(config: &AppConfig) -> String {
    format!("{}/auth/google/secrets", config.server.base_url())
}

/// Generate a random CSRF state token (32 bytes, base64url).
fn generate_state_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn oauth_state_cookie(state_token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, state_token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}
