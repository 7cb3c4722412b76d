//! Protected secrets routes
//!
//! - GET  /secrets  listing of all secrets with owner emails
//! - GET  /submit   submission form
//! - POST /submit   insert a secret owned by the current user
//!
//! All three require a session via the [`CurrentUser`] extractor, whose
//! rejection is the flash + /login redirect.

use axum::{
    extract::State,
    response::{Html, Redirect},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use super::views;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::AppState;

pub fn secrets_router() -> Router<AppState> {
    Router::new()
        .route("/secrets", get(secrets))
        .route("/submit", get(submit_form).post(submit))
}

/// GET /secrets
async fn secrets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, AppError> {
    let secrets = state.db.list_secrets_with_authors().await?;
    Ok(Html(views::secrets_page(&user, &secrets)))
}

/// GET /submit
async fn submit_form(CurrentUser(user): CurrentUser) -> Html<String> {
    Html(views::submit_page(&user))
}

#[derive(Debug, Deserialize)]
struct SubmitForm {
    secret: String,
}

/// POST /submit
async fn submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<SubmitForm>,
) -> Result<Redirect, AppError> {
    let secret = state.db.insert_secret(&form.secret, user.id).await?;
    tracing::info!(secret_id = secret.id, user_id = user.id, "Secret submitted");
    Ok(Redirect::to("/secrets"))
}
