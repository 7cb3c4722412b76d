//! Inline HTML pages
//!
//! Small server-rendered pages built with `format!`. Everything
//! user-supplied (emails, secrets, flash text) goes through
//! `html_escape` before it reaches the page.

use crate::data::{SecretWithAuthor, User};

fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title} - Secretden</title></head>
<body>
{body}
</body>
</html>"#
    )
}

/// Landing page, with the current user if signed in.
pub fn home_page(user: Option<&User>) -> String {
    let body = match user {
        Some(user) => format!(
            r#"<h1>Secretden</h1>
<p>Signed in as {}</p>
<p><a href="/secrets">Secrets</a> | <a href="/submit">Submit a secret</a> | <a href="/logout">Log out</a></p>"#,
            escape(&user.email)
        ),
        None => r#"<h1>Secretden</h1>
<p>Share a secret, anonymously-ish.</p>
<p><a href="/login">Log in</a> | <a href="/register">Register</a> | <a href="/auth/google">Sign in with Google</a></p>"#
            .to_string(),
    };
    page("Home", &body)
}

/// Login form, with the queued flash message if any.
pub fn login_page(flash_message: Option<&str>) -> String {
    let flash = flash_message
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Log in</h1>
{flash}<form action="/login" method="post">
  <label>Email <input type="email" name="username" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Log in</button>
</form>
<p><a href="/auth/google">Sign in with Google</a></p>
<p><a href="/register">Need an account? Register</a></p>"#
    );
    page("Log in", &body)
}

/// Registration form, with an inline error if any.
pub fn register_page(error: Option<&str>) -> String {
    let error = error
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Register</h1>
{error}<form action="/register" method="post">
  <label>Email <input type="email" name="username" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Register</button>
</form>
<p><a href="/login">Already registered? Log in</a></p>"#
    );
    page("Register", &body)
}

/// Secrets listing, each secret attributed to its owner's email.
pub fn secrets_page(user: &User, secrets: &[SecretWithAuthor]) -> String {
    let rows: String = secrets
        .iter()
        .map(|entry| {
            format!(
                "  <li><blockquote>{}</blockquote><cite>{}</cite></li>\n",
                escape(&entry.secret),
                escape(&entry.email)
            )
        })
        .collect();
    let body = format!(
        r#"<h1>Secrets</h1>
<p>Signed in as {}</p>
<ul>
{rows}</ul>
<p><a href="/submit">Submit a secret</a> | <a href="/logout">Log out</a></p>"#,
        escape(&user.email)
    );
    page("Secrets", &body)
}

/// Secret submission form.
pub fn submit_page(user: &User) -> String {
    let body = format!(
        r#"<h1>Submit a secret</h1>
<p>Signed in as {}</p>
<form action="/submit" method="post">
  <label>Your secret <input type="text" name="secret" required></label>
  <button type="submit">Submit</button>
</form>
<p><a href="/secrets">Back to secrets</a></p>"#,
        escape(&user.email)
    );
    page("Submit", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user(email: &str) -> User {
        User {
            id: 1,
            email: email.to_string(),
            password: "hash".to_string(),
            google_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn secrets_page_escapes_user_content() {
        let user = test_user("a@x.com");
        let secrets = vec![SecretWithAuthor {
            id: 1,
            secret: "<script>alert(1)</script>".to_string(),
            email: "evil@<b>x</b>.com".to_string(),
        }];

        let html = secrets_page(&user, &secrets);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>x</b>"));
    }

    #[test]
    fn login_page_shows_flash_message() {
        let html = login_page(Some("Incorrect password."));
        assert!(html.contains("Incorrect password."));

        let html = login_page(None);
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn home_page_reflects_session_state() {
        assert!(home_page(None).contains("/login"));
        assert!(home_page(Some(&test_user("a@x.com"))).contains("a@x.com"));
    }
}
