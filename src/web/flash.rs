//! One-time flash messages
//!
//! A flash is a short notification queued on a redirect and consumed on
//! the next render of the login or registration page. It rides in its
//! own cookie; the value is base64-encoded so messages can contain
//! spaces and punctuation.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Name of the flash cookie.
pub const FLASH_COOKIE: &str = "flash";

/// Build a cookie queueing a flash message for the next render.
pub fn flash_cookie(message: &str) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, URL_SAFE_NO_PAD.encode(message)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Consume the queued flash message, if any.
///
/// Returns the jar with the flash cookie removed so the message renders
/// exactly once. Undecodable values are dropped silently.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| URL_SAFE_NO_PAD.decode(cookie.value()).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok());

    let mut removal = Cookie::build((FLASH_COOKIE, "")).path("/").build();
    removal.make_removal();
    let jar = jar.remove(removal);
    (jar, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_and_consume_round_trip() {
        let jar = CookieJar::new().add(flash_cookie("Incorrect password."));
        let (jar, message) = take_flash(jar);

        assert_eq!(message.as_deref(), Some("Incorrect password."));
        // Consumed: a second take yields nothing
        let (_, message) = take_flash(jar);
        assert_eq!(message, None);
    }

    #[test]
    fn empty_jar_yields_no_message() {
        let (_, message) = take_flash(CookieJar::new());
        assert_eq!(message, None);
    }

    #[test]
    fn garbage_value_is_dropped() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "%%%not-base64%%%"));
        let (_, message) = take_flash(jar);
        assert_eq!(message, None);
    }
}
