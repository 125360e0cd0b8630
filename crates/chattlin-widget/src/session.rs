//! Conversation cookie access.
//!
//! [`SessionCookies`] reads and writes the `cw_conversation` cookie through a
//! [`CookieJar`]. The browser jar in `chattlin-sdk` is a thin wrapper around
//! `document.cookie` that uses [`format_set_cookie`] and [`parse_cookie`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chattlin_types::session::{CookieAttributes, SESSION_COOKIE_NAME, SessionToken};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Cookie storage of the host page.
pub trait CookieJar {
    fn get(&self, name: &str) -> Option<String>;

    fn set(&self, name: &str, value: &str, attributes: &CookieAttributes);

    fn remove(&self, name: &str, path: &str);
}

/// Reads and writes the conversation token.
#[derive(Debug, Clone)]
pub struct SessionCookies<C> {
    jar: C,
}

impl<C: CookieJar> SessionCookies<C> {
    pub fn new(jar: C) -> Self {
        Self { jar }
    }

    /// The stored token, if a non-empty one exists.
    pub fn read(&self) -> Option<SessionToken> {
        self.jar.get(SESSION_COOKIE_NAME).and_then(SessionToken::new)
    }

    /// Store `token` for a year, site-wide, `SameSite=Lax`.
    pub fn persist(&self, token: &SessionToken) {
        self.jar
            .set(SESSION_COOKIE_NAME, token.as_str(), &CookieAttributes::session());
        debug!(cookie = SESSION_COOKIE_NAME, "persisted conversation token");
    }

    pub fn clear(&self) {
        self.jar.remove(SESSION_COOKIE_NAME, &CookieAttributes::session().path);
    }

    pub fn jar(&self) -> &C {
        &self.jar
    }
}

/// Render a `document.cookie` assignment.
///
/// The value is percent-encoded; the expiry is an RFC 7231 GMT date relative
/// to `now`.
pub fn format_set_cookie(
    name: &str,
    value: &str,
    attributes: &CookieAttributes,
    now: DateTime<Utc>,
) -> String {
    let mut cookie = format!("{name}={}", urlencoding::encode(value));
    if let Some(days) = attributes.expires_in_days {
        let expires = now + Duration::days(days);
        cookie.push_str(&format!("; expires={}", http_date(expires)));
    }
    cookie.push_str(&format!("; path={}", attributes.path));
    cookie.push_str(&format!("; SameSite={}", attributes.same_site.as_str()));
    cookie
}

/// Render an assignment that deletes `name`.
pub fn format_expired_cookie(name: &str, path: &str) -> String {
    format!("{name}=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path={path}")
}

/// Find `name` in a `Cookie`-style header (`a=1; b=2`) and decode its value.
pub fn parse_cookie(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key != name {
            return None;
        }
        Some(
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string()),
        )
    })
}

fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// In-memory cookie jar. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieJar {
    cookies: Rc<RefCell<HashMap<String, (String, CookieAttributes)>>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes the cookie was last written with.
    pub fn attributes(&self, name: &str) -> Option<CookieAttributes> {
        self.cookies.borrow().get(name).map(|(_, attrs)| attrs.clone())
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies.borrow().get(name).map(|(value, _)| value.clone())
    }

    fn set(&self, name: &str, value: &str, attributes: &CookieAttributes) {
        self.cookies
            .borrow_mut()
            .insert(name.to_string(), (value.to_string(), attributes.clone()));
    }

    fn remove(&self, name: &str, _path: &str) {
        self.cookies.borrow_mut().remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chattlin_types::session::SameSite;
    use chrono::TimeZone;

    #[test]
    fn format_session_cookie() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap();
        let cookie = format_set_cookie(
            SESSION_COOKIE_NAME,
            "tok en",
            &CookieAttributes::session(),
            now,
        );
        assert_eq!(
            cookie,
            "cw_conversation=tok%20en; expires=Fri, 15 Jan 2027 08:30:00 GMT; path=/; SameSite=Lax"
        );
    }

    #[test]
    fn format_session_only_cookie_has_no_expiry() {
        let attrs = CookieAttributes {
            expires_in_days: None,
            path: "/app".to_string(),
            same_site: SameSite::Strict,
        };
        let cookie = format_set_cookie("a", "1", &attrs, Utc::now());
        assert_eq!(cookie, "a=1; path=/app; SameSite=Strict");
    }

    #[test]
    fn parse_finds_and_decodes() {
        let header = "theme=dark; cw_conversation=tok%20en;other=x";
        assert_eq!(
            parse_cookie(header, SESSION_COOKIE_NAME).as_deref(),
            Some("tok en")
        );
        assert_eq!(parse_cookie(header, "other").as_deref(), Some("x"));
        assert!(parse_cookie(header, "missing").is_none());
        assert!(parse_cookie("", SESSION_COOKIE_NAME).is_none());
    }

    #[test]
    fn session_cookies_roundtrip_through_jar() {
        let jar = MemoryCookieJar::new();
        let cookies = SessionCookies::new(jar.clone());
        assert!(cookies.read().is_none());

        let token = SessionToken::new("conv-1").unwrap();
        cookies.persist(&token);
        assert_eq!(cookies.read(), Some(token));
        assert_eq!(
            jar.attributes(SESSION_COOKIE_NAME),
            Some(CookieAttributes::session())
        );

        cookies.clear();
        assert!(cookies.read().is_none());
    }

    #[test]
    fn empty_cookie_reads_as_absent() {
        let jar = MemoryCookieJar::new();
        jar.set(SESSION_COOKIE_NAME, "", &CookieAttributes::session());
        assert!(SessionCookies::new(jar).read().is_none());
    }
}
