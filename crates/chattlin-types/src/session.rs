//! Session continuity cookie.
//!
//! The frame hands back an opaque conversation token once it has loaded. The
//! host persists it in a first-party cookie so that later page loads resume
//! the same conversation.

use serde::{Deserialize, Serialize};

/// Name of the conversation cookie on the host page.
pub const SESSION_COOKIE_NAME: &str = "cw_conversation";

/// Lifetime of the conversation cookie, in days.
pub const SESSION_COOKIE_TTL_DAYS: i64 = 365;

/// Opaque conversation token issued by the widget frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token. Returns `None` for an empty string, which the frame
    /// sends before a conversation exists.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `SameSite` policy of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes applied when writing a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieAttributes {
    /// Days until expiry. `None` makes a session cookie.
    pub expires_in_days: Option<i64>,
    pub path: String,
    pub same_site: SameSite,
}

impl CookieAttributes {
    /// Attributes of the conversation cookie: one year, site-wide, `Lax`.
    pub fn session() -> Self {
        Self {
            expires_in_days: Some(SESSION_COOKIE_TTL_DAYS),
            path: "/".to_string(),
            same_site: SameSite::Lax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_rejected() {
        assert!(SessionToken::new("").is_none());
        assert_eq!(SessionToken::new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_session_attributes() {
        let attrs = CookieAttributes::session();
        assert_eq!(attrs.expires_in_days, Some(365));
        assert_eq!(attrs.same_site, SameSite::Lax);
        assert_eq!(attrs.path, "/");
    }
}
