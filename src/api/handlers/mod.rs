pub mod health;
pub use self::health::health;

pub mod register;
pub use self::register::register;

pub mod passkey;
pub use self::passkey::verify_passkey;

pub mod login;
pub use self::login::login;

pub mod session;
pub use self::session::{logout, session};

pub mod teams;
pub use self::teams::teams;

pub mod checkin;
pub use self::checkin::checkin;

pub mod state;

// common functions for the handlers
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use regex::Regex;

/// Cookie set once the shared passkey has been verified.
pub(crate) const PASSKEY_COOKIE: &str = "admin_passkey_verified";

/// Cookie carrying the authenticated admin email.
pub(crate) const SESSION_COOKIE: &str = "admin_authenticated";

/// Both gate cookies expire after 24 hours.
const COOKIE_MAX_AGE_SECONDS: u64 = 60 * 60 * 24;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Build a gate cookie (`HttpOnly`, `SameSite=Strict`, 24h expiry).
pub(crate) fn build_cookie(
    name: &str,
    value: &str,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Strict; Max-Age={COOKIE_MAX_AGE_SECONDS}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }
    None
}

/// True once `/admin/verify-passkey` has set its marker cookie.
pub(crate) fn passkey_verified(headers: &HeaderMap) -> bool {
    cookie_value(headers, PASSKEY_COOKIE).is_some_and(|value| value == "true")
}

/// The authenticated admin email, if the session cookie is present.
pub(crate) fn authenticated_admin(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE).filter(|value| !value.is_empty())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn build_cookie_sets_attributes() -> anyhow::Result<()> {
        let cookie = build_cookie(SESSION_COOKIE, "a@x.com", false)?;
        let cookie = cookie.to_str()?;
        assert!(cookie.starts_with("admin_authenticated=a@x.com"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));
        Ok(())
    }

    #[test]
    fn build_cookie_secure_flag() -> anyhow::Result<()> {
        let cookie = build_cookie(PASSKEY_COOKIE, "true", true)?;
        assert!(cookie.to_str()?.ends_with("; Secure"));
        Ok(())
    }

    #[test]
    fn clear_cookie_expires_immediately() -> anyhow::Result<()> {
        let cookie = clear_cookie(PASSKEY_COOKIE, false)?;
        let cookie = cookie.to_str()?;
        assert!(cookie.starts_with("admin_passkey_verified=;"));
        assert!(cookie.contains("Max-Age=0"));
        Ok(())
    }

    #[test]
    fn cookie_value_parses_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static(
                "admin_passkey_verified=true; admin_authenticated=a@x.com; other=1",
            ),
        );
        assert_eq!(
            cookie_value(&headers, PASSKEY_COOKIE),
            Some("true".to_string())
        );
        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE),
            Some("a@x.com".to_string())
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn passkey_verified_requires_exact_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("admin_passkey_verified=yes"),
        );
        assert!(!passkey_verified(&headers));

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("admin_passkey_verified=true"),
        );
        assert!(passkey_verified(&headers));
    }

    #[test]
    fn authenticated_admin_rejects_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("admin_authenticated="));
        assert_eq!(authenticated_admin(&headers), None);

        let headers = HeaderMap::new();
        assert_eq!(authenticated_admin(&headers), None);
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
