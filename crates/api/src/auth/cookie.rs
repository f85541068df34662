//! Refresh-token cookie transport.
//!
//! The refresh token only ever travels in an `HttpOnly` cookie scoped to the
//! auth routes, never in a JSON body. A request without the cookie (e.g. a
//! non-browser client) is a normal "missing token" state, not an error here.

use axum::http::header::COOKIE;
use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderMap, HeaderValue};

/// `SameSite` policies accepted for the refresh cookie.
///
/// `None` is deliberately not representable: the cookie must not be sent on
/// cross-site subrequests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    Strict,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "lax" => Some(SameSite::Lax),
            "strict" => Some(SameSite::Strict),
            _ => None,
        }
    }
}

/// Attributes of the refresh cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    /// Path scope. Must cover both `/auth/refresh` and `/auth/logout`.
    pub path: String,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "refresh_token".to_string(),
            path: "/auth".to_string(),
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieConfig {
    /// Load cookie attributes from environment variables.
    ///
    /// | Env Var                | Default          |
    /// |------------------------|------------------|
    /// | `REFRESH_COOKIE_NAME`  | `refresh_token`  |
    /// | `REFRESH_COOKIE_PATH`  | `/auth`          |
    /// | `COOKIE_SECURE`        | `false`          |
    /// | `COOKIE_SAMESITE`      | `lax`            |
    ///
    /// # Panics
    ///
    /// Panics on an invalid cookie name, a path not starting with `/`, a
    /// non-boolean `COOKIE_SECURE`, or a `COOKIE_SAMESITE` other than
    /// `lax`/`strict`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let name = std::env::var("REFRESH_COOKIE_NAME").unwrap_or(defaults.name);
        assert!(
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            "REFRESH_COOKIE_NAME must be a non-empty token of [A-Za-z0-9_-]"
        );

        let path = std::env::var("REFRESH_COOKIE_PATH").unwrap_or(defaults.path);
        assert!(path.starts_with('/'), "REFRESH_COOKIE_PATH must start with '/'");

        let secure: bool = std::env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("COOKIE_SECURE must be 'true' or 'false'");

        let same_site = std::env::var("COOKIE_SAMESITE")
            .map(|v| {
                SameSite::parse(&v)
                    .unwrap_or_else(|| panic!("COOKIE_SAMESITE must be 'lax' or 'strict', got '{v}'"))
            })
            .unwrap_or(defaults.same_site);

        Self {
            name,
            path,
            secure,
            same_site,
        }
    }

    fn attributes(&self, max_age_secs: i64) -> String {
        let mut attrs = format!(
            "Path={}; HttpOnly; SameSite={}; Max-Age={max_age_secs}",
            self.path,
            self.same_site.as_str()
        );
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs
    }
}

/// Build the `Set-Cookie` value carrying a freshly issued refresh token.
pub fn refresh_cookie(
    config: &CookieConfig,
    raw_token: &str,
    max_age_secs: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={raw_token}; {}",
        config.name,
        config.attributes(max_age_secs)
    ))
}

/// Build the `Set-Cookie` value that removes the refresh cookie.
pub fn clear_refresh_cookie(config: &CookieConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{}=; {}; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        config.name,
        config.attributes(0)
    ))
}

/// Find a cookie value by name across all `Cookie` headers.
///
/// Returns `None` when the cookie is absent or empty.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn refresh_cookie_has_required_attributes() {
        let config = CookieConfig::default();
        let value = refresh_cookie(&config, "abc123", 1_209_600).unwrap();
        let value = value.to_str().unwrap();

        assert!(value.starts_with("refresh_token=abc123;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Path=/auth"));
        assert!(value.contains("Max-Age=1209600"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn secure_and_strict_are_emitted() {
        let config = CookieConfig {
            secure: true,
            same_site: SameSite::Strict,
            ..CookieConfig::default()
        };
        let value = refresh_cookie(&config, "t", 60).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.contains("SameSite=Strict"));
        assert!(value.ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let config = CookieConfig::default();
        let value = clear_refresh_cookie(&config).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("refresh_token=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("Path=/auth"));
    }

    #[test]
    fn read_cookie_finds_value_among_others() {
        let headers = headers_with(&["theme=dark; refresh_token=tok123; lang=en"]);
        assert_eq!(read_cookie(&headers, "refresh_token"), Some("tok123"));
    }

    #[test]
    fn read_cookie_scans_multiple_headers() {
        let headers = headers_with(&["theme=dark", "refresh_token=second"]);
        assert_eq!(read_cookie(&headers, "refresh_token"), Some("second"));
    }

    #[test]
    fn read_cookie_missing_or_empty_is_none() {
        assert_eq!(read_cookie(&HeaderMap::new(), "refresh_token"), None);
        let headers = headers_with(&["refresh_token="]);
        assert_eq!(read_cookie(&headers, "refresh_token"), None);
        let headers = headers_with(&["refresh_token_old=x"]);
        assert_eq!(read_cookie(&headers, "refresh_token"), None);
    }

    #[test]
    fn same_site_parsing_rejects_none() {
        assert_eq!(SameSite::parse("LAX"), Some(SameSite::Lax));
        assert_eq!(SameSite::parse("strict"), Some(SameSite::Strict));
        assert_eq!(SameSite::parse("none"), None);
    }
}
