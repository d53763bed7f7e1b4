//! Refresh Token 쿠키.
//!
//! Refresh Token은 응답 본문이 아닌 `Set-Cookie` 헤더로만 전달됩니다.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use ollm_core::CookieConfig;

/// Refresh Token 쿠키 이름.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Refresh Token 쿠키 생성.
///
/// # Arguments
///
/// * `config` - 쿠키 속성 설정
/// * `token` - Refresh Token
/// * `max_age_secs` - 쿠키 수명 (초)
pub fn refresh_cookie(config: &CookieConfig, token: &str, max_age_secs: i64) -> String {
    build_cookie(config, token, max_age_secs.max(0))
}

/// 즉시 만료되는 Refresh Token 쿠키 생성 (로그아웃용).
pub fn expired_refresh_cookie(config: &CookieConfig) -> String {
    format!(
        "{}; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        build_cookie(config, "", 0)
    )
}

fn build_cookie(config: &CookieConfig, value: &str, max_age_secs: i64) -> String {
    let mut cookie = format!("{REFRESH_TOKEN_COOKIE}={value}; Path=/; Max-Age={max_age_secs}");

    if !config.domain.is_empty() {
        cookie.push_str("; Domain=");
        cookie.push_str(&config.domain);
    }
    if config.secure {
        cookie.push_str("; Secure");
    }
    if config.http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str("; SameSite=");
    cookie.push_str(&config.same_site().to_string());

    cookie
}

/// 쿠키 문자열을 헤더 값으로 변환.
pub fn to_header_value(cookie: String) -> Option<HeaderValue> {
    HeaderValue::try_from(cookie).ok()
}

/// 요청의 `Cookie` 헤더에서 쿠키 값 추출.
///
/// 빈 값은 없는 것으로 취급합니다.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let config = CookieConfig {
            domain: "example.com".to_string(),
            same_site: "strict".to_string(),
            ..Default::default()
        };
        let cookie = refresh_cookie(&config, "abc.def.ghi", 604800);

        assert!(cookie.starts_with("refresh_token=abc.def.ghi; Path=/; Max-Age=604800"));
        assert!(cookie.contains("; Domain=example.com"));
        assert!(cookie.contains("; Secure"));
        assert!(cookie.contains("; HttpOnly"));
        assert!(cookie.ends_with("; SameSite=Strict"));
    }

    #[test]
    fn test_cookie_optional_attributes_omitted() {
        let config = CookieConfig {
            secure: false,
            http_only: false,
            same_site: "lax".to_string(),
            domain: String::new(),
        };
        let cookie = refresh_cookie(&config, "t", 10);

        assert!(!cookie.contains("Domain="));
        assert!(!cookie.contains("Secure"));
        assert!(!cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn test_expired_cookie() {
        let cookie = expired_refresh_cookie(&CookieConfig::default());
        assert!(cookie.starts_with("refresh_token=; Path=/; Max-Age=0"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; refresh_token=abc.def; lang=ko"));
        assert_eq!(read_cookie(&headers, REFRESH_TOKEN_COOKIE), Some("abc.def".to_string()));
        assert_eq!(read_cookie(&headers, "missing"), None);

        let mut empty = HeaderMap::new();
        empty.insert(COOKIE, HeaderValue::from_static("refresh_token="));
        assert_eq!(read_cookie(&empty, REFRESH_TOKEN_COOKIE), None);
        assert_eq!(read_cookie(&HeaderMap::new(), REFRESH_TOKEN_COOKIE), None);
    }
}
