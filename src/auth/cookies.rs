use axum::http::{header, HeaderMap};

pub const ACCESS_COOKIE_NAME: &str = "access_token";
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Pull a single cookie value out of the request's `Cookie` header.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Build a `Set-Cookie` value for a token cookie. HttpOnly keeps the
/// token away from scripts; Max-Age matches the token's TTL.
pub fn token_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}")
}

/// Build a `Set-Cookie` value that removes the cookie.
pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn get_cookie_finds_named_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=abc.def.ghi; refresh_token=zzz"),
        );
        assert_eq!(
            get_cookie(&headers, ACCESS_COOKIE_NAME).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(
            get_cookie(&headers, REFRESH_COOKIE_NAME).as_deref(),
            Some("zzz")
        );
        assert_eq!(get_cookie(&headers, "other"), None);
    }

    #[test]
    fn get_cookie_handles_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME), None);
    }

    #[test]
    fn token_cookie_is_http_only_with_max_age() {
        let cookie = token_cookie(ACCESS_COOKIE_NAME, "tok", 3600);
        assert!(cookie.starts_with("access_token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn clear_cookie_zeroes_max_age() {
        let cookie = clear_cookie(ACCESS_COOKIE_NAME);
        assert!(cookie.contains("Max-Age=0"));
    }
}
