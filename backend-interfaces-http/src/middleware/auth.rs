use axum::http::{header, HeaderMap};

use backend_domain::RuntimeConfig;

/// Accepts `Authorization: <token>` and `Authorization: Bearer <token>`.
/// With no token configured every request is rejected.
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    let Some(api_token) = config.api_token.as_deref() else {
        return false;
    };
    extract_token(headers)
        .map(|token| token == api_token)
        .unwrap_or(false)
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => value,
    };
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::Weekday;

    use super::*;

    fn config(token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            api_token: token.map(ToString::to_string),
            currency_symbol: "S/.".to_string(),
            max_body_bytes: 1024,
            request_timeout_seconds: 5,
            schedule_enabled: false,
            report_hour: 7,
            report_minute: 0,
            weekly_report_weekday: Weekday::Mon,
        }
    }

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn raw_and_bearer_tokens_are_accepted() {
        let config = config(Some("s3cret"));
        assert!(authorize(&config, &headers("s3cret")));
        assert!(authorize(&config, &headers("Bearer s3cret")));
        assert!(authorize(&config, &headers("bearer  s3cret ")));
    }

    #[test]
    fn wrong_or_missing_tokens_are_rejected() {
        let config = config(Some("s3cret"));
        assert!(!authorize(&config, &headers("nope")));
        assert!(!authorize(&config, &headers("Bearer nope")));
        assert!(!authorize(&config, &headers("Bearer ")));
        assert!(!authorize(&config, &HeaderMap::new()));
    }

    #[test]
    fn unset_token_rejects_everything() {
        assert!(!authorize(&config(None), &headers("anything")));
        assert!(!authorize(&config(None), &HeaderMap::new()));
    }
}
