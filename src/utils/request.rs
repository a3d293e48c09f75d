use axum::http::HeaderMap;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Opaque caller id from the `x-user-id` header; empty when absent.
pub fn user_id(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_trimmed_header_or_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(user_id(&headers), "");
        headers.insert(USER_ID_HEADER, HeaderValue::from_static(" student-7 "));
        assert_eq!(user_id(&headers), "student-7");
    }
}
