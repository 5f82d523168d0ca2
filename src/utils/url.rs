// src/utils/url.rs

//! URL manipulation utilities.

/// Join a base URL and a route with exactly one separating slash.
///
/// # Examples
/// ```
/// use site_exporter::utils::url::combine_url;
///
/// assert_eq!(
///     combine_url("http://localhost:5055", "/News"),
///     "http://localhost:5055/News"
/// );
/// ```
pub fn combine_url(base: &str, route: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        route.strip_prefix('/').unwrap_or(route)
    )
}

/// Append the locale selector, keeping any query parameters already present.
pub fn with_culture(url: &str, culture: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}culture={culture}")
}

/// Extract `host:port` from a URL, filling in the scheme's default port.
pub fn socket_address(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let port = parsed.port_or_known_default()?;
    Some(format!("{host}:{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_url_single_slash() {
        assert_eq!(combine_url("http://h:1", "/"), "http://h:1/");
        assert_eq!(combine_url("http://h:1/", "/News"), "http://h:1/News");
        assert_eq!(combine_url("http://h:1", "News"), "http://h:1/News");
        assert_eq!(combine_url("http://h:1/", "//x"), "http://h:1//x");
    }

    #[test]
    fn test_with_culture() {
        assert_eq!(
            with_culture("http://h:1/News", "en-US"),
            "http://h:1/News?culture=en-US"
        );
        assert_eq!(
            with_culture("http://h:1/News?page=2", "zh-TW"),
            "http://h:1/News?page=2&culture=zh-TW"
        );
    }

    #[test]
    fn test_socket_address() {
        assert_eq!(
            socket_address("http://localhost:5055"),
            Some("localhost:5055".to_string())
        );
        assert_eq!(
            socket_address("http://example.com/app"),
            Some("example.com:80".to_string())
        );
        assert_eq!(socket_address("invalid-url"), None);
    }
}
