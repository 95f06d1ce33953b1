use percent_encoding::percent_decode_str;
use std::net::IpAddr;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum UrlParseError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("URL has no host")]
    NoHost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub hostname: String,
    pub protocol: String,
}

pub fn decode_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Splits a URL into the hostname and `scheme:` pair a page sees as
/// `location.hostname` / `location.protocol`.
pub fn parse_origin(url_str: &str) -> Result<Origin, UrlParseError> {
    let parsed =
        Url::parse(url_str).map_err(|e| UrlParseError::InvalidUrl(format!("{url_str}: {e}")))?;

    let host = parsed.host_str().ok_or(UrlParseError::NoHost)?;
    if host.is_empty() {
        return Err(UrlParseError::NoHost);
    }

    Ok(Origin {
        hostname: normalize_host(host),
        protocol: format!("{}:", parsed.scheme()),
    })
}

pub fn extract_hostname(url_str: &str) -> Result<String, UrlParseError> {
    parse_origin(url_str).map(|origin| origin.hostname)
}

/// Rebuilds the URL the store's removal primitive needs from a cookie's
/// stored attributes: one leading `.` is dropped from the domain and the
/// scheme follows the `secure` flag.
pub fn removal_url(domain: &str, path: &str, secure: bool) -> String {
    let scheme = if secure { "https://" } else { "http://" };
    let host = domain.strip_prefix('.').unwrap_or(domain);
    let path = if path.is_empty() { "/" } else { path };

    format!("{scheme}{host}{path}")
}

/// True if `host` is `domain` or one of its subdomains. A leading `.` on
/// `domain` is ignored.
pub fn domain_matches(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let domain = domain.strip_prefix('.').unwrap_or(domain).to_ascii_lowercase();

    if host == domain {
        return true;
    }
    if host.parse::<IpAddr>().is_ok() {
        return false;
    }
    host.ends_with(&format!(".{domain}"))
}

/// RFC 6265 path-match.
pub fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    if !request_path.starts_with(cookie_path) {
        return false;
    }
    cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/')
}

fn normalize_host(host: &str) -> String {
    let host = host.to_lowercase();
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ipv4)) => ipv4.to_string(),
        Ok(IpAddr::V6(ipv6)) => format!("[{ipv6}]"),
        Err(_) => host,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        decode_component, domain_matches, extract_hostname, parse_origin, path_matches,
        removal_url,
    };

    #[test]
    fn test_parse_origin() {
        let origin = parse_origin("https://Sub.Example.com:8080/path").unwrap();
        assert_eq!(origin.hostname, "sub.example.com");
        assert_eq!(origin.protocol, "https:");

        assert_eq!(extract_hostname("http://192.168.1.1/").unwrap(), "192.168.1.1");
        assert_eq!(extract_hostname("https://[::1]:8080").unwrap(), "[::1]");
        assert_eq!(extract_hostname("https://www.example.com").unwrap(), "www.example.com");

        assert!(parse_origin("").is_err());
        assert!(parse_origin("about:blank").is_err());
        assert!(parse_origin("example.com/path").is_err());
    }

    #[test]
    fn test_removal_url() {
        assert_eq!(removal_url(".example.com", "/", true), "https://example.com/");
        assert_eq!(removal_url("example.com", "/app", false), "http://example.com/app");
        assert_eq!(removal_url("..odd.com", "/", false), "http://.odd.com/");
        assert_eq!(removal_url("example.com", "", false), "http://example.com/");
    }

    #[test]
    fn test_domain_matches() {
        assert!(domain_matches("example.com", ".example.com"));
        assert!(domain_matches("a.b.example.com", "example.com"));
        assert!(!domain_matches("badexample.com", "example.com"));
        assert!(!domain_matches("example.com", "sub.example.com"));
        assert!(!domain_matches("10.0.0.1", "0.0.1"));
    }

    #[test]
    fn test_path_matches() {
        assert!(path_matches("/", "/"));
        assert!(path_matches("/app/page", "/app"));
        assert!(path_matches("/app/page", "/app/"));
        assert!(!path_matches("/application", "/app"));
        assert!(!path_matches("/", "/app"));
    }

    #[test]
    fn test_decode_component() {
        assert_eq!(decode_component("hello%20world"), "hello world");
        assert_eq!(decode_component("Rust%E7%BC%96%E7%A8%8B"), "Rust编程");
        assert_eq!(decode_component("plain"), "plain");
    }
}
