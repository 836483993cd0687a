//! HTTP-based external IP detection
//!
//! Queries a plain-text IP-echo service whose body is the caller's address.

use super::types::DetectionError;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tracing::{debug, info};

/// Default IP-echo service
pub const DEFAULT_HTTP_ENDPOINT: &str = "https://api.ipify.org";

/// Detect the external IPv4 address with a single GET request
///
/// # Errors
///
/// - `DetectionError::Timeout` if the request exceeds `timeout`
/// - `DetectionError::Http` on transport failure or a non-success status
/// - `DetectionError::InvalidResponse` if the body is not an IP address
/// - `DetectionError::NotIpv4` if the body is an IPv6 address
pub async fn discover_public_ip_via_http(
    url: &str,
    timeout: Duration,
) -> Result<Ipv4Addr, DetectionError> {
    info!("Querying IP-echo service {}", url);

    let client = reqwest::Client::builder().timeout(timeout).build()?;

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(map_reqwest_error)?;

    let body = response.text().await.map_err(map_reqwest_error)?;
    debug!("IP-echo response body: {:?}", body);

    let ip = parse_ip_body(&body)?;
    info!("External IP detected via HTTP: {} (from {})", ip, url);
    Ok(ip)
}

fn map_reqwest_error(e: reqwest::Error) -> DetectionError {
    if e.is_timeout() {
        DetectionError::Timeout
    } else {
        DetectionError::Http(e)
    }
}

/// Parse an IP-echo response body
///
/// Surrounding whitespace is ignored. Anything other than a bare IPv4
/// address is rejected.
pub fn parse_ip_body(body: &str) -> Result<Ipv4Addr, DetectionError> {
    let text = body.trim();
    match text.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => Ok(ip),
        Ok(ip @ IpAddr::V6(_)) => Err(DetectionError::NotIpv4(ip)),
        Err(_) => Err(DetectionError::InvalidResponse(format!(
            "Body is not an IP address: {:?}",
            truncate(text, 64)
        ))),
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip_body() {
        assert_eq!(parse_ip_body("203.0.113.9").unwrap(), Ipv4Addr::new(203, 0, 113, 9));
        assert_eq!(parse_ip_body("  8.8.8.8\r\n").unwrap(), Ipv4Addr::new(8, 8, 8, 8));
    }

    #[test]
    fn test_parse_ip_body_rejects_garbage() {
        assert!(matches!(
            parse_ip_body("<html>rate limited</html>"),
            Err(DetectionError::InvalidResponse(_))
        ));
        assert!(matches!(parse_ip_body(""), Err(DetectionError::InvalidResponse(_))));
        assert!(matches!(
            parse_ip_body("2001:db8::1"),
            Err(DetectionError::NotIpv4(_))
        ));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
        assert_eq!(truncate("ééé", 2), "éé");
    }
}
