use axum::http::HeaderMap;
use std::net::SocketAddr;

// Best-effort client key for rate limiting.
//
// Proxy headers are taken at face value: a client can forge x-forwarded-for
// unless a trusted proxy in front of us overwrites it.
pub fn resolve(headers: Option<&HeaderMap>, remote: Option<SocketAddr>) -> String {
    let Some(headers) = headers else {
        return "unknown".to_string();
    };

    // client, proxy1, proxy2 -> leftmost is the original client.
    // A blank leftmost entry counts as no header, so x-real-ip is tried next.
    if let Some(first) = header(headers, "x-forwarded-for").and_then(|v| v.split(',').next()) {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    if let Some(real_ip) = header(headers, "x-real-ip") {
        return real_ip.to_string();
    }

    match remote {
        Some(addr) => addr.ip().to_string(),
        None => "local".to_string(),
    }
}

// Non-empty, valid UTF-8 header value
fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, value.parse().unwrap());
        }
        map
    }

    fn peer() -> Option<SocketAddr> {
        Some("10.1.2.3:51000".parse().unwrap())
    }

    #[test]
    fn forwarded_for_takes_first_entry() {
        let h = headers(&[
            ("x-forwarded-for", " 203.0.113.7 , 10.0.0.1, 10.0.0.2"),
            ("x-real-ip", "198.51.100.1"),
        ]);
        assert_eq!(resolve(Some(&h), peer()), "203.0.113.7");
    }

    #[test]
    fn real_ip_when_no_forwarded_for() {
        let h = headers(&[("x-real-ip", "198.51.100.1")]);
        assert_eq!(resolve(Some(&h), peer()), "198.51.100.1");
    }

    #[test]
    fn falls_back_to_peer_address() {
        assert_eq!(resolve(Some(&HeaderMap::new()), peer()), "10.1.2.3");
    }

    #[test]
    fn local_without_any_source() {
        assert_eq!(resolve(Some(&HeaderMap::new()), None), "local");
    }

    #[test]
    fn unknown_without_headers() {
        assert_eq!(resolve(None, peer()), "unknown");
    }

    #[test]
    fn header_values_are_not_validated() {
        let h = headers(&[("x-forwarded-for", "definitely-not-an-ip")]);
        assert_eq!(resolve(Some(&h), None), "definitely-not-an-ip");
    }

    #[test]
    fn blank_forwarded_for_is_skipped() {
        let h = headers(&[("x-forwarded-for", " , 10.0.0.1"), ("x-real-ip", "198.51.100.1")]);
        assert_eq!(resolve(Some(&h), None), "198.51.100.1");
    }
}
