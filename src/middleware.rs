//! Response security headers and the per-IP rate limit for `/api` routes.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::Config;
use crate::state::AppState;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

const RATE_LIMIT_LIMIT: &str = "ratelimit-limit";
const RATE_LIMIT_REMAINING: &str = "ratelimit-remaining";

/// CSP: self-origin by default, the asset host for styles and fonts, inline styles/scripts, images from self, data URIs, and any HTTPS origin.
pub fn content_security_policy(asset_host: &str) -> String {
    [
        "default-src 'self'".to_string(),
        "base-uri 'self'".to_string(),
        format!("font-src 'self' {}", asset_host),
        "form-action 'self'".to_string(),
        "frame-ancestors 'self'".to_string(),
        "img-src 'self' data: https:".to_string(),
        "object-src 'none'".to_string(),
        "script-src 'self' 'unsafe-inline'".to_string(),
        format!("style-src 'self' 'unsafe-inline' {}", asset_host),
    ]
    .join("; ")
}

/// Headers set on every response.
pub fn security_headers(config: &Config) -> Vec<(HeaderName, HeaderValue)> {
    let csp = HeaderValue::from_str(&content_security_policy(&config.asset_host)).unwrap_or_else(|_| {
        tracing::warn!(asset_host = %config.asset_host, "asset host is not a valid header value, omitting it from the CSP");
        HeaderValue::from_str(&content_security_policy("")).unwrap_or(HeaderValue::from_static("default-src 'self'"))
    });
    vec![
        (header::CONTENT_SECURITY_POLICY, csp),
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=15552000; includeSubDomains"),
        ),
        (header::X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("off")),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("x-permitted-cross-domain-policies"),
            HeaderValue::from_static("none"),
        ),
    ]
}

/// Client IP: first `X-Forwarded-For` hop when the proxy is trusted, else the socket peer.
pub fn client_ip(req: &Request, trust_proxy: bool) -> IpAddr {
    if trust_proxy {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip;
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let ip = client_ip(&req, state.config.trust_proxy);
    match state.limiter.check(ip) {
        Ok(allowance) => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(allowance.limit));
            headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(allowance.remaining));
            response
        }
        Err(retry_after) => {
            tracing::warn!(%ip, retry_after_secs = retry_after.as_secs(), "rate limit exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                [
                    (header::RETRY_AFTER, HeaderValue::from(retry_after.as_secs())),
                    (HeaderName::from_static(RATE_LIMIT_LIMIT), HeaderValue::from(state.limiter.max_requests())),
                    (HeaderName::from_static(RATE_LIMIT_REMAINING), HeaderValue::from(0u32)),
                ],
                RATE_LIMIT_MESSAGE,
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn csp_allows_asset_host_for_styles_and_fonts() {
        let csp = content_security_policy("https://cdn.example.com");
        assert!(csp.contains("default-src 'self'"));
        assert!(csp.contains("style-src 'self' 'unsafe-inline' https://cdn.example.com"));
        assert!(csp.contains("font-src 'self' https://cdn.example.com"));
        assert!(csp.contains("script-src 'self' 'unsafe-inline'"));
        assert!(csp.contains("img-src 'self' data: https:"));
    }

    #[test]
    fn bad_asset_host_is_dropped() {
        let config = Config {
            asset_host: "https://bad\nhost".into(),
            ..Config::default()
        };
        let headers = security_headers(&config);
        let (_, csp) = headers
            .iter()
            .find(|(name, _)| name == header::CONTENT_SECURITY_POLICY)
            .unwrap();
        assert!(!csp.to_str().unwrap().contains("bad"));
    }

    #[test]
    fn ip_from_connect_info() {
        let mut req = Request::new(Body::empty());
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 1, 2, 3], 4000))));
        assert_eq!(client_ip(&req, false), IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3)));
    }

    #[test]
    fn forwarded_for_only_when_trusted() {
        let mut req = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000))));
        assert_eq!(client_ip(&req, true), IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9)));
        assert_eq!(client_ip(&req, false), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn missing_peer_falls_back() {
        let req = Request::new(Body::empty());
        assert_eq!(client_ip(&req, true), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }
}
