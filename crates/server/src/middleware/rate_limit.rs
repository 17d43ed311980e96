//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the routes that call the language model are limited; everything else
//! is a cheap database round trip.
//!
//! Clients are keyed on the TCP peer address. Behind a proxy every peer is
//! the proxy, so set `TRUST_PROXY_HEADERS=true` there and the client address
//! is read from the headers the proxy sets instead.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::error::AppError;

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Headers set by a single trusted proxy, checked in order.
///
/// Fly.io sets `fly-client-ip`; Cloudflare sets `cf-connecting-ip`.
const SINGLE_ADDRESS_HEADERS: &[&str] = &["fly-client-ip", "cf-connecting-ip", "x-real-ip"];

/// Keys the limiter on the client IP.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpKeyExtractor {
    /// Read the client address from proxy headers before the peer address.
    pub trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    fn from_headers<T>(req: &Request<T>) -> Option<IpAddr> {
        let headers = req.headers();
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        SINGLE_ADDRESS_HEADERS
            .iter()
            .filter_map(|&name| header(name))
            .find_map(|value| value.trim().parse().ok())
            // Proxies append to x-forwarded-for; only the last hop was added
            // by ours. Earlier entries are whatever the client sent.
            .or_else(|| header("x-forwarded-for")?.rsplit(',').next()?.trim().parse().ok())
    }

    fn from_peer<T>(req: &Request<T>) -> Option<IpAddr> {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let proxied = if self.trust_proxy_headers {
            Self::from_headers(req)
        } else {
            None
        };
        proxied
            .or_else(|| Self::from_peer(req))
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
///
/// Keyed by [`ClientIpKeyExtractor`].
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Seconds to earn back one request.
const REPLENISH_SECS: u64 = 6;

/// Requests a client may make back to back.
const BURST: u32 = 5;

/// Limiter for the language model routes: a burst of five, then one request
/// every six seconds per client IP.
///
/// Rejections use the API's JSON error body.
///
/// # Panics
///
/// Never in practice: both constants are non-zero, which is all
/// `GovernorConfigBuilder::finish` checks.
#[must_use]
pub fn llm_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor {
            trust_proxy_headers,
        })
        .per_second(REPLENISH_SECS)
        .burst_size(BURST)
        .finish()
        .expect("non-zero replenish period and burst");
    GovernorLayer::new(Arc::new(config)).error_handler(rejection_response)
}

fn rejection_response(err: GovernorError) -> Response {
    match err {
        GovernorError::TooManyRequests { wait_time, .. } => {
            AppError::RateLimited {
                retry_after: wait_time,
            }
            .into_response()
        }
        GovernorError::UnableToExtractKey => {
            AppError::Internal("no client address to rate limit on".to_string()).into_response()
        }
        GovernorError::Other { msg, .. } => {
            AppError::Internal(msg.unwrap_or_else(|| "rate limiter failed".to_string()))
                .into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::{Router, routing::get};
    use serde_json::Value;
    use tower::ServiceExt;
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    const PROXIED: ClientIpKeyExtractor = ClientIpKeyExtractor {
        trust_proxy_headers: true,
    };
    const DIRECT: ClientIpKeyExtractor = ClientIpKeyExtractor {
        trust_proxy_headers: false,
    };

    fn request(peer: Option<[u8; 4]>, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/api/recipes");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        if let Some(ip) = peer {
            builder = builder.extension(ConnectInfo(SocketAddr::from((ip, 52_000))));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn limited_app(trust_proxy_headers: bool) -> Router {
        Router::new()
            .route("/api/recipes", get(|| async { "ok" }).post(|| async { "ok" }))
            .layer(llm_rate_limiter(trust_proxy_headers))
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_direct_mode_ignores_proxy_headers() {
        let req = request(Some([192, 0, 2, 10]), &[("x-forwarded-for", "203.0.113.7")]);
        assert_eq!(DIRECT.extract(&req).unwrap().to_string(), "192.0.2.10");
    }

    #[test]
    fn test_proxied_mode_prefers_platform_headers() {
        let req = request(
            Some([10, 0, 0, 2]),
            &[
                ("x-forwarded-for", "10.0.0.1"),
                ("cf-connecting-ip", "203.0.113.7"),
                ("fly-client-ip", "2001:db8::1"),
            ],
        );
        assert_eq!(PROXIED.extract(&req).unwrap().to_string(), "2001:db8::1");
    }

    #[test]
    fn test_proxied_mode_takes_last_forwarded_for_hop() {
        let req = request(None, &[("x-forwarded-for", "1.2.3.4, 198.51.100.4")]);
        assert_eq!(PROXIED.extract(&req).unwrap().to_string(), "198.51.100.4");
    }

    #[test]
    fn test_proxied_mode_falls_back_to_peer() {
        let req = request(Some([192, 0, 2, 10]), &[("x-real-ip", "not an ip")]);
        assert_eq!(PROXIED.extract(&req).unwrap().to_string(), "192.0.2.10");
    }

    #[test]
    fn test_no_address_is_error() {
        assert!(DIRECT.extract(&request(None, &[])).is_err());
        assert!(PROXIED.extract(&request(None, &[])).is_err());
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_is_still_limited() {
        let app = limited_app(false);

        for n in 0..BURST {
            let spoofed = format!("203.0.113.{n}");
            let req = request(Some([192, 0, 2, 10]), &[("x-forwarded-for", spoofed.as_str())]);
            let response = app.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let req = request(Some([192, 0, 2, 10]), &[("x-forwarded-for", "203.0.113.99")]);
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));

        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Too many requests"));
    }

    #[tokio::test]
    async fn test_unkeyed_request_gets_json_error() {
        let response = limited_app(false).oneshot(request(None, &[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Internal server error");
    }
}
