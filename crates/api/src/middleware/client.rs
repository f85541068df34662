//! Client diagnostics recorded on each new refresh session.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Longest user agent stored on a session row.
pub const MAX_USER_AGENT_LEN: usize = 255;

/// User agent and client IP of the request that opened a session.
///
/// Purely informational: neither value is used for any security decision.
/// Extraction never fails; absent values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(ClientMeta {
            user_agent: user_agent(&parts.headers),
            ip_address: forwarded_ip(&parts.headers).or(peer),
        })
    }
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(USER_AGENT)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.chars().take(MAX_USER_AGENT_LEN).collect())
}

/// First hop of `X-Forwarded-For`, falling back to `X-Real-IP`.
fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let from_header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string)
    };
    from_header("x-forwarded-for").or_else(|| from_header("x-real-ip"))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, Request};

    use super::*;

    async fn extract(request: Request<()>) -> ClientMeta {
        let (mut parts, _) = request.into_parts();
        ClientMeta::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn empty_request_yields_nothing() {
        let meta = extract(Request::new(())).await;
        assert_eq!(meta, ClientMeta::default());
    }

    #[tokio::test]
    async fn first_forwarded_hop_wins_over_peer() {
        let mut request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.2")
            .header(USER_AGENT, "curl/8.0")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));

        let meta = extract(request).await;
        assert_eq!(meta.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(meta.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[tokio::test]
    async fn peer_address_is_used_without_proxy_headers() {
        let mut request = Request::new(());
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 9], 4000))));

        let meta = extract(request).await;
        assert_eq!(meta.ip_address.as_deref(), Some("192.168.1.9"));
    }

    #[test]
    fn long_user_agent_is_truncated() {
        let mut headers = HeaderMap::new();
        let long = "a".repeat(400);
        headers.insert(USER_AGENT, HeaderValue::from_str(&long).unwrap());

        let ua = user_agent(&headers).unwrap();
        assert_eq!(ua.len(), MAX_USER_AGENT_LEN);
    }
}
