//! Request-scoped context.
//!
//! Each inbound request runs inside a task-local scope holding values derived
//! from that request (currently the externally visible base URL). Anything
//! awaited transitively within the scope sees the same context; concurrent
//! requests never observe each other's. Reads outside any scope degrade to
//! `None` rather than failing.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use std::future::Future;

tokio::task_local! {
    static REQUEST_CONTEXT: RequestContext;
}

/// Raw request metadata the context is derived from.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    /// `Host` header.
    pub host: Option<String>,
    /// `X-Forwarded-Host` header, as set by a reverse proxy.
    pub forwarded_host: Option<String>,
    /// Protocol observed on the connection itself (`http`/`https`).
    pub scheme: Option<String>,
    /// `X-Forwarded-Proto` header, as set by a reverse proxy.
    pub forwarded_proto: Option<String>,
}

impl RequestMetadata {
    fn from_service_request(req: &ServiceRequest) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let scheme = if req.app_config().secure() {
            "https"
        } else {
            "http"
        };
        Self {
            host: header("host"),
            forwarded_host: header("x-forwarded-host"),
            scheme: Some(scheme.to_owned()),
            forwarded_proto: header("x-forwarded-proto"),
        }
    }
}

/// Values bound for the duration of one request. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub base_url: Option<String>,
}

/// Derive the externally visible base URL from request metadata.
///
/// Host resolution prefers the forwarded host (first entry when the proxy
/// appended a list) over the direct `Host` header; protocol resolution
/// prefers the forwarded protocol over the connection's own, defaulting to
/// plain `http`. Returns `None` when no usable host is present.
pub fn derive_base_url(meta: &RequestMetadata) -> Option<String> {
    let host = meta
        .forwarded_host
        .as_deref()
        .and_then(|h| h.split(',').next())
        .or(meta.host.as_deref())
        .map(str::trim)
        .filter(|h| !h.is_empty())?;

    let proto = meta
        .forwarded_proto
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .or(meta.scheme.as_deref())
        .unwrap_or("http");

    Some(format!("{proto}://{host}"))
}

/// Run `fut` with a request context derived from `meta` bound to it. All
/// asynchronous work spawned from within `fut` by awaiting inherits the
/// context; tasks detached via `tokio::spawn` do not.
pub async fn with_context<F: Future>(meta: RequestMetadata, fut: F) -> F::Output {
    let ctx = RequestContext {
        base_url: derive_base_url(&meta),
    };
    REQUEST_CONTEXT.scope(ctx, fut).await
}

/// Base URL of the request currently being handled, or `None` when called
/// outside any request scope. Never panics.
pub fn base_url() -> Option<String> {
    REQUEST_CONTEXT
        .try_with(|ctx| ctx.base_url.clone())
        .ok()
        .flatten()
}

/// Middleware establishing the request context before any handler runs.
/// Registered once in `build_server`.
pub async fn bind_request_context(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let meta = RequestMetadata::from_service_request(&req);
    with_context(meta, next.call(req)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn meta(
        host: Option<&str>,
        forwarded_host: Option<&str>,
        scheme: Option<&str>,
        forwarded_proto: Option<&str>,
    ) -> RequestMetadata {
        RequestMetadata {
            host: host.map(str::to_owned),
            forwarded_host: forwarded_host.map(str::to_owned),
            scheme: scheme.map(str::to_owned),
            forwarded_proto: forwarded_proto.map(str::to_owned),
        }
    }

    #[test]
    fn forwarded_host_wins_over_host() {
        let m = meta(Some("h.com"), Some("f.com"), Some("http"), None);
        assert_eq!(derive_base_url(&m), Some("http://f.com".to_owned()));
    }

    #[test]
    fn forwarded_host_list_uses_first_entry() {
        let m = meta(Some("h.com"), Some("f.com, proxy.internal"), None, None);
        assert_eq!(derive_base_url(&m), Some("http://f.com".to_owned()));
    }

    #[test]
    fn no_host_yields_none() {
        let m = meta(None, None, Some("https"), Some("https"));
        assert_eq!(derive_base_url(&m), None);
    }

    #[test]
    fn empty_host_yields_none() {
        let m = meta(Some("   "), None, None, None);
        assert_eq!(derive_base_url(&m), None);
    }

    #[test]
    fn forwarded_proto_wins_over_scheme() {
        let m = meta(Some("h.com"), None, Some("http"), Some("https"));
        assert_eq!(derive_base_url(&m), Some("https://h.com".to_owned()));
    }

    #[test]
    fn protocol_defaults_to_http() {
        let m = meta(Some("h.com"), None, None, None);
        assert_eq!(derive_base_url(&m), Some("http://h.com".to_owned()));
    }

    #[test]
    fn read_outside_any_scope_is_none() {
        assert_eq!(base_url(), None);
    }

    async fn read_at_depth() -> Option<String> {
        // An extra await point between the scope and the read.
        tokio::time::sleep(Duration::from_millis(5)).await;
        base_url()
    }

    #[tokio::test]
    async fn concurrent_scopes_stay_isolated() {
        let a = with_context(meta(Some("a.example.com"), None, None, None), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            read_at_depth().await
        });
        let b = with_context(meta(Some("b.example.com"), None, None, None), async {
            read_at_depth().await
        });

        let (a, b) = tokio::join!(a, b);
        assert_eq!(a, Some("http://a.example.com".to_owned()));
        assert_eq!(b, Some("http://b.example.com".to_owned()));
    }

    #[tokio::test]
    async fn spawned_tasks_do_not_inherit_the_scope() {
        let outside = with_context(meta(Some("a.example.com"), None, None, None), async {
            tokio::spawn(async { base_url() })
                .await
                .expect("task panicked")
        })
        .await;
        assert_eq!(outside, None);
    }
}
