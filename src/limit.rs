//! Fixed-window per-client rate limiting.
//!
//! Counters live in process memory keyed by client IP, reset when the window
//! rolls over, and are not shared across server instances. Violations get a
//! standard 429 before any business logic runs.

use crate::errors::AppError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// How many requests a single client may make per window.
#[derive(Clone, Copy, Debug)]
pub struct Quota {
    pub max_requests: u32,
    pub window: Duration,
}

impl Quota {
    pub const fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Per-IP fixed-window counter.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    quota: Quota,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(quota: Quota) -> Self {
        Self {
            quota,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request from `key`. Returns false when the quota for the
    /// current window is exhausted.
    pub fn try_acquire(&self, key: IpAddr) -> bool {
        self.try_acquire_at(key, Instant::now())
    }

    fn try_acquire_at(&self, key: IpAddr, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let window = windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.quota.window {
            window.started = now;
            window.count = 0;
        }

        if window.count < self.quota.max_requests {
            window.count += 1;
            true
        } else {
            false
        }
    }
}

/// Determine the client key for limiting.
///
/// Prefers the first `X-Forwarded-For` entry (the service usually sits
/// behind a proxy), falling back to the socket peer address.
fn client_ip(req: &Request) -> IpAddr {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        && let Some(first) = forwarded.split(',').next()
        && let Ok(ip) = first.trim().parse::<IpAddr>()
    {
        return ip;
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Axum middleware enforcing a [`FixedWindowLimiter`] for a route group.
pub async fn rate_limit(
    State(limiter): State<Arc<FixedWindowLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_ip(&req);
    if limiter.try_acquire(key) {
        next.run(req).await
    } else {
        tracing::warn!(client = %key, "rate limit exceeded");
        AppError::new(StatusCode::TOO_MANY_REQUESTS, "too many requests").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn quota_exhausts_on_the_1001st_request() {
        let limiter = FixedWindowLimiter::new(Quota::per_minute(1000));
        for _ in 0..1000 {
            assert!(limiter.try_acquire(ip(1)));
        }
        assert!(!limiter.try_acquire(ip(1)));
    }

    #[test]
    fn clients_are_limited_independently() {
        let limiter = FixedWindowLimiter::new(Quota::per_minute(1));
        assert!(limiter.try_acquire(ip(1)));
        assert!(!limiter.try_acquire(ip(1)));
        assert!(limiter.try_acquire(ip(2)));
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let limiter = FixedWindowLimiter::new(Quota::per_minute(2));
        let start = Instant::now();
        assert!(limiter.try_acquire_at(ip(1), start));
        assert!(limiter.try_acquire_at(ip(1), start));
        assert!(!limiter.try_acquire_at(ip(1), start + Duration::from_secs(30)));
        assert!(limiter.try_acquire_at(ip(1), start + Duration::from_secs(61)));
    }
}
