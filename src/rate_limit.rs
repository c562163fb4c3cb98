//! Sliding-window rate limiter keyed by IP address.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Outcome of a permitted request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allowance {
    pub limit: u32,
    pub remaining: u32,
}

/// An in-process sliding-window log limiter keyed by client IP.
/// Each IP keeps the instants of its requests inside the window, so memory is bounded by `max_requests` per IP.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    hits: Mutex<HashMap<IpAddr, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<IpAddr, VecDeque<Instant>>> {
        self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a request from `ip` if it fits in the window.
    ///
    /// Returns the remaining allowance, or `Err(retry_after)` with the time until the oldest hit expires.
    pub fn check(&self, ip: IpAddr) -> Result<Allowance, Duration> {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> Result<Allowance, Duration> {
        let mut hits = self.lock();
        let log = hits.entry(ip).or_default();

        while let Some(&oldest) = log.front() {
            if now.duration_since(oldest) >= self.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() as u32 >= self.max_requests {
            let retry_after = log
                .front()
                .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(self.window);
            return Err(retry_after.max(Duration::from_secs(1)));
        }

        log.push_back(now);
        Ok(Allowance {
            limit: self.max_requests,
            remaining: self.max_requests - log.len() as u32,
        })
    }

    /// Drop IPs with no hits inside the window.
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    fn cleanup_at(&self, now: Instant) {
        let window = self.window;
        self.lock()
            .retain(|_, log| log.back().is_some_and(|last| now.duration_since(*last) < window));
    }

    pub fn tracked_ips(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCAL: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn within_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert_eq!(limiter.check(LOCAL).unwrap().remaining, 2);
        assert_eq!(limiter.check(LOCAL).unwrap().remaining, 1);
        assert_eq!(limiter.check(LOCAL).unwrap().remaining, 0);
    }

    #[test]
    fn over_limit() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.check(LOCAL).is_ok());
        assert!(limiter.check(LOCAL).is_ok());
        let retry = limiter.check(LOCAL).unwrap_err();
        assert!(retry <= Duration::from_secs(60));
        assert!(retry >= Duration::from_secs(1));
    }

    #[test]
    fn different_ips_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let ip1 = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let ip2 = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        assert!(limiter.check(ip1).is_ok());
        assert!(limiter.check(ip2).is_ok());
        assert!(limiter.check(ip1).is_err());
    }

    #[test]
    fn window_slides() {
        let window = Duration::from_secs(900);
        let limiter = RateLimiter::new(2, window);
        let start = Instant::now();
        assert!(limiter.check_at(LOCAL, start).is_ok());
        assert!(limiter.check_at(LOCAL, start + Duration::from_secs(600)).is_ok());
        assert!(limiter.check_at(LOCAL, start + Duration::from_secs(899)).is_err());
        // first hit has left the window, second has not
        assert!(limiter.check_at(LOCAL, start + Duration::from_secs(900)).is_ok());
        let retry = limiter
            .check_at(LOCAL, start + Duration::from_secs(901))
            .unwrap_err();
        assert_eq!(retry, Duration::from_secs(599));
    }

    #[test]
    fn rejected_requests_are_not_counted() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();
        assert!(limiter.check_at(LOCAL, start).is_ok());
        for s in 1..10 {
            assert!(limiter.check_at(LOCAL, start + Duration::from_secs(s)).is_err());
        }
        assert!(limiter.check_at(LOCAL, start + Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn cleanup_removes_stale() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));
        let start = Instant::now();
        let _ = limiter.check_at(LOCAL, start);
        assert_eq!(limiter.tracked_ips(), 1);
        limiter.cleanup_at(start + Duration::from_secs(10));
        assert_eq!(limiter.tracked_ips(), 0);
    }
}
