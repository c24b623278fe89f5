//! Login rate limiter
//!
//! Two sliding windows guard the login endpoint:
//! - failed attempts per account (default 5 per 15 minutes)
//! - requests per client IP (default 10 per minute)

use crate::config::AuthConfig;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use tokio::sync::RwLock;

/// In-memory login rate limiter
pub struct LoginRateLimiter {
    max_attempts: usize,
    lockout: Duration,
    ip_limit: usize,
    account_attempts: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
    ip_requests: RwLock<HashMap<IpAddr, Vec<DateTime<Utc>>>>,
}

impl LoginRateLimiter {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            max_attempts: config.max_login_attempts as usize,
            lockout: Duration::minutes(config.lockout_minutes),
            ip_limit: config.ip_requests_per_minute as usize,
            account_attempts: RwLock::new(HashMap::new()),
            ip_requests: RwLock::new(HashMap::new()),
        }
    }

    /// Whether the account has too many recent failures
    pub async fn is_account_limited(&self, login: &str) -> bool {
        self.account_retry_after(login).await.is_some()
    }

    /// Seconds until a locked account may try again, `None` when it is not locked
    pub async fn account_retry_after(&self, login: &str) -> Option<u64> {
        let now = Utc::now();
        let mut attempts = self.account_attempts.write().await;
        let times = attempts.entry(login.to_lowercase()).or_default();
        times.retain(|time| *time > now - self.lockout);
        retry_after(times, self.max_attempts, self.lockout, now)
    }

    pub async fn record_failed_attempt(&self, login: &str) {
        let mut attempts = self.account_attempts.write().await;
        attempts
            .entry(login.to_lowercase())
            .or_default()
            .push(Utc::now());
    }

    /// Forget failures after a successful login
    pub async fn clear_account(&self, login: &str) {
        self.account_attempts
            .write()
            .await
            .remove(&login.to_lowercase());
    }

    /// Whether the IP used up its per-minute budget
    pub async fn is_ip_limited(&self, ip: IpAddr) -> bool {
        self.ip_retry_after(ip).await.is_some()
    }

    /// Seconds until the IP gets budget back, `None` when it has some left
    pub async fn ip_retry_after(&self, ip: IpAddr) -> Option<u64> {
        let now = Utc::now();
        let window = Duration::minutes(1);
        let mut requests = self.ip_requests.write().await;
        let times = requests.entry(ip).or_default();
        times.retain(|time| *time > now - window);
        retry_after(times, self.ip_limit, window, now)
    }

    pub async fn record_ip_request(&self, ip: IpAddr) {
        self.ip_requests
            .write()
            .await
            .entry(ip)
            .or_default()
            .push(Utc::now());
    }

    /// Drop stale entries. Run periodically.
    pub async fn cleanup(&self) {
        let now = Utc::now();
        let account_cutoff = now - self.lockout;
        let ip_cutoff = now - Duration::minutes(1);

        self.account_attempts.write().await.retain(|_, times| {
            times.retain(|time| *time > account_cutoff);
            !times.is_empty()
        });
        self.ip_requests.write().await.retain(|_, times| {
            times.retain(|time| *time > ip_cutoff);
            !times.is_empty()
        });
    }

    #[cfg(test)]
    async fn tracked_accounts(&self) -> usize {
        self.account_attempts.read().await.len()
    }
}

/// Time left until the window holds fewer than `limit` entries.
/// `times` is in insertion order and already pruned to the window.
fn retry_after(
    times: &[DateTime<Utc>],
    limit: usize,
    window: Duration,
    now: DateTime<Utc>,
) -> Option<u64> {
    if times.len() < limit {
        return None;
    }
    // Entry whose expiry brings the count back under the limit
    let freeing = times[times.len() - limit];
    let remaining = (freeing + window - now).num_milliseconds();
    Some(((remaining + 999) / 1000).max(1) as u64)
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_account_lockout_after_max_failures() {
        let limiter = LoginRateLimiter::default();

        for _ in 0..4 {
            assert!(!limiter.is_account_limited("editor").await);
            limiter.record_failed_attempt("editor").await;
        }
        limiter.record_failed_attempt("editor").await;
        assert!(limiter.is_account_limited("editor").await);

        limiter.clear_account("editor").await;
        assert!(!limiter.is_account_limited("editor").await);
    }

    #[tokio::test]
    async fn test_account_key_is_case_insensitive() {
        let limiter = LoginRateLimiter::new(&AuthConfig {
            max_login_attempts: 2,
            ..AuthConfig::default()
        });
        limiter.record_failed_attempt("Desk@Example.in").await;
        limiter.record_failed_attempt("desk@example.in").await;
        assert!(limiter.is_account_limited("DESK@EXAMPLE.IN").await);
    }

    #[tokio::test]
    async fn test_ip_budget() {
        let limiter = LoginRateLimiter::default();
        let ip = IpAddr::from_str("10.0.0.7").unwrap();

        for _ in 0..10 {
            assert!(!limiter.is_ip_limited(ip).await);
            limiter.record_ip_request(ip).await;
        }
        assert!(limiter.is_ip_limited(ip).await);

        let other = IpAddr::from_str("10.0.0.8").unwrap();
        assert!(!limiter.is_ip_limited(other).await);
    }

    #[tokio::test]
    async fn test_account_retry_after_counts_down() {
        let limiter = LoginRateLimiter::new(&AuthConfig {
            max_login_attempts: 2,
            lockout_minutes: 15,
            ..AuthConfig::default()
        });
        assert_eq!(limiter.account_retry_after("desk").await, None);

        // An old failure and a fresh one
        limiter
            .account_attempts
            .write()
            .await
            .insert("desk".to_string(), vec![Utc::now() - Duration::minutes(10), Utc::now()]);

        let wait = limiter.account_retry_after("desk").await.unwrap();
        assert!(wait > 4 * 60 && wait <= 5 * 60, "wait was {}", wait);
    }

    #[test]
    fn test_retry_after_uses_entry_that_frees_a_slot() {
        let now = Utc::now();
        let window = Duration::minutes(1);
        let times = vec![
            now - Duration::seconds(50),
            now - Duration::seconds(30),
            now - Duration::seconds(5),
        ];

        assert_eq!(retry_after(&times, 4, window, now), None);
        assert_eq!(retry_after(&times, 3, window, now), Some(10));
        assert_eq!(retry_after(&times, 2, window, now), Some(30));
    }

    #[tokio::test]
    async fn test_cleanup_drops_empty_entries() {
        let limiter = LoginRateLimiter::default();
        assert!(!limiter.is_account_limited("nobody").await);
        limiter.record_failed_attempt("someone").await;

        limiter.cleanup().await;
        assert_eq!(limiter.tracked_accounts().await, 1);
    }
}
