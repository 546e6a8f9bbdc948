//! Failed-login throttle
//!
//! Tracks failed admin logins per client IP. Once an address reaches the
//! failure limit it is locked out for a fixed window; a successful login
//! clears its record.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct ThrottleEntry {
    failures: u32,
    /// Set once `failures` reaches the limit.
    locked_until: Option<Instant>,
    last_failure: Option<Instant>,
}

#[derive(Debug)]
pub struct LoginThrottle {
    max_failures: u32,
    lockout: Duration,
    entries: Mutex<HashMap<IpAddr, ThrottleEntry>>,
}

impl LoginThrottle {
    pub fn new(max_failures: u32, lockout: Duration) -> Self {
        Self {
            max_failures: max_failures.max(1),
            lockout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true while `ip` is locked out. Expired lockouts are dropped.
    pub fn is_locked(&self, ip: IpAddr, now: Instant) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&ip).and_then(|e| e.locked_until) {
            Some(until) if now < until => true,
            Some(_) => {
                entries.remove(&ip);
                tracing::debug!("[throttle] lockout expired ip={}", ip);
                false
            }
            None => false,
        }
    }

    /// Record a failed attempt. Returns true if this failure locked `ip` out.
    pub fn record_failure(&self, ip: IpAddr, now: Instant) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        prune_locked(&mut entries, now, self.lockout);

        let entry = entries.entry(ip).or_default();
        entry.failures += 1;
        entry.last_failure = Some(now);
        tracing::debug!("[throttle] add ip={} failures={}", ip, entry.failures);

        if entry.failures >= self.max_failures && entry.locked_until.is_none() {
            entry.locked_until = Some(now + self.lockout);
            tracing::warn!(
                "[throttle] lockout ip={} secs={}",
                ip,
                self.lockout.as_secs()
            );
            return true;
        }
        false
    }

    /// Forget `ip` (called after a successful login).
    pub fn clear(&self, ip: IpAddr) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&ip);
    }

    /// Number of addresses currently tracked.
    pub fn tracked(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Drop expired lockouts and failure counts that went quiet for a whole
/// lockout window.
fn prune_locked(entries: &mut HashMap<IpAddr, ThrottleEntry>, now: Instant, window: Duration) {
    entries.retain(|_, entry| match entry.locked_until {
        Some(until) => now < until,
        None => entry
            .last_failure
            .is_some_and(|t| now.saturating_duration_since(t) < window),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const IP: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7));
    const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 8));

    #[test]
    fn test_locks_after_limit() {
        let throttle = LoginThrottle::new(3, Duration::from_secs(60));
        let now = Instant::now();

        assert!(!throttle.record_failure(IP, now));
        assert!(!throttle.record_failure(IP, now));
        assert!(!throttle.is_locked(IP, now));
        assert!(throttle.record_failure(IP, now));
        assert!(throttle.is_locked(IP, now));
        assert!(!throttle.is_locked(OTHER, now));
    }

    #[test]
    fn test_lockout_expires() {
        let throttle = LoginThrottle::new(1, Duration::from_secs(60));
        let now = Instant::now();

        throttle.record_failure(IP, now);
        assert!(throttle.is_locked(IP, now + Duration::from_secs(59)));
        assert!(!throttle.is_locked(IP, now + Duration::from_secs(61)));
        assert_eq!(throttle.tracked(), 0);
    }

    #[test]
    fn test_clear_resets_count() {
        let throttle = LoginThrottle::new(2, Duration::from_secs(60));
        let now = Instant::now();

        throttle.record_failure(IP, now);
        throttle.clear(IP);
        assert!(!throttle.record_failure(IP, now));
        assert!(!throttle.is_locked(IP, now));
    }

    #[test]
    fn test_stale_failures_pruned() {
        let throttle = LoginThrottle::new(5, Duration::from_secs(60));
        let now = Instant::now();

        throttle.record_failure(IP, now);
        throttle.record_failure(OTHER, now + Duration::from_secs(120));
        assert_eq!(throttle.tracked(), 1);
    }
}
