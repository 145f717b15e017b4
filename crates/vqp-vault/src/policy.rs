//! Access policy enforcement (`spec.md` §4.4): rate limiting first, then
//! exact-path and wildcard-path rules, falling back to a default.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPolicy {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub requests_per_hour: u32,
}

/// `{allowed_paths, wildcard_paths, default_policy, rate_limits}`, per
/// `spec.md` §3's Access Policy shape.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    pub allowed_paths: HashMap<String, Vec<String>>,
    pub wildcard_paths: HashMap<String, Vec<String>>,
    pub default_policy: DefaultPolicy,
    pub rate_limits: HashMap<String, RateLimitConfig>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            allowed_paths: HashMap::new(),
            wildcard_paths: HashMap::new(),
            default_policy: DefaultPolicy::Deny,
            rate_limits: HashMap::new(),
        }
    }
}

impl AccessPolicy {
    /// Whether `requester` may access `path`, ignoring rate limits.
    /// Exact match wins, then the first matching glob, then the default.
    pub fn path_allowed(&self, path: &str, requester: &str) -> bool {
        if let Some(requesters) = self.allowed_paths.get(path) {
            return requester_matches(requesters, requester);
        }

        for (pattern, requesters) in &self.wildcard_paths {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(path) && requester_matches(requesters, requester) {
                    return true;
                }
            }
        }

        matches!(self.default_policy, DefaultPolicy::Allow)
    }
}

fn requester_matches(allowed: &[String], requester: &str) -> bool {
    allowed.iter().any(|r| r == "*" || r == requester)
}

/// Dual per-requester rate limiting: both the per-minute and per-hour
/// bound must hold, the stricter one governing (design decision recorded
/// in `DESIGN.md`).
#[derive(Debug, Default)]
pub struct RateLimiter {
    history: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt for `requester` and report whether it is within
    /// both bounds in `config`. A requester with no configured limit is
    /// unbounded.
    pub fn check_and_record(&self, requester: &str, config: Option<&RateLimitConfig>) -> bool {
        let Some(config) = config else {
            return true;
        };

        let now = Instant::now();
        let mut history = self.history.lock().expect("rate limiter lock poisoned");
        let entries = history.entry(requester.to_string()).or_default();
        entries.retain(|t| now.duration_since(*t) < Duration::from_secs(3600));

        let within_minute = entries
            .iter()
            .filter(|t| now.duration_since(**t) < Duration::from_secs(60))
            .count();
        let within_hour = entries.len();

        if within_minute >= config.requests_per_minute as usize
            || within_hour >= config.requests_per_hour as usize
        {
            return false;
        }

        entries.push(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wildcard_requester_allows_anyone() {
        let mut policy = AccessPolicy::default();
        policy
            .allowed_paths
            .insert("personal.age".into(), vec!["*".into()]);
        assert!(policy.path_allowed("personal.age", "did:example:anyone"));
    }

    #[test]
    fn exact_match_named_requester_only() {
        let mut policy = AccessPolicy::default();
        policy
            .allowed_paths
            .insert("financial.annual_income".into(), vec!["did:example:alice".into()]);
        assert!(policy.path_allowed("financial.annual_income", "did:example:alice"));
        assert!(!policy.path_allowed("financial.annual_income", "did:example:bob"));
    }

    #[test]
    fn wildcard_path_glob_matches() {
        let mut policy = AccessPolicy::default();
        policy
            .wildcard_paths
            .insert("health.*".into(), vec!["*".into()]);
        assert!(policy.path_allowed("health.vaccinations", "did:example:anyone"));
        assert!(!policy.path_allowed("financial.annual_income", "did:example:anyone"));
    }

    #[test]
    fn default_policy_governs_unmatched_paths() {
        let mut policy = AccessPolicy::default();
        policy.default_policy = DefaultPolicy::Allow;
        assert!(policy.path_allowed("unmatched.path", "anyone"));
        policy.default_policy = DefaultPolicy::Deny;
        assert!(!policy.path_allowed("unmatched.path", "anyone"));
    }

    #[test]
    fn rate_limiter_denies_once_per_minute_bound_exhausted() {
        let limiter = RateLimiter::new();
        let config = RateLimitConfig {
            requests_per_minute: 2,
            requests_per_hour: 1000,
        };
        assert!(limiter.check_and_record("r1", Some(&config)));
        assert!(limiter.check_and_record("r1", Some(&config)));
        assert!(!limiter.check_and_record("r1", Some(&config)));
    }

    #[test]
    fn rate_limiter_honors_stricter_of_the_two_bounds() {
        let limiter = RateLimiter::new();
        let config = RateLimitConfig {
            requests_per_minute: 1000,
            requests_per_hour: 1,
        };
        assert!(limiter.check_and_record("r2", Some(&config)));
        assert!(!limiter.check_and_record("r2", Some(&config)));
    }

    #[test]
    fn unconfigured_requester_is_unbounded() {
        let limiter = RateLimiter::new();
        for _ in 0..10 {
            assert!(limiter.check_and_record("unbounded", None));
        }
    }
}
