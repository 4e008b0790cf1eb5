use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Instant;

use super::entity::{AdmissionPolicy, TokenBucket};

/// Per-client admission engine: one token bucket per observed IP.
///
/// The bucket map is bounded by `max_tracked_ips`. The observed design it
/// replaces grew without bound, which is a resource-exhaustion risk under
/// a high-cardinality source; at capacity this engine first prunes buckets
/// idle long enough to have fully refilled (indistinguishable from fresh),
/// then falls back to evicting the bucket with the oldest refill.
///
/// Not internally synchronized — callers wrap the engine in a mutex. The
/// clock is passed in so tests never sleep.
#[derive(Debug)]
pub struct AdmissionEngine {
    policy: AdmissionPolicy,
    buckets: HashMap<IpAddr, TokenBucket>,
    max_tracked_ips: usize,
}

impl AdmissionEngine {
    pub fn new(policy: AdmissionPolicy, max_tracked_ips: usize) -> Self {
        Self {
            policy,
            buckets: HashMap::new(),
            max_tracked_ips: max_tracked_ips.max(1),
        }
    }

    /// Check-and-deduct for one request from `ip` at time `now`.
    /// Returns `true` when the request is admitted.
    pub fn admit(&mut self, ip: IpAddr, now: Instant) -> bool {
        if let Some(bucket) = self.buckets.get_mut(&ip) {
            return bucket.check(&self.policy, now);
        }

        if self.buckets.len() >= self.max_tracked_ips {
            self.evict_one(now);
        }

        // First sight of this IP: creation consumes the first token.
        self.buckets.insert(ip, TokenBucket::new(&self.policy, now));
        true
    }

    /// Number of IPs currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Make room for one new bucket: drop all fully-refilled idle buckets,
    /// or failing that the single bucket with the oldest refill timestamp.
    fn evict_one(&mut self, now: Instant) {
        let full_refill = self.policy.full_refill();
        let before = self.buckets.len();
        self.buckets
            .retain(|_, b| now.saturating_duration_since(b.last_refill()) < full_refill);

        if self.buckets.len() < before {
            return;
        }

        let oldest = self
            .buckets
            .iter()
            .min_by_key(|(_, b)| b.last_refill())
            .map(|(ip, _)| *ip);
        if let Some(ip) = oldest {
            self.buckets.remove(&ip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn make_engine(max_tracked_ips: usize) -> AdmissionEngine {
        AdmissionEngine::new(AdmissionPolicy::default(), max_tracked_ips)
    }

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    // ── Basic admission ──────────────────────────────────────────────

    #[test]
    fn burst_of_five_then_throttle() {
        let mut engine = make_engine(1024);
        let now = Instant::now();

        for i in 0..5 {
            assert!(engine.admit(ip(1), now), "request {i} should be admitted");
        }
        assert!(!engine.admit(ip(1), now), "6th request should be throttled");
    }

    #[test]
    fn one_more_after_one_second() {
        let mut engine = make_engine(1024);
        let now = Instant::now();

        for _ in 0..5 {
            assert!(engine.admit(ip(1), now));
        }
        assert!(!engine.admit(ip(1), now));

        let later = now + Duration::from_secs(1);
        assert!(engine.admit(ip(1), later));
        assert!(!engine.admit(ip(1), later));
    }

    #[test]
    fn ips_are_independent() {
        let mut engine = make_engine(1024);
        let now = Instant::now();

        for _ in 0..5 {
            assert!(engine.admit(ip(1), now));
        }
        assert!(!engine.admit(ip(1), now));

        // A different client is unaffected.
        assert!(engine.admit(ip(2), now));
        assert_eq!(engine.tracked_clients(), 2);
    }

    #[test]
    fn sustained_rate_is_one_per_interval() {
        let mut engine = make_engine(1024);
        let mut now = Instant::now();

        // Drain the burst.
        for _ in 0..5 {
            assert!(engine.admit(ip(1), now));
        }

        // Steady state: exactly one admission per second.
        for _ in 0..10 {
            now += Duration::from_secs(1);
            assert!(engine.admit(ip(1), now));
            assert!(!engine.admit(ip(1), now));
        }
    }

    // ── Bounded map ──────────────────────────────────────────────────

    #[test]
    fn map_never_exceeds_cap() {
        let mut engine = make_engine(8);
        let now = Instant::now();

        for i in 0..32 {
            assert!(engine.admit(ip(i), now));
            assert!(engine.tracked_clients() <= 8);
        }
    }

    #[test]
    fn idle_refilled_buckets_pruned_first() {
        let mut engine = make_engine(2);
        let now = Instant::now();

        assert!(engine.admit(ip(1), now));
        assert!(engine.admit(ip(2), now));

        // Both buckets are now fully refilled; a new IP prunes them all.
        let later = now + Duration::from_secs(10);
        assert!(engine.admit(ip(3), later));
        assert_eq!(engine.tracked_clients(), 1);
    }

    #[test]
    fn oldest_bucket_evicted_when_none_idle() {
        let mut engine = make_engine(2);
        let now = Instant::now();

        assert!(engine.admit(ip(1), now));
        assert!(engine.admit(ip(2), now + Duration::from_millis(100)));

        // Neither is fully refilled; ip(1) has the oldest refill and goes.
        assert!(engine.admit(ip(3), now + Duration::from_millis(200)));
        assert_eq!(engine.tracked_clients(), 2);

        // ip(1) comes back as a fresh bucket with a full burst available.
        let t = now + Duration::from_millis(300);
        assert!(engine.admit(ip(1), t));
        for _ in 0..4 {
            assert!(engine.admit(ip(1), t));
        }
        assert!(!engine.admit(ip(1), t));
    }

    #[test]
    fn new_ip_still_gets_a_decision_at_cap() {
        let mut engine = make_engine(1);
        let now = Instant::now();

        assert!(engine.admit(ip(1), now));
        assert!(engine.admit(ip(2), now));
        assert_eq!(engine.tracked_clients(), 1);
    }

    #[test]
    fn cap_of_zero_is_clamped_to_one() {
        let mut engine = make_engine(0);
        let now = Instant::now();
        assert!(engine.admit(ip(1), now));
        assert_eq!(engine.tracked_clients(), 1);
    }
}
