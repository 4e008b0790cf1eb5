use std::time::{Duration, Instant};

/// Shared token-bucket parameters applied to every tracked client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    /// Maximum tokens (bucket size). Must be >= 1.
    pub burst: u64,
    /// Time to accrue one token. Must be non-zero.
    pub refill_interval: Duration,
}

impl Default for AdmissionPolicy {
    /// Observed production policy: burst of 5, sustained 1 request/sec.
    fn default() -> Self {
        Self {
            burst: 5,
            refill_interval: Duration::from_secs(1),
        }
    }
}

impl AdmissionPolicy {
    pub fn validate(&self) -> Result<(), String> {
        if self.burst == 0 {
            return Err("burst must be > 0".to_string());
        }
        if self.refill_interval.is_zero() {
            return Err("refill interval must be non-zero".to_string());
        }
        Ok(())
    }

    /// Time after which an untouched bucket is indistinguishable from a
    /// fresh one (fully refilled), and therefore safe to evict.
    pub fn full_refill(&self) -> Duration {
        self.refill_interval.saturating_mul(u32::try_from(self.burst).unwrap_or(u32::MAX))
    }
}

/// Per-client token bucket with lazy refill.
///
/// Tokens accrue at one per `refill_interval` up to `burst`; each admitted
/// request consumes one. No background task touches buckets — elapsed time
/// is converted to tokens on the next check.
#[derive(Debug, Clone, Copy)]
pub struct TokenBucket {
    tokens: u64,
    last_refill: Instant,
}

impl TokenBucket {
    /// New bucket for a first-seen client. Creation consumes the first
    /// token, so the creating request is already admitted.
    pub fn new(policy: &AdmissionPolicy, now: Instant) -> Self {
        Self {
            tokens: policy.burst.saturating_sub(1),
            last_refill: now,
        }
    }

    /// Refill for elapsed time, then try to consume one token.
    /// Returns `true` when the request is admitted.
    pub fn check(&mut self, policy: &AdmissionPolicy, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill);
        let new_tokens = (elapsed.as_nanos() / policy.refill_interval.as_nanos().max(1)) as u64;

        if new_tokens > 0 {
            self.tokens = policy.burst.min(self.tokens.saturating_add(new_tokens));
            self.last_refill = now;
        }

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Timestamp of the last refill (bucket creation for untouched buckets).
    pub fn last_refill(&self) -> Instant {
        self.last_refill
    }
}
