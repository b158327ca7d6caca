//! Payment gateway collaborator plumbing.
//!
//! Deposits and withdrawals travel through an external gateway whose wire
//! protocol is out of scope; what lives here is the call contract and the
//! auth-token handling. The token cache is owned by the gateway client
//! instance and passed by reference — there is no process-wide token map.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use pitchside_types::{CreditOutcome, IdempotencyKey, Result, UserId};
use rust_decimal::Decimal;

/// Call contract for the external payment gateway.
///
/// `credit` mirrors the wallet ledger's idempotency semantics: the gateway
/// deduplicates on the key, so retries are safe end to end.
pub trait PaymentGateway: Send + Sync {
    fn credit(
        &self,
        user_id: UserId,
        amount: Decimal,
        key: IdempotencyKey,
    ) -> Result<CreditOutcome>;
}

struct CachedToken {
    value: String,
    fetched_at: Instant,
}

/// Instance-owned auth-token cache with an explicit TTL.
///
/// A fresh token is fetched through the supplied closure only when the
/// cached one has expired; concurrent callers share the cached value.
pub struct AuthTokenCache {
    ttl: Duration,
    slot: Mutex<Option<CachedToken>>,
}

impl AuthTokenCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The current token, refreshing through `fetch` if expired or absent.
    pub fn token<F>(&self, fetch: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        self.token_at(Instant::now(), fetch)
    }

    /// Clock-injected variant of [`Self::token`].
    pub fn token_at<F>(&self, now: Instant, fetch: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| pitchside_types::PitchsideError::Internal(e.to_string()))?;

        if let Some(cached) = slot.as_ref() {
            if now.duration_since(cached.fetched_at) < self.ttl {
                return Ok(cached.value.clone());
            }
        }

        let value = fetch()?;
        tracing::debug!("gateway auth token refreshed");
        *slot = Some(CachedToken {
            value: value.clone(),
            fetched_at: now,
        });
        Ok(value)
    }

    /// Drop the cached token so the next call refetches (e.g. after a 401).
    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

// ---------------------------------------------------------------------------
// MockGateway — in-memory test double
// ---------------------------------------------------------------------------

/// Records credits in memory, deduplicating on the idempotency key the way
/// a real gateway does.
#[cfg(any(test, feature = "test-helpers"))]
pub struct MockGateway {
    token_cache: AuthTokenCache,
    applied: Mutex<std::collections::HashMap<IdempotencyKey, (UserId, Decimal)>>,
    refreshes: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-helpers"))]
impl MockGateway {
    #[must_use]
    pub fn new(token_ttl: Duration) -> Self {
        Self {
            token_cache: AuthTokenCache::new(token_ttl),
            applied: Mutex::new(std::collections::HashMap::new()),
            refreshes: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// How many token refreshes the cache has performed.
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl PaymentGateway for MockGateway {
    fn credit(
        &self,
        user_id: UserId,
        amount: Decimal,
        key: IdempotencyKey,
    ) -> Result<CreditOutcome> {
        let _token = self.token_cache.token(|| {
            let n = self
                .refreshes
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(format!("token-{n}"))
        })?;

        let mut applied = self
            .applied
            .lock()
            .map_err(|e| pitchside_types::PitchsideError::Internal(e.to_string()))?;
        if applied.contains_key(&key) {
            return Ok(CreditOutcome::AlreadyApplied);
        }
        applied.insert(key, (user_id, amount));
        Ok(CreditOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use pitchside_types::{ContestId, PitchsideError};

    use super::*;

    #[test]
    fn token_is_cached_within_ttl() {
        let cache = AuthTokenCache::new(Duration::from_secs(60));
        let start = Instant::now();

        let first = cache.token_at(start, || Ok("alpha".to_string())).unwrap();
        let second = cache
            .token_at(start + Duration::from_secs(30), || {
                panic!("must not refetch within TTL")
            })
            .unwrap();
        assert_eq!(first, "alpha");
        assert_eq!(second, "alpha");
    }

    #[test]
    fn token_refreshes_after_ttl() {
        let cache = AuthTokenCache::new(Duration::from_secs(60));
        let start = Instant::now();

        cache.token_at(start, || Ok("alpha".to_string())).unwrap();
        let refreshed = cache
            .token_at(start + Duration::from_secs(61), || Ok("beta".to_string()))
            .unwrap();
        assert_eq!(refreshed, "beta");
    }

    #[test]
    fn invalidate_forces_refetch() {
        let cache = AuthTokenCache::new(Duration::from_secs(60));
        let start = Instant::now();

        cache.token_at(start, || Ok("alpha".to_string())).unwrap();
        cache.invalidate();
        let after = cache
            .token_at(start, || Ok("beta".to_string()))
            .unwrap();
        assert_eq!(after, "beta");
    }

    #[test]
    fn fetch_failure_leaves_cache_empty() {
        let cache = AuthTokenCache::new(Duration::from_secs(60));
        let start = Instant::now();

        let err = cache
            .token_at(start, || {
                Err(PitchsideError::FeedUnavailable {
                    reason: "gateway 503".into(),
                })
            })
            .unwrap_err();
        assert!(matches!(err, PitchsideError::FeedUnavailable { .. }));

        // Next call fetches again rather than serving a phantom token.
        let ok = cache.token_at(start, || Ok("gamma".to_string())).unwrap();
        assert_eq!(ok, "gamma");
    }

    #[test]
    fn mock_gateway_deduplicates_on_key() {
        let gateway = MockGateway::new(Duration::from_secs(60));
        let user = UserId::new();
        let key = IdempotencyKey::for_payout(ContestId::new(), user, 1, 1);

        assert_eq!(
            gateway.credit(user, Decimal::new(10, 0), key).unwrap(),
            CreditOutcome::Applied
        );
        assert_eq!(
            gateway.credit(user, Decimal::new(10, 0), key).unwrap(),
            CreditOutcome::AlreadyApplied
        );
    }

    #[test]
    fn mock_gateway_shares_one_token() {
        let gateway = MockGateway::new(Duration::from_secs(60));
        let user = UserId::new();
        for i in 0..5 {
            let key = IdempotencyKey::for_payout(ContestId::new(), user, i, i);
            gateway.credit(user, Decimal::ONE, key).unwrap();
        }
        assert_eq!(gateway.refresh_count(), 1, "one token serves all calls");
    }
}
