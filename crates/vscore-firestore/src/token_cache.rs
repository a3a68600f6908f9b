//! Access token cache for Firestore.
//!
//! Tokens are refreshed a minute before they expire. Refreshes are
//! single-flight behind a write lock, and a failed refresh keeps serving the
//! previous token for as long as it is still technically valid.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use gcp_auth::TokenProvider;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{FirestoreError, FirestoreResult};

/// Refresh this long before expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// TTL assumed when the provider's expiry cannot be converted.
const FALLBACK_TTL: Duration = Duration::from_secs(50 * 60);

/// OAuth scope for the Firestore REST API.
pub const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }

    fn is_unexpired(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Thread-safe token cache.
pub struct TokenCache {
    provider: Arc<dyn TokenProvider>,
    slot: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            slot: RwLock::new(None),
        }
    }

    /// Drop the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }

    /// Return a fresh token, refreshing at most once across concurrent callers.
    pub async fn get_token(&self) -> FirestoreResult<String> {
        if let Some(token) = self.cached_fresh().await {
            return Ok(token);
        }

        let mut slot = self.slot.write().await;
        if let Some(cached) = slot.as_ref().filter(|c| c.is_fresh(Instant::now())) {
            return Ok(cached.value.clone());
        }

        match self.provider.token(&[FIRESTORE_SCOPE]).await {
            Ok(token) => {
                let value = token.as_str().to_string();
                let expires_at = instant_for(token.expires_at());
                *slot = Some(CachedToken {
                    value: value.clone(),
                    expires_at,
                });
                debug!("Refreshed Firestore access token");
                Ok(value)
            }
            Err(e) => match slot.as_ref().filter(|c| c.is_unexpired(Instant::now())) {
                Some(cached) => {
                    warn!(error = %e, "Token refresh failed, reusing unexpired token");
                    Ok(cached.value.clone())
                }
                None => Err(FirestoreError::auth_error(format!(
                    "Failed to obtain access token: {}",
                    e
                ))),
            },
        }
    }

    async fn cached_fresh(&self) -> Option<String> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|c| c.is_fresh(Instant::now()))
            .map(|c| c.value.clone())
    }
}

/// Convert a wall-clock expiry into a monotonic deadline.
fn instant_for(expires_at: chrono::DateTime<Utc>) -> Instant {
    let now = Utc::now();
    if expires_at <= now {
        return Instant::now();
    }
    let ttl = (expires_at - now).to_std().unwrap_or(FALLBACK_TTL);
    Instant::now() + ttl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_is_datastore() {
        assert!(FIRESTORE_SCOPE.ends_with("/auth/datastore"));
    }

    #[test]
    fn test_expired_deadline_is_now() {
        let before = Instant::now();
        let deadline = instant_for(Utc::now() - chrono::Duration::minutes(5));
        assert!(deadline >= before);
        assert!(deadline <= Instant::now());
    }

    #[test]
    fn test_future_deadline_respects_ttl() {
        let deadline = instant_for(Utc::now() + chrono::Duration::minutes(30));
        let remaining = deadline - Instant::now();
        assert!(remaining > Duration::from_secs(29 * 60));
        assert!(remaining <= Duration::from_secs(30 * 60));
    }

    #[test]
    fn test_freshness_window() {
        let now = Instant::now();
        let token = CachedToken {
            value: "t".into(),
            expires_at: now + Duration::from_secs(30),
        };
        assert!(!token.is_fresh(now));
        assert!(token.is_unexpired(now));
    }
}
