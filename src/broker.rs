//! Client-side access token brokering with expiry-aware refresh.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{GraphError, Result};

/// Refresh lookahead: a cached token this close to expiry is replaced.
const REFRESH_LOOKAHEAD: Duration = Duration::from_secs(30);

/// The claims we read from a bearer token. Signature verification is the
/// resource server's job; the broker only needs the expiry.
#[derive(Debug, Deserialize)]
struct ExpClaims {
    exp: u64,
}

/// An opaque access token plus its embedded expiry.
///
/// Replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone)]
pub struct AccessToken {
    raw: String,
    expires_at: u64,
}

impl AccessToken {
    /// Wrap a raw JWT, decoding its `exp` claim.
    pub fn parse(raw: String) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::RS256];
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<ExpClaims>(&raw, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| GraphError::MalformedToken(e.to_string()))?;

        Ok(Self {
            raw,
            expires_at: data.claims.exp,
        })
    }

    /// The bearer credential itself.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Expiry as UNIX seconds.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    fn nearing_expiry(&self, lookahead: Duration) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        now + lookahead.as_secs() >= self.expires_at
    }
}

/// Source of fresh tokens, typically backed by the add-in host runtime.
#[allow(async_fn_in_trait)]
pub trait TokenProvider {
    async fn acquire(&self, options: &TokenOptions) -> Result<String>;
}

/// Options forwarded to the host token request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOptions {
    pub allow_sign_in_prompt: bool,
}

/// Caches one access token and refreshes it through a [`TokenProvider`] when
/// the expiry falls within the lookahead window.
///
/// The cache mutex is held across the provider call, so overlapping callers
/// share a single refresh instead of each issuing their own.
pub struct TokenBroker<P> {
    provider: Option<P>,
    cache: Arc<Mutex<Option<AccessToken>>>,
}

impl<P: TokenProvider> TokenBroker<P> {
    /// Create a broker over a host token provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider: Some(provider),
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a broker for a runtime with no token host. Every `get_token`
    /// call fails with `AuthUnavailable`.
    pub fn unavailable() -> Self {
        Self {
            provider: None,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Get a valid access token, refreshing if the cached one is missing or
    /// within the refresh lookahead of its expiry.
    pub async fn get_token(&self, options: &TokenOptions) -> Result<AccessToken> {
        let provider = self.provider.as_ref().ok_or(GraphError::AuthUnavailable)?;

        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref() {
            if !token.nearing_expiry(REFRESH_LOOKAHEAD) {
                return Ok(token.clone());
            }
        }

        let raw = provider.acquire(options).await?;
        let token = AccessToken::parse(raw)?;
        *cache = Some(token.clone());

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        exp: u64,
        sub: String,
    }

    fn make_token(expires_in_secs: i64) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let claims = TestClaims {
            exp: (now + expires_in_secs).max(0) as u64,
            sub: "user@contoso.com".to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    /// Provider that counts how many times it is asked for a token.
    struct CountingProvider {
        calls: AtomicUsize,
        lifetime_secs: i64,
    }

    impl CountingProvider {
        fn new(lifetime_secs: i64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                lifetime_secs,
            }
        }
    }

    impl TokenProvider for CountingProvider {
        async fn acquire(&self, _options: &TokenOptions) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Simulate the host round-trip so overlapping callers overlap.
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(make_token(self.lifetime_secs))
        }
    }

    #[test]
    fn test_access_token_parse_exposes_expiry() {
        let raw = make_token(3600);
        let token = AccessToken::parse(raw.clone()).unwrap();
        assert_eq!(token.as_str(), raw);
        assert!(token.expires_at() > 0);
    }

    #[test]
    fn test_access_token_parse_rejects_garbage() {
        assert!(matches!(
            AccessToken::parse("not-a-jwt".to_string()),
            Err(GraphError::MalformedToken(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable_broker_fails() {
        let broker: TokenBroker<CountingProvider> = TokenBroker::unavailable();
        assert!(matches!(
            broker.get_token(&TokenOptions::default()).await,
            Err(GraphError::AuthUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_cached_token_is_reused() {
        let broker = TokenBroker::new(CountingProvider::new(3600));
        let opts = TokenOptions::default();

        let first = broker.get_token(&opts).await.unwrap();
        let second = broker.get_token(&opts).await.unwrap();

        assert_eq!(first.as_str(), second.as_str());
        assert_eq!(broker.provider.as_ref().unwrap().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_token_inside_lookahead_is_refreshed() {
        // 10s lifetime is inside the 30s lookahead, so each call refreshes.
        let broker = TokenBroker::new(CountingProvider::new(10));
        let opts = TokenOptions::default();

        broker.get_token(&opts).await.unwrap();
        broker.get_token(&opts).await.unwrap();

        assert_eq!(broker.provider.as_ref().unwrap().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_overlapping_calls_share_one_refresh() {
        let broker = TokenBroker::new(CountingProvider::new(3600));
        let opts = TokenOptions::default();

        let (a, b) = tokio::join!(broker.get_token(&opts), broker.get_token(&opts));

        assert_eq!(a.unwrap().as_str(), b.unwrap().as_str());
        assert_eq!(broker.provider.as_ref().unwrap().calls.load(Ordering::SeqCst), 1);
    }
}
