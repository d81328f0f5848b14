//! Service-credential cache

/// Holds the single live access-token/refresh-token pair for the service
/// account. At most one of each exists per adapter instance; validity is
/// never computed locally. Stale tokens are discovered by introspection and
/// discarded through [`TokenCache::invalidate_access_token`].
#[derive(Debug, Default)]
pub struct TokenCache {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached service access token, if any. Whether it is still accepted
    /// by the server must be re-verified by the caller.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Replaces the cached pair after a successful password grant. A grant
    /// response without a refresh token clears the previous one; the old
    /// pair is no longer live either way.
    pub fn store(&mut self, access_token: String, refresh_token: Option<String>) {
        self.access_token = Some(access_token);
        self.refresh_token = refresh_token;
    }

    /// Drops an access token that failed introspection.
    pub fn invalidate_access_token(&mut self) {
        self.access_token = None;
    }

    /// Consumes the cached refresh token for a revoke call. Revoking
    /// invalidates it server-side, so it is removed here in the same step.
    pub fn take_refresh_token(&mut self) -> Option<String> {
        self.refresh_token.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let cache = TokenCache::new();
        assert!(cache.access_token().is_none());
    }

    #[test]
    fn test_store_and_invalidate() {
        let mut cache = TokenCache::new();
        cache.store("token-1".to_string(), Some("refresh-1".to_string()));
        assert_eq!(cache.access_token(), Some("token-1"));

        cache.invalidate_access_token();
        assert!(cache.access_token().is_none());
        // The refresh token survives an access-token invalidation
        assert_eq!(cache.take_refresh_token().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_take_refresh_token_consumes() {
        let mut cache = TokenCache::new();
        cache.store("token-1".to_string(), Some("refresh-1".to_string()));
        assert_eq!(cache.take_refresh_token().as_deref(), Some("refresh-1"));
        assert!(cache.take_refresh_token().is_none());
    }

    #[test]
    fn test_store_without_refresh_clears_previous() {
        let mut cache = TokenCache::new();
        cache.store("token-1".to_string(), Some("refresh-1".to_string()));
        cache.store("token-2".to_string(), None);
        assert_eq!(cache.access_token(), Some("token-2"));
        assert!(cache.take_refresh_token().is_none());
    }
}
