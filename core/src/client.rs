//! Validating facade over the consumer and prayer backends.
//!
//! # Design
//! `ApiService` owns the two backend clients and nothing else. Every
//! operation runs in the same order:
//!
//! 1. local guard clauses, pure and synchronous, no backend call;
//! 2. the backend's own `validate`, where the operation has one;
//! 3. the delegated operation, whose result or error is returned as is.
//!
//! A failure in step 1 or 2 is `ApiError::InvalidInput`. Failures in step 3
//! come back as `ApiError::Backend`. Nothing is retried.

use crate::consumer::ConsumerService;
use crate::error::{ApiError, Result};
use crate::prayer::PrayerService;
use crate::types::{ConsumerProfile, ConsumerUpdate, KeyType, PrayerRef, PrayerStats};

const API_KEY_REQUIRED: &str = "API key is required";
const PRAYER_ID_INVALID: &str = "prayer id is invalid";

/// The single entry point for client applications.
#[derive(Debug, Clone)]
pub struct ApiService<C, P> {
    consumers: C,
    prayers: P,
}

impl<C: ConsumerService, P: PrayerService> ApiService<C, P> {
    pub fn new(consumers: C, prayers: P) -> Self {
        Self { consumers, prayers }
    }

    /// Register a consumer and return the API key the backend assigned.
    pub fn register_consumer(&self, client_id: &str, profile: &ConsumerProfile) -> Result<String> {
        if !self.consumers.validate(profile) {
            return Err(reject("the consumer data is invalid"));
        }
        tracing::debug!(client_id, "dispatching consumer registration");
        let consumer = self.consumers.register(client_id, profile)?;
        Ok(consumer.api_key)
    }

    /// Apply a partial update to the consumer behind `api_key`.
    ///
    /// There is no backend `validate` step here; partial payloads have no
    /// fixed shape to check.
    pub fn update_consumer(&self, api_key: &str, data: &ConsumerUpdate) -> Result<bool> {
        require_api_key(api_key)?;
        if data.is_empty() {
            return Err(reject("update data must not be empty"));
        }
        if data.contains_key("api_key") {
            return Err(reject("api_key may not be updated"));
        }
        tracing::debug!(fields = data.len(), "dispatching consumer update");
        Ok(self.consumers.update(api_key, data)?)
    }

    /// Record that the consumer prayed for `prayer_id`.
    pub fn praying(&self, api_key: &str, prayer_id: &str) -> Result<bool> {
        require_api_key(api_key)?;
        let prayer = self.validated_prayer(prayer_id)?;
        tracing::debug!(prayer_id, "dispatching praying");
        Ok(self.prayers.praying(api_key, &prayer)?)
    }

    /// Fetch the counts for `prayer_id`, scoped to the consumer or client
    /// named by `key_type`.
    pub fn prayer_stats(&self, api_key: &str, key_type: &str, prayer_id: &str) -> Result<PrayerStats> {
        require_api_key(api_key)?;
        let key_type = parse_key_type(key_type)?;
        let prayer = self.validated_prayer(prayer_id)?;
        tracing::debug!(prayer_id, %key_type, "dispatching prayer stats");
        Ok(self.prayers.prayer_stats(api_key, key_type, &prayer)?)
    }

    fn validated_prayer(&self, prayer_id: &str) -> Result<PrayerRef> {
        let prayer = PrayerRef::new(prayer_id);
        if !self.prayers.validate(&prayer) {
            return Err(reject(PRAYER_ID_INVALID));
        }
        Ok(prayer)
    }
}

fn require_api_key(api_key: &str) -> Result<()> {
    if api_key.is_empty() {
        return Err(reject(API_KEY_REQUIRED));
    }
    Ok(())
}

fn parse_key_type(key_type: &str) -> Result<KeyType> {
    if key_type.is_empty() {
        return Err(reject("key type is required"));
    }
    key_type
        .parse()
        .map_err(|_| reject("key type must be one of: consumer, client"))
}

fn reject(reason: &'static str) -> ApiError {
    tracing::warn!(reason, "rejected facade input");
    ApiError::invalid_input(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_guard() {
        assert!(require_api_key("k").is_ok());
        let err = require_api_key("").unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(ref r) if r == API_KEY_REQUIRED));
    }

    #[test]
    fn key_type_guard() {
        assert_eq!(parse_key_type("consumer").unwrap(), KeyType::Consumer);
        assert_eq!(parse_key_type("client").unwrap(), KeyType::Client);
        assert!(matches!(
            parse_key_type("").unwrap_err(),
            ApiError::InvalidInput(ref r) if r == "key type is required"
        ));
        assert!(matches!(
            parse_key_type("guest").unwrap_err(),
            ApiError::InvalidInput(ref r) if r.contains("consumer, client")
        ));
    }
}
