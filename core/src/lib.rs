//! Validating API client for the Year of Prayer backends.
//!
//! # Overview
//! `ApiService` is the single entry point. It checks caller input locally,
//! asks the relevant backend whether the payload is acceptable, and only
//! then delegates to the consumer or prayer backend.
//!
//! # Design
//! - The facade is stateless. It holds its two backend clients and nothing
//!   else, so it can be shared between callers without locking.
//! - `ConsumerService` and `PrayerService` are the seams. The HTTP-backed
//!   implementations sit on an `HttpService`; tests substitute doubles.
//! - `UreqHttpService` is the blocking transport. Status codes come back as
//!   data and the backend clients interpret them.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod consumer;
pub mod error;
pub mod http;
pub mod prayer;
pub mod types;

pub use client::ApiService;
pub use config::ClientConfig;
pub use consumer::{ConsumerService, HttpConsumerService};
pub use error::{ApiError, BackendError, ConfigError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpService, UreqHttpService};
pub use prayer::{HttpPrayerService, PrayerService};
pub use types::{Consumer, ConsumerProfile, ConsumerUpdate, KeyType, PrayerRef, PrayerStats};

/// Facade wired to the HTTP backends.
pub type HttpApiService = ApiService<HttpConsumerService<UreqHttpService>, HttpPrayerService<UreqHttpService>>;

impl HttpApiService {
    /// Build a facade whose backend clients both talk to `config.base_url`.
    pub fn from_config(config: &ClientConfig) -> Self {
        let http = UreqHttpService::new(config);
        ApiService::new(HttpConsumerService::new(http.clone()), HttpPrayerService::new(http))
    }
}
