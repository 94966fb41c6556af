//! Prayer backend client.
//!
//! # Design
//! `PrayerService` is the capability the facade depends on. The HTTP-backed
//! implementation maps onto the prayer endpoints:
//!
//! | Operation | Request | Success |
//! |-----------|---------|---------|
//! | praying      | `POST /prayers/{id}/praying` with `{"api_key": ..}` | `200`/`201` → `true`, `422` → `false` |
//! | prayer stats | `GET /prayers/{id}/stats?api_key=..&key_type=..` | `200` with the stats record |
//!
//! Prayer ids name a day of the year as `MM-DD`. `validate` accepts any day
//! that exists in a leap year, so `02-29` is always a valid id.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::BackendError;
use crate::http::{check_status, parse_json, HttpService};
use crate::types::{KeyType, PrayerRef, PrayerStats};

const LEAP_YEAR: i32 = 2000;

/// Operations the prayer backend offers.
pub trait PrayerService {
    /// Whether `prayer.id` names an existing prayer request.
    fn validate(&self, prayer: &PrayerRef) -> bool;

    /// Record that the consumer behind `api_key` prayed for `prayer`.
    fn praying(&self, api_key: &str, prayer: &PrayerRef) -> Result<bool, BackendError>;

    fn prayer_stats(
        &self,
        api_key: &str,
        key_type: KeyType,
        prayer: &PrayerRef,
    ) -> Result<PrayerStats, BackendError>;
}

impl<T: PrayerService + ?Sized> PrayerService for &T {
    fn validate(&self, prayer: &PrayerRef) -> bool {
        (**self).validate(prayer)
    }

    fn praying(&self, api_key: &str, prayer: &PrayerRef) -> Result<bool, BackendError> {
        (**self).praying(api_key, prayer)
    }

    fn prayer_stats(
        &self,
        api_key: &str,
        key_type: KeyType,
        prayer: &PrayerRef,
    ) -> Result<PrayerStats, BackendError> {
        (**self).prayer_stats(api_key, key_type, prayer)
    }
}

#[derive(Serialize)]
struct PrayingBody<'a> {
    api_key: &'a str,
}

/// `PrayerService` over an `HttpService`.
#[derive(Debug, Clone)]
pub struct HttpPrayerService<H> {
    http: H,
}

impl<H: HttpService> HttpPrayerService<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    pub fn http_mut(&mut self) -> &mut H {
        &mut self.http
    }
}

impl<H: HttpService> PrayerService for HttpPrayerService<H> {
    fn validate(&self, prayer: &PrayerRef) -> bool {
        is_prayer_id(&prayer.id)
    }

    fn praying(&self, api_key: &str, prayer: &PrayerRef) -> Result<bool, BackendError> {
        tracing::debug!(prayer_id = %prayer.id, "recording prayer");
        let path = format!("/prayers/{}/praying", urlencoding::encode(&prayer.id));
        let response = self.http.post(&path, &PrayingBody { api_key })?;
        if response.status == 422 {
            return Ok(false);
        }
        check_status(&response, &[200, 201])?;
        Ok(true)
    }

    fn prayer_stats(
        &self,
        api_key: &str,
        key_type: KeyType,
        prayer: &PrayerRef,
    ) -> Result<PrayerStats, BackendError> {
        tracing::debug!(prayer_id = %prayer.id, %key_type, "fetching prayer stats");
        let path = format!("/prayers/{}/stats", urlencoding::encode(&prayer.id));
        let response = self
            .http
            .get(&path, &[("api_key", api_key), ("key_type", key_type.as_str())])?;
        check_status(&response, &[200])?;
        parse_json(&response)
    }
}

/// `MM-DD` naming a real day in a leap year.
pub fn is_prayer_id(id: &str) -> bool {
    let Some((month, day)) = id.split_once('-') else {
        return false;
    };
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(month) || !two_digits(day) {
        return false;
    }
    match (month.parse(), day.parse()) {
        (Ok(month), Ok(day)) => NaiveDate::from_ymd_opt(LEAP_YEAR, month, day).is_some(),
        _ => false,
    }
}
