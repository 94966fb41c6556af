//! Consumer backend client.
//!
//! # Design
//! `ConsumerService` is the capability the facade depends on. The HTTP-backed
//! implementation maps each operation onto the consumer endpoints:
//!
//! | Operation | Request | Success |
//! |-----------|---------|---------|
//! | register  | `POST /consumers` | `201` with the stored consumer |
//! | update    | `PUT /consumers/{api_key}` | `200`/`204` → `true`, `422` → `false` |
//!
//! `validate` checks a profile against the backend's field rules without a
//! round trip.

use chrono::NaiveTime;
use serde::Serialize;

use crate::error::BackendError;
use crate::http::{check_status, parse_json, HttpService};
use crate::types::{Consumer, ConsumerProfile, ConsumerUpdate};

/// Operations the consumer backend offers.
pub trait ConsumerService {
    /// Whether the backend would accept this profile for registration.
    fn validate(&self, profile: &ConsumerProfile) -> bool;

    /// Register a consumer for `client_id`; the returned record carries the
    /// assigned API key.
    fn register(&self, client_id: &str, profile: &ConsumerProfile) -> Result<Consumer, BackendError>;

    fn update(&self, api_key: &str, data: &ConsumerUpdate) -> Result<bool, BackendError>;
}

impl<T: ConsumerService + ?Sized> ConsumerService for &T {
    fn validate(&self, profile: &ConsumerProfile) -> bool {
        (**self).validate(profile)
    }

    fn register(&self, client_id: &str, profile: &ConsumerProfile) -> Result<Consumer, BackendError> {
        (**self).register(client_id, profile)
    }

    fn update(&self, api_key: &str, data: &ConsumerUpdate) -> Result<bool, BackendError> {
        (**self).update(api_key, data)
    }
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    client_id: &'a str,
    #[serde(flatten)]
    profile: &'a ConsumerProfile,
}

/// `ConsumerService` over an `HttpService`.
#[derive(Debug, Clone)]
pub struct HttpConsumerService<H> {
    http: H,
}

impl<H: HttpService> HttpConsumerService<H> {
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

impl<H: HttpService> ConsumerService for HttpConsumerService<H> {
    fn validate(&self, profile: &ConsumerProfile) -> bool {
        let required = [
            &profile.device_model,
            &profile.device_platform,
            &profile.device_version,
            &profile.device_uuid,
            &profile.push_lang,
        ];
        required.iter().all(|field| !field.trim().is_empty()) && is_time_of_day(&profile.push_at)
    }

    fn register(&self, client_id: &str, profile: &ConsumerProfile) -> Result<Consumer, BackendError> {
        tracing::debug!(client_id, "registering consumer");
        let response = self.http.post("/consumers", &RegisterBody { client_id, profile })?;
        check_status(&response, &[200, 201])?;
        parse_json(&response)
    }

    fn update(&self, api_key: &str, data: &ConsumerUpdate) -> Result<bool, BackendError> {
        tracing::debug!(fields = data.len(), "updating consumer");
        let path = format!("/consumers/{}", urlencoding::encode(api_key));
        let response = self.http.put(&path, data)?;
        if response.status == 422 {
            return Ok(false);
        }
        check_status(&response, &[200, 204])?;
        Ok(true)
    }
}

/// `HH:MM:SS` on a 24 hour clock.
fn is_time_of_day(value: &str) -> bool {
    let shaped = value.len() == 8
        && value
            .split(':')
            .all(|part| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit()));
    shaped && NaiveTime::parse_from_str(value, "%H:%M:%S").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::ScriptedHttp;
    use crate::http::HttpMethod;

    fn profile() -> ConsumerProfile {
        ConsumerProfile {
            device_model: "Web Browser".to_string(),
            device_platform: "NA".to_string(),
            device_version: "NA".to_string(),
            device_uuid: "920a5209-1648-4ccc-9782-269a6cfb1d59".to_string(),
            push_token: "78d71cd1-6c07-4a4d-a926-e49d17a0de39".to_string(),
            push_at: "10:00:00".to_string(),
            push_lang: "eng".to_string(),
            time_zone: String::new(),
            receive_push: false,
        }
    }

    fn service(status: u16, body: &str) -> HttpConsumerService<ScriptedHttp> {
        HttpConsumerService::new(ScriptedHttp::replying(status, body))
    }

    #[test]
    fn validate_accepts_complete_profile() {
        assert!(service(200, "").validate(&profile()));
    }

    #[test]
    fn validate_rejects_missing_device_fields() {
        let mut p = profile();
        p.device_uuid = "  ".to_string();
        assert!(!service(200, "").validate(&p));
    }

    #[test]
    fn validate_rejects_bad_push_time() {
        let svc = service(200, "");
        for bad in ["", "10:00", "24:00:00", "9:00:00", "10:60:00", "aa:bb:cc", "10:00:00:00", "1:000:00"] {
            let mut p = profile();
            p.push_at = bad.to_string();
            assert!(!svc.validate(&p), "{bad} should be rejected");
        }
    }

    #[test]
    fn validate_accepts_day_boundaries() {
        let svc = service(200, "");
        for good in ["00:00:00", "23:59:59", "12:30:05"] {
            let mut p = profile();
            p.push_at = good.to_string();
            assert!(svc.validate(&p), "{good} should be accepted");
        }
    }

    #[test]
    fn validate_makes_no_request() {
        let svc = service(200, "");
        svc.validate(&profile());
        assert!(svc.http().sent.borrow().is_empty());
    }

    #[test]
    fn register_posts_client_id_with_profile() {
        let reply = r#"{"api_key":"frogger123@","client_id":"client-546","device_model":"Web Browser","device_platform":"NA","device_version":"NA","device_uuid":"920a5209-1648-4ccc-9782-269a6cfb1d59","push_token":"78d71cd1-6c07-4a4d-a926-e49d17a0de39","push_at":"10:00:00","push_lang":"eng","time_zone":"","receive_push":0}"#;
        let svc = service(201, reply);
        let consumer = svc.register("client-546", &profile()).unwrap();
        assert_eq!(consumer.api_key, "frogger123@");
        assert_eq!(consumer.profile, profile());

        let req = svc.http().last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/consumers");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["client_id"], "client-546");
        assert_eq!(body["push_at"], "10:00:00");
        assert_eq!(body["receive_push"], 0);
        assert!(body.get("api_key").is_none());
    }

    #[test]
    fn register_surfaces_bad_json() {
        let err = service(201, "not json").register("c", &profile()).unwrap_err();
        assert!(matches!(err, BackendError::DeserializationError(_)));
    }

    #[test]
    fn update_encodes_api_key_in_path() {
        let svc = service(200, "{}");
        let mut data = ConsumerUpdate::new();
        data.insert("push_at".to_string(), "12:00:00".into());
        assert!(svc.update("Y654$3#rre", &data).unwrap());

        let req = svc.http().last();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/consumers/Y654%243%23rre");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"push_at": "12:00:00"}));
    }

    #[test]
    fn update_reports_rejection_as_false() {
        let mut data = ConsumerUpdate::new();
        data.insert("push_at".to_string(), "never".into());
        assert!(!service(422, "").update("key", &data).unwrap());
    }

    #[test]
    fn update_unknown_key_is_not_found() {
        let mut data = ConsumerUpdate::new();
        data.insert("push_lang".to_string(), "spa".into());
        let err = service(404, "").update("missing", &data).unwrap_err();
        assert!(matches!(err, BackendError::NotFound));
    }
}
