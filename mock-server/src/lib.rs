use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ConsumerProfile {
    pub device_model: String,
    pub device_platform: String,
    pub device_version: String,
    pub device_uuid: String,
    #[serde(default)]
    pub push_token: String,
    pub push_at: String,
    pub push_lang: String,
    #[serde(default)]
    pub time_zone: String,
    #[serde(default)]
    pub receive_push: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Consumer {
    pub api_key: String,
    pub client_id: String,
    #[serde(flatten)]
    pub profile: ConsumerProfile,
}

#[derive(Deserialize)]
pub struct NewConsumer {
    pub client_id: String,
    #[serde(flatten)]
    pub profile: ConsumerProfile,
}

#[derive(Deserialize)]
pub struct PrayingBody {
    pub api_key: String,
}

#[derive(Deserialize)]
pub struct StatsQuery {
    pub api_key: String,
    pub key_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PrayerStats {
    pub prayer_request_id: String,
    pub total_prayers: u64,
    pub your_prayers: u64,
    pub your_last_prayer_on: Option<String>,
}

#[derive(Clone, Debug)]
struct Prayer {
    prayer_id: String,
    api_key: String,
    client_id: String,
    prayed_at: NaiveDateTime,
}

#[derive(Default)]
pub struct Store {
    consumers: HashMap<String, Consumer>,
    prayers: Vec<Prayer>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/consumers", post(register_consumer))
        .route("/consumers/{api_key}", put(update_consumer))
        .route("/prayers/{id}/praying", post(praying))
        .route("/prayers/{id}/stats", get(prayer_stats))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn register_consumer(
    State(db): State<Db>,
    Json(input): Json<NewConsumer>,
) -> (StatusCode, Json<Consumer>) {
    let consumer = Consumer {
        api_key: Uuid::new_v4().to_string(),
        client_id: input.client_id,
        profile: input.profile,
    };
    tracing::info!(client_id = %consumer.client_id, "consumer registered");
    db.write()
        .await
        .consumers
        .insert(consumer.api_key.clone(), consumer.clone());
    (StatusCode::CREATED, Json(consumer))
}

async fn update_consumer(
    State(db): State<Db>,
    Path(api_key): Path<String>,
    Json(input): Json<Map<String, Value>>,
) -> Result<Json<Consumer>, StatusCode> {
    if input.contains_key("api_key") || input.contains_key("client_id") {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let mut store = db.write().await;
    let consumer = store.consumers.get_mut(&api_key).ok_or(StatusCode::NOT_FOUND)?;

    let mut merged = match serde_json::to_value(&consumer.profile) {
        Ok(Value::Object(map)) => map,
        _ => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    };
    for (key, value) in input {
        if merged.contains_key(&key) {
            merged.insert(key, value);
        }
    }
    consumer.profile =
        serde_json::from_value(Value::Object(merged)).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    Ok(Json(consumer.clone()))
}

async fn praying(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<PrayingBody>,
) -> Result<StatusCode, StatusCode> {
    if !is_prayer_id(&id) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let mut store = db.write().await;
    let client_id = store
        .consumers
        .get(&input.api_key)
        .map(|c| c.client_id.clone())
        .ok_or(StatusCode::NOT_FOUND)?;
    store.prayers.push(Prayer {
        prayer_id: id,
        api_key: input.api_key,
        client_id,
        prayed_at: Utc::now().naive_utc(),
    });
    Ok(StatusCode::CREATED)
}

async fn prayer_stats(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<PrayerStats>, StatusCode> {
    if !is_prayer_id(&id) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let store = db.read().await;
    let caller = store.consumers.get(&query.api_key).ok_or(StatusCode::NOT_FOUND)?;
    let by_client = match query.key_type.as_str() {
        "consumer" => false,
        "client" => true,
        _ => return Err(StatusCode::UNPROCESSABLE_ENTITY),
    };

    let for_request: Vec<&Prayer> = store.prayers.iter().filter(|p| p.prayer_id == id).collect();
    let yours: Vec<&Prayer> = for_request
        .iter()
        .copied()
        .filter(|p| {
            if by_client {
                p.client_id == caller.client_id
            } else {
                p.api_key == caller.api_key
            }
        })
        .collect();
    let last = yours.iter().map(|p| p.prayed_at).max();

    Ok(Json(PrayerStats {
        prayer_request_id: id,
        total_prayers: for_request.len() as u64,
        your_prayers: yours.len() as u64,
        your_last_prayer_on: last.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
    }))
}

/// `MM-DD` naming a day that exists in a leap year.
fn is_prayer_id(id: &str) -> bool {
    let Some((month, day)) = id.split_once('-') else {
        return false;
    };
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(month) || !two_digits(day) {
        return false;
    }
    match (month.parse(), day.parse()) {
        (Ok(month), Ok(day)) => NaiveDate::from_ymd_opt(2000, month, day).is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_json() -> &'static str {
        r#""device_model":"Web Browser","device_platform":"NA","device_version":"NA","device_uuid":"u-1","push_at":"10:00:00","push_lang":"eng""#
    }

    #[test]
    fn new_consumer_flattens_profile() {
        let input: NewConsumer =
            serde_json::from_str(&format!("{{\"client_id\":\"c-1\",{}}}", profile_json())).unwrap();
        assert_eq!(input.client_id, "c-1");
        assert_eq!(input.profile.push_at, "10:00:00");
        assert_eq!(input.profile.receive_push, 0);
        assert_eq!(input.profile.time_zone, "");
    }

    #[test]
    fn new_consumer_rejects_missing_client_id() {
        let result: Result<NewConsumer, _> = serde_json::from_str(&format!("{{{}}}", profile_json()));
        assert!(result.is_err());
    }

    #[test]
    fn consumer_serializes_flat() {
        let consumer = Consumer {
            api_key: "k".to_string(),
            client_id: "c".to_string(),
            profile: ConsumerProfile::default(),
        };
        let json = serde_json::to_value(&consumer).unwrap();
        assert_eq!(json["api_key"], "k");
        assert_eq!(json["receive_push"], 0);
        assert!(json.get("profile").is_none());
    }

    #[test]
    fn prayer_id_is_a_calendar_day() {
        for good in ["01-11", "02-29", "12-31"] {
            assert!(is_prayer_id(good), "{good}");
        }
        for bad in ["2103-2", "", "02-30", "04-31", "13-01", "00-10"] {
            assert!(!is_prayer_id(bad), "{bad}");
        }
    }
}
