//! Domain DTOs for the consumer and prayer backends.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//! Partial consumer updates have no fixed shape, so they stay a plain JSON
//! map rather than a struct of options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Device and push settings a client submits when registering a consumer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsumerProfile {
    pub device_model: String,
    pub device_platform: String,
    pub device_version: String,
    pub device_uuid: String,
    #[serde(default)]
    pub push_token: String,
    /// Time of day, `HH:MM:SS`.
    pub push_at: String,
    pub push_lang: String,
    #[serde(default)]
    pub time_zone: String,
    #[serde(default, with = "flag")]
    pub receive_push: bool,
}

/// A registered consumer as returned by the consumer backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Consumer {
    pub api_key: String,
    pub client_id: String,
    #[serde(flatten)]
    pub profile: ConsumerProfile,
}

/// Partial consumer payload for updates.
pub type ConsumerUpdate = serde_json::Map<String, serde_json::Value>;

/// Payload identifying a prayer request, `{"id": "DD-DD"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrayerRef {
    pub id: String,
}

impl PrayerRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Whose prayers `your_prayers` counts in a stats query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Consumer,
    Client,
}

impl KeyType {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyType::Consumer => "consumer",
            KeyType::Client => "client",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known key type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyType(pub String);

impl FromStr for KeyType {
    type Err = UnknownKeyType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consumer" => Ok(KeyType::Consumer),
            "client" => Ok(KeyType::Client),
            other => Err(UnknownKeyType(other.to_string())),
        }
    }
}

/// Prayer counts for a single prayer request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrayerStats {
    pub prayer_request_id: String,
    pub total_prayers: u64,
    pub your_prayers: u64,
    #[serde(default)]
    pub your_last_prayer_on: Option<String>,
}

/// `receive_push` travels as `0`/`1`; older clients send booleans.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Int(i64),
        }

        Ok(match Flag::deserialize(deserializer)? {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        })
    }
}
