//! Typed views over API responses
//!
//! Plugins return raw JSON strings. These carriers are an opt-in decode
//! layer for callers that want structured data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A number as returned by the MyNumbers API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "type", default)]
    pub number_type: Option<String>,
    #[serde(default)]
    pub assigned_customer_id: Option<String>,
    #[serde(default)]
    pub activation_date: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl PhoneNumber {
    pub fn is_active(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("active"))
    }
}

/// An SMS as returned by the SMS API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmsMessage {
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub delivered_at: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl SmsMessage {
    pub fn is_failed(&self) -> bool {
        self.error_code.is_some()
    }
}

/// Decode a response body into `T`
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(body)
}
