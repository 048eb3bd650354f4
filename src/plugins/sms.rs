//! BICS SMS API

use crate::config::ApiKind;
use crate::error::PluginError;
use crate::http::{build_query, ApiClient, PluginContext};
use crate::models::{decode, SmsMessage};
use crate::plugin::{require, unknown_operation, ApiPlugin, Args, OperationDefinition};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct SmsApiPlugin {
    client: ApiClient,
}

impl SmsApiPlugin {
    pub const NAME: &'static str = "SMSAPI";

    pub fn new(ctx: &PluginContext) -> Result<Self, PluginError> {
        Ok(Self {
            client: ApiClient::new(ApiKind::Sms, ctx)?,
        })
    }

    /// Sends `{"from", "to", "message"}`; the fields are JSON-escaped
    pub async fn send_sms(&self, from: &str, to: &str, message: &str) -> Result<String, PluginError> {
        let from = require(Self::NAME, "send_sms", from, "From")?;
        let to = require(Self::NAME, "send_sms", to, "To")?;
        let message = require(Self::NAME, "send_sms", message, "Message")?;

        let body = json!({
            "from": from,
            "to": to,
            "message": message,
        })
        .to_string();
        self.client.post("/sms/send", Some(&body)).await
    }

    pub async fn get_sms_status(&self, message_id: &str) -> Result<String, PluginError> {
        let id = require(Self::NAME, "get_sms_status", message_id, "Message ID")?;
        self.client.get(&format!("/sms/status/{}", id), None).await
    }

    /// [`Self::get_sms_status`] decoded into an [`SmsMessage`]
    pub async fn sms_message(&self, message_id: &str) -> Result<SmsMessage, PluginError> {
        let body = self.get_sms_status(message_id).await?;
        decode(&body).map_err(|e| PluginError::unexpected(Self::NAME, "get_sms_status", e))
    }

    pub async fn get_sms_history(
        &self,
        phone_number: &str,
        limit: Option<&str>,
    ) -> Result<String, PluginError> {
        let number = require(Self::NAME, "get_sms_history", phone_number, "Phone number")?;
        let query = build_query(&[("limit", limit)]);
        self.client
            .get(&format!("/sms/history/{}", number), Some(&query))
            .await
    }

    pub async fn send_bulk_sms(&self, bulk_sms_data: &str) -> Result<String, PluginError> {
        let data = require(Self::NAME, "send_bulk_sms", bulk_sms_data, "Bulk SMS data")?;
        self.client.post("/sms/bulk", Some(data)).await
    }
}

#[async_trait]
impl ApiPlugin for SmsApiPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn operations(&self) -> Vec<OperationDefinition> {
        vec![
            OperationDefinition::new(
                "send_sms",
                "Send a single SMS",
                &["from", "to", "message"],
                &[],
            ),
            OperationDefinition::new(
                "get_sms_status",
                "Delivery status of a sent message",
                &["message_id"],
                &[],
            ),
            OperationDefinition::new(
                "get_sms_history",
                "Messages sent from or to a number",
                &["phone_number"],
                &["limit"],
            ),
            OperationDefinition::new(
                "send_bulk_sms",
                "Send a batch of messages from a JSON document",
                &["bulk_sms_data"],
                &[],
            ),
        ]
    }

    async fn invoke(&self, operation: &str, args: &Value) -> Result<String, PluginError> {
        let args = Args::parse(Self::NAME, operation, args)?;

        match operation {
            "send_sms" => {
                self.send_sms(
                    &args.string("from")?,
                    &args.string("to")?,
                    &args.string("message")?,
                )
                .await
            }
            "get_sms_status" => self.get_sms_status(&args.string("message_id")?).await,
            "get_sms_history" => {
                let limit = args.optional("limit")?;
                self.get_sms_history(&args.string("phone_number")?, limit.as_deref())
                    .await
            }
            "send_bulk_sms" => self.send_bulk_sms(&args.string("bulk_sms_data")?).await,
            _ => Err(unknown_operation(Self::NAME, operation)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{context, MockTransport};
    use reqwest::Method;

    #[tokio::test]
    async fn test_send_sms_body() {
        let transport = MockTransport::new();
        transport.respond(200, r#"{"message_id":"m1"}"#);
        let plugin = SmsApiPlugin::new(&context(transport.clone())).unwrap();

        let body = plugin.send_sms("BICS", "+32470000000", "Hi").await.unwrap();
        assert_eq!(body, r#"{"message_id":"m1"}"#);

        let req = transport.last();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url, "https://sms.api.bics.com/sms/send");
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            sent,
            json!({"from": "BICS", "to": "+32470000000", "message": "Hi"})
        );
    }

    #[tokio::test]
    async fn test_send_sms_escapes_message() {
        let transport = MockTransport::new();
        let plugin = SmsApiPlugin::new(&context(transport.clone())).unwrap();

        plugin
            .send_sms("BICS", "+32", "say \"hi\"\nbye")
            .await
            .unwrap();
        let sent: Value = serde_json::from_str(transport.last().body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["message"], "say \"hi\"\nbye");
    }

    #[tokio::test]
    async fn test_send_sms_requires_all_fields() {
        let transport = MockTransport::new();
        let plugin = SmsApiPlugin::new(&context(transport.clone())).unwrap();

        let err = plugin.send_sms("", "+32", "Hi").await.unwrap_err();
        assert!(err.to_string().contains("From is required"));
        let err = plugin.send_sms("BICS", "", "Hi").await.unwrap_err();
        assert!(err.to_string().contains("To is required"));
        let err = plugin.send_sms("BICS", "+32", "").await.unwrap_err();
        assert!(err.to_string().contains("Message is required"));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_history_limit() {
        let transport = MockTransport::new();
        let plugin = SmsApiPlugin::new(&context(transport.clone())).unwrap();

        plugin.get_sms_history("123", Some("50")).await.unwrap();
        assert_eq!(
            transport.last().url,
            "https://sms.api.bics.com/sms/history/123?limit=50"
        );

        plugin.get_sms_history("123", None).await.unwrap();
        assert_eq!(transport.last().url, "https://sms.api.bics.com/sms/history/123");
    }

    #[tokio::test]
    async fn test_bulk_and_status() {
        let transport = MockTransport::new();
        transport.respond(202, r#"{"batch":"b1"}"#);
        transport.respond(200, r#"{"message_id":"m1","status":"DELIVERED"}"#);
        let plugin = SmsApiPlugin::new(&context(transport.clone())).unwrap();

        let body = plugin
            .invoke("send_bulk_sms", &json!({"bulk_sms_data": "[]"}))
            .await
            .unwrap();
        assert_eq!(body, r#"{"batch":"b1"}"#);
        assert_eq!(transport.last().url, "https://sms.api.bics.com/sms/bulk");

        let sms = plugin.sms_message("m1").await.unwrap();
        assert_eq!(sms.status.as_deref(), Some("DELIVERED"));
        assert!(!sms.is_failed());
        assert_eq!(transport.last().url, "https://sms.api.bics.com/sms/status/m1");
    }
}
