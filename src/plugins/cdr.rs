//! MyNumbers CDR API: call detail records and usage

use crate::config::ApiKind;
use crate::error::PluginError;
use crate::http::{build_query, ApiClient, PluginContext};
use crate::plugin::{require, unknown_operation, ApiPlugin, Args, OperationDefinition};
use async_trait::async_trait;
use serde_json::Value;

pub struct MyNumbersCdrApiPlugin {
    client: ApiClient,
}

impl MyNumbersCdrApiPlugin {
    pub const NAME: &'static str = "MyNumbersCDRAPI";

    pub fn new(ctx: &PluginContext) -> Result<Self, PluginError> {
        Ok(Self {
            client: ApiClient::new(ApiKind::MyNumbersCdr, ctx)?,
        })
    }

    /// Dates are passed through as given
    pub async fn get_cdr_records(
        &self,
        phone_number: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<String, PluginError> {
        let number = require(Self::NAME, "get_cdr_records", phone_number, "Phone number")?;
        let query = build_query(&[("startDate", start_date), ("endDate", end_date)]);
        self.client
            .get(&format!("/cdr/{}", number), Some(&query))
            .await
    }

    pub async fn get_usage_summary(&self, phone_number: &str) -> Result<String, PluginError> {
        let number = require(Self::NAME, "get_usage_summary", phone_number, "Phone number")?;
        self.client.get(&format!("/usage/{}", number), None).await
    }
}

#[async_trait]
impl ApiPlugin for MyNumbersCdrApiPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn operations(&self) -> Vec<OperationDefinition> {
        vec![
            OperationDefinition::new(
                "get_cdr_records",
                "Call detail records for a number, optionally within a date range",
                &["phone_number"],
                &["start_date", "end_date"],
            ),
            OperationDefinition::new(
                "get_usage_summary",
                "Usage summary for a number",
                &["phone_number"],
                &[],
            ),
        ]
    }

    async fn invoke(&self, operation: &str, args: &Value) -> Result<String, PluginError> {
        let args = Args::parse(Self::NAME, operation, args)?;

        match operation {
            "get_cdr_records" => {
                let start = args.optional("start_date")?;
                let end = args.optional("end_date")?;
                self.get_cdr_records(&args.string("phone_number")?, start.as_deref(), end.as_deref())
                    .await
            }
            "get_usage_summary" => self.get_usage_summary(&args.string("phone_number")?).await,
            _ => Err(unknown_operation(Self::NAME, operation)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{context, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_cdr_date_range() {
        let transport = MockTransport::new();
        let plugin = MyNumbersCdrApiPlugin::new(&context(transport.clone())).unwrap();

        plugin
            .get_cdr_records("123", Some("2024-01-01"), Some("2024-01-31"))
            .await
            .unwrap();
        assert_eq!(
            transport.last().url,
            "https://mynumbers-cdr.api.bics.com/cdr/123?startDate=2024-01-01&endDate=2024-01-31"
        );

        plugin.get_cdr_records("123", None, Some("2024-01-31")).await.unwrap();
        assert_eq!(
            transport.last().url,
            "https://mynumbers-cdr.api.bics.com/cdr/123?endDate=2024-01-31"
        );

        plugin.get_cdr_records("123", None, None).await.unwrap();
        assert_eq!(transport.last().url, "https://mynumbers-cdr.api.bics.com/cdr/123");
    }

    #[tokio::test]
    async fn test_usage_summary() {
        let transport = MockTransport::new();
        transport.respond(200, r#"{"minutes":12}"#);
        let plugin = MyNumbersCdrApiPlugin::new(&context(transport.clone())).unwrap();

        let body = plugin
            .invoke("get_usage_summary", &json!({"phone_number": "123"}))
            .await
            .unwrap();
        assert_eq!(body, r#"{"minutes":12}"#);
        assert_eq!(transport.last().url, "https://mynumbers-cdr.api.bics.com/usage/123");

        assert!(plugin.get_usage_summary("").await.unwrap_err().is_validation());
        assert_eq!(transport.call_count(), 1);
    }
}
