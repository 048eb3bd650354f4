//! MyNumbers Disconnection API

use crate::config::ApiKind;
use crate::error::PluginError;
use crate::http::{ApiClient, PluginContext};
use crate::plugin::{require, unknown_operation, ApiPlugin, Args, OperationDefinition};
use async_trait::async_trait;
use serde_json::Value;

pub struct MyNumbersDisconnectionApiPlugin {
    client: ApiClient,
}

impl MyNumbersDisconnectionApiPlugin {
    pub const NAME: &'static str = "MyNumbersDisconnectionAPI";

    pub fn new(ctx: &PluginContext) -> Result<Self, PluginError> {
        Ok(Self {
            client: ApiClient::new(ApiKind::MyNumbersDisconnection, ctx)?,
        })
    }

    pub async fn request_disconnection(
        &self,
        phone_number: &str,
        disconnection_data: Option<&str>,
    ) -> Result<String, PluginError> {
        let number = require(Self::NAME, "request_disconnection", phone_number, "Phone number")?;
        let body = disconnection_data.filter(|d| !d.is_empty());
        self.client
            .post(&format!("/disconnect/{}", number), body)
            .await
    }

    pub async fn get_disconnection_status(&self, phone_number: &str) -> Result<String, PluginError> {
        let number = require(Self::NAME, "get_disconnection_status", phone_number, "Phone number")?;
        self.client
            .get(&format!("/disconnect/status/{}", number), None)
            .await
    }

    pub async fn cancel_disconnection(&self, phone_number: &str) -> Result<String, PluginError> {
        let number = require(Self::NAME, "cancel_disconnection", phone_number, "Phone number")?;
        self.client.delete(&format!("/disconnect/{}", number)).await
    }
}

#[async_trait]
impl ApiPlugin for MyNumbersDisconnectionApiPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn operations(&self) -> Vec<OperationDefinition> {
        vec![
            OperationDefinition::new(
                "request_disconnection",
                "Request disconnection of a number",
                &["phone_number"],
                &["disconnection_data"],
            ),
            OperationDefinition::new(
                "get_disconnection_status",
                "Status of a pending disconnection",
                &["phone_number"],
                &[],
            ),
            OperationDefinition::new(
                "cancel_disconnection",
                "Cancel a pending disconnection",
                &["phone_number"],
                &[],
            ),
        ]
    }

    async fn invoke(&self, operation: &str, args: &Value) -> Result<String, PluginError> {
        let args = Args::parse(Self::NAME, operation, args)?;

        match operation {
            "request_disconnection" => {
                let data = args.optional("disconnection_data")?;
                self.request_disconnection(&args.string("phone_number")?, data.as_deref())
                    .await
            }
            "get_disconnection_status" => {
                self.get_disconnection_status(&args.string("phone_number")?).await
            }
            "cancel_disconnection" => self.cancel_disconnection(&args.string("phone_number")?).await,
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
    async fn test_disconnection_lifecycle() {
        let transport = MockTransport::new();
        let plugin = MyNumbersDisconnectionApiPlugin::new(&context(transport.clone())).unwrap();

        plugin
            .request_disconnection("123", Some(r#"{"date":"2024-06-01"}"#))
            .await
            .unwrap();
        plugin.get_disconnection_status("123").await.unwrap();
        plugin.cancel_disconnection("123").await.unwrap();

        let base = "https://mynumbers-disconnection.api.bics.com";
        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url, format!("{}/disconnect/123", base));
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"date":"2024-06-01"}"#));
        assert_eq!(requests[1].url, format!("{}/disconnect/status/123", base));
        assert_eq!(requests[2].method, Method::DELETE);
        assert_eq!(requests[2].url, format!("{}/disconnect/123", base));
    }

    #[tokio::test]
    async fn test_request_without_data_has_no_body() {
        let transport = MockTransport::new();
        let plugin = MyNumbersDisconnectionApiPlugin::new(&context(transport.clone())).unwrap();

        plugin.request_disconnection("123", None).await.unwrap();
        assert_eq!(transport.last().body, None);

        assert!(plugin.cancel_disconnection("").await.unwrap_err().is_validation());
        assert_eq!(transport.call_count(), 1);
    }
}
