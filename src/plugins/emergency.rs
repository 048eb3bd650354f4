//! MyNumbers Emergency Services API

use crate::config::ApiKind;
use crate::error::PluginError;
use crate::http::{ApiClient, PluginContext};
use crate::plugin::{require, unknown_operation, ApiPlugin, Args, OperationDefinition};
use async_trait::async_trait;
use serde_json::Value;

pub struct MyNumbersEmergencyServicesApiPlugin {
    client: ApiClient,
}

impl MyNumbersEmergencyServicesApiPlugin {
    pub const NAME: &'static str = "MyNumbersEmergencyServicesAPI";

    pub fn new(ctx: &PluginContext) -> Result<Self, PluginError> {
        Ok(Self {
            client: ApiClient::new(ApiKind::MyNumbersEmergencyServices, ctx)?,
        })
    }

    pub async fn register_emergency_service(
        &self,
        phone_number: &str,
        emergency_data: &str,
    ) -> Result<String, PluginError> {
        let op = "register_emergency_service";
        let number = require(Self::NAME, op, phone_number, "Phone number")?;
        let data = require(Self::NAME, op, emergency_data, "Emergency data")?;
        self.client
            .post(&format!("/emergency/{}", number), Some(data))
            .await
    }

    pub async fn get_emergency_service_info(&self, phone_number: &str) -> Result<String, PluginError> {
        let number = require(Self::NAME, "get_emergency_service_info", phone_number, "Phone number")?;
        self.client.get(&format!("/emergency/{}", number), None).await
    }

    pub async fn update_emergency_service(
        &self,
        phone_number: &str,
        emergency_data: &str,
    ) -> Result<String, PluginError> {
        let op = "update_emergency_service";
        let number = require(Self::NAME, op, phone_number, "Phone number")?;
        let data = require(Self::NAME, op, emergency_data, "Emergency data")?;
        self.client
            .put(&format!("/emergency/{}", number), Some(data))
            .await
    }
}

#[async_trait]
impl ApiPlugin for MyNumbersEmergencyServicesApiPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn operations(&self) -> Vec<OperationDefinition> {
        vec![
            OperationDefinition::new(
                "register_emergency_service",
                "Register emergency service details for a number",
                &["phone_number", "emergency_data"],
                &[],
            ),
            OperationDefinition::new(
                "get_emergency_service_info",
                "Emergency service details of a number",
                &["phone_number"],
                &[],
            ),
            OperationDefinition::new(
                "update_emergency_service",
                "Replace emergency service details of a number",
                &["phone_number", "emergency_data"],
                &[],
            ),
        ]
    }

    async fn invoke(&self, operation: &str, args: &Value) -> Result<String, PluginError> {
        let args = Args::parse(Self::NAME, operation, args)?;

        match operation {
            "register_emergency_service" => {
                self.register_emergency_service(
                    &args.string("phone_number")?,
                    &args.string("emergency_data")?,
                )
                .await
            }
            "get_emergency_service_info" => {
                self.get_emergency_service_info(&args.string("phone_number")?)
                    .await
            }
            "update_emergency_service" => {
                self.update_emergency_service(
                    &args.string("phone_number")?,
                    &args.string("emergency_data")?,
                )
                .await
            }
            _ => Err(unknown_operation(Self::NAME, operation)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{context, MockTransport};
    use reqwest::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_emergency_requests() {
        let transport = MockTransport::new();
        let plugin = MyNumbersEmergencyServicesApiPlugin::new(&context(transport.clone())).unwrap();
        let data = r#"{"address":"Rue 1"}"#;

        plugin.register_emergency_service("123", data).await.unwrap();
        plugin.get_emergency_service_info("123").await.unwrap();
        plugin.update_emergency_service("123", data).await.unwrap();

        let requests = transport.requests();
        let url = "https://mynumbers-emergency.api.bics.com/emergency/123";
        assert!(requests.iter().all(|r| r.url == url));
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[1].method, Method::GET);
        assert_eq!(requests[2].method, Method::PUT);
        assert_eq!(requests[2].body.as_deref(), Some(data));
    }

    #[tokio::test]
    async fn test_register_requires_both_arguments() {
        let transport = MockTransport::new();
        let plugin = MyNumbersEmergencyServicesApiPlugin::new(&context(transport.clone())).unwrap();

        let err = plugin
            .invoke("register_emergency_service", &json!({"phone_number": "123"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Emergency data is required"));
        assert_eq!(err.operation(), "register_emergency_service");
        assert_eq!(transport.call_count(), 0);
    }
}
