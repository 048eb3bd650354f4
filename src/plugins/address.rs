//! MyNumbers Address Management API

use crate::config::ApiKind;
use crate::error::PluginError;
use crate::http::{ApiClient, PluginContext};
use crate::plugin::{require, unknown_operation, ApiPlugin, Args, OperationDefinition};
use async_trait::async_trait;
use serde_json::Value;

pub struct MyNumbersAddressManagementApiPlugin {
    client: ApiClient,
}

impl MyNumbersAddressManagementApiPlugin {
    pub const NAME: &'static str = "MyNumbersAddressManagementAPI";

    pub fn new(ctx: &PluginContext) -> Result<Self, PluginError> {
        Ok(Self {
            client: ApiClient::new(ApiKind::MyNumbersAddressManagement, ctx)?,
        })
    }

    pub async fn get_addresses(&self, phone_number: &str) -> Result<String, PluginError> {
        let number = require(Self::NAME, "get_addresses", phone_number, "Phone number")?;
        self.client.get(&format!("/addresses/{}", number), None).await
    }

    pub async fn update_address(
        &self,
        phone_number: &str,
        address_data: &str,
    ) -> Result<String, PluginError> {
        let number = require(Self::NAME, "update_address", phone_number, "Phone number")?;
        let data = require(Self::NAME, "update_address", address_data, "Address data")?;
        self.client
            .put(&format!("/addresses/{}", number), Some(data))
            .await
    }
}

#[async_trait]
impl ApiPlugin for MyNumbersAddressManagementApiPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn operations(&self) -> Vec<OperationDefinition> {
        vec![
            OperationDefinition::new(
                "get_addresses",
                "Get the addresses registered for a number",
                &["phone_number"],
                &[],
            ),
            OperationDefinition::new(
                "update_address",
                "Replace the address of a number",
                &["phone_number", "address_data"],
                &[],
            ),
        ]
    }

    async fn invoke(&self, operation: &str, args: &Value) -> Result<String, PluginError> {
        let args = Args::parse(Self::NAME, operation, args)?;

        match operation {
            "get_addresses" => self.get_addresses(&args.string("phone_number")?).await,
            "update_address" => {
                self.update_address(&args.string("phone_number")?, &args.string("address_data")?)
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

    #[tokio::test]
    async fn test_address_requests() {
        let transport = MockTransport::new();
        let plugin = MyNumbersAddressManagementApiPlugin::new(&context(transport.clone())).unwrap();

        plugin.get_addresses("123").await.unwrap();
        plugin.update_address("123", r#"{"city":"Brussels"}"#).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(
            requests[0].url,
            "https://mynumbers-address.api.bics.com/addresses/123"
        );
        assert_eq!(requests[1].method, Method::PUT);
        assert_eq!(requests[1].body.as_deref(), Some(r#"{"city":"Brussels"}"#));
    }

    #[tokio::test]
    async fn test_update_requires_data() {
        let transport = MockTransport::new();
        let plugin = MyNumbersAddressManagementApiPlugin::new(&context(transport.clone())).unwrap();

        let err = plugin.update_address("123", "").await.unwrap_err();
        assert!(err.to_string().contains("Address data is required"));
        assert!(plugin.get_addresses("").await.unwrap_err().is_validation());
        assert_eq!(transport.call_count(), 0);
    }
}
