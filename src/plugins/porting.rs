//! MyNumbers Number Porting API

use crate::config::ApiKind;
use crate::error::PluginError;
use crate::http::{ApiClient, PluginContext};
use crate::plugin::{require, unknown_operation, ApiPlugin, Args, OperationDefinition};
use async_trait::async_trait;
use serde_json::Value;

pub struct MyNumbersNumberPortingApiPlugin {
    client: ApiClient,
}

impl MyNumbersNumberPortingApiPlugin {
    pub const NAME: &'static str = "MyNumbersNumberPortingAPI";

    pub fn new(ctx: &PluginContext) -> Result<Self, PluginError> {
        Ok(Self {
            client: ApiClient::new(ApiKind::MyNumbersNumberPorting, ctx)?,
        })
    }

    pub async fn request_port_in(
        &self,
        phone_number: &str,
        porting_data: &str,
    ) -> Result<String, PluginError> {
        let number = require(Self::NAME, "request_port_in", phone_number, "Phone number")?;
        let data = require(Self::NAME, "request_port_in", porting_data, "Porting data")?;
        self.client
            .post(&format!("/portin/{}", number), Some(data))
            .await
    }

    pub async fn request_port_out(
        &self,
        phone_number: &str,
        porting_data: &str,
    ) -> Result<String, PluginError> {
        let number = require(Self::NAME, "request_port_out", phone_number, "Phone number")?;
        let data = require(Self::NAME, "request_port_out", porting_data, "Porting data")?;
        self.client
            .post(&format!("/portout/{}", number), Some(data))
            .await
    }

    pub async fn get_porting_status(&self, phone_number: &str) -> Result<String, PluginError> {
        let number = require(Self::NAME, "get_porting_status", phone_number, "Phone number")?;
        self.client
            .get(&format!("/porting/status/{}", number), None)
            .await
    }

    pub async fn cancel_porting(&self, phone_number: &str) -> Result<String, PluginError> {
        let number = require(Self::NAME, "cancel_porting", phone_number, "Phone number")?;
        self.client.delete(&format!("/porting/{}", number)).await
    }
}

#[async_trait]
impl ApiPlugin for MyNumbersNumberPortingApiPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn operations(&self) -> Vec<OperationDefinition> {
        vec![
            OperationDefinition::new(
                "request_port_in",
                "Port a number in from another operator",
                &["phone_number", "porting_data"],
                &[],
            ),
            OperationDefinition::new(
                "request_port_out",
                "Port a number out to another operator",
                &["phone_number", "porting_data"],
                &[],
            ),
            OperationDefinition::new(
                "get_porting_status",
                "Status of a porting request",
                &["phone_number"],
                &[],
            ),
            OperationDefinition::new(
                "cancel_porting",
                "Cancel a porting request",
                &["phone_number"],
                &[],
            ),
        ]
    }

    async fn invoke(&self, operation: &str, args: &Value) -> Result<String, PluginError> {
        let args = Args::parse(Self::NAME, operation, args)?;

        match operation {
            "request_port_in" => {
                self.request_port_in(&args.string("phone_number")?, &args.string("porting_data")?)
                    .await
            }
            "request_port_out" => {
                self.request_port_out(&args.string("phone_number")?, &args.string("porting_data")?)
                    .await
            }
            "get_porting_status" => self.get_porting_status(&args.string("phone_number")?).await,
            "cancel_porting" => self.cancel_porting(&args.string("phone_number")?).await,
            _ => Err(unknown_operation(Self::NAME, operation)),
        }
    }
}
