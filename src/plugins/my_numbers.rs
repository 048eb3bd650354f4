//! BICS MyNumbers API: inventory and number lifecycle

use crate::config::ApiKind;
use crate::error::PluginError;
use crate::http::{build_query, ApiClient, PluginContext};
use crate::models::{decode, PhoneNumber};
use crate::plugin::{require, unknown_operation, ApiPlugin, Args, OperationDefinition};
use async_trait::async_trait;
use serde_json::Value;

pub struct MyNumbersApiPlugin {
    client: ApiClient,
}

impl MyNumbersApiPlugin {
    pub const NAME: &'static str = "MyNumbersAPI";

    pub fn new(ctx: &PluginContext) -> Result<Self, PluginError> {
        Ok(Self {
            client: ApiClient::new(ApiKind::MyNumbers, ctx)?,
        })
    }

    pub async fn get_numbers(
        &self,
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Result<String, PluginError> {
        let query = build_query(&[("limit", limit), ("offset", offset)]);
        self.client.get("/numbers", Some(&query)).await
    }

    pub async fn get_number_details(&self, phone_number: &str) -> Result<String, PluginError> {
        let number = require(Self::NAME, "get_number_details", phone_number, "Phone number")?;
        self.client.get(&format!("/numbers/{}", number), None).await
    }

    /// [`Self::get_number_details`] decoded into a [`PhoneNumber`]
    pub async fn number_details(&self, phone_number: &str) -> Result<PhoneNumber, PluginError> {
        let body = self.get_number_details(phone_number).await?;
        decode(&body).map_err(|e| PluginError::unexpected(Self::NAME, "get_number_details", e))
    }

    pub async fn reserve_number(&self, reservation_data: &str) -> Result<String, PluginError> {
        let data = require(Self::NAME, "reserve_number", reservation_data, "Reservation data")?;
        self.client.post("/numbers/reserve", Some(data)).await
    }

    /// Activation data is optional; without it the request has no body
    pub async fn activate_number(
        &self,
        phone_number: &str,
        activation_data: Option<&str>,
    ) -> Result<String, PluginError> {
        let number = require(Self::NAME, "activate_number", phone_number, "Phone number")?;
        let body = activation_data.filter(|d| !d.is_empty());
        self.client
            .post(&format!("/numbers/{}/activate", number), body)
            .await
    }

    pub async fn deactivate_number(&self, phone_number: &str) -> Result<String, PluginError> {
        let number = require(Self::NAME, "deactivate_number", phone_number, "Phone number")?;
        self.client
            .post(&format!("/numbers/{}/deactivate", number), Some("{}"))
            .await
    }
}

#[async_trait]
impl ApiPlugin for MyNumbersApiPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn operations(&self) -> Vec<OperationDefinition> {
        vec![
            OperationDefinition::new(
                "get_numbers",
                "List numbers, optionally paginated",
                &[],
                &["limit", "offset"],
            ),
            OperationDefinition::new(
                "get_number_details",
                "Get details for one number",
                &["phone_number"],
                &[],
            ),
            OperationDefinition::new(
                "reserve_number",
                "Reserve a number from a JSON request",
                &["reservation_data"],
                &[],
            ),
            OperationDefinition::new(
                "activate_number",
                "Activate a reserved number",
                &["phone_number"],
                &["activation_data"],
            ),
            OperationDefinition::new(
                "deactivate_number",
                "Deactivate a number",
                &["phone_number"],
                &[],
            ),
        ]
    }

    async fn invoke(&self, operation: &str, args: &Value) -> Result<String, PluginError> {
        let args = Args::parse(Self::NAME, operation, args)?;

        match operation {
            "get_numbers" => {
                let limit = args.optional("limit")?;
                let offset = args.optional("offset")?;
                self.get_numbers(limit.as_deref(), offset.as_deref()).await
            }
            "get_number_details" => self.get_number_details(&args.string("phone_number")?).await,
            "reserve_number" => self.reserve_number(&args.string("reservation_data")?).await,
            "activate_number" => {
                let data = args.optional("activation_data")?;
                self.activate_number(&args.string("phone_number")?, data.as_deref())
                    .await
            }
            "deactivate_number" => self.deactivate_number(&args.string("phone_number")?).await,
            _ => Err(unknown_operation(Self::NAME, operation)),
        }
    }
}
