//! BICS Connect API: customers and products

use crate::config::ApiKind;
use crate::error::PluginError;
use crate::http::{build_query, ApiClient, PluginContext};
use crate::plugin::{require, unknown_operation, ApiPlugin, Args, OperationDefinition};
use async_trait::async_trait;
use serde_json::Value;

pub struct ConnectApiPlugin {
    client: ApiClient,
}

impl ConnectApiPlugin {
    pub const NAME: &'static str = "ConnectAPI";

    pub fn new(ctx: &PluginContext) -> Result<Self, PluginError> {
        Ok(Self {
            client: ApiClient::new(ApiKind::Connect, ctx)?,
        })
    }

    pub async fn get_customers(
        &self,
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Result<String, PluginError> {
        let query = build_query(&[("limit", limit), ("offset", offset)]);
        self.client.get("/customers", Some(&query)).await
    }

    pub async fn get_customer_by_id(&self, customer_id: &str) -> Result<String, PluginError> {
        let id = require(Self::NAME, "get_customer_by_id", customer_id, "Customer ID")?;
        self.client.get(&format!("/customers/{}", id), None).await
    }

    pub async fn create_customer(&self, customer_data: &str) -> Result<String, PluginError> {
        let data = require(Self::NAME, "create_customer", customer_data, "Customer data")?;
        self.client.post("/customers", Some(data)).await
    }

    pub async fn update_customer(
        &self,
        customer_id: &str,
        customer_data: &str,
    ) -> Result<String, PluginError> {
        let id = require(Self::NAME, "update_customer", customer_id, "Customer ID")?;
        let data = require(Self::NAME, "update_customer", customer_data, "Customer data")?;
        self.client
            .put(&format!("/customers/{}", id), Some(data))
            .await
    }

    pub async fn delete_customer(&self, customer_id: &str) -> Result<String, PluginError> {
        let id = require(Self::NAME, "delete_customer", customer_id, "Customer ID")?;
        self.client.delete(&format!("/customers/{}", id)).await
    }

    pub async fn get_products(
        &self,
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Result<String, PluginError> {
        let query = build_query(&[("limit", limit), ("offset", offset)]);
        self.client.get("/products", Some(&query)).await
    }

    pub async fn get_product_by_id(&self, product_id: &str) -> Result<String, PluginError> {
        let id = require(Self::NAME, "get_product_by_id", product_id, "Product ID")?;
        self.client.get(&format!("/products/{}", id), None).await
    }
}

#[async_trait]
impl ApiPlugin for ConnectApiPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn operations(&self) -> Vec<OperationDefinition> {
        vec![
            OperationDefinition::new(
                "get_customers",
                "List customers, optionally paginated",
                &[],
                &["limit", "offset"],
            ),
            OperationDefinition::new(
                "get_customer_by_id",
                "Get one customer",
                &["customer_id"],
                &[],
            ),
            OperationDefinition::new(
                "create_customer",
                "Create a customer from a JSON document",
                &["customer_data"],
                &[],
            ),
            OperationDefinition::new(
                "update_customer",
                "Replace a customer with a JSON document",
                &["customer_id", "customer_data"],
                &[],
            ),
            OperationDefinition::new("delete_customer", "Delete a customer", &["customer_id"], &[]),
            OperationDefinition::new(
                "get_products",
                "List products, optionally paginated",
                &[],
                &["limit", "offset"],
            ),
            OperationDefinition::new("get_product_by_id", "Get one product", &["product_id"], &[]),
        ]
    }

    async fn invoke(&self, operation: &str, args: &Value) -> Result<String, PluginError> {
        let args = Args::parse(Self::NAME, operation, args)?;

        match operation {
            "get_customers" => {
                let limit = args.optional("limit")?;
                let offset = args.optional("offset")?;
                self.get_customers(limit.as_deref(), offset.as_deref()).await
            }
            "get_customer_by_id" => self.get_customer_by_id(&args.string("customer_id")?).await,
            "create_customer" => self.create_customer(&args.string("customer_data")?).await,
            "update_customer" => {
                self.update_customer(&args.string("customer_id")?, &args.string("customer_data")?)
                    .await
            }
            "delete_customer" => self.delete_customer(&args.string("customer_id")?).await,
            "get_products" => {
                let limit = args.optional("limit")?;
                let offset = args.optional("offset")?;
                self.get_products(limit.as_deref(), offset.as_deref()).await
            }
            "get_product_by_id" => self.get_product_by_id(&args.string("product_id")?).await,
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
    async fn test_get_customers_query() {
        let transport = MockTransport::new();
        let plugin = ConnectApiPlugin::new(&context(transport.clone())).unwrap();

        plugin.get_customers(Some("10"), Some("20")).await.unwrap();
        assert_eq!(
            transport.last().url,
            "https://connect.api.bics.com/customers?limit=10&offset=20"
        );

        plugin.get_customers(None, Some("20")).await.unwrap();
        assert_eq!(
            transport.last().url,
            "https://connect.api.bics.com/customers?offset=20"
        );

        plugin.get_customers(Some(""), None).await.unwrap();
        assert_eq!(transport.last().url, "https://connect.api.bics.com/customers");
    }

    #[tokio::test]
    async fn test_missing_customer_id_never_hits_network() {
        let transport = MockTransport::new();
        let plugin = ConnectApiPlugin::new(&context(transport.clone())).unwrap();

        let err = plugin.get_customer_by_id("").await.unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Customer ID is required"));

        let err = plugin.update_customer("c1", "").await.unwrap_err();
        assert!(err.to_string().contains("Customer data is required"));

        let err = plugin.get_product_by_id("").await.unwrap_err();
        assert!(err.to_string().contains("Product ID is required"));

        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_customer_crud_requests() {
        let transport = MockTransport::new();
        let plugin = ConnectApiPlugin::new(&context(transport.clone())).unwrap();

        plugin.create_customer(r#"{"name":"Acme"}"#).await.unwrap();
        plugin.update_customer("c1", r#"{"name":"Acme 2"}"#).await.unwrap();
        plugin.delete_customer("c1").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url, "https://connect.api.bics.com/customers");
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"name":"Acme"}"#));
        assert_eq!(requests[1].method, Method::PUT);
        assert_eq!(requests[1].url, "https://connect.api.bics.com/customers/c1");
        assert_eq!(requests[2].method, Method::DELETE);
        assert_eq!(requests[2].body, None);
    }

    #[tokio::test]
    async fn test_invoke_by_name() {
        let transport = MockTransport::new();
        transport.respond(200, r#"[{"id":"p1"}]"#);
        let plugin = ConnectApiPlugin::new(&context(transport.clone())).unwrap();

        let body = plugin
            .invoke("get_products", &json!({"limit": 5}))
            .await
            .unwrap();
        assert_eq!(body, r#"[{"id":"p1"}]"#);
        assert_eq!(
            transport.last().url,
            "https://connect.api.bics.com/products?limit=5"
        );

        let err = plugin.invoke("get_customer_by_id", &json!({})).await.unwrap_err();
        assert!(err.to_string().contains("Customer ID is required"));

        let err = plugin.invoke("drop_tables", &Value::Null).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_operations_catalogue() {
        let plugin = ConnectApiPlugin::new(&context(MockTransport::new())).unwrap();
        assert_eq!(plugin.operations().len(), 7);
        assert!(plugin.has_operation("update_customer"));
        assert!(!plugin.has_operation("send_sms"));
        assert_eq!(plugin.base_url(), "https://connect.api.bics.com");
    }
}
