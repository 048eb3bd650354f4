//! BICS Agent - HTTP API plugins for the BICS telecom platform
//!
//! This crate provides:
//! - Eight API plugins (Connect, MyNumbers and its sub-APIs, SMS)
//! - A YAML configuration store with built-in endpoint defaults
//! - An agent registry that builds the plugins and dispatches calls by name
//! - A CLI for listing, inspecting and calling plugins

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod telemetry;

// Plugin system
pub mod agent;
pub mod plugin;
pub mod plugins;

pub use agent::BicsAgent;
pub use config::{AgentConfiguration, ApiEndpoints, ApiKind};
pub use error::{AgentError, ConfigurationError, PluginError};
pub use http::{ApiClient, PluginContext, ReqwestTransport, Transport};
pub use models::{PhoneNumber, SmsMessage};
pub use plugin::{ApiPlugin, OperationDefinition};
pub use telemetry::Telemetry;
