//! Agent registry
//!
//! Owns the eight BICS API plugins and their lifecycle:
//! stopped -> `start()` -> running -> `stop()` -> stopped (restartable).

use crate::config::AgentConfiguration;
use crate::error::AgentError;
use crate::http::{PluginContext, ReqwestTransport, Transport};
use crate::plugin::ApiPlugin;
use crate::plugins;
use crate::telemetry::Telemetry;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Plugin registry keyed by plugin name, in registration order
pub struct BicsAgent {
    config: Arc<AgentConfiguration>,
    transport: Option<Arc<dyn Transport>>,
    telemetry: Arc<Telemetry>,
    plugins: RwLock<IndexMap<String, Arc<dyn ApiPlugin>>>,
    running: AtomicBool,
}

impl BicsAgent {
    pub fn new(config: Arc<AgentConfiguration>) -> Self {
        Self {
            config,
            transport: None,
            telemetry: Arc::new(Telemetry::minimal()),
            plugins: RwLock::new(IndexMap::new()),
            running: AtomicBool::new(false),
        }
    }

    /// Agent over the process-wide bundled configuration
    pub fn with_global_config() -> Result<Self, AgentError> {
        Ok(Self::new(AgentConfiguration::global()?))
    }

    /// Use this transport instead of building a `reqwest` client on start
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Build and register every plugin, then mark the agent running.
    ///
    /// All or nothing: on error the agent stays stopped and the previously
    /// registered plugins are kept as they were. Calling this while running
    /// replaces the plugins with fresh instances.
    pub fn start(&self) -> Result<(), AgentError> {
        info!("Initializing plugin framework...");

        let transport = match &self.transport {
            Some(transport) => transport.clone(),
            None => {
                let transport = ReqwestTransport::new().map_err(|e| AgentError::Registration {
                    plugin: "http".to_string(),
                    reason: e.to_string(),
                })?;
                Arc::new(transport) as Arc<dyn Transport>
            }
        };
        let ctx = PluginContext::new(self.config.clone(), transport, self.telemetry.clone());

        info!("Registering BICS API plugins...");
        let created = plugins::create_all(&ctx).map_err(|e| AgentError::Registration {
            plugin: e.plugin().to_string(),
            reason: e.to_string(),
        })?;

        let mut registered = IndexMap::with_capacity(created.len());
        for plugin in created {
            debug!("Registered plugin: {}", plugin.name());
            registered.insert(plugin.name().to_string(), plugin);
        }
        let count = registered.len();

        *self.plugins.write() = registered;
        self.running.store(true, Ordering::SeqCst);

        info!("Agent started successfully with {} plugins", count);
        Ok(())
    }

    /// No-op when already stopped. Registered plugins are retained.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Stopping Agent...");
            info!("Agent stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn ApiPlugin>> {
        self.plugins.read().get(name).cloned()
    }

    /// Snapshot of the registry; later changes do not affect it
    pub fn all_plugins(&self) -> IndexMap<String, Arc<dyn ApiPlugin>> {
        self.plugins.read().clone()
    }

    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins.read().keys().cloned().collect()
    }

    /// Dispatch an operation to a plugin by name
    pub async fn invoke(
        &self,
        plugin: &str,
        operation: &str,
        args: &Value,
    ) -> Result<String, AgentError> {
        if !self.is_running() {
            return Err(AgentError::NotRunning);
        }

        let target = self
            .get_plugin(plugin)
            .ok_or_else(|| AgentError::UnknownPlugin(plugin.to_string()))?;

        Ok(target.invoke(operation, args).await?)
    }

    pub fn config(&self) -> &Arc<AgentConfiguration> {
        &self.config
    }

    pub fn telemetry(&self) -> &Arc<Telemetry> {
        &self.telemetry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::MockTransport;
    use serde_json::json;

    fn agent(transport: Arc<MockTransport>) -> BicsAgent {
        let config = Arc::new(AgentConfiguration::bundled().unwrap());
        BicsAgent::new(config).with_transport(transport)
    }

    #[test]
    fn test_agent_lifecycle() {
        let agent = agent(MockTransport::new());
        assert!(!agent.is_running());
        assert!(agent.all_plugins().is_empty());

        agent.start().unwrap();
        assert!(agent.is_running());

        agent.stop();
        assert!(!agent.is_running());

        // Second stop is a no-op
        agent.stop();
        assert!(!agent.is_running());
    }

    #[test]
    fn test_plugins_registered() {
        let agent = agent(MockTransport::new());
        agent.start().unwrap();

        let plugins = agent.all_plugins();
        assert_eq!(plugins.len(), 8);
        for name in [
            "ConnectAPI",
            "MyNumbersAPI",
            "MyNumbersAddressManagementAPI",
            "MyNumbersCDRAPI",
            "MyNumbersDisconnectionAPI",
            "MyNumbersEmergencyServicesAPI",
            "MyNumbersNumberPortingAPI",
            "SMSAPI",
        ] {
            let plugin = agent.get_plugin(name).unwrap();
            assert_eq!(plugin.name(), name);
        }
        assert_eq!(agent.plugin_names()[0], "ConnectAPI");
    }

    #[test]
    fn test_unknown_plugin_is_none() {
        let agent = agent(MockTransport::new());
        agent.start().unwrap();
        assert!(agent.get_plugin("NonExistentAPI").is_none());
    }

    #[test]
    fn test_stop_keeps_plugins_and_restart_works() {
        let agent = agent(MockTransport::new());
        agent.start().unwrap();
        let before = agent.get_plugin("SMSAPI").unwrap();

        agent.stop();
        assert_eq!(agent.all_plugins().len(), 8);

        agent.start().unwrap();
        assert!(agent.is_running());
        let after = agent.get_plugin("SMSAPI").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let agent = agent(MockTransport::new());
        agent.start().unwrap();

        let mut snapshot = agent.all_plugins();
        snapshot.clear();
        assert_eq!(agent.all_plugins().len(), 8);
    }

    #[test]
    fn test_failed_start_keeps_previous_state() {
        let var = "BICS_AGENT_TEST_RESTART_TOKEN";
        std::env::set_var(var, "t0k");
        let yaml = format!(
            "api:\n  auth:\n    sms:\n      type: bearer\n      token_env: {}\n",
            var
        );
        let config = Arc::new(AgentConfiguration::from_yaml_str(&yaml, "test").unwrap());
        let agent = BicsAgent::new(config).with_transport(MockTransport::new());

        agent.start().unwrap();
        agent.stop();
        let before = agent.get_plugin("ConnectAPI").unwrap();

        std::env::remove_var(var);
        let err = agent.start().unwrap_err();
        assert!(matches!(err, AgentError::Registration { ref plugin, .. } if plugin == "SMSAPI"));
        assert!(!agent.is_running());

        let after = agent.get_plugin("ConnectAPI").unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(agent.all_plugins().len(), 8);
    }

    #[tokio::test]
    async fn test_invoke_dispatch() {
        let transport = MockTransport::new();
        transport.respond(200, r#"{"message_id":"m1"}"#);
        let agent = agent(transport.clone());

        let err = agent
            .invoke("SMSAPI", "get_sms_status", &json!({"message_id": "m1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::NotRunning));

        agent.start().unwrap();
        let body = agent
            .invoke("SMSAPI", "get_sms_status", &json!({"message_id": "m1"}))
            .await
            .unwrap();
        assert_eq!(body, r#"{"message_id":"m1"}"#);

        let err = agent
            .invoke("NonExistentAPI", "anything", &Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::UnknownPlugin(ref name) if name == "NonExistentAPI"));

        let err = agent
            .invoke("SMSAPI", "send_sms", &json!({"to": "+32"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Plugin(ref e) if e.is_validation()));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_telemetry_shared_with_plugins() {
        let transport = MockTransport::new();
        let telemetry = Arc::new(Telemetry::minimal());
        let agent = agent(transport).with_telemetry(telemetry.clone());
        agent.start().unwrap();

        agent
            .invoke("ConnectAPI", "get_customers", &Value::Null)
            .await
            .unwrap();
        assert_eq!(telemetry.stats().total_calls, 1);
        assert!(Arc::ptr_eq(agent.telemetry(), &telemetry));
    }
}
