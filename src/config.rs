//! Configuration for the BICS agent
//!
//! The document is YAML. Base URLs live under `api.endpoints`, optional
//! credentials under `api.auth`. A copy is bundled into the binary so the agent
//! always has a usable configuration; an explicit file replaces it entirely.
//!
//! Lookup order for [`AgentConfiguration::load`]:
//! 1. Explicit path (CLI `--config`)
//! 2. `BICS_AGENT_CONFIG` environment variable
//! 3. `./application.yml`
//! 4. `<config_dir>/bics-agent/application.yml`
//! 5. Bundled `resources/application.yml`

use crate::auth::{AuthEntry, AuthStrategy, NoAuth};
use crate::error::ConfigurationError;
use parking_lot::Mutex;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "application.yml";
pub const CONFIG_PATH_ENV: &str = "BICS_AGENT_CONFIG";

const BUNDLED_CONFIG: &str = include_str!("../resources/application.yml");
const BUNDLED_ORIGIN: &str = "bundled application.yml";

static GLOBAL: OnceLock<Arc<AgentConfiguration>> = OnceLock::new();
static GLOBAL_INIT: Mutex<()> = parking_lot::const_mutex(());

/// The eight BICS API families, one per plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKind {
    Connect,
    MyNumbers,
    MyNumbersAddressManagement,
    MyNumbersCdr,
    MyNumbersDisconnection,
    MyNumbersEmergencyServices,
    MyNumbersNumberPorting,
    Sms,
}

impl ApiKind {
    pub const ALL: [ApiKind; 8] = [
        ApiKind::Connect,
        ApiKind::MyNumbers,
        ApiKind::MyNumbersAddressManagement,
        ApiKind::MyNumbersCdr,
        ApiKind::MyNumbersDisconnection,
        ApiKind::MyNumbersEmergencyServices,
        ApiKind::MyNumbersNumberPorting,
        ApiKind::Sms,
    ];

    /// Key under `api.endpoints` (and `api.auth`)
    pub fn config_key(&self) -> &'static str {
        match self {
            ApiKind::Connect => "connect",
            ApiKind::MyNumbers => "mynumbers",
            ApiKind::MyNumbersAddressManagement => "mynumbers-address",
            ApiKind::MyNumbersCdr => "mynumbers-cdr",
            ApiKind::MyNumbersDisconnection => "mynumbers-disconnection",
            ApiKind::MyNumbersEmergencyServices => "mynumbers-emergency",
            ApiKind::MyNumbersNumberPorting => "mynumbers-porting",
            ApiKind::Sms => "sms",
        }
    }

    pub fn default_url(&self) -> &'static str {
        match self {
            ApiKind::Connect => "https://connect.api.bics.com",
            ApiKind::MyNumbers => "https://mynumbers.api.bics.com",
            ApiKind::MyNumbersAddressManagement => "https://mynumbers-address.api.bics.com",
            ApiKind::MyNumbersCdr => "https://mynumbers-cdr.api.bics.com",
            ApiKind::MyNumbersDisconnection => "https://mynumbers-disconnection.api.bics.com",
            ApiKind::MyNumbersEmergencyServices => "https://mynumbers-emergency.api.bics.com",
            ApiKind::MyNumbersNumberPorting => "https://mynumbers-porting.api.bics.com",
            ApiKind::Sms => "https://sms.api.bics.com",
        }
    }

    /// Registry name, also used for error attribution
    pub fn plugin_name(&self) -> &'static str {
        match self {
            ApiKind::Connect => "ConnectAPI",
            ApiKind::MyNumbers => "MyNumbersAPI",
            ApiKind::MyNumbersAddressManagement => "MyNumbersAddressManagementAPI",
            ApiKind::MyNumbersCdr => "MyNumbersCDRAPI",
            ApiKind::MyNumbersDisconnection => "MyNumbersDisconnectionAPI",
            ApiKind::MyNumbersEmergencyServices => "MyNumbersEmergencyServicesAPI",
            ApiKind::MyNumbersNumberPorting => "MyNumbersNumberPortingAPI",
            ApiKind::Sms => "SMSAPI",
        }
    }
}

/// Base URLs for every API family
#[derive(Debug, Clone, Default)]
pub struct ApiEndpoints {
    endpoints: HashMap<String, String>,
}

impl ApiEndpoints {
    pub fn new(endpoints: HashMap<String, String>) -> Self {
        Self { endpoints }
    }

    /// Configured URL, or the built-in default when the key is absent
    pub fn url_for(&self, kind: ApiKind) -> &str {
        self.endpoints
            .get(kind.config_key())
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_url())
    }

    pub fn connect_url(&self) -> &str {
        self.url_for(ApiKind::Connect)
    }

    pub fn my_numbers_url(&self) -> &str {
        self.url_for(ApiKind::MyNumbers)
    }

    pub fn my_numbers_address_management_url(&self) -> &str {
        self.url_for(ApiKind::MyNumbersAddressManagement)
    }

    pub fn my_numbers_cdr_url(&self) -> &str {
        self.url_for(ApiKind::MyNumbersCdr)
    }

    pub fn my_numbers_disconnection_url(&self) -> &str {
        self.url_for(ApiKind::MyNumbersDisconnection)
    }

    pub fn my_numbers_emergency_services_url(&self) -> &str {
        self.url_for(ApiKind::MyNumbersEmergencyServices)
    }

    pub fn my_numbers_number_porting_url(&self) -> &str {
        self.url_for(ApiKind::MyNumbersNumberPorting)
    }

    pub fn sms_url(&self) -> &str {
        self.url_for(ApiKind::Sms)
    }
}

/// Immutable configuration document
#[derive(Debug, Clone)]
pub struct AgentConfiguration {
    origin: String,
    document: Mapping,
    endpoints: ApiEndpoints,
    auth: HashMap<String, AuthEntry>,
}

impl AgentConfiguration {
    /// Process-wide configuration built from the bundled resource.
    ///
    /// Initialized at most once; every call returns the same instance.
    pub fn global() -> Result<Arc<Self>, ConfigurationError> {
        if let Some(config) = GLOBAL.get() {
            return Ok(config.clone());
        }

        let _guard = GLOBAL_INIT.lock();
        if let Some(config) = GLOBAL.get() {
            return Ok(config.clone());
        }

        let config = Arc::new(Self::bundled()?);
        Ok(GLOBAL.get_or_init(|| config).clone())
    }

    /// Load using the standard lookup order
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigurationError> {
        match Self::config_path(explicit) {
            Some(path) => Self::load_from(&path),
            None => Self::bundled(),
        }
    }

    /// Load from a specific file. A missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigurationError> {
        info!("Loading configuration from {}", path.display());

        if !path.exists() {
            return Err(ConfigurationError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&content, &path.display().to_string())
    }

    /// The configuration compiled into the binary
    pub fn bundled() -> Result<Self, ConfigurationError> {
        debug!("Loading {}", BUNDLED_ORIGIN);
        Self::from_yaml_str(BUNDLED_CONFIG, BUNDLED_ORIGIN)
    }

    /// Parse a YAML document. `origin` is only used in messages.
    pub fn from_yaml_str(content: &str, origin: &str) -> Result<Self, ConfigurationError> {
        let parse_err = |source: serde_yaml::Error| ConfigurationError::Parse {
            origin: origin.to_string(),
            source,
        };

        let value: Value = serde_yaml::from_str(content).map_err(parse_err)?;
        let document = match value {
            Value::Null => Mapping::new(),
            Value::Mapping(m) => m,
            other => serde_yaml::from_value::<Mapping>(other).map_err(parse_err)?,
        };

        let endpoints = match lookup(&document, "api.endpoints").and_then(Value::as_mapping) {
            Some(mapping) => {
                debug!("API endpoints initialized");
                ApiEndpoints::new(string_entries(mapping))
            }
            None => {
                warn!("No API endpoints configuration found in {}", origin);
                ApiEndpoints::default()
            }
        };

        let auth = match lookup(&document, "api.auth").filter(|v| !v.is_null()) {
            Some(value) => serde_yaml::from_value(value.clone()).map_err(parse_err)?,
            None => HashMap::new(),
        };

        info!("Configuration loaded successfully from {}", origin);
        Ok(Self {
            origin: origin.to_string(),
            document,
            endpoints,
            auth,
        })
    }

    /// Resolve which file to load, if any
    pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|d| d.join("bics-agent").join(DEFAULT_CONFIG_FILE))
            .filter(|p| p.is_file())
    }

    /// Look up a value by key.
    ///
    /// A literal top-level key wins; otherwise dots walk nested mappings
    /// (`api.endpoints.sms`).
    pub fn get(&self, key: &str) -> Option<&Value> {
        lookup(&self.document, key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_str(key).unwrap_or(default)
    }

    pub fn api_endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    pub fn base_url(&self, kind: ApiKind) -> &str {
        self.endpoints.url_for(kind)
    }

    pub fn auth_entry(&self, kind: ApiKind) -> Option<&AuthEntry> {
        self.auth.get(kind.config_key())
    }

    /// Auth strategy for an API family; `NoAuth` when none is configured
    pub fn auth_strategy(&self, kind: ApiKind) -> Result<Arc<dyn AuthStrategy>, ConfigurationError> {
        match self.auth_entry(kind) {
            Some(entry) => entry.resolve(kind.config_key()),
            None => Ok(Arc::new(NoAuth)),
        }
    }

    /// Where this configuration came from
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

fn lookup<'a>(document: &'a Mapping, key: &str) -> Option<&'a Value> {
    if let Some(value) = document.get(key) {
        return Some(value);
    }

    let mut parts = key.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = current.as_mapping()?.get(part)?;
    }
    Some(current)
}

fn string_entries(mapping: &Mapping) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    for (key, value) in mapping {
        match (key.as_str(), value.as_str()) {
            (Some(k), Some(v)) => {
                entries.insert(k.to_string(), v.to_string());
            }
            (Some(k), None) => warn!("Ignoring non-string endpoint value for '{}'", k),
            _ => warn!("Ignoring endpoint entry with non-string key"),
        }
    }
    entries
}
