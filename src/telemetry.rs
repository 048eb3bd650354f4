//! Telemetry and logging infrastructure
//!
//! - Console logging (everything in verbose mode, warnings otherwise)
//! - JSON file logging, rotated daily
//! - In-process call counters per plugin

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

pub const LOG_FILE_PREFIX: &str = "bics_agent.log";

/// Default log directory: `<data_dir>/bics-agent/logs`
pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("bics-agent").join("logs"))
        .unwrap_or_else(|| PathBuf::from(".bics_agent_logs"))
}

#[derive(Debug, Default, Clone, Copy)]
struct Counter {
    calls: u64,
    failures: u64,
    total_ms: u64,
}

/// Per-plugin call statistics
#[derive(Debug, Clone, Serialize)]
pub struct CallStat {
    pub plugin: String,
    pub calls: u64,
    pub failures: u64,
    pub avg_duration_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub total_calls: u64,
    pub failed_calls: u64,
}

impl std::fmt::Display for SessionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Session {} | Started: {} | Calls: {} | Failed: {}",
            self.session_id,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.total_calls,
            self.failed_calls
        )
    }
}

/// Main telemetry handler
pub struct Telemetry {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    counters: Mutex<HashMap<String, Counter>>,
    log_dir: Option<PathBuf>,
    _file_guard: Option<WorkerGuard>,
}

impl Telemetry {
    /// Install the global tracing subscriber and return the handle.
    ///
    /// The returned value owns the file writer guard; keep it alive until exit.
    pub fn init(log_dir: &Path, verbose: bool) -> anyhow::Result<Self> {
        std::fs::create_dir_all(log_dir)?;

        let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if verbose {
                EnvFilter::new("debug,hyper=info,reqwest=info,h2=info,rustls=info")
            } else {
                EnvFilter::new("info,hyper=warn,reqwest=warn,h2=warn,rustls=warn")
            }
        });

        if verbose {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(false).compact())
                .with(fmt::layer().json().with_writer(non_blocking))
                .try_init()
                .ok();
        } else {
            // Warnings and errors still reach the console
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .compact()
                        .with_writer(std::io::stderr.with_max_level(tracing::Level::WARN)),
                )
                .with(fmt::layer().json().with_writer(non_blocking))
                .try_init()
                .ok();
        }

        let telemetry = Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            counters: Mutex::new(HashMap::new()),
            log_dir: Some(log_dir.to_path_buf()),
            _file_guard: Some(file_guard),
        };

        tracing::info!(
            session_id = %telemetry.session_id,
            log_dir = %log_dir.display(),
            "Telemetry initialized"
        );

        Ok(telemetry)
    }

    /// Handle without a subscriber (library use, tests)
    pub fn minimal() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            counters: Mutex::new(HashMap::new()),
            log_dir: None,
            _file_guard: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }

    /// Record one HTTP round trip
    pub fn record_call(&self, plugin: &str, operation: &str, duration_ms: u64, success: bool) {
        {
            let mut counters = self.counters.lock();
            let counter = counters.entry(plugin.to_string()).or_default();
            counter.calls += 1;
            counter.total_ms += duration_ms;
            if !success {
                counter.failures += 1;
            }
        }

        tracing::info!(
            plugin = plugin,
            operation = operation,
            duration_ms = duration_ms,
            success = success,
            "API call"
        );
    }

    pub fn stats(&self) -> SessionStats {
        let counters = self.counters.lock();
        SessionStats {
            session_id: self.session_id,
            started_at: self.started_at,
            total_calls: counters.values().map(|c| c.calls).sum(),
            failed_calls: counters.values().map(|c| c.failures).sum(),
        }
    }

    /// Per-plugin statistics, sorted by plugin name
    pub fn call_stats(&self) -> Vec<CallStat> {
        let counters = self.counters.lock();
        let mut stats: Vec<CallStat> = counters
            .iter()
            .map(|(plugin, c)| CallStat {
                plugin: plugin.clone(),
                calls: c.calls,
                failures: c.failures,
                avg_duration_ms: if c.calls > 0 {
                    c.total_ms as f64 / c.calls as f64
                } else {
                    0.0
                },
            })
            .collect();
        stats.sort_by(|a, b| a.plugin.cmp(&b.plugin));
        stats
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::minimal()
    }
}
