//! Typed, environment-driven configuration.
//!
//! The teacher workspace never reaches for a layered-file config crate; every
//! service reads a flat set of environment variables into a typed struct with
//! sane defaults. VulnSentinel follows the same convention.

use std::time::Duration;

/// Read an env var into `T`, falling back to `default` when unset or
/// unparseable.
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Per-engine scheduler intervals, all environment-configurable.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub scan_interval: Duration,
    pub collect_interval: Duration,
    pub classify_interval: Duration,
    pub analyze_interval: Duration,
    pub impact_interval: Duration,
    pub reachability_interval: Duration,
    pub notify_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(env_or("VULNSENTINEL_SCAN_INTERVAL", 3600)),
            collect_interval: Duration::from_secs(env_or("VULNSENTINEL_COLLECT_INTERVAL", 600)),
            classify_interval: Duration::from_secs(env_or("VULNSENTINEL_CLASSIFY_INTERVAL", 60)),
            analyze_interval: Duration::from_secs(env_or("VULNSENTINEL_ANALYZE_INTERVAL", 60)),
            impact_interval: Duration::from_secs(env_or("VULNSENTINEL_IMPACT_INTERVAL", 60)),
            reachability_interval: Duration::from_secs(env_or(
                "VULNSENTINEL_REACHABILITY_INTERVAL",
                120,
            )),
            notify_interval: Duration::from_secs(env_or("VULNSENTINEL_NOTIFY_INTERVAL", 60)),
        }
    }
}

/// Bounded concurrency per engine, per spec.md §5.
#[derive(Debug, Clone)]
pub struct ConcurrencyConfig {
    pub classifier_permits: usize,
    pub analyzer_permits: usize,
    pub collector_permits: usize,
    pub reachability_permits: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            classifier_permits: env_or("VULNSENTINEL_CLASSIFIER_CONCURRENCY", 3),
            analyzer_permits: env_or("VULNSENTINEL_ANALYZER_CONCURRENCY", 3),
            collector_permits: env_or("VULNSENTINEL_COLLECTOR_CONCURRENCY", 5),
            reachability_permits: env_or("VULNSENTINEL_REACHABILITY_CONCURRENCY", 3),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub github_token: Option<String>,
    pub cursor_secret: String,
    pub scheduler: SchedulerConfig,
    pub concurrency: ConcurrencyConfig,
    /// Window after which a library is considered due for an Event Collector
    /// pass (spec.md §4.3: 75 minutes).
    pub collector_activity_window: Duration,
    /// Window after which a project is due for a Dependency Scanner pass
    /// (spec.md §4.2: 1 hour).
    pub scanner_freshness_window: Duration,
    pub health_port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if `DATABASE_URL` or `VULNSENTINEL_CURSOR_SECRET` are
    /// unset - both are required for the process to start safely (an
    /// unsigned or default cursor secret would let clients forge pagination
    /// cursors).
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let cursor_secret = std::env::var("VULNSENTINEL_CURSOR_SECRET")
            .map_err(|_| anyhow::anyhow!("VULNSENTINEL_CURSOR_SECRET must be set"))?;

        Ok(Self {
            database_url,
            github_token: std::env::var("GITHUB_TOKEN").ok(),
            cursor_secret,
            scheduler: SchedulerConfig::default(),
            concurrency: ConcurrencyConfig::default(),
            collector_activity_window: Duration::from_secs(env_or(
                "VULNSENTINEL_COLLECTOR_WINDOW_SECS",
                75 * 60,
            )),
            scanner_freshness_window: Duration::from_secs(env_or(
                "VULNSENTINEL_SCANNER_WINDOW_SECS",
                3600,
            )),
            health_port: env_or("VULNSENTINEL_HEALTH_PORT", 8080),
        })
    }

    /// Build a config suitable for tests - no environment required.
    #[must_use]
    pub fn for_tests(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            github_token: None,
            cursor_secret: "test-secret-test-secret-1234".to_string(),
            scheduler: SchedulerConfig::default(),
            concurrency: ConcurrencyConfig::default(),
            collector_activity_window: Duration::from_secs(75 * 60),
            scanner_freshness_window: Duration::from_secs(3600),
            health_port: 0,
        }
    }
}

/// Resolve the named environment variable holding an API key for the given
/// model-id prefix, per spec.md §6.
#[must_use]
pub fn api_key_env_var_for_model(model: &str) -> &'static str {
    if model.starts_with("claude") {
        "ANTHROPIC_API_KEY"
    } else if model.starts_with("deepseek") {
        "DEEPSEEK_API_KEY"
    } else if model.starts_with("gpt") || model.starts_with("o1") || model.starts_with("o3") {
        "OPENAI_API_KEY"
    } else if model.starts_with("gemini") {
        "GEMINI_API_KEY"
    } else if model.starts_with("grok") {
        "XAI_API_KEY"
    } else {
        "ANTHROPIC_API_KEY"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_prefix_resolves_to_expected_env_var() {
        assert_eq!(api_key_env_var_for_model("claude-3-5-sonnet"), "ANTHROPIC_API_KEY");
        assert_eq!(
            api_key_env_var_for_model("deepseek/deepseek-chat"),
            "DEEPSEEK_API_KEY"
        );
        assert_eq!(api_key_env_var_for_model("gpt-4o"), "OPENAI_API_KEY");
        assert_eq!(api_key_env_var_for_model("o3-mini"), "OPENAI_API_KEY");
        assert_eq!(api_key_env_var_for_model("gemini-1.5-pro"), "GEMINI_API_KEY");
        assert_eq!(api_key_env_var_for_model("grok-2"), "XAI_API_KEY");
    }

    #[test]
    fn defaults_match_spec_intervals() {
        // Isolated from real env by construction - for_tests never reads env.
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.scan_interval, Duration::from_secs(3600));
        assert_eq!(cfg.collect_interval, Duration::from_secs(600));
        assert_eq!(cfg.reachability_interval, Duration::from_secs(120));
    }
}
