use anyhow::Result;
use std::env;
use tracing_subscriber::EnvFilter;

/// Tunables for the compliance engine. All values have production
/// defaults and can be overridden from the environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// TTL for cached load-management results, seconds.
    pub load_cache_ttl_secs: u64,
    /// TTL for cached adherence metrics, seconds.
    pub adherence_cache_ttl_secs: u64,
    /// Rolling retention window for load trends, days.
    pub trend_retention_days: i64,
    /// Rolling retention window for adherence entries, days.
    pub adherence_retention_days: i64,
    /// Allowed |actual - planned| load delta still counted as compliant.
    pub compliance_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            load_cache_ttl_secs: 300,
            adherence_cache_ttl_secs: 60,
            trend_retention_days: 30,
            adherence_retention_days: 90,
            compliance_tolerance: 10.0,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let load_cache_ttl_secs = env::var("MED_LOAD_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.load_cache_ttl_secs);
        let adherence_cache_ttl_secs = env::var("MED_ADHERENCE_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.adherence_cache_ttl_secs);
        let trend_retention_days = env::var("MED_TREND_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.trend_retention_days);
        let adherence_retention_days = env::var("MED_ADHERENCE_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.adherence_retention_days);
        let compliance_tolerance = env::var("MED_COMPLIANCE_TOLERANCE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.compliance_tolerance);

        Ok(Self {
            load_cache_ttl_secs,
            adherence_cache_ttl_secs,
            trend_retention_days,
            adherence_retention_days,
            compliance_tolerance,
        })
    }
}

/// Initialize tracing for binaries and integration tests. Respects
/// RUST_LOG; defaults to info for this crate.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("med_compliance=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.load_cache_ttl_secs, 300);
        assert_eq!(config.adherence_cache_ttl_secs, 60);
        assert_eq!(config.trend_retention_days, 30);
        assert_eq!(config.adherence_retention_days, 90);
        assert_eq!(config.compliance_tolerance, 10.0);
    }
}
