use std::env;
use std::path::PathBuf;

/// Credentials for the data-source connectors. All optional — a missing key
/// degrades the matching tool to an instructional message instead of
/// disabling the agent.
#[derive(Debug, Clone, Default)]
pub struct SourcesConfig {
    pub adzuna_app_id: Option<String>,
    pub adzuna_app_key: Option<String>,
    pub google_maps_api_key: Option<String>,
}

impl SourcesConfig {
    pub fn from_env() -> Self {
        Self {
            adzuna_app_id: env::var("ADZUNA_APP_ID").ok(),
            adzuna_app_key: env::var("ADZUNA_APP_KEY").ok(),
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY").ok(),
        }
    }
}

/// Defaults for searches and monitor mode, overridable from the environment.
#[derive(Debug, Clone)]
pub struct SearchDefaults {
    pub keywords: String,
    pub location: String,
    pub industry: String,
    pub monitor_interval_minutes: u64,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            keywords: "software engineer".to_string(),
            location: String::new(),
            industry: "tech startup".to_string(),
            monitor_interval_minutes: 30,
        }
    }
}

impl SearchDefaults {
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            keywords: env::var("SEARCH_KEYWORDS").unwrap_or(base.keywords),
            location: env::var("SEARCH_LOCATION").unwrap_or(base.location),
            industry: env::var("SEARCH_INDUSTRY").unwrap_or(base.industry),
            monitor_interval_minutes: env::var("CHECK_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.monitor_interval_minutes),
        }
    }
}

/// Where saved jobs live: ~/.config/jobscout/saved_jobs.json, or the current
/// directory when no home is resolvable.
pub fn default_jobs_file() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("jobscout"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("saved_jobs.json")
}
