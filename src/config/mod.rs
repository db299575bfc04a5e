//! Configuration module for the employee admin.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::directory::ReloadOrdering;
use crate::engine::{EngineSettings, PageBounds};
use crate::mutations::MutationSettings;

pub const DEFAULT_PAGE_SIZES: [usize; 3] = [5, 10, 25];
pub const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the record service (without the API prefix)
    pub api_base_url: String,
    /// Transport timeout for record service calls
    pub request_timeout: Duration,
    /// Page sizes the list view offers
    pub page_sizes: Vec<usize>,
    /// Initial page size, always one of `page_sizes`
    pub default_page_size: usize,
    /// How long a successful mutation stays in `Success` before returning to `Idle`
    pub success_delay: Duration,
    /// Path to the reference backend's SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the reference backend to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Rejected values that fell back to defaults, for logging once the
    /// subscriber is installed
    pub fallbacks: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: format!("http://{}", DEFAULT_BIND_ADDR),
            request_timeout: Duration::from_secs(30),
            page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
            default_page_size: DEFAULT_PAGE_SIZE,
            success_delay: Duration::from_millis(600),
            db_path: PathBuf::from("./data/employees.sqlite"),
            bind_addr: default_bind_addr(),
            log_level: "info".to_string(),
            fallbacks: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_base_url = env::var("EMS_API_BASE_URL").unwrap_or(defaults.api_base_url);

        let request_timeout = env::var("EMS_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let page_sizes = env::var("EMS_PAGE_SIZES")
            .ok()
            .map(|v| parse_page_sizes(&v))
            .filter(|sizes| !sizes.is_empty())
            .unwrap_or(defaults.page_sizes);

        let default_page_size = env::var("EMS_DEFAULT_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.default_page_size);
        let default_page_size = pick_default_page_size(&page_sizes, default_page_size);

        let success_delay = env::var("EMS_SUCCESS_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.success_delay);

        let db_path = env::var("EMS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let mut fallbacks = Vec::new();
        let bind_addr = match env::var("EMS_BIND_ADDR") {
            Ok(raw) => parse_bind_addr(&raw).unwrap_or_else(|notice| {
                fallbacks.push(notice);
                defaults.bind_addr
            }),
            Err(_) => defaults.bind_addr,
        };

        let log_level = env::var("EMS_LOG_LEVEL").unwrap_or(defaults.log_level);

        Self {
            api_base_url,
            request_timeout,
            page_sizes,
            default_page_size,
            success_delay,
            db_path,
            bind_addr,
            log_level,
            fallbacks,
        }
    }

    /// Settings for a list engine backing one view session.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            page_sizes: self.page_sizes.clone(),
            default_page_size: self.default_page_size,
            page_bounds: PageBounds::default(),
        }
    }

    pub fn mutation_settings(&self) -> MutationSettings {
        MutationSettings {
            success_delay: self.success_delay,
        }
    }

    pub fn reload_ordering(&self) -> ReloadOrdering {
        ReloadOrdering::default()
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr, String> {
    raw.parse()
        .map_err(|_| format!("Invalid EMS_BIND_ADDR {:?}, using {}", raw, DEFAULT_BIND_ADDR))
}

/// Parse a comma-separated list of page sizes, dropping zero and junk entries.
fn parse_page_sizes(raw: &str) -> Vec<usize> {
    let mut sizes: Vec<usize> = raw
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .filter(|size| *size > 0)
        .collect();
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

fn pick_default_page_size(sizes: &[usize], wanted: usize) -> usize {
    if sizes.contains(&wanted) {
        wanted
    } else {
        sizes.first().copied().unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        for key in [
            "EMS_API_BASE_URL",
            "EMS_REQUEST_TIMEOUT_SECS",
            "EMS_PAGE_SIZES",
            "EMS_DEFAULT_PAGE_SIZE",
            "EMS_SUCCESS_DELAY_MS",
            "EMS_DB_PATH",
            "EMS_BIND_ADDR",
            "EMS_LOG_LEVEL",
        ] {
            env::remove_var(key);
        }

        let config = Config::from_env();

        assert_eq!(config.api_base_url, "http://127.0.0.1:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.page_sizes, vec![5, 10, 25]);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.success_delay, Duration::from_millis(600));
        assert_eq!(config.db_path, PathBuf::from("./data/employees.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(config.fallbacks.is_empty());
    }

    #[test]
    fn test_invalid_bind_addr_is_reported() {
        assert_eq!(
            parse_bind_addr("0.0.0.0:9000").unwrap(),
            SocketAddr::from(([0, 0, 0, 0], 9000))
        );

        let notice = parse_bind_addr("localhost").unwrap_err();
        assert_eq!(notice, "Invalid EMS_BIND_ADDR \"localhost\", using 127.0.0.1:8080");
    }

    #[test]
    fn test_parse_page_sizes() {
        assert_eq!(parse_page_sizes("25, 5,10"), vec![5, 10, 25]);
        assert_eq!(parse_page_sizes("0,abc,50,50"), vec![50]);
        assert!(parse_page_sizes("").is_empty());
    }

    #[test]
    fn test_default_page_size_must_be_allowed() {
        assert_eq!(pick_default_page_size(&[5, 10, 25], 10), 10);
        assert_eq!(pick_default_page_size(&[20, 50], 10), 20);
        assert_eq!(pick_default_page_size(&[], 7), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_engine_settings_projection() {
        let config = Config::default();
        let settings = config.engine_settings();

        assert_eq!(settings.page_sizes, vec![5, 10, 25]);
        assert_eq!(settings.default_page_size, 10);
        assert_eq!(settings.page_bounds, PageBounds::Preserve);
    }
}
