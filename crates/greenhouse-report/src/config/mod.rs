use chrono_tz::Tz;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_BASE_URL: &str = "https://harvest.greenhouse.io/v1";
pub const DEFAULT_PROFILE_URL_BASE: &str = "https://app2.greenhouse.io/people";
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub harvest: HarvestConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            harvest: HarvestConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Upstream Harvest API access and report shaping.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub base_url: String,
    pub per_page: u32,
    /// Activity window for applications, candidates, interviews and scorecards.
    pub lookback_months: u32,
    pub job_lookback_months: u32,
    /// When set, only the trailing pages of each endpoint are walked.
    pub history_pages: Option<u32>,
    pub timezone: Tz,
    pub profile_url_base: String,
    /// Only consulted by the command line; the web form always asks for the key.
    pub api_key: Option<String>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            per_page: 500,
            lookback_months: 3,
            job_lookback_months: 12,
            history_pages: None,
            timezone: chrono_tz::America::Chicago,
            profile_url_base: DEFAULT_PROFILE_URL_BASE.to_string(),
            api_key: None,
        }
    }
}

impl HarvestConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_url = env::var("HARVEST_BASE_URL")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let per_page = parse_u32_var("HARVEST_PER_PAGE")?.unwrap_or(defaults.per_page);
        if per_page == 0 {
            return Err(ConfigError::InvalidNumber {
                name: "HARVEST_PER_PAGE",
            });
        }
        let lookback_months =
            parse_u32_var("HARVEST_LOOKBACK_MONTHS")?.unwrap_or(defaults.lookback_months);
        let job_lookback_months =
            parse_u32_var("HARVEST_JOB_LOOKBACK_MONTHS")?.unwrap_or(defaults.job_lookback_months);
        let history_pages = parse_u32_var("HARVEST_HISTORY_PAGES")?.filter(|pages| *pages > 0);

        let timezone = match env::var("HARVEST_TIMEZONE") {
            Ok(value) => value
                .trim()
                .parse::<Tz>()
                .map_err(|_| ConfigError::InvalidTimezone { value })?,
            Err(_) => defaults.timezone,
        };

        let profile_url_base = env::var("HARVEST_PROFILE_URL_BASE")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or(defaults.profile_url_base);
        let api_key = env::var("HARVEST_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            base_url,
            per_page,
            lookback_months,
            job_lookback_months,
            history_pages,
            timezone,
            profile_url_base,
            api_key,
        })
    }
}

fn parse_u32_var(name: &'static str) -> Result<Option<u32>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name }),
        Err(_) => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str },
    InvalidTimezone { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{name} must be a positive integer")
            }
            ConfigError::InvalidTimezone { value } => {
                write!(f, "HARVEST_TIMEZONE '{value}' is not a known IANA time zone")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidTimezone { .. } => None,
        }
    }
}
