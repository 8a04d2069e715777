//! Server settings, validated from configuration before startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::error::InvestiqError;
use crate::domain::evaluator::DEFAULT_PERIOD;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";
pub const DEFAULT_ALLOW_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
pub const DEFAULT_STOCK_RANGE: &str = "1mo";
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    Csv,
}

/// Cross-origin policy handed to the router. One origin is allowed; methods
/// and headers are mirrored from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsSettings {
    pub allowed_origin: String,
    pub allow_credentials: bool,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origin: DEFAULT_ALLOW_ORIGIN.to_string(),
            allow_credentials: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub chart_url: String,
    pub search_url: String,
    pub csv_dir: Option<PathBuf>,
    pub history_period: String,
    pub stock_range: String,
    pub search_limit: usize,
    /// `None` leaves provider calls unbounded.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub listen: SocketAddr,
    pub cors: CorsSettings,
    pub provider: ProviderSettings,
}

pub fn load_server_settings(config: &dyn ConfigPort) -> Result<ServerSettings, InvestiqError> {
    Ok(ServerSettings {
        listen: load_listen(config)?,
        cors: load_cors_settings(config)?,
        provider: load_provider_settings(config)?,
    })
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> InvestiqError {
    InvestiqError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn load_listen(config: &dyn ConfigPort) -> Result<SocketAddr, InvestiqError> {
    let listen = non_empty(config, "web", "listen").unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    listen
        .parse()
        .map_err(|_| invalid("web", "listen", format!("'{}' is not a socket address", listen)))
}

pub fn load_cors_settings(config: &dyn ConfigPort) -> Result<CorsSettings, InvestiqError> {
    let defaults = CorsSettings::default();
    let allowed_origin =
        non_empty(config, "cors", "allow_origin").unwrap_or(defaults.allowed_origin);
    validate_origin(&allowed_origin)?;
    Ok(CorsSettings {
        allowed_origin,
        allow_credentials: config.get_bool("cors", "allow_credentials", defaults.allow_credentials),
    })
}

fn validate_origin(origin: &str) -> Result<(), InvestiqError> {
    let host = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"));
    match host {
        Some(host)
            if !host.is_empty()
                && !host.contains('/')
                && host.chars().all(|c| c.is_ascii_graphic()) =>
        {
            Ok(())
        }
        _ => Err(invalid(
            "cors",
            "allow_origin",
            format!("'{}' must be scheme://host[:port]", origin),
        )),
    }
}

pub fn load_provider_settings(config: &dyn ConfigPort) -> Result<ProviderSettings, InvestiqError> {
    let kind = match non_empty(config, "provider", "kind")
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        None | Some("yahoo") => ProviderKind::Yahoo,
        Some("csv") => ProviderKind::Csv,
        Some(other) => {
            return Err(invalid(
                "provider",
                "kind",
                format!("unknown provider '{}', expected yahoo or csv", other),
            ));
        }
    };

    let csv_dir = non_empty(config, "provider", "csv_dir").map(PathBuf::from);
    if kind == ProviderKind::Csv && csv_dir.is_none() {
        return Err(InvestiqError::ConfigMissing {
            section: "provider".to_string(),
            key: "csv_dir".to_string(),
        });
    }

    let search_limit = config.get_int("provider", "search_limit", DEFAULT_SEARCH_LIMIT);
    if search_limit <= 0 {
        return Err(invalid("provider", "search_limit", "search_limit must be positive"));
    }

    let timeout_secs = config.get_int("provider", "timeout_secs", 0);
    if timeout_secs < 0 {
        return Err(invalid(
            "provider",
            "timeout_secs",
            "timeout_secs must be non-negative",
        ));
    }

    Ok(ProviderSettings {
        kind,
        chart_url: non_empty(config, "provider", "chart_url")
            .unwrap_or_else(|| DEFAULT_CHART_URL.to_string()),
        search_url: non_empty(config, "provider", "search_url")
            .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
        csv_dir,
        history_period: non_empty(config, "provider", "history_period")
            .unwrap_or_else(|| DEFAULT_PERIOD.to_string()),
        stock_range: non_empty(config, "provider", "stock_range")
            .unwrap_or_else(|| DEFAULT_STOCK_RANGE.to_string()),
        search_limit: search_limit as usize,
        timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs as u64)),
    })
}
