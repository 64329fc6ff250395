use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{IndicatorToggles, Timeframe};

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_base_url() -> String {
    "https://api.coingecko.com/api/v3".into()
}

fn default_vs_currency() -> String {
    "usd".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_coins() -> Vec<String> {
    ["BTC", "ETH", "SOL", "DOGE"].map(String::from).to_vec()
}

fn default_timeframe() -> Timeframe {
    Timeframe::Month1
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub market_data: MarketDataConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MarketDataConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            vs_currency: default_vs_currency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DashboardConfig {
    /// Symbols offered by the dashboard; the first one is the default selection.
    #[serde(default = "default_coins")]
    pub coins: Vec<String>,
    /// One of `"1D"`, `"1W"`, `"1M"`, `"6M"`, `"1Y"`.
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
    #[serde(default = "IndicatorToggles::all")]
    pub indicators: IndicatorToggles,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            coins: default_coins(),
            timeframe: default_timeframe(),
            indicators: IndicatorToggles::all(),
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

/// Load from `path` when given, otherwise use built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<AppConfig, Report<ConfigError>> {
    match path {
        Some(path) => load(path),
        None => {
            let config = AppConfig::default();
            validate(&config)?;
            Ok(config)
        }
    }
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(config)?;
    validate_market_data(config)?;
    validate_dashboard(config)?;
    Ok(())
}

fn validate_general(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if !VALID_LOG_FORMATS.contains(&config.general.log_format.as_str()) {
        return Err(Report::new(ConfigError::Validation {
            field: format!(
                "general.log_format \"{}\" is not one of {:?}",
                config.general.log_format, VALID_LOG_FORMATS
            ),
        }));
    }
    Ok(())
}

fn validate_market_data(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let market = &config.market_data;
    if !(market.base_url.starts_with("http://") || market.base_url.starts_with("https://")) {
        return Err(Report::new(ConfigError::Validation {
            field: format!("market_data.base_url \"{}\" is not an http(s) URL", market.base_url),
        }));
    }
    if market.vs_currency.trim().is_empty() {
        return Err(Report::new(ConfigError::Validation {
            field: "market_data.vs_currency must not be empty".into(),
        }));
    }
    if market.timeout_secs == 0 {
        return Err(Report::new(ConfigError::Validation {
            field: "market_data.timeout_secs must be > 0".into(),
        }));
    }
    Ok(())
}

fn validate_dashboard(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let dashboard = &config.dashboard;
    if dashboard.coins.is_empty() {
        return Err(Report::new(ConfigError::Validation {
            field: "dashboard.coins must list at least one symbol".into(),
        }));
    }
    if let Some(blank) = dashboard.coins.iter().position(|c| c.trim().is_empty()) {
        return Err(Report::new(ConfigError::Validation {
            field: format!("dashboard.coins[{blank}] is blank"),
        }));
    }
    Ok(())
}
