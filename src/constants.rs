use std::time::Duration;

/// User agent string for HTTP requests
pub const USER_AGENT: &str = "heatshield-mcp/0.1.0";

/// Advisory backend base URL used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Weather lookup endpoint, relative to the backend base URL
pub const WEATHER_PATH: &str = "/api/weather";

/// Risk prediction endpoint, relative to the backend base URL
pub const PREDICT_PATH: &str = "/api/predict";

/// Liveness endpoint, relative to the backend base URL
pub const HEALTH_PATH: &str = "/api/health";

/// File name of the persisted history slot
pub const HISTORY_FILE_NAME: &str = "heatshield_history.json";

/// Default config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "heatshield.toml";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Pacing delay of the heat index stage
pub const HEAT_INDEX_PACING: Duration = Duration::from_millis(900);

/// Pacing delay of the physiological stress stage
pub const STRESS_PACING: Duration = Duration::from_millis(800);

/// Accepted exposure window, in whole hours
pub const MIN_EXPOSURE_HOURS: u8 = 1;
pub const MAX_EXPOSURE_HOURS: u8 = 12;

/// Minimum trimmed length of a free-text city
pub const MIN_CITY_LEN: usize = 2;
