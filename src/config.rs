pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/predict";
pub const DEFAULT_MAX_SAVED_CHATS: usize = 3;
pub const DEFAULT_STORAGE_KEY: &str = "vulnscan.chats";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    pub endpoint: String,
    pub max_saved_chats: usize,
    pub storage_key: String,
    pub log_level: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_saved_chats: DEFAULT_MAX_SAVED_CHATS,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ScanConfig {
    /// The browser has no process environment, so values are baked in at build time.
    pub fn from_env() -> Self {
        Self::from_vars(
            option_env!("PREDICT_ENDPOINT"),
            option_env!("MAX_SAVED_CHATS"),
            option_env!("CHAT_STORAGE_KEY"),
            option_env!("LOG_LEVEL"),
        )
    }

    fn from_vars(
        endpoint: Option<&str>,
        max_saved_chats: Option<&str>,
        storage_key: Option<&str>,
        log_level: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            endpoint: non_empty(endpoint).unwrap_or(defaults.endpoint),
            max_saved_chats: max_saved_chats
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_saved_chats),
            storage_key: non_empty(storage_key).unwrap_or(defaults.storage_key),
            log_level: non_empty(log_level).unwrap_or(defaults.log_level),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
