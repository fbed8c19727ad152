/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub telegram_token: String,
    /// Public base URL the Telegram webhook is registered under.
    pub webhook_base_url: String,

    // HTTP server
    pub port: u16,
    pub admin_token: String,

    // Registry persistence
    pub subscribers_path: String,

    // Strategy catalog
    pub catalog_base_url: String,
    pub catalog_config_path: String,
    pub catalog_timeout_secs: u64,

    // Reasoning service
    pub reasoning_url: String,
    pub reasoning_api_key: String,
    pub reasoning_timeout_secs: u64,

    // Fan-out
    pub send_timeout_secs: u64,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        Config {
            telegram_token: required_env("TELEGRAM_TOKEN"),
            webhook_base_url: required_env("WEBHOOK_BASE_URL"),
            port: optional_env("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            admin_token: required_env("ADMIN_TOKEN"),
            subscribers_path: optional_env("SUBSCRIBERS_PATH")
                .unwrap_or_else(|| "subscribers.json".to_string()),
            catalog_base_url: required_env("CATALOG_BASE_URL"),
            catalog_config_path: optional_env("CATALOG_CONFIG_PATH")
                .unwrap_or_else(|| "config/catalog.toml".to_string()),
            catalog_timeout_secs: optional_env("CATALOG_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            reasoning_url: required_env("REASONING_URL"),
            reasoning_api_key: required_env("REASONING_API_KEY"),
            reasoning_timeout_secs: optional_env("REASONING_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            send_timeout_secs: optional_env("SEND_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
