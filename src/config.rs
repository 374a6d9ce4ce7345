// region:    --- Config

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub mail_gateway_url: String,
    pub mail_from: String,
    pub closer_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            mail_gateway_url: std::env::var("MAIL_GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:8025/api/send".to_string()),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "auctions@example.com".to_string()),
            closer_interval_secs: std::env::var("CLOSER_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}

// endregion: --- Config
