pub mod domain;
pub mod error;
pub mod history;
pub mod hud;
pub mod underwriting;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_HUD_API_BASE_URL: &str = "https://www.huduser.gov/hudapi/public";
    pub const DEFAULT_HUD_TIMEOUT_SECS: u64 = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub hud_token: Option<String>,
        pub hud_api_base_url: String,
        pub hud_timeout_secs: u64,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                hud_token: std::env::var("HUDUSER_TOKEN")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                hud_api_base_url: std::env::var("HUD_API_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_HUD_API_BASE_URL.to_string()),
                hud_timeout_secs: std::env::var("HUD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_HUD_TIMEOUT_SECS),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_hud_token(&self) -> anyhow::Result<&str> {
            self.hud_token
                .as_deref()
                .context("HUDUSER_TOKEN is required")
        }
    }
}
