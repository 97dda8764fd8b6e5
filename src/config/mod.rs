//! Configuration module for the magazine front end.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_COMMENTS_PAGE_SIZE: u32 = 10;
const DEFAULT_TESTIMONIALS_PREVIEW: usize = 3;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the external REST API
    pub api_base_url: String,
    /// Bearer token forwarded to the external API, if any
    pub api_token: Option<String>,
    /// Pre-shared key guarding the admin routes
    pub admin_psk: Option<String>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Comments shown per page in a discussion
    pub comments_page_size: u32,
    /// Testimonials shown before "show all"
    pub testimonials_preview: usize,
    /// Upstream request timeout; unset means no timeout
    pub http_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("ZINE_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let api_token = env::var("ZINE_API_TOKEN").ok().filter(|t| !t.is_empty());
        let admin_psk = env::var("ZINE_ADMIN_PSK").ok().filter(|k| !k.is_empty());

        let bind_addr = parse_or("ZINE_BIND_ADDR", || {
            DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 3000)))
        });

        let log_level = env::var("ZINE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let comments_page_size =
            parse_or("ZINE_COMMENTS_PAGE_SIZE", || DEFAULT_COMMENTS_PAGE_SIZE).max(1);

        let testimonials_preview =
            parse_or("ZINE_TESTIMONIALS_PREVIEW", || DEFAULT_TESTIMONIALS_PREVIEW);

        let http_timeout = env::var("ZINE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);

        Self {
            api_base_url,
            api_token,
            admin_psk,
            bind_addr,
            log_level,
            comments_page_size,
            testimonials_preview,
            http_timeout,
        }
    }
}

/// Parse an environment variable, falling back to a default on absence or bad input.
fn parse_or<T: FromStr>(name: &str, default: impl FnOnce() -> T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring malformed {}={:?}, using default", name, raw);
                default()
            }
        },
        Err(_) => default(),
    }
}
