use crate::error::{RelayError, Result};
use crate::models::ContentCatalog;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiServerConfig,
    /// Relay retrieval configuration
    pub relay: RelayConfig,
    /// Browser configuration
    pub browser: BrowserConfig,
    /// Content-type token to target URL table
    pub catalog: ContentCatalog,
    /// HTTP Basic auth configuration
    pub auth: AuthConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port for the API server (default: 5000)
    pub port: u16,
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
}

/// Options handed to the retrieval orchestrator
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Proxy site entry page
    pub entry_url: String,
    /// Substring that proves a page is the wanted content
    pub reference_marker: String,
    /// Navigation cycles per retrieval call (default: 5)
    pub max_rounds: u32,
    /// Fixed wait after submitting a relay request (default: 10s)
    pub settle_delay: Duration,
    /// Blacklist backing file
    pub blacklist_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver or Selenium)
    pub webdriver_url: String,
    /// Run Chrome headless
    pub headless: bool,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Require HTTP Basic auth on API routes
    pub enabled: bool,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let entry_url = get_env_or("RELAY_ENTRY_URL", "https://proxyium.com");
        Url::parse(&entry_url).map_err(|e| {
            RelayError::InvalidConfig(format!("RELAY_ENTRY_URL must be a valid URL: {}", e))
        })?;

        let auth = AuthConfig {
            enabled: parse_env("AUTH_ENABLED", false)?,
            username: get_env_or("AUTH_USERNAME", ""),
            password: get_env_or("AUTH_PASSWORD", ""),
        };
        if auth.enabled && auth.username.is_empty() {
            return Err(RelayError::MissingEnvVar("AUTH_USERNAME".into()));
        }

        Ok(Config {
            api: ApiServerConfig {
                port: parse_env("API_PORT", 5000)?,
                host: get_env_or("API_HOST", "0.0.0.0"),
            },
            relay: RelayConfig {
                entry_url,
                reference_marker: get_env_or("RELAY_REFERENCE_MARKER", ""),
                max_rounds: parse_env("RELAY_MAX_ROUNDS", 5)?,
                settle_delay: Duration::from_secs(parse_env("RELAY_SETTLE_DELAY_SECS", 10)?),
                blacklist_path: PathBuf::from(get_env_or(
                    "RELAY_BLACKLIST_PATH",
                    "bad_servers.json",
                )),
            },
            browser: BrowserConfig {
                webdriver_url: get_env_or("WEBDRIVER_URL", "http://127.0.0.1:9515"),
                headless: parse_env("BROWSER_HEADLESS", true)?,
            },
            catalog: ContentCatalog::parse(&get_env_or(
                "CONTENT_MAP",
                "placeholder=https://example.com",
            ))?,
            auth,
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: get_env_or("LOG_FORMAT", "pretty"),
            },
        })
    }

    /// Get the API server address
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            RelayError::InvalidConfig(format!("{} has an invalid value: {}", key, raw))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const CONFIG_ENV_KEYS: &[&str] = &[
        "API_PORT",
        "API_HOST",
        "RELAY_ENTRY_URL",
        "RELAY_REFERENCE_MARKER",
        "RELAY_MAX_ROUNDS",
        "RELAY_SETTLE_DELAY_SECS",
        "RELAY_BLACKLIST_PATH",
        "WEBDRIVER_URL",
        "BROWSER_HEADLESS",
        "CONTENT_MAP",
        "AUTH_ENABLED",
        "AUTH_USERNAME",
        "AUTH_PASSWORD",
        "LOG_LEVEL",
        "LOG_FORMAT",
    ];

    struct EnvGuard {
        saved: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(keys: &[&str]) -> Self {
            let saved = keys
                .iter()
                .map(|&key| {
                    let old = env::var(key).ok();
                    env::remove_var(key);
                    (key.to_string(), old)
                })
                .collect();

            Self { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.saved.drain(..) {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_config_from_env_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        let config = Config::from_env().unwrap();

        assert_eq!(config.api.port, 5000);
        assert_eq!(config.api.host, "0.0.0.0");

        assert_eq!(config.relay.entry_url, "https://proxyium.com");
        assert_eq!(config.relay.reference_marker, "");
        assert_eq!(config.relay.max_rounds, 5);
        assert_eq!(config.relay.settle_delay, Duration::from_secs(10));
        assert_eq!(config.relay.blacklist_path, PathBuf::from("bad_servers.json"));

        assert_eq!(config.browser.webdriver_url, "http://127.0.0.1:9515");
        assert!(config.browser.headless);

        assert_eq!(
            config.catalog.resolve("placeholder"),
            Some("https://example.com")
        );
        assert!(!config.auth.enabled);
        assert_eq!(config.log.format, "pretty");
    }

    #[test]
    fn test_config_from_env_overrides() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("API_PORT", "8080");
        env::set_var("RELAY_REFERENCE_MARKER", "PAGE-OK");
        env::set_var("RELAY_MAX_ROUNDS", "3");
        env::set_var("RELAY_SETTLE_DELAY_SECS", "2");
        env::set_var("RELAY_BLACKLIST_PATH", "/var/lib/relay/bad.json");
        env::set_var("BROWSER_HEADLESS", "false");
        env::set_var("CONTENT_MAP", "scores=https://example.com/s.js");
        env::set_var("AUTH_ENABLED", "true");
        env::set_var("AUTH_USERNAME", "ops");
        env::set_var("AUTH_PASSWORD", "secret");

        let config = Config::from_env().unwrap();

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.relay.reference_marker, "PAGE-OK");
        assert_eq!(config.relay.max_rounds, 3);
        assert_eq!(config.relay.settle_delay, Duration::from_secs(2));
        assert_eq!(
            config.relay.blacklist_path,
            PathBuf::from("/var/lib/relay/bad.json")
        );
        assert!(!config.browser.headless);
        assert_eq!(config.catalog.resolve("scores"), Some("https://example.com/s.js"));
        assert_eq!(config.catalog.resolve("placeholder"), None);
        assert!(config.auth.enabled);
        assert_eq!(config.auth.username, "ops");
    }

    #[test]
    fn test_config_from_env_invalid_port() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("API_PORT", "not-a-port");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_from_env_invalid_rounds() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("RELAY_MAX_ROUNDS", "-1");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_from_env_invalid_entry_url() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("RELAY_ENTRY_URL", "proxyium");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_auth_requires_username() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("AUTH_ENABLED", "true");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, RelayError::MissingEnvVar(_)));
    }

    #[test]
    fn test_config_formatters() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("API_HOST", "127.0.0.1");
        env::set_var("API_PORT", "5001");
        let config = Config::from_env().unwrap();

        assert_eq!(config.api_addr(), "127.0.0.1:5001");
    }
}
