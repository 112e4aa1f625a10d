/// Configuration management for the API server
///
/// Configuration is read once at startup and handed to [`crate::app::AppState`].
/// Nothing below `main` reads the environment.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `DATABASE_URL`: PostgreSQL connection string; without it data is kept in memory
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for token signing (required, at least 32 characters)
/// - `SENDGRID_API_KEY`: Enables email delivery through SendGrid
/// - `MAIL_FROM`: Sender address (default: noreply@taskmanager.local)
/// - `LOG_FORMAT`: `fmt` (default) or `json`
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use taskmanager_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

/// Default sender for account emails
pub const DEFAULT_MAIL_FROM: &str = "noreply@taskmanager.local";

/// Shortest accepted JWT secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,

    /// `None` selects the in-memory store
    pub database: Option<DatabaseConfig>,

    pub jwt: JwtConfig,

    pub mail: MailConfig,

    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HS256 signing
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Without a key, emails are only logged
    pub sendgrid_api_key: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Fmt,
    Json,
}

impl Config {
    /// Loads configuration from the process environment and `.env`
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds configuration from any variable source
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = non_empty("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let cors_origins = non_empty("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database = match non_empty("DATABASE_URL") {
            Some(url) => {
                let max_connections = non_empty("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|| "10".to_string())
                    .parse::<u32>()
                    .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;
                Some(DatabaseConfig { url, max_connections })
            }
            None => None,
        };

        let secret = non_empty("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_JWT_SECRET_LEN);
        }

        let log_format = match non_empty("LOG_FORMAT").as_deref() {
            None | Some("fmt") | Some("pretty") => LogFormat::Fmt,
            Some("json") => LogFormat::Json,
            Some(other) => anyhow::bail!("LOG_FORMAT must be 'fmt' or 'json', got '{}'", other),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            database,
            jwt: JwtConfig { secret },
            mail: MailConfig {
                sendgrid_api_key: non_empty("SENDGRID_API_KEY"),
                from: non_empty("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            },
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.database.is_none());
        assert!(config.allows_any_origin());
        assert!(config.mail.sendgrid_api_key.is_none());
        assert_eq!(config.mail.from, DEFAULT_MAIL_FROM);
        assert_eq!(config.log_format, LogFormat::Fmt);
    }

    #[test]
    fn test_full_configuration() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "3000"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("DATABASE_URL", "postgresql://localhost/taskmanager"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("SENDGRID_API_KEY", "SG.key"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.api.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert!(!config.allows_any_origin());
        assert_eq!(config.database.as_ref().unwrap().max_connections, 4);
        assert_eq!(config.mail.sendgrid_api_key.as_deref(), Some("SG.key"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_secret_is_required_and_long() {
        assert!(load(&[]).is_err());
        assert!(load(&[("JWT_SECRET", "short")]).is_err());
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("JWT_SECRET", SECRET), ("API_PORT", "eighty")]).is_err());
        assert!(load(&[("JWT_SECRET", SECRET), ("LOG_FORMAT", "xml")]).is_err());
    }
}
