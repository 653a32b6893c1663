use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub pages: PagesConfig,
    pub notifier: NotifierConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://database.db".to_string());

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| (1..=MAX_SESSION_TTL_SECS).contains(secs))
            .ok_or(ConfigError::InvalidSessionTtl)?;

        let admin = AdminConfig {
            username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "12345".to_string()),
            session_ttl_secs,
        };

        let pages = PagesConfig {
            views_dir: PathBuf::from(env::var("VIEWS_DIR").unwrap_or_else(|_| "views".into())),
            public_dir: PathBuf::from(env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".into())),
        };

        let notifier = NotifierConfig {
            country_code: env::var("PHONE_COUNTRY_CODE").unwrap_or_else(|_| "591".to_string()),
            twilio: TwilioConfig::from_env()?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            database: DatabaseConfig { url: database_url },
            admin,
            pages,
            notifier,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the SQLite database holding pre-enrollment records.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Longest accepted admin session lifetime (one year).
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// The single administrator credential and its session lifetime.
#[derive(Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    pub session_ttl_secs: u64,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish()
    }
}

/// Directories holding the static HTML views and public assets.
#[derive(Debug, Clone)]
pub struct PagesConfig {
    pub views_dir: PathBuf,
    pub public_dir: PathBuf,
}

/// Outbound notification settings.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Digits prepended (after `+`) to phone numbers stored without a prefix.
    pub country_code: String,
    /// `None` when no provider credentials are configured.
    pub twilio: Option<TwilioConfig>,
}

/// Whether messages travel over WhatsApp or plain SMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagingChannel {
    WhatsApp,
    Sms,
}

#[derive(Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub channel: MessagingChannel,
    pub api_base: String,
}

impl TwilioConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let account_sid = non_empty_var("TWILIO_ACCOUNT_SID");
        let auth_token = non_empty_var("TWILIO_AUTH_TOKEN");

        let (account_sid, auth_token) = match (account_sid, auth_token) {
            (None, None) => return Ok(None),
            (Some(sid), Some(token)) => (sid, token),
            _ => return Err(ConfigError::IncompleteTwilio),
        };

        let (from, channel) = match non_empty_var("TWILIO_WHATSAPP") {
            Some(from) => (from, MessagingChannel::WhatsApp),
            None => match non_empty_var("TWILIO_FROM") {
                Some(from) => (from, MessagingChannel::Sms),
                None => return Err(ConfigError::IncompleteTwilio),
            },
        };

        let api_base = non_empty_var("TWILIO_API_BASE")
            .unwrap_or_else(|| "https://api.twilio.com".to_string());

        Ok(Some(Self {
            account_sid,
            auth_token,
            from,
            channel,
            api_base,
        }))
    }
}

impl fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from", &self.from)
            .field("channel", &self.channel)
            .field("api_base", &self.api_base)
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSessionTtl,
    IncompleteTwilio,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSessionTtl => write!(
                f,
                "SESSION_TTL_SECS must be between 1 and {MAX_SESSION_TTL_SECS} seconds"
            ),
            ConfigError::IncompleteTwilio => write!(
                f,
                "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_WHATSAPP (or TWILIO_FROM) must be set together"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSessionTtl
            | ConfigError::IncompleteTwilio => None,
        }
    }
}
