use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    20
}

/// Staff account created at startup when it does not exist yet.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapStaffConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of access tokens.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default = "default_refresh_ttl_hours")]
    pub refresh_ttl_hours: i64,
    #[serde(default)]
    pub bootstrap_staff: Option<BootstrapStaffConfig>,
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_refresh_ttl_hours() -> i64 {
    24 * 14
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    pub default_per_page: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LikesConfig {
    /// Upper bound on waiting for a video's row lock. `None` leaves the
    /// datastore default in place.
    #[serde(default)]
    pub lock_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub likes: LikesConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("pagination.default_per_page", 20)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., VIDHOST__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("VIDHOST").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
