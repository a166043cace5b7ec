use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthrelaySettings {
    pub application: ApplicationSettings,
    pub provider: IdentityProviderSettings,
    pub cookies: CookieSettings,
    pub routes: RouteSettings,
    pub callback: CallbackSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Origin used to build fixed return addresses (`/auth/callback`,
    /// `/reset-password`)
    pub redirect_base_url: String,
    pub cors_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProviderSettings {
    /// Base URL of the hosted auth API
    pub url: String,

    // Direct value (can be overridden by environment variables)
    pub anon_key: Option<String>,

    // Environment variable name for override
    pub anon_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSettings {
    pub login_path: String,
    pub dashboard_path: String,
    /// Paths requiring an identity; matched by segment prefix
    pub protected: Vec<String>,
    /// Entry-only paths redirected away from when authenticated
    pub entry: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackSettings {
    /// When enabled, a callback without an authorization code redirects to
    /// the login page instead of passing through to the dashboard.
    #[serde(default)]
    pub require_code: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            redirect_base_url: "http://localhost:8080".to_string(),
            cors_origins: "http://localhost:3000,http://localhost:8080".to_string(),
        }
    }
}

impl Default for IdentityProviderSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: None,
            anon_key_env: Some("PROVIDER_ANON_KEY".to_string()),
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { secure: true }
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            dashboard_path: "/dashboard".to_string(),
            protected: vec!["/dashboard".to_string()],
            entry: vec![
                "/".to_string(),
                "/login".to_string(),
                "/register".to_string(),
            ],
        }
    }
}

impl Default for CallbackSettings {
    fn default() -> Self {
        Self {
            require_code: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AuthrelaySettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - Settings file cannot be read or parsed
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::initialize_environment()?;
        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);
        Ok(settings)
    }

    /// Load settings from a specific TOML file, without touching the
    /// environment or the logger
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    fn initialize_environment() -> Result<(), Box<dyn std::error::Error>> {
        Self::load_env_file();
        env_logger::try_init()?;
        Ok(())
    }

    /// Load base settings with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading)
    /// 2. Settings.toml in `AUTHRELAY_SECRETS_DIR` (if set and present)
    /// 3. Settings.toml in the current directory (if present)
    /// 4. Default settings
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::load_from_file(&default_config_path)?;
            log::info!("loaded base settings from {}", default_config_path.display());
        }

        if let Ok(secrets_dir) = std::env::var("AUTHRELAY_SECRETS_DIR") {
            let secrets_path = Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::load_from_file(&secrets_path)?;
                log::info!("overriding settings from {}", secrets_path.display());
            } else {
                log::info!(
                    "AUTHRELAY_SECRETS_DIR set but no Settings.toml found at {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_provider_env_overrides(&mut settings.provider);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_callback_env_overrides(&mut settings.callback);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(redirect_base_url) = std::env::var("REDIRECT_BASE_URL") {
            app_settings.redirect_base_url = redirect_base_url;
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
    }

    fn apply_provider_env_overrides(provider_settings: &mut IdentityProviderSettings) {
        if let Ok(url) = std::env::var("PROVIDER_URL") {
            provider_settings.url = url;
        }
        if let Ok(anon_key) = std::env::var("PROVIDER_ANON_KEY") {
            if !anon_key.is_empty() {
                provider_settings.anon_key = Some(anon_key);
            }
        }
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
    }

    fn apply_callback_env_overrides(callback_settings: &mut CallbackSettings) {
        if let Ok(require_code_str) = std::env::var("CALLBACK_REQUIRE_CODE") {
            if let Ok(require_code) = require_code_str.parse::<bool>() {
                callback_settings.require_code = require_code;
            }
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .collect()
    }
}

impl IdentityProviderSettings {
    /// Resolve the anon key: the configured env var wins over the direct
    /// value.
    #[must_use]
    pub fn resolve_anon_key(&self) -> Option<String> {
        if let Some(var_name) = &self.anon_key_env {
            if let Ok(value) = std::env::var(var_name) {
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
        self.anon_key.clone().filter(|key| !key.is_empty())
    }
}
