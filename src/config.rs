use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docsum pipeline.
#[derive(Debug)]
pub struct Config {
    /// API key used to authenticate against the Gemini service.
    pub google_api_key: String,
    /// Model identifier passed to generateContent.
    pub gemini_model: String,
    /// Sampling temperature forwarded to generation requests.
    pub temperature: f32,
    /// Nucleus sampling parameter forwarded to generation requests.
    pub top_p: f32,
    /// Top-k sampling parameter forwarded to generation requests.
    pub top_k: i32,
    /// Output token cap forwarded to generation requests.
    pub max_output_tokens: i32,
    /// Largest local file accepted for upload, in megabytes.
    pub max_file_size_mb: u64,
    /// Timeout applied to the upload request, in seconds.
    pub upload_timeout_secs: u64,
    /// Optional override for the Gemini API endpoint.
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            google_api_key: load_env("GOOGLE_API_KEY")?,
            gemini_model: load_env_optional("GEMINI_MODEL")
                .unwrap_or_else(|| "gemini-2.5-flash".to_string()),
            temperature: parse_env_or("GEMINI_TEMPERATURE", 1.0)?,
            top_p: parse_env_or("GEMINI_TOP_P", 0.95)?,
            top_k: parse_env_or("GEMINI_TOP_K", 64)?,
            max_output_tokens: parse_env_or("GEMINI_MAX_OUTPUT_TOKENS", 8192)?,
            max_file_size_mb: parse_env_or("MAX_FILE_SIZE_MB", 20)?,
            upload_timeout_secs: parse_env_or("UPLOAD_TIMEOUT", 180)?,
            base_url: load_env_optional("GEMINI_BASE_URL"),
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
///
/// Returns the validation error instead of panicking so that `main` can exit
/// with a proper status code on misconfiguration.
pub fn init_config() -> Result<(), ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        model = %config.gemini_model,
        max_file_size_mb = config.max_file_size_mb,
        upload_timeout_secs = config.upload_timeout_secs,
        base_url = ?config.base_url,
        "Loaded configuration"
    );
    CONFIG.set(config).ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env mutation is process-wide; serialize these tests.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_env(key: &str, value: &str) {
        // SAFETY: Tests mutate process env deterministically before reading it back.
        unsafe { env::set_var(key, value) }
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        // SAFETY: see set_env.
        unsafe { env::remove_var("GOOGLE_API_KEY") };
        let err = Config::from_env().expect_err("missing key must fail");
        assert!(matches!(err, ConfigError::MissingVariable(ref key) if key == "GOOGLE_API_KEY"));
    }

    #[test]
    fn defaults_apply_when_optionals_are_absent() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env("GOOGLE_API_KEY", "test-key");
        // SAFETY: see set_env.
        unsafe {
            env::remove_var("GEMINI_MODEL");
            env::remove_var("GEMINI_TEMPERATURE");
            env::remove_var("MAX_FILE_SIZE_MB");
        }
        let config = Config::from_env().expect("config");
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert!((config.temperature - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.max_file_size_mb, 20);
        assert_eq!(config.upload_timeout_secs, 180);
    }

    #[test]
    fn unparsable_numeric_value_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env("GOOGLE_API_KEY", "test-key");
        set_env("GEMINI_TOP_K", "not-a-number");
        let err = Config::from_env().expect_err("bad top_k must fail");
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "GEMINI_TOP_K"));
        // SAFETY: see set_env.
        unsafe { env::remove_var("GEMINI_TOP_K") };
    }
}
