use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::relay::language::Language;
use crate::relay::translate::GOOGLE_TRANSLATE_URL;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config file '{}': {source}", .path.display())]
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    #[error("failed to parse config file '{}': {source}", .path.display())]
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// Text-generation endpoint, e.g. "https://api-inference.huggingface.co/models/gpt2"
    generator_endpoint: String,
    /// Bearer token for the generation endpoint
    #[serde(default)]
    generator_api_key: String,
    /// Translation endpoint (Google `translate_a/single` compatible)
    translator_endpoint: Option<String>,
    /// Language for callers who never picked one
    #[serde(default = "default_language")]
    default_language: String,
    /// Per-request HTTP timeout for the generator and translator
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
    /// Directory for log files. Defaults to current directory.
    data_dir: Option<String>,
}

fn default_language() -> String {
    Language::default().code().to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

pub struct Config {
    pub telegram_bot_token: String,
    pub generator_endpoint: String,
    pub generator_api_key: Option<String>,
    pub translator_endpoint: String,
    pub default_language: Language,
    pub request_timeout: Duration,
    /// Directory for log files.
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        if !is_http_url(&file.generator_endpoint) {
            return Err(ConfigError::Validation(
                "generator_endpoint must be an http(s) URL".into()
            ));
        }

        let translator_endpoint = file
            .translator_endpoint
            .unwrap_or_else(|| GOOGLE_TRANSLATE_URL.to_string());
        if !is_http_url(&translator_endpoint) {
            return Err(ConfigError::Validation(
                "translator_endpoint must be an http(s) URL".into()
            ));
        }

        let default_language = Language::from_code(&file.default_language).ok_or_else(|| {
            ConfigError::Validation(format!(
                "default_language '{}' is not supported (expected one of: {})",
                file.default_language,
                Language::ALL.map(Language::code).join(", ")
            ))
        })?;

        if file.request_timeout_secs == 0 {
            return Err(ConfigError::Validation("request_timeout_secs must be positive".into()));
        }

        let generator_api_key = Some(file.generator_api_key).filter(|k| !k.is_empty());

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            generator_endpoint: file.generator_endpoint,
            generator_api_key,
            translator_endpoint,
            default_language,
            request_timeout: Duration::from_secs(file.request_timeout_secs),
            data_dir,
        })
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config_defaults() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdefGHIjklMNOpqrsTUVwxyz",
            "generator_endpoint": "https://api-inference.huggingface.co/models/gpt2"
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.default_language, Language::Uk);
        assert_eq!(config.translator_endpoint, GOOGLE_TRANSLATE_URL);
        assert_eq!(config.generator_api_key, None);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.data_dir, PathBuf::from("."));
    }

    #[test]
    fn test_full_config() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "generator_endpoint": "http://localhost:8080/generate",
            "generator_api_key": "hf_secret",
            "translator_endpoint": "http://localhost:9000/translate",
            "default_language": "EN",
            "request_timeout_secs": 5,
            "data_dir": "/tmp/lingvobot"
        }"#);
        let config = Config::load(file.path()).expect("should load full config");
        assert_eq!(config.generator_api_key.as_deref(), Some("hf_secret"));
        assert_eq!(config.translator_endpoint, "http://localhost:9000/translate");
        assert_eq!(config.default_language, Language::En);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/lingvobot"));
    }

    #[test]
    fn test_empty_token() {
        let file = write_config(r#"{
            "telegram_bot_token": "",
            "generator_endpoint": "https://example.com"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn test_invalid_token_format_no_colon() {
        let file = write_config(r#"{
            "telegram_bot_token": "invalid_token_no_colon",
            "generator_endpoint": "https://example.com"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_invalid_token_format_empty_secret() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:",
            "generator_endpoint": "https://example.com"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_invalid_generator_endpoint() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "generator_endpoint": "gpt2"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(err.to_string().contains("generator_endpoint"));
    }

    #[test]
    fn test_unsupported_default_language() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "generator_endpoint": "https://example.com",
            "default_language": "fr"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("'fr'"));
    }

    #[test]
    fn test_zero_timeout() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "generator_endpoint": "https://example.com",
            "request_timeout_secs": 0
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(err.to_string().contains("request_timeout_secs"));
    }

    #[test]
    fn test_missing_generator_endpoint() {
        let file = write_config(r#"{ "telegram_bot_token": "123456789:ABCdef" }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::load("/nonexistent/path/config.json"));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
