//! Configuration management for r2catalog
//!
//! Settings come from an optional TOML file, then `.env` and the process
//! environment, which take precedence. The result is an explicit [`Config`]
//! value handed to whichever component needs it.

use crate::error::{Error, Result};
use crate::sort::SortOrder;
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration directory name
const CONFIG_DIR: &str = "r2catalog";

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// Environment variable names
pub mod env_keys {
    pub const ACCOUNT_ID: &str = "ACCOUNT_ID";
    pub const ENDPOINT: &str = "R2_ENDPOINT";
    pub const ACCESS_KEY_ID: &str = "ACCESS_KEY_ID";
    pub const SECRET_ACCESS_KEY: &str = "SECRET_ACCESS_KEY";
    pub const BUCKET_NAME: &str = "BUCKET_NAME";
    pub const BUCKET_PUBLIC_URL: &str = "BUCKET_PUBLIC_URL";
    pub const API_URL: &str = "API_URL";
    pub const API_TOKEN: &str = "API_TOKEN";
    pub const LIST_PREFIXES: &str = "LIST_PREFIXES";
    pub const PUSH_TO_API: &str = "PUSH_TO_API";
    pub const SORT_ORDER: &str = "SORT_ORDER";
}

/// On-disk configuration; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub r2: R2Section,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub export: ExportSection,
}

/// `[r2]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct R2Section {
    pub account_id: Option<String>,
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: Option<String>,
    pub public_url: Option<String>,
}

/// `[api]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSection {
    pub url: Option<String>,
    pub token: Option<String>,
}

/// `[export]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSection {
    pub prefixes: Option<Vec<String>>,
    pub push: Option<bool>,
    pub sort: Option<SortOrder>,
}

impl ConfigFile {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub r2: R2Config,
    /// Base URL prepended to object keys; must end with `/` to get a separator
    pub public_url: Option<String>,
    /// Reporting API, when configured
    pub api: Option<ApiConfig>,
    pub export: ExportOptions,
}

/// R2 connection settings
#[derive(Debug, Clone)]
pub struct R2Config {
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
}

/// Reporting API settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub url: String,
    pub token: String,
}

/// Options of the list/export action
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// One listing request per prefix; empty means a single unprefixed request
    pub prefixes: Vec<String>,
    /// Push the tree to the reporting API
    pub push: bool,
    pub sort: SortOrder,
}

impl Config {
    /// Merge a config file with environment lookups
    ///
    /// `env` wins over the file. Empty values count as unset.
    pub fn resolve<F>(file: ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_value = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let lookup = |key: &str, fallback: Option<String>| {
            env_value(key).or(fallback.filter(|v| !v.trim().is_empty()))
        };

        let account_id = lookup(env_keys::ACCOUNT_ID, file.r2.account_id);
        let endpoint = match lookup(env_keys::ENDPOINT, file.r2.endpoint) {
            Some(endpoint) => endpoint,
            None => {
                let account_id = account_id.ok_or_else(|| {
                    Error::Config(format!(
                        "{} (or {}) is not set",
                        env_keys::ACCOUNT_ID,
                        env_keys::ENDPOINT
                    ))
                })?;
                validate_account_id(&account_id)?;
                r2_endpoint(&account_id)
            }
        };

        let access_key_id = lookup(env_keys::ACCESS_KEY_ID, file.r2.access_key_id)
            .ok_or_else(|| missing(env_keys::ACCESS_KEY_ID))?;
        let secret_access_key = lookup(env_keys::SECRET_ACCESS_KEY, file.r2.secret_access_key)
            .ok_or_else(|| missing(env_keys::SECRET_ACCESS_KEY))?;
        let bucket = lookup(env_keys::BUCKET_NAME, file.r2.bucket)
            .ok_or_else(|| missing(env_keys::BUCKET_NAME))?;

        let public_url = lookup(env_keys::BUCKET_PUBLIC_URL, file.r2.public_url);

        let api = match (
            lookup(env_keys::API_URL, file.api.url),
            lookup(env_keys::API_TOKEN, file.api.token),
        ) {
            (Some(url), Some(token)) => Some(ApiConfig { url, token }),
            (Some(_), None) => {
                return Err(Error::Config(format!(
                    "{} is required when {} is set",
                    env_keys::API_TOKEN,
                    env_keys::API_URL
                )))
            }
            (None, _) => None,
        };

        let prefixes = match env_value(env_keys::LIST_PREFIXES) {
            Some(raw) => parse_prefixes(&raw),
            None => file.export.prefixes.unwrap_or_default(),
        };

        let push = match env_value(env_keys::PUSH_TO_API) {
            Some(raw) => parse_bool(env_keys::PUSH_TO_API, &raw)?,
            None => file.export.push.unwrap_or(api.is_some()),
        };

        let sort = match env_value(env_keys::SORT_ORDER) {
            Some(raw) => raw.parse::<SortOrder>().map_err(Error::InvalidConfig)?,
            None => file.export.sort.unwrap_or_default(),
        };

        Ok(Self {
            r2: R2Config {
                endpoint,
                access_key_id,
                secret_access_key,
                bucket,
            },
            public_url,
            api,
            export: ExportOptions {
                prefixes,
                push,
                sort,
            },
        })
    }

    /// Public base URL, required by actions that produce links
    pub fn public_url(&self) -> Result<&str> {
        self.public_url
            .as_deref()
            .ok_or_else(|| missing(env_keys::BUCKET_PUBLIC_URL))
    }
}

fn missing(key: &str) -> Error {
    Error::Config(format!("{} is not set", key))
}

/// R2 S3-compatible endpoint for an account
pub fn r2_endpoint(account_id: &str) -> String {
    format!("https://{}.r2.cloudflarestorage.com", account_id)
}

/// Split a comma-separated prefix list, dropping blanks
pub fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::InvalidConfig(format!(
            "{} must be true or false, got '{}'",
            key, other
        ))),
    }
}

fn validate_account_id(account_id: &str) -> Result<()> {
    if account_id.len() != 32 || !account_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::InvalidInput(format!(
            "Invalid Account ID format (expected 32 alphanumeric characters, got {})",
            account_id.len()
        )));
    }
    Ok(())
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let home =
        home_dir().ok_or_else(|| Error::Config("Cannot determine home directory".to_string()))?;
    Ok(home.join(".config").join(CONFIG_DIR))
}

/// Get the configuration file path
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

/// Read the config file
///
/// An explicit `path` must exist. Without one, the default location is used when
/// present and an empty [`ConfigFile`] otherwise.
pub fn load_config_file(path: Option<&Path>) -> Result<ConfigFile> {
    let config_path = match path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::ConfigNotFound(path.to_path_buf()));
            }
            path.to_path_buf()
        }
        None => match get_config_path() {
            Ok(path) if path.exists() => path,
            _ => return Ok(ConfigFile::default()),
        },
    };

    let content = fs::read_to_string(&config_path)
        .map_err(|e| Error::InvalidConfig(format!("Failed to read config file: {}", e)))?;

    ConfigFile::from_toml(&content)
}

/// Load and validate the configuration from file, `.env` and environment
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    dotenv::dotenv().ok();

    let file = load_config_file(path)?;
    let config = Config::resolve(file, |key| std::env::var(key).ok())?;
    validate_config(&config)?;

    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_bucket_name(&config.r2.bucket)?;

    if config.export.push && config.api.is_none() {
        return Err(Error::Config(format!(
            "Pushing to the API requires {} and {}",
            env_keys::API_URL,
            env_keys::API_TOKEN
        )));
    }

    if let Some(api) = &config.api {
        if !api.url.starts_with("http://") && !api.url.starts_with("https://") {
            return Err(Error::InvalidInput(format!(
                "{} must be an http(s) URL, got '{}'",
                env_keys::API_URL,
                api.url
            )));
        }
    }

    Ok(())
}

/// Validate a bucket name
pub fn validate_bucket_name(bucket: &str) -> Result<()> {
    if bucket.len() < 3 || bucket.len() > 63 {
        return Err(Error::InvalidInput(format!(
            "Bucket name '{}' must be between 3 and 63 characters",
            bucket
        )));
    }

    if !bucket
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(Error::InvalidInput(format!(
            "Bucket name '{}' can only contain lowercase letters, digits, hyphens, and dots",
            bucket
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const ACCOUNT: &str = "0123456789abcdef0123456789abcdef";

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn base_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (env_keys::ACCOUNT_ID, ACCOUNT),
            (env_keys::ACCESS_KEY_ID, "test_key_id"),
            (env_keys::SECRET_ACCESS_KEY, "test_secret"),
            (env_keys::BUCKET_NAME, "course-videos"),
            (env_keys::BUCKET_PUBLIC_URL, "https://pub.example.com/"),
        ]
    }

    #[test]
    fn test_resolve_from_env() {
        let config = Config::resolve(ConfigFile::default(), env_from(&base_env())).unwrap();

        assert_eq!(
            config.r2.endpoint,
            format!("https://{}.r2.cloudflarestorage.com", ACCOUNT)
        );
        assert_eq!(config.r2.bucket, "course-videos");
        assert_eq!(config.public_url().unwrap(), "https://pub.example.com/");
        assert!(config.api.is_none());
        assert!(!config.export.push);
        assert!(config.export.prefixes.is_empty());
        assert_eq!(config.export.sort, SortOrder::Number);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_api_enables_push_by_default() {
        let mut env = base_env();
        env.push((env_keys::API_URL, "https://api.example.com/catalog"));
        env.push((env_keys::API_TOKEN, "secret-token"));

        let config = Config::resolve(ConfigFile::default(), env_from(&env)).unwrap();

        assert!(config.export.push);
        let api = config.api.unwrap();
        assert_eq!(api.url, "https://api.example.com/catalog");
        assert_eq!(api.token, "secret-token");
    }

    #[test]
    fn test_api_url_without_token() {
        let mut env = base_env();
        env.push((env_keys::API_URL, "https://api.example.com/catalog"));

        let err = Config::resolve(ConfigFile::default(), env_from(&env)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_push_without_api_fails_validation() {
        let mut env = base_env();
        env.push((env_keys::PUSH_TO_API, "true"));

        let config = Config::resolve(ConfigFile::default(), env_from(&env)).unwrap();
        assert!(config.export.push);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_credentials() {
        let env: Vec<_> = base_env()
            .into_iter()
            .filter(|(k, _)| *k != env_keys::SECRET_ACCESS_KEY)
            .collect();

        let err = Config::resolve(ConfigFile::default(), env_from(&env)).unwrap_err();
        assert!(err.to_string().contains(env_keys::SECRET_ACCESS_KEY));
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        let mut env = base_env();
        env.retain(|(k, _)| *k != env_keys::BUCKET_NAME);
        env.push((env_keys::BUCKET_NAME, "  "));

        assert!(Config::resolve(ConfigFile::default(), env_from(&env)).is_err());
    }

    #[test]
    fn test_invalid_account_id() {
        let mut env = base_env();
        env.retain(|(k, _)| *k != env_keys::ACCOUNT_ID);
        env.push((env_keys::ACCOUNT_ID, "too_short"));

        let err = Config::resolve(ConfigFile::default(), env_from(&env)).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_endpoint_override_skips_account_id() {
        let mut env = base_env();
        env.retain(|(k, _)| *k != env_keys::ACCOUNT_ID);
        env.push((env_keys::ENDPOINT, "http://127.0.0.1:9000"));

        let config = Config::resolve(ConfigFile::default(), env_from(&env)).unwrap();
        assert_eq!(config.r2.endpoint, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_file_values_and_env_precedence() {
        let file = ConfigFile::from_toml(
            r#"
            [r2]
            account_id = "0123456789abcdef0123456789abcdef"
            access_key_id = "file_key"
            secret_access_key = "file_secret"
            bucket = "file-bucket"
            public_url = "https://file.example.com/"

            [export]
            prefixes = ["Unit 1/", "Unit 2/"]
            push = false
            sort = "insertion"
            "#,
        )
        .unwrap();

        let env = env_from(&[(env_keys::BUCKET_NAME, "env-bucket")]);
        let config = Config::resolve(file, env).unwrap();

        assert_eq!(config.r2.bucket, "env-bucket");
        assert_eq!(config.r2.access_key_id, "file_key");
        assert_eq!(config.public_url.as_deref(), Some("https://file.example.com/"));
        assert_eq!(config.export.prefixes, vec!["Unit 1/", "Unit 2/"]);
        assert_eq!(config.export.sort, SortOrder::Insertion);
        assert!(!config.export.push);
    }

    #[test]
    fn test_env_prefixes_override_file() {
        let file = ConfigFile {
            export: ExportSection {
                prefixes: Some(vec!["from-file/".to_string()]),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut env = base_env();
        env.push((env_keys::LIST_PREFIXES, "Unit 1/, Unit 2/ ,,"));

        let config = Config::resolve(file, env_from(&env)).unwrap();
        assert_eq!(config.export.prefixes, vec!["Unit 1/", "Unit 2/"]);
    }

    #[test]
    fn test_empty_prefixes_keep_file_value() {
        let file = ConfigFile {
            export: ExportSection {
                prefixes: Some(vec!["Unit 1/".to_string()]),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut env = base_env();
        env.push((env_keys::LIST_PREFIXES, ""));

        let config = Config::resolve(file, env_from(&env)).unwrap();
        assert_eq!(config.export.prefixes, vec!["Unit 1/"]);
    }

    #[test]
    fn test_empty_push_flag_uses_default() {
        let mut env = base_env();
        env.push((env_keys::API_URL, "https://api.example.com/catalog"));
        env.push((env_keys::API_TOKEN, "secret-token"));
        env.push((env_keys::PUSH_TO_API, ""));

        let config = Config::resolve(ConfigFile::default(), env_from(&env)).unwrap();
        assert!(config.export.push);

        let mut env = base_env();
        env.push((env_keys::PUSH_TO_API, " "));

        let config = Config::resolve(ConfigFile::default(), env_from(&env)).unwrap();
        assert!(!config.export.push);
    }

    #[test]
    fn test_empty_sort_order_uses_file_value() {
        let file = ConfigFile {
            export: ExportSection {
                sort: Some(SortOrder::Insertion),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut env = base_env();
        env.push((env_keys::SORT_ORDER, ""));

        let config = Config::resolve(file, env_from(&env)).unwrap();
        assert_eq!(config.export.sort, SortOrder::Insertion);

        let config = Config::resolve(ConfigFile::default(), env_from(&env)).unwrap();
        assert_eq!(config.export.sort, SortOrder::Number);
    }

    #[test]
    fn test_invalid_push_flag() {
        let mut env = base_env();
        env.push((env_keys::PUSH_TO_API, "maybe"));
        assert!(Config::resolve(ConfigFile::default(), env_from(&env)).is_err());
    }

    #[test]
    fn test_missing_public_url_only_fails_on_use() {
        let env: Vec<_> = base_env()
            .into_iter()
            .filter(|(k, _)| *k != env_keys::BUCKET_PUBLIC_URL)
            .collect();

        let config = Config::resolve(ConfigFile::default(), env_from(&env)).unwrap();
        assert!(config.public_url().is_err());
    }

    #[test]
    fn test_validate_bucket_name() {
        assert!(validate_bucket_name("course-videos").is_ok());
        assert!(validate_bucket_name("a.b-1").is_ok());
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name("Course_Videos").is_err());
        assert!(validate_bucket_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_load_config_file_explicit_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = load_config_file(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn test_load_config_file_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\nurl = \"https://api.example.com\"\ntoken = \"t\"\n").unwrap();

        let file = load_config_file(Some(&path)).unwrap();
        assert_eq!(file.api.url.as_deref(), Some("https://api.example.com"));
        assert!(file.r2.bucket.is_none());
    }

    #[test]
    fn test_load_config_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[r2\nbucket = ").unwrap();

        let err = load_config_file(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }
}
