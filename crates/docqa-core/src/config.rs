//! Configuration provider and path helpers.
//!
//! Uses Figment to merge `config.json` with `DOCQA_*` environment variables
//! (`__` separates nesting levels, so `DOCQA_LLM__MODEL` maps to `llm.model`).
//! Values are looked up by dotted key. A `.env` file in the working directory
//! is loaded before the environment provider reads its variables.

use figment::{
    providers::{Env, Format, Json},
    Figment,
};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::DistanceMetric;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
const GROQ_KEY_PLACEHOLDER: &str = "your_groq_api_key_here";

#[derive(Debug, Clone)]
pub struct Config {
    figment: Figment,
}

impl Config {
    /// Load `config.json` (or the file named by `DOCQA_CONFIG`) plus the environment.
    /// An absent file is tolerated; every tunable has a default.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv_override();
        let path = env::var("DOCQA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let path = expand_path(path);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
        }
        Ok(Self::from_figment(Figment::new().merge(Json::file(&path)).merge(env_provider())))
    }

    /// Load an explicit config file. Unlike [`Config::load`], a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let _ = dotenvy::dotenv_override();
        if !path.exists() {
            return Err(Error::NotFound(format!("Config file {} not found", path.display())));
        }
        Ok(Self::from_figment(Figment::new().merge(Json::file(path)).merge(env_provider())))
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    /// Build a config from an inline JSON document, without consulting the environment.
    pub fn from_json_str(json: &str) -> Self {
        Self::from_figment(Figment::from(Json::string(json)))
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment.extract_inner(key).map_err(|e| Error::Config {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Like [`Config::get`] but falls back to `default` when the key is absent or mistyped.
    pub fn get_or<T>(&self, key: &str, default: T) -> T
    where
        T: serde::de::DeserializeOwned,
    {
        self.get(key).unwrap_or(default)
    }

    pub fn get_path(&self, key: &str) -> Result<PathBuf> {
        let raw: String = self
            .get(key)
            .map_err(|_| Error::InvalidConfig(format!("Path not found for {key}")))?;
        if raw.trim().is_empty() {
            return Err(Error::InvalidConfig(format!("Path not found for {key}")));
        }
        Ok(expand_path(raw))
    }

    pub fn docs_dir(&self) -> Result<PathBuf> {
        self.get_path("paths.docs_directory")
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        self.get_path("paths.data_directory")
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        self.get_path("paths.db_path")
    }

    /// `database.distance_metric`, defaulting to cosine when absent.
    /// A present but unrecognised name is an error rather than a silent fallback.
    pub fn distance_metric(&self) -> Result<DistanceMetric> {
        if self.figment.find_value("database.distance_metric").is_err() {
            return Ok(DistanceMetric::default());
        }
        let name: String = self.get("database.distance_metric")?;
        name.parse()
    }

    pub fn groq_api_key(&self) -> Result<String> {
        match env::var("GROQ_API_KEY") {
            Ok(key) if !key.trim().is_empty() && key != GROQ_KEY_PLACEHOLDER => Ok(key),
            _ => Err(Error::InvalidConfig(
                "GROQ_API_KEY not set in environment variables".to_string(),
            )),
        }
    }

    pub fn unstructured_api_key(&self) -> String {
        env::var("UNSTRUCTURED_API_KEY").unwrap_or_default()
    }
}

fn env_provider() -> Env {
    Env::prefixed("DOCQA_").split("__")
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
