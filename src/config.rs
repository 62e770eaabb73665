use crate::error::{Error, Result};
use std::path::PathBuf;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const MODEL_ENV: &str = "YTNOTES_MODEL";
pub const FONT_ENV: &str = "YTNOTES_FONT";

const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Process-wide configuration, read from the environment once at startup and
/// passed into the service constructors. Immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the Google generative-language service.
    pub api_key: String,
    /// Gemini model name, without the `models/` prefix.
    pub model: String,
    /// TrueType font used by the word-cloud renderer. When unset the renderer
    /// tries a list of common system font locations.
    pub font_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = var(API_KEY_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(Error::MissingApiKey {
                env_var: API_KEY_ENV,
            })?;

        let model = var(MODEL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let font_path = var(FONT_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_key,
            model,
            font_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn requires_api_key() {
        let env = vars(&[]);
        let err = Config::from_vars(|name| env.get(name).cloned()).unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn blank_api_key_is_missing() {
        let env = vars(&[(API_KEY_ENV, "   ")]);
        assert!(Config::from_vars(|name| env.get(name).cloned()).is_err());
    }

    #[test]
    fn defaults_model_when_unset() {
        let env = vars(&[(API_KEY_ENV, "k")]);
        let config = Config::from_vars(|name| env.get(name).cloned()).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.font_path.is_none());
    }

    #[test]
    fn honors_overrides() {
        let env = vars(&[
            (API_KEY_ENV, "k"),
            (MODEL_ENV, "gemini-1.5-pro"),
            (FONT_ENV, "/tmp/font.ttf"),
        ]);
        let config = Config::from_vars(|name| env.get(name).cloned()).unwrap();
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.font_path.as_deref(), Some(std::path::Path::new("/tmp/font.ttf")));
    }
}
