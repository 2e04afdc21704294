//! Configuration for the Gemini-backed recipe generator

use serde::{Deserialize, Serialize};
use log::{debug, error};

pub const DEFAULT_API_BASE: &str
  = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variables read by `ChefConfig::from_env`, in lookup order
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// Gemini connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChefConfig
{   /// API key sent with every request
    pub api_key: String
  , /// API base URL
    pub api_base: String
  , /// Model used for recipe text
    pub text_model: String
  , /// Model used for recipe photos
    pub image_model: String
  , /// Per-request timeout in seconds
    pub timeout_secs: u64
}

impl ChefConfig
{   /// Config with default endpoints and models for the given key
    pub fn new(api_key: impl Into<String>) -> Self
    {   ChefConfig
        {   api_key: api_key.into()
          , api_base: DEFAULT_API_BASE.to_string()
          , text_model: DEFAULT_TEXT_MODEL.to_string()
          , image_model: DEFAULT_IMAGE_MODEL.to_string()
          , timeout_secs: DEFAULT_TIMEOUT_SECS
        }
    }

    /// Load configuration from the process environment.
    ///
    /// Fails with `MissingApiKey` when neither `API_KEY` nor
    /// `GEMINI_API_KEY` holds a non-blank value, so no request can be
    /// attempted without credentials.
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   let api_key = API_KEY_VARS
          .into_iter()
          .filter_map(|name| lookup(name))
          .map(|value| value.trim().to_string())
          .find(|value| !value.is_empty())
          .ok_or_else(|| {
            error!("No Gemini API key in environment");
            crate::error::Error::MissingApiKey(
              API_KEY_VARS.join(" or ")
            )
          })?;

        let mut config = ChefConfig::new(api_key);

        if let Some(base) = lookup("GEMINI_API_BASE")
        {   config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("GEMINI_TEXT_MODEL")
        {   config.text_model = model;
        }
        if let Some(model) = lookup("GEMINI_IMAGE_MODEL")
        {   config.image_model = model;
        }
        if let Some(secs) = lookup("GEMINI_TIMEOUT_SECS")
        {   config.timeout_secs = secs.trim().parse().map_err(|_| {
              crate::error::Error::InvalidConfiguration(
                format!("GEMINI_TIMEOUT_SECS is not a number: {}", secs)
              )
            })?;
        }

        debug!(
          "Loaded config: base={} text={} image={} timeout={}s",
          config.api_base,
          config.text_model,
          config.image_model,
          config.timeout_secs
        );
        Ok(config)
    }
}
