use std::fmt;

/// Where a recipe generation call gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage
{   AwaitingText
  , Parsing
  , Validating
}

impl fmt::Display for Stage
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   let name = match self
        {   Stage::AwaitingText => "awaiting text"
          , Stage::Parsing => "parsing"
          , Stage::Validating => "validating"
        };
        write!(f, "{}", name)
    }
}

/// Custom error type for pantrychef operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// API key is missing from the environment
    MissingApiKey(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Generation was requested with an empty ingredient list
    NoIngredients
  , /// HTTP request error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// Rate limit exceeded
    RateLimitExceeded
  , /// Timeout error
    Timeout
  , /// Failed to parse API response or recipe payload
    ParseError(String)
  , /// Recipe payload parsed but is missing required fields
    ValidationError(String)
  , /// No candidates in API response
    NoCandidatesInResponse
  , /// Recipe generation failed; the cause is kept for diagnostics
    GenerationFailed
    {   stage: Stage
      , cause: Box<Error>
    }
  , /// Generic error
    Other(String)
}

impl Error
{   /// Wrap a diagnostic error into the single caller-facing failure
    pub fn generation_failed(stage: Stage, cause: Error) -> Self
    {   Error::GenerationFailed
        {   stage
          , cause: Box::new(cause)
        }
    }

    /// The underlying error for a `GenerationFailed`, otherwise self
    pub fn root_cause(&self) -> &Error
    {   match self
        {   Error::GenerationFailed { cause, .. } => cause.root_cause()
          , other => other
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(var) => {
              write!(f, "Missing API key: {} not set", var)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::NoIngredients => {
              write!(f, "At least one ingredient is required")
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::RateLimitExceeded => {
              write!(f, "API rate limit exceeded")
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::ValidationError(msg) => {
              write!(f, "Invalid recipe format: {}", msg)
            }
          , Error::NoCandidatesInResponse => {
              write!(f, "API response contained no candidates")
            }
          , Error::GenerationFailed { .. } => {
              write!(f,
                "Failed to generate recipes from the Gemini API"
              )
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::ParseError(e.to_string())
    }
}
