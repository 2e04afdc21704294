use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};
use std::time::Duration;

// ===== generateContent Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part
{   #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content
{   #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>
  , #[serde(default)]
    pub parts: Vec<Part>
}

#[derive(Debug, Clone, Serialize)]
pub struct Tool
{   pub google_search: GoogleSearch
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GoogleSearch {}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest
{   pub contents: Vec<Content>
  , #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse
{   #[serde(default)]
    pub candidates: Vec<Candidate>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate
{   pub content: Option<Content>
  , pub grounding_metadata: Option<GroundingMetadata>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata
{   #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroundingChunk
{   pub web: Option<crate::request::WebReference>
}

// ===== predict (Imagen) Types =====

#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest
{   pub instances: Vec<PredictInstance>
  , pub parameters: PredictParameters
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictInstance
{   pub prompt: String
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictParameters
{   pub sample_count: u32
  , pub aspect_ratio: String
  , pub output_options: OutputOptions
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions
{   pub mime_type: String
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse
{   #[serde(default)]
    pub predictions: Vec<Prediction>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction
{   pub bytes_base64_encoded: Option<String>
  , pub mime_type: Option<String>
}

// ===== Gemini Client =====

/// Gemini text and Imagen image generation over HTTP
#[derive(Clone)]
pub struct GeminiClient
{   config: crate::config::ChefConfig
  , http_client: reqwest::Client
}

// Keeps the key out of logs.
impl std::fmt::Debug for GeminiClient
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.debug_struct("GeminiClient")
          .field("api_base", &self.config.api_base)
          .field("text_model", &self.config.text_model)
          .field("image_model", &self.config.image_model)
          .finish_non_exhaustive()
    }
}

impl GeminiClient
{   /// Build a client; the key must be non-blank
    pub fn new(
      config: crate::config::ChefConfig
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating GeminiClient for {}", config.api_base);
        if config.api_key.trim().is_empty()
        {   error!("Refusing to build GeminiClient without a key");
            return Err(crate::error::Error::MissingApiKey(
              crate::config::API_KEY_VARS.join(" or ")
            ));
        }

        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;

        Ok(GeminiClient
        {   config
          , http_client
        })
    }

    pub fn config(&self) -> &crate::config::ChefConfig
    {   &self.config
    }

    fn endpoint(&self, model: &str, method: &str) -> String
    {   format!(
          "{}/models/{}:{}",
          self.config.api_base.trim_end_matches('/'),
          model,
          method
        )
    }

    async fn post_json<B, R>(
      &self
    , url: String
    , body: &B
    ) -> Result<R, crate::error::Error>
    where
      B: Serialize + ?Sized
    , R: for<'de> Deserialize<'de>
    {   let response = self.http_client
          .post(&url)
          .header("x-goog-api-key", &self.config.api_key)
          .header("Content-Type", "application/json")
          .json(body)
          .send()
          .await
          .map_err(map_transport_error)?;

        let status = response.status();
        trace!("Gemini response status: {} for {}", status, url);

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {   error!("Gemini rate limit hit");
            return Err(crate::error::Error::RateLimitExceeded);
        }

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Gemini API error {}: {}", status, error_text);
            return Err(crate::error::Error::ApiError(
              format!("Gemini error {}: {}", status, error_text)
            ));
        }

        let body = response.text().await
          .map_err(map_transport_error)?;
        serde_json::from_str(&body).map_err(|e| {
          error!("Parse error: {}", e);
          crate::error::Error::ParseError(e.to_string())
        })
    }
}

fn map_transport_error(e: reqwest::Error) -> crate::error::Error
{   if e.is_timeout()
    {   error!("Gemini request timed out: {}", e);
        crate::error::Error::Timeout
    } else
    {   error!("HTTP error: {}", e);
        crate::error::Error::HttpError(e.to_string())
    }
}

/// Build the generateContent body for a text request
pub fn text_request_body(
  request: &crate::request::TextRequest
) -> GenerateContentRequest
{   GenerateContentRequest
    {   contents: vec![
          Content
          {   role: Some("user".to_string())
            , parts: vec![Part { text: Some(request.prompt.clone()) }]
          }
        ]
      , tools: if request.web_search
        {   vec![Tool { google_search: GoogleSearch {} }]
        } else
        {   vec![]
        }
    }
}

/// Build the Imagen predict body for an image request
pub fn image_request_body(
  request: &crate::request::ImageRequest
) -> PredictRequest
{   PredictRequest
    {   instances: vec![
          PredictInstance { prompt: request.prompt.clone() }
        ]
      , parameters: PredictParameters
        {   sample_count: request.number_of_images
          , aspect_ratio: request.aspect_ratio.clone()
          , output_options: OutputOptions
            {   mime_type: request.output_mime_type.clone()
            }
        }
    }
}

/// Text and citations from the first candidate
pub fn text_response_from(
  response: GenerateContentResponse
) -> Result<crate::request::TextResponse, crate::error::Error>
{   let candidate = response.candidates
      .into_iter()
      .next()
      .ok_or_else(|| {
        error!("No candidates in response");
        crate::error::Error::NoCandidatesInResponse
      })?;

    let text: String = candidate.content
      .map(|c| c.parts)
      .unwrap_or_default()
      .into_iter()
      .filter_map(|p| p.text)
      .collect();

    if text.trim().is_empty()
    {   error!("Candidate carried no text");
        return Err(crate::error::Error::NoCandidatesInResponse);
    }

    let citations = candidate.grounding_metadata
      .map(|m| m.grounding_chunks)
      .unwrap_or_default()
      .into_iter()
      .filter_map(|chunk| chunk.web)
      .collect();

    Ok(crate::request::TextResponse
    {   text
      , citations
    })
}

/// Decode every prediction that carries image bytes
pub fn image_response_from(
  response: PredictResponse
, default_mime_type: &str
) -> Result<crate::request::ImageResponse, crate::error::Error>
{   let mut images = Vec::with_capacity(response.predictions.len());
    for prediction in response.predictions
    {   let Some(encoded) = prediction.bytes_base64_encoded else
        {   continue;
        };
        let bytes = base64::engine::general_purpose::STANDARD
          .decode(encoded.as_bytes())
          .map_err(|e| {
            error!("Image payload is not base64: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;
        images.push(crate::request::GeneratedImage
        {   mime_type: prediction.mime_type
              .unwrap_or_else(|| default_mime_type.to_string())
          , bytes
        });
    }
    Ok(crate::request::ImageResponse { images })
}

#[async_trait]
impl super::ContentService for GeminiClient
{   async fn generate_text(
      &self
    , request: &crate::request::TextRequest
    ) -> Result<crate::request::TextResponse, crate::error::Error>
    {   debug!(
          "Gemini generate_text with {} (web search: {})",
          self.config.text_model,
          request.web_search
        );
        let body = text_request_body(request);
        trace!("Gemini request: {:?}", body);

        let url = self.endpoint(&self.config.text_model, "generateContent");
        let response: GenerateContentResponse
          = self.post_json(url, &body).await?;
        text_response_from(response)
    }

    async fn generate_images(
      &self
    , request: &crate::request::ImageRequest
    ) -> Result<crate::request::ImageResponse, crate::error::Error>
    {   debug!("Imagen generate_images with {}", self.config.image_model);
        let body = image_request_body(request);
        trace!("Imagen request: {:?}", body);

        let url = self.endpoint(&self.config.image_model, "predict");
        let response: PredictResponse
          = self.post_json(url, &body).await?;
        let images = image_response_from(
          response,
          &request.output_mime_type
        )?;
        debug!("Imagen returned {} image(s)", images.images.len());
        Ok(images)
    }

    fn provider_name(&self) -> &'static str
    {   "gemini"
    }
}
