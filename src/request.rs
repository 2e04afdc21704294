//! Provider-neutral request and response types

use serde::{Deserialize, Serialize};

/// Text generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRequest
{   /// The prompt text
    pub prompt: String
  , /// Let the model ground its answer with web search
    pub web_search: bool
}

/// A web reference returned as citation metadata.
/// Either field may be missing; callers filter incomplete ones.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WebReference
{   pub uri: Option<String>
  , pub title: Option<String>
}

/// Text generation response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextResponse
{   /// Raw generated text
    pub text: String
  , /// Web references in response order, empty when not grounded
    pub citations: Vec<WebReference>
}

/// Image generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest
{   pub prompt: String
  , pub number_of_images: u32
  , pub output_mime_type: String
  , /// e.g. "16:9"
    pub aspect_ratio: String
}

/// A single decoded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage
{   pub mime_type: String
  , pub bytes: Vec<u8>
}

/// Image generation response; may hold no images
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageResponse
{   pub images: Vec<GeneratedImage>
}
