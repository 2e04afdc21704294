//! Generative content service implementations

pub mod gemini;
pub mod fake;

// Re-export for convenience
pub use gemini::GeminiClient;
pub use fake::FakeContentService;

use async_trait::async_trait;
use std::fmt;

/// A remote service that can write text and draw pictures.
///
/// Implementations must be safe to share across tasks; the
/// orchestrator issues image requests concurrently against one
/// instance.
#[async_trait]
pub trait ContentService: Send + Sync + fmt::Debug
{   /// Generate text for a prompt, optionally grounded by web search
    async fn generate_text(
      &self
    , request: &crate::request::TextRequest
    ) -> Result<crate::request::TextResponse, crate::error::Error>;

    /// Generate zero or more images for a prompt
    async fn generate_images(
      &self
    , request: &crate::request::ImageRequest
    ) -> Result<crate::request::ImageResponse, crate::error::Error>;

    /// Short provider name for logs (e.g. "gemini", "fake")
    fn provider_name(&self) -> &'static str;
}
