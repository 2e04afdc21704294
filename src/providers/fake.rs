//! Scripted content service for tests.
//!
//! Text answers are fixed up front. Image outcomes are matched by
//! checking whether the image prompt contains a registered substring
//! (normally the recipe name); unmatched prompts get the default image
//! or an empty response.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::error::Error;
use crate::request::{
  GeneratedImage, ImageRequest, ImageResponse, TextRequest, TextResponse,
  WebReference,
};

#[derive(Debug, Clone)]
enum ImageOutcome
{   Image(GeneratedImage)
  , Nothing
  , Fail(Error)
}

/// A fake content service; records every request it sees.
#[derive(Debug)]
pub struct FakeContentService
{   text_reply: Result<TextResponse, Error>
  , image_outcomes: Vec<(String, ImageOutcome)>
  , image_delays: HashMap<String, Duration>
  , default_image: Option<GeneratedImage>
  , text_requests: Mutex<Vec<TextRequest>>
  , image_requests: Mutex<Vec<ImageRequest>>
}

impl Default for FakeContentService
{   fn default() -> Self
    {   FakeContentService::with_text("[]")
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T>
{   m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeContentService
{   /// Answer every text request with `text` and no citations
    pub fn with_text(text: &str) -> Self
    {   FakeContentService::with_text_response(TextResponse
        {   text: text.to_string()
          , citations: vec![]
        })
    }

    /// Answer every text request with `response`
    pub fn with_text_response(response: TextResponse) -> Self
    {   FakeContentService
        {   text_reply: Ok(response)
          , image_outcomes: vec![]
          , image_delays: HashMap::new()
          , default_image: None
          , text_requests: Mutex::new(vec![])
          , image_requests: Mutex::new(vec![])
        }
    }

    /// Fail every text request with `error`
    pub fn with_text_error(error: Error) -> Self
    {   let mut fake = FakeContentService::default();
        fake.text_reply = Err(error);
        fake
    }

    /// Attach citation metadata to the scripted text answer
    pub fn citations(mut self, citations: Vec<WebReference>) -> Self
    {   if let Ok(response) = &mut self.text_reply
        {   response.citations = citations;
        }
        self
    }

    /// Image returned for prompts no rule matches
    pub fn default_image(mut self, bytes: &[u8]) -> Self
    {   self.default_image = Some(jpeg(bytes));
        self
    }

    /// Return `bytes` for image prompts containing `prompt_contains`
    pub fn image_for(mut self, prompt_contains: &str, bytes: &[u8]) -> Self
    {   self.image_outcomes.push((
          prompt_contains.to_string(),
          ImageOutcome::Image(jpeg(bytes))
        ));
        self
    }

    /// Answer with zero images for prompts containing `prompt_contains`
    pub fn no_image_for(mut self, prompt_contains: &str) -> Self
    {   self.image_outcomes.push((
          prompt_contains.to_string(),
          ImageOutcome::Nothing
        ));
        self
    }

    /// Fail image requests whose prompt contains `prompt_contains`
    pub fn fail_image_for(
      mut self
    , prompt_contains: &str
    , error: Error
    ) -> Self
    {   self.image_outcomes.push((
          prompt_contains.to_string(),
          ImageOutcome::Fail(error)
        ));
        self
    }

    /// Delay image answers for prompts containing `prompt_contains`
    pub fn delay_image_for(
      mut self
    , prompt_contains: &str
    , delay: Duration
    ) -> Self
    {   self.image_delays.insert(prompt_contains.to_string(), delay);
        self
    }

    /// Text requests seen so far
    pub fn text_requests(&self) -> Vec<TextRequest>
    {   lock(&self.text_requests).clone()
    }

    /// Image requests seen so far, in arrival order
    pub fn image_requests(&self) -> Vec<ImageRequest>
    {   lock(&self.image_requests).clone()
    }

    fn outcome_for(&self, prompt: &str) -> ImageOutcome
    {   self.image_outcomes
          .iter()
          .find(|(needle, _)| prompt.contains(needle.as_str()))
          .map(|(_, outcome)| outcome.clone())
          .unwrap_or_else(|| match &self.default_image
          {   Some(image) => ImageOutcome::Image(image.clone())
            , None => ImageOutcome::Nothing
          })
    }
}

fn jpeg(bytes: &[u8]) -> GeneratedImage
{   GeneratedImage
    {   mime_type: "image/jpeg".to_string()
      , bytes: bytes.to_vec()
    }
}

#[async_trait]
impl super::ContentService for FakeContentService
{   async fn generate_text(
      &self
    , request: &TextRequest
    ) -> Result<TextResponse, Error>
    {   lock(&self.text_requests).push(request.clone());
        self.text_reply.clone()
    }

    async fn generate_images(
      &self
    , request: &ImageRequest
    ) -> Result<ImageResponse, Error>
    {   lock(&self.image_requests).push(request.clone());

        let delay = self.image_delays
          .iter()
          .find(|(needle, _)| request.prompt.contains(needle.as_str()))
          .map(|(_, delay)| *delay);
        if let Some(delay) = delay
        {   tokio::time::sleep(delay).await;
        }

        match self.outcome_for(&request.prompt)
        {   ImageOutcome::Image(image) => Ok(ImageResponse
            {   images: vec![image]
            })
          , ImageOutcome::Nothing => Ok(ImageResponse::default())
          , ImageOutcome::Fail(error) => Err(error)
        }
    }

    fn provider_name(&self) -> &'static str
    {   "fake"
    }
}
