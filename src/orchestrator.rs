//! Recipe generation: prompt, text call, parse, validate, then one
//! photo per recipe.
//!
//! Everything up to validation is all-or-nothing. Image enrichment is
//! per-recipe and never fails the batch.

use futures_util::future::join_all;
use log::{debug, error, info, warn};
use serde_json::{Map, Value};

use crate::error::{Error, Stage};
use crate::providers::ContentService;
use crate::request::{ImageRequest, TextRequest, WebReference};
use crate::{GenerationRequest, Recipe, RecipeImage, SourceLink};

pub const IMAGE_MIME_TYPE: &str = "image/jpeg";
pub const IMAGE_ASPECT_RATIO: &str = "16:9";

/// A recipe as parsed from the model, before enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft
{   pub recipe_name: String
  , pub description: String
  , pub ingredients: Vec<String>
  , pub instructions: Vec<String>
  , pub calories: String
  , pub time_taken: String
}

impl RecipeDraft
{   fn finish(
      self
    , source_links: Option<Vec<SourceLink>>
    , image: Option<RecipeImage>
    ) -> Recipe
    {   Recipe
        {   recipe_name: self.recipe_name
          , description: self.description
          , ingredients: self.ingredients
          , instructions: self.instructions
          , calories: self.calories
          , time_taken: self.time_taken
          , source_links
          , image
        }
    }
}

/// Generate recipes for `request` using `service`.
///
/// Returns `Error::NoIngredients` untouched for an empty ingredient
/// list. Any failure of the text call, extraction, parsing or
/// validation is logged and returned as `Error::GenerationFailed`.
/// On success the recipes keep the order the model gave them.
pub async fn generate_recipes(
  service: &dyn ContentService
, request: &GenerationRequest
) -> Result<Vec<Recipe>, Error>
{   if request.ingredients.is_empty()
    {   error!("generate_recipes called without ingredients");
        return Err(Error::NoIngredients);
    }

    match try_generate(service, request).await
    {   Ok(recipes) => {
          info!(
            "Generated {} recipes via {}",
            recipes.len(),
            service.provider_name()
          );
          Ok(recipes)
        }
      , Err(e) => {
          if let Error::GenerationFailed { stage, cause } = &e
          {   error!("Error generating recipes while {}: {}", stage, cause);
          }
          Err(e)
        }
    }
}

async fn try_generate(
  service: &dyn ContentService
, request: &GenerationRequest
) -> Result<Vec<Recipe>, Error>
{   debug!("Prompting with {} ingredients", request.ingredients.len());
    let prompt = crate::prompt::build_recipe_prompt(
      &request.ingredients,
      &request.desired_dish,
      request.strict_ingredients
    );

    debug!("Awaiting text from {}", service.provider_name());
    let response = service
      .generate_text(&TextRequest
      {   prompt
        , web_search: true
      })
      .await
      .map_err(|e| Error::generation_failed(Stage::AwaitingText, e))?;

    debug!("Parsing {} bytes of response text", response.text.len());
    let value = parse_recipe_payload(&response.text)
      .map_err(|e| Error::generation_failed(Stage::Parsing, e))?;

    let drafts = validate_recipes(&value)
      .map_err(|e| Error::generation_failed(Stage::Validating, e))?;

    let links = collect_source_links(&response.citations);
    let source_links = if links.is_empty() { None } else { Some(links) };
    debug!(
      "Validated {} recipes with {} source links",
      drafts.len(),
      source_links.as_ref().map(Vec::len).unwrap_or(0)
    );

    debug!("Awaiting {} images", drafts.len());
    let images = join_all(
      drafts
        .iter()
        .map(|draft| fetch_image(service, &draft.recipe_name))
    ).await;

    Ok(drafts
      .into_iter()
      .zip(images)
      .map(|(draft, image)| draft.finish(source_links.clone(), image))
      .collect())
}

/// Locate and parse the JSON array in raw model output
pub fn parse_recipe_payload(text: &str) -> Result<Value, Error>
{   let text = text.trim();
    let span = crate::extract::extract_json_array(text)
      .ok_or_else(|| {
        error!("Raw response: {}", text);
        Error::ParseError(
          "Could not find a valid JSON array in the response".to_string()
        )
      })?;
    Ok(serde_json::from_str(span)?)
}

/// Check every element and turn the array into drafts.
///
/// Only `recipeName`, `calories` and `timeTaken` are required. One bad
/// element rejects the whole array.
pub fn validate_recipes(value: &Value) -> Result<Vec<RecipeDraft>, Error>
{   let items = value.as_array().ok_or_else(|| {
      Error::ValidationError("response is not a JSON array".to_string())
    })?;

    items
      .iter()
      .enumerate()
      .map(|(index, item)| -> Result<RecipeDraft, Error> {
        let fields = item.as_object().ok_or_else(|| {
          Error::ValidationError(
            format!("recipe {} is not an object", index)
          )
        })?;
        Ok(RecipeDraft
        {   recipe_name: required_text(fields, "recipeName", index)?
          , calories: required_text(fields, "calories", index)?
          , time_taken: required_text(fields, "timeTaken", index)?
          , description: optional_text(fields, "description")
          , ingredients: text_lines(fields, "ingredients")
          , instructions: text_lines(fields, "instructions")
        })
      })
      .collect()
}

fn required_text(
  fields: &Map<String, Value>
, name: &str
, index: usize
) -> Result<String, Error>
{   match fields.get(name)
    {   Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone())
      , Some(Value::Number(n)) => Ok(n.to_string())
      , _ => Err(Error::ValidationError(
          format!("recipe {} is missing {}", index, name)
        ))
    }
}

fn optional_text(fields: &Map<String, Value>, name: &str) -> String
{   match fields.get(name)
    {   Some(Value::String(s)) => s.clone()
      , Some(Value::Null) | None => String::new()
      , Some(other) => other.to_string()
    }
}

fn text_lines(fields: &Map<String, Value>, name: &str) -> Vec<String>
{   match fields.get(name)
    {   Some(Value::Array(lines)) => lines
          .iter()
          .map(|line| match line
          {   Value::String(s) => s.clone()
            , other => other.to_string()
          })
          .collect()
      , Some(Value::String(s)) => vec![s.clone()]
      , _ => vec![]
    }
}

/// Complete web references (uri and title both present), in order
pub fn collect_source_links(citations: &[WebReference]) -> Vec<SourceLink>
{   citations
      .iter()
      .filter_map(|web| match (&web.uri, &web.title)
      {   (Some(uri), Some(title))
            if !uri.is_empty() && !title.is_empty() => Some(SourceLink
            {   uri: uri.clone()
              , title: title.clone()
            })
        , _ => None
      })
      .collect()
}

/// Request one photo; every failure turns into `None`
async fn fetch_image(
  service: &dyn ContentService
, recipe_name: &str
) -> Option<RecipeImage>
{   let request = ImageRequest
    {   prompt: crate::prompt::build_image_prompt(recipe_name)
      , number_of_images: 1
      , output_mime_type: IMAGE_MIME_TYPE.to_string()
      , aspect_ratio: IMAGE_ASPECT_RATIO.to_string()
    };

    match service.generate_images(&request).await
    {   Ok(response) => {
          let image = response.images.into_iter().next();
          if image.is_none()
          {   warn!("No image returned for recipe: {}", recipe_name);
          }
          image.map(|image| RecipeImage
          {   mime_type: image.mime_type
            , bytes: image.bytes
          })
        }
      , Err(e) => {
          warn!(
            "Failed to generate image for recipe: {}: {}",
            recipe_name, e
          );
          None
        }
    }
}
