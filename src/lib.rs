pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod prompt;
pub mod extract;
pub mod orchestrator;
pub mod session;
pub mod client;
use base64::Engine as _;
use serde::{Deserialize, Serialize, Serializer};

pub use client::ChefBackend;
pub use config::ChefConfig;
pub use error::{Error, Stage};
pub use orchestrator::generate_recipes;
pub use providers::ContentService;
pub use session::KitchenSession;

/*

pantrychef: async-only rust library that turns the ingredients you
have into recipes. one text call to gemini (with google search
grounding) for the recipes, then one imagen call per recipe for a
photo. image failures never sink the batch.

pantrychef/
├── Cargo.toml
├── src/
│   ├── lib.rs           # Re-exports, data model, backend channels
│   ├── error.rs         # Error type and failure stages
│   ├── config.rs        # Credentials and endpoints from env
│   ├── request.rs       # Provider-neutral text/image shapes
│   ├── prompt.rs        # Recipe and photo prompts
│   ├── extract.rs       # JSON array extraction from model text
│   ├── orchestrator.rs  # generate_recipes
│   ├── session.rs       # Transient kitchen state
│   ├── client.rs        # Backend task
│   ├── providers/
│   │   ├── mod.rs       # ContentService trait
│   │   ├── gemini.rs    # Gemini + Imagen over HTTP
│   │   └── fake.rs      # Scripted service for tests
│   └── bin/pantrychef.rs
└── tests/

*/

/// PANTRYCHEF API INTERFACE:

// ===== GenerateRecipes =====

pub type GenerateRecipesReply = Result<Vec<Recipe>, crate::error::Error>;
pub type GenerateRecipesReplySender
  = tokio::sync::mpsc::UnboundedSender<GenerateRecipesReply>;

pub struct GenerateRecipesArgs
{   pub request: GenerationRequest
  , pub reply: GenerateRecipesReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== ChefHand (sender side) =====

pub struct ChefHand
{   pub generate_recipes_tx
      : tokio::sync::mpsc::UnboundedSender<GenerateRecipesArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== ChefFoot (receiver side) =====

pub struct ChefFoot
{   pub generate_recipes_rx
      : tokio::sync::mpsc::UnboundedReceiver<GenerateRecipesArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// PANTRYCHEF STRUCTURES:

/// Something the user has in the kitchen.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ingredient
{   /// Display name, never blank
    pub name: String
  , /// Free-form amount ("3", "2 cloves"); may be empty
    pub quantity: String
}

impl Ingredient
{   pub fn new(
      name: impl Into<String>
    , quantity: impl Into<String>
    ) -> Self
    {   Ingredient
        {   name: name.into()
          , quantity: quantity.into()
        }
    }
}

/// A web page the model cited while answering
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceLink
{   pub uri: String
  , pub title: String
}

/// Generated photo attached to a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeImage
{   pub mime_type: String
  , #[serde(rename = "imageBase64", serialize_with = "serialize_base64")]
    pub bytes: Vec<u8>
}

impl RecipeImage
{   /// Encode the image for transport (e.g. a `data:` URL)
    pub fn to_base64(&self) -> String
    {   base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>` for embedding in markup
    pub fn data_url(&self) -> String
    {   format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

fn serialize_base64<S>(bytes: &[u8], serializer: S)
  -> Result<S::Ok, S::Error>
where
  S: Serializer
{   serializer.serialize_str(
      &base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// One generated recipe, ready for display.
/// Every recipe in a batch shares the same `source_links`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe
{   pub recipe_name: String
  , pub description: String
  , pub ingredients: Vec<String>
  , pub instructions: Vec<String>
  , pub calories: String
  , pub time_taken: String
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub source_links: Option<Vec<SourceLink>>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<RecipeImage>
}

/// Input to a single recipe generation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenerationRequest
{   pub ingredients: Vec<Ingredient>
  , /// Preferred kind of dish; blank means no preference
    pub desired_dish: String
  , /// Forbid anything beyond the listed ingredients, water, salt
    /// and pepper
    pub strict_ingredients: bool
}

impl GenerationRequest
{   /// Build a request, rejecting an empty ingredient list
    pub fn new(
      ingredients: Vec<Ingredient>
    , desired_dish: impl Into<String>
    , strict_ingredients: bool
    ) -> Result<Self, crate::error::Error>
    {   if ingredients.is_empty()
        {   return Err(crate::error::Error::NoIngredients);
        }
        Ok(GenerationRequest
        {   ingredients
          , desired_dish: desired_dish.into()
          , strict_ingredients
        })
    }
}
