//! Transient state for one person's kitchen: what they have, what they
//! would like, and the last batch of recipes. Nothing here is persisted.

use log::debug;

pub const NO_INGREDIENTS_MESSAGE: &str
  = "Please add at least one ingredient.";
pub const GENERATION_FAILED_MESSAGE: &str
  = "Sorry, we couldn't generate recipes at this time. Please try again later.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KitchenSession
{   ingredients: Vec<crate::Ingredient>
  , desired_dish: String
  , strict_ingredients: bool
  , recipes: Vec<crate::Recipe>
  , is_loading: bool
  , error: Option<String>
}

impl KitchenSession
{   pub fn new() -> Self
    {   KitchenSession::default()
    }

    pub fn ingredients(&self) -> &[crate::Ingredient]
    {   &self.ingredients
    }

    pub fn desired_dish(&self) -> &str
    {   &self.desired_dish
    }

    pub fn strict_ingredients(&self) -> bool
    {   self.strict_ingredients
    }

    pub fn recipes(&self) -> &[crate::Recipe]
    {   &self.recipes
    }

    pub fn is_loading(&self) -> bool
    {   self.is_loading
    }

    /// User-facing message from the last failed attempt
    pub fn error(&self) -> Option<&str>
    {   self.error.as_deref()
    }

    /// Add an ingredient. Both fields are trimmed; blank names and
    /// names already present (ignoring case) are rejected.
    pub fn add_ingredient(&mut self, name: &str, quantity: &str) -> bool
    {   let name = name.trim();
        if name.is_empty()
        {   return false;
        }
        let lowered = name.to_lowercase();
        if self.ingredients.iter().any(|i| i.name.to_lowercase() == lowered)
        {   debug!("Ignoring duplicate ingredient: {}", name);
            return false;
        }
        self.ingredients.push(crate::Ingredient::new(name, quantity.trim()));
        true
    }

    /// Remove the ingredient with exactly this name
    pub fn remove_ingredient(&mut self, name: &str) -> bool
    {   let before = self.ingredients.len();
        self.ingredients.retain(|i| i.name != name);
        before != self.ingredients.len()
    }

    pub fn set_desired_dish(&mut self, dish: &str)
    {   self.desired_dish = dish.to_string();
    }

    pub fn set_strict_ingredients(&mut self, strict: bool)
    {   self.strict_ingredients = strict;
    }

    /// Start a generation: clears the previous batch and error and
    /// returns the request to run. With no ingredients the session
    /// records the hint message and nothing is cleared.
    pub fn begin_generation(
      &mut self
    ) -> Result<crate::GenerationRequest, crate::error::Error>
    {   let request = crate::GenerationRequest::new(
          self.ingredients.clone(),
          self.desired_dish.clone(),
          self.strict_ingredients
        ).map_err(|e| {
          self.error = Some(NO_INGREDIENTS_MESSAGE.to_string());
          e
        })?;

        self.is_loading = true;
        self.error = None;
        self.recipes.clear();
        Ok(request)
    }

    /// Record the outcome of a generation started with
    /// `begin_generation`; the batch is replaced, never merged.
    pub fn finish_generation(
      &mut self
    , result: Result<Vec<crate::Recipe>, crate::error::Error>
    )
    {   self.is_loading = false;
        match result
        {   Ok(recipes) => {
              debug!("Session received {} recipes", recipes.len());
              self.recipes = recipes;
            }
          , Err(e) => {
              debug!("Session generation failed: {}", e);
              self.recipes.clear();
              self.error = Some(GENERATION_FAILED_MESSAGE.to_string());
            }
        }
    }
}
