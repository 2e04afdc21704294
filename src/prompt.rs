//! Prompt construction for recipe text and recipe photos

use log::trace;

/// How many recipes the model is asked for
pub const RECIPE_COUNT: usize = 3;

/// Ingredients a strict request still assumes are on hand
pub const STRICT_ALLOWANCE: [&str; 3] = ["water", "salt", "pepper"];

/// Staples allowed when the request is not strict
pub const PANTRY_STAPLES: [&str; 6]
  = ["oil", "salt", "pepper", "flour", "sugar", "water"];

const OUTPUT_CONTRACT: &str = r#"
Use your web search tool to find relevant links for cooking techniques, ingredient information, or similar online recipes that could be helpful.
Ensure the recipes are clear, concise, and easy for a home cook to follow.
CRITICALLY IMPORTANT: The final output must be a single, valid JSON array of recipe objects. Do not include any other text, markdown, or explanations outside of the JSON array. The JSON schema should be:
[
  {
    "recipeName": "string",
    "description": "string",
    "calories": "string (e.g., 'Approx. 500 kcal per serving')",
    "timeTaken": "string (e.g., '45 minutes')",
    "ingredients": ["string"],
    "instructions": ["string"]
  }
]
"#;

/// `name (quantity)` for every ingredient, in order, comma separated
pub fn ingredient_list(ingredients: &[crate::Ingredient]) -> String
{   ingredients
      .iter()
      .map(|i| format!("{} ({})", i.name, i.quantity))
      .collect::<Vec<_>>()
      .join(", ")
}

/// Build the recipe generation prompt.
///
/// A blank (or whitespace-only) `desired_dish` adds no preference
/// clause. `strict` chooses between the closed ingredient set and the
/// pantry-staples allowance.
pub fn build_recipe_prompt(
  ingredients: &[crate::Ingredient]
, desired_dish: &str
, strict: bool
) -> String
{   let mut prompt = format!(
      "You are a creative chef. Generate {} diverse and delicious recipes \
       that primarily use the following ingredients I have: {}.",
      RECIPE_COUNT,
      ingredient_list(ingredients)
    );

    let dish = desired_dish.trim();
    if !dish.is_empty()
    {   prompt.push_str(&format!(
          " I would prefer to make something like a \"{}\". \
           Please prioritize recipes of that type if possible.",
          dish
        ));
    }

    if strict
    {   prompt.push_str(&format!(
          " You MUST ONLY use the ingredients I have provided. \
           You may assume I also have {}. \
           Do not include any other ingredients.",
          human_list(&STRICT_ALLOWANCE)
        ));
    } else
    {   prompt.push_str(&format!(
          " You can include common pantry staples like {} if necessary.",
          human_list(&PANTRY_STAPLES)
        ));
    }

    prompt.push_str(OUTPUT_CONTRACT);
    trace!("Recipe prompt: {}", prompt);
    prompt
}

/// Prompt for the photo of a single recipe
pub fn build_image_prompt(recipe_name: &str) -> String
{   format!(
      "A delicious, professionally photographed, appetizing photo of \
       \"{}\". High quality, food photography.",
      recipe_name
    )
}

/// "a, b, and c"
fn human_list(items: &[&str]) -> String
{   match items
    {   [] => String::new()
      , [only] => only.to_string()
      , [first, second] => format!("{} and {}", first, second)
      , [rest @ .., last] => format!("{}, and {}", rest.join(", "), last)
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn human_list_uses_serial_comma()
    {   assert_eq!(human_list(&[]), "");
        assert_eq!(human_list(&["water"]), "water");
        assert_eq!(human_list(&["salt", "pepper"]), "salt and pepper");
        assert_eq!(
          human_list(&STRICT_ALLOWANCE),
          "water, salt, and pepper"
        );
    }

    #[test]
    fn image_prompt_quotes_the_name()
    {   let prompt = build_image_prompt("Garlic Chicken");
        assert!(prompt.contains("appetizing photo of \"Garlic Chicken\""));
        assert!(prompt.ends_with("food photography."));
    }
}
