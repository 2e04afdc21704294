//! pantrychef [--dish TEXT] [--strict] [--out DIR] NAME[:QUANTITY]...
//!
//! Reads the Gemini key from API_KEY (or GEMINI_API_KEY), asks for
//! recipes and prints them. With --out, recipe photos are written to DIR.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use clap::Parser;
use log::{debug, error};

use pantrychef::{ChefBackend, ChefConfig, KitchenSession, Recipe};

/// A kitchen item given as NAME or NAME:QUANTITY
#[derive(Debug, Clone)]
struct IngredientArg
{   name: String
  , quantity: String
}

fn parse_ingredient(item: &str) -> Result<IngredientArg, String>
{   let (name, quantity) = item.split_once(':').unwrap_or((item, ""));
    if name.trim().is_empty()
    {   return Err(format!("ingredient needs a name: {:?}", item));
    }
    Ok(IngredientArg
    {   name: name.to_string()
      , quantity: quantity.to_string()
    })
}

#[derive(Parser)]
#[command(name = "pantrychef")]
#[command(about = "Recipes from what is in your kitchen", long_about = None)]
struct Cli
{   /// Ingredients as NAME or NAME:QUANTITY
    #[arg(required = true, value_parser = parse_ingredient)]
    ingredients: Vec<IngredientArg>
  , /// Kind of dish you would like (e.g. "a healthy soup")
    #[arg(long, default_value = "")]
    dish: String
  , /// Use only the listed ingredients (plus water, salt, pepper)
    #[arg(long)]
    strict: bool
  , /// Write recipe photos to this directory
    #[arg(long)]
    out: Option<PathBuf>
}

fn print_recipe(index: usize, recipe: &Recipe)
{   println!("{}. {}", index + 1, recipe.recipe_name);
    println!("   {}", recipe.description);
    println!("   {} | {}", recipe.time_taken, recipe.calories);
    println!("   Ingredients:");
    for line in &recipe.ingredients
    {   println!("     - {}", line);
    }
    println!("   Instructions:");
    for (step, line) in recipe.instructions.iter().enumerate()
    {   println!("     {}. {}", step + 1, line);
    }
    if let Some(links) = &recipe.source_links
    {   println!("   Sources:");
        for link in links
        {   println!("     - {} <{}>", link.title, link.uri);
        }
    }
    if recipe.image.is_none()
    {   println!("   (no image)");
    }
    println!();
}

fn image_file_name(index: usize, recipe: &Recipe) -> String
{   let slug: String = recipe.recipe_name
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
      .collect();
    let ext = match recipe.image.as_ref().map(|i| i.mime_type.as_str())
    {   Some("image/png") => "png"
      , _ => "jpg"
    };
    format!("{:02}-{}.{}", index + 1, slug.trim_matches('-'), ext)
}

async fn write_images(
  dir: &Path
, recipes: &[Recipe]
) -> std::io::Result<()>
{   tokio::fs::create_dir_all(dir).await?;
    for (index, recipe) in recipes.iter().enumerate()
    {   if let Some(image) = &recipe.image
        {   let path = dir.join(image_file_name(index, recipe));
            tokio::fs::write(&path, &image.bytes).await?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::init();

    let cli = Cli::parse();

    // No key, no backend: fail before anything else happens.
    let config = match ChefConfig::from_env()
    {   Ok(config) => config
      , Err(e) => {
          eprintln!("{}", e);
          return ExitCode::from(2);
        }
    };

    let mut session = KitchenSession::new();
    for item in &cli.ingredients
    {   if !session.add_ingredient(&item.name, &item.quantity)
        {   debug!("Skipped duplicate ingredient {:?}", item.name);
        }
    }
    session.set_desired_dish(&cli.dish);
    session.set_strict_ingredients(cli.strict);

    let request = match session.begin_generation()
    {   Ok(request) => request
      , Err(_) => {
          eprintln!("{}", session.error().unwrap_or_default());
          return ExitCode::from(2);
        }
    };

    let backend = match ChefBackend::new(config)
    {   Ok(backend) => backend
      , Err(e) => {
          eprintln!("{}", e);
          return ExitCode::from(2);
        }
    };

    let result = match backend.generate_recipes(request).await
    {   Ok(mut reply_rx) => reply_rx.recv().await
          .unwrap_or_else(|| Err(pantrychef::Error::Other(
            "Backend dropped the request".to_string()
          )))
      , Err(e) => Err(e)
    };
    session.finish_generation(result);
    let _ = backend.shutdown().await;

    if let Some(msg) = session.error()
    {   eprintln!("{}", msg);
        return ExitCode::FAILURE;
    }

    for (index, recipe) in session.recipes().iter().enumerate()
    {   print_recipe(index, recipe);
    }

    if let Some(dir) = &cli.out
    {   if let Err(e) = write_images(dir, session.recipes()).await
        {   error!("Failed to write images: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
