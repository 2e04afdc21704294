use std::sync::Arc;
use std::time::Duration;

use pantrychef::error::{Error, Stage};
use pantrychef::providers::{ContentService, FakeContentService};
use pantrychef::request::{TextResponse, WebReference};
use pantrychef::{generate_recipes, GenerationRequest, Ingredient};

const THREE_RECIPES: &str = r#"[
  {
    "recipeName": "Garlic Chicken",
    "description": "Pan seared.",
    "calories": "Approx. 450 kcal per serving",
    "timeTaken": "30 minutes",
    "ingredients": ["1 chicken breast", "2 cloves garlic"],
    "instructions": ["Sear the chicken.", "Add garlic."]
  },
  {
    "recipeName": "Tomato Salad",
    "description": "Fresh.",
    "calories": "Approx. 120 kcal per serving",
    "timeTaken": "10 minutes",
    "ingredients": ["3 tomatoes"],
    "instructions": ["Slice.", "Season."]
  },
  {
    "recipeName": "Chicken Stew",
    "description": "Slow cooked.",
    "calories": "Approx. 600 kcal per serving",
    "timeTaken": "2 hours",
    "ingredients": ["1 chicken breast", "3 tomatoes"],
    "instructions": ["Brown.", "Simmer."]
  }
]"#;

fn kitchen() -> GenerationRequest
{   GenerationRequest::new(
      vec![
        Ingredient::new("Tomatoes", "3")
      , Ingredient::new("Chicken Breast", "1 large")
      , Ingredient::new("Garlic", "2 cloves")
      ],
      "",
      false
    ).unwrap()
}

fn web(uri: Option<&str>, title: Option<&str>) -> WebReference
{   WebReference
    {   uri: uri.map(str::to_string)
      , title: title.map(str::to_string)
    }
}

#[tokio::test]
async fn test_fenced_response_yields_all_recipes()
{   let text = format!(
      "Here you go!\n```json\n{}\n```\nEnjoy.",
      THREE_RECIPES
    );
    let service = FakeContentService::with_text(&text)
      .default_image(b"jpeg");

    let recipes = generate_recipes(&service, &kitchen()).await.unwrap();

    let names: Vec<&str> = recipes
      .iter()
      .map(|r| r.recipe_name.as_str())
      .collect();
    assert_eq!(names, ["Garlic Chicken", "Tomato Salad", "Chicken Stew"]);
    assert_eq!(recipes[0].time_taken, "30 minutes");
    assert_eq!(recipes[2].instructions, ["Brown.", "Simmer."]);
    assert!(recipes.iter().all(|r| r.image.is_some()));
}

#[tokio::test]
async fn test_bare_response_yields_all_recipes()
{   let text = format!("Sure. {} Hope that helps.", THREE_RECIPES);
    let service = FakeContentService::with_text(&text);

    let recipes = generate_recipes(&service, &kitchen()).await.unwrap();
    assert_eq!(recipes.len(), 3);
    assert_eq!(recipes[1].calories, "Approx. 120 kcal per serving");
}

#[tokio::test]
async fn test_text_request_enables_web_search()
{   let service = FakeContentService::with_text(THREE_RECIPES);
    generate_recipes(&service, &kitchen()).await.unwrap();

    let requests = service.text_requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].web_search);
    assert!(requests[0].prompt.contains("Garlic (2 cloves)"));
}

#[tokio::test]
async fn test_response_without_array_fails_whole_call()
{   let service = FakeContentService::with_text(
      "I'm sorry, I can't help with that."
    );

    let err = generate_recipes(&service, &kitchen()).await.unwrap_err();
    assert_eq!(
      err,
      Error::generation_failed(
        Stage::Parsing,
        Error::ParseError(
          "Could not find a valid JSON array in the response".to_string()
        )
      )
    );
    assert!(service.image_requests().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_a_parse_failure()
{   let service = FakeContentService::with_text(
      "[{\"recipeName\": \"Soup\",]"
    );

    let err = generate_recipes(&service, &kitchen()).await.unwrap_err();
    match err
    {   Error::GenerationFailed { stage, cause } => {
          assert_eq!(stage, Stage::Parsing);
          assert!(matches!(*cause, Error::ParseError(_)));
        }
      , other => panic!("unexpected error: {:?}", other)
    }
}

#[tokio::test]
async fn test_missing_calories_rejects_every_recipe()
{   let text = r#"[
      {"recipeName": "A", "calories": "100", "timeTaken": "5 min"},
      {"recipeName": "B", "timeTaken": "5 min"},
      {"recipeName": "C", "calories": "300", "timeTaken": "5 min"}
    ]"#;
    let service = FakeContentService::with_text(text);

    let err = generate_recipes(&service, &kitchen()).await.unwrap_err();
    match &err
    {   Error::GenerationFailed { stage, .. } => {
          assert_eq!(*stage, Stage::Validating);
        }
      , other => panic!("unexpected error: {:?}", other)
    }
    assert!(matches!(err.root_cause(), Error::ValidationError(_)));
    assert!(service.image_requests().is_empty());
}

#[tokio::test]
async fn test_missing_ingredient_lists_are_tolerated()
{   let text = r#"[{"recipeName": "Toast", "calories": "90", "timeTaken": "3 min"}]"#;
    let service = FakeContentService::with_text(text);

    let recipes = generate_recipes(&service, &kitchen()).await.unwrap();
    assert_eq!(recipes.len(), 1);
    assert!(recipes[0].ingredients.is_empty());
    assert!(recipes[0].instructions.is_empty());
}

#[tokio::test]
async fn test_text_service_failure_is_generic()
{   let service = FakeContentService::with_text_error(
      Error::ApiError("quota exhausted".to_string())
    );

    let err = generate_recipes(&service, &kitchen()).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to generate recipes from the Gemini API");
    assert_eq!(
      err.root_cause(),
      &Error::ApiError("quota exhausted".to_string())
    );
}

#[tokio::test]
async fn test_one_failed_image_leaves_the_others()
{   let service = FakeContentService::with_text(THREE_RECIPES)
      .fail_image_for("Tomato Salad", Error::HttpError("boom".to_string()))
      .image_for("Garlic Chicken", b"garlic")
      .image_for("Chicken Stew", b"stew");

    let recipes = generate_recipes(&service, &kitchen()).await.unwrap();

    assert_eq!(recipes.len(), 3);
    assert_eq!(recipes[0].image.as_ref().unwrap().bytes, b"garlic");
    assert!(recipes[1].image.is_none());
    assert_eq!(recipes[2].image.as_ref().unwrap().bytes, b"stew");
}

#[tokio::test]
async fn test_empty_image_response_means_no_image()
{   let service = FakeContentService::with_text(THREE_RECIPES)
      .default_image(b"img")
      .no_image_for("Chicken Stew");

    let recipes = generate_recipes(&service, &kitchen()).await.unwrap();
    assert!(recipes[0].image.is_some());
    assert!(recipes[2].image.is_none());
}

#[tokio::test]
async fn test_image_requests_use_fixed_template()
{   let service = FakeContentService::with_text(THREE_RECIPES);
    generate_recipes(&service, &kitchen()).await.unwrap();

    let mut requests = service.image_requests();
    assert_eq!(requests.len(), 3);
    requests.sort_by(|a, b| a.prompt.cmp(&b.prompt));
    let request = &requests[0];
    assert_eq!(
      request.prompt,
      "A delicious, professionally photographed, appetizing photo of \
       \"Chicken Stew\". High quality, food photography."
    );
    assert_eq!(request.number_of_images, 1);
    assert_eq!(request.aspect_ratio, "16:9");
    assert_eq!(request.output_mime_type, "image/jpeg");
}

#[tokio::test]
async fn test_slow_image_does_not_reorder_recipes()
{   let service = FakeContentService::with_text(THREE_RECIPES)
      .default_image(b"img")
      .delay_image_for("Garlic Chicken", Duration::from_millis(50));

    let recipes = generate_recipes(&service, &kitchen()).await.unwrap();
    assert_eq!(recipes[0].recipe_name, "Garlic Chicken");
    assert!(recipes[0].image.is_some());

    // The slow request was issued before the others finished.
    let requests = service.image_requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].prompt.contains("Garlic Chicken"));
}

#[tokio::test]
async fn test_complete_citations_are_shared_by_every_recipe()
{   let service = FakeContentService::with_text_response(TextResponse
    {   text: THREE_RECIPES.to_string()
      , citations: vec![
          web(Some("https://a.example/sear"), Some("How to sear"))
        , web(Some("https://b.example/untitled"), None)
        , web(Some("https://c.example/stew"), Some("Stew basics"))
        ]
    });

    let recipes = generate_recipes(&service, &kitchen()).await.unwrap();

    let first = recipes[0].source_links.clone().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].title, "How to sear");
    assert_eq!(first[1].uri, "https://c.example/stew");
    assert!(recipes.iter().all(|r| r.source_links.as_ref() == Some(&first)));
}

#[tokio::test]
async fn test_no_citations_means_no_source_links()
{   let service = FakeContentService::with_text(THREE_RECIPES)
      .citations(vec![web(None, Some("Title only"))]);

    let recipes = generate_recipes(&service, &kitchen()).await.unwrap();
    assert!(recipes.iter().all(|r| r.source_links.is_none()));
}

#[tokio::test]
async fn test_empty_ingredients_never_reach_the_service()
{   let request = GenerationRequest
    {   ingredients: vec![]
      , desired_dish: String::new()
      , strict_ingredients: true
    };
    let service = FakeContentService::with_text(THREE_RECIPES);

    let err = generate_recipes(&service, &request).await.unwrap_err();
    assert_eq!(err, Error::NoIngredients);
    assert!(service.text_requests().is_empty());
}

#[tokio::test]
async fn test_recipe_serializes_with_camel_case_and_base64_image()
{   let service = FakeContentService::with_text(THREE_RECIPES)
      .image_for("Garlic Chicken", b"hi");

    let recipes = generate_recipes(&service, &kitchen()).await.unwrap();
    let json = serde_json::to_value(&recipes[0]).unwrap();
    assert_eq!(json["recipeName"], "Garlic Chicken");
    assert_eq!(json["timeTaken"], "30 minutes");
    assert_eq!(json["image"]["imageBase64"], "aGk=");
    assert_eq!(json["image"]["mimeType"], "image/jpeg");
    assert!(json.get("sourceLinks").is_none());
    assert_eq!(
      recipes[0].image.as_ref().unwrap().data_url(),
      "data:image/jpeg;base64,aGk="
    );
}

#[test]
fn test_blocking_call_through_tokio_test()
{   let service = FakeContentService::with_text(THREE_RECIPES);
    let recipes = tokio_test::block_on(
      generate_recipes(&service, &kitchen())
    ).unwrap();
    assert_eq!(recipes.len(), 3);
}

// ===== Backend =====

#[tokio::test]
async fn test_backend_replies_per_request()
{   let service: Arc<dyn ContentService> = Arc::new(
      FakeContentService::with_text(THREE_RECIPES)
    );
    let backend = pantrychef::ChefBackend::with_service(service);

    let mut first = backend.generate_recipes(kitchen()).await.unwrap();
    let mut second = backend.generate_recipes(kitchen()).await.unwrap();

    let first = first.recv().await.unwrap().unwrap();
    let second = second.recv().await.unwrap().unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 3);

    assert!(backend.shutdown().await.is_ok());
}

#[tokio::test]
async fn test_backend_surfaces_generic_failure()
{   let service: Arc<dyn ContentService> = Arc::new(
      FakeContentService::with_text("no json here")
    );
    let backend = pantrychef::ChefBackend::with_service(service);

    let mut reply = backend.generate_recipes(kitchen()).await.unwrap();
    let result = reply.recv().await.unwrap();
    assert!(matches!(result, Err(Error::GenerationFailed { .. })));

    let _ = backend.shutdown().await;
}

#[tokio::test]
async fn test_backend_without_key_is_refused()
{   let config = pantrychef::ChefConfig::new("  ");
    assert!(matches!(
      pantrychef::ChefBackend::new(config),
      Err(Error::MissingApiKey(_))
    ));
}

#[tokio::test]
#[ignore]
async fn test_gemini_generate_recipes_live()
{   let config = match pantrychef::ChefConfig::from_env()
    {   Ok(config) => config
      , Err(_) => {
          println!("Skipping: API_KEY / GEMINI_API_KEY not set");
          return;
        }
    };
    let client = pantrychef::providers::GeminiClient::new(config).unwrap();

    match generate_recipes(&client, &kitchen()).await
    {   Ok(recipes) => {
          // Content varies per call; only the shape is stable.
          assert!(!recipes.is_empty());
          for recipe in &recipes
          {   assert!(!recipe.recipe_name.is_empty());
              assert!(!recipe.calories.is_empty());
              assert!(!recipe.time_taken.is_empty());
              println!(
                "{} (image: {})",
                recipe.recipe_name,
                recipe.image.is_some()
              );
          }
        }
      , Err(e) => {
          println!("Generation failed: {:?}", e.root_cause());
        }
    }
}
