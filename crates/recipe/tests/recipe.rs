use cookbook_recipe::RecipeInput;
use cookbook_shared::Difficulty;
use temp_dir::TempDir;

mod helpers;

#[tokio::test]
async fn test_create() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let john = helpers::create_actor(&state, "john", false).await?;
    let cmd = cookbook_recipe::Command::new(state);
    let category_id = helpers::create_category(&cmd, "Main Course").await?;

    let recipe = cmd
        .create(
            john,
            RecipeInput {
                category_id: Some(Some(category_id)),
                image_url: Some("https://images.example.com/pancakes.jpg".to_owned()),
                ..helpers::recipe_input("Pancakes")
            },
        )
        .await?;

    assert_eq!(recipe.title, "Pancakes");
    assert_eq!(recipe.user_id, john.id);
    assert_eq!(recipe.user_name, "john");
    assert_eq!(recipe.category_slug.as_deref(), Some("main-course"));
    assert_eq!(recipe.ingredients.0, ["flour", "water"]);
    assert_eq!(recipe.difficulty.0, Difficulty::Easy);
    assert_eq!(recipe.views_count, 0);
    assert_eq!(recipe.likes_count, 0);
    assert_eq!(recipe.is_liked, None);

    Ok(())
}

#[tokio::test]
async fn test_create_validation() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let john = helpers::create_actor(&state, "john", false).await?;
    let cmd = cookbook_recipe::Command::new(state);

    let err = cmd
        .create(john, RecipeInput::default())
        .await
        .unwrap_err();
    let errors = err.into_validation_errors().unwrap();
    let fields = errors.field_errors();
    for field in [
        "title",
        "description",
        "ingredients",
        "instructions",
        "cooking_time",
        "servings",
        "difficulty",
    ] {
        assert!(fields.contains_key(field), "missing error for {field}");
    }

    let err = cmd
        .create(
            john,
            RecipeInput {
                category_id: Some(Some(999)),
                ingredients: Some(vec!["flour".to_owned(), " ".to_owned()]),
                difficulty: Some("extreme".to_owned()),
                cooking_time: Some(0),
                image_url: Some("not a url".to_owned()),
                ..helpers::recipe_input("Broken")
            },
        )
        .await
        .unwrap_err();
    let errors = err.into_validation_errors().unwrap();
    let fields = errors.field_errors();
    let message = |field: &str| {
        fields.get(field).unwrap()[0]
            .message
            .as_deref()
            .unwrap_or_default()
            .to_owned()
    };

    assert_eq!(message("category_id"), "The selected category id is invalid.");
    assert_eq!(message("ingredients"), "Ingredient cannot be empty.");
    assert_eq!(message("difficulty"), "Difficulty must be easy, medium, or hard.");
    assert!(fields.contains_key("cooking_time"));
    assert!(fields.contains_key("image_url"));
    assert!(!fields.contains_key("title"));

    Ok(())
}

#[tokio::test]
async fn test_update() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let john = helpers::create_actor(&state, "john", false).await?;
    let jane = helpers::create_actor(&state, "jane", false).await?;
    let admin = helpers::create_actor(&state, "admin", true).await?;
    let cmd = cookbook_recipe::Command::new(state);
    let category_id = helpers::create_category(&cmd, "Desserts").await?;

    let recipe = cmd
        .create(
            john,
            RecipeInput {
                category_id: Some(Some(category_id)),
                image_url: Some("http://localhost:8000/api/storage/recipes/old.jpg".to_owned()),
                ..helpers::recipe_input("Cake")
            },
        )
        .await?;

    let err = cmd
        .update(
            jane,
            recipe.id,
            RecipeInput {
                title: Some("Stolen".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "This action is unauthorized.");

    let (updated, replaced) = cmd
        .update(
            john,
            recipe.id,
            RecipeInput {
                title: Some("Chocolate Cake".to_owned()),
                image_url: Some("https://cdn.example.com/cake.jpg".to_owned()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.title, "Chocolate Cake");
    assert_eq!(updated.description, "Cake description");
    assert_eq!(updated.category_id, Some(category_id));
    assert_eq!(replaced.as_deref(), Some("http://localhost:8000/api/storage/recipes/old.jpg"));

    let (updated, replaced) = cmd
        .update(
            admin,
            recipe.id,
            RecipeInput {
                category_id: Some(None),
                difficulty: Some("hard".to_owned()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.category_id, None);
    assert_eq!(updated.category_name, None);
    assert_eq!(updated.difficulty.0, Difficulty::Hard);
    assert_eq!(replaced, None);

    Ok(())
}

#[tokio::test]
async fn test_delete() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let john = helpers::create_actor(&state, "john", false).await?;
    let jane = helpers::create_actor(&state, "jane", false).await?;
    let cmd = cookbook_recipe::Command::new(state);

    let recipe = cmd
        .create(
            john,
            RecipeInput {
                image_url: Some("http://localhost:8000/api/storage/recipes/soup.png".to_owned()),
                ..helpers::recipe_input("Soup")
            },
        )
        .await?;

    let err = cmd.delete(jane, recipe.id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Forbidden. You can only delete your own recipes."
    );

    let image = cmd.delete(john, recipe.id).await?;
    assert_eq!(image.as_deref(), Some("http://localhost:8000/api/storage/recipes/soup.png"));
    assert!(cmd.find(recipe.id, None).await?.is_none());

    let err = cmd.delete(john, recipe.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Recipe not found.");

    let other = helpers::create_recipe(&cmd, jane, "Salad").await?;
    assert_eq!(cmd.admin_delete(other.id).await?, None);

    Ok(())
}

#[tokio::test]
async fn test_increment_views() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let john = helpers::create_actor(&state, "john", false).await?;
    let cmd = cookbook_recipe::Command::new(state);
    let recipe = helpers::create_recipe(&cmd, john, "Toast").await?;

    assert_eq!(cmd.increment_views(recipe.id).await?, 1);
    assert_eq!(cmd.increment_views(recipe.id).await?, 2);

    let err = cmd.increment_views(recipe.id + 1).await.unwrap_err();
    assert_eq!(err.to_string(), "Recipe not found.");

    Ok(())
}
