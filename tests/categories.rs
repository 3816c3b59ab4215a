mod helpers;

use axum::http::StatusCode;
use helpers::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_admin_manages_categories() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let admin = app.user("Admin", "admin@example.com", true).await?;

    let (status, body) = app
        .post("/api/categories", Some(&admin.token), json!({ "name": "Main Dishes" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Category created successfully");
    assert_eq!(body["data"]["slug"], "main-dishes");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/categories/{id}"),
            Some(&admin.token),
            json!({ "name": "Mains" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Mains");
    assert_eq!(body["data"]["slug"], "mains");

    let (status, body) = app
        .post("/api/categories", Some(&admin.token), json!({ "name": "Mains" }))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["name"].is_array());

    let (status, body) = app
        .delete(&format!("/api/categories/{id}"), Some(&admin.token))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted successfully");

    Ok(())
}

#[tokio::test]
async fn test_non_admin_cannot_create_category() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = app.user("John", "john@example.com", false).await?;

    let (status, body) = app
        .post("/api/categories", Some(&user.token), json!({ "name": "Desserts" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden. Admin access required.");

    let (status, _) = app
        .post("/api/categories", None, json!({ "name": "Desserts" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_show_category_with_recipes() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = app.user("John", "john@example.com", false).await?;
    let category_id = app.category("Breakfast").await?;

    let mut input = helpers::recipe_input("Porridge");
    input.category_id = Some(Some(category_id));
    app.state
        .recipe_command
        .create(user.actor(), input)
        .await?;
    app.recipe(&user, "Uncategorised").await?;

    let (status, body) = app.get(&format!("/api/categories/{category_id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["recipes_count"], 1);
    assert_eq!(body["data"]["recipes"][0]["title"], "Porridge");

    let (_, body) = app.get("/api/categories", None).await?;
    assert_eq!(body["data"][0]["recipes_count"], 1);
    assert_eq!(body["metadata"]["pagination"]["total"], 1);

    let (status, body) = app.get("/api/categories/9999", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found.");

    Ok(())
}
