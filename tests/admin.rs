mod helpers;

use axum::http::StatusCode;
use cookbook_recipe::comment::CommentInput;
use helpers::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_admin_routes_require_admin() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = app.user("John", "john@example.com", false).await?;

    for uri in ["/api/admin/users", "/api/admin/recipes", "/api/admin/comments"] {
        let (status, body) = app.get(uri, Some(&user.token)).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["message"], "Forbidden. Admin access required.");

        let (status, _) = app.get(uri, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    Ok(())
}

#[tokio::test]
async fn test_admin_lists_users_with_counts() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let admin = app.user("Admin", "admin@example.com", true).await?;
    let cook = app.user("Cook", "cook@example.com", false).await?;
    let recipe_id = app.recipe(&cook, "Omelette").await?;
    app.state.recipe_command.like(cook.id(), recipe_id).await?;

    let (status, body) = app
        .get("/api/admin/users?search=cook", Some(&admin.token))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["pagination"]["total"], 1);
    assert_eq!(body["metadata"]["filters"]["search"], "cook");
    let row = &body["data"][0];
    assert_eq!(row["email"], "cook@example.com");
    assert_eq!(row["recipes_count"], 1);
    assert_eq!(row["likes_count"], 1);
    assert_eq!(row["comments_count"], 0);

    let (_, body) = app
        .get("/api/admin/users?is_admin=1", Some(&admin.token))
        .await?;
    assert_eq!(body["metadata"]["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["id"], admin.id());

    Ok(())
}

#[tokio::test]
async fn test_admin_updates_and_deletes_user() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let admin = app.user("Admin", "admin@example.com", true).await?;
    let cook = app.user("Cook", "cook@example.com", false).await?;
    app.recipe(&cook, "Omelette").await?;
    let uri = format!("/api/admin/users/{}", cook.id());

    let (status, body) = app
        .put(&uri, Some(&admin.token), json!({ "name": "Head Cook", "is_admin": true }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User updated successfully");
    assert_eq!(body["data"]["name"], "Head Cook");
    assert_eq!(body["data"]["is_admin"], true);

    let (status, body) = app
        .put(&uri, Some(&admin.token), json!({ "email": "admin@example.com" }))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");

    let (status, body) = app
        .delete(&format!("/api/admin/users/{}", admin.id()), Some(&admin.token))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Cannot delete yourself.");

    let (status, body) = app.delete(&uri, Some(&admin.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, _) = app.get(&uri, Some(&admin.token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/recipes", None).await?;
    assert_eq!(body["metadata"]["pagination"]["total"], 0);

    Ok(())
}

#[tokio::test]
async fn test_admin_moderates_recipes_and_comments() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let admin = app.user("Admin", "admin@example.com", true).await?;
    let cook = app.user("Cook", "cook@example.com", false).await?;
    let recipe_id = app.recipe(&cook, "Omelette").await?;
    let comment = app
        .state
        .recipe_command
        .create_comment(
            cook.actor(),
            recipe_id,
            CommentInput {
                content: "First!".to_string(),
            },
        )
        .await?;

    let (status, body) = app.get("/api/admin/comments", Some(&admin.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["recipe_title"], "Omelette");
    assert_eq!(body["data"][0]["user_name"], "Cook");

    let (status, _) = app
        .delete(&format!("/api/admin/comments/{}", comment.id), Some(&admin.token))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .get(&format!("/api/admin/recipes?user_id={}", cook.id()), Some(&admin.token))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], recipe_id);
    assert_eq!(body["metadata"]["filters"]["user_id"], cook.id().to_string());

    let (status, _) = app
        .delete(&format!("/api/admin/recipes/{recipe_id}"), Some(&admin.token))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/recipes/{recipe_id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}
