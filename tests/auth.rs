mod helpers;

use axum::http::StatusCode;
use cookbook_user::password::RequestResetInput;
use helpers::{PASSWORD, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_register_returns_token_and_user() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({
                "name": "Jane Doe",
                "email": "Jane@Example.com",
                "password": PASSWORD,
                "password_confirmation": PASSWORD,
            }),
        )
        .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["user"]["email"], "jane@example.com");
    assert_eq!(body["user"]["is_admin"], false);

    let token = body["token"].as_str().unwrap();
    let (status, me) = app.get("/api/user", Some(token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Jane Doe");

    Ok(())
}

#[tokio::test]
async fn test_register_rejects_invalid_input() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.user("Taken", "taken@example.com", false).await?;

    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({
                "name": "Someone",
                "email": "taken@example.com",
                "password": PASSWORD,
                "password_confirmation": PASSWORD,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");

    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({
                "name": "Someone",
                "email": "new@example.com",
                "password": "short",
                "password_confirmation": "other",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["password"].is_array());

    Ok(())
}

#[tokio::test]
async fn test_login_and_bad_credentials() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.user("John", "john@example.com", false).await?;

    let (status, body) = app
        .post(
            "/api/login",
            None,
            json!({ "email": "john@example.com", "password": PASSWORD }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert!(body["token"].is_string());

    let (status, body) = app
        .post(
            "/api/login",
            None,
            json!({ "email": "john@example.com", "password": "wrong-password" }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "These credentials do not match our records.");
    assert_eq!(
        body["errors"]["email"][0],
        "These credentials do not match our records."
    );

    Ok(())
}

#[tokio::test]
async fn test_guest_routes_reject_authenticated_callers() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = app.user("John", "john@example.com", false).await?;

    let (status, body) = app
        .post(
            "/api/login",
            Some(&user.token),
            json!({ "email": "john@example.com", "password": PASSWORD }),
        )
        .await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Already authenticated.");

    Ok(())
}

#[tokio::test]
async fn test_protected_routes_require_token() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app.get("/api/user", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthenticated.");

    let (status, _) = app.get("/api/user", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_logout_revokes_token() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = app.user("John", "john@example.com", false).await?;

    let (status, body) = app.post("/api/logout", Some(&user.token), json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    let (status, _) = app.get("/api/user", Some(&user.token)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_refresh_rotates_token() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = app.user("John", "john@example.com", false).await?;

    let (status, body) = app
        .post("/api/auth/refresh", Some(&user.token), json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Token refreshed successfully");
    assert_eq!(body["user"]["id"], user.id());

    let new_token = body["token"].as_str().unwrap();
    assert_ne!(new_token, user.token);

    let (status, _) = app.get("/api/user", Some(&user.token)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/user", Some(new_token)).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_refresh_accepts_expired_token_inside_window() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = app.user("John", "john@example.com", false).await?;

    let expired = app.expired_token(user.id(), 600).await?;
    let (status, _) = app.get("/api/user", Some(&expired)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post("/api/auth/refresh", Some(&expired), json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user.id());

    let fresh = body["token"].as_str().unwrap();
    let (status, _) = app.get("/api/user", Some(fresh)).await?;
    assert_eq!(status, StatusCode::OK);

    // The expired token was rotated away.
    let (status, _) = app
        .post("/api/auth/refresh", Some(&expired), json!({}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let too_old = app.expired_token(user.id(), 3 * 60 * 60).await?;
    let (status, _) = app
        .post("/api/auth/refresh", Some(&too_old), json!({}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_change_password() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = app.user("John", "john@example.com", false).await?;

    let (status, body) = app
        .put(
            "/api/password",
            Some(&user.token),
            json!({
                "current_password": "not-my-password",
                "password": "new-password-1",
                "password_confirmation": "new-password-1",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["current_password"].is_array());

    let (status, body) = app
        .put(
            "/api/password",
            Some(&user.token),
            json!({
                "current_password": PASSWORD,
                "password": "new-password-1",
                "password_confirmation": "new-password-1",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password changed successfully.");

    let (status, _) = app
        .post(
            "/api/login",
            None,
            json!({ "email": "john@example.com", "password": "new-password-1" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_forgot_password_same_answer_for_unknown_email() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.user("John", "john@example.com", false).await?;

    for email in ["john@example.com", "nobody@example.com"] {
        let (status, body) = app
            .post("/api/forgot-password", None, json!({ "email": email }))
            .await?;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "We have emailed your password reset link.");
    }

    Ok(())
}

#[tokio::test]
async fn test_reset_password_revokes_tokens() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = app.user("John", "john@example.com", false).await?;

    let token = app
        .state
        .user_command
        .request_password_reset(RequestResetInput {
            email: "john@example.com".to_string(),
        })
        .await?
        .unwrap();

    let (status, body) = app
        .post(
            "/api/reset-password",
            None,
            json!({
                "token": "wrong",
                "email": "john@example.com",
                "password": "brand-new-pass",
                "password_confirmation": "brand-new-pass",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"][0], "This password reset token is invalid.");

    let (status, body) = app
        .post(
            "/api/reset-password",
            None,
            json!({
                "token": token,
                "email": "john@example.com",
                "password": "brand-new-pass",
                "password_confirmation": "brand-new-pass",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Your password has been reset.");

    let (status, _) = app.get("/api/user", Some(&user.token)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_unprocessable() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))?;
    let (status, body) = app.send(request).await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].is_string());

    Ok(())
}
