use cookbook_user::{LoginInput, RegisterInput};
use temp_dir::TempDir;

mod helpers;

#[tokio::test]
async fn test_register() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = cookbook_user::Command::new(state);

    let user = cmd
        .register(RegisterInput {
            name: "John Doe".to_owned(),
            email: "John.Doe@Cookbook.localhost".to_owned(),
            password: "my_password".to_owned(),
            password_confirmation: "my_password".to_owned(),
        })
        .await?;

    assert_eq!(user.email, "john.doe@cookbook.localhost");
    assert!(!user.is_admin);
    assert_ne!(user.password, "my_password");

    let err = cmd
        .register(RegisterInput {
            name: "John Again".to_owned(),
            email: "john.doe@cookbook.localhost".to_owned(),
            password: "my_password".to_owned(),
            password_confirmation: "my_password".to_owned(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "The email has already been taken.");

    let logged = cmd
        .login(LoginInput {
            email: "JOHN.DOE@cookbook.localhost".to_owned(),
            password: "my_password".to_owned(),
        })
        .await?;

    assert_eq!(logged.id, user.id);

    Ok(())
}

#[tokio::test]
async fn test_register_validation() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = cookbook_user::Command::new(state);

    let err = cmd
        .register(RegisterInput {
            name: "".to_owned(),
            email: "not-an-email".to_owned(),
            password: "short".to_owned(),
            password_confirmation: "other".to_owned(),
        })
        .await
        .unwrap_err();

    let errors = err.into_validation_errors().unwrap();
    let fields = errors.field_errors();
    assert!(fields.contains_key("name"));
    assert!(fields.contains_key("email"));
    assert_eq!(fields.get("password").map(|e| e.len()), Some(2));
    assert_eq!(
        fields["name"][0].message.as_deref(),
        Some("The name field is required.")
    );

    let err = cmd
        .register(RegisterInput {
            name: "x".repeat(256),
            email: "long@cookbook.localhost".to_owned(),
            password: "my_password".to_owned(),
            password_confirmation: "my_password".to_owned(),
        })
        .await
        .unwrap_err();
    let errors = err.into_validation_errors().unwrap();
    assert_eq!(
        errors.field_errors()["name"][0].message.as_deref(),
        Some("The name field must not be greater than 255 characters.")
    );

    Ok(())
}
