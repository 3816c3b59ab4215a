use cookbook_recipe::comment::{AdminListInput, CommentInput, ListInput};
use temp_dir::TempDir;

mod helpers;

fn content(value: &str) -> CommentInput {
    CommentInput {
        content: value.to_owned(),
    }
}

#[tokio::test]
async fn test_comment_lifecycle() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let john = helpers::create_actor(&state, "john", false).await?;
    let jane = helpers::create_actor(&state, "jane", false).await?;
    let admin = helpers::create_actor(&state, "admin", true).await?;
    let cmd = cookbook_recipe::Command::new(state);
    let recipe = helpers::create_recipe(&cmd, john, "Stew").await?;

    let comment = cmd
        .create_comment(jane, recipe.id, content("  Lovely stew "))
        .await?;
    assert_eq!(comment.content, "Lovely stew");
    assert_eq!(comment.user_name, "jane");
    assert_eq!(comment.recipe_title, "Stew");

    let err = cmd
        .create_comment(jane, recipe.id, content("   "))
        .await
        .unwrap_err();
    assert_eq!(
        err.into_validation_errors().unwrap().field_errors().get("content").unwrap()[0]
            .message
            .as_deref(),
        Some("Comment content is required.")
    );

    let err = cmd
        .create_comment(jane, recipe.id, content(&"a".repeat(2001)))
        .await
        .unwrap_err();
    assert_eq!(
        err.into_validation_errors().unwrap().field_errors().get("content").unwrap()[0]
            .message
            .as_deref(),
        Some("Comment cannot exceed 2000 characters.")
    );

    let err = cmd
        .create_comment(jane, recipe.id + 100, content("Where?"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Recipe not found.");

    let err = cmd
        .update_comment(john, comment.id, content("Hijacked"))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Forbidden. You can only edit your own comments."
    );

    let updated = cmd
        .update_comment(jane, comment.id, content("  Lovely stew, again\n"))
        .await?;
    assert_eq!(updated.content, "Lovely stew, again");

    let err = cmd.delete_comment(john, comment.id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Forbidden. You can only delete your own comments."
    );

    cmd.delete_comment(admin, comment.id).await?;
    assert!(cmd.find_comment(comment.id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_comment_lists() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let john = helpers::create_actor(&state, "john", false).await?;
    let jane = helpers::create_actor(&state, "jane", false).await?;
    let cmd = cookbook_recipe::Command::new(state);
    let stew = helpers::create_recipe(&cmd, john, "Stew").await?;
    let pie = helpers::create_recipe(&cmd, john, "Pie").await?;

    let first = cmd.create_comment(jane, stew.id, content("First")).await?;
    let second = cmd.create_comment(john, stew.id, content("Second")).await?;
    cmd.create_comment(jane, pie.id, content("Pie comment")).await?;

    let page = cmd
        .list_comments(
            stew.id,
            ListInput {
                sort_order: Some("asc".to_owned()),
                ..Default::default()
            },
        )
        .await?;
    let ids: Vec<_> = page.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, [first.id, second.id]);
    assert_eq!(page.total, 2);

    let page = cmd
        .admin_list_comments(AdminListInput {
            user_id: Some(jane.id),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 2);

    let page = cmd
        .admin_list_comments(AdminListInput {
            user_id: Some(jane.id),
            recipe_id: Some(pie.id),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].recipe_title, "Pie");

    cmd.admin_delete_comment(first.id).await?;
    let err = cmd.admin_delete_comment(first.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Comment not found.");

    Ok(())
}
