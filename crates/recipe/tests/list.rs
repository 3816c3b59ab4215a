use cookbook_recipe::recipe::{AdminListInput, ListInput};
use cookbook_shared::pagination::PageRequest;
use temp_dir::TempDir;

mod helpers;

#[tokio::test]
async fn test_list_filters() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let john = helpers::create_actor(&state, "john", false).await?;
    let cmd = cookbook_recipe::Command::new(state);
    let soups = helpers::create_category(&cmd, "Soups").await?;

    let tomato = cmd
        .create(
            john,
            cookbook_recipe::RecipeInput {
                category_id: Some(Some(soups)),
                difficulty: Some("hard".to_owned()),
                ..helpers::recipe_input("Tomato soup")
            },
        )
        .await?;
    helpers::create_recipe(&cmd, john, "Pancakes").await?;
    helpers::create_recipe(&cmd, john, "Waffles").await?;

    let page = cmd
        .list(ListInput {
            search: Some("soup".to_owned()),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, tomato.id);

    let page = cmd
        .list(ListInput {
            category_id: Some(soups),
            difficulty: Some("hard".to_owned()),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 1);

    let page = cmd
        .list(ListInput {
            difficulty: Some("impossible".to_owned()),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 3);

    let page = cmd
        .list(ListInput {
            sort_by: Some("title".to_owned()),
            sort_order: Some("asc".to_owned()),
            page: PageRequest::new(Some(2), Some(2), 15, 50),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "Waffles");
    assert_eq!(page.from(), Some(3));
    assert!(!page.has_more());

    let page = cmd
        .list(ListInput {
            sort_by: Some("nonsense".to_owned()),
            ..Default::default()
        })
        .await?;
    let titles: Vec<_> = page.items.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Tomato soup", "Pancakes", "Waffles"]);

    Ok(())
}

#[tokio::test]
async fn test_list_marks_liked() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let john = helpers::create_actor(&state, "john", false).await?;
    let jane = helpers::create_actor(&state, "jane", false).await?;
    let cmd = cookbook_recipe::Command::new(state);

    let liked = helpers::create_recipe(&cmd, john, "Liked").await?;
    helpers::create_recipe(&cmd, john, "Not liked").await?;
    cmd.like(jane.id, liked.id).await?;

    let page = cmd
        .list(ListInput {
            sort_by: Some("likes_count".to_owned()),
            viewer: Some(jane.id),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.items[0].id, liked.id);
    assert_eq!(page.items[0].likes_count, 1);
    assert_eq!(page.items[0].is_liked, Some(true));
    assert_eq!(page.items[1].is_liked, Some(false));

    let page = cmd.list(ListInput::default()).await?;
    assert!(page.items.iter().all(|r| r.is_liked.is_none()));

    Ok(())
}

#[tokio::test]
async fn test_admin_list() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let john = helpers::create_actor(&state, "john", false).await?;
    let jane = helpers::create_actor(&state, "jane", false).await?;
    let cmd = cookbook_recipe::Command::new(state);

    helpers::create_recipe(&cmd, john, "Bread").await?;
    helpers::create_recipe(&cmd, jane, "Brownies").await?;
    helpers::create_recipe(&cmd, jane, "Salad").await?;

    let page = cmd
        .admin_list(AdminListInput {
            user_id: Some(jane.id),
            sort_by: Some("title".to_owned()),
            sort_order: Some("asc".to_owned()),
            ..Default::default()
        })
        .await?;
    let titles: Vec<_> = page.items.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Brownies", "Salad"]);

    let page = cmd
        .admin_list(AdminListInput {
            search: Some("br".to_owned()),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 2);

    Ok(())
}
