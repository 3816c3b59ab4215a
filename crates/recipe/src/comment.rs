use cookbook_db::table::{Comment, Field, Recipe, User};
use cookbook_shared::{
    Actor, SortOrder,
    pagination::{Page, PageRequest},
};
use sea_query::{Expr, ExprTrait, Func, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Deserialize;
use sqlx::prelude::FromRow;
use validator::{Validate, ValidationError};

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

#[derive(FromRow, Debug, Clone)]
pub struct CommentRow {
    pub id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub user_name: String,
    pub recipe_title: String,
}

#[derive(Validate, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct CommentInput {
    #[validate(custom(function = "validate_content"))]
    pub content: String,
}

impl CommentInput {
    /// Surrounding whitespace is dropped before validation and storage.
    fn trimmed(self) -> Self {
        Self {
            content: self.content.trim().to_owned(),
        }
    }
}

fn validate_content(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("Comment content is required.".into()));
    }

    if value.chars().count() > 2000 {
        return Err(
            ValidationError::new("max").with_message("Comment cannot exceed 2000 characters.".into()),
        );
    }

    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct ListInput {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: PageRequest,
}

#[derive(Debug, Default, Clone)]
pub struct AdminListInput {
    pub user_id: Option<i64>,
    pub recipe_id: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: PageRequest,
}

fn select() -> SelectStatement {
    Query::select()
        .columns([
            (Comment::Table, Comment::Id),
            (Comment::Table, Comment::UserId),
            (Comment::Table, Comment::RecipeId),
            (Comment::Table, Comment::Content),
            (Comment::Table, Comment::CreatedAt),
            (Comment::Table, Comment::UpdatedAt),
        ])
        .expr_as(Expr::col((User::Table, User::Name)), Field::UserName)
        .expr_as(Expr::col((Recipe::Table, Recipe::Title)), Field::RecipeTitle)
        .from(Comment::Table)
        .inner_join(
            User::Table,
            Expr::col((User::Table, User::Id)).equals((Comment::Table, Comment::UserId)),
        )
        .inner_join(
            Recipe::Table,
            Expr::col((Recipe::Table, Recipe::Id)).equals((Comment::Table, Comment::RecipeId)),
        )
        .to_owned()
}

/// `created_at` or `updated_at`, anything else falls back to newest first.
fn apply_sorting(statement: &mut SelectStatement, sort_by: Option<&str>, sort_order: Option<&str>) {
    let order = SortOrder::asc_or_desc(sort_order).to_order();
    match sort_by.unwrap_or("created_at") {
        "created_at" => statement.order_by((Comment::Table, Comment::CreatedAt), order),
        "updated_at" => statement.order_by((Comment::Table, Comment::UpdatedAt), order),
        _ => statement.order_by((Comment::Table, Comment::CreatedAt), Order::Desc),
    };

    statement.order_by((Comment::Table, Comment::Id), Order::Asc);
}

impl crate::Command {
    async fn recipe_exists(&self, recipe_id: i64) -> cookbook_shared::Result<bool> {
        let statement = Query::select()
            .column(Recipe::Id)
            .from(Recipe::Table)
            .and_where(Expr::col(Recipe::Id).eq(recipe_id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let row = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_optional(&self.write_db)
            .await?;

        Ok(row.is_some())
    }

    pub(crate) async fn ensure_recipe(&self, recipe_id: i64) -> cookbook_shared::Result<()> {
        if !self.recipe_exists(recipe_id).await? {
            cookbook_shared::not_found!("Recipe not found.");
        }

        Ok(())
    }

    pub async fn list_comments(
        &self,
        recipe_id: i64,
        input: ListInput,
    ) -> cookbook_shared::Result<Page<CommentRow>> {
        self.ensure_recipe(recipe_id).await?;

        let filter = Expr::col((Comment::Table, Comment::RecipeId)).eq(recipe_id);

        let (sql, values) = Query::select()
            .expr(Func::count(Expr::col((Comment::Table, Comment::Id))))
            .from(Comment::Table)
            .and_where(filter.clone())
            .build_sqlx(SqliteQueryBuilder);
        let (total,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_one(&self.read_db)
            .await?;

        let mut statement = select().and_where(filter).to_owned();
        apply_sorting(&mut statement, input.sort_by.as_deref(), input.sort_order.as_deref());
        statement
            .limit(input.page.per_page)
            .offset(input.page.offset());

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, CommentRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        Ok(Page::new(rows, total as u64, input.page))
    }

    pub async fn find_comment(&self, id: i64) -> cookbook_shared::Result<Option<CommentRow>> {
        let statement = select()
            .and_where(Expr::col((Comment::Table, Comment::Id)).eq(id))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, CommentRow, _>(&sql, values)
            .fetch_optional(&self.write_db)
            .await?)
    }

    async fn load_comment(&self, id: i64) -> cookbook_shared::Result<CommentRow> {
        match self.find_comment(id).await? {
            Some(comment) => Ok(comment),
            None => cookbook_shared::not_found!("Comment not found."),
        }
    }

    #[tracing::instrument(skip(self, input), fields(user_id = actor.id))]
    pub async fn create_comment(
        &self,
        actor: Actor,
        recipe_id: i64,
        input: CommentInput,
    ) -> cookbook_shared::Result<CommentRow> {
        self.ensure_recipe(recipe_id).await?;
        let input = input.trimmed();
        input.validate()?;

        let now = cookbook_shared::now();
        let statement = Query::insert()
            .into_table(Comment::Table)
            .columns([
                Comment::UserId,
                Comment::RecipeId,
                Comment::Content,
                Comment::CreatedAt,
                Comment::UpdatedAt,
            ])
            .values_panic([
                actor.id.into(),
                recipe_id.into(),
                input.content.into(),
                now.into(),
                now.into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let id = sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?
            .last_insert_rowid();

        self.load_comment(id).await
    }

    #[tracing::instrument(skip(self, input), fields(user_id = actor.id))]
    pub async fn update_comment(
        &self,
        actor: Actor,
        id: i64,
        input: CommentInput,
    ) -> cookbook_shared::Result<CommentRow> {
        let comment = self.load_comment(id).await?;
        if !actor.can_modify(comment.user_id) {
            cookbook_shared::forbidden!("Forbidden. You can only edit your own comments.");
        }

        let input = input.trimmed();
        input.validate()?;

        let statement = Query::update()
            .table(Comment::Table)
            .value(Comment::Content, input.content)
            .value(Comment::UpdatedAt, cookbook_shared::now())
            .and_where(Expr::col(Comment::Id).eq(id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.write_db).await?;

        self.load_comment(id).await
    }

    #[tracing::instrument(skip(self), fields(user_id = actor.id))]
    pub async fn delete_comment(&self, actor: Actor, id: i64) -> cookbook_shared::Result<()> {
        let comment = self.load_comment(id).await?;
        if !actor.can_modify(comment.user_id) {
            cookbook_shared::forbidden!("Forbidden. You can only delete your own comments.");
        }

        self.delete_comment_row(id).await
    }

    pub async fn admin_list_comments(
        &self,
        input: AdminListInput,
    ) -> cookbook_shared::Result<Page<CommentRow>> {
        let mut count = Query::select()
            .expr(Func::count(Expr::col((Comment::Table, Comment::Id))))
            .from(Comment::Table)
            .to_owned();
        let mut statement = select();

        if let Some(user_id) = input.user_id {
            count.and_where(Expr::col((Comment::Table, Comment::UserId)).eq(user_id));
            statement.and_where(Expr::col((Comment::Table, Comment::UserId)).eq(user_id));
        }

        if let Some(recipe_id) = input.recipe_id {
            count.and_where(Expr::col((Comment::Table, Comment::RecipeId)).eq(recipe_id));
            statement.and_where(Expr::col((Comment::Table, Comment::RecipeId)).eq(recipe_id));
        }

        let (sql, values) = count.build_sqlx(SqliteQueryBuilder);
        let (total,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_one(&self.read_db)
            .await?;

        apply_sorting(&mut statement, input.sort_by.as_deref(), input.sort_order.as_deref());
        statement
            .limit(input.page.per_page)
            .offset(input.page.offset());

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, CommentRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        Ok(Page::new(rows, total as u64, input.page))
    }

    pub async fn admin_delete_comment(&self, id: i64) -> cookbook_shared::Result<()> {
        self.load_comment(id).await?;
        self.delete_comment_row(id).await
    }

    async fn delete_comment_row(&self, id: i64) -> cookbook_shared::Result<()> {
        let statement = Query::delete()
            .from_table(Comment::Table)
            .and_where(Expr::col(Comment::Id).eq(id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.write_db).await?;

        tracing::info!(comment_id = id, "comment deleted");

        Ok(())
    }
}
