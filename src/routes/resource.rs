//! JSON shapes returned by the API.

use cookbook_recipe::{RecipeView, category::CategoryRow, comment::CommentRow};
use cookbook_shared::{
    Difficulty, format_timestamp,
    pagination::{Filters, ListResponse, Page, Sortings},
};
use cookbook_user::{UserRow, admin::UserAdminRow};
use serde::Serialize;

use crate::storage::ImageStore;

#[derive(Debug, Serialize)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct RecipeResource {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub image: Option<String>,
    pub cooking_time: i64,
    pub servings: i64,
    pub difficulty: Difficulty,
    pub views_count: i64,
    pub likes_count: i64,
    pub comments_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    pub user: UserRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    pub created_at: String,
    pub updated_at: String,
}

impl RecipeResource {
    pub fn new(recipe: RecipeView, images: &ImageStore) -> Self {
        let category = match (recipe.category_id, recipe.category_name, recipe.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CategoryRef { id, name, slug }),
            _ => None,
        };

        Self {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            ingredients: recipe.ingredients.0,
            instructions: recipe.instructions,
            image: images.resolve_image_url(recipe.image.as_deref()),
            cooking_time: recipe.cooking_time,
            servings: recipe.servings,
            difficulty: recipe.difficulty.0,
            views_count: recipe.views_count,
            likes_count: recipe.likes_count,
            comments_count: recipe.comments_count,
            is_liked: recipe.is_liked,
            user: UserRef {
                id: recipe.user_id,
                name: recipe.user_name,
            },
            category,
            created_at: format_timestamp(recipe.created_at),
            updated_at: format_timestamp(recipe.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResource {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub recipes_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipes: Option<Vec<RecipeResource>>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CategoryRow> for CategoryResource {
    fn from(category: CategoryRow) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            recipes_count: category.recipes_count,
            recipes: None,
            created_at: format_timestamp(category.created_at),
            updated_at: format_timestamp(category.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResource {
    pub id: i64,
    pub content: String,
    pub recipe_id: i64,
    pub user_id: i64,
    pub user: UserRef,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CommentRow> for CommentResource {
    fn from(comment: CommentRow) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            recipe_id: comment.recipe_id,
            user_id: comment.user_id,
            user: UserRef {
                id: comment.user_id,
                name: comment.user_name,
            },
            created_at: format_timestamp(comment.created_at),
            updated_at: format_timestamp(comment.updated_at),
        }
    }
}

/// Comment row of the moderation list.
#[derive(Debug, Serialize)]
pub struct AdminCommentResource {
    #[serde(flatten)]
    pub comment: CommentResource,
    pub recipe_title: String,
    pub user_name: String,
}

impl From<CommentRow> for AdminCommentResource {
    fn from(comment: CommentRow) -> Self {
        let recipe_title = comment.recipe_title.to_owned();
        let user_name = comment.user_name.to_owned();

        Self {
            comment: comment.into(),
            recipe_title,
            user_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminUserResource {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub email_verified_at: Option<String>,
    pub recipes_count: i64,
    pub comments_count: i64,
    pub likes_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserAdminRow> for AdminUserResource {
    fn from(user: UserAdminRow) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
            email_verified_at: user.email_verified_at.map(format_timestamp),
            recipes_count: user.recipes_count,
            comments_count: user.comments_count,
            likes_count: user.likes_count,
            created_at: format_timestamp(user.created_at),
            updated_at: format_timestamp(user.updated_at),
        }
    }
}

/// User embedded in login, register and refresh responses.
#[derive(Debug, Serialize)]
pub struct AuthUserResource {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<&UserRow> for AuthUserResource {
    fn from(user: &UserRow) -> Self {
        Self {
            id: user.id,
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CurrentUserResource {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub email_verified_at: Option<String>,
    pub created_at: String,
}

impl From<&UserRow> for CurrentUserResource {
    fn from(user: &UserRow) -> Self {
        Self {
            id: user.id,
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            is_admin: user.is_admin,
            email_verified_at: user.email_verified_at.map(format_timestamp),
            created_at: format_timestamp(user.created_at),
        }
    }
}

/// Wraps a page in the `{data, metadata}` envelope.
pub fn envelope<T, R>(
    page: Page<T>,
    filters: Filters,
    sortings: Sortings,
    id_of: impl Fn(&T) -> i64,
    into: impl FnMut(T) -> R,
) -> ListResponse<R> {
    let last_id = page.items.last().map(id_of);
    let metadata = page.metadata(filters, sortings, last_id);

    ListResponse {
        data: page.items.into_iter().map(into).collect(),
        metadata,
    }
}
