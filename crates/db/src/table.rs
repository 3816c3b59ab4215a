use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum User {
    Table,
    Id,
    Name,
    Email,
    Password,
    IsAdmin,
    EmailVerifiedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum AccessToken {
    Table,
    Id,
    UserId,
    CreatedAt,
    LastUsedAt,
}

#[derive(Iden, Clone)]
pub enum PasswordReset {
    Table,
    Email,
    TokenHash,
    CreatedAt,
}

#[derive(Iden, Clone)]
pub enum Category {
    Table,
    Id,
    Name,
    Slug,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum Recipe {
    Table,
    Id,
    UserId,
    CategoryId,
    Title,
    Description,
    Ingredients,
    Instructions,
    Image,
    CookingTime,
    Servings,
    Difficulty,
    ViewsCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum Comment {
    Table,
    Id,
    UserId,
    RecipeId,
    Content,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum RecipeLike {
    Table,
    Id,
    UserId,
    RecipeId,
    CreatedAt,
}

/// Computed column aliases used by list and detail queries.
#[derive(Iden, Clone, Copy)]
pub enum Field {
    LikesCount,
    CommentsCount,
    RecipesCount,
    UserName,
    CategoryName,
    CategorySlug,
    RecipeTitle,
}
