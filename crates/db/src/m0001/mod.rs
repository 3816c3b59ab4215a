mod access_token;
mod category;
mod comment;
mod like;
mod password_reset;
mod recipe;
mod user;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "main",
    "m0001",
    vec_box![],
    vec_box![
        user::CreateTable,
        user::CreateEmailIdx,
        access_token::CreateTable,
        password_reset::CreateTable,
        category::CreateTable,
        recipe::CreateTable,
        recipe::CreateUserIdIdx,
        recipe::CreateCategoryIdIdx,
        recipe::CreateDifficultyIdx,
        comment::CreateTable,
        comment::CreateRecipeIdIdx,
        like::CreateTable,
        like::CreateUserRecipeIdx,
    ]
);
