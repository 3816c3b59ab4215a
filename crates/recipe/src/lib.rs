use std::ops::Deref;

use cookbook_shared::State;

pub mod category;
pub mod comment;
pub mod like;
pub mod recipe;

pub use recipe::{RecipeInput, RecipeView};

#[derive(Clone)]
pub struct Command {
    state: State,
}

impl Deref for Command {
    type Target = State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Command {
    pub fn new(state: State) -> Self {
        Self { state }
    }
}

/// Treats an explicit JSON `null` differently from a missing field.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}
