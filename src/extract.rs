use std::collections::HashMap;

use axum::extract::{FromRequest, FromRequestParts};
use cookbook_shared::pagination::{Filters, PageRequest, Sortings};
use serde::Deserialize;

use crate::error::AppError;

/// JSON body whose rejections render as API errors.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Path parameters. A malformed id is a 404, like a missing row.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

/// Raw query string values of list endpoints.
#[derive(FromRequestParts, Deserialize, Debug, Default)]
#[serde(transparent)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ListParams(pub HashMap<String, String>);

impl ListParams {
    /// A present, non-empty value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_owned)
    }

    /// Integer value. Unparsable input counts as absent.
    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|value| value.parse().ok())
    }

    /// Boolean in the loose form forms and query strings use.
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).map(|value| {
            matches!(
                value.to_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            )
        })
    }

    pub fn page(&self, default_per_page: u64, max_per_page: u64) -> PageRequest {
        PageRequest::new(
            self.int("page"),
            self.int("per_page"),
            default_per_page,
            max_per_page,
        )
    }

    pub fn filters(&self) -> Filters {
        Filters::from_pairs(
            self.0
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        )
    }

    pub fn sortings(&self) -> Sortings {
        Sortings {
            sort_by: self.0.get("sort_by").cloned(),
            sort_order: self.0.get("sort_order").cloned(),
        }
    }
}
