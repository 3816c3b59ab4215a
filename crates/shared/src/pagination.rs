//! Offset pagination with the length-aware metadata envelope shared by every
//! list endpoint.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

/// Query keys echoed back as filters, in output order.
pub const FILTER_KEYS: [&str; 6] = [
    "search",
    "category_id",
    "difficulty",
    "user_id",
    "recipe_id",
    "is_admin",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 15,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>, default: u64, max: u64) -> Self {
        let per_page = per_page
            .map(|v| v.clamp(1, max as i64) as u64)
            .unwrap_or(default)
            .min(max)
            .max(1);

        // The offset of the last reachable page must still bind as an i64.
        let last_page = i64::MAX as u64 / per_page + 1;
        let page = (page.unwrap_or(1).max(1) as u64).min(last_page);

        Self { page, per_page }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub current_page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            current_page: request.page,
            per_page: request.per_page,
        }
    }

    fn offset(&self) -> u64 {
        (self.current_page - 1).saturating_mul(self.per_page)
    }

    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn from(&self) -> Option<u64> {
        if self.items.is_empty() {
            return None;
        }

        Some(self.offset().saturating_add(1))
    }

    pub fn to(&self) -> Option<u64> {
        if self.items.is_empty() {
            return None;
        }

        Some(self.offset().saturating_add(self.items.len() as u64))
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            per_page: self.per_page,
        }
    }

    pub fn pagination(&self) -> PaginationMeta {
        PaginationMeta {
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page(),
            from: self.from(),
            to: self.to(),
            has_more: self.has_more(),
        }
    }

    pub fn metadata(&self, filters: Filters, sortings: Sortings, last_id: Option<i64>) -> Metadata {
        let next_cursor = next_cursor(self, last_id, &filters, &sortings);

        Metadata {
            pagination: self.pagination(),
            next_cursor,
            filters,
            sortings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub has_more: bool,
}

/// Request filters echoed back in the envelope. Keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters(Vec<(&'static str, Option<String>)>);

impl Filters {
    /// Picks the known filter keys out of raw query pairs. Empty values become null.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)> + Clone) -> Self {
        let mut filters = Vec::new();

        for key in FILTER_KEYS {
            let Some((_, value)) = pairs.clone().into_iter().find(|(k, _)| *k == key) else {
                continue;
            };

            let value = (!value.is_empty()).then(|| value.to_owned());
            filters.push((key, value));
        }

        Self(filters)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Filters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sortings {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub pagination: PaginationMeta,
    pub next_cursor: Option<String>,
    pub filters: Filters,
    pub sortings: Sortings,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub metadata: Metadata,
}

#[derive(Serialize)]
struct CursorToken<'a> {
    last_id: Option<i64>,
    page: u64,
    filters: &'a Filters,
    sortings: &'a Sortings,
}

/// Opaque token pointing at the next page, `None` on the last or an empty page.
pub fn next_cursor<T>(
    page: &Page<T>,
    last_id: Option<i64>,
    filters: &Filters,
    sortings: &Sortings,
) -> Option<String> {
    if !page.has_more() || page.items.is_empty() {
        return None;
    }

    let token = CursorToken {
        last_id,
        page: page.current_page + 1,
        filters,
        sortings,
    };

    let json = serde_json::to_vec(&token).ok()?;

    Some(STANDARD.encode(json))
}
