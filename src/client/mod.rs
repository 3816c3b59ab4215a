//! HTTP client for the Cooking Book API.
//!
//! Every request carries the stored bearer token. A `401` triggers one token
//! refresh shared by all concurrent callers, after which each caller replays
//! its request once.

mod refresh;

use std::sync::{Arc, PoisonError, RwLock};

use cookbook_shared::pagination::PaginationMeta;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

pub use refresh::RefreshQueue;

const REFRESH_PATH: &str = "/api/auth/refresh";
const CURRENT_USER_PATH: &str = "/api/user";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Unauthenticated.")]
    Unauthenticated,

    #[error("{status}: {message}")]
    Api {
        status: StatusCode,
        message: String,
        errors: Option<Value>,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// A request that can be replayed after a token refresh.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: &impl Serialize) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ClientError::Api {
            status: StatusCode::BAD_REQUEST,
            message: e.to_string(),
            errors: None,
        })?);
        Ok(self)
    }

    /// The current-user request answers 401 to signal "logged out"; it never
    /// triggers a refresh.
    fn may_refresh(&self) -> bool {
        !(self.method == Method::GET && self.path == CURRENT_USER_PATH)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: AuthUser,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub email_verified_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub image: Option<String>,
    pub cooking_time: i64,
    pub servings: i64,
    pub difficulty: String,
    pub views_count: i64,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_liked: Option<bool>,
    pub user: Author,
    pub category: Option<CategorySummary>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub cooking_time: i64,
    pub servings: i64,
    pub difficulty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListMetadata {
    pub pagination: PaginationMeta,
    pub next_cursor: Option<String>,
    pub filters: serde_json::Map<String, Value>,
    pub sortings: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Listing<T> {
    pub data: Vec<T>,
    pub metadata: ListMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikeState {
    pub message: String,
    pub is_liked: bool,
    pub likes_count: i64,
}

#[derive(Deserialize)]
struct Data<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    errors: Option<Value>,
}

struct Shared {
    token: RwLock<Option<String>>,
    refresh: RefreshQueue,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    shared: Arc<Shared>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            shared: Arc::new(Shared {
                token: RwLock::new(None),
                refresh: RefreshQueue::default(),
            }),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.shared
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self
            .shared
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    async fn execute(
        &self,
        spec: &RequestSpec,
        token: Option<&str>,
    ) -> ClientResult<reqwest::Response> {
        let mut request = self
            .http
            .request(spec.method.clone(), format!("{}{}", self.base_url, spec.path))
            .header(reqwest::header::ACCEPT, "application/json");

        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        Ok(request.send().await?)
    }

    /// Sends the request, refreshing the token and replaying once on `401`.
    pub async fn send(&self, spec: RequestSpec) -> ClientResult<reqwest::Response> {
        let sent_with = self.token();
        let response = self.execute(&spec, sent_with.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || !spec.may_refresh() {
            return Ok(response);
        }

        // A refresh that finished while this request was in flight already
        // replaced the rejected token.
        let current = self.token();
        let refreshed_meanwhile = current.is_some() && current != sent_with;

        if !refreshed_meanwhile {
            tracing::debug!(path = %spec.path, "access token rejected, refreshing");

            if !self.refresh_token().await {
                return Err(ClientError::Unauthenticated);
            }
        }

        self.execute(&spec, self.token().as_deref()).await
    }

    /// Single-flight refresh. On failure the stored token is cleared.
    async fn refresh_token(&self) -> bool {
        self.shared
            .refresh
            .run(|| async {
                let token = self.token();
                let refreshed = match self
                    .execute(&RequestSpec::post(REFRESH_PATH), token.as_deref())
                    .await
                {
                    Ok(response) if response.status().is_success() => {
                        response.json::<AuthResponse>().await.ok()
                    }
                    Ok(response) => {
                        tracing::debug!(status = %response.status(), "token refresh rejected");
                        None
                    }
                    Err(e) => {
                        tracing::warn!("token refresh failed: {e}");
                        None
                    }
                };

                match refreshed {
                    Some(auth) => {
                        self.set_token(Some(auth.token));
                        true
                    }
                    None => {
                        self.set_token(None);
                        false
                    }
                }
            })
            .await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthenticated);
        }

        let body = response.json::<ErrorBody>().await.ok();
        let (message, errors) = match body {
            Some(body) => (body.message, body.errors),
            None => (None, None),
        };

        Err(ClientError::Api {
            status,
            message: message.unwrap_or_else(|| status.to_string()),
            errors,
        })
    }

    pub async fn request<T: DeserializeOwned>(&self, spec: RequestSpec) -> ClientResult<T> {
        Self::decode(self.send(spec).await?).await
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let spec = RequestSpec::post("/api/login").json(&serde_json::json!({
            "email": email,
            "password": password,
        }))?;

        let auth: AuthResponse = self.request(spec).await?;
        self.set_token(Some(auth.token.to_owned()));

        Ok(auth)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> ClientResult<AuthResponse> {
        let spec = RequestSpec::post("/api/register").json(&serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
            "password_confirmation": password_confirmation,
        }))?;

        let auth: AuthResponse = self.request(spec).await?;
        self.set_token(Some(auth.token.to_owned()));

        Ok(auth)
    }

    /// Revokes the token server side. The local token is dropped either way.
    pub async fn logout(&self) -> ClientResult<()> {
        let result = self
            .request::<Value>(RequestSpec::post("/api/logout"))
            .await;
        self.set_token(None);

        result.map(|_| ())
    }

    pub async fn current_user(&self) -> ClientResult<CurrentUser> {
        self.request(RequestSpec::get(CURRENT_USER_PATH)).await
    }

    pub async fn list_recipes(&self, query: &[(&str, &str)]) -> ClientResult<Listing<Recipe>> {
        let spec = query
            .iter()
            .fold(RequestSpec::get("/api/recipes"), |spec, (key, value)| {
                spec.query(*key, *value)
            });

        self.request(spec).await
    }

    pub async fn get_recipe(&self, id: i64) -> ClientResult<Recipe> {
        let data: Data<Recipe> = self
            .request(RequestSpec::get(format!("/api/recipes/{id}")))
            .await?;

        Ok(data.data)
    }

    pub async fn create_recipe(&self, recipe: &NewRecipe) -> ClientResult<Recipe> {
        let data: Data<Recipe> = self
            .request(RequestSpec::post("/api/recipes").json(recipe)?)
            .await?;

        Ok(data.data)
    }

    pub async fn toggle_like(&self, id: i64) -> ClientResult<LikeState> {
        self.request(RequestSpec::post(format!("/api/recipes/{id}/like")))
            .await
    }
}
