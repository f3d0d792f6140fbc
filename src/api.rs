//! Remote auth and leaderboard service
//!
//! Three JSON endpoints: `POST /login`, `POST /register` and `GET /users`.
//! Nothing here touches the simulation; failures only change what the
//! leaderboard panel shows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Storage key for the session token
pub const TOKEN_KEY: &str = "authToken";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub high_score: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
}

/// One row of `GET /users`; extra fields from the server are ignored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub high_score: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
}

/// Error body some endpoints return on failure
#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client-side or transport failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Rejected before sending
    Invalid(String),
    /// Network failure or no fetch available
    Transport(String),
    /// Server answered with a non-success status
    Status { code: u16, message: String },
    /// Response body was not the expected JSON
    Decode(String),
    /// No HTTP transport in this build
    Unsupported,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Invalid(reason) => write!(f, "invalid request: {reason}"),
            ApiError::Transport(reason) => write!(f, "network error: {reason}"),
            ApiError::Status { code, message } => write!(f, "server returned {code}: {message}"),
            ApiError::Decode(reason) => write!(f, "unexpected response: {reason}"),
            ApiError::Unsupported => write!(f, "no HTTP transport in this build"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::Invalid(format!("not an email address: {email:?}"))),
    }
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Invalid(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ApiError::Invalid("password is required".into()));
        }
        Ok(())
    }
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::Invalid("username is required".into()));
        }
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

/// Where the service lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix for every endpoint, no trailing slash
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "/api".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Turn a raw response into a typed body or a status error
pub fn parse_response<T: for<'de> Deserialize<'de>>(
    status: u16,
    body: &str,
) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|e| e.message)
            .unwrap_or_else(|_| body.trim().to_string());
        return Err(ApiError::Status {
            code: status,
            message,
        });
    }
    Ok(serde_json::from_str(body)?)
}

/// HTTP client for the auth/leaderboard service
#[derive(Debug, Clone, Default)]
pub struct ApiClient {
    pub config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        request.validate()?;
        let body = serde_json::to_string(request)?;
        let (status, text) = self.send("POST", "login", Some(&body)).await?;
        let response: LoginResponse = parse_response(status, &text)?;
        log::info!("Logged in as {}", response.username);
        Ok(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        request.validate()?;
        let body = serde_json::to_string(request)?;
        let (status, text) = self.send("POST", "register", Some(&body)).await?;
        parse_response(status, &text)
    }

    pub async fn fetch_users(&self) -> Result<UsersResponse, ApiError> {
        let (status, text) = self.send("GET", "users", None).await?;
        let response: UsersResponse = parse_response(status, &text)?;
        log::debug!("Fetched {} users", response.users.len());
        Ok(response)
    }

    #[cfg(target_arch = "wasm32")]
    async fn send(
        &self,
        method: &str,
        path: &str,
        body: Option<&str>,
    ) -> Result<(u16, String), ApiError> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

        fn transport(err: JsValue) -> ApiError {
            ApiError::Transport(format!("{err:?}"))
        }

        let headers = Headers::new().map_err(transport)?;
        headers.set("Content-Type", "application/json").map_err(transport)?;

        let init = RequestInit::new();
        init.set_method(method);
        init.set_mode(RequestMode::Cors);
        init.set_headers(&headers);
        if let Some(body) = body {
            init.set_body(&JsValue::from_str(body));
        }

        let url = self.config.endpoint(path);
        let request = Request::new_with_str_and_init(&url, &init).map_err(transport)?;
        let window = web_sys::window().ok_or_else(|| ApiError::Transport("no window".into()))?;

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(transport)?
            .dyn_into()
            .map_err(transport)?;
        let text = JsFuture::from(response.text().map_err(transport)?)
            .await
            .map_err(transport)?
            .as_string()
            .unwrap_or_default();
        Ok((response.status(), text))
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn send(
        &self,
        method: &str,
        path: &str,
        _body: Option<&str>,
    ) -> Result<(u16, String), ApiError> {
        log::debug!("{} {} skipped: no transport", method, self.config.endpoint(path));
        Err(ApiError::Unsupported)
    }
}
