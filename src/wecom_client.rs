//! HTTP client for the WeCom API.
//!
//! This module provides the `WecomClient` struct: the request engine that
//! every endpoint operation goes through, the access token provider, and
//! the typed endpoint operations themselves.
//!
//! # Request flow
//!
//! Each operation is a single round trip with no retries:
//! obtain a token, build an [`ApiRequest`], send it through the
//! [`Transport`], then decode the response. A non-2xx status, a body that
//! does not decode, and a non-zero `errcode` are all returned as errors.
//!
//! # Security
//!
//! The corp secret and access tokens are never logged. Error bodies are
//! sanitized before they are stored in an error.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONNECTION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{Config, TokenPolicy};
use crate::error::WecomError;
use crate::models::{
    AccessToken, AccessTokenResponse, Agent, Department, DepartmentList, Envelope,
    MessageReceipt, TextMessage, User, UserInfo, UserList, UserSummary,
};
use crate::token::TokenCache;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};

/// Query parameter that carries the access token on authenticated calls.
const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Description of one API call, built per call and consumed by the engine.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Endpoint path relative to the base URL, e.g. `user/get`.
    pub path: String,

    /// HTTP method.
    pub method: Method,

    /// Query parameters. Each key appears once.
    pub query: BTreeMap<String, String>,

    /// JSON body; `None` sends no body at all.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Creates a request with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            query: BTreeMap::new(),
            body: None,
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Sets a query parameter, replacing any earlier value for `key`.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Sets the JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP client for the WeCom API.
///
/// Cloning is cheap; clones share the transport and, with
/// [`TokenPolicy::Cached`], the token cache. The client holds no other
/// mutable state, so it can serve concurrent calls.
///
/// # Example
///
/// ```ignore
/// let config = Config::new(Credentials::new("ww1234", secret, "1000002"));
/// let client = WecomClient::new(config)?;
///
/// for department in client.list_departments().await? {
///     println!("{}", department);
/// }
/// ```
#[derive(Clone)]
pub struct WecomClient {
    transport: Arc<dyn Transport>,
    config: Arc<Config>,
    token_cache: Option<Arc<TokenCache>>,
}

impl WecomClient {
    /// Creates a client that talks HTTP through `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns `WecomError::Config` if the configuration is invalid, or
    /// `WecomError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: Config) -> Result<Self, WecomError> {
        let transport = ReqwestTransport::new()?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client on top of a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// Returns `WecomError::Config` if the configuration is invalid.
    pub fn with_transport(
        config: Config,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, WecomError> {
        let config = config.validate()?;
        let token_cache = match config.token_policy {
            TokenPolicy::PerCall => None,
            TokenPolicy::Cached => Some(Arc::new(TokenCache::new())),
        };

        Ok(Self {
            transport,
            config: Arc::new(config),
            token_cache,
        })
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Joins the base URL and an endpoint path with exactly one `/`.
    ///
    /// Surrounding whitespace is trimmed from both parts.
    ///
    /// # Errors
    ///
    /// Returns `WecomError::Validation` if the result is not a valid URL.
    pub fn resolve_endpoint(base_url: &str, path: &str) -> Result<Url, WecomError> {
        let base = base_url.trim().trim_end_matches('/');
        let path = path.trim().trim_start_matches('/');
        let joined = format!("{}/{}", base, path);

        Url::parse(&joined)
            .map_err(|e| WecomError::validation(format!("invalid endpoint URL: {}", e)))
    }

    /// Headers sent on every call.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers
    }

    /// Turns an [`ApiRequest`] into the transport-level request.
    fn build_http_request(&self, request: &ApiRequest) -> Result<HttpRequest, WecomError> {
        let mut url = Self::resolve_endpoint(&self.config.base_url, &request.path)?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }

        let body = request
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(WecomError::Serialization)?;

        Ok(HttpRequest {
            method: request.method.clone(),
            url,
            headers: Self::default_headers(),
            body,
            timeout: self.config.timeout,
        })
    }

    /// Sends a request and returns the raw body of a 2xx response.
    ///
    /// The bytes are returned exactly as received. Any other status is a
    /// `WecomError::HttpStatus` carrying the status code and body text;
    /// network failures and timeouts from the transport propagate as-is.
    ///
    /// # Errors
    ///
    /// Returns a transport error as described above, or
    /// `WecomError::Serialization` if the body cannot be encoded.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>, WecomError> {
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            "Making WeCom API request"
        );

        let http_request = self.build_http_request(request)?;
        let response = self.transport.send(http_request).await?;

        if !response.status.is_success() {
            let body = String::from_utf8_lossy(&response.body);
            return Err(WecomError::HttpStatus {
                status: response.status,
                body: WecomError::sanitize_message(&body, &self.config.credentials.corp_secret),
            });
        }

        tracing::trace!(path = %request.path, bytes = response.body.len(), "WeCom API response");

        Ok(response.body)
    }

    /// Executes a request and decodes the response into `T`.
    ///
    /// The envelope is checked before the payload, so an error response
    /// lacking the payload fields surfaces as `WecomError::Api` rather
    /// than as a decode failure.
    async fn call<T>(&self, operation: &'static str, request: ApiRequest) -> Result<T, WecomError>
    where
        T: DeserializeOwned,
    {
        let raw = self.execute(&request).await?;
        Self::decode(operation, &raw)
    }

    fn decode<T>(operation: &'static str, raw: &[u8]) -> Result<T, WecomError>
    where
        T: DeserializeOwned,
    {
        let envelope: Envelope =
            serde_json::from_slice(raw).map_err(|e| WecomError::decode(operation, e))?;
        envelope.into_result()?;

        serde_json::from_slice(raw).map_err(|e| WecomError::decode(operation, e))
    }

    /// Like [`call`](Self::call), with an access token added to the query.
    async fn call_authenticated<T>(
        &self,
        operation: &'static str,
        request: ApiRequest,
    ) -> Result<T, WecomError>
    where
        T: DeserializeOwned,
    {
        let token = self.access_token().await?;
        let request = request.param(ACCESS_TOKEN_PARAM, token.as_str());

        let result = self.call(operation, request).await;
        if let Err(ref e) = result {
            if e.is_token_rejected() {
                if let Some(cache) = &self.token_cache {
                    cache.invalidate_if(&token).await;
                }
            }
        }
        result
    }

    // ========================================================================
    // Access token
    // ========================================================================

    /// Requests a new access token from `gettoken`, bypassing any cache.
    ///
    /// # Errors
    ///
    /// Returns transport and decode errors, `WecomError::Api` if WeCom
    /// rejects the credentials, or `WecomError::EmptyToken` if the
    /// response has no token.
    pub async fn fetch_token(&self) -> Result<AccessToken, WecomError> {
        let credentials = &self.config.credentials;
        let request = ApiRequest::get("gettoken")
            .param("corpid", &credentials.corp_id)
            .param("corpsecret", &credentials.corp_secret);

        let response: AccessTokenResponse = self.call("get access_token", request).await?;
        if response.access_token.is_empty() {
            return Err(WecomError::EmptyToken);
        }

        Ok(response.into())
    }

    /// Returns an access token according to the configured [`TokenPolicy`].
    ///
    /// With [`TokenPolicy::PerCall`] this always calls `gettoken`.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_token`](Self::fetch_token).
    pub async fn access_token(&self) -> Result<String, WecomError> {
        match &self.token_cache {
            Some(cache) => cache.get_or_refresh(|| self.fetch_token()).await,
            None => Ok(self.fetch_token().await?.value),
        }
    }

    /// Drops the cached access token, if any.
    pub async fn invalidate_token(&self) {
        if let Some(cache) = &self.token_cache {
            cache.invalidate().await;
        }
    }

    // ========================================================================
    // Directory operations
    // ========================================================================

    /// Resolves the identity behind an OAuth `code`.
    ///
    /// # Errors
    ///
    /// Returns `WecomError::Validation` if `code` is empty, otherwise any
    /// transport, decode or API error.
    pub async fn get_user_info(&self, code: &str) -> Result<UserInfo, WecomError> {
        Self::validate_not_empty(code, "code")?;
        let request = ApiRequest::get("user/getuserinfo").param("code", code);
        self.call_authenticated("get userId", request).await
    }

    /// Resolves the member user ID behind an OAuth `code`.
    pub async fn get_user_id(&self, code: &str) -> Result<String, WecomError> {
        Ok(self.get_user_info(code).await?.user_id)
    }

    /// Lists the departments within the application's visibility scope.
    ///
    /// # Example
    ///
    /// ```ignore
    /// for department in client.list_departments().await? {
    ///     let users = client.list_users(department.id, true).await?;
    ///     println!("{}: {} members", department.name, users.len());
    /// }
    /// ```
    pub async fn list_departments(&self) -> Result<Vec<Department>, WecomError> {
        let list: DepartmentList = self
            .call_authenticated("get department", ApiRequest::get("department/list"))
            .await?;
        Ok(list.departments)
    }

    /// Lists members of a department.
    ///
    /// # Arguments
    ///
    /// * `department_id` - The department to list
    /// * `fetch_child` - Whether to include members of sub-departments
    pub async fn list_users(
        &self,
        department_id: i64,
        fetch_child: bool,
    ) -> Result<Vec<UserSummary>, WecomError> {
        let request = ApiRequest::get("user/simplelist")
            .param("department_id", department_id.to_string())
            .param("fetch_child", if fetch_child { "1" } else { "0" });

        let list: UserList = self.call_authenticated("list users", request).await?;
        Ok(list.users)
    }

    /// Gets the configured application, including its visibility scope.
    pub async fn get_agent(&self) -> Result<Agent, WecomError> {
        let request =
            ApiRequest::get("agent/get").param("agentid", &self.config.credentials.agent_id);
        self.call_authenticated("get agent", request).await
    }

    /// Gets a single member.
    ///
    /// # Errors
    ///
    /// Returns `WecomError::Validation` if `user_id` is empty and
    /// `WecomError::Api` if WeCom does not know the member.
    pub async fn get_user(&self, user_id: &str) -> Result<User, WecomError> {
        Self::validate_not_empty(user_id, "userid")?;
        let request = ApiRequest::get("user/get").param("userid", user_id);
        self.call_authenticated("get users", request).await
    }

    // ========================================================================
    // Messaging
    // ========================================================================

    /// Sends a text notification from the configured application.
    ///
    /// # Arguments
    ///
    /// * `to_user` - Recipient user IDs joined with `|`, or `@all`
    /// * `content` - Message text
    ///
    /// # Returns
    ///
    /// The delivery receipt; recipients WeCom could not reach are listed
    /// there rather than reported as an error.
    pub async fn send_text_message(
        &self,
        to_user: &str,
        content: &str,
    ) -> Result<MessageReceipt, WecomError> {
        Self::validate_not_empty(to_user, "touser")?;
        Self::validate_not_empty(content, "content")?;

        let message = TextMessage::new(to_user, &self.config.credentials.agent_id, content);
        let body = serde_json::to_value(&message)?;
        let request = ApiRequest::post("message/send").json(body);

        self.call_authenticated("message", request).await
    }

    fn validate_not_empty(value: &str, field_name: &str) -> Result<(), WecomError> {
        if value.trim().is_empty() {
            return Err(WecomError::validation(format!(
                "{} must not be empty",
                field_name
            )));
        }
        Ok(())
    }
}
