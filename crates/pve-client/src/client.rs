//! Asynchronous Proxmox VE client and request pipeline.
//!
//! Every operation funnels through [`PveClient::execute`]: authenticate if needed, attach
//! auth material, dispatch within the call's [`CallContext`], and unwrap the response
//! envelope.

use crate::auth::{self, Credentials};
use crate::context::CallContext;
use crate::envelope;
use crate::session::{Session, SessionState};
use pve_core::client::{build_http_client, CSRF_HEADER};
use pve_core::{ApiParams, ApiPath, AuthMethod, Error, PveClientConfig, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, COOKIE};
use reqwest::{Client, Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;
use validator::Validate;

const USER_AGENT: &str = concat!("pve-client/", env!("CARGO_PKG_VERSION"));

/// Request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` parameters.
    Form(ApiParams),
}

/// A single API call, described before it is dispatched.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: ApiPath,
    query: ApiParams,
    body: RequestBody,
    headers: HeaderMap,
    csrf: bool,
}

impl ApiRequest {
    /// Request with an arbitrary method.
    #[must_use]
    pub fn new(method: Method, path: ApiPath) -> Self {
        Self {
            method,
            path,
            query: ApiParams::new(),
            body: RequestBody::Empty,
            headers: HeaderMap::new(),
            csrf: false,
        }
    }

    /// `GET` without CSRF.
    #[must_use]
    pub fn get(path: ApiPath) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST` with CSRF attached.
    #[must_use]
    pub fn post(path: ApiPath) -> Self {
        Self::new(Method::POST, path).with_csrf(true)
    }

    /// `PUT` with CSRF attached.
    #[must_use]
    pub fn put(path: ApiPath) -> Self {
        Self::new(Method::PUT, path).with_csrf(true)
    }

    /// `DELETE` with CSRF attached.
    #[must_use]
    pub fn delete(path: ApiPath) -> Self {
        Self::new(Method::DELETE, path).with_csrf(true)
    }

    /// Query string parameters.
    #[must_use]
    pub fn with_query(mut self, query: ApiParams) -> Self {
        self.query = query;
        self
    }

    /// Form-encoded body.
    #[must_use]
    pub fn with_form(mut self, form: ApiParams) -> Self {
        self.body = RequestBody::Form(form);
        self
    }

    /// Extra header. `Authorization`, `Cookie` and `CSRFPreventionToken` are ignored.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Whether to attach the CSRF token (password mode only).
    #[must_use]
    pub const fn with_csrf(mut self, csrf: bool) -> Self {
        self.csrf = csrf;
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Target path.
    #[must_use]
    pub const fn path(&self) -> &ApiPath {
        &self.path
    }

    /// Query parameters.
    #[must_use]
    pub const fn query(&self) -> &ApiParams {
        &self.query
    }

    /// Body.
    #[must_use]
    pub const fn body(&self) -> &RequestBody {
        &self.body
    }
}

/// Builder for [`PveClient`].
#[derive(Debug, Clone)]
pub struct PveClientBuilder {
    config: PveClientConfig,
    user_agent: String,
    http: Option<Client>,
}

impl PveClientBuilder {
    /// Create a builder from a [`PveClientConfig`].
    #[must_use]
    pub fn new(config: PveClientConfig) -> Self {
        Self {
            config,
            user_agent: USER_AGENT.to_string(),
            http: None,
        }
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Use a preconfigured transport instead of building one from the configuration.
    ///
    /// The transport must not keep a cookie store; session cookies are attached by the client.
    #[must_use]
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Validate the configuration and build the client. No network I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the configuration does not validate or the
    /// transport cannot be built.
    pub fn build(self) -> Result<PveClient> {
        self.config.validate()?;
        let base_url = self.config.parse_base_url()?;

        let http = match self.http {
            Some(http) => http,
            None => build_http_client(&self.config, &self.user_agent)?,
        };

        debug!(
            base_url = %base_url,
            auth_method = %self.config.auth_method,
            principal = %self.config.principal,
            "Built Proxmox VE client"
        );

        Ok(PveClient {
            inner: Arc::new(Inner {
                http,
                base_url,
                credentials: Credentials::from_config(&self.config),
                session: Session::new(self.config.login_expiry()),
            }),
            context: CallContext::new(),
        })
    }
}

#[derive(Debug)]
struct Inner {
    http: Client,
    base_url: Url,
    credentials: Credentials,
    session: Session,
}

/// Asynchronous Proxmox VE client.
///
/// Cheap to clone; clones share the transport and the credential state.
#[derive(Debug, Clone)]
pub struct PveClient {
    inner: Arc<Inner>,
    context: CallContext,
}

impl PveClient {
    /// Construct a client directly from the configuration.
    ///
    /// # Errors
    ///
    /// See [`PveClientBuilder::build`].
    pub fn new(config: PveClientConfig) -> Result<Self> {
        PveClientBuilder::new(config).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: PveClientConfig) -> PveClientBuilder {
        PveClientBuilder::new(config)
    }

    /// A handle whose calls observe `context`. State and transport stay shared.
    #[must_use]
    pub fn with_context(&self, context: CallContext) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            context,
        }
    }

    /// The cancellation scope of this handle.
    #[must_use]
    pub const fn context(&self) -> &CallContext {
        &self.context
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Authentication mode.
    #[must_use]
    pub fn auth_method(&self) -> AuthMethod {
        self.inner.credentials.method()
    }

    /// True when a password-mode client holds an unexpired ticket. Always false for tokens.
    #[must_use]
    pub fn has_valid_session(&self) -> bool {
        match self.inner.credentials {
            Credentials::Password { .. } => self.inner.session.is_valid(),
            Credentials::Token { .. } => false,
        }
    }

    /// Log in now rather than on the first request. A no-op for token auth or while the
    /// current ticket is still valid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationFailed`] if the login is rejected, or a transport or
    /// cancellation error.
    pub async fn login(&self) -> Result<()> {
        self.context.run(self.ensure_authenticated()).await
    }

    /// Dispatch `request` and decode the `data` payload into `T`.
    ///
    /// Returns `Ok(None)` when the API answered without data.
    ///
    /// # Errors
    ///
    /// Any [`Error`] variant except `InvalidConfiguration`.
    pub async fn execute<T>(&self, request: ApiRequest) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let path = request.path.clone();
        self.context
            .run(async {
                let response = self.dispatch(request).await?;
                let status = response.status().as_u16();
                let body = response.bytes().await?;
                envelope::unwrap_response(status, &body, &path)
            })
            .await
    }

    /// Dispatch `request` and discard any payload after the status check.
    ///
    /// # Errors
    ///
    /// Any [`Error`] variant except `InvalidConfiguration` and `Decode`.
    pub async fn execute_discard(&self, request: ApiRequest) -> Result<()> {
        self.context
            .run(async {
                let response = self.dispatch(request).await?;
                let status = response.status();
                if status.as_u16() >= 400 {
                    let body = response.bytes().await?;
                    return Err(envelope::api_error(status.as_u16(), &body));
                }
                Ok(())
            })
            .await
    }

    /// `GET` a path and decode its payload.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn get<T>(&self, path: ApiPath, query: ApiParams) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::get(path).with_query(query)).await
    }

    /// `POST` a form and decode the payload.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn post<T>(&self, path: ApiPath, form: ApiParams) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::post(path).with_form(form)).await
    }

    /// `PUT` a form and decode the payload.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn put<T>(&self, path: ApiPath, form: ApiParams) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::put(path).with_form(form)).await
    }

    /// `DELETE` a path and decode the payload.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn delete<T>(&self, path: ApiPath, query: ApiParams) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::delete(path).with_query(query)).await
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<reqwest::Response> {
        self.ensure_authenticated().await?;

        let url = request.path.join_onto(&self.inner.base_url)?;
        let headers = self.request_headers(request.headers, request.csrf)?;

        debug!(method = %request.method, path = %request.path, "Sending Proxmox API request");

        let mut builder = self.inner.http.request(request.method, url);
        if !request.query.is_empty() {
            builder = builder.query(request.query.pairs());
        }
        if let RequestBody::Form(form) = &request.body {
            builder = builder.form(form.pairs());
        }

        Ok(builder.headers(headers).send().await?)
    }

    /// `Accept`, then caller headers, then auth material so the latter always wins.
    fn request_headers(&self, extra: HeaderMap, csrf: bool) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let csrf_header = HeaderName::from_static("csrfpreventiontoken");
        for (name, value) in &extra {
            if *name == AUTHORIZATION || *name == COOKIE || *name == csrf_header {
                continue;
            }
            headers.insert(name.clone(), value.clone());
        }

        match &self.inner.credentials {
            Credentials::Token { token_id, secret } => {
                headers.insert(AUTHORIZATION, auth::token_header(token_id, secret)?);
            }
            Credentials::Password { .. } => {
                let state: SessionState = self.inner.session.snapshot();
                if csrf {
                    if let Some(token) = state.csrf_token() {
                        let value = HeaderValue::from_str(token).map_err(|_| {
                            Error::AuthenticationFailed {
                                status: 200,
                                body: format!("{CSRF_HEADER} is not a valid header value"),
                            }
                        })?;
                        headers.insert(csrf_header, value);
                    }
                }
                if let Some(cookie) = state.cookie_value() {
                    headers.insert(COOKIE, auth::cookie_header(cookie)?);
                }
            }
        }

        Ok(headers)
    }

    /// Log in if the session is missing or expired. Concurrent callers share one login.
    async fn ensure_authenticated(&self) -> Result<()> {
        let Credentials::Password { username, password } = &self.inner.credentials else {
            return Ok(());
        };

        if self.inner.session.is_valid() {
            return Ok(());
        }

        let _login = self.inner.session.lock_login().await;
        if self.inner.session.is_valid() {
            return Ok(());
        }

        let url = ApiPath::ticket().join_onto(&self.inner.base_url)?;
        debug!(username = %username, "Requesting Proxmox VE ticket");

        let response = self
            .inner
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("username", username.as_str()),
                ("password", password.expose_secret()),
            ])
            .send()
            .await?;

        let status = response.status();
        let cookie = response
            .cookies()
            .find(|cookie| cookie.name() == pve_core::client::AUTH_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string());
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(auth::authentication_failed(status.as_u16(), &body));
        }

        let ticket = auth::parse_ticket(&body, cookie)?;
        self.inner.session.store(ticket);
        info!(username = %username, "Authenticated with Proxmox VE");

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn session_state(&self) -> SessionState {
        self.inner.session.snapshot()
    }

    #[cfg(test)]
    pub(crate) fn expire_session(&self, by: std::time::Duration) {
        self.inner.session.backdate(by);
    }
}
