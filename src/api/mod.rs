//! HTTP client with transparent access token renewal.
//!
//! `ApiClient` owns one `reqwest` transport (JSON headers, cookie store, fixed
//! timeout) and one [`RenewalCoordinator`]. Every call goes through `send`,
//! which acts as the response interceptor:
//!
//! 1. Dispatch with the current bearer token (if any).
//! 2. Success or any non-401 failure is returned as is.
//! 3. A 401 on the first attempt obtains a token from the coordinator: either a
//!    token renewed since dispatch, the outcome of the renewal this caller leads,
//!    or the outcome of the renewal it queued behind.
//! 4. The request is replayed once with that token. A 401 on the replay is final.
//!
//! Tokens and cookies are never logged.

pub mod config;
pub mod request;
pub mod response;

use self::{config::ClientConfig, request::ApiRequest, response::ApiResponse};
use crate::{
    error::{Error, RenewalError},
    renewal::{
        coordinator::{RenewalCoordinator, Ticket},
        request_renewal,
    },
    APP_USER_AGENT,
};
use reqwest::{
    cookie::Jar,
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};
use ulid::Ulid;
use url::Url;

/// Which dispatch of a request this is. A request is replayed at most once.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Attempt {
    Initial,
    Replay,
}

/// Result of a session verification call.
#[derive(Debug)]
pub struct SessionCheck {
    /// Credential generation the call was dispatched under.
    pub generation: u64,
    pub result: Result<StatusCode, Error>,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    jar: Arc<Jar>,
    base_url: Url,
    config: ClientConfig,
    coordinator: RenewalCoordinator,
}

impl ApiClient {
    /// Builds the transport for the configured origin.
    ///
    /// # Errors
    /// Returns `Error::Config` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let base_url = Url::parse(config.api_base_url())
            .map_err(|err| Error::Config(format!("invalid API base URL: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .default_headers(headers)
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| Error::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                jar,
                base_url,
                config,
                coordinator: RenewalCoordinator::new(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn coordinator(&self) -> &RenewalCoordinator {
        &self.inner.coordinator
    }

    /// Stores a cookie (e.g. the refresh cookie) for the API origin, as a
    /// browser would after login. Accepts `Set-Cookie` syntax.
    pub fn add_cookie(&self, cookie: &str) {
        self.inner.jar.add_cookie_str(cookie, &self.inner.base_url);
    }

    /// Installs an access token obtained outside the renewal flow.
    pub fn set_access_token(&self, token: SecretString) {
        self.inner.coordinator.set_token(token);
    }

    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.inner.coordinator.credential().token
    }

    /// Forgets the access token without calling the server. Cookies stay.
    pub fn clear_session(&self) {
        self.inner.coordinator.clear_token();
    }

    /// Sends a request through the renewal interceptor.
    ///
    /// # Errors
    /// Returns `Error::Http` for non-401 failures, `Error::RenewalFailed` when a
    /// needed renewal fails, `Error::AuthorizationExpired` when the replay is
    /// still unauthorized, and `Error::Network`/`Error::Timeout` for transport errors.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, Error> {
        let span = tracing::debug_span!(
            "api_request",
            request_id = %Ulid::new(),
            method = %request.method(),
            path = request.path(),
        );
        self.intercept(request).instrument(span).await
    }

    async fn intercept(&self, request: &ApiRequest) -> Result<ApiResponse, Error> {
        let credential = self.inner.coordinator.credential();
        let response = self
            .dispatch(request, credential.token.as_ref(), Attempt::Initial)
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return response.into_result();
        }

        debug!("unauthorized; renewing access token");
        let token = self.renew_after(Some(credential.generation)).await?;
        let replayed = self.dispatch(request, Some(&token), Attempt::Replay).await?;
        self.classify(request, replayed, Attempt::Replay)
    }

    /// Maps a response to the caller's result for the given attempt.
    fn classify(
        &self,
        request: &ApiRequest,
        response: ApiResponse,
        attempt: Attempt,
    ) -> Result<ApiResponse, Error> {
        if response.status() == StatusCode::UNAUTHORIZED && attempt == Attempt::Replay {
            warn!("request still unauthorized after replay");
            return Err(Error::AuthorizationExpired {
                path: request.path().to_string(),
            });
        }
        response.into_result()
    }

    /// Issues one HTTP call without any renewal handling.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&SecretString>,
        attempt: Attempt,
    ) -> Result<ApiResponse, Error> {
        let url = build_url(self.inner.config.api_base_url(), request.path());
        let mut builder = self.inner.http.request(request.method().clone(), &url);
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }

        for (name, value) in request.headers() {
            if bearer.is_some() && name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_request_error)?;
        let status = response.status();
        debug!(status = status.as_u16(), ?attempt, "response received");

        let body = response.bytes().await.map_err(map_request_error)?;
        Ok(ApiResponse::new(status, body.to_vec()))
    }

    /// Renews the access token through the coordinator, joining a renewal that
    /// is already in flight instead of issuing a second refresh call.
    ///
    /// # Errors
    /// Returns the `RenewalError` of the renewal this call led or waited on.
    pub async fn renew(&self) -> Result<SecretString, RenewalError> {
        self.renew_after(None).await
    }

    /// Renews unless the credential has already been renewed since
    /// `generation`, in which case the current token is returned right away.
    ///
    /// # Errors
    /// Returns the `RenewalError` of the renewal this call led or waited on.
    pub async fn renew_since(&self, generation: u64) -> Result<SecretString, RenewalError> {
        self.renew_after(Some(generation)).await
    }

    async fn renew_after(&self, observed: Option<u64>) -> Result<SecretString, RenewalError> {
        match self.inner.coordinator.acquire_or_enqueue(observed) {
            Ticket::Renewed(token) => Ok(token),
            Ticket::Queued(pending) => pending.wait().await,
            Ticket::Leader(lease) => {
                let refreshed = self.refresh_access_token().await;
                let (outcome, released) = lease.release_and_drain(refreshed);
                match &outcome {
                    Ok(_) => info!(released, "access token renewed"),
                    Err(err) => warn!(released, error = %err, "access token renewal failed"),
                }
                outcome
            }
        }
    }

    /// Calls the refresh endpoint once, without single-flight coordination.
    ///
    /// # Errors
    /// Returns `RenewalError` if the refresh call fails.
    pub async fn refresh_access_token(&self) -> Result<SecretString, RenewalError> {
        let url = build_url(
            self.inner.config.api_base_url(),
            self.inner.config.refresh_path(),
        );
        request_renewal(&self.inner.http, &url, self.inner.config.renewal_timeout()).await
    }

    /// Checks the session with the verify endpoint, bypassing the interceptor.
    /// Returns the 2xx status on success.
    ///
    /// # Errors
    /// Returns `Error::AuthorizationExpired` on 401, `Error::VerificationFailed`
    /// for other non-2xx statuses, and `Error::Network`/`Error::Timeout` when no
    /// response arrives.
    pub async fn verify_session(&self) -> Result<StatusCode, Error> {
        self.check_session().await.result
    }

    /// Like [`ApiClient::verify_session`], also reporting the credential
    /// generation the call was sent with, for use with [`ApiClient::renew_since`].
    pub async fn check_session(&self) -> SessionCheck {
        let request = ApiRequest::get(self.inner.config.verify_path());
        let credential = self.inner.coordinator.credential();
        let result = self
            .dispatch(&request, credential.token.as_ref(), Attempt::Initial)
            .await
            .and_then(|response| match response.status() {
                status if status.is_success() => Ok(status),
                StatusCode::UNAUTHORIZED => Err(Error::AuthorizationExpired {
                    path: request.path().to_string(),
                }),
                status => Err(Error::VerificationFailed {
                    status: status.as_u16(),
                }),
            });

        SessionCheck {
            generation: credential.generation,
            result,
        }
    }

    /// Ends the session on the server and forgets the local access token, even
    /// when the server call fails.
    ///
    /// # Errors
    /// Returns the server error after the local token has been cleared.
    pub async fn logout(&self) -> Result<(), Error> {
        let request = ApiRequest::post(self.inner.config.logout_path());
        let credential = self.inner.coordinator.credential();
        let result = self
            .dispatch(&request, credential.token.as_ref(), Attempt::Initial)
            .await
            .and_then(ApiResponse::into_result);
        self.clear_session();

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(error = %err, "logout call failed; local session cleared");
                Err(err)
            }
        }
    }

    /// Fetches JSON through the interceptor.
    ///
    /// # Errors
    /// See [`ApiClient::send`]; also `Error::Parse` for undecodable bodies.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.send(&ApiRequest::get(path)).await?.json()
    }

    /// Posts JSON and decodes a JSON answer.
    ///
    /// # Errors
    /// See [`ApiClient::send`]; also `Error::Serialization`/`Error::Parse`.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let request = ApiRequest::post(path).with_json(body)?;
        self.send(&request).await?.json()
    }

    /// Posts without a body and ignores the answer body.
    ///
    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn post_empty(&self, path: &str) -> Result<(), Error> {
        self.send(&ApiRequest::post(path)).await.map(|_| ())
    }

    /// Deletes a resource and ignores the answer body.
    ///
    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        self.send(&ApiRequest::delete(path)).await.map(|_| ())
    }
}

/// Builds a URL from the base URL and the provided path.
fn build_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps transport errors, telling timeouts apart from unreachable servers.
fn map_request_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout("Request timed out. Please try again.".to_string())
    } else {
        Error::Network(format!("Unable to reach the server: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::{json, Value};
    use std::net::TcpListener;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client_for(server: &MockServer) -> Result<ApiClient> {
        Ok(ApiClient::new(ClientConfig::new(&server.uri())?)?)
    }

    async fn refresh_calls(server: &MockServer) -> Result<usize> {
        let Some(requests) = server.received_requests().await else {
            anyhow::bail!("wiremock request recording is disabled");
        };
        Ok(requests
            .iter()
            .filter(|request| request.url.path() == "/auth/refresh")
            .count())
    }

    #[test]
    fn build_url_joins_slashes() {
        assert_eq!(build_url("https://api.test/", "/users"), "https://api.test/users");
        assert_eq!(build_url("https://api.test", "users"), "https://api.test/users");
        assert_eq!(build_url("", "/users"), "/users");
    }

    #[test]
    fn clear_session_forgets_token() -> Result<()> {
        let client = ApiClient::new(ClientConfig::new("https://api.test")?)?;
        client.set_access_token(SecretString::from("T1".to_string()));
        let before = client.coordinator().credential().generation;

        client.clear_session();
        assert!(client.access_token().is_none());
        assert_eq!(client.coordinator().credential().generation, before + 1);
        Ok(())
    }

    #[tokio::test]
    async fn success_passes_through_without_renewal() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/groups"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let groups: Value = client.get_json("/groups").await?;
        assert_eq!(groups[0]["id"], 1);
        assert_eq!(refresh_calls(&server).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn non_unauthorized_failure_propagates_unchanged() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let result = client.send(&ApiRequest::get("/users")).await;
        match result {
            Err(Error::Http { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "forbidden");
            }
            other => anyhow::bail!("unexpected result: {other:?}"),
        }
        assert_eq!(refresh_calls(&server).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn unauthorized_renews_and_replays_with_bearer() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mealLogs"))
            .and(header("Authorization", "Bearer T2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 3 })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/mealLogs"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "T2" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        client.set_access_token(SecretString::from("T1".to_string()));

        let body: Value = client.get_json("/mealLogs").await?;
        assert_eq!(body["count"], 3);
        assert_eq!(
            client.access_token().map(|t| t.expose_secret().to_string()),
            Some("T2".to_string())
        );

        // the renewed token is attached to later requests up front
        let again: Value = client.get_json("/mealLogs").await?;
        assert_eq!(again["count"], 3);
        assert_eq!(refresh_calls(&server).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn replayed_request_is_not_retried_twice() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "T2" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let result = client.send(&ApiRequest::get("/users")).await;
        assert!(matches!(result, Err(Error::AuthorizationExpired { .. })));
        assert_eq!(refresh_calls(&server).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_failure_surfaces_as_renewal_failed() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_string("refresh expired"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let result = client.send(&ApiRequest::get("/users")).await;
        match result {
            Err(Error::RenewalFailed(RenewalError::Rejected { status, .. })) => {
                assert_eq!(status, 401);
            }
            other => anyhow::bail!("unexpected result: {other:?}"),
        }
        assert_eq!(client.coordinator().state(), crate::RenewalState::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn caller_authorization_header_is_replaced_by_bearer() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        client.set_access_token(SecretString::from("T1".to_string()));
        let request = ApiRequest::get("/messages").with_header("Authorization", "Basic stale");
        let response = client.send(&request).await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_cookie_is_sent_with_renewal() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(header("Cookie", "refresh_token=r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "T2" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        client.add_cookie("refresh_token=r1; Path=/; HttpOnly");
        let token = client.renew().await?;
        assert_eq!(token.expose_secret(), "T2");
        Ok(())
    }

    #[tokio::test]
    async fn verify_session_maps_statuses() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/verify"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let result = client.verify_session().await;
        assert!(matches!(result, Err(Error::VerificationFailed { status: 503 })));
        assert_eq!(refresh_calls(&server).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_token_even_on_failure() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        client.set_access_token(SecretString::from("T1".to_string()));
        assert!(client.logout().await.is_err());
        assert!(client.access_token().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn logout_during_renewal_keeps_session_cleared() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access_token": "T2" }))
                    .set_delay(Duration::from_millis(400)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        client.set_access_token(SecretString::from("T1".to_string()));

        let request = tokio::spawn({
            let client = client.clone();
            async move { client.send(&ApiRequest::get("/users")).await }
        });
        tokio::time::sleep(Duration::from_millis(150)).await;
        client.logout().await?;
        assert!(client.access_token().is_none());

        let result = request.await?;
        assert!(matches!(
            result,
            Err(Error::RenewalFailed(RenewalError::SessionCleared))
        ));
        assert!(client.access_token().is_none());
        assert_eq!(client.coordinator().state(), crate::RenewalState::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn post_json_sends_body_and_decodes_answer() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/groups"))
            .and(body_json(json!({ "name": "night shift" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let created: Value = client
            .post_json("/groups", &json!({ "name": "night shift" }))
            .await?;
        assert_eq!(created["id"], 7);
        Ok(())
    }

    #[tokio::test]
    async fn post_empty_and_delete_ignore_bodies() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages/3/read"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/mealLogs/9"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/mealLogs/10"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        client.post_empty("/messages/3/read").await?;
        client.delete("/mealLogs/9").await?;
        assert!(matches!(
            client.delete("/mealLogs/10").await,
            Err(Error::Http { status: 404, .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn put_goes_through_the_interceptor() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/users/4"))
            .and(header("Authorization", "Bearer T2"))
            .and(body_json(json!({ "active": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "active": false })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/users/4"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "T2" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let request = ApiRequest::put("/users/4").with_json(&json!({ "active": false }))?;
        let updated: Value = client.send(&request).await?.json()?;
        assert_eq!(updated["active"], false);
        Ok(())
    }
}
