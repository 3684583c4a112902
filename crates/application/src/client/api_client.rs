//! Authenticated API client.
//!
//! Every call goes to `base_url + endpoint`, carries the current access
//! token as a bearer credential and is decoded from the response envelope.
//! A 401 on an authenticated call triggers at most one refresh per logical
//! call; concurrent 401s share a single refresh exchange.

use std::sync::Arc;

use clipper_domain::auth::bearer;
use clipper_domain::request::JSON_CONTENT_TYPE;
use clipper_domain::{
    ApiResponse, AuthTokens, Envelope, ExpiryReason, HttpMethod, RefreshRequest, RequestConfig,
    SessionEvent, generate_request_id,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::refresh::{RefreshCoordinator, RefreshOutcome, Turn};
use crate::auth::TokenStore;
use crate::error::{ApiError, ApiResult};
use crate::ports::{HttpTransport, TransportRequest, TransportResponse};

/// Login endpoint.
pub const LOGIN_ENDPOINT: &str = "/auth/login";
/// Refresh endpoint.
pub const REFRESH_ENDPOINT: &str = "/auth/refresh";
/// Current-user endpoint.
pub const ME_ENDPOINT: &str = "/me";

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";
const REQUEST_ID: &str = "X-Request-Id";
const EVENT_CAPACITY: usize = 16;

/// HTTP client for the barbershop API.
///
/// Share it behind an `Arc`; the refresh state is per instance.
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    refresh: RefreshCoordinator,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    /// Creates a client for `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        tokens: TokenStore,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            base_url,
            transport,
            tokens,
            refresh: RefreshCoordinator::default(),
            events,
        }
    }

    /// The configured base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token store this client reads and writes.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Subscribe to session events (refreshes, expiry, login, logout).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Returns true while a refresh exchange is outstanding.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refresh.in_flight()
    }

    pub(crate) fn publish(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("no session listeners");
        }
    }

    /// Performs a call and decodes its envelope.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] when no response was received
    /// - [`ApiError::Unauthorized`] on a 401 that a refresh did not cure
    /// - [`ApiError::SessionExpired`] when the refresh itself failed
    /// - [`ApiError::Api`] for any other non-2xx status
    /// - [`ApiError::Decode`] / [`ApiError::Domain`] for malformed bodies
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        config: RequestConfig,
    ) -> ApiResult<ApiResponse<T>> {
        let request_id = generate_request_id();
        let response = self.execute(endpoint, &config, &request_id).await?;
        decode_response(&response)
    }

    /// GET `endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<ApiResponse<T>> {
        self.request(endpoint, RequestConfig::new(HttpMethod::Get))
            .await
    }

    /// POST `body` to `endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also [`ApiError::InvalidBody`].
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<ApiResponse<T>> {
        self.request(endpoint, json_config(HttpMethod::Post, body)?)
            .await
    }

    /// PUT `body` to `endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also [`ApiError::InvalidBody`].
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<ApiResponse<T>> {
        self.request(endpoint, json_config(HttpMethod::Put, body)?)
            .await
    }

    /// PATCH `body` to `endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also [`ApiError::InvalidBody`].
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<ApiResponse<T>> {
        self.request(endpoint, json_config(HttpMethod::Patch, body)?)
            .await
    }

    /// DELETE `endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<ApiResponse<T>> {
        self.request(endpoint, RequestConfig::new(HttpMethod::Delete))
            .await
    }

    /// Sends the call, renewing credentials once on 401.
    async fn execute(
        &self,
        endpoint: &str,
        config: &RequestConfig,
        request_id: &str,
    ) -> ApiResult<TransportResponse> {
        if config.skip_auth {
            return self.send(endpoint, config, None, request_id).await;
        }

        let (token, generation) = self.tokens.snapshot().await;
        let response = self
            .send(endpoint, config, token.as_deref(), request_id)
            .await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!(request_id, endpoint, "access token rejected");
        let token = self.renew(generation).await?;

        // Retried once; a second 401 is returned as-is.
        self.send(endpoint, config, Some(&token), request_id).await
    }

    /// Obtains a usable access token after a 401 seen at `generation`.
    async fn renew(&self, generation: u64) -> ApiResult<String> {
        match self.refresh.begin(generation, || self.tokens.generation()) {
            Turn::Changed => self.tokens.access_token().await.ok_or(ApiError::SessionExpired {
                reason: ExpiryReason::NoRefreshToken,
            }),
            Turn::Wait(outcome) => {
                debug!("waiting for refresh in progress");
                match outcome.await {
                    Ok(Ok(token)) => Ok(token),
                    Ok(Err(reason)) => Err(ApiError::SessionExpired { reason }),
                    Err(_) => Err(ApiError::RefreshInterrupted),
                }
            }
            Turn::Lead(lease) => {
                let outcome = self.refresh_tokens(generation).await;
                debug!(waiters = self.refresh.waiting(), "refresh settled");
                lease.settle(&outcome);
                outcome.map_err(|reason| ApiError::SessionExpired { reason })
            }
        }
    }

    /// Runs one refresh exchange and applies its result to the session.
    ///
    /// The result is applied only if the store still holds the pair seen at
    /// `generation`. A login or logout that lands during the exchange wins.
    async fn refresh_tokens(&self, generation: u64) -> RefreshOutcome {
        match self.exchange_refresh_token().await {
            Ok(tokens) => {
                let pair = tokens.into_pair();
                let access_token = pair.access_token.clone();
                if !self.tokens.set_tokens_if(generation, pair).await {
                    return self.superseded().await;
                }
                info!("access token refreshed");
                self.publish(SessionEvent::TokensRefreshed);
                Ok(access_token)
            }
            Err(reason) => {
                if !self.tokens.clear_tokens_if(generation).await {
                    return self.superseded().await;
                }
                warn!(reason = reason.describe(), "token refresh failed; clearing session");
                self.publish(SessionEvent::Expired { reason });
                Err(reason)
            }
        }
    }

    /// Outcome for a refresh whose result was discarded.
    async fn superseded(&self) -> RefreshOutcome {
        debug!("session changed during refresh; discarding result");
        self.tokens
            .access_token()
            .await
            .ok_or(ExpiryReason::SignedOut)
    }

    async fn exchange_refresh_token(&self) -> Result<AuthTokens, ExpiryReason> {
        let refresh_token = self
            .tokens
            .refresh_token()
            .await
            .ok_or(ExpiryReason::NoRefreshToken)?;

        let config = RequestConfig::new(HttpMethod::Post)
            .with_json(&RefreshRequest { refresh_token })
            .map_err(|_| ExpiryReason::RefreshRejected)?
            .skip_auth();

        let request_id = generate_request_id();
        let response = self
            .send(REFRESH_ENDPOINT, &config, None, &request_id)
            .await
            .map_err(|_| ExpiryReason::RefreshUnreachable)?;

        decode_response::<AuthTokens>(&response)
            .and_then(|response| response.into_data().map_err(ApiError::from))
            .map_err(|e| {
                debug!(error = %e, "refresh token refused");
                ExpiryReason::RefreshRejected
            })
    }

    /// Issues exactly one transport call.
    async fn send(
        &self,
        endpoint: &str,
        config: &RequestConfig,
        token: Option<&str>,
        request_id: &str,
    ) -> ApiResult<TransportResponse> {
        let request = self.build_request(endpoint, config, token, request_id)?;
        debug!(
            request_id,
            method = %request.method,
            url = %request.url,
            authenticated = request.header(AUTHORIZATION).is_some(),
            "sending request"
        );

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(request_id, error = %e, "request failed");
            ApiError::Transport(e)
        })?;

        debug!(request_id, status = response.status, "response received");
        Ok(response)
    }

    fn build_request(
        &self,
        endpoint: &str,
        config: &RequestConfig,
        token: Option<&str>,
        request_id: &str,
    ) -> ApiResult<TransportRequest> {
        let mut headers: Vec<(String, String)> = config
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        if !config.has_header(CONTENT_TYPE) {
            headers.push((CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()));
        }

        if !config.skip_auth
            && let Some(token) = token
        {
            headers.retain(|(name, _)| !name.eq_ignore_ascii_case(AUTHORIZATION));
            headers.push((AUTHORIZATION.to_string(), bearer(token)));
        }

        headers.push((REQUEST_ID.to_string(), request_id.to_string()));

        let body = config
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ApiError::InvalidBody(e.to_string()))?;

        Ok(TransportRequest {
            method: config.method,
            url: format!("{}{endpoint}", self.base_url),
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

fn json_config<B: Serialize + ?Sized>(method: HttpMethod, body: &B) -> ApiResult<RequestConfig> {
    RequestConfig::new(method)
        .with_json(body)
        .map_err(|e| ApiError::InvalidBody(e.to_string()))
}

/// Turns a raw response into the checked envelope or an error.
pub(crate) fn decode_response<T: DeserializeOwned>(
    response: &TransportResponse,
) -> ApiResult<ApiResponse<T>> {
    if !response.is_success() {
        let envelope = serde_json::from_slice::<Envelope>(&response.body).ok();
        let message = envelope
            .as_ref()
            .and_then(|e| e.reason())
            .map_or_else(
                || format!("Request failed with status {}", response.status),
                str::to_string,
            );

        if response.is_unauthorized() {
            return Err(ApiError::Unauthorized { message });
        }
        return Err(ApiError::Api {
            status: response.status,
            message,
            code: envelope.and_then(|e| e.code),
        });
    }

    let envelope: Envelope = if response.body.iter().all(u8::is_ascii_whitespace) {
        Envelope::empty()
    } else {
        serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?
    };

    Ok(envelope.decode()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::{Clock, TransportError, TransportFuture};
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::task::JoinSet;

    const BASE: &str = "http://shop.test/api";
    const VALID_ACCESS: &str = "access-2";

    struct SystemTime;

    impl Clock for SystemTime {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Scripted server: accepts `VALID_ACCESS`, and rotates to it when the
    /// accepted refresh token is presented.
    struct FakeServer {
        accepted_refresh: Option<&'static str>,
        refresh_delay: Duration,
        refresh_calls: AtomicUsize,
        requests: Mutex<Vec<TransportRequest>>,
    }

    impl FakeServer {
        fn new(accepted_refresh: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                accepted_refresh,
                refresh_delay: Duration::from_millis(20),
                refresh_calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn refresh_calls(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }

        fn recorded(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn respond(&self, path: &str, request: &TransportRequest) -> TransportResponse {
            let authorized = request.header("Authorization") == Some(bearer(VALID_ACCESS).as_str());
            match path {
                "/auth/refresh" => {
                    let body: Value =
                        serde_json::from_slice(request.body.as_deref().unwrap_or(b"{}".as_slice())).unwrap();
                    let presented = body["refresh_token"].as_str();
                    if self.accepted_refresh.is_some() && presented == self.accepted_refresh {
                        json_response(
                            200,
                            &json!({
                                "success": true,
                                "data": {
                                    "access_token": VALID_ACCESS,
                                    "refresh_token": "refresh-2",
                                    "type": "Bearer"
                                },
                                "timestamp": "t"
                            }),
                        )
                    } else {
                        json_response(
                            401,
                            &json!({"success": false, "error": "Invalid refresh token", "timestamp": "t"}),
                        )
                    }
                }
                "/locked" => json_response(
                    401,
                    &json!({"success": false, "error": "Forbidden for you", "timestamp": "t"}),
                ),
                "/missing" => json_response(
                    404,
                    &json!({"success": false, "error": "Customer not found", "code": "NOT_FOUND", "timestamp": "t"}),
                ),
                "/soft-fail" => json_response(
                    200,
                    &json!({"success": false, "error": "Closed today", "timestamp": "t"}),
                ),
                "/empty" => TransportResponse::new(204, Vec::new()),
                _ if authorized => json_response(
                    200,
                    &json!({"success": true, "data": {"path": path}, "timestamp": "t"}),
                ),
                _ => json_response(
                    401,
                    &json!({"success": false, "error": "Token expired", "timestamp": "t"}),
                ),
            }
        }
    }

    fn json_response(status: u16, body: &Value) -> TransportResponse {
        TransportResponse::new(status, serde_json::to_vec(body).unwrap())
    }

    impl HttpTransport for FakeServer {
        fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
            Box::pin(async move {
                self.requests.lock().unwrap().push(request.clone());
                let path = request
                    .url
                    .strip_prefix(BASE)
                    .unwrap_or(&request.url)
                    .to_string();
                if path == "/auth/refresh" {
                    self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(self.refresh_delay).await;
                }
                Ok(self.respond(&path, &request))
            })
        }
    }

    struct Unreachable;

    impl HttpTransport for Unreachable {
        fn send(&self, _request: TransportRequest) -> TransportFuture<'_> {
            Box::pin(async {
                Err(TransportError::ConnectionRefused {
                    host: "shop.test".to_string(),
                    port: 80,
                })
            })
        }
    }

    async fn client_with(server: Arc<FakeServer>, tokens: Option<(&str, &str)>) -> Arc<ApiClient> {
        let store = TokenStore::new(Arc::new(SystemTime));
        if let Some((access, refresh)) = tokens {
            store.set_tokens(access, refresh).await;
        }
        Arc::new(ApiClient::new(format!("{BASE}/"), server, store))
    }

    #[tokio::test]
    async fn test_attaches_bearer_and_default_headers() {
        let server = FakeServer::new(None);
        let client = client_with(server.clone(), Some((VALID_ACCESS, "refresh-2"))).await;

        let response = client.get::<Value>("/me").await.unwrap();
        assert_eq!(response.data(), Some(&json!({"path": "/me"})));

        let sent = server.recorded();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "http://shop.test/api/me");
        assert_eq!(sent[0].header("Authorization"), Some("Bearer access-2"));
        assert_eq!(sent[0].header("Content-Type"), Some("application/json"));
        assert!(sent[0].header("X-Request-Id").is_some());
        assert_eq!(server.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_caller_content_type_is_kept() {
        let server = FakeServer::new(None);
        let client = client_with(server.clone(), Some((VALID_ACCESS, "r"))).await;

        let config = RequestConfig::new(HttpMethod::Post)
            .with_header("content-type", "text/plain")
            .with_body(json!("hello"));
        client.request::<Value>("/notes", config).await.unwrap();

        let sent = server.recorded();
        let content_types: Vec<_> = sent[0]
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(sent[0].header("Content-Type"), Some("text/plain"));
        assert_eq!(sent[0].body.as_deref(), Some(&b"\"hello\""[..]));
    }

    #[tokio::test]
    async fn test_skip_auth_never_sends_bearer_or_refreshes() {
        let server = FakeServer::new(Some("refresh-1"));
        let client = client_with(server.clone(), Some(("access-1", "refresh-1"))).await;

        let config = RequestConfig::new(HttpMethod::Get).skip_auth();
        let result = client.request::<Value>("/me", config).await;

        assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
        assert_eq!(server.refresh_calls(), 0);
        assert!(server.recorded()[0].header("Authorization").is_none());
        assert!(client.tokens().has_tokens().await);
    }

    #[tokio::test]
    async fn test_expired_access_is_refreshed_transparently() {
        let server = FakeServer::new(Some("refresh-1"));
        let client = client_with(server.clone(), Some(("access-1", "refresh-1"))).await;
        let mut events = client.subscribe();

        let response = client.get::<Value>("/customers").await.unwrap();

        assert!(response.is_success());
        assert_eq!(server.refresh_calls(), 1);
        assert_eq!(
            client.tokens().access_token().await.as_deref(),
            Some(VALID_ACCESS)
        );
        assert_eq!(
            client.tokens().refresh_token().await.as_deref(),
            Some("refresh-2")
        );
        assert_eq!(events.recv().await.unwrap(), SessionEvent::TokensRefreshed);

        let sent = server.recorded();
        let refresh = sent.iter().find(|r| r.url.ends_with("/auth/refresh")).unwrap();
        assert!(refresh.header("Authorization").is_none());
        let last = sent.last().unwrap();
        assert!(last.url.ends_with("/customers"));
        assert_eq!(last.header("Authorization"), Some("Bearer access-2"));
        // Retry keeps the logical call's id.
        assert_eq!(sent[0].header("X-Request-Id"), last.header("X-Request-Id"));
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let server = FakeServer::new(Some("refresh-1"));
        let client = client_with(server.clone(), Some(("access-1", "refresh-1"))).await;

        let mut calls = JoinSet::new();
        for i in 0..5 {
            let client = client.clone();
            calls.spawn(async move { client.get::<Value>(&format!("/appointments/{i}")).await });
        }

        let mut succeeded = 0;
        while let Some(result) = calls.join_next().await {
            assert!(result.unwrap().unwrap().is_success());
            succeeded += 1;
        }

        assert_eq!(succeeded, 5);
        assert_eq!(server.refresh_calls(), 1);
        assert!(!client.is_refreshing());

        let retried = server
            .recorded()
            .into_iter()
            .filter(|r| r.url.contains("/appointments/"))
            .filter(|r| r.header("Authorization") == Some("Bearer access-2"))
            .count();
        assert_eq!(retried, 5);
    }

    #[tokio::test]
    async fn test_failed_refresh_fails_every_queued_call() {
        let server = FakeServer::new(None);
        let client = client_with(server.clone(), Some(("access-1", "refresh-1"))).await;
        let mut events = client.subscribe();

        let mut calls = JoinSet::new();
        for i in 0..4 {
            let client = client.clone();
            calls.spawn(async move { client.get::<Value>(&format!("/staff/{i}")).await });
        }

        while let Some(result) = calls.join_next().await {
            let error = result.unwrap().unwrap_err();
            assert!(error.requires_login(), "unexpected error: {error}");
        }

        assert_eq!(server.refresh_calls(), 1);
        assert!(!client.tokens().has_tokens().await);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::Expired {
                reason: ExpiryReason::RefreshRejected
            }
        );
    }

    async fn until_refreshing(client: &ApiClient) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !client.is_refreshing() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("refresh never started");
    }

    #[tokio::test]
    async fn test_logout_during_refresh_stays_logged_out() {
        let server = FakeServer::new(Some("refresh-1"));
        let client = client_with(server, Some(("access-1", "refresh-1"))).await;
        let mut events = client.subscribe();

        let call = tokio::spawn({
            let client = client.clone();
            async move { client.get::<Value>("/customers").await }
        });
        until_refreshing(&client).await;
        client.tokens().clear_tokens().await;

        let result = call.await.unwrap();

        assert!(matches!(
            result,
            Err(ApiError::SessionExpired {
                reason: ExpiryReason::SignedOut
            })
        ));
        assert!(!client.tokens().has_tokens().await);
        assert!(!client.is_refreshing());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_login_during_failed_refresh_is_kept() {
        let server = FakeServer::new(None);
        let client = client_with(server, Some(("access-1", "refresh-1"))).await;
        let mut events = client.subscribe();

        let call = tokio::spawn({
            let client = client.clone();
            async move { client.get::<Value>("/customers").await }
        });
        until_refreshing(&client).await;
        client.tokens().set_tokens(VALID_ACCESS, "refresh-9").await;

        let response = call.await.unwrap().unwrap();

        assert!(response.is_success());
        assert_eq!(
            client.tokens().tokens().await,
            Some(clipper_domain::TokenPair::new(VALID_ACCESS, "refresh-9"))
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_missing_refresh_token_fails_without_network() {
        let server = FakeServer::new(Some("refresh-1"));
        let client = client_with(server.clone(), None).await;

        let result = client.get::<Value>("/me").await;

        assert!(matches!(
            result,
            Err(ApiError::SessionExpired {
                reason: ExpiryReason::NoRefreshToken
            })
        ));
        assert_eq!(server.refresh_calls(), 0);
        assert_eq!(server.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_second_401_is_not_retried_again() {
        let server = FakeServer::new(Some("refresh-1"));
        let client = client_with(server.clone(), Some(("access-1", "refresh-1"))).await;

        let result = client.get::<Value>("/locked").await;

        match result {
            Err(ApiError::Unauthorized { message }) => assert_eq!(message, "Forbidden for you"),
            other => panic!("expected unauthorized, got {other:?}"),
        }
        assert_eq!(server.refresh_calls(), 1);
        assert_eq!(server.recorded().len(), 3);
        // The refresh itself succeeded, so the session stays.
        assert!(client.tokens().has_tokens().await);
    }

    #[tokio::test]
    async fn test_application_errors_pass_through() {
        let server = FakeServer::new(Some("refresh-1"));
        let client = client_with(server.clone(), Some((VALID_ACCESS, "refresh-2"))).await;

        let result = client.get::<Value>("/missing").await;

        match result {
            Err(ApiError::Api {
                status,
                message,
                code,
            }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Customer not found");
                assert_eq!(code.as_deref(), Some("NOT_FOUND"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
        assert_eq!(server.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_soft_failure_is_a_failure_variant() {
        let server = FakeServer::new(None);
        let client = client_with(server, Some((VALID_ACCESS, "r"))).await;

        let response = client.get::<Value>("/soft-fail").await.unwrap();
        let failure = response.into_data().unwrap_err();
        assert_eq!(failure.reason(), "Closed today");
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_unit() {
        let server = FakeServer::new(None);
        let client = client_with(server, Some((VALID_ACCESS, "r"))).await;

        let response = client.delete::<()>("/empty").await.unwrap();
        assert_eq!(response.into_data(), Ok(()));
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let store = TokenStore::new(Arc::new(SystemTime));
        store.set_tokens("a", "r").await;
        let client = ApiClient::new(BASE, Arc::new(Unreachable), store);

        let result = client.get::<Value>("/me").await;

        assert!(matches!(
            result,
            Err(ApiError::Transport(TransportError::ConnectionRefused { .. }))
        ));
        assert!(client.tokens().has_tokens().await);
    }

    #[test]
    fn test_decode_non_json_error_uses_fallback() {
        let response = TransportResponse::new(502, b"<html>bad gateway</html>".to_vec());
        match decode_response::<Value>(&response) {
            Err(ApiError::Api { status, message, .. }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "Request failed with status 502");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_garbage_success_body() {
        let response = TransportResponse::new(200, b"not json".to_vec());
        assert!(matches!(
            decode_response::<Value>(&response),
            Err(ApiError::Decode(_))
        ));
    }
}
