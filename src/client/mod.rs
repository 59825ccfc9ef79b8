//! HTTP client for the API.
//!
//! Every request carries the current access token. A 401 triggers one
//! refresh through [`session::SessionStore`]; callers that hit 401 while that
//! refresh is running wait for it and reuse the rotated token. When the
//! refresh itself is rejected the session is cleared and
//! [`SessionEvent::LoggedOut`] is published.

mod session;

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::watch;

pub use session::{Session, SessionEvent, SessionStore};

use crate::routes::API_PREFIX;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    #[error("not logged in")]
    NotLoggedIn,

    #[error("session expired; log in again")]
    SessionExpired,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    message: String,
    data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody<'a> {
    access_token: &'a str,
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogoutBody<'a> {
    refresh_token: &'a str,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    sessions: Arc<SessionStore>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sessions: Arc::new(SessionStore::new()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.sessions.subscribe()
    }

    pub async fn session(&self) -> Option<Session> {
        self.sessions.current().await
    }

    /// Installs a session obtained elsewhere, e.g. restored from disk.
    pub async fn set_session(&self, session: Session) {
        self.sessions.replace(session, SessionEvent::LoggedIn).await;
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        self.authenticate("auth/login", email, password).await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        self.authenticate("auth/register", email, password).await
    }

    /// Revokes the refresh token on the server, then drops the local
    /// session. An expired access token is refreshed first so the revoke
    /// goes through with the rotated refresh token.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let Some(session) = self.sessions.current().await else {
            return Ok(());
        };

        let mut response = self.send_logout(&session).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            match self.refresh_after(&session.access_token).await {
                Ok(_) => {}
                // Nothing left to revoke; the refresh path already cleared
                // the session and published `LoggedOut`.
                Err(ClientError::SessionExpired) => return Ok(()),
                Err(err) => return Err(err),
            }
            let Some(rotated) = self.sessions.current().await else {
                return Ok(());
            };
            response = self.send_logout(&rotated).await?;
        }

        let result = decode::<()>(response).await;
        self.sessions.take(SessionEvent::LoggedOut).await;
        result
    }

    async fn send_logout(&self, session: &Session) -> Result<reqwest::Response, ClientError> {
        let body = serde_json::to_value(LogoutBody {
            refresh_token: &session.refresh_token,
        })?;
        self.dispatch(
            &Method::POST,
            "auth/logout",
            Some(&body),
            &session.access_token,
        )
        .await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(Method::POST, path, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(Method::PUT, path, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(Method::DELETE, path, None).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let token = self
            .sessions
            .access_token()
            .await
            .ok_or(ClientError::NotLoggedIn)?;

        let response = self.dispatch(&method, path, body.as_ref(), &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        let token = self.refresh_after(&token).await?;
        let response = self.dispatch(&method, path, body.as_ref(), &token).await?;
        decode(response).await
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Returns a usable access token after `stale` was rejected, refreshing
    /// at most once no matter how many callers arrive here together.
    async fn refresh_after(&self, stale: &str) -> Result<String, ClientError> {
        let mut guard = self.sessions.lock().await;
        let Some(current) = guard.as_ref() else {
            return Err(ClientError::SessionExpired);
        };
        if current.access_token != stale {
            return Ok(current.access_token.clone());
        }

        match self.request_refresh(current).await {
            Ok(session) => {
                let token = session.access_token.clone();
                *guard = Some(session);
                self.sessions.publish(SessionEvent::Refreshed);
                tracing::debug!("access token refreshed");
                Ok(token)
            }
            Err(err) => {
                *guard = None;
                self.sessions.publish(SessionEvent::LoggedOut);
                tracing::warn!(error = %err, "token refresh failed; session cleared");
                Err(ClientError::SessionExpired)
            }
        }
    }

    async fn request_refresh(&self, session: &Session) -> Result<Session, ClientError> {
        let response = self
            .http
            .post(self.url("auth/refresh-token"))
            .json(&RefreshBody {
                access_token: &session.access_token,
                refresh_token: &session.refresh_token,
            })
            .send()
            .await?;
        decode(response).await
    }

    async fn authenticate(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let response = self
            .http
            .post(self.url(path))
            .json(&Credentials { email, password })
            .send()
            .await?;
        let session: Session = decode(response).await?;
        self.sessions
            .replace(session.clone(), SessionEvent::LoggedIn)
            .await;
        Ok(session)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            API_PREFIX,
            path.trim_start_matches('/')
        )
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        let message = serde_json::from_slice::<Envelope<serde_json::Value>>(&bytes)
            .map(|envelope| envelope.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
    if !envelope.success {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: envelope.message,
        });
    }
    Ok(envelope.data)
}
