//! HTTP client for the sync server.
//!
//! Push sends the whole local document. Pull replaces the local document
//! with the remote one when the remote one is non-empty. There is no
//! field-level merge: whichever device synced last wins.

use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::SyncError;
use crate::models::AppData;
use crate::protocol::{
    Ack, AuthResponse, DataPayload, DataTypeDocument, ErrorBody, LoginRequest, Profile,
    ProfileUpdated, RegisterRequest, SyncDocument, UpdateProfileRequest, UserInfo,
    VerifyResponse,
};
use crate::store::{LocalStore, AUTH_TOKEN_KEY, LAST_SYNC_KEY, SESSION_KEYS, USER_DATA_KEY};

/// Timeout for the `/health` check.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for every other request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What a pull did to the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulled {
    /// The local document was replaced by one with this many top-level keys.
    Replaced(usize),
    /// The server holds nothing yet; local data was left alone.
    Empty,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserInfo,
    /// `None` when the follow-up pull failed.
    pub pulled: Option<Pulled>,
}

/// Result of a pull followed by a push.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub pulled: Pulled,
    pub pushed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_authenticated: bool,
    pub is_online: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub user: Option<UserInfo>,
}

pub struct SyncClient {
    http: reqwest::Client,
    base_url: String,
    store: LocalStore,
    online: AtomicBool,
}

impl SyncClient {
    /// `base_url` is the API root, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>, store: LocalStore) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            store,
            online: AtomicBool::new(true),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ------------------------------------------------------------------
    // Session state
    // ------------------------------------------------------------------

    pub fn token(&self) -> Option<String> {
        match self.store.get_item(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::error!("Failed to read session token: {}", e);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Result of the last network exchange (or health check).
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    /// The user stored at login, if any.
    pub fn cached_user(&self) -> Option<UserInfo> {
        let raw = self.store.get_item(USER_DATA_KEY).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        let raw = self.store.get_item(LAST_SYNC_KEY).ok().flatten()?;
        DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn sync_status(&self) -> SyncStatus {
        SyncStatus {
            is_authenticated: self.is_authenticated(),
            is_online: self.is_online(),
            last_sync: self.last_sync(),
            user: self.cached_user(),
        }
    }

    fn store_session(&self, token: &str, user: &UserInfo) -> Result<(), SyncError> {
        self.store.set_item(AUTH_TOKEN_KEY, token)?;
        self.store
            .set_item(USER_DATA_KEY, &serde_json::to_string(user)?)?;
        Ok(())
    }

    fn mark_synced(&self) -> Result<DateTime<Utc>, SyncError> {
        let now = Utc::now();
        self.store.set_item(LAST_SYNC_KEY, &now.to_rfc3339())?;
        Ok(now)
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    /// Calls `GET /health` and records the result.
    pub async fn check_online(&self) -> bool {
        let online = match self
            .http
            .get(self.url("/health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Health check failed: {}", e);
                false
            }
        };
        self.online.store(online, Ordering::Relaxed);
        online
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, SyncError> {
        let token = self.token().ok_or(SyncError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, SyncError> {
        match request.timeout(REQUEST_TIMEOUT).send().await {
            Ok(response) => {
                self.online.store(true, Ordering::Relaxed);
                Ok(response)
            }
            Err(e) => {
                if e.is_connect() || e.is_timeout() {
                    self.online.store(false, Ordering::Relaxed);
                }
                Err(SyncError::Network(e))
            }
        }
    }

    /// Passes successful responses through and turns the rest into errors.
    async fn check(response: Response) -> Result<Response, SyncError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .or_else(|_| {
                serde_json::from_str::<VerifyResponse>(&body)
                    .map(|v| v.error.unwrap_or_default())
            })
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        if status == StatusCode::UNAUTHORIZED {
            Err(SyncError::Auth(message))
        } else {
            Err(SyncError::Remote {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn require_online(&self) -> Result<(), SyncError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(SyncError::Offline)
        }
    }

    // ------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------

    /// Sends the whole stored document as it is, records the typed model
    /// cannot read included. Local data is never modified. An unreadable
    /// local document is an error; nothing is sent.
    pub async fn push(&self) -> Result<DateTime<Utc>, SyncError> {
        let request = self.authorized(self.http.post(self.url("/data/sync")))?;
        self.require_online()?;

        let data = match self.store.document()? {
            Some(document) => Value::Object(document),
            None => AppData::defaults(),
        };
        let response = self
            .send(request.json(&DataPayload { data: Some(data) }))
            .await?;
        let ack: Ack = Self::check(response).await?.json().await?;

        let at = self.mark_synced()?;
        tracing::info!("Pushed local data: {}", ack.message);
        Ok(at)
    }

    /// Fetches the remote document and, if it is non-empty, makes it the
    /// local document.
    pub async fn pull(&self) -> Result<Pulled, SyncError> {
        let request = self.authorized(self.http.get(self.url("/data/sync")))?;
        self.require_online()?;

        let response = self.send(request).await?;
        let document: SyncDocument = Self::check(response).await?.json().await?;

        let pulled = if document.data.is_empty() {
            tracing::info!("Remote document is empty; keeping local data");
            Pulled::Empty
        } else {
            let keys = document.data.len();
            self.store.replace(document.data)?;
            tracing::info!(keys, "Replaced local data with remote document");
            Pulled::Replaced(keys)
        };

        self.mark_synced()?;
        Ok(pulled)
    }

    /// Pull, then push.
    pub async fn full_sync(&self) -> Result<SyncReport, SyncError> {
        let pulled = self.pull().await?;
        let pushed_at = self.push().await?;
        Ok(SyncReport { pulled, pushed_at })
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Creates an account and starts a session with an empty local document.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<UserInfo, SyncError> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.map(str::to_string),
        };
        let response = self
            .send(self.http.post(self.url("/auth/register")).json(&body))
            .await?;
        let auth: AuthResponse = Self::check(response)
            .await
            .map_err(into_auth_error)?
            .json()
            .await?;

        self.store_session(&auth.token, &auth.user)?;
        self.store.clear_app_data()?;
        tracing::info!(user_id = auth.user.id, "Registered");
        Ok(auth.user)
    }

    /// Starts a session, clears local app data and pulls the remote copy.
    /// A failed pull does not fail the login.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SyncError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .send(self.http.post(self.url("/auth/login")).json(&body))
            .await?;
        let auth: AuthResponse = Self::check(response)
            .await
            .map_err(into_auth_error)?
            .json()
            .await?;

        self.store_session(&auth.token, &auth.user)?;
        self.store.clear_app_data()?;
        tracing::info!(user_id = auth.user.id, "Logged in");

        let pulled = match self.pull().await {
            Ok(pulled) => Some(pulled),
            Err(e) => {
                tracing::warn!("Initial pull after login failed: {}", e);
                None
            }
        };

        Ok(LoginOutcome {
            user: auth.user,
            pulled,
        })
    }

    /// Ends the session and clears local app data. Works offline.
    pub fn logout(&self) -> Result<(), SyncError> {
        for key in SESSION_KEYS {
            self.store.remove_item(key)?;
        }
        self.store.clear_app_data()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Asks the server whether the stored token is still valid.
    pub async fn verify(&self) -> Result<UserInfo, SyncError> {
        let request = self.authorized(self.http.get(self.url("/auth/verify")))?;
        let response = self.send(request).await?;
        let verified: VerifyResponse = Self::check(response).await?.json().await?;

        match verified.user {
            Some(user) if verified.valid => {
                self.store
                    .set_item(USER_DATA_KEY, &serde_json::to_string(&user)?)?;
                Ok(user)
            }
            _ => Err(SyncError::Auth(
                verified
                    .error
                    .unwrap_or_else(|| "Invalid token".to_string()),
            )),
        }
    }

    pub async fn profile(&self) -> Result<Profile, SyncError> {
        let request = self.authorized(self.http.get(self.url("/users/profile")))?;
        let response = self.send(request).await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn update_profile(&self, name: &str) -> Result<UserInfo, SyncError> {
        let request = self.authorized(self.http.put(self.url("/users/profile")))?;
        let body = UpdateProfileRequest {
            name: Some(name.to_string()),
        };
        let response = self.send(request.json(&body)).await?;
        let updated: ProfileUpdated = Self::check(response).await?.json().await?;

        self.store
            .set_item(USER_DATA_KEY, &serde_json::to_string(&updated.user)?)?;
        Ok(updated.user)
    }

    /// Reads one stored data type from the server.
    pub async fn fetch_data_type(&self, data_type: &str) -> Result<Value, SyncError> {
        let request = self.authorized(self.http.get(self.url(&format!("/data/{}", data_type))))?;
        let response = self.send(request).await?;
        let document: DataTypeDocument = Self::check(response).await?.json().await?;
        Ok(document.data)
    }
}

/// Credential rejections come back as 400 or 401; both are auth failures.
fn into_auth_error(err: SyncError) -> SyncError {
    match err {
        SyncError::Remote { status: 400, message } => SyncError::Auth(message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StorageError, DATA_KEY};

    fn client() -> SyncClient {
        SyncClient::new("http://127.0.0.1:9/api/", LocalStore::in_memory())
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = client();
        assert_eq!(client.base_url(), "http://127.0.0.1:9/api");
        assert_eq!(client.url("/health"), "http://127.0.0.1:9/api/health");
    }

    #[test]
    fn test_status_without_session() {
        let status = client().sync_status();
        assert!(!status.is_authenticated);
        assert!(status.is_online);
        assert!(status.last_sync.is_none());
        assert!(status.user.is_none());
    }

    #[test]
    fn test_status_reads_session_keys() {
        let client = client();
        let user = UserInfo {
            id: 3,
            email: "a@example.com".to_string(),
            name: None,
        };
        client.store_session("tok", &user).unwrap();
        let at = client.mark_synced().unwrap();

        let status = client.sync_status();
        assert!(status.is_authenticated);
        assert_eq!(status.user, Some(user));
        assert_eq!(
            status.last_sync.map(|t| t.timestamp()),
            Some(at.timestamp())
        );
    }

    #[tokio::test]
    async fn test_push_requires_session() {
        let err = client().push().await.unwrap_err();
        assert!(matches!(err, SyncError::NotAuthenticated));
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_pull_requires_session() {
        assert!(matches!(
            client().pull().await.unwrap_err(),
            SyncError::NotAuthenticated
        ));
    }

    #[tokio::test]
    async fn test_push_refuses_unreadable_local_document() {
        let client = client();
        client.store.set_item(AUTH_TOKEN_KEY, "tok").unwrap();
        client.store.set_item(DATA_KEY, "{not json").unwrap();

        assert!(matches!(
            client.push().await.unwrap_err(),
            SyncError::Storage(StorageError::Corrupt(_))
        ));
        assert!(client.is_online());
        assert!(client.last_sync().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_marks_offline() {
        let client = client();
        assert!(!client.check_online().await);
        assert!(!client.is_online());

        client.store.set_item(AUTH_TOKEN_KEY, "tok").unwrap();
        assert!(matches!(
            client.push().await.unwrap_err(),
            SyncError::Offline
        ));
    }

    #[test]
    fn test_logout_clears_session_and_data() {
        let client = client();
        client
            .store_session(
                "tok",
                &UserInfo {
                    id: 1,
                    email: "a@example.com".to_string(),
                    name: None,
                },
            )
            .unwrap();
        let mut data = AppData::default();
        data.custom_workout_plan
            .insert(crate::models::DayOfWeek::Monday, "Arms".to_string());
        client.store.save(&data).unwrap();

        client.logout().unwrap();

        assert!(!client.is_authenticated());
        assert!(client.cached_user().is_none());
        assert!(client.store.get().custom_workout_plan.is_empty());
    }
}
