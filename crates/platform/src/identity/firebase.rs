//! Firebase Authentication REST client (Identity Toolkit v1).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use coronda_core::UserId;

use super::{IdentityError, IdentityProvider, IdentityUser, SessionTokens};

const DEFAULT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Firebase Auth configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Web API key of the Firebase project.
    pub api_key: SecretString,
    /// Identity Toolkit base URL; overridable for the auth emulator.
    pub endpoint: String,
    /// Secure Token base URL, used to refresh id tokens.
    pub token_endpoint: String,
}

impl FirebaseConfig {
    /// Configuration against the production endpoint.
    #[must_use]
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_owned(),
        }
    }
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .finish()
    }
}

/// Firebase Auth client.
#[derive(Clone)]
pub struct FirebaseIdentity {
    inner: Arc<FirebaseIdentityInner>,
}

struct FirebaseIdentityInner {
    client: reqwest::Client,
    config: FirebaseConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    local_id: String,
    #[serde(default)]
    email: String,
}

/// Secure Token answers in `snake_case`.
#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    id_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    email_verified: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseIdentity {
    /// Create a new Firebase Auth client.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Http` if the HTTP client cannot be built.
    pub fn new(config: FirebaseConfig) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(FirebaseIdentityInner { client, config }),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/accounts:{method}", self.inner.config.endpoint)
    }

    fn with_key(&self, url: &str) -> String {
        format!("{url}?key={}", self.inner.config.api_key.expose_secret())
    }

    fn token_url(&self) -> String {
        format!("{}/token", self.inner.config.token_endpoint)
    }

    async fn post<B, R>(&self, method: &str, body: &B) -> Result<R, IdentityError>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let request = self
            .inner
            .client
            .post(self.with_key(&self.url(method)))
            .json(body);
        Self::send(method, request).await
    }

    async fn send<R>(method: &str, request: reqwest::RequestBuilder) -> Result<R, IdentityError>
    where
        R: for<'de> Deserialize<'de>,
    {
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                IdentityError::Provider(format!("unexpected {method} response: {e}"))
            })
        } else {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|env| env.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            tracing::debug!(method, %status, %message, "Identity provider rejected request");
            Err(IdentityError::from_code(&message))
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError> {
        let res: PasswordResponse = self
            .post(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        Ok(IdentityUser {
            uid: UserId::new(res.local_id),
            email: if res.email.is_empty() {
                email.to_owned()
            } else {
                res.email
            },
            email_verified: false,
            id_token: res.id_token,
            refresh_token: Some(res.refresh_token).filter(|t| !t.is_empty()),
        })
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError> {
        let res: PasswordResponse = self
            .post(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        // signInWithPassword does not report verification status.
        let mut user = self.lookup(&res.id_token).await?;
        user.refresh_token = Some(res.refresh_token).filter(|t| !t.is_empty());
        Ok(user)
    }

    #[instrument(skip_all)]
    async fn send_email_verification(&self, id_token: &str) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .post(
                "sendOobCode",
                &OobCodeRequest {
                    request_type: "VERIFY_EMAIL",
                    id_token,
                },
            )
            .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn lookup(&self, id_token: &str) -> Result<IdentityUser, IdentityError> {
        let res: LookupResponse = self.post("lookup", &LookupRequest { id_token }).await?;
        let user = res
            .users
            .into_iter()
            .next()
            .ok_or(IdentityError::InvalidToken)?;

        Ok(IdentityUser {
            uid: UserId::new(user.local_id),
            email: user.email,
            email_verified: user.email_verified,
            id_token: id_token.to_owned(),
            refresh_token: None,
        })
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, IdentityError> {
        if refresh_token.is_empty() {
            return Err(IdentityError::InvalidToken);
        }
        let request = self
            .inner
            .client
            .post(self.with_key(&self.token_url()))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ]);
        let res: RefreshResponse = Self::send("token", request).await?;

        Ok(SessionTokens {
            id_token: res.id_token,
            refresh_token: res.refresh_token,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_debug_redacts_api_key() {
        let config = FirebaseConfig::new(SecretString::from("AIzaSyD-super-secret-key"));
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("AIzaSyD"));
    }

    #[test]
    fn test_url() {
        let mut config = FirebaseConfig::new(SecretString::from("k"));
        config.endpoint = "http://localhost:9099/identitytoolkit.googleapis.com/v1".to_owned();
        let client = FirebaseIdentity::new(config).unwrap();
        assert_eq!(
            client.url("signUp"),
            "http://localhost:9099/identitytoolkit.googleapis.com/v1/accounts:signUp"
        );
    }

    #[test]
    fn test_parse_lookup_response() {
        let res: LookupResponse = serde_json::from_str(
            r#"{"kind":"identitytoolkit#GetAccountInfoResponse",
                "users":[{"localId":"abc123","email":"ana@example.com","emailVerified":true}]}"#,
        )
        .unwrap();
        let user = res.users.first().unwrap();
        assert_eq!(user.local_id, "abc123");
        assert!(user.email_verified);
    }

    #[test]
    fn test_token_url() {
        let mut config = FirebaseConfig::new(SecretString::from("k"));
        config.token_endpoint = "http://localhost:9099/securetoken.googleapis.com/v1".to_owned();
        let client = FirebaseIdentity::new(config).unwrap();
        assert_eq!(
            client.token_url(),
            "http://localhost:9099/securetoken.googleapis.com/v1/token"
        );
    }

    #[test]
    fn test_parse_refresh_response() {
        let res: RefreshResponse = serde_json::from_str(
            r#"{"expires_in":"3600","token_type":"Bearer","refresh_token":"AMf-new",
                "id_token":"eyJ-new","user_id":"abc123","project_id":"1234"}"#,
        )
        .unwrap();
        assert_eq!(res.id_token, "eyJ-new");
        assert_eq!(res.refresh_token, "AMf-new");
    }

    #[test]
    fn test_parse_error_envelope() {
        let env: ErrorEnvelope = serde_json::from_str(
            r#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#,
        )
        .unwrap();
        assert!(matches!(
            IdentityError::from_code(&env.error.message),
            IdentityError::EmailInUse
        ));
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<FirebaseIdentity>();
    }
}
