//! OAuth (Google) sign-in.
//!
//! `begin` stores a fresh state value and returns the provider URL. `complete`
//! handles the provider's redirect back: a missing code, a provider error or a
//! state that does not match the stored one fails without calling the backend;
//! otherwise the code is exchanged once and the token stored. There are no
//! retries, every failure sends the user back to login.

use crate::client::{AuthClient, AuthError};
use crate::session::{SessionContext, TokenStore};
use crate::Destination;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::RngCore;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_SCOPES: [&str; 3] = ["openid", "profile", "email"];
/// Random bytes behind each state value.
const STATE_BYTES: usize = 16;

#[derive(Clone, Debug)]
pub struct OAuthConfig {
    client_id: String,
    redirect_uri: Url,
    auth_url: Url,
    scopes: Vec<String>,
}

impl OAuthConfig {
    #[must_use]
    pub fn new(client_id: String, redirect_uri: Url, auth_url: Url) -> Self {
        Self {
            client_id,
            redirect_uri,
            auth_url,
            scopes: DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
        }
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Provider URL carrying everything the consent screen needs.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> Url {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        url
    }
}

/// Query parameters the provider sends back to the callback route.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OAuthFailure {
    MissingCode,
    Provider(String),
    StateMismatch,
    Exchange(AuthError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OAuthPhase {
    Idle,
    Redirecting(Url),
    CallbackReceived,
    Exchanging,
    Authenticated,
    Failed(OAuthFailure),
}

/// One OAuth sign-in attempt.
#[derive(Debug)]
pub struct OAuthFlow<'a> {
    config: &'a OAuthConfig,
    phase: OAuthPhase,
}

impl<'a> OAuthFlow<'a> {
    #[must_use]
    pub fn new(config: &'a OAuthConfig) -> Self {
        Self {
            config,
            phase: OAuthPhase::Idle,
        }
    }

    #[must_use]
    pub fn phase(&self) -> &OAuthPhase {
        &self.phase
    }

    /// Generates and stores a fresh state value, then points the browser at
    /// the provider.
    pub fn begin<S: TokenStore>(&mut self, session: &mut SessionContext<S>) -> Destination {
        let state = generate_state();
        session.remember_oauth_state(&state);
        let url = self.config.authorization_url(&state);
        debug!("Redirecting to OAuth provider {}", self.config.auth_url());
        self.phase = OAuthPhase::Redirecting(url.clone());
        Destination::External(url)
    }

    /// Handles the provider's redirect back to the callback route.
    #[instrument(skip_all)]
    pub async fn complete<S: TokenStore>(
        &mut self,
        session: &mut SessionContext<S>,
        client: &AuthClient,
        params: &CallbackParams,
    ) -> Destination {
        self.phase = OAuthPhase::CallbackReceived;
        let expected_state = session.take_oauth_state();

        if let Some(error) = params.error.as_deref() {
            return self.fail(session, OAuthFailure::Provider(error.to_string()));
        }

        let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
            return self.fail(session, OAuthFailure::MissingCode);
        };

        let state = match (params.state.as_deref(), expected_state) {
            (Some(received), Some(expected)) if received == expected.expose_secret() => received,
            _ => return self.fail(session, OAuthFailure::StateMismatch),
        };

        self.phase = OAuthPhase::Exchanging;
        match client
            .exchange_oauth_code(code, state, self.config.redirect_uri().as_str())
            .await
        {
            Ok(token) => {
                session.sign_in(&token);
                info!("OAuth sign-in succeeded");
                self.phase = OAuthPhase::Authenticated;
                Destination::Dashboard
            }
            Err(err) => self.fail(session, OAuthFailure::Exchange(err)),
        }
    }

    fn fail<S: TokenStore>(
        &mut self,
        session: &mut SessionContext<S>,
        failure: OAuthFailure,
    ) -> Destination {
        warn!("OAuth sign-in failed: {failure:?}");
        session.clear_token();
        self.phase = OAuthPhase::Failed(failure);
        Destination::Login
    }
}

/// URL-safe random state value.
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_TIMEOUT;
    use crate::session::MemoryStore;
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> OAuthConfig {
        OAuthConfig::new(
            "client-123".to_string(),
            Url::parse("https://app.example.com/auth/callback").unwrap(),
            Url::parse(GOOGLE_AUTH_URL).unwrap(),
        )
    }

    fn started_session(config: &OAuthConfig) -> (SessionContext<MemoryStore>, String) {
        let mut session = SessionContext::new(MemoryStore::new());
        let mut flow = OAuthFlow::new(config);
        let Destination::External(url) = flow.begin(&mut session) else {
            panic!("expected provider redirect");
        };
        let state = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.to_string())
            .unwrap();
        (session, state)
    }

    #[test]
    fn generate_state_is_url_safe_and_random() {
        let a = generate_state();
        let b = generate_state();
        assert_eq!(a.len(), 22);
        assert_ne!(a, b);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn authorization_url_has_required_parameters() {
        let url = config().authorization_url("s-1");
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

        assert!(url.as_str().starts_with(GOOGLE_AUTH_URL));
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["redirect_uri"], "https://app.example.com/auth/callback");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "openid profile email");
        assert_eq!(params["state"], "s-1");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
    }

    #[test]
    fn custom_scopes_replace_defaults() {
        let url = config()
            .with_scopes(vec!["openid".to_string(), "email".to_string()])
            .authorization_url("s-1");
        let scope = url
            .query_pairs()
            .find(|(k, _)| k == "scope")
            .map(|(_, v)| v.to_string());

        assert_eq!(scope.as_deref(), Some("openid email"));
    }

    #[test]
    fn begin_stores_state_and_redirects() {
        let config = config();
        let mut session = SessionContext::new(MemoryStore::new());
        let mut flow = OAuthFlow::new(&config);

        let destination = flow.begin(&mut session);

        assert!(matches!(destination, Destination::External(_)));
        assert!(matches!(flow.phase(), OAuthPhase::Redirecting(_)));
        assert!(session.take_oauth_state().is_some());
    }

    #[tokio::test]
    async fn missing_code_never_calls_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = AuthClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();
        let config = config();
        let (mut session, state) = started_session(&config);

        let mut flow = OAuthFlow::new(&config);
        let params = CallbackParams {
            code: None,
            state: Some(state),
            error: None,
        };
        let destination = flow.complete(&mut session, &client, &params).await;

        assert_eq!(destination, Destination::Login);
        assert_eq!(
            flow.phase(),
            &OAuthPhase::Failed(OAuthFailure::MissingCode)
        );
    }

    #[tokio::test]
    async fn state_mismatch_never_calls_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = AuthClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();
        let config = config();
        let (mut session, _state) = started_session(&config);

        let mut flow = OAuthFlow::new(&config);
        let params = CallbackParams {
            code: Some("code-1".to_string()),
            state: Some("forged".to_string()),
            error: None,
        };
        let destination = flow.complete(&mut session, &client, &params).await;

        assert_eq!(destination, Destination::Login);
        assert_eq!(
            flow.phase(),
            &OAuthPhase::Failed(OAuthFailure::StateMismatch)
        );
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn callback_without_stored_state_never_calls_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = AuthClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();
        let config = config();
        let mut session = SessionContext::new(MemoryStore::new());

        let mut flow = OAuthFlow::new(&config);
        let params = CallbackParams {
            code: Some("code-1".to_string()),
            state: Some("s-1".to_string()),
            error: None,
        };
        let destination = flow.complete(&mut session, &client, &params).await;

        assert_eq!(destination, Destination::Login);
        assert_eq!(
            flow.phase(),
            &OAuthPhase::Failed(OAuthFailure::StateMismatch)
        );
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn provider_error_fails() {
        let client = AuthClient::new("http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();
        let config = config();
        let (mut session, state) = started_session(&config);

        let mut flow = OAuthFlow::new(&config);
        let params = CallbackParams {
            code: None,
            state: Some(state),
            error: Some("access_denied".to_string()),
        };
        let destination = flow.complete(&mut session, &client, &params).await;

        assert_eq!(destination, Destination::Login);
        assert_eq!(
            flow.phase(),
            &OAuthPhase::Failed(OAuthFailure::Provider("access_denied".to_string()))
        );
    }

    #[tokio::test]
    async fn successful_exchange_stores_token() {
        let server = MockServer::start().await;
        let config = config();
        let (mut session, state) = started_session(&config);
        Mock::given(method("POST"))
            .and(path("/auth/google/callback"))
            .and(body_json(json!({
                "code": "code-1",
                "state": state,
                "redirect_uri": "https://app.example.com/auth/callback"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "g-tok"})))
            .expect(1)
            .mount(&server)
            .await;
        let client = AuthClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();

        let mut flow = OAuthFlow::new(&config);
        let params = CallbackParams {
            code: Some("code-1".to_string()),
            state: Some(state),
            error: None,
        };
        let destination = flow.complete(&mut session, &client, &params).await;

        assert_eq!(destination, Destination::Dashboard);
        assert_eq!(flow.phase(), &OAuthPhase::Authenticated);
        assert_eq!(
            session.token().map(|t| t.expose().to_string()),
            Some("g-tok".to_string())
        );
        assert!(session.take_oauth_state().is_none());
    }

    #[tokio::test]
    async fn failed_exchange_goes_to_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/google/callback"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;
        let client = AuthClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap();
        let config = config();
        let (mut session, state) = started_session(&config);

        let mut flow = OAuthFlow::new(&config);
        let params = CallbackParams {
            code: Some("code-1".to_string()),
            state: Some(state),
            error: None,
        };
        let destination = flow.complete(&mut session, &client, &params).await;

        assert_eq!(destination, Destination::Login);
        assert!(matches!(
            flow.phase(),
            OAuthPhase::Failed(OAuthFailure::Exchange(AuthError::BadResponse {
                status: 400,
                ..
            }))
        ));
        assert!(!session.is_authenticated());
    }
}
