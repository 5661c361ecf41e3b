use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time;
use url::Url;

use crate::config::Settings;
use crate::error::{AppError, AppResult};

use super::store::CredentialStore;
use super::token::TokenSet;

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_REVOKE_ENDPOINT: &str = "https://oauth2.googleapis.com/revoke";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const CALLBACK_TIMEOUT_SECS: u64 = 180;

const OAUTH_SCOPES: &str = "https://www.googleapis.com/auth/gmail.readonly https://www.googleapis.com/auth/gmail.compose openid email";

#[derive(Debug, Serialize)]
pub struct AuthLoginResult {
    pub profile: String,
    pub opened_browser: bool,
    pub authorization_url: String,
    pub email: Option<String>,
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub profile: String,
    pub logged_in: bool,
    pub email: Option<String>,
    pub expired: Option<bool>,
    pub expires_in_seconds: Option<i64>,
    pub has_refresh_token: Option<bool>,
    pub note: Option<String>,
}

impl AuthStatus {
    fn logged_out(profile: &str, note: String) -> Self {
        Self {
            profile: profile.to_string(),
            logged_in: false,
            email: None,
            expired: None,
            expires_in_seconds: None,
            has_refresh_token: None,
            note: Some(note),
        }
    }
}

#[derive(Debug, Default)]
pub struct AuthService;

impl AuthService {
    pub async fn login<S: CredentialStore>(
        profile: &str,
        settings: &Settings,
        store: &S,
    ) -> AppResult<AuthLoginResult> {
        let oauth = OAuthClient::from_settings(settings)?;
        let request = oauth.authorization_request()?;

        // Bind before the consent page opens; a fast redirect must find the port listening.
        let server = CallbackServer::bind(&oauth.redirect_uri).await?;

        let opened_browser = open_browser(&request.url);
        if !opened_browser {
            eprintln!(
                "open this URL in your browser to continue login:\n{}",
                request.url
            );
        }

        let code = server
            .capture(&request.state, Duration::from_secs(CALLBACK_TIMEOUT_SECS))
            .await?;

        let mut token = oauth
            .request_token(TokenGrant::AuthorizationCode {
                code: &code,
                verifier: &request.code_verifier,
            })
            .await?;
        token.email = fetch_email(&token.access_token).await;
        store.save(profile, &token)?;

        Ok(AuthLoginResult {
            profile: profile.to_string(),
            opened_browser,
            authorization_url: request.url,
            email: token.email,
            note: "oauth login completed and credentials stored".to_string(),
        })
    }

    pub async fn refresh<S: CredentialStore>(
        profile: &str,
        settings: &Settings,
        store: &S,
    ) -> AppResult<TokenSet> {
        let current = store.load(profile)?.ok_or_else(|| {
            AppError::InvalidInput("not logged in. run `triage auth login`".to_string())
        })?;

        if !current.is_expired(SystemTime::now()) {
            return Ok(current);
        }

        let refresh_token = current.refresh_token.clone().ok_or_else(|| {
            AppError::Auth(
                "access token expired and no refresh token is stored. run `triage auth login`"
                    .to_string(),
            )
        })?;

        let oauth = OAuthClient::from_settings(settings)?;
        let mut refreshed = oauth
            .request_token(TokenGrant::Refresh {
                token: &refresh_token,
            })
            .await?;

        // Providers may omit both on a refresh response; carry them forward.
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token);
        }
        if refreshed.email.is_none() {
            refreshed.email = current.email;
        }

        store.save(profile, &refreshed)?;
        Ok(refreshed)
    }

    pub async fn status<S: CredentialStore>(profile: &str, store: &S) -> AppResult<AuthStatus> {
        let Some(token) = store.load(profile)? else {
            return Ok(AuthStatus::logged_out(
                profile,
                "no credentials found".to_string(),
            ));
        };

        let now = SystemTime::now();
        Ok(AuthStatus {
            profile: profile.to_string(),
            logged_in: true,
            email: token.email.clone(),
            expired: Some(token.is_expired(now)),
            expires_in_seconds: token.expires_in_seconds(now),
            has_refresh_token: Some(token.has_refresh_token()),
            note: Some("credentials loaded from local store".to_string()),
        })
    }

    pub async fn logout<S: CredentialStore>(profile: &str, store: &S) -> AppResult<AuthStatus> {
        let note = match store.load(profile)? {
            Some(token) => {
                let target = token.refresh_token.as_deref().unwrap_or(&token.access_token);
                match revoke_token(target).await {
                    Ok(()) => "remote token revoked and local credentials removed".to_string(),
                    Err(err) => format!("local credentials removed (revoke failed: {err})"),
                }
            }
            None => "local credentials removed".to_string(),
        };

        store.clear(profile)?;
        Ok(AuthStatus::logged_out(profile, note))
    }
}

#[derive(Debug)]
struct OAuthClient {
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
}

#[derive(Debug)]
struct AuthorizationRequest {
    url: String,
    state: String,
    code_verifier: String,
}

#[derive(Debug)]
enum TokenGrant<'a> {
    AuthorizationCode { code: &'a str, verifier: &'a str },
    Refresh { token: &'a str },
}

impl OAuthClient {
    fn from_settings(settings: &Settings) -> AppResult<Self> {
        Ok(Self {
            client_id: settings.client_id()?.to_string(),
            client_secret: settings.client_secret().map(ToOwned::to_owned),
            redirect_uri: settings.redirect_uri(),
        })
    }

    fn authorization_request(&self) -> AppResult<AuthorizationRequest> {
        let state = random_token(32);
        let code_verifier = random_token(96);
        let code_challenge = pkce_challenge(&code_verifier);

        let mut url = Url::parse(GOOGLE_AUTH_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", OAUTH_SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", &state)
            .append_pair("code_challenge", &code_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(AuthorizationRequest {
            url: url.to_string(),
            state,
            code_verifier,
        })
    }

    async fn request_token(&self, grant: TokenGrant<'_>) -> AppResult<TokenSet> {
        let mut form: Vec<(&str, &str)> = vec![("client_id", self.client_id.as_str())];
        if let Some(secret) = self.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }

        match &grant {
            TokenGrant::AuthorizationCode { code, verifier } => {
                form.push(("grant_type", "authorization_code"));
                form.push(("code", code));
                form.push(("redirect_uri", self.redirect_uri.as_str()));
                form.push(("code_verifier", verifier));
            }
            TokenGrant::Refresh { token } => {
                form.push(("grant_type", "refresh_token"));
                form.push(("refresh_token", token));
            }
        }

        let response = reqwest::Client::new()
            .post(GOOGLE_TOKEN_ENDPOINT)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(map_oauth_error(status, &body));
        }

        let payload: OAuthTokenResponse = response.json().await?;
        Ok(TokenSet {
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
            expires_at_unix: expires_at_unix(payload.expires_in),
            token_type: payload.token_type,
            scope: payload.scope,
            email: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    token_type: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    email: Option<String>,
}

fn map_oauth_error(status: reqwest::StatusCode, body: &str) -> AppError {
    if let Ok(payload) = serde_json::from_str::<OAuthErrorResponse>(body) {
        let error = payload
            .error
            .unwrap_or_else(|| "unknown_oauth_error".to_string());
        let description = payload
            .error_description
            .unwrap_or_else(|| "no description".to_string());

        if error == "invalid_grant" {
            return AppError::Auth(format!(
                "token exchange rejected ({status}): {error} ({description}). consent may have been revoked; run `triage auth login`"
            ));
        }

        return AppError::Auth(format!(
            "oauth token exchange failed ({status}): {error} ({description})"
        ));
    }

    AppError::Auth(format!("oauth token exchange failed ({status}): {body}"))
}

fn expires_at_unix(expires_in: Option<u64>) -> Option<u64> {
    let expires_in = expires_in?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(now.saturating_add(expires_in))
}

async fn fetch_email(access_token: &str) -> Option<String> {
    let response = reqwest::Client::new()
        .get(GOOGLE_USERINFO_ENDPOINT)
        .bearer_auth(access_token)
        .send()
        .await
        .ok()?;

    if !response.status().is_success() {
        return None;
    }

    response.json::<UserInfoResponse>().await.ok()?.email
}

async fn revoke_token(token: &str) -> AppResult<()> {
    let response = reqwest::Client::new()
        .post(GOOGLE_REVOKE_ENDPOINT)
        .form(&[("token", token)])
        .send()
        .await?;

    if response.status().is_success() {
        return Ok(());
    }

    Err(AppError::Auth(format!(
        "revoke endpoint returned {}",
        response.status()
    )))
}

struct CallbackServer {
    listener: TcpListener,
    path: String,
}

impl CallbackServer {
    async fn bind(redirect_uri: &str) -> AppResult<Self> {
        let redirect = Url::parse(redirect_uri)?;
        if redirect.scheme() != "http" {
            return Err(AppError::Config(
                "redirect_uri must use http for local callback capture".to_string(),
            ));
        }

        let host = redirect
            .host_str()
            .ok_or_else(|| AppError::Config("redirect_uri is missing host".to_string()))?;
        let port = redirect
            .port_or_known_default()
            .ok_or_else(|| AppError::Config("redirect_uri is missing port".to_string()))?;

        let listener = TcpListener::bind((host, port)).await.map_err(|err| {
            AppError::Auth(format!(
                "failed to bind oauth callback listener on {host}:{port}: {err}"
            ))
        })?;

        Ok(Self {
            listener,
            path: redirect.path().to_string(),
        })
    }

    async fn capture(&self, expected_state: &str, timeout: Duration) -> AppResult<String> {
        time::timeout(timeout, self.accept_redirect(expected_state))
            .await
            .map_err(|_| AppError::Auth("timed out waiting for oauth callback".to_string()))?
    }

    async fn accept_redirect(&self, expected_state: &str) -> AppResult<String> {
        let (mut stream, _) = self.listener.accept().await?;

        let mut buf = vec![0_u8; 8192];
        let size = stream.read(&mut buf).await?;
        if size == 0 {
            return Err(AppError::Auth("empty oauth callback request".to_string()));
        }

        let request = String::from_utf8_lossy(&buf[..size]);
        let mut request_line = request.lines().next().unwrap_or_default().split_whitespace();
        let method = request_line.next().unwrap_or_default();
        let target = request_line.next().unwrap_or_default();

        if method != "GET" {
            respond(
                &mut stream,
                "405 Method Not Allowed",
                "oauth callback only accepts GET requests",
            )
            .await?;
            return Err(AppError::Auth(
                "oauth callback received non-GET request".to_string(),
            ));
        }

        match extract_callback_code(target, &self.path, expected_state) {
            Ok(code) => {
                respond(
                    &mut stream,
                    "200 OK",
                    "triage login complete. you can return to the terminal.",
                )
                .await?;
                Ok(code)
            }
            Err(err) => {
                let _ = respond(
                    &mut stream,
                    "400 Bad Request",
                    &format!("oauth callback error: {err}"),
                )
                .await;
                Err(err)
            }
        }
    }
}

fn extract_callback_code(
    target: &str,
    expected_path: &str,
    expected_state: &str,
) -> AppResult<String> {
    let callback_url = Url::parse(&format!("http://localhost{target}"))?;
    if callback_url.path() != expected_path {
        return Err(AppError::Auth(format!(
            "oauth callback path mismatch: expected {expected_path}, got {}",
            callback_url.path()
        )));
    }

    let query: HashMap<_, _> = callback_url.query_pairs().collect();

    if let Some(error) = query.get("error") {
        let description = query
            .get("error_description")
            .map(|value| value.as_ref())
            .unwrap_or("no description");
        return Err(AppError::Auth(format!(
            "oauth authorization failed: {error} ({description})"
        )));
    }

    match query.get("state") {
        None => {
            return Err(AppError::Auth(
                "oauth callback missing state parameter".to_string(),
            ));
        }
        Some(state) if state.as_ref() != expected_state => {
            return Err(AppError::Auth(
                "oauth state mismatch; aborting login".to_string(),
            ));
        }
        Some(_) => {}
    }

    query
        .get("code")
        .map(|code| code.to_string())
        .ok_or_else(|| AppError::Auth("oauth callback missing code parameter".to_string()))
}

async fn respond(stream: &mut TcpStream, status: &str, message: &str) -> AppResult<()> {
    let body = format!(
        "<!doctype html><html><body><p>{}</p></body></html>",
        escape_html(message)
    );
    let head = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );

    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

fn random_token(len: usize) -> String {
    let mut bytes = vec![0_u8; len];
    rand::thread_rng().fill(bytes.as_mut_slice());
    URL_SAFE_NO_PAD.encode(bytes)
}

fn pkce_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

fn open_browser(url: &str) -> bool {
    let mut command = if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut start = std::process::Command::new("cmd");
        start.args(["/C", "start", ""]);
        start
    } else {
        std::process::Command::new("xdg-open")
    };

    command
        .arg(url)
        .status()
        .is_ok_and(|status| status.success())
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
