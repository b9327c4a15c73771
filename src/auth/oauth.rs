use oauth2::TokenResponse;
use oauth2::basic::BasicClient;
use oauth2::reqwest::http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    RedirectUrl, RefreshToken, Scope, TokenUrl,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tiny_http::{Response, Server};
use url::Url;

use crate::auth::credential::Credential;
use crate::auth::provider::AuthorizationFlow;
use crate::error::AuthError;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CONSENT_TIMEOUT_SECS: u64 = 120;

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.send",
];

/// Google installed-app flow: Authorization Code + PKCE against a loopback listener.
pub struct GoogleOAuth {
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
}

impl GoogleOAuth {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri,
        }
    }

    fn client(&self) -> Result<BasicClient, AuthError> {
        let auth_url =
            AuthUrl::new(AUTH_URL.to_string()).map_err(|e| AuthError::Config(e.to_string()))?;
        let token_url =
            TokenUrl::new(TOKEN_URL.to_string()).map_err(|e| AuthError::Config(e.to_string()))?;
        Ok(BasicClient::new(
            ClientId::new(self.client_id.clone()),
            self.client_secret.clone().map(ClientSecret::new),
            auth_url,
            Some(token_url),
        ))
    }

    /// Bind the callback listener first so the browser can never hit a closed port.
    fn bind_listener(&self) -> Result<(Server, String), AuthError> {
        let Some(redirect_uri) = &self.redirect_uri else {
            let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
            let server = Server::http(addr).map_err(|e| AuthError::Listener {
                addr: addr.to_string(),
                message: e.to_string(),
            })?;
            let port = server.server_addr().port();
            return Ok((server, format!("http://127.0.0.1:{port}/")));
        };

        let redirect = Url::parse(redirect_uri)
            .map_err(|e| AuthError::Config(format!("invalid redirect_uri '{redirect_uri}': {e}")))?;
        let host = redirect
            .host_str()
            .ok_or_else(|| AuthError::Config(format!("redirect_uri missing host: {redirect_uri}")))?;
        let port = redirect.port_or_known_default().ok_or_else(|| {
            AuthError::Config(format!("redirect_uri missing/unknown port: {redirect_uri}"))
        })?;

        let bind_ip: IpAddr = match host {
            "localhost" | "127.0.0.1" => IpAddr::V4(Ipv4Addr::LOCALHOST),
            other => other.parse::<IpAddr>().map_err(|_| {
                AuthError::Config(format!(
                    "redirect_uri host must be localhost/127.0.0.1 or an IP: {other}"
                ))
            })?,
        };
        let addr = SocketAddr::new(bind_ip, port);
        let server = Server::http(addr).map_err(|e| AuthError::Listener {
            addr: addr.to_string(),
            message: e.to_string(),
        })?;
        Ok((server, redirect_uri.clone()))
    }
}

impl AuthorizationFlow for GoogleOAuth {
    fn refresh(&self, refresh_token: &str) -> Result<Credential, AuthError> {
        let rt = RefreshToken::new(refresh_token.to_string());
        let token = self
            .client()?
            .exchange_refresh_token(&rt)
            .request(http_client)
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        Ok(Credential::new(
            token.access_token().secret().to_string(),
            token.refresh_token().map(|r| r.secret().to_string()),
            token.expires_in().map(|d| d.as_secs()),
        ))
    }

    fn authorize(&self) -> Result<Credential, AuthError> {
        let (server, redirect_uri) = self.bind_listener()?;

        let oauth_client = self.client()?.set_redirect_uri(
            RedirectUrl::new(redirect_uri.clone()).map_err(|e| AuthError::Config(e.to_string()))?,
        );

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token) = oauth_client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
            // Google only issues a refresh token for offline access
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        println!("Open this URL in your browser:\n{auth_url}");
        if let Err(e) = open::that(auth_url.as_str()) {
            log::warn!("could not open browser automatically: {e}");
        }

        let code = wait_for_code(&server, &redirect_uri, csrf_token.secret())?;

        let token = oauth_client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request(http_client)
            .map_err(|e| {
                log::error!("token exchange failed: {e:#?}");
                AuthError::Exchange(e.to_string())
            })?;

        Ok(Credential::new(
            token.access_token().secret().to_string(),
            token.refresh_token().map(|r| r.secret().to_string()),
            token.expires_in().map(|d| d.as_secs()),
        ))
    }
}

enum Callback {
    Code(String),
    Denied(String),
    Ignored,
}

/// Parse the path+query tiny_http hands us ("/?code=...&state=...").
fn parse_callback(path_and_query: &str, expected_state: &str) -> Result<Callback, AuthError> {
    let full = format!("http://127.0.0.1{path_and_query}");
    let Ok(parsed) = Url::parse(&full) else {
        return Ok(Callback::Ignored);
    };

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (k, v) in parsed.query_pairs() {
        match k.as_ref() {
            "code" => code = Some(v.into_owned()),
            "state" => state = Some(v.into_owned()),
            "error" => error = Some(v.into_owned()),
            _ => {}
        }
    }

    if let Some(err) = error {
        return Ok(Callback::Denied(err));
    }
    match code {
        Some(code) if state.as_deref() == Some(expected_state) => Ok(Callback::Code(code)),
        Some(_) => Err(AuthError::StateMismatch),
        None => Ok(Callback::Ignored),
    }
}

fn wait_for_code(server: &Server, redirect_uri: &str, expected_state: &str) -> Result<String, AuthError> {
    log::info!("waiting for OAuth callback on {redirect_uri}");
    let wait_until = Instant::now() + Duration::from_secs(CONSENT_TIMEOUT_SECS);

    while Instant::now() < wait_until {
        let Ok(maybe_request) = server.recv_timeout(Duration::from_millis(500)) else {
            continue;
        };
        let Some(request) = maybe_request else {
            continue;
        };

        match parse_callback(request.url(), expected_state) {
            Ok(Callback::Code(code)) => {
                let _ = request.respond(Response::from_string(
                    "Authorization received. You can close this tab.",
                ));
                return Ok(code);
            }
            Ok(Callback::Denied(err)) => {
                let _ = request.respond(Response::from_string(
                    "Authorization was denied. You can close this tab.",
                ));
                return Err(AuthError::Exchange(format!("consent denied: {err}")));
            }
            Ok(Callback::Ignored) => {
                // favicon and similar stray requests
                let _ = request.respond(Response::from_string("Waiting for authorization."));
            }
            Err(e) => {
                let _ = request.respond(Response::from_string("Bad redirect"));
                return Err(e);
            }
        }
    }

    Err(AuthError::ConsentTimeout(CONSENT_TIMEOUT_SECS))
}
