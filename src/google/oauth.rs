//! OAuth for the Calendar API: cached token file, refresh grant, and the
//! interactive installed-app consent flow when neither works.

use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::AppConfig;
use crate::google::gcal::GOOGLE_API_BASE;

pub const SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// An access token ready to make calendar calls with. Built once up
/// front and handed to the sync driver rather than constructed from
/// ambient state inside the pipeline.
#[derive(Debug, Clone)]
pub struct GoogleSession {
    pub access_token: String,
    pub api_base: String,
}

impl GoogleSession {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base: GOOGLE_API_BASE.to_string(),
        }
    }
}

/// On-disk token cache, rewritten whenever a new token is obtained
#[derive(Debug, Serialize, Deserialize)]
struct TokenCache {
    access_token: String,
    refresh_token: Option<String>,
    expiry: DateTime<Utc>,
}

/// Google installed-app client secrets (credentials.json)
#[derive(Debug, Deserialize)]
struct ClientSecrets {
    installed: InstalledSecrets,
}

#[derive(Debug, Deserialize)]
struct InstalledSecrets {
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
}

async fn token_request(token_url: &str, params: &[(&str, &str)]) -> Result<TokenResponse> {
    let client = Client::new();
    let res = client.post(token_url).form(params).send().await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Token request failed: {} ({})", status, text);
    }
    let token: TokenResponse = serde_json::from_str(&text)?;
    Ok(token)
}

pub async fn exchange_code_for_token(
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    token_request(
        TOKEN_URL,
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await
}

pub async fn refresh_access_token(
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse> {
    token_request(
        TOKEN_URL,
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await
}

fn read_cache(path: &str) -> Option<TokenCache> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

fn write_cache(path: &str, cache: &TokenCache) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(cache)?)
        .with_context(|| format!("Failed to write token cache to {}", path))
}

fn read_client_secrets(path: &str) -> Result<InstalledSecrets> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read client secrets from {}", path))?;
    let secrets: ClientSecrets = serde_json::from_str(&raw)
        .with_context(|| format!("Malformed client secrets file {}", path))?;
    Ok(secrets.installed)
}

/// Produce an authorized session, preferring the cached token, then a
/// refresh grant, then the interactive consent flow. The client-secret
/// file is only read once the cache can't satisfy the request.
pub async fn authorize(config: &AppConfig) -> Result<GoogleSession> {
    let cache = read_cache(&config.token_path);

    // An unexpired cached token needs no network round trip
    if let Some(cache) = &cache
        && cache.expiry > Utc::now() + Duration::seconds(60)
    {
        tracing::debug!("Using cached access token from {}", config.token_path);
        return Ok(GoogleSession::new(cache.access_token.clone()));
    }

    let secrets = read_client_secrets(&config.credentials_path)?;

    if let Some(refresh_token) = cache.as_ref().and_then(|c| c.refresh_token.clone()) {
        tracing::debug!("Refreshing expired access token");
        let token =
            refresh_access_token(&secrets.client_id, &secrets.client_secret, &refresh_token)
                .await?;
        let cache = TokenCache {
            access_token: token.access_token.clone(),
            // Google omits the refresh token from refresh responses
            refresh_token: token.refresh_token.or(Some(refresh_token)),
            expiry: Utc::now() + Duration::seconds(token.expires_in),
        };
        write_cache(&config.token_path, &cache)?;
        return Ok(GoogleSession::new(token.access_token));
    }

    consent_flow(config, &secrets).await
}

/// Walk the operator through the browser consent flow and cache the
/// resulting token
async fn consent_flow(config: &AppConfig, secrets: &InstalledSecrets) -> Result<GoogleSession> {
    let auth_url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        AUTH_URL,
        urlencoding::encode(&secrets.client_id),
        urlencoding::encode(REDIRECT_URI),
        urlencoding::encode(SCOPE)
    );
    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    print!("Paste the authorization code shown by Google here: ");
    io::stdout().flush()?;
    let mut code = String::new();
    io::stdin()
        .read_line(&mut code)
        .context("Failed to read authorization code")?;
    let code = code.trim();

    let token =
        exchange_code_for_token(&secrets.client_id, &secrets.client_secret, code, REDIRECT_URI)
            .await?;
    let cache = TokenCache {
        access_token: token.access_token.clone(),
        refresh_token: token.refresh_token.clone(),
        expiry: Utc::now() + Duration::seconds(token.expires_in),
    };
    write_cache(&config.token_path, &cache)?;
    Ok(GoogleSession::new(token.access_token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_request_parses_response() {
        let mut server = mockito::Server::new_async().await;

        let mock_resp = r#"{
            "access_token": "ya29.test",
            "expires_in": 3599,
            "refresh_token": "1//refresh",
            "scope": "https://www.googleapis.com/auth/calendar",
            "token_type": "Bearer"
        }"#;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(mock_resp)
            .create_async()
            .await;

        let token = token_request(
            &format!("{}/token", server.url()),
            &[("grant_type", "refresh_token")],
        )
        .await
        .unwrap();
        assert_eq!(token.access_token, "ya29.test");
        assert_eq!(token.expires_in, 3599);
        assert_eq!(token.refresh_token.as_deref(), Some("1//refresh"));
    }

    #[tokio::test]
    async fn test_token_request_surfaces_error_body() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;

        let err = token_request(
            &format!("{}/token", server.url()),
            &[("grant_type", "refresh_token")],
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn test_cache_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json").to_string_lossy().into_owned();

        let cache = TokenCache {
            access_token: "ya29.test".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expiry: Utc::now() + Duration::seconds(3600),
        };
        write_cache(&path, &cache).unwrap();

        let read_back = read_cache(&path).unwrap();
        assert_eq!(read_back.access_token, "ya29.test");
        assert_eq!(read_back.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(read_back.expiry, cache.expiry);
    }

    #[test]
    fn test_read_cache_is_none_for_missing_or_invalid_file() {
        assert!(read_cache("/nonexistent/token.json").is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json").to_string_lossy().into_owned();
        fs::write(&path, "not json").unwrap();
        assert!(read_cache(&path).is_none());
    }

    #[test]
    fn test_read_client_secrets_installed_app_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("credentials.json")
            .to_string_lossy()
            .into_owned();
        fs::write(
            &path,
            r#"{"installed": {"client_id": "abc.apps.googleusercontent.com", "client_secret": "shh", "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob"]}}"#,
        )
        .unwrap();

        let secrets = read_client_secrets(&path).unwrap();
        assert_eq!(secrets.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "shh");
    }

    #[test]
    fn test_read_client_secrets_fails_on_missing_file() {
        assert!(read_client_secrets("/nonexistent/credentials.json").is_err());
    }
}
