use crate::error::MwApiError;
use crate::response::{check_api_error, send_json};
use reqwest::Client;
use tracing::info;

pub async fn fetch_login_token(client: &Client, api_url: &url::Url) -> Result<String, MwApiError> {
    fetch_token(client, api_url, "login", "logintoken").await
}

pub async fn fetch_csrf_token(client: &Client, api_url: &url::Url) -> Result<String, MwApiError> {
    fetch_token(client, api_url, "csrf", "csrftoken").await
}

async fn fetch_token(
    client: &Client,
    api_url: &url::Url,
    kind: &str,
    field: &str,
) -> Result<String, MwApiError> {
    let resp = send_json(client.get(api_url.as_str()).query(&[
        ("action", "query"),
        ("meta", "tokens"),
        ("type", kind),
        ("format", "json"),
    ]))
    .await?;
    check_api_error(&resp)?;

    resp["query"]["tokens"][field]
        .as_str()
        .map(String::from)
        .ok_or_else(|| MwApiError::AuthError {
            reason: format!("No {kind} token returned"),
        })
}

/// Log in with a bot password (`Special:BotPasswords`). The session lives
/// in the client's cookie jar.
pub async fn login_bot_password(
    client: &Client,
    api_url: &url::Url,
    username: &str,
    password: &str,
) -> Result<(), MwApiError> {
    let token = fetch_login_token(client, api_url).await?;

    let resp = send_json(client.post(api_url.as_str()).form(&[
        ("action", "login"),
        ("lgname", username),
        ("lgpassword", password),
        ("lgtoken", &token),
        ("format", "json"),
    ]))
    .await?;
    check_api_error(&resp)?;

    let result = resp["login"]["result"].as_str().unwrap_or("");
    if result == "Success" {
        info!(username, "Login successful");
        Ok(())
    } else {
        let reason = resp["login"]["reason"]
            .as_str()
            .unwrap_or("Unknown")
            .to_string();
        Err(MwApiError::AuthError { reason })
    }
}
