use crate::error::MwApiError;
use crate::response::{check_api_error, send_json};
use crate::retry::RetryPolicy;
use crate::throttle::ThrottleController;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use wb_domain::profile::ThrottlePolicy;
use wb_domain::types::*;

pub struct EditRequest {
    pub title: Title,
    pub text: String,
    pub summary: String,
    pub minor: bool,
    pub bot: bool,
    /// Timestamp of the revision the edit is based on; empty when creating.
    pub base_timestamp: String,
    pub start_timestamp: String,
}

impl EditRequest {
    /// A bot edit replacing `page`'s text, guarded against conflicts with
    /// the revision it was read at.
    pub fn replacing(page: &PageContent, text: String, summary: String) -> Self {
        let base_timestamp = if page.exists {
            page.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        } else {
            String::new()
        };
        Self {
            title: page.title.clone(),
            text,
            summary,
            minor: false,
            bot: true,
            base_timestamp,
            start_timestamp: chrono::Utc::now()
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EditResponse {
    pub result: String,
    #[serde(rename = "newrevid")]
    pub new_revid: Option<u64>,
    #[serde(rename = "newtimestamp")]
    pub new_timestamp: Option<String>,
}

#[async_trait]
pub trait MediaWikiClient: Send + Sync {
    async fn login_bot_password(&self, username: &str, password: &str) -> Result<(), MwApiError>;
    async fn fetch_csrf_token(&self) -> Result<String, MwApiError>;
    /// Missing pages come back with `exists == false` and empty text.
    async fn get_page(&self, title: &Title) -> Result<PageContent, MwApiError>;
    async fn edit_page(&self, edit: &EditRequest) -> Result<EditResponse, MwApiError>;
    async fn search(
        &self,
        query: &str,
        namespaces: &[Namespace],
        limit: usize,
    ) -> Result<Vec<Title>, MwApiError>;
}

pub struct ReqwestMwClient {
    http: reqwest::Client,
    api_url: url::Url,
    csrf_token: Arc<RwLock<Option<String>>>,
    throttle: ThrottleController,
    retry_policy: RetryPolicy,
}

impl ReqwestMwClient {
    pub fn new(api_url: url::Url, policy: ThrottlePolicy) -> Result<Self, MwApiError> {
        let jar = Arc::new(reqwest::cookie::Jar::default());
        let http = reqwest::ClientBuilder::new()
            .cookie_provider(jar)
            .user_agent(concat!("wikibots/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_url,
            csrf_token: Arc::new(RwLock::new(None)),
            retry_policy: RetryPolicy::from(&policy),
            throttle: ThrottleController::new(policy),
        })
    }

    pub fn api_url(&self) -> &url::Url {
        &self.api_url
    }

    async fn csrf(&self) -> Result<String, MwApiError> {
        if let Some(token) = self.csrf_token.read().await.as_ref() {
            return Ok(token.clone());
        }
        self.fetch_csrf_token().await
    }

    async fn fetch_page(&self, title: &Title) -> Result<PageContent, MwApiError> {
        let maxlag = self.throttle.maxlag().to_string();
        let resp = send_json(self.http.get(self.api_url.as_str()).query(&[
            ("action", "query"),
            ("titles", title.display.as_str()),
            ("prop", "revisions|info"),
            ("rvprop", "ids|timestamp|content"),
            ("rvslots", "main"),
            ("format", "json"),
            ("maxlag", maxlag.as_str()),
        ]))
        .await?;
        check_api_error(&resp)?;
        parse_page(&resp, title)
    }

    async fn try_edit(&self, edit: &EditRequest) -> Result<EditResponse, MwApiError> {
        let csrf = self.csrf().await?;

        let mut params = vec![
            ("action", "edit".to_string()),
            ("title", edit.title.display.clone()),
            ("text", edit.text.clone()),
            ("summary", edit.summary.clone()),
            ("token", csrf),
            ("starttimestamp", edit.start_timestamp.clone()),
            ("format", "json".to_string()),
            ("maxlag", self.throttle.maxlag().to_string()),
        ];
        if !edit.base_timestamp.is_empty() {
            params.push(("basetimestamp", edit.base_timestamp.clone()));
        }
        if edit.minor {
            params.push(("minor", "1".to_string()));
        }
        if edit.bot {
            params.push(("bot", "1".to_string()));
        }

        let resp = send_json(self.http.post(self.api_url.as_str()).form(&params)).await?;

        if let Some(code) = resp["error"]["code"].as_str() {
            match code {
                "editconflict" => {
                    return Err(MwApiError::EditConflict {
                        title: edit.title.display.clone(),
                    });
                }
                "badtoken" => {
                    *self.csrf_token.write().await = None;
                    return Err(MwApiError::BadToken);
                }
                _ => check_api_error(&resp)?,
            }
        }

        let edit_resp = &resp["edit"];
        let result = edit_resp["result"].as_str().unwrap_or("").to_string();
        if result != "Success" {
            return Err(MwApiError::ApiError {
                code: "editfailed".into(),
                info: edit_resp.to_string(),
            });
        }
        Ok(EditResponse {
            result,
            new_revid: edit_resp["newrevid"].as_u64(),
            new_timestamp: edit_resp["newtimestamp"].as_str().map(String::from),
        })
    }
}

/// Pull the single page out of a `prop=revisions` query response.
fn parse_page(resp: &serde_json::Value, requested: &Title) -> Result<PageContent, MwApiError> {
    let pages = &resp["query"]["pages"];
    let page = pages
        .as_object()
        .and_then(|m| m.values().next())
        .ok_or_else(|| MwApiError::ApiError {
            code: "nopage".into(),
            info: "No page data returned".into(),
        })?;

    if page.get("invalid").is_some() {
        return Err(MwApiError::ApiError {
            code: "invalidtitle".into(),
            info: page["invalidreason"].as_str().unwrap_or("").to_string(),
        });
    }

    let ns = Namespace(page["ns"].as_i64().unwrap_or(requested.namespace.0 as i64) as i32);
    let page_title = page["title"].as_str().unwrap_or(&requested.display);
    let title = Title::from_display(ns, page_title);

    if page.get("missing").is_some() {
        debug!(title = %title, "Page does not exist");
        return Ok(PageContent::missing(title));
    }

    let rev = &page["revisions"][0];
    let timestamp_str = rev["timestamp"].as_str().unwrap_or("");
    let timestamp = chrono::DateTime::parse_from_rfc3339(timestamp_str)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or_else(|_| chrono::Utc::now());

    Ok(PageContent {
        page_id: PageId(page["pageid"].as_u64().unwrap_or(0)),
        title,
        revision: RevisionId(rev["revid"].as_u64().unwrap_or(0)),
        timestamp,
        wikitext: rev["slots"]["main"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        exists: true,
        is_redirect: page.get("redirect").is_some(),
    })
}

#[async_trait]
impl MediaWikiClient for ReqwestMwClient {
    async fn login_bot_password(&self, username: &str, password: &str) -> Result<(), MwApiError> {
        crate::auth::login_bot_password(&self.http, &self.api_url, username, password).await
    }

    async fn fetch_csrf_token(&self) -> Result<String, MwApiError> {
        let token = crate::auth::fetch_csrf_token(&self.http, &self.api_url).await?;
        *self.csrf_token.write().await = Some(token.clone());
        Ok(token)
    }

    async fn get_page(&self, title: &Title) -> Result<PageContent, MwApiError> {
        self.retry_policy.execute(|| self.fetch_page(title)).await
    }

    async fn edit_page(&self, edit: &EditRequest) -> Result<EditResponse, MwApiError> {
        self.throttle.acquire_edit_permit().await;
        self.retry_policy.execute(|| self.try_edit(edit)).await
    }

    async fn search(
        &self,
        query: &str,
        namespaces: &[Namespace],
        limit: usize,
    ) -> Result<Vec<Title>, MwApiError> {
        let maxlag = self.throttle.maxlag();
        self.retry_policy
            .execute(|| {
                crate::search::search(&self.http, &self.api_url, query, namespaces, limit, maxlag)
            })
            .await
    }
}
