use crate::error::MwApiError;
use crate::response::{check_api_error, send_json};
use wb_domain::types::*;

/// Parse a standard MediaWiki query list response into Titles
pub fn parse_list_response(resp: &serde_json::Value, list_key: &str) -> Vec<Title> {
    resp["query"][list_key]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|item| {
                    let ns = Namespace(item["ns"].as_i64()? as i32);
                    let display = item["title"].as_str()?;
                    Some(Title::from_display(ns, display))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Continuation value for `key`; offsets come back as numbers.
pub fn get_continue_token(resp: &serde_json::Value, key: &str) -> Option<String> {
    match &resp["continue"][key] {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Fetch a list endpoint, following continuation until exhausted or
/// `limit` titles are collected (0 = unlimited).
pub async fn fetch_all_pages(
    client: &reqwest::Client,
    api_url: &url::Url,
    base_params: &[(&str, &str)],
    list_key: &str,
    continue_key: &str,
    limit: usize,
) -> Result<Vec<Title>, MwApiError> {
    let mut all_titles = Vec::new();
    let mut continue_token: Option<String> = None;

    loop {
        let mut params: Vec<(&str, String)> = base_params
            .iter()
            .map(|(k, v)| (*k, v.to_string()))
            .collect();
        params.push(("format", "json".to_string()));
        if let Some(ref token) = continue_token {
            params.push((continue_key, token.clone()));
            params.push(("continue", "-||".to_string()));
        }

        let resp = send_json(client.get(api_url.as_str()).query(&params)).await?;
        check_api_error(&resp)?;

        all_titles.extend(parse_list_response(&resp, list_key));
        if limit > 0 && all_titles.len() >= limit {
            all_titles.truncate(limit);
            break;
        }

        match get_continue_token(&resp, continue_key) {
            Some(token) => continue_token = Some(token),
            None => break,
        }
    }

    Ok(all_titles)
}

/// Full-text search (`list=search`) restricted to `namespaces`.
pub async fn search(
    client: &reqwest::Client,
    api_url: &url::Url,
    query: &str,
    namespaces: &[Namespace],
    limit: usize,
    maxlag: u32,
) -> Result<Vec<Title>, MwApiError> {
    let namespaces = namespaces
        .iter()
        .map(|ns| ns.0.to_string())
        .collect::<Vec<_>>()
        .join("|");
    let page_size = if limit > 0 { limit.min(500) } else { 500 }.to_string();
    let maxlag = maxlag.to_string();

    let base_params = [
        ("action", "query"),
        ("list", "search"),
        ("srsearch", query),
        ("srnamespace", namespaces.as_str()),
        ("srlimit", page_size.as_str()),
        ("srprop", ""),
        ("maxlag", maxlag.as_str()),
    ];

    fetch_all_pages(client, api_url, &base_params, "search", "sroffset", limit).await
}
