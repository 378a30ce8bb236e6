//! Turning HTTP responses and API `error` objects into [`MwApiError`]s.

use crate::error::MwApiError;
use reqwest::StatusCode;

/// Send `builder` and decode the JSON body, mapping throttling statuses.
pub async fn send_json(builder: reqwest::RequestBuilder) -> Result<serde_json::Value, MwApiError> {
    let resp = builder.send().await?;
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(MwApiError::RateLimited {
            retry_after: retry_after_header(&resp).unwrap_or(5),
        });
    }
    if status == StatusCode::SERVICE_UNAVAILABLE {
        return Err(MwApiError::ServiceUnavailable);
    }
    if !status.is_success() {
        let url = resp.url().to_string();
        let body = resp.text().await.unwrap_or_default();
        return Err(MwApiError::Http {
            status: status.as_u16(),
            url,
            body,
        });
    }
    Ok(resp.json().await?)
}

fn retry_after_header(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Fail on a top-level `error` object.
pub fn check_api_error(resp: &serde_json::Value) -> Result<(), MwApiError> {
    let Some(error) = resp.get("error") else {
        return Ok(());
    };
    let code = error["code"].as_str().unwrap_or("unknown").to_string();
    let info = error["info"].as_str().unwrap_or("").to_string();
    match code.as_str() {
        "maxlag" => {
            let retry_after = info
                .split_whitespace()
                .find_map(|w| w.parse::<u64>().ok())
                .unwrap_or(5);
            Err(MwApiError::MaxLag { retry_after })
        }
        "badtoken" => Err(MwApiError::BadToken),
        _ => Err(MwApiError::ApiError { code, info }),
    }
}
