use gloo_net::http::Request;
use leptos::web_sys::FormData;
use thiserror::Error;

use crate::models::{
    EntryDetails, EntryDetailsResponse, LinkPreviewResponse, OrderResponse, OrderUpdate,
};
use crate::modal::{submit_outcome, truncate_chars, SubmitOutcome, ERROR_BODY_LIMIT};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] gloo_net::Error),
    #[error("{0}")]
    Server(String),
    #[error("server answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

fn is_json(response: &gloo_net::http::Response) -> bool {
    response
        .headers()
        .get("content-type")
        .is_some_and(|t| t.contains("json"))
}

/// Non-2xx answers that aren't the server's JSON error shape.
async fn status_error(response: gloo_net::http::Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ApiError::Status {
        status,
        body: truncate_chars(body.trim(), ERROR_BODY_LIMIT),
    }
}

pub async fn update_order(update: &OrderUpdate) -> Result<(), ApiError> {
    let response = Request::post("/update_order")
        .json(update)?
        .send()
        .await?;
    if !response.ok() && !is_json(&response) {
        return Err(status_error(response).await);
    }
    let body: OrderResponse = response.json().await?;
    if body.is_success() {
        Ok(())
    } else {
        Err(ApiError::Server(body.message.unwrap_or_else(|| {
            format!("reorder rejected (status {:?})", body.status)
        })))
    }
}

pub async fn entry_details(entry_id: &str) -> Result<EntryDetails, ApiError> {
    let response = Request::get(&format!("/get_entry_details/{entry_id}"))
        .send()
        .await?;
    // 404 still carries {"error": ...}
    if !response.ok() && !is_json(&response) {
        return Err(status_error(response).await);
    }
    match response.json::<EntryDetailsResponse>().await? {
        EntryDetailsResponse::Details(details) => Ok(details),
        EntryDetailsResponse::Error { error } => Err(ApiError::Server(error)),
    }
}

/// Server-reported preview failures come back as `Ok(LinkPreviewResponse::Error)`.
pub async fn link_preview(url: &str) -> Result<LinkPreviewResponse, ApiError> {
    let response = Request::get("/get_link_preview")
        .query([("url", url)])
        .send()
        .await?;
    Ok(response.json::<LinkPreviewResponse>().await?)
}

pub async fn submit_entry_form(action: &str, form: FormData) -> Result<SubmitOutcome, ApiError> {
    let response = Request::post(action).body(form)?.send().await?;
    let ok = response.ok();
    let status = response.status();
    let final_url = response.url();
    let body = if ok {
        String::new()
    } else {
        response.text().await.unwrap_or_default()
    };
    Ok(submit_outcome(ok, status, &final_url, &body))
}
