use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::oauth::AuthService;
use crate::auth::store::CredentialStore;
use crate::config::Settings;
use crate::error::{AppError, AppResult};

use super::messages;
use super::models::{DraftReceipt, MessageHeader, OriginalMessage};

const GMAIL_API_BASE_URL: &str = "https://gmail.googleapis.com";

#[derive(Debug)]
pub struct MailClient<S: CredentialStore> {
    http: Client,
    base_url: String,
    settings: Settings,
    store: S,
    profile: String,
}

impl<S: CredentialStore> MailClient<S> {
    pub fn new(settings: Settings, store: S, profile: &str) -> Self {
        let base_url = settings
            .api_base_url
            .clone()
            .unwrap_or_else(|| GMAIL_API_BASE_URL.to_string());

        Self {
            http: Client::new(),
            base_url,
            settings,
            store,
            profile: profile.to_string(),
        }
    }

    pub async fn get_message(&self, id: &str) -> AppResult<OriginalMessage> {
        let access_token = self.access_token().await?;
        let endpoint = messages::message_endpoint(id);
        let query = messages::get_query();
        let resource: WireMessage = self
            .get_json(&endpoint, &access_token, Some(&query))
            .await?;
        Ok(resource.into_message())
    }

    pub async fn list_unread(&self, limit: u32) -> AppResult<Vec<OriginalMessage>> {
        let access_token = self.access_token().await?;
        let query = messages::unread_query(limit);
        let listing: WireMessageList = self
            .get_json(messages::list_endpoint(), &access_token, Some(&query))
            .await?;

        let mut results = Vec::new();
        for entry in listing.messages.unwrap_or_default() {
            let resource: WireMessage = self
                .get_json(
                    &messages::message_endpoint(&entry.id),
                    &access_token,
                    Some(&messages::get_query()),
                )
                .await?;
            results.push(resource.into_message());
        }

        Ok(results)
    }

    pub async fn create_draft(
        &self,
        raw_message: &str,
        thread_id: Option<&str>,
    ) -> AppResult<DraftReceipt> {
        let access_token = self.access_token().await?;
        let request = WireDraftRequest {
            message: WireDraftMessage {
                raw: raw_message.to_string(),
                thread_id: thread_id.map(ToOwned::to_owned),
            },
        };

        let response: WireDraftResponse = self
            .post_json(messages::drafts_endpoint(), &access_token, &request)
            .await?;

        let (message_id, thread_id) = match response.message {
            Some(message) => (message.id, message.thread_id),
            None => (None, None),
        };

        Ok(DraftReceipt {
            draft_id: response.id,
            message_id,
            thread_id,
        })
    }

    async fn access_token(&self) -> AppResult<String> {
        let token = AuthService::refresh(&self.profile, &self.settings, &self.store).await?;
        Ok(token.access_token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        access_token: &str,
        query: Option<&[(String, String)]>,
    ) -> AppResult<T> {
        let mut request = self.http.get(self.endpoint_url(endpoint)?);
        if let Some(query) = query {
            request = request.query(query);
        }

        execute(request.bearer_auth(access_token)).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        access_token: &str,
        body: &B,
    ) -> AppResult<T> {
        let request = self.http.post(self.endpoint_url(endpoint)?).json(body);
        execute(request.bearer_auth(access_token)).await
    }

    fn endpoint_url(&self, endpoint: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.set_path(endpoint.trim_start_matches('/'));
        Ok(url)
    }
}

async fn execute<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> AppResult<T> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(map_api_error(status, &body))
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: String,
    #[serde(rename = "threadId")]
    thread_id: Option<String>,
    snippet: Option<String>,
    payload: Option<WirePart>,
}

impl WireMessage {
    fn into_message(self) -> OriginalMessage {
        let (headers, body_data) = match self.payload {
            Some(payload) => {
                let body_data = find_body_data(&payload);
                let headers = payload
                    .headers
                    .unwrap_or_default()
                    .into_iter()
                    .map(|header| MessageHeader {
                        name: header.name,
                        value: header.value,
                    })
                    .collect();
                (headers, body_data)
            }
            None => (Vec::new(), None),
        };

        OriginalMessage {
            id: self.id,
            thread_id: self.thread_id,
            snippet: self.snippet,
            headers,
            body_data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePart {
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
    headers: Option<Vec<WireHeader>>,
    body: Option<WireBody>,
    parts: Option<Vec<WirePart>>,
}

#[derive(Debug, Deserialize)]
struct WireBody {
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireHeader {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct WireMessageList {
    messages: Option<Vec<WireMessageListEntry>>,
}

#[derive(Debug, Deserialize)]
struct WireMessageListEntry {
    id: String,
}

#[derive(Debug, Serialize)]
struct WireDraftRequest {
    message: WireDraftMessage,
}

#[derive(Debug, Serialize)]
struct WireDraftMessage {
    raw: String,
    #[serde(rename = "threadId", skip_serializing_if = "Option::is_none")]
    thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDraftResponse {
    id: String,
    message: Option<WireDraftResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct WireDraftResponseMessage {
    id: Option<String>,
    #[serde(rename = "threadId")]
    thread_id: Option<String>,
}

fn find_body_data(part: &WirePart) -> Option<String> {
    if let Some(data) = part.body.as_ref().and_then(|body| body.data.as_deref()) {
        if !data.is_empty() {
            return Some(data.to_string());
        }
    }

    let children = part.parts.as_deref().unwrap_or_default();

    // A text/plain sibling beats whatever alternative the provider lists next.
    for child in children {
        if child.mime_type.as_deref() == Some("text/plain") {
            if let Some(data) = child.body.as_ref().and_then(|body| body.data.as_deref()) {
                if !data.is_empty() {
                    return Some(data.to_string());
                }
            }
        }
    }

    for child in children {
        if let Some(data) = find_body_data(child) {
            return Some(data);
        }
    }

    None
}

#[derive(Debug, Deserialize)]
struct MailApiErrorEnvelope {
    error: MailApiError,
}

#[derive(Debug, Deserialize)]
struct MailApiError {
    code: Option<u16>,
    status: Option<String>,
    message: Option<String>,
    errors: Option<Vec<MailApiErrorDetail>>,
}

#[derive(Debug, Deserialize)]
struct MailApiErrorDetail {
    reason: Option<String>,
}

fn map_api_error(status: StatusCode, body: &str) -> AppError {
    let message = parse_api_error_message(body).unwrap_or_else(|| match body.trim() {
        "" => "no error details in response body".to_string(),
        raw => raw.to_string(),
    });

    match status.as_u16() {
        401 | 403 => AppError::Auth(format!(
            "mail api authorization failed ({status}): {message}. run `triage auth login`"
        )),
        _ => AppError::Api(format!("mail api request failed ({status}): {message}")),
    }
}

fn parse_api_error_message(body: &str) -> Option<String> {
    let error = serde_json::from_str::<MailApiErrorEnvelope>(body).ok()?.error;
    let reason = error
        .errors
        .unwrap_or_default()
        .into_iter()
        .find_map(|detail| detail.reason);

    let parts = [
        error.message,
        error.status.map(|status| format!("status={status}")),
        error.code.map(|code| format!("code={code}")),
        reason.map(|reason| format!("reason={reason}")),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_header(name: &str, value: &str) -> WireHeader {
        WireHeader {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn data_part(mime_type: &str, data: &str) -> WirePart {
        WirePart {
            mime_type: Some(mime_type.to_string()),
            headers: None,
            body: Some(WireBody {
                data: Some(data.to_string()),
            }),
            parts: None,
        }
    }

    #[test]
    fn maps_simple_message_with_inline_body() {
        let resource = WireMessage {
            id: "msg-123".to_string(),
            thread_id: Some("thread-456".to_string()),
            snippet: Some("hello world".to_string()),
            payload: Some(WirePart {
                mime_type: Some("text/plain".to_string()),
                headers: Some(vec![
                    wire_header("Subject", "hello"),
                    wire_header("From", "dev@example.com"),
                ]),
                body: Some(WireBody {
                    data: Some("SGVsbG8".to_string()),
                }),
                parts: None,
            }),
        };

        let message = resource.into_message();
        assert_eq!(message.id, "msg-123");
        assert_eq!(message.thread_id.as_deref(), Some("thread-456"));
        assert_eq!(message.sender(), Some("dev@example.com"));
        assert_eq!(message.body_data.as_deref(), Some("SGVsbG8"));
    }

    #[test]
    fn prefers_plain_text_part_in_multipart_payload() {
        let payload = WirePart {
            mime_type: Some("multipart/alternative".to_string()),
            headers: None,
            body: None,
            parts: Some(vec![
                data_part("text/html", "aHRtbA"),
                data_part("text/plain", "cGxhaW4"),
            ]),
        };

        assert_eq!(find_body_data(&payload).as_deref(), Some("cGxhaW4"));
    }

    #[test]
    fn descends_into_nested_multipart_containers() {
        let payload = WirePart {
            mime_type: Some("multipart/mixed".to_string()),
            headers: None,
            body: None,
            parts: Some(vec![WirePart {
                mime_type: Some("multipart/alternative".to_string()),
                headers: None,
                body: None,
                parts: Some(vec![
                    data_part("text/html", "aHRtbA"),
                    data_part("text/plain", "cGxhaW4"),
                ]),
            }]),
        };

        assert_eq!(find_body_data(&payload).as_deref(), Some("cGxhaW4"));
    }

    #[test]
    fn body_data_is_absent_for_empty_payload() {
        let payload = WirePart {
            mime_type: Some("text/plain".to_string()),
            headers: None,
            body: Some(WireBody { data: None }),
            parts: None,
        };

        assert_eq!(find_body_data(&payload), None);
    }

    #[test]
    fn draft_request_omits_thread_when_not_replying() {
        let request = WireDraftRequest {
            message: WireDraftMessage {
                raw: "cmF3".to_string(),
                thread_id: None,
            },
        };

        let value = serde_json::to_value(&request).expect("serializes");
        assert!(value["message"].get("threadId").is_none());
        assert_eq!(value["message"]["raw"], "cmF3");
    }

    #[test]
    fn draft_request_carries_thread_for_replies() {
        let request = WireDraftRequest {
            message: WireDraftMessage {
                raw: "cmF3".to_string(),
                thread_id: Some("thread-9".to_string()),
            },
        };

        let value = serde_json::to_value(&request).expect("serializes");
        assert_eq!(value["message"]["threadId"], "thread-9");
    }

    #[test]
    fn maps_unauthorized_as_auth_error() {
        let error = map_api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"code":401,"message":"Invalid Credentials","status":"UNAUTHENTICATED","errors":[{"reason":"authError"}]}}"#,
        );

        match error {
            AppError::Auth(message) => {
                assert!(message.contains("Invalid Credentials"));
                assert!(message.contains("reason=authError"));
                assert!(message.contains("triage auth login"));
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn maps_not_found_as_api_error() {
        let error = map_api_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#,
        );

        match error {
            AppError::Api(message) => {
                assert!(message.contains("Requested entity was not found"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
