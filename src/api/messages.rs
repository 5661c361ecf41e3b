pub fn message_endpoint(id: &str) -> String {
    format!("/gmail/v1/users/me/messages/{id}")
}

pub fn list_endpoint() -> &'static str {
    "/gmail/v1/users/me/messages"
}

pub fn drafts_endpoint() -> &'static str {
    "/gmail/v1/users/me/drafts"
}

pub fn get_query() -> Vec<(String, String)> {
    vec![("format".to_string(), "full".to_string())]
}

pub fn unread_query(limit: u32) -> Vec<(String, String)> {
    vec![
        ("labelIds".to_string(), "INBOX".to_string()),
        ("q".to_string(), "is:unread".to_string()),
        ("maxResults".to_string(), limit.to_string()),
    ]
}
