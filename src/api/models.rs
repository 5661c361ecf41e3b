use serde::Serialize;

#[derive(Debug, Clone)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct OriginalMessage {
    pub id: String,
    pub thread_id: Option<String>,
    pub snippet: Option<String>,
    pub headers: Vec<MessageHeader>,
    pub body_data: Option<String>,
}

impl OriginalMessage {
    pub fn date(&self) -> Option<&str> {
        header_last(&self.headers, "Date")
    }

    pub fn sender(&self) -> Option<&str> {
        header_last(&self.headers, "From")
    }

    pub fn subject(&self) -> Option<&str> {
        header_last(&self.headers, "Subject")
    }
}

// Exact name match; when the provider repeats a header the last occurrence wins.
pub fn header_last<'a>(headers: &'a [MessageHeader], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .rev()
        .find(|header| header.name == name)
        .map(|header| header.value.as_str())
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailSummary {
    pub id: String,
    pub subject: Option<String>,
    pub snippet: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftReceipt {
    pub draft_id: String,
    pub message_id: Option<String>,
    pub thread_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(name: &str, value: &str) -> MessageHeader {
        MessageHeader {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn last_occurrence_wins_for_repeated_headers() {
        let headers = vec![
            header("Received", "by relay-a"),
            header("Subject", "first"),
            header("Subject", "second"),
        ];

        assert_eq!(header_last(&headers, "Subject"), Some("second"));
    }

    #[test]
    fn header_names_match_exactly() {
        let headers = vec![header("subject", "lowercase")];

        assert_eq!(header_last(&headers, "Subject"), None);
        assert_eq!(header_last(&headers, "subject"), Some("lowercase"));
    }

    #[test]
    fn accessors_read_reply_attribution_headers() {
        let message = OriginalMessage {
            id: "m-1".to_string(),
            thread_id: Some("t-1".to_string()),
            snippet: None,
            headers: vec![
                header("Date", "Mon, 2 Mar 2026 09:15:00 +0000"),
                header("From", "colleague@example.com"),
            ],
            body_data: None,
        };

        assert_eq!(message.date(), Some("Mon, 2 Mar 2026 09:15:00 +0000"));
        assert_eq!(message.sender(), Some("colleague@example.com"));
        assert_eq!(message.subject(), None);
    }
}
