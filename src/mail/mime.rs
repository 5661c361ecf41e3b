use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct DraftContent {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

pub fn build_raw_draft(content: &DraftContent) -> String {
    let boundary = random_boundary();
    let mut out = String::new();

    out.push_str(&format!("To: {}\r\n", sanitize_header_value(&content.to)));
    out.push_str(&format!(
        "From: {}\r\n",
        sanitize_header_value(&content.from)
    ));
    out.push_str(&format!(
        "Subject: {}\r\n",
        sanitize_header_value(&content.subject)
    ));
    out.push_str("MIME-Version: 1.0\r\n");
    out.push_str(&format!(
        "Content-Type: multipart/alternative; boundary=\"{boundary}\"\r\n\r\n"
    ));

    out.push_str(&format!("--{boundary}\r\n"));
    out.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
    out.push_str(&content.body);
    out.push_str("\r\n");
    out.push_str(&format!("--{boundary}--\r\n"));

    URL_SAFE_NO_PAD.encode(out.as_bytes())
}

fn sanitize_header_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect()
}

fn random_boundary() -> String {
    let mut bytes = [0_u8; 12];
    rand::thread_rng().fill(&mut bytes);
    let token = STANDARD.encode(bytes);
    format!("triage-{token}")
}
