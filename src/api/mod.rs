pub mod client;
pub mod messages;
pub mod models;

pub use client::MailClient;
pub use models::{DraftReceipt, EmailSummary, MessageHeader, OriginalMessage, header_last};
