pub mod compose;
pub mod mime;

pub use compose::{ComposeRequest, PreparedDraft, compose_draft};
pub use mime::DraftContent;
