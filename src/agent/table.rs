use serde_json::json;

use crate::error::{AppError, AppResult};

use super::AgentRole;

pub const FETCH_UNREAD: &str = "fetch_unread";
pub const CREATE_DRAFT: &str = "create_draft";

#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub callers: &'static [AgentRole],
    pub executor: AgentRole,
    pub parameters: fn() -> serde_json::Value,
}

pub const TOOL_TABLE: &[ToolSpec] = &[
    ToolSpec {
        name: FETCH_UNREAD,
        description: "Fetch unread inbox messages and write their summaries to the export file",
        callers: &[AgentRole::Categorizer],
        executor: AgentRole::TaskHandler,
        parameters: fetch_unread_parameters,
    },
    ToolSpec {
        name: CREATE_DRAFT,
        description: "Create a draft email, optionally as a threaded reply",
        callers: &[AgentRole::Categorizer, AgentRole::InquiryHandler],
        executor: AgentRole::TaskHandler,
        parameters: create_draft_parameters,
    },
];

pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    TOOL_TABLE.iter().find(|spec| spec.name == name)
}

pub fn authorize(spec: &ToolSpec, caller: AgentRole) -> AppResult<()> {
    if spec.callers.contains(&caller) {
        return Ok(());
    }

    Err(AppError::Capability(format!(
        "role `{caller}` may not invoke `{}`",
        spec.name
    )))
}

fn fetch_unread_parameters() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "limit": {
                "type": "integer",
                "description": "Maximum number of unread messages to fetch",
                "default": 10
            }
        },
        "required": []
    })
}

fn create_draft_parameters() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "content": {
                "type": "string",
                "description": "Body text of the draft"
            },
            "to": {
                "type": "string",
                "description": "Recipient address"
            },
            "from": {
                "type": "string",
                "description": "Sender address"
            },
            "subject": {
                "type": "string",
                "description": "Subject line"
            },
            "reply_to": {
                "type": "string",
                "description": "Id of the message being replied to"
            },
            "reply": {
                "type": "boolean",
                "description": "Quote the original message and thread the draft under it",
                "default": false
            }
        },
        "required": ["content", "to", "from", "subject"]
    })
}
