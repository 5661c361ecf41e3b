pub mod dispatch;
pub mod table;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use dispatch::invoke;
pub use table::{TOOL_TABLE, ToolSpec, find_tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    UserProxy,
    TaskHandler,
    InquiryHandler,
    Categorizer,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [
        AgentRole::UserProxy,
        AgentRole::TaskHandler,
        AgentRole::InquiryHandler,
        AgentRole::Categorizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::UserProxy => "user_proxy",
            AgentRole::TaskHandler => "task_handler",
            AgentRole::InquiryHandler => "inquiry_handler",
            AgentRole::Categorizer => "categorizer",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AgentRole::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| {
                let known = AgentRole::ALL.map(|role| role.as_str()).join(", ");
                AppError::InvalidInput(format!("unknown role `{value}`; expected one of: {known}"))
            })
    }
}
