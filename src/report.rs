use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_LOG_DB: &str = "logs.db";
pub const DEFAULT_LOG_TABLE: &str = "chat_completions";

#[derive(Debug, Clone)]
pub struct LogRow {
    pub request: String,
    pub response: String,
    pub cost: f64,
}

pub trait LogSource {
    fn rows(&self) -> AppResult<Vec<LogRow>>;
}

#[derive(Debug, Clone)]
pub struct SqliteLogSource {
    path: PathBuf,
    table: String,
}

impl SqliteLogSource {
    pub fn new(path: &Path, table: &str) -> AppResult<Self> {
        validate_table_name(table)?;
        Ok(Self {
            path: path.to_path_buf(),
            table: table.to_string(),
        })
    }
}

impl LogSource for SqliteLogSource {
    fn rows(&self) -> AppResult<Vec<LogRow>> {
        if !self.path.exists() {
            return Err(AppError::InvalidInput(format!(
                "usage log {} does not exist",
                self.path.display()
            )));
        }

        let conn = Connection::open(&self.path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT request, response, COALESCE(cost, 0) FROM {}",
            self.table
        ))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(LogRow {
                    request: row.get(0)?,
                    response: row.get(1)?,
                    cost: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

// Table names cannot be bound as SQL parameters; the alphabet is restricted instead.
fn validate_table_name(table: &str) -> AppResult<()> {
    let valid =
        !table.is_empty() && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "invalid table name `{table}`; expected ascii letters, digits, or underscores"
        )))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub total_tokens: u64,
    pub total_cost: f64,
    pub requests: usize,
}

#[derive(Debug, Deserialize)]
struct LoggedResponse {
    usage: LoggedUsage,
}

#[derive(Debug, Deserialize)]
struct LoggedUsage {
    total_tokens: u64,
}

pub fn generate_usage_report<S: LogSource>(source: &S) -> AppResult<UsageReport> {
    let rows = source.rows()?;

    let mut total_tokens = 0_u64;
    let mut total_cost = 0.0_f64;

    for (index, row) in rows.iter().enumerate() {
        let response: LoggedResponse = serde_json::from_str(&row.response).map_err(|err| {
            AppError::InvalidInput(format!(
                "row {}: response payload is not a usage record: {err}",
                index + 1
            ))
        })?;

        total_tokens += response.usage.total_tokens;
        total_cost += row.cost;
    }

    Ok(UsageReport {
        total_tokens,
        total_cost,
        requests: rows.len(),
    })
}
