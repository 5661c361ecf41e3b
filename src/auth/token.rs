use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

const EXPIRY_SKEW: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at_unix: Option<u64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub email: Option<String>,
}

impl TokenSet {
    // A token with no expiry timestamp never expires locally.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        match (self.expires_at_unix, unix_seconds(now)) {
            (Some(expires_at), Some(now_secs)) => {
                now_secs.saturating_add(EXPIRY_SKEW.as_secs()) >= expires_at
            }
            _ => false,
        }
    }

    pub fn expires_in_seconds(&self, now: SystemTime) -> Option<i64> {
        let expires_at = self.expires_at_unix? as i64;
        Some(expires_at - unix_seconds(now)? as i64)
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }
}

fn unix_seconds(now: SystemTime) -> Option<u64> {
    now.duration_since(UNIX_EPOCH)
        .ok()
        .map(|since_epoch| since_epoch.as_secs())
}
