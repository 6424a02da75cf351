use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl InviteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for InviteStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidName(format!(
                "invalid invite status: {other}"
            ))),
        }
    }
}

/// A request to join a group, answered by the group admin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInvite {
    pub id: String,
    pub group_id: String,
    pub group_name: String,
    pub admin_id: String,
    pub requester_id: String,
    pub requester_name: String,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
}

impl GroupInvite {
    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Pending
    }
}
