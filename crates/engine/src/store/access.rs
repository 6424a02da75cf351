use tracing::warn;

use crate::{EngineError, Group, ResultEngine};

use super::LedgerState;

impl LedgerState {
    /// The group, provided `admin_id` administers it.
    pub(super) fn require_admin(&self, group_id: &str, admin_id: &str) -> ResultEngine<&Group> {
        let group = self
            .group(group_id)
            .ok_or_else(|| EngineError::KeyNotFound(group_id.to_string()))?;
        if !group.is_admin(admin_id) {
            warn!(group_id, admin_id, "admin operation refused");
            return Err(EngineError::Forbidden(format!(
                "{admin_id} is not the admin of {group_id}"
            )));
        }
        Ok(group)
    }
}

/// Fails unless every id is a declared member of `group`.
pub(super) fn require_members<'a>(
    group: &Group,
    member_ids: impl IntoIterator<Item = &'a String>,
) -> ResultEngine<()> {
    for member_id in member_ids {
        if !group.is_member(member_id) {
            warn!(group_id = %group.id, member_id = %member_id, "unknown member");
            return Err(EngineError::KeyNotFound(member_id.clone()));
        }
    }
    Ok(())
}
