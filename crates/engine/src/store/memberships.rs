use tracing::{debug, warn};

use crate::{EngineError, Group, ResultEngine};

use super::MemoryLedger;

/// Drops `member_id` from the member list; past expenses are kept.
fn remove_declared_member(group: &mut Group, member_id: &str) -> ResultEngine<()> {
    let position = group
        .members
        .iter()
        .position(|member| member.id == member_id)
        .ok_or_else(|| EngineError::KeyNotFound(member_id.to_string()))?;
    group.members.remove(position);
    Ok(())
}

impl MemoryLedger {
    /// Leaves the group. The admin cannot leave.
    pub fn leave_group(&self, group_id: &str, member_id: &str) -> ResultEngine<()> {
        self.with_group_mut(group_id, |group| {
            if group.is_admin(member_id) {
                warn!(group_id, member_id, "admin cannot leave");
                return Err(EngineError::Forbidden(
                    "the admin cannot leave the group".to_string(),
                ));
            }
            remove_declared_member(group, member_id)?;
            debug!(group_id, member_id, "member left");
            Ok(())
        })
    }

    /// Removes another member (admin-only).
    pub fn remove_member(
        &self,
        group_id: &str,
        member_id: &str,
        admin_id: &str,
    ) -> ResultEngine<()> {
        self.with_state_mut(group_id, |state| {
            state.require_admin(group_id, admin_id)?;
            if member_id == admin_id {
                return Err(EngineError::Forbidden(
                    "the admin cannot be removed".to_string(),
                ));
            }
            remove_declared_member(state.group_mut(group_id)?, member_id)?;
            debug!(group_id, member_id, "member removed");
            Ok(())
        })
    }
}
