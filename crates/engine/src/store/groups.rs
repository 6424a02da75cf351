use tracing::debug;

use crate::{
    Currency, EngineError, Group, Member, ResultEngine,
    util::{new_id, new_invite_code, normalize_required_name},
};

use super::MemoryLedger;

impl MemoryLedger {
    /// Creates a group administered by `owner`, its only member so far.
    pub fn create_group(&self, name: &str, currency: Currency, owner: Member) -> ResultEngine<Group> {
        let name = normalize_required_name(name, "group name")?;
        if owner.id.trim().is_empty() {
            return Err(EngineError::InvalidId("owner id must not be empty".to_string()));
        }
        let owner = Member::new(
            owner.id.trim(),
            normalize_required_name(&owner.name, "member name")?,
        );

        let mut state = self.write();
        let mut invite_code = new_invite_code();
        while state.groups.iter().any(|group| group.invite_code == invite_code) {
            invite_code = new_invite_code();
        }

        let group = Group {
            id: new_id(),
            name,
            currency,
            admin_id: owner.id.clone(),
            members: vec![owner],
            expenses: Vec::new(),
            invite_code,
        };
        state.groups.push(group.clone());
        debug!(group_id = %group.id, admin_id = %group.admin_id, "group created");
        Ok(group)
    }

    /// Deletes the group along with its join requests and subscriptions.
    pub fn delete_group(&self, group_id: &str, admin_id: &str) -> ResultEngine<Group> {
        let group = {
            let mut state = self.write();
            state.require_admin(group_id, admin_id)?;
            let position = state
                .groups
                .iter()
                .position(|group| group.id == group_id)
                .ok_or_else(|| EngineError::KeyNotFound(group_id.to_string()))?;
            state.invites.retain(|invite| invite.group_id != group_id);
            state.groups.remove(position)
        };
        self.subscribers()
            .entries
            .retain(|subscriber| subscriber.group_id != group_id);

        debug!(group_id, "group deleted");
        Ok(group)
    }

    /// Every group, in creation order.
    pub fn groups(&self) -> Vec<Group> {
        self.read().groups.clone()
    }
}
