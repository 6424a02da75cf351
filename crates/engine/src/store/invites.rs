use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    EngineError, Group, GroupInvite, InviteStatus, Member, ResultEngine,
    util::{normalize_invite_code, normalize_required_name},
};

use super::{LedgerState, MemoryLedger};

impl LedgerState {
    fn invite_mut(&mut self, invite_id: &str) -> ResultEngine<&mut GroupInvite> {
        self.invites
            .iter_mut()
            .find(|invite| invite.id == invite_id)
            .ok_or_else(|| EngineError::KeyNotFound(invite_id.to_string()))
    }

    /// Checks that the invite is still pending and `admin_id` may answer it.
    fn answerable_invite(&self, invite_id: &str, admin_id: &str) -> ResultEngine<GroupInvite> {
        let invite = self
            .invites
            .iter()
            .find(|invite| invite.id == invite_id)
            .ok_or_else(|| EngineError::KeyNotFound(invite_id.to_string()))?;
        if invite.admin_id != admin_id {
            warn!(invite_id, admin_id, "invite answer refused");
            return Err(EngineError::Forbidden(format!(
                "{admin_id} cannot answer {invite_id}"
            )));
        }
        if !invite.is_pending() {
            return Err(EngineError::InvalidId(format!(
                "{invite_id} was already {}",
                invite.status.as_str()
            )));
        }
        Ok(invite.clone())
    }
}

impl MemoryLedger {
    /// Asks to join the group whose invite code is `code`.
    pub fn request_join(&self, code: &str, requester: Member) -> ResultEngine<GroupInvite> {
        let code = normalize_invite_code(code)?;
        let requester_name = normalize_required_name(&requester.name, "member name")?;

        let mut state = self.write();
        let group = state
            .groups
            .iter()
            .find(|group| group.invite_code == code)
            .ok_or_else(|| EngineError::KeyNotFound(format!("invite code {code}")))?;

        if group.is_member(&requester.id) {
            return Err(EngineError::ExistingKey(format!(
                "{} in {}",
                requester.id, group.id
            )));
        }

        let mut id = format!("{}_{}", group.id, requester.id);
        if let Some(previous) = state.invites.iter().find(|invite| invite.id == id) {
            if previous.is_pending() {
                return Err(EngineError::ExistingKey(id));
            }
            id = format!("{id}_{}", Utc::now().timestamp_millis());
        }

        let invite = GroupInvite {
            id,
            group_id: group.id.clone(),
            group_name: group.name.clone(),
            admin_id: group.admin_id.clone(),
            requester_id: requester.id,
            requester_name,
            status: InviteStatus::Pending,
            created_at: Utc::now(),
        };
        state.invites.push(invite.clone());
        debug!(invite_id = %invite.id, group_id = %invite.group_id, "join requested");
        Ok(invite)
    }

    /// Pending join requests for the groups `admin_id` administers.
    pub fn pending_invites(&self, admin_id: &str) -> Vec<GroupInvite> {
        self.read()
            .invites
            .iter()
            .filter(|invite| invite.admin_id == admin_id && invite.is_pending())
            .cloned()
            .collect()
    }

    /// Accepts the request and adds the requester to the group.
    pub fn accept_invite(&self, invite_id: &str, admin_id: &str) -> ResultEngine<Group> {
        let invite = self.read().answerable_invite(invite_id, admin_id)?;

        self.with_state_mut(&invite.group_id, |state| {
            // re-checked under the write lock
            let invite = state.answerable_invite(invite_id, admin_id)?;
            let group = state.group_mut(&invite.group_id)?;
            if !group.is_member(&invite.requester_id) {
                group
                    .members
                    .push(Member::new(invite.requester_id, invite.requester_name));
            }
            let group = group.clone();
            state.invite_mut(invite_id)?.status = InviteStatus::Accepted;
            debug!(invite_id, group_id = %group.id, "invite accepted");
            Ok(group)
        })
    }

    pub fn reject_invite(&self, invite_id: &str, admin_id: &str) -> ResultEngine<GroupInvite> {
        let mut state = self.write();
        state.answerable_invite(invite_id, admin_id)?;
        let invite = state.invite_mut(invite_id)?;
        invite.status = InviteStatus::Rejected;
        debug!(invite_id, "invite rejected");
        Ok(invite.clone())
    }
}
