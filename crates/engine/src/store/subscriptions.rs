use std::sync::Arc;

use tracing::debug;

use crate::{EngineError, Group, ResultEngine};

use super::{Delivery, GroupCallback, GroupRepository, MemoryLedger, Subscriber, SubscriptionId};

impl GroupRepository for MemoryLedger {
    fn group(&self, group_id: &str) -> ResultEngine<Group> {
        self.read()
            .group(group_id)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound(group_id.to_string()))
    }

    fn groups_for_member(&self, member_id: &str) -> Vec<Group> {
        self.read()
            .groups
            .iter()
            .filter(|group| group.is_member(member_id))
            .cloned()
            .collect()
    }

    fn subscribe(&self, group_id: &str, callback: GroupCallback) -> ResultEngine<SubscriptionId> {
        let delivery = Arc::new(Delivery::new(callback));

        // Registering under the read lock means any later mutation notifies
        // this subscriber with a revision above `revision`.
        let (id, revision, current) = {
            let state = self.read();
            let current = state
                .group(group_id)
                .cloned()
                .ok_or_else(|| EngineError::KeyNotFound(group_id.to_string()))?;
            let mut subscribers = self.subscribers();
            subscribers.next_id += 1;
            let id = SubscriptionId(subscribers.next_id);
            subscribers.entries.push(Subscriber {
                id,
                group_id: group_id.to_string(),
                delivery: Arc::clone(&delivery),
            });
            (id, state.revision, current)
        };
        debug!(group_id, subscription = id.0, "subscribed");

        delivery.deliver(revision, &current);
        Ok(id)
    }

    fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers();
        let before = subscribers.entries.len();
        subscribers
            .entries
            .retain(|subscriber| subscriber.id != subscription);
        before != subscribers.entries.len()
    }
}
