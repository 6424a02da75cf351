//! In-memory ledger store.
//!
//! [`MemoryLedger`] owns every group and join request, and pushes a fresh
//! copy of a group to its subscribers after each change. Callers that need
//! persistence take a [`LedgerSnapshot`] and write it wherever they like.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use serde::{Deserialize, Serialize};

use crate::{EngineError, Group, GroupInvite, ResultEngine};

mod access;
mod expenses;
mod groups;
mod invites;
mod memberships;
mod subscriptions;

/// Callback receiving the new state of a group.
///
/// Deliveries to one subscriber are serialized and never go back in time: a
/// state older than one already delivered is skipped. Callbacks may read the
/// ledger but must not mutate it.
pub type GroupCallback = Box<dyn Fn(&Group) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Read side of a ledger, plus change notifications.
pub trait GroupRepository {
    fn group(&self, group_id: &str) -> ResultEngine<Group>;

    /// Groups listing `member_id` among their members.
    fn groups_for_member(&self, member_id: &str) -> Vec<Group>;

    /// Registers `callback` for `group_id`. It runs once right away with the
    /// current state, then after every mutation of the group.
    fn subscribe(&self, group_id: &str, callback: GroupCallback) -> ResultEngine<SubscriptionId>;

    /// Returns `false` when the subscription was already gone.
    fn unsubscribe(&self, subscription: SubscriptionId) -> bool;
}

/// Everything the store holds, in a serializable form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub invites: Vec<GroupInvite>,
}

#[derive(Debug, Default)]
struct LedgerState {
    groups: Vec<Group>,
    invites: Vec<GroupInvite>,
    /// Bumped by every successful notifying mutation.
    revision: u64,
}

struct Subscriber {
    id: SubscriptionId,
    group_id: String,
    delivery: Arc<Delivery>,
}

/// A callback plus the revision it last received.
struct Delivery {
    callback: Box<dyn Fn(&Group) + Send + Sync>,
    delivered: Mutex<Option<u64>>,
}

impl Delivery {
    fn new(callback: GroupCallback) -> Self {
        Self {
            callback,
            delivered: Mutex::new(None),
        }
    }

    /// Runs the callback unless a newer revision already went out.
    fn deliver(&self, revision: u64, group: &Group) {
        let mut delivered = self.delivered.lock().unwrap_or_else(PoisonError::into_inner);
        if delivered.is_some_and(|last| last >= revision) {
            return;
        }
        (self.callback)(group);
        *delivered = Some(revision);
    }
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<Subscriber>,
}

#[derive(Default)]
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
    subscribers: Mutex<Subscribers>,
}

impl std::fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("MemoryLedger")
            .field("groups", &state.groups.len())
            .field("invites", &state.invites.len())
            .finish()
    }
}

impl MemoryLedger {
    /// Return a builder for `MemoryLedger`. Help to build the struct.
    pub fn builder() -> MemoryLedgerBuilder {
        MemoryLedgerBuilder::default()
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> ResultEngine<Self> {
        Self::builder().snapshot(snapshot).build()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.read();
        LedgerSnapshot {
            groups: state.groups.clone(),
            invites: state.invites.clone(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `mutate` under the write lock, then hands the resulting state of
    /// `group_id` to its subscribers. Nothing is notified on error.
    fn with_state_mut<T>(
        &self,
        group_id: &str,
        mutate: impl FnOnce(&mut LedgerState) -> ResultEngine<T>,
    ) -> ResultEngine<T> {
        let (value, revision, changed) = {
            let mut state = self.write();
            let value = mutate(&mut state)?;
            state.revision += 1;
            (value, state.revision, state.group(group_id).cloned())
        };
        if let Some(group) = changed {
            self.notify(revision, &group);
        }
        Ok(value)
    }

    fn with_group_mut<T>(
        &self,
        group_id: &str,
        mutate: impl FnOnce(&mut Group) -> ResultEngine<T>,
    ) -> ResultEngine<T> {
        self.with_state_mut(group_id, |state| mutate(state.group_mut(group_id)?))
    }

    /// Callbacks run without the state lock held.
    fn notify(&self, revision: u64, group: &Group) {
        let deliveries: Vec<_> = self
            .subscribers()
            .entries
            .iter()
            .filter(|subscriber| subscriber.group_id == group.id)
            .map(|subscriber| Arc::clone(&subscriber.delivery))
            .collect();
        for delivery in deliveries {
            delivery.deliver(revision, group);
        }
    }
}

impl LedgerState {
    fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == group_id)
    }

    fn group_mut(&mut self, group_id: &str) -> ResultEngine<&mut Group> {
        self.groups
            .iter_mut()
            .find(|group| group.id == group_id)
            .ok_or_else(|| EngineError::KeyNotFound(group_id.to_string()))
    }
}

/// The builder for `MemoryLedger`
#[derive(Default)]
pub struct MemoryLedgerBuilder {
    groups: Vec<Group>,
    invites: Vec<GroupInvite>,
}

impl MemoryLedgerBuilder {
    /// Start from previously saved state
    pub fn snapshot(mut self, snapshot: LedgerSnapshot) -> MemoryLedgerBuilder {
        self.groups = snapshot.groups;
        self.invites = snapshot.invites;
        self
    }

    pub fn group(mut self, group: Group) -> MemoryLedgerBuilder {
        self.groups.push(group);
        self
    }

    /// Construct `MemoryLedger`, rejecting duplicated group ids or invite codes
    pub fn build(self) -> ResultEngine<MemoryLedger> {
        let mut ids = HashSet::new();
        let mut codes = HashSet::new();
        for group in &self.groups {
            if !ids.insert(group.id.as_str()) {
                return Err(EngineError::ExistingKey(group.id.clone()));
            }
            if !codes.insert(group.invite_code.as_str()) {
                return Err(EngineError::ExistingKey(group.invite_code.clone()));
            }
        }

        Ok(MemoryLedger {
            state: RwLock::new(LedgerState {
                groups: self.groups,
                invites: self.invites,
                revision: 0,
            }),
            subscribers: Mutex::default(),
        })
    }
}
