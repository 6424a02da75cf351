//! Groups and their members.
//!
//! A [`Group`] is the authoritative ledger record: the declared members plus
//! every [`Expense`] logged so far. Balances and settlements are never
//! stored on it; they are recomputed from the ledger on demand.

use serde::{Deserialize, Serialize};

use crate::{Currency, Expense};

/// A person taking part in a group. Identity is the `id`; names may collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
}

impl Member {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub currency: Currency,
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    pub admin_id: String,
    pub invite_code: String,
}

impl Group {
    /// Looks up a declared member by id.
    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.id == member_id)
    }

    pub fn is_member(&self, member_id: &str) -> bool {
        self.member(member_id).is_some()
    }

    /// Display name for `member_id`, if it is a declared member.
    pub fn member_name(&self, member_id: &str) -> Option<&str> {
        self.member(member_id).map(|member| member.name.as_str())
    }

    pub fn expense(&self, expense_id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == expense_id)
    }

    pub fn is_admin(&self, member_id: &str) -> bool {
        self.admin_id == member_id
    }
}
