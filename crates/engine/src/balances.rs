//! Net balance per member.
//!
//! Every expense credits its payer with the full amount and debits each
//! participant `amount / participants`, so the balances of a group sum to
//! zero (up to one cent of rounding per member).
//!
//! Running totals are kept in `f64` major units and rounded once per member
//! with [`round2`](crate::round2); the result is then exact [`Money`].
//!
//! Two edge cases are accepted without complaint:
//! - an empty participant list credits the payer and debits nobody, which
//!   breaks the zero-sum property for that group;
//! - ids that are not declared members (e.g. a member who left) still get a
//!   running total. [`calculate_balances`] hides them,
//!   [`calculate_ledger_balances`] reports them after the members.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Expense, Group, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member_id: String,
    /// Positive: the member is owed money. Negative: the member owes money.
    pub net: Money,
}

impl MemberBalance {
    pub fn new(member_id: impl Into<String>, net: Money) -> Self {
        Self {
            member_id: member_id.into(),
            net,
        }
    }

    pub fn is_creditor(&self) -> bool {
        self.net.is_positive()
    }

    pub fn is_debtor(&self) -> bool {
        self.net.is_negative()
    }
}

/// Running totals keyed by member id, iterated in insertion order.
#[derive(Debug, Default)]
struct Totals {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl Totals {
    fn add(&mut self, member_id: &str, delta: f64) {
        match self.index.get(member_id) {
            Some(&position) => self.entries[position].1 += delta,
            None => {
                self.index.insert(member_id.to_string(), self.entries.len());
                self.entries.push((member_id.to_string(), delta));
            }
        }
    }

    fn apply(&mut self, expense: &Expense) {
        let amount = expense.amount.to_major();
        let count = expense.participant_ids.len().max(1);
        let share = amount / count as f64;

        for participant_id in &expense.participant_ids {
            self.add(participant_id, -share);
        }
        self.add(&expense.paid_by_id, amount);
    }

    fn into_balances(self) -> impl Iterator<Item = MemberBalance> {
        self.entries
            .into_iter()
            .map(|(member_id, total)| MemberBalance {
                member_id,
                net: Money::from_major(total),
            })
    }
}

/// Folds the ledger and returns the totals plus how many leading entries
/// belong to declared members.
fn fold_ledger(group: &Group) -> (Totals, usize) {
    let mut totals = Totals::default();
    for member in &group.members {
        totals.add(&member.id, 0.0);
    }
    let declared = totals.entries.len();

    for expense in &group.expenses {
        totals.apply(expense);
    }

    (totals, declared)
}

/// One balance per declared member, in member order.
pub fn calculate_balances(group: &Group) -> Vec<MemberBalance> {
    let (totals, declared) = fold_ledger(group);
    totals.into_balances().take(declared).collect()
}

/// Every id the ledger touches: declared members first (in member order),
/// then unknown ids in the order the expenses first mention them.
pub fn calculate_ledger_balances(group: &Group) -> Vec<MemberBalance> {
    let (totals, _) = fold_ledger(group);
    totals.into_balances().collect()
}

/// Sum of all nets; zero for a consistent ledger, within a cent per member.
pub fn net_total(balances: &[MemberBalance]) -> Money {
    balances.iter().map(|balance| balance.net).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_keep_insertion_order() {
        let mut totals = Totals::default();
        totals.add("b", 1.0);
        totals.add("a", 2.0);
        totals.add("b", 0.5);
        let ids: Vec<_> = totals
            .into_balances()
            .map(|balance| (balance.member_id, balance.net))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("b".to_string(), Money::new(150)),
                ("a".to_string(), Money::new(200)),
            ]
        );
    }

    #[test]
    fn net_total_sums_signed_values() {
        let balances = vec![
            MemberBalance::new("a", Money::new(6667)),
            MemberBalance::new("b", Money::new(-3333)),
            MemberBalance::new("c", Money::new(-3333)),
        ];
        assert_eq!(net_total(&balances), Money::new(1));
    }
}
