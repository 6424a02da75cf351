//! Greedy settlement plan.
//!
//! Debtors and creditors are matched with two cursors in the order the
//! balances come in, without sorting by magnitude. The plan always settles
//! every debt of a zero-sum input but may use more transfers than the
//! theoretical minimum.

use serde::{Deserialize, Serialize};

use crate::{MemberBalance, Money};

/// A recommended transfer from a net debtor to a net creditor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from_id: String,
    pub to_id: String,
    pub amount: Money,
}

/// Outstanding amount of one side of the matching (always stored positive).
struct Position<'a> {
    member_id: &'a str,
    remaining: Money,
}

/// Builds the settlement plan for `balances`.
///
/// Zero balances are skipped. Every emitted settlement has a positive amount
/// and distinct endpoints. If the input does not sum to zero, the leftover
/// side is simply left unmatched.
pub fn calculate_settlements(balances: &[MemberBalance]) -> Vec<Settlement> {
    let mut creditors: Vec<Position<'_>> = balances
        .iter()
        .filter(|balance| balance.is_creditor())
        .map(|balance| Position {
            member_id: &balance.member_id,
            remaining: balance.net,
        })
        .collect();
    let mut debtors: Vec<Position<'_>> = balances
        .iter()
        .filter(|balance| balance.is_debtor())
        .map(|balance| Position {
            member_id: &balance.member_id,
            remaining: balance.net.abs(),
        })
        .collect();

    let mut settlements = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];
        let amount = debtor.remaining.min(creditor.remaining);

        if amount.is_positive() {
            settlements.push(Settlement {
                from_id: debtor.member_id.to_string(),
                to_id: creditor.member_id.to_string(),
                amount,
            });
            debtor.remaining -= amount;
            creditor.remaining -= amount;
        }

        if !debtor.remaining.is_positive() {
            i += 1;
        }
        if !creditor.remaining.is_positive() {
            j += 1;
        }
    }

    settlements
}
