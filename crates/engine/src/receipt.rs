//! Receipt splitting.
//!
//! A receipt is a list of priced items, each assigned to some of the group
//! members. Every item is shared evenly by its members, optionally with tax
//! on top, and each member ends up with one charge that can be logged as an
//! expense paid by whoever paid the ticket.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ExpenseItem, ExpenseKind, Member, Money, NewExpense, ResultEngine,
    money::round2,
    payments::UNKNOWN_MEMBER_NAME,
    util::{new_id, normalize_required_name},
};

/// Tax rate applied to taxable receipt items unless configured otherwise.
pub const DEFAULT_TAX_RATE: f64 = 0.15;

fn default_taxable() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub id: String,
    pub name: String,
    pub amount: Money,
    #[serde(default = "default_taxable")]
    pub taxable: bool,
    /// Member ids sharing the item; empty means every member.
    #[serde(default)]
    pub assigned: Vec<String>,
}

/// What one member owes for a receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberShare {
    pub member_id: String,
    pub name: String,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub items: Vec<ExpenseItem>,
}

#[derive(Default)]
struct Running {
    subtotal: f64,
    tax: f64,
    items: Vec<ExpenseItem>,
}

/// Splits `items` among `members`; one share per member, in member order.
///
/// Assignments naming ids that are not in `members` are ignored; an item
/// left without anybody is shared by everyone. Subtotal and tax are rounded
/// per member, and the total is the sum of the rounded parts.
pub fn split_receipt(
    members: &[Member],
    items: &[ReceiptItem],
    tax_rate: f64,
) -> ResultEngine<Vec<MemberShare>> {
    if items.is_empty() {
        return Err(EngineError::InvalidAmount("receipt has no items".to_string()));
    }
    if members.is_empty() {
        return Err(EngineError::KeyNotFound("receipt members".to_string()));
    }
    if !tax_rate.is_finite() || tax_rate < 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "invalid tax rate: {tax_rate}"
        )));
    }

    let mut position: HashMap<&str, usize> = HashMap::new();
    for (index, member) in members.iter().enumerate() {
        position.entry(member.id.as_str()).or_insert(index);
    }
    let mut running: Vec<Running> = members.iter().map(|_| Running::default()).collect();

    for item in items {
        let mut selected: Vec<usize> = Vec::new();
        for member_id in &item.assigned {
            if let Some(&index) = position.get(member_id.as_str())
                && !selected.contains(&index)
            {
                selected.push(index);
            }
        }
        if selected.is_empty() {
            selected = position.values().copied().collect();
            selected.sort_unstable();
        }

        let share = item.amount.to_major() / selected.len() as f64;
        let tax_share = if item.taxable { share * tax_rate } else { 0.0 };

        for &index in &selected {
            let shared_with = selected
                .iter()
                .filter(|&&other| other != index)
                .map(|&other| members.get(other).map_or(UNKNOWN_MEMBER_NAME, |m| m.name.as_str()))
                .map(ToString::to_string)
                .collect();

            let entry = &mut running[index];
            entry.subtotal += share;
            entry.tax += tax_share;
            entry.items.push(ExpenseItem {
                name: item.name.clone(),
                price: Money::from_major(share),
                tax: Money::from_major(tax_share),
                total: Money::from_major(share + tax_share),
                original_price: item.amount,
                with_tax: item.taxable,
                shared_with,
            });
        }
    }

    // a repeated member id keeps only its first slot
    Ok(members
        .iter()
        .zip(running)
        .enumerate()
        .filter(|(index, (member, _))| position.get(member.id.as_str()) == Some(index))
        .map(|(_, (member, entry))| {
            let subtotal = round2(entry.subtotal);
            let tax = round2(entry.tax);
            MemberShare {
                member_id: member.id.clone(),
                name: member.name.clone(),
                subtotal: Money::from_major(subtotal),
                tax: Money::from_major(tax),
                total: Money::from_major(subtotal + tax),
                items: entry.items,
            }
        })
        .collect())
}

/// Turns receipt shares into one expense per member with something to pay.
///
/// Each expense is titled `"{concept} ({member})"`, paid by `payer_id` and
/// charged to that member alone; all of them carry the same receipt id.
pub fn receipt_expenses(
    shares: &[MemberShare],
    payer_id: &str,
    concept: &str,
) -> ResultEngine<Vec<NewExpense>> {
    let concept = normalize_required_name(concept, "receipt concept")?;
    let receipt_id = new_id();

    Ok(shares
        .iter()
        .filter(|share| share.total.is_positive())
        .map(|share| NewExpense {
            title: format!("{concept} ({})", share.name),
            amount: share.total,
            paid_by_id: payer_id.to_string(),
            participant_ids: vec![share.member_id.clone()],
            kind: ExpenseKind::Expense,
            items: share.items.clone(),
            receipt_id: Some(receipt_id.clone()),
            receipt_url: None,
        })
        .collect())
}
