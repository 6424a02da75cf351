//! Spending statistics of one member across their groups.
//!
//! A member's spending on an expense is their even share of it. Payments are
//! transfers, not spending, and are left out. Amounts are never converted
//! between currencies.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{Currency, Expense, Group, Money, calculate_balances};

/// Spending of one calendar month (UTC).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySpending {
    pub year: i32,
    /// 1 to 12.
    pub month: u32,
    pub by_currency: BTreeMap<Currency, Money>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpending {
    pub group_id: String,
    pub group_name: String,
    pub currency: Currency,
    pub amount: Money,
}

/// `member_id`'s share of `expense` in major units.
///
/// `None` when they are not a participant, which also covers expenses without
/// participants.
fn member_share(expense: &Expense, member_id: &str) -> Option<f64> {
    if expense.is_payment() || !expense.participant_ids.iter().any(|id| id == member_id) {
        return None;
    }
    Some(expense.amount.to_major() / expense.participant_ids.len() as f64)
}

fn month_index(date: DateTime<Utc>) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn member_groups<'a>(groups: &'a [Group], member_id: &'a str) -> impl Iterator<Item = &'a Group> {
    groups.iter().filter(move |group| group.is_member(member_id))
}

/// Net balance of `member_id` summed over their groups, per currency.
///
/// Currencies netting to zero are dropped.
pub fn global_net(groups: &[Group], member_id: &str) -> BTreeMap<Currency, Money> {
    let mut totals = BTreeMap::new();
    for group in member_groups(groups, member_id) {
        if let Some(balance) = calculate_balances(group)
            .into_iter()
            .find(|balance| balance.member_id == member_id)
        {
            *totals.entry(group.currency).or_insert(Money::ZERO) += balance.net;
        }
    }
    totals.retain(|_, net| !net.is_zero());
    totals
}

/// Spending of `member_id` in each of the last `months` calendar months,
/// oldest first and ending with the month of `now`.
///
/// Every month is listed, spending or not.
pub fn monthly_spending(
    groups: &[Group],
    member_id: &str,
    now: DateTime<Utc>,
    months: u32,
) -> Vec<MonthlySpending> {
    let last = month_index(now);
    let first = last - i64::from(months) + 1;
    let mut buckets: Vec<BTreeMap<Currency, f64>> = vec![BTreeMap::new(); months as usize];

    for group in member_groups(groups, member_id) {
        for expense in &group.expenses {
            let index = month_index(expense.created_at);
            if !(first..=last).contains(&index) {
                continue;
            }
            if let Some(share) = member_share(expense, member_id) {
                *buckets[(index - first) as usize]
                    .entry(group.currency)
                    .or_insert(0.0) += share;
            }
        }
    }

    buckets
        .into_iter()
        .zip(first..)
        .map(|(totals, index)| MonthlySpending {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
            by_currency: totals
                .into_iter()
                .map(|(currency, total)| (currency, Money::from_major(total)))
                .collect(),
        })
        .collect()
}

/// Spending of `member_id` per group, in group order; groups where they spent
/// nothing are left out.
pub fn spending_by_group(groups: &[Group], member_id: &str) -> Vec<GroupSpending> {
    member_groups(groups, member_id)
        .map(|group| {
            let total: f64 = group
                .expenses
                .iter()
                .filter_map(|expense| member_share(expense, member_id))
                .sum();
            GroupSpending {
                group_id: group.id.clone(),
                group_name: group.name.clone(),
                currency: group.currency,
                amount: Money::from_major(total),
            }
        })
        .filter(|spending| spending.amount.is_positive())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{ExpenseKind, Member};

    fn expense(
        amount: i64,
        paid_by: &str,
        participants: &[&str],
        (year, month, day): (i32, u32, u32),
    ) -> Expense {
        Expense {
            id: format!("{paid_by}-{year}-{month}-{day}"),
            title: "Stuff".to_string(),
            amount: Money::new(amount),
            paid_by_id: paid_by.to_string(),
            participant_ids: participants.iter().map(|p| p.to_string()).collect(),
            kind: ExpenseKind::Expense,
            created_at: Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap(),
            items: Vec::new(),
            receipt_id: None,
            receipt_url: None,
        }
    }

    fn group(id: &str, currency: Currency, members: &[&str], expenses: Vec<Expense>) -> Group {
        Group {
            id: id.to_string(),
            name: id.to_string(),
            currency,
            members: members.iter().map(|id| Member::new(*id, *id)).collect(),
            expenses,
            admin_id: members[0].to_string(),
            invite_code: id.to_uppercase(),
        }
    }

    fn groups() -> Vec<Group> {
        let mut payback = expense(10_00, "bea", &["ana"], (2024, 3, 12));
        payback.kind = ExpenseKind::Payment;
        vec![
            group(
                "flat",
                Currency::Eur,
                &["ana", "bea"],
                vec![
                    expense(100_00, "ana", &["ana", "bea"], (2024, 3, 10)),
                    expense(30_00, "bea", &["bea"], (2024, 2, 5)),
                    payback,
                    expense(60_00, "bea", &["ana", "bea"], (2023, 8, 1)),
                ],
            ),
            group(
                "trip",
                Currency::Usd,
                &["carl", "ana"],
                vec![
                    expense(10_00, "carl", &["ana", "carl", "dan"], (2024, 1, 15)),
                    expense(40_00, "ana", &[], (2023, 12, 1)),
                ],
            ),
            group(
                "attic",
                Currency::Eur,
                &["bea"],
                vec![expense(50_00, "bea", &["bea", "ana"], (2024, 3, 1))],
            ),
        ]
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 9, 0, 0).unwrap()
    }

    #[test]
    fn global_net_adds_up_balances_per_currency() {
        let net = global_net(&groups(), "ana");
        assert_eq!(
            net,
            BTreeMap::from([
                (Currency::Usd, Money::new(36_67)),
                (Currency::Eur, Money::new(10_00)),
            ])
        );
        assert!(global_net(&groups(), "nobody").is_empty());
    }

    #[test]
    fn global_net_drops_settled_currencies() {
        let groups = vec![group(
            "flat",
            Currency::Eur,
            &["ana", "bea"],
            vec![
                expense(20_00, "ana", &["bea"], (2024, 3, 1)),
                expense(20_00, "bea", &["ana"], (2024, 3, 2)),
            ],
        )];
        assert!(global_net(&groups, "ana").is_empty());
    }

    #[test]
    fn monthly_spending_covers_every_month_up_to_now() {
        let months = monthly_spending(&groups(), "ana", now(), 6);

        let labels: Vec<_> = months.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(
            labels,
            vec![(2023, 10), (2023, 11), (2023, 12), (2024, 1), (2024, 2), (2024, 3)]
        );
        assert!(months[..3].iter().all(|m| m.by_currency.is_empty()));
        assert_eq!(
            months[3].by_currency,
            BTreeMap::from([(Currency::Usd, Money::new(3_33))])
        );
        assert!(months[4].by_currency.is_empty());
        // the payment received the same month is not spending
        assert_eq!(
            months[5].by_currency,
            BTreeMap::from([(Currency::Eur, Money::new(50_00))])
        );
    }

    #[test]
    fn monthly_spending_of_zero_months_is_empty() {
        assert!(monthly_spending(&groups(), "ana", now(), 0).is_empty());
        assert_eq!(monthly_spending(&[], "ana", now(), 2).len(), 2);
    }

    #[test]
    fn spending_by_group_skips_groups_without_spending() {
        let spending = spending_by_group(&groups(), "ana");
        let summary: Vec<_> = spending
            .iter()
            .map(|s| (s.group_id.as_str(), s.currency, s.amount))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("flat", Currency::Eur, Money::new(80_00)),
                ("trip", Currency::Usd, Money::new(3_33)),
            ]
        );
        assert!(spending_by_group(&groups(), "carl")[0].amount.is_positive());
    }
}
