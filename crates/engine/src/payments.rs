//! Cross-group view of what one member has to pay and to receive.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Currency, Group, Money, calculate_balances, calculate_settlements};

/// Name shown for a counterparty id with no declared member behind it.
pub const UNKNOWN_MEMBER_NAME: &str = "Roomie";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    Pay,
    Receive,
}

/// One pending settlement involving the member, seen from their side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentItem {
    pub id: String,
    pub direction: PaymentDirection,
    pub amount: Money,
    pub currency: Currency,
    pub counterparty_id: String,
    pub counterparty: String,
    pub group_id: String,
    pub group_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentsOverview {
    pub to_pay: Vec<PaymentItem>,
    pub to_receive: Vec<PaymentItem>,
    pub pay_by_currency: BTreeMap<Currency, Money>,
    pub receive_by_currency: BTreeMap<Currency, Money>,
    /// `receive - pay` per currency; currencies that net to zero are dropped.
    pub net_by_currency: BTreeMap<Currency, Money>,
}

impl PaymentsOverview {
    pub fn is_empty(&self) -> bool {
        self.to_pay.is_empty() && self.to_receive.is_empty()
    }
}

fn sum_by_currency(items: &[PaymentItem]) -> BTreeMap<Currency, Money> {
    let mut totals = BTreeMap::new();
    for item in items {
        *totals.entry(item.currency).or_insert(Money::ZERO) += item.amount;
    }
    totals
}

/// Collects the settlements `member_id` takes part in across `groups`.
///
/// Groups the member does not belong to are skipped. Both lists are sorted
/// by amount, largest first; ties keep group then plan order.
pub fn payments_overview(groups: &[Group], member_id: &str) -> PaymentsOverview {
    let mut to_pay = Vec::new();
    let mut to_receive = Vec::new();

    for group in groups.iter().filter(|group| group.is_member(member_id)) {
        let balances = calculate_balances(group);
        let settlements = calculate_settlements(&balances);

        for (index, settlement) in settlements.iter().enumerate() {
            let (direction, counterparty_id) = if settlement.from_id == member_id {
                (PaymentDirection::Pay, &settlement.to_id)
            } else if settlement.to_id == member_id {
                (PaymentDirection::Receive, &settlement.from_id)
            } else {
                continue;
            };

            let item = PaymentItem {
                id: format!(
                    "{}-{index}-{}-{}",
                    group.id, settlement.from_id, settlement.to_id
                ),
                direction,
                amount: settlement.amount,
                currency: group.currency,
                counterparty_id: counterparty_id.clone(),
                counterparty: group
                    .member_name(counterparty_id)
                    .unwrap_or(UNKNOWN_MEMBER_NAME)
                    .to_string(),
                group_id: group.id.clone(),
                group_name: group.name.clone(),
            };

            match direction {
                PaymentDirection::Pay => to_pay.push(item),
                PaymentDirection::Receive => to_receive.push(item),
            }
        }
    }

    to_pay.sort_by(|a, b| b.amount.cmp(&a.amount));
    to_receive.sort_by(|a, b| b.amount.cmp(&a.amount));

    let pay_by_currency = sum_by_currency(&to_pay);
    let receive_by_currency = sum_by_currency(&to_receive);

    let mut net_by_currency = receive_by_currency.clone();
    for (currency, amount) in &pay_by_currency {
        *net_by_currency.entry(*currency).or_insert(Money::ZERO) -= *amount;
    }
    net_by_currency.retain(|_, amount| !amount.is_zero());

    PaymentsOverview {
        to_pay,
        to_receive,
        pay_by_currency,
        receive_by_currency,
        net_by_currency,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{Expense, ExpenseKind, Member};

    fn expense(id: &str, amount: i64, paid_by: &str, participants: &[&str]) -> Expense {
        Expense {
            id: id.to_string(),
            title: id.to_string(),
            amount: Money::new(amount),
            paid_by_id: paid_by.to_string(),
            participant_ids: participants.iter().map(|p| p.to_string()).collect(),
            kind: ExpenseKind::Expense,
            created_at: Utc::now(),
            items: Vec::new(),
            receipt_id: None,
            receipt_url: None,
        }
    }

    fn group(
        id: &str,
        currency: Currency,
        members: &[(&str, &str)],
        expenses: Vec<Expense>,
    ) -> Group {
        Group {
            id: id.to_string(),
            name: format!("Group {id}"),
            currency,
            members: members
                .iter()
                .map(|(id, name)| Member::new(*id, *name))
                .collect(),
            expenses,
            admin_id: members[0].0.to_string(),
            invite_code: "CODE".to_string(),
        }
    }

    #[test]
    fn splits_pay_and_receive_per_currency() {
        let groups = vec![
            // ana owes bea 50 USD
            group(
                "flat",
                Currency::Usd,
                &[("ana", "Ana"), ("bea", "Bea")],
                vec![expense("rent", 100_00, "bea", &["ana", "bea"])],
            ),
            // ana is owed 30 EUR by both carl and bea
            group(
                "trip",
                Currency::Eur,
                &[("ana", "Ana"), ("bea", "Bea"), ("carl", "Carl")],
                vec![expense("hotel", 90_00, "ana", &["ana", "bea", "carl"])],
            ),
        ];

        let overview = payments_overview(&groups, "ana");

        assert_eq!(overview.to_pay.len(), 1);
        let pay = &overview.to_pay[0];
        assert_eq!(pay.direction, PaymentDirection::Pay);
        assert_eq!(pay.counterparty, "Bea");
        assert_eq!(pay.amount, Money::new(50_00));
        assert_eq!(pay.id, "flat-0-ana-bea");

        assert_eq!(overview.to_receive.len(), 2);
        assert!(
            overview
                .to_receive
                .iter()
                .all(|item| item.currency == Currency::Eur && item.amount == Money::new(30_00))
        );

        assert_eq!(overview.pay_by_currency[&Currency::Usd], Money::new(50_00));
        assert_eq!(overview.receive_by_currency[&Currency::Eur], Money::new(60_00));
        assert_eq!(overview.net_by_currency[&Currency::Usd], Money::new(-50_00));
        assert_eq!(overview.net_by_currency[&Currency::Eur], Money::new(60_00));
    }

    #[test]
    fn skips_groups_without_the_member() {
        let groups = vec![group(
            "other",
            Currency::Usd,
            &[("bea", "Bea"), ("carl", "Carl")],
            vec![expense("food", 20_00, "bea", &["bea", "carl"])],
        )];

        assert!(payments_overview(&groups, "ana").is_empty());
    }

    #[test]
    fn net_drops_currencies_that_cancel_out() {
        let groups = vec![
            group(
                "one",
                Currency::Usd,
                &[("ana", "Ana"), ("bea", "Bea")],
                vec![expense("a", 20_00, "bea", &["ana", "bea"])],
            ),
            group(
                "two",
                Currency::Usd,
                &[("ana", "Ana"), ("carl", "Carl")],
                vec![expense("b", 20_00, "ana", &["ana", "carl"])],
            ),
        ];

        let overview = payments_overview(&groups, "ana");
        assert_eq!(overview.pay_by_currency[&Currency::Usd], Money::new(10_00));
        assert_eq!(overview.receive_by_currency[&Currency::Usd], Money::new(10_00));
        assert!(overview.net_by_currency.is_empty());
    }

    #[test]
    fn departed_members_are_left_out_of_the_plan() {
        let mut flat = group(
            "flat",
            Currency::Usd,
            &[("ana", "Ana"), ("bea", "Bea")],
            vec![expense("rent", 100_00, "ana", &["ana", "bea"])],
        );
        flat.members.retain(|member| member.id != "bea");
        flat.members.push(Member::new("dan", "Dan"));
        flat.expenses.push(expense("gas", 40_00, "dan", &["ana", "dan"]));

        // declared: ana +30, dan +20; bea's -50 is hidden from the plan
        let overview = payments_overview(&[flat], "ana");
        assert!(overview.to_pay.is_empty());
        assert!(overview.to_receive.is_empty());
    }

    #[test]
    fn lists_are_sorted_by_amount_descending() {
        let groups = vec![group(
            "flat",
            Currency::Usd,
            &[("ana", "Ana"), ("bea", "Bea"), ("carl", "Carl")],
            vec![
                expense("a", 10_00, "ana", &["bea"]),
                expense("b", 40_00, "ana", &["carl"]),
            ],
        )];

        let overview = payments_overview(&groups, "ana");
        let amounts: Vec<_> = overview.to_receive.iter().map(|item| item.amount).collect();
        assert_eq!(amounts, vec![Money::new(40_00), Money::new(10_00)]);
        assert_eq!(overview.to_receive[0].counterparty, "Carl");
    }
}
