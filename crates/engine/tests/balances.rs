use chrono::Utc;
use proptest::prelude::*;

use engine::{
    Currency, Expense, ExpenseKind, Group, Member, MemberBalance, Money, calculate_balances,
    calculate_ledger_balances, net_total, round2,
};

fn expense(amount: i64, paid_by: &str, participants: &[&str]) -> Expense {
    Expense {
        id: format!("{paid_by}-{amount}"),
        title: "expense".to_string(),
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

fn group(members: &[&str], expenses: Vec<Expense>) -> Group {
    Group {
        id: "g".to_string(),
        name: "Flat".to_string(),
        currency: Currency::Usd,
        members: members.iter().map(|id| Member::new(*id, id.to_uppercase())).collect(),
        expenses,
        admin_id: members.first().map(|id| id.to_string()).unwrap_or_default(),
        invite_code: "CODE".to_string(),
    }
}

fn nets(balances: &[MemberBalance]) -> Vec<(&str, i64)> {
    balances
        .iter()
        .map(|balance| (balance.member_id.as_str(), balance.net.minor()))
        .collect()
}

#[test]
fn two_members_one_expense() {
    let group = group(&["a", "b"], vec![expense(100_00, "a", &["a", "b"])]);
    let balances = calculate_balances(&group);
    assert_eq!(nets(&balances), vec![("a", 50_00), ("b", -50_00)]);
}

#[test]
fn three_way_split_credits_the_payer() {
    let group = group(&["a", "b", "c"], vec![expense(90_00, "a", &["a", "b", "c"])]);
    let balances = calculate_balances(&group);
    assert_eq!(nets(&balances), vec![("a", 60_00), ("b", -30_00), ("c", -30_00)]);
    assert_eq!(net_total(&balances), Money::ZERO);
}

#[test]
fn empty_participants_credit_the_payer_only() {
    let group = group(&["a", "b"], vec![expense(40_00, "a", &[])]);
    let balances = calculate_balances(&group);
    assert_eq!(nets(&balances), vec![("a", 40_00), ("b", 0)]);
    assert_eq!(net_total(&balances), Money::new(40_00));
}

#[test]
fn members_without_expenses_get_zero() {
    let group = group(&["a", "b", "c"], Vec::new());
    let balances = calculate_balances(&group);
    assert_eq!(nets(&balances), vec![("a", 0), ("b", 0), ("c", 0)]);
}

#[test]
fn duplicated_participants_are_debited_twice() {
    let group = group(&["a", "b"], vec![expense(30_00, "a", &["a", "b", "b"])]);
    let balances = calculate_balances(&group);
    assert_eq!(nets(&balances), vec![("a", 20_00), ("b", -20_00)]);
}

#[test]
fn thirds_round_per_member() {
    let group = group(&["a", "b", "c"], vec![expense(100_00, "a", &["a", "b", "c"])]);
    let balances = calculate_balances(&group);
    assert_eq!(nets(&balances), vec![("a", 66_67), ("b", -33_33), ("c", -33_33)]);
    // one cent of drift, inside the tolerance
    assert_eq!(net_total(&balances), Money::new(1));
}

#[test]
fn unknown_ids_only_show_in_ledger_balances() {
    let group = group(
        &["a", "b"],
        vec![
            expense(60_00, "a", &["a", "gone", "b"]),
            expense(10_00, "ghost", &["a"]),
        ],
    );

    let declared = calculate_balances(&group);
    assert_eq!(nets(&declared), vec![("a", 30_00), ("b", -20_00)]);

    let ledger = calculate_ledger_balances(&group);
    assert_eq!(
        nets(&ledger),
        vec![("a", 30_00), ("b", -20_00), ("gone", -20_00), ("ghost", 10_00)]
    );
    assert_eq!(net_total(&ledger), Money::ZERO);
}

#[test]
fn round2_is_idempotent_on_known_values() {
    for value in [0.0, 1.005, 2.675, -3.333, 66.666_666, 0.155, 1e6 / 3.0] {
        assert_eq!(round2(round2(value)), round2(value));
    }
    assert_eq!(round2(1.005), 1.01);
    assert_eq!(round2(-33.333_333), -33.33);
}

fn ledger_strategy() -> impl Strategy<Value = (usize, Vec<(i64, usize, Vec<usize>)>)> {
    (2usize..=6).prop_flat_map(|members| {
        let expense = (
            0i64..=100_000,
            0..members,
            prop::sample::subsequence((0..members).collect::<Vec<_>>(), 1..=members),
        );
        (Just(members), prop::collection::vec(expense, 0..=12))
    })
}

proptest! {
    #[test]
    fn balances_sum_to_zero_within_a_cent_per_member(
        (count, raw) in ledger_strategy(),
    ) {
        let ids: Vec<String> = (0..count).map(|i| format!("m{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let expenses = raw
            .iter()
            .map(|(amount, payer, participants)| {
                let participants: Vec<&str> = participants.iter().map(|&p| id_refs[p]).collect();
                expense(*amount, id_refs[*payer], &participants)
            })
            .collect();
        let group = group(&id_refs, expenses);

        let balances = calculate_balances(&group);
        prop_assert_eq!(balances.len(), count);
        prop_assert!(net_total(&balances).abs() <= Money::new(count as i64));
    }

    #[test]
    fn round2_is_idempotent(value in -1_000_000.0f64..1_000_000.0) {
        prop_assert_eq!(round2(round2(value)), round2(value));
    }
}
