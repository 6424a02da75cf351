//! Builds the report payloads printed by the CLI.

use std::collections::BTreeMap;

use api_types::report::{
    BalanceLine, CurrencyTotal, ExpenseLine, GroupReport, GroupSpendingLine, MonthLine,
    PaymentLine, PaymentsReport, ReceiptShareLine, SettlementLine, StatsReport,
};
use chrono::{DateTime, Utc};
use engine::{
    Currency, Expense, Group, MemberShare, Money, PaymentDirection, PaymentItem, PaymentsOverview,
    UNKNOWN_MEMBER_NAME, calculate_balances, calculate_ledger_balances, calculate_settlements,
    format_money, global_net, monthly_spending, spending_by_group,
};

use crate::ledger_file::currency_to_wire;

fn display_name<'a>(group: &'a Group, member_id: &str) -> &'a str {
    group.member_name(member_id).unwrap_or(UNKNOWN_MEMBER_NAME)
}

/// Balances and the settlement plan of one group.
///
/// Ids that only survive in the ledger are listed apart and left out of the
/// plan.
pub fn group_report(group: &Group) -> GroupReport {
    let (balances, former_members): (Vec<_>, Vec<_>) = calculate_ledger_balances(group)
        .into_iter()
        .partition(|balance| group.is_member(&balance.member_id));
    let line = |member_id: String, net: Money| BalanceLine {
        name: group
            .member_name(&member_id)
            .unwrap_or(member_id.as_str())
            .to_string(),
        net_minor: net.minor(),
        net: format_money(net, group.currency),
        member_id,
    };

    let settlements = calculate_settlements(&calculate_balances(group))
        .into_iter()
        .map(|settlement| SettlementLine {
            from: display_name(group, &settlement.from_id).to_string(),
            to: display_name(group, &settlement.to_id).to_string(),
            amount_minor: settlement.amount.minor(),
            amount: format_money(settlement.amount, group.currency),
            from_id: settlement.from_id,
            to_id: settlement.to_id,
        })
        .collect();

    GroupReport {
        group_id: group.id.clone(),
        group_name: group.name.clone(),
        currency: currency_to_wire(group.currency),
        balances: balances
            .into_iter()
            .map(|balance| line(balance.member_id, balance.net))
            .collect(),
        former_members: former_members
            .into_iter()
            .map(|balance| line(balance.member_id, balance.net))
            .collect(),
        settlements,
    }
}

pub fn expense_lines(group: &Group, expenses: &[&Expense]) -> Vec<ExpenseLine> {
    expenses
        .iter()
        .map(|expense| ExpenseLine {
            id: expense.id.clone(),
            title: expense.title.clone(),
            kind: expense.kind.as_str().to_string(),
            amount_minor: expense.amount.minor(),
            amount: format_money(expense.amount, group.currency),
            paid_by: display_name(group, &expense.paid_by_id).to_string(),
            participants: expense
                .participant_ids
                .iter()
                .map(|id| display_name(group, id).to_string())
                .collect(),
            created_at: expense.created_at.fixed_offset(),
        })
        .collect()
}

fn payment_line(item: &PaymentItem) -> PaymentLine {
    let direction = match item.direction {
        PaymentDirection::Pay => "pay",
        PaymentDirection::Receive => "receive",
    };
    PaymentLine {
        id: item.id.clone(),
        direction: direction.to_string(),
        counterparty_id: item.counterparty_id.clone(),
        counterparty: item.counterparty.clone(),
        group_id: item.group_id.clone(),
        group_name: item.group_name.clone(),
        currency: currency_to_wire(item.currency),
        amount_minor: item.amount.minor(),
        amount: format_money(item.amount, item.currency),
    }
}

fn totals(by_currency: &BTreeMap<Currency, Money>) -> Vec<CurrencyTotal> {
    by_currency
        .iter()
        .map(|(currency, amount)| CurrencyTotal {
            currency: currency_to_wire(*currency),
            amount_minor: amount.minor(),
            amount: format_money(*amount, *currency),
        })
        .collect()
}

pub fn payments_report(member_id: &str, overview: &PaymentsOverview) -> PaymentsReport {
    PaymentsReport {
        member_id: member_id.to_string(),
        to_pay: overview.to_pay.iter().map(payment_line).collect(),
        to_receive: overview.to_receive.iter().map(payment_line).collect(),
        pay_totals: totals(&overview.pay_by_currency),
        receive_totals: totals(&overview.receive_by_currency),
        net_totals: totals(&overview.net_by_currency),
    }
}

/// Global balance, monthly spending and spending per group of `member_id`.
pub fn stats_report(
    groups: &[Group],
    member_id: &str,
    now: DateTime<Utc>,
    months: u32,
) -> StatsReport {
    StatsReport {
        member_id: member_id.to_string(),
        net_totals: totals(&global_net(groups, member_id)),
        months: monthly_spending(groups, member_id, now, months)
            .into_iter()
            .map(|month| MonthLine {
                year: month.year,
                month: month.month,
                totals: totals(&month.by_currency),
            })
            .collect(),
        groups: spending_by_group(groups, member_id)
            .into_iter()
            .map(|spending| GroupSpendingLine {
                amount_minor: spending.amount.minor(),
                amount: format_money(spending.amount, spending.currency),
                currency: currency_to_wire(spending.currency),
                group_id: spending.group_id,
                group_name: spending.group_name,
            })
            .collect(),
    }
}

pub fn receipt_lines(shares: &[MemberShare], currency: Currency) -> Vec<ReceiptShareLine> {
    shares
        .iter()
        .map(|share| ReceiptShareLine {
            member_id: share.member_id.clone(),
            name: share.name.clone(),
            subtotal_minor: share.subtotal.minor(),
            tax_minor: share.tax.minor(),
            total_minor: share.total.minor(),
            total: format_money(share.total, currency),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use engine::{ExpenseKind, Member};

    use super::*;

    fn flat() -> Group {
        let expense = |id: &str, amount: i64, paid_by: &str, participants: &[&str]| Expense {
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
        };
        Group {
            id: "flat".to_string(),
            name: "Flat".to_string(),
            currency: Currency::Eur,
            members: vec![Member::new("ana", "Ana"), Member::new("bea", "Bea")],
            expenses: vec![
                expense("rent", 90_00, "ana", &["ana", "bea", "carl"]),
                expense("gas", 10_00, "bea", &["bea"]),
            ],
            admin_id: "ana".to_string(),
            invite_code: "CODE".to_string(),
        }
    }

    #[test]
    fn report_lists_former_members_apart() {
        let report = group_report(&flat());

        let nets: Vec<_> = report
            .balances
            .iter()
            .map(|line| (line.name.as_str(), line.net_minor))
            .collect();
        assert_eq!(nets, vec![("Ana", 60_00), ("Bea", -30_00)]);
        assert_eq!(report.balances[1].net, "EUR -30.00");

        assert_eq!(report.former_members.len(), 1);
        assert_eq!(report.former_members[0].member_id, "carl");
        assert_eq!(report.former_members[0].name, "carl");

        assert_eq!(report.settlements.len(), 1);
        let settlement = &report.settlements[0];
        assert_eq!((settlement.from.as_str(), settlement.to.as_str()), ("Bea", "Ana"));
        assert_eq!(settlement.amount, "EUR 30.00");
    }

    #[test]
    fn stats_report_formats_every_section() {
        let now = Utc::now();
        let report = stats_report(&[flat()], "bea", now, 3);

        assert_eq!(report.member_id, "bea");
        assert_eq!(report.net_totals.len(), 1);
        assert_eq!(report.net_totals[0].amount, "EUR -30.00");

        assert_eq!(report.months.len(), 3);
        let current = &report.months[2];
        assert_eq!(current.totals.len(), 1);
        assert_eq!(current.totals[0].amount_minor, 40_00);

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].group_name, "Flat");
        assert_eq!(report.groups[0].amount, "EUR 40.00");
    }

    #[test]
    fn expense_lines_use_member_names() {
        let group = flat();
        let expenses: Vec<&Expense> = group.expenses.iter().collect();
        let lines = expense_lines(&group, &expenses);

        assert_eq!(lines[0].paid_by, "Ana");
        assert_eq!(lines[0].participants, vec!["Ana", "Bea", UNKNOWN_MEMBER_NAME]);
        assert_eq!(lines[1].amount, "EUR 10.00");
    }
}
