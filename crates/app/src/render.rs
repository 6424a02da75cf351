//! Text, JSON and CSV output.

use std::io::Write;

use api_types::{
    ledger,
    report::{
        BalanceLine, CurrencyTotal, ExpenseLine, GroupReport, PaymentsReport, ReceiptShareLine,
        StatsReport,
    },
};
use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

fn json<T: Serialize + ?Sized>(value: &T, out: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn csv_rows<const N: usize>(
    header: [&str; N],
    rows: impl IntoIterator<Item = [String; N]>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// A mutation result: the object itself as JSON, a one-line message otherwise.
pub fn done<T: Serialize>(
    value: &T,
    message: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Json => json(value, out),
        OutputFormat::Text | OutputFormat::Csv => {
            writeln!(out, "{message}")?;
            Ok(())
        }
    }
}

pub fn groups(groups: &[ledger::Group], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => json(groups, out),
        OutputFormat::Csv => csv_rows(
            ["id", "name", "currency", "members", "expenses", "invite_code"],
            groups.iter().map(|group| {
                [
                    group.id.clone(),
                    group.name.clone(),
                    group.currency.code().to_string(),
                    group.members.len().to_string(),
                    group.expenses.len().to_string(),
                    group.invite_code.clone(),
                ]
            }),
            out,
        ),
        OutputFormat::Text => {
            if groups.is_empty() {
                writeln!(out, "No groups yet.")?;
            }
            for group in groups {
                writeln!(
                    out,
                    "{}  {} ({})  {} members  code {}",
                    group.id,
                    group.name,
                    group.currency.code(),
                    group.members.len(),
                    group.invite_code
                )?;
            }
            Ok(())
        }
    }
}

pub fn group_report(report: &GroupReport, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => json(report, out),
        OutputFormat::Csv => {
            let balances = report
                .balances
                .iter()
                .chain(&report.former_members)
                .map(|line| {
                    [
                        "balance".to_string(),
                        line.member_id.clone(),
                        line.name.clone(),
                        String::new(),
                        String::new(),
                        line.net_minor.to_string(),
                    ]
                });
            let settlements = report.settlements.iter().map(|line| {
                [
                    "settlement".to_string(),
                    line.from_id.clone(),
                    line.from.clone(),
                    line.to_id.clone(),
                    line.to.clone(),
                    line.amount_minor.to_string(),
                ]
            });
            csv_rows(
                ["row", "member_id", "name", "to_id", "to", "amount_minor"],
                balances.chain(settlements),
                out,
            )
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "{} ({})",
                report.group_name,
                report.currency.code()
            )?;
            writeln!(out, "Balances")?;
            for line in &report.balances {
                writeln!(out, "  {:<20} {}", line.name, line.net)?;
            }
            if !report.former_members.is_empty() {
                writeln!(out, "Former members")?;
                for line in &report.former_members {
                    writeln!(out, "  {:<20} {}", line.name, line.net)?;
                }
            }
            writeln!(out, "Settlements")?;
            if report.settlements.is_empty() {
                writeln!(out, "  All settled up.")?;
            }
            for line in &report.settlements {
                writeln!(out, "  {} -> {}  {}", line.from, line.to, line.amount)?;
            }
            Ok(())
        }
    }
}

pub fn balances(report: &GroupReport, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let lines: Vec<&BalanceLine> = report.balances.iter().chain(&report.former_members).collect();
    match format {
        OutputFormat::Json => json(&lines, out),
        OutputFormat::Csv => csv_rows(
            ["member_id", "name", "net_minor"],
            lines.iter().map(|line| {
                [
                    line.member_id.clone(),
                    line.name.clone(),
                    line.net_minor.to_string(),
                ]
            }),
            out,
        ),
        OutputFormat::Text => {
            for line in &report.balances {
                writeln!(out, "{:<20} {}", line.name, line.net)?;
            }
            for line in &report.former_members {
                writeln!(out, "{:<20} {}  (left the group)", line.name, line.net)?;
            }
            Ok(())
        }
    }
}

pub fn settlements(report: &GroupReport, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => json(&report.settlements, out),
        OutputFormat::Csv => csv_rows(
            ["from_id", "from", "to_id", "to", "amount_minor"],
            report.settlements.iter().map(|line| {
                [
                    line.from_id.clone(),
                    line.from.clone(),
                    line.to_id.clone(),
                    line.to.clone(),
                    line.amount_minor.to_string(),
                ]
            }),
            out,
        ),
        OutputFormat::Text => {
            if report.settlements.is_empty() {
                writeln!(out, "All settled up.")?;
            }
            for line in &report.settlements {
                writeln!(out, "{} -> {}  {}", line.from, line.to, line.amount)?;
            }
            Ok(())
        }
    }
}

pub fn expenses(lines: &[ExpenseLine], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => json(lines, out),
        OutputFormat::Csv => csv_rows(
            ["id", "created_at", "kind", "title", "paid_by", "participants", "amount_minor"],
            lines.iter().map(|line| {
                [
                    line.id.clone(),
                    line.created_at.to_rfc3339(),
                    line.kind.clone(),
                    line.title.clone(),
                    line.paid_by.clone(),
                    line.participants.join(";"),
                    line.amount_minor.to_string(),
                ]
            }),
            out,
        ),
        OutputFormat::Text => {
            if lines.is_empty() {
                writeln!(out, "No expenses in this range.")?;
            }
            for line in lines {
                writeln!(
                    out,
                    "{}  {:<24} {:>14}  paid by {} for {}",
                    line.created_at.format("%Y-%m-%d"),
                    line.title,
                    line.amount,
                    line.paid_by,
                    line.participants.join(", ")
                )?;
            }
            Ok(())
        }
    }
}

pub fn payments(report: &PaymentsReport, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => json(report, out),
        OutputFormat::Csv => csv_rows(
            ["direction", "group", "counterparty", "currency", "amount_minor"],
            report
                .to_pay
                .iter()
                .chain(&report.to_receive)
                .map(|line| {
                    [
                        line.direction.clone(),
                        line.group_name.clone(),
                        line.counterparty.clone(),
                        line.currency.code().to_string(),
                        line.amount_minor.to_string(),
                    ]
                }),
            out,
        ),
        OutputFormat::Text => {
            if report.to_pay.is_empty() && report.to_receive.is_empty() {
                writeln!(out, "Nothing to pay or receive.")?;
                return Ok(());
            }
            writeln!(out, "To pay")?;
            for line in &report.to_pay {
                writeln!(out, "  {} in {}  {}", line.counterparty, line.group_name, line.amount)?;
            }
            writeln!(out, "To receive")?;
            for line in &report.to_receive {
                writeln!(out, "  {} in {}  {}", line.counterparty, line.group_name, line.amount)?;
            }
            writeln!(out, "Net")?;
            for total in &report.net_totals {
                writeln!(out, "  {}", total.amount)?;
            }
            Ok(())
        }
    }
}

fn joined(totals: &[CurrencyTotal]) -> String {
    if totals.is_empty() {
        return "-".to_string();
    }
    totals
        .iter()
        .map(|total| total.amount.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn stats(report: &StatsReport, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => json(report, out),
        OutputFormat::Csv => {
            let row = |section: &str, label: String, total: &CurrencyTotal| {
                [
                    section.to_string(),
                    label,
                    total.currency.code().to_string(),
                    total.amount_minor.to_string(),
                ]
            };
            let net = report
                .net_totals
                .iter()
                .map(|total| row("net", String::new(), total));
            let months = report.months.iter().flat_map(|month| {
                month.totals.iter().map(move |total| {
                    row("month", format!("{}-{:02}", month.year, month.month), total)
                })
            });
            let groups = report.groups.iter().map(|line| {
                [
                    "group".to_string(),
                    line.group_name.clone(),
                    line.currency.code().to_string(),
                    line.amount_minor.to_string(),
                ]
            });
            csv_rows(
                ["section", "label", "currency", "amount_minor"],
                net.chain(months).chain(groups),
                out,
            )
        }
        OutputFormat::Text => {
            writeln!(out, "Global balance  {}", joined(&report.net_totals))?;
            writeln!(out, "Spending by month")?;
            for month in &report.months {
                writeln!(
                    out,
                    "  {}-{:02}  {}",
                    month.year,
                    month.month,
                    joined(&month.totals)
                )?;
            }
            writeln!(out, "Spending by group")?;
            if report.groups.is_empty() {
                writeln!(out, "  Nothing spent yet.")?;
            }
            for line in &report.groups {
                writeln!(out, "  {:<20} {}", line.group_name, line.amount)?;
            }
            Ok(())
        }
    }
}

pub fn invites(invites: &[ledger::Invite], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => json(invites, out),
        OutputFormat::Csv => csv_rows(
            ["id", "group", "requester_id", "requester", "created_at"],
            invites.iter().map(|invite| {
                [
                    invite.id.clone(),
                    invite.group_name.clone(),
                    invite.requester_id.clone(),
                    invite.requester_name.clone(),
                    invite.created_at.to_rfc3339(),
                ]
            }),
            out,
        ),
        OutputFormat::Text => {
            if invites.is_empty() {
                writeln!(out, "No pending requests.")?;
            }
            for invite in invites {
                writeln!(
                    out,
                    "{}  {} wants to join {}",
                    invite.id, invite.requester_name, invite.group_name
                )?;
            }
            Ok(())
        }
    }
}

pub fn receipt(lines: &[ReceiptShareLine], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => json(lines, out),
        OutputFormat::Csv => csv_rows(
            ["member_id", "name", "subtotal_minor", "tax_minor", "total_minor"],
            lines.iter().map(|line| {
                [
                    line.member_id.clone(),
                    line.name.clone(),
                    line.subtotal_minor.to_string(),
                    line.tax_minor.to_string(),
                    line.total_minor.to_string(),
                ]
            }),
            out,
        ),
        OutputFormat::Text => {
            for line in lines {
                writeln!(out, "  {:<20} {}", line.name, line.total)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use api_types::report::SettlementLine;

    use super::*;

    fn report() -> GroupReport {
        GroupReport {
            group_id: "flat".to_string(),
            group_name: "Flat".to_string(),
            currency: api_types::Currency::Eur,
            balances: vec![
                BalanceLine {
                    member_id: "ana".to_string(),
                    name: "Ana".to_string(),
                    net_minor: 50_00,
                    net: "EUR 50.00".to_string(),
                },
                BalanceLine {
                    member_id: "bea".to_string(),
                    name: "Bea, Jr".to_string(),
                    net_minor: -50_00,
                    net: "EUR -50.00".to_string(),
                },
            ],
            former_members: Vec::new(),
            settlements: vec![SettlementLine {
                from_id: "bea".to_string(),
                from: "Bea, Jr".to_string(),
                to_id: "ana".to_string(),
                to: "Ana".to_string(),
                amount_minor: 50_00,
                amount: "EUR 50.00".to_string(),
            }],
        }
    }

    fn render(format: OutputFormat) -> String {
        let mut out = Vec::new();
        group_report(&report(), format, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_report_lists_balances_then_settlements() {
        let text = render(OutputFormat::Text);
        assert!(text.starts_with("Flat (EUR)\nBalances\n"));
        assert!(text.contains("Bea, Jr -> Ana  EUR 50.00"));
        assert!(!text.contains("Former members"));
    }

    #[test]
    fn csv_report_quotes_fields() {
        let csv = render(OutputFormat::Csv);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "row,member_id,name,to_id,to,amount_minor");
        assert_eq!(lines[2], "balance,bea,\"Bea, Jr\",,,-5000");
        assert_eq!(lines[3], "settlement,bea,\"Bea, Jr\",ana,Ana,5000");
    }

    #[test]
    fn stats_list_months_oldest_first() {
        let total = |minor: i64, amount: &str| CurrencyTotal {
            currency: api_types::Currency::Eur,
            amount_minor: minor,
            amount: amount.to_string(),
        };
        let report = StatsReport {
            member_id: "ana".to_string(),
            net_totals: vec![total(10_00, "EUR 10.00")],
            months: vec![
                api_types::report::MonthLine {
                    year: 2023,
                    month: 12,
                    totals: Vec::new(),
                },
                api_types::report::MonthLine {
                    year: 2024,
                    month: 1,
                    totals: vec![total(3_33, "EUR 3.33")],
                },
            ],
            groups: Vec::new(),
        };

        let mut out = Vec::new();
        stats(&report, OutputFormat::Text, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Global balance  EUR 10.00\nSpending by month\n  2023-12  -\n  2024-01  EUR 3.33\n\
             Spending by group\n  Nothing spent yet.\n"
        );

        let mut out = Vec::new();
        stats(&report, OutputFormat::Csv, &mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "section,label,currency,amount_minor",
                "net,,EUR,1000",
                "month,2024-01,EUR,333",
            ]
        );
    }

    #[test]
    fn json_report_parses_back() {
        let json = render(OutputFormat::Json);
        let parsed: GroupReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report());
    }
}
