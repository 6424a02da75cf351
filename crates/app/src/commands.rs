use std::{fs, io::Write};

use api_types::receipt::ReceiptItemInput;
use chrono::Utc;
use clap::{Args, Subcommand};
use engine::{
    Currency, ExpenseFilter, ExpenseRange, Group, GroupRepository, Member, MemoryLedger, Money,
    NewExpense, ReceiptItem, calculate_balances, calculate_settlements, filter_expenses,
    parse_amount, payments_overview, receipt_expenses, split_receipt,
};
use tracing::debug;

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    ledger_file,
    render::{self, OutputFormat},
    report,
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the acting member's groups (every group with --all).
    Groups {
        #[arg(long)]
        all: bool,
    },
    /// Net balance per member.
    Balances(GroupArg),
    /// Suggested transfers to settle a group.
    Settle(SettleArgs),
    /// Balances and settlements together.
    Report(GroupArg),
    /// What the acting member pays and receives across groups.
    Payments,
    /// Global balance and spending of the acting member.
    Stats {
        /// Number of calendar months to chart, the current one included.
        #[arg(long, default_value_t = 6)]
        months: u32,
    },
    /// List the expenses of a group, newest first.
    Expenses(ExpensesArgs),
    AddExpense(AddExpenseArgs),
    DeleteExpense {
        group: String,
        expense_id: String,
    },
    CreateGroup(CreateGroupArgs),
    /// Ask to join a group by invite code.
    Join(JoinArgs),
    /// Pending join requests for the groups the acting member administers.
    Invites,
    Accept {
        invite_id: String,
    },
    Reject {
        invite_id: String,
    },
    Leave(GroupArg),
    RemoveMember {
        group: String,
        member_id: String,
    },
    DeleteGroup(GroupArg),
    /// Split a receipt (JSON list of items) among the group members.
    SplitReceipt(SplitReceiptArgs),
}

#[derive(Args, Debug)]
pub struct GroupArg {
    /// Group id or name.
    pub group: String,
}

#[derive(Args, Debug)]
pub struct SettleArgs {
    pub group: String,
    /// Log every suggested transfer as a payment.
    #[arg(long)]
    pub record: bool,
}

#[derive(Args, Debug)]
pub struct ExpensesArgs {
    pub group: String,
    /// Matches title, payer or participant names; case and accents ignored.
    #[arg(long, short)]
    pub query: Option<String>,
    /// 1d, 7d, 30d or all.
    #[arg(long, default_value = "30d")]
    pub range: String,
}

#[derive(Args, Debug)]
pub struct AddExpenseArgs {
    pub group: String,
    #[arg(long)]
    pub title: String,
    /// Amount in major units, e.g. "12.50" or "1.234,56".
    #[arg(long)]
    pub amount: String,
    /// Payer id; defaults to the acting member.
    #[arg(long)]
    pub paid_by: Option<String>,
    /// Comma separated member ids; defaults to every member.
    #[arg(long, value_delimiter = ',')]
    pub participants: Vec<String>,
    #[arg(long)]
    pub receipt_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct CreateGroupArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "USD")]
    pub currency: String,
    /// Display name of the acting member; defaults to the id.
    #[arg(long)]
    pub member_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct JoinArgs {
    pub code: String,
    /// Display name of the acting member; defaults to the id.
    #[arg(long)]
    pub member_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct SplitReceiptArgs {
    pub group: String,
    /// JSON file with the receipt items.
    #[arg(long)]
    pub items: String,
    #[arg(long)]
    pub concept: String,
    /// Payer id; defaults to the acting member.
    #[arg(long)]
    pub paid_by: Option<String>,
    /// Overrides the configured tax rate.
    #[arg(long)]
    pub tax_rate: Option<f64>,
    /// Log one expense per member.
    #[arg(long)]
    pub record: bool,
}

/// Finds a group by id, then by case-insensitive name.
fn resolve_group(ledger: &MemoryLedger, key: &str) -> Result<Group> {
    if let Ok(group) = ledger.group(key) {
        return Ok(group);
    }
    let mut matches = ledger
        .groups()
        .into_iter()
        .filter(|group| group.name.eq_ignore_ascii_case(key.trim()));
    match (matches.next(), matches.next()) {
        (Some(group), None) => Ok(group),
        (Some(_), Some(_)) => Err(AppError::Usage(format!(
            "more than one group is named {key}; use its id"
        ))),
        (None, _) => Err(engine::EngineError::KeyNotFound(key.to_string()).into()),
    }
}

fn acting_member(settings: &AppConfig, name: Option<String>) -> Result<Member> {
    let id = settings.require_member()?;
    Ok(Member::new(id, name.unwrap_or_else(|| id.to_string())))
}

fn read_receipt(path: &str) -> Result<Vec<ReceiptItem>> {
    let content = fs::read_to_string(path)?;
    let inputs: Vec<ReceiptItemInput> = serde_json::from_str(&content)?;
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            let amount: Money = input.amount.parse()?;
            if !amount.is_positive() {
                return Err(AppError::Usage(format!(
                    "receipt item {} must cost more than zero",
                    input.name
                )));
            }
            Ok(ReceiptItem {
                id: index.to_string(),
                name: input.name,
                amount,
                taxable: input.taxable,
                assigned: input.assigned,
            })
        })
        .collect()
}

/// Runs `command` against the ledger. Returns whether the ledger changed.
pub fn execute(
    command: Command,
    ledger: &MemoryLedger,
    settings: &AppConfig,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<bool> {
    debug!(?command, "running command");

    match command {
        Command::Groups { all } => {
            let groups = match settings.member.as_deref() {
                Some(member_id) if !all => ledger.groups_for_member(member_id),
                _ => ledger.groups(),
            };
            let groups: Vec<_> = groups.iter().map(ledger_file::group_to_wire).collect();
            render::groups(&groups, format, out)?;
            Ok(false)
        }
        Command::Balances(args) => {
            let group = resolve_group(ledger, &args.group)?;
            render::balances(&report::group_report(&group), format, out)?;
            Ok(false)
        }
        Command::Report(args) => {
            let group = resolve_group(ledger, &args.group)?;
            render::group_report(&report::group_report(&group), format, out)?;
            Ok(false)
        }
        Command::Settle(args) => {
            let group = resolve_group(ledger, &args.group)?;
            render::settlements(&report::group_report(&group), format, out)?;
            if !args.record {
                return Ok(false);
            }
            let payments: Vec<_> = calculate_settlements(&calculate_balances(&group))
                .iter()
                .map(|settlement| NewExpense::payment(settlement, "Payment"))
                .collect();
            let recorded = ledger.add_expenses(&group.id, payments)?;
            if format == OutputFormat::Text {
                writeln!(out, "Recorded {} payments.", recorded.len())?;
            }
            Ok(!recorded.is_empty())
        }
        Command::Payments => {
            let member_id = settings.require_member()?;
            let groups = ledger.groups_for_member(member_id);
            let overview = payments_overview(&groups, member_id);
            render::payments(&report::payments_report(member_id, &overview), format, out)?;
            Ok(false)
        }
        Command::Stats { months } => {
            let member_id = settings.require_member()?;
            let groups = ledger.groups_for_member(member_id);
            let report = report::stats_report(&groups, member_id, Utc::now(), months);
            render::stats(&report, format, out)?;
            Ok(false)
        }
        Command::Expenses(args) => {
            let group = resolve_group(ledger, &args.group)?;
            let range: ExpenseRange = args.range.parse()?;
            let filter = ExpenseFilter::new(args.query.as_deref(), range);
            let expenses = filter_expenses(&group, &filter, Utc::now());
            render::expenses(&report::expense_lines(&group, &expenses), format, out)?;
            Ok(false)
        }
        Command::AddExpense(args) => {
            let group = resolve_group(ledger, &args.group)?;
            let amount = parse_amount(&args.amount);
            if !amount.is_positive() {
                return Err(AppError::Usage(format!(
                    "amount must be greater than zero: {}",
                    args.amount
                )));
            }
            let paid_by = match args.paid_by {
                Some(paid_by) => paid_by,
                None => settings.require_member()?.to_string(),
            };
            let participants = if args.participants.is_empty() {
                group.members.iter().map(|member| member.id.clone()).collect()
            } else {
                args.participants
            };

            let mut expense = NewExpense::expense(args.title, amount, paid_by, participants);
            if let Some(url) = args.receipt_url {
                expense = expense.with_receipt_url(url);
            }
            let expense = ledger.add_expense(&group.id, expense)?;
            let message = format!(
                "Added {} ({}) to {}",
                expense.title,
                engine::format_money(expense.amount, group.currency),
                group.name
            );
            render::done(&ledger_file::expense_to_wire(&expense), &message, format, out)?;
            Ok(true)
        }
        Command::DeleteExpense { group, expense_id } => {
            let group = resolve_group(ledger, &group)?;
            let expense = ledger.delete_expense(&group.id, &expense_id)?;
            let message = format!("Deleted {}", expense.title);
            render::done(&ledger_file::expense_to_wire(&expense), &message, format, out)?;
            Ok(true)
        }
        Command::CreateGroup(args) => {
            let currency = Currency::try_from(args.currency.as_str())?;
            let owner = acting_member(settings, args.member_name)?;
            let group = ledger.create_group(&args.name, currency, owner)?;
            let message = format!(
                "Created {} ({}), invite code {}",
                group.name, group.id, group.invite_code
            );
            render::done(&ledger_file::group_to_wire(&group), &message, format, out)?;
            Ok(true)
        }
        Command::Join(args) => {
            let requester = acting_member(settings, args.member_name)?;
            let invite = ledger.request_join(&args.code, requester)?;
            let message = format!("Asked to join {}", invite.group_name);
            render::done(&ledger_file::invite_to_wire(&invite), &message, format, out)?;
            Ok(true)
        }
        Command::Invites => {
            let admin_id = settings.require_member()?;
            let invites: Vec<_> = ledger
                .pending_invites(admin_id)
                .iter()
                .map(ledger_file::invite_to_wire)
                .collect();
            render::invites(&invites, format, out)?;
            Ok(false)
        }
        Command::Accept { invite_id } => {
            let admin_id = settings.require_member()?;
            let group = ledger.accept_invite(&invite_id, admin_id)?;
            let message = format!("Accepted {invite_id}");
            render::done(&ledger_file::group_to_wire(&group), &message, format, out)?;
            Ok(true)
        }
        Command::Reject { invite_id } => {
            let admin_id = settings.require_member()?;
            let invite = ledger.reject_invite(&invite_id, admin_id)?;
            let message = format!("Rejected {invite_id}");
            render::done(&ledger_file::invite_to_wire(&invite), &message, format, out)?;
            Ok(true)
        }
        Command::Leave(args) => {
            let member_id = settings.require_member()?;
            let group = resolve_group(ledger, &args.group)?;
            ledger.leave_group(&group.id, member_id)?;
            writeln!(out, "Left {}", group.name)?;
            Ok(true)
        }
        Command::RemoveMember { group, member_id } => {
            let admin_id = settings.require_member()?;
            let group = resolve_group(ledger, &group)?;
            ledger.remove_member(&group.id, &member_id, admin_id)?;
            writeln!(out, "Removed {member_id} from {}", group.name)?;
            Ok(true)
        }
        Command::DeleteGroup(args) => {
            let admin_id = settings.require_member()?;
            let group = resolve_group(ledger, &args.group)?;
            let group = ledger.delete_group(&group.id, admin_id)?;
            writeln!(out, "Deleted {}", group.name)?;
            Ok(true)
        }
        Command::SplitReceipt(args) => {
            let group = resolve_group(ledger, &args.group)?;
            let items = read_receipt(&args.items)?;
            let tax_rate = args.tax_rate.unwrap_or(settings.tax_rate);
            let shares = split_receipt(&group.members, &items, tax_rate)?;
            render::receipt(&report::receipt_lines(&shares, group.currency), format, out)?;
            if !args.record {
                return Ok(false);
            }

            let paid_by = match args.paid_by {
                Some(paid_by) => paid_by,
                None => settings.require_member()?.to_string(),
            };
            let expenses = receipt_expenses(&shares, &paid_by, &args.concept)?;
            let added = ledger.add_expenses(&group.id, expenses)?;
            if format == OutputFormat::Text {
                writeln!(out, "Recorded {} expenses.", added.len())?;
            }
            Ok(!added.is_empty())
        }
    }
}
