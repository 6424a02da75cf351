//! The JSON ledger file and its mapping onto the engine types.

use std::{fs, path::Path};

use api_types::ledger::{self, CURRENT_VERSION, LedgerFile};
use chrono::Utc;
use engine::{
    Currency, Expense, ExpenseItem, ExpenseKind, Group, GroupInvite, InviteStatus, LedgerSnapshot,
    Member, MemoryLedger, Money,
};
use tracing::info;

use crate::error::{AppError, Result};

/// Reads the ledger; a missing file is an empty ledger.
pub fn load(path: &str) -> Result<LedgerFile> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path, "no ledger file yet, starting empty");
            return Ok(LedgerFile::default());
        }
        Err(err) => return Err(err.into()),
    };
    let file: LedgerFile = serde_json::from_str(&content)?;
    if file.version > CURRENT_VERSION {
        return Err(AppError::Ledger(format!(
            "unsupported ledger version {}",
            file.version
        )));
    }
    info!(path, groups = file.groups.len(), "ledger loaded");
    Ok(file)
}

pub fn save(path: &str, file: &LedgerFile) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_string_pretty(file)?;
    fs::write(path, payload)?;
    info!(path, groups = file.groups.len(), "ledger saved");
    Ok(())
}

pub fn open(path: &str) -> Result<MemoryLedger> {
    let snapshot = to_snapshot(load(path)?)?;
    Ok(MemoryLedger::from_snapshot(snapshot)?)
}

pub fn store(path: &str, ledger: &MemoryLedger) -> Result<()> {
    save(path, &from_snapshot(&ledger.snapshot()))
}

pub fn currency_to_wire(currency: Currency) -> api_types::Currency {
    match currency {
        Currency::Usd => api_types::Currency::Usd,
        Currency::Eur => api_types::Currency::Eur,
        Currency::Gbp => api_types::Currency::Gbp,
        Currency::Mxn => api_types::Currency::Mxn,
        Currency::Ars => api_types::Currency::Ars,
        Currency::Cop => api_types::Currency::Cop,
        Currency::Pen => api_types::Currency::Pen,
    }
}

fn currency_from_wire(currency: api_types::Currency) -> Currency {
    match currency {
        api_types::Currency::Usd => Currency::Usd,
        api_types::Currency::Eur => Currency::Eur,
        api_types::Currency::Gbp => Currency::Gbp,
        api_types::Currency::Mxn => Currency::Mxn,
        api_types::Currency::Ars => Currency::Ars,
        api_types::Currency::Cop => Currency::Cop,
        api_types::Currency::Pen => Currency::Pen,
    }
}

pub fn to_snapshot(file: LedgerFile) -> Result<LedgerSnapshot> {
    let groups = file
        .groups
        .into_iter()
        .map(group_from_wire)
        .collect::<Result<Vec<_>>>()?;
    let invites = file
        .invites
        .into_iter()
        .map(invite_from_wire)
        .collect::<Result<Vec<_>>>()?;
    Ok(LedgerSnapshot { groups, invites })
}

pub fn from_snapshot(snapshot: &LedgerSnapshot) -> LedgerFile {
    LedgerFile {
        version: CURRENT_VERSION,
        groups: snapshot.groups.iter().map(group_to_wire).collect(),
        invites: snapshot.invites.iter().map(invite_to_wire).collect(),
    }
}

fn group_from_wire(group: ledger::Group) -> Result<Group> {
    let expenses = group
        .expenses
        .into_iter()
        .map(expense_from_wire)
        .collect::<Result<Vec<_>>>()?;
    Ok(Group {
        id: group.id,
        name: group.name,
        currency: currency_from_wire(group.currency),
        members: group
            .members
            .into_iter()
            .map(|member| Member::new(member.id, member.name))
            .collect(),
        expenses,
        admin_id: group.admin_id,
        invite_code: group.invite_code,
    })
}

pub fn group_to_wire(group: &Group) -> ledger::Group {
    ledger::Group {
        id: group.id.clone(),
        name: group.name.clone(),
        currency: currency_to_wire(group.currency),
        members: group
            .members
            .iter()
            .map(|member| ledger::Member {
                id: member.id.clone(),
                name: member.name.clone(),
            })
            .collect(),
        expenses: group.expenses.iter().map(expense_to_wire).collect(),
        admin_id: group.admin_id.clone(),
        invite_code: group.invite_code.clone(),
    }
}

fn expense_from_wire(expense: ledger::Expense) -> Result<Expense> {
    Ok(Expense {
        kind: ExpenseKind::try_from(expense.kind.as_str())?,
        id: expense.id,
        title: expense.title,
        amount: Money::new(expense.amount_minor),
        paid_by_id: expense.paid_by_id,
        participant_ids: expense.participant_ids,
        created_at: expense.created_at.with_timezone(&Utc),
        items: expense
            .items
            .into_iter()
            .map(|item| ExpenseItem {
                name: item.name,
                price: Money::new(item.price_minor),
                tax: Money::new(item.tax_minor),
                total: Money::new(item.total_minor),
                original_price: Money::new(item.original_price_minor),
                with_tax: item.with_tax,
                shared_with: item.shared_with,
            })
            .collect(),
        receipt_id: expense.receipt_id,
        receipt_url: expense.receipt_url,
    })
}

pub fn expense_to_wire(expense: &Expense) -> ledger::Expense {
    ledger::Expense {
        id: expense.id.clone(),
        title: expense.title.clone(),
        amount_minor: expense.amount.minor(),
        paid_by_id: expense.paid_by_id.clone(),
        participant_ids: expense.participant_ids.clone(),
        kind: expense.kind.as_str().to_string(),
        created_at: expense.created_at.fixed_offset(),
        items: expense
            .items
            .iter()
            .map(|item| ledger::ExpenseItem {
                name: item.name.clone(),
                price_minor: item.price.minor(),
                tax_minor: item.tax.minor(),
                total_minor: item.total.minor(),
                original_price_minor: item.original_price.minor(),
                with_tax: item.with_tax,
                shared_with: item.shared_with.clone(),
            })
            .collect(),
        receipt_id: expense.receipt_id.clone(),
        receipt_url: expense.receipt_url.clone(),
    }
}

fn invite_from_wire(invite: ledger::Invite) -> Result<GroupInvite> {
    Ok(GroupInvite {
        status: InviteStatus::try_from(invite.status.as_str())?,
        id: invite.id,
        group_id: invite.group_id,
        group_name: invite.group_name,
        admin_id: invite.admin_id,
        requester_id: invite.requester_id,
        requester_name: invite.requester_name,
        created_at: invite.created_at.with_timezone(&Utc),
    })
}

pub fn invite_to_wire(invite: &GroupInvite) -> ledger::Invite {
    ledger::Invite {
        id: invite.id.clone(),
        group_id: invite.group_id.clone(),
        group_name: invite.group_name.clone(),
        admin_id: invite.admin_id.clone(),
        requester_id: invite.requester_id.clone(),
        requester_name: invite.requester_name.clone(),
        status: invite.status.as_str().to_string(),
        created_at: invite.created_at.fixed_offset(),
    }
}
