use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    EngineError, Expense, NewExpense, ResultEngine, Settlement,
    util::{new_id, normalize_required_name},
};

use super::{MemoryLedger, access::require_members};

impl MemoryLedger {
    /// Logs an expense; the payer and every participant must be members.
    ///
    /// An empty participant list is accepted and credits the payer only.
    pub fn add_expense(&self, group_id: &str, expense: NewExpense) -> ResultEngine<Expense> {
        let title = normalize_required_name(&expense.title, "expense title")?;
        if expense.amount.is_negative() {
            warn!(group_id, amount = %expense.amount, "negative expense refused");
            return Err(EngineError::InvalidAmount(format!(
                "amount must not be negative: {}",
                expense.amount
            )));
        }

        self.with_group_mut(group_id, |group| {
            require_members(group, std::iter::once(&expense.paid_by_id))?;
            require_members(group, &expense.participant_ids)?;

            let expense = NewExpense { title, ..expense }.into_expense(new_id(), Utc::now());
            group.expenses.push(expense.clone());
            debug!(
                group_id,
                expense_id = %expense.id,
                amount = %expense.amount,
                kind = expense.kind.as_str(),
                "expense added"
            );
            Ok(expense)
        })
    }

    pub fn delete_expense(&self, group_id: &str, expense_id: &str) -> ResultEngine<Expense> {
        self.with_group_mut(group_id, |group| {
            let position = group
                .expenses
                .iter()
                .position(|expense| expense.id == expense_id)
                .ok_or_else(|| EngineError::KeyNotFound(expense_id.to_string()))?;
            debug!(group_id, expense_id, "expense deleted");
            Ok(group.expenses.remove(position))
        })
    }

    /// Logs `settlement` as a payment from the debtor to the creditor.
    pub fn record_settlement(
        &self,
        group_id: &str,
        settlement: &Settlement,
        title: &str,
    ) -> ResultEngine<Expense> {
        self.add_expense(group_id, NewExpense::payment(settlement, title))
    }

    /// Logs several expenses at once; subscribers hear about it once.
    ///
    /// Either every expense is added or none is. An empty batch is a no-op.
    pub fn add_expenses(
        &self,
        group_id: &str,
        expenses: Vec<NewExpense>,
    ) -> ResultEngine<Vec<Expense>> {
        let mut pending = Vec::with_capacity(expenses.len());
        for expense in expenses {
            let title = normalize_required_name(&expense.title, "expense title")?;
            if expense.amount.is_negative() {
                return Err(EngineError::InvalidAmount(format!(
                    "amount must not be negative: {}",
                    expense.amount
                )));
            }
            pending.push(NewExpense { title, ..expense });
        }
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        self.with_group_mut(group_id, |group| {
            for expense in &pending {
                require_members(group, std::iter::once(&expense.paid_by_id))?;
                require_members(group, &expense.participant_ids)?;
            }
            let now = Utc::now();
            let added: Vec<Expense> = pending
                .into_iter()
                .map(|expense| expense.into_expense(new_id(), now))
                .collect();
            group.expenses.extend(added.iter().cloned());
            debug!(group_id, count = added.len(), "expenses added");
            Ok(added)
        })
    }
}
