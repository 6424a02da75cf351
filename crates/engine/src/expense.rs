//! Ledger entries.
//!
//! An [`Expense`] credits its payer with the full amount and debits the
//! participants an even share each. A [`ExpenseKind::Payment`] uses the same
//! arithmetic to record a direct transfer: the debtor "pays" on behalf of the
//! creditor, which moves both balances towards zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, Settlement};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseKind {
    #[default]
    Expense,
    Payment,
}

impl ExpenseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Payment => "payment",
        }
    }
}

impl TryFrom<&str> for ExpenseKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "" | "expense" => Ok(Self::Expense),
            "payment" => Ok(Self::Payment),
            other => Err(EngineError::InvalidName(format!(
                "invalid expense type: {other}"
            ))),
        }
    }
}

/// Per-member line of a split receipt, kept on the expense for display.
///
/// The balance engine never reads items; only `Expense::amount` counts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub name: String,
    pub price: Money,
    pub tax: Money,
    pub total: Money,
    pub original_price: Money,
    pub with_tax: bool,
    #[serde(default)]
    pub shared_with: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount: Money,
    pub paid_by_id: String,
    /// Ordered, not de-duplicated: a repeated id is charged once per entry.
    pub participant_ids: Vec<String>,
    #[serde(default)]
    pub kind: ExpenseKind,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<ExpenseItem>,
    #[serde(default)]
    pub receipt_id: Option<String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

impl Expense {
    pub fn is_payment(&self) -> bool {
        self.kind == ExpenseKind::Payment
    }
}

/// An expense as submitted by a caller, before the store assigns `id` and
/// `created_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub amount: Money,
    pub paid_by_id: String,
    pub participant_ids: Vec<String>,
    #[serde(default)]
    pub kind: ExpenseKind,
    #[serde(default)]
    pub items: Vec<ExpenseItem>,
    #[serde(default)]
    pub receipt_id: Option<String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

impl NewExpense {
    /// A regular expense split evenly among `participant_ids`.
    pub fn expense(
        title: impl Into<String>,
        amount: Money,
        paid_by_id: impl Into<String>,
        participant_ids: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            paid_by_id: paid_by_id.into(),
            participant_ids,
            kind: ExpenseKind::Expense,
            items: Vec::new(),
            receipt_id: None,
            receipt_url: None,
        }
    }

    /// Records `settlement` as paid: the debtor pays the creditor directly.
    pub fn payment(settlement: &Settlement, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            amount: settlement.amount,
            paid_by_id: settlement.from_id.clone(),
            participant_ids: vec![settlement.to_id.clone()],
            kind: ExpenseKind::Payment,
            items: Vec::new(),
            receipt_id: None,
            receipt_url: None,
        }
    }

    pub fn with_receipt_url(mut self, url: impl Into<String>) -> Self {
        self.receipt_url = Some(url.into());
        self
    }

    pub(crate) fn into_expense(self, id: String, created_at: DateTime<Utc>) -> Expense {
        Expense {
            id,
            title: self.title,
            amount: self.amount,
            paid_by_id: self.paid_by_id,
            participant_ids: self.participant_ids,
            kind: self.kind,
            created_at,
            items: self.items,
            receipt_id: self.receipt_id,
            receipt_url: self.receipt_url,
        }
    }
}
