use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Mxn,
    Ars,
    Cop,
    Pen,
}

impl Currency {
    /// ISO 4217 code, as serialized.
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Mxn => "MXN",
            Currency::Ars => "ARS",
            Currency::Cop => "COP",
            Currency::Pen => "PEN",
        }
    }
}

/// On-disk ledger file.
///
/// Amounts are integer minor units (`*_minor`), timestamps RFC 3339.
pub mod ledger {
    use super::*;

    pub const CURRENT_VERSION: u32 = 1;

    fn current_version() -> u32 {
        CURRENT_VERSION
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LedgerFile {
        #[serde(default = "current_version")]
        pub version: u32,
        #[serde(default)]
        pub groups: Vec<Group>,
        #[serde(default)]
        pub invites: Vec<Invite>,
    }

    impl Default for LedgerFile {
        fn default() -> Self {
            Self {
                version: CURRENT_VERSION,
                groups: Vec::new(),
                invites: Vec::new(),
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Group {
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub currency: Currency,
        pub members: Vec<Member>,
        #[serde(default)]
        pub expenses: Vec<Expense>,
        pub admin_id: String,
        pub invite_code: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Member {
        pub id: String,
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Expense {
        pub id: String,
        pub title: String,
        pub amount_minor: i64,
        pub paid_by_id: String,
        #[serde(default)]
        pub participant_ids: Vec<String>,
        /// `expense` or `payment`; missing means `expense`.
        #[serde(default)]
        pub kind: String,
        pub created_at: DateTime<FixedOffset>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub items: Vec<ExpenseItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub receipt_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub receipt_url: Option<String>,
    }

    /// One member's part of a receipt line.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseItem {
        pub name: String,
        pub price_minor: i64,
        pub tax_minor: i64,
        pub total_minor: i64,
        pub original_price_minor: i64,
        pub with_tax: bool,
        #[serde(default)]
        pub shared_with: Vec<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Invite {
        pub id: String,
        pub group_id: String,
        pub group_name: String,
        pub admin_id: String,
        pub requester_id: String,
        pub requester_name: String,
        /// `pending`, `accepted` or `rejected`.
        pub status: String,
        pub created_at: DateTime<FixedOffset>,
    }
}

/// Report payloads printed by `--format json`.
pub mod report {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BalanceLine {
        pub member_id: String,
        pub name: String,
        pub net_minor: i64,
        pub net: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SettlementLine {
        pub from_id: String,
        pub from: String,
        pub to_id: String,
        pub to: String,
        pub amount_minor: i64,
        pub amount: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct GroupReport {
        pub group_id: String,
        pub group_name: String,
        pub currency: Currency,
        pub balances: Vec<BalanceLine>,
        /// Ids still in the ledger that are no longer members.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub former_members: Vec<BalanceLine>,
        pub settlements: Vec<SettlementLine>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseLine {
        pub id: String,
        pub title: String,
        pub kind: String,
        pub amount_minor: i64,
        pub amount: String,
        pub paid_by: String,
        pub participants: Vec<String>,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PaymentLine {
        pub id: String,
        /// `pay` or `receive`.
        pub direction: String,
        pub counterparty_id: String,
        pub counterparty: String,
        pub group_id: String,
        pub group_name: String,
        pub currency: Currency,
        pub amount_minor: i64,
        pub amount: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CurrencyTotal {
        pub currency: Currency,
        pub amount_minor: i64,
        pub amount: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PaymentsReport {
        pub member_id: String,
        pub to_pay: Vec<PaymentLine>,
        pub to_receive: Vec<PaymentLine>,
        pub pay_totals: Vec<CurrencyTotal>,
        pub receive_totals: Vec<CurrencyTotal>,
        pub net_totals: Vec<CurrencyTotal>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MonthLine {
        pub year: i32,
        pub month: u32,
        pub totals: Vec<CurrencyTotal>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct GroupSpendingLine {
        pub group_id: String,
        pub group_name: String,
        pub currency: Currency,
        pub amount_minor: i64,
        pub amount: String,
    }

    /// What `stats` prints for the acting member.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct StatsReport {
        pub member_id: String,
        pub net_totals: Vec<CurrencyTotal>,
        /// Oldest month first.
        pub months: Vec<MonthLine>,
        pub groups: Vec<GroupSpendingLine>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ReceiptShareLine {
        pub member_id: String,
        pub name: String,
        pub subtotal_minor: i64,
        pub tax_minor: i64,
        pub total_minor: i64,
        pub total: String,
    }
}

/// Receipt files read by `split-receipt`.
pub mod receipt {
    use super::*;

    fn taxable_by_default() -> bool {
        true
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ReceiptItemInput {
        pub name: String,
        /// Decimal amount in major units, e.g. `"12.50"` or `"12,5"`.
        pub amount: String,
        #[serde(default = "taxable_by_default")]
        pub taxable: bool,
        /// Member ids sharing the item; empty means everybody.
        #[serde(default)]
        pub assigned: Vec<String>,
    }
}
