//! Shared-expense ledger core.
//!
//! Groups log expenses; [`calculate_balances`] turns the ledger into a net
//! position per member and [`calculate_settlements`] proposes who pays whom
//! to clear it. [`payments_overview`] and the [`global_net`] family summarize a
//! member across groups. [`MemoryLedger`] keeps groups and join requests in
//! memory and notifies subscribers when a group changes.

pub use balances::{MemberBalance, calculate_balances, calculate_ledger_balances, net_total};
pub use currency::Currency;
pub use error::EngineError;
pub use expense::{Expense, ExpenseItem, ExpenseKind, NewExpense};
pub use filters::{ExpenseFilter, ExpenseRange, filter_expenses};
pub use group::{Group, Member};
pub use invites::{GroupInvite, InviteStatus};
pub use money::{Money, format_money, parse_amount, round2};
pub use payments::{
    PaymentDirection, PaymentItem, PaymentsOverview, UNKNOWN_MEMBER_NAME, payments_overview,
};
pub use receipt::{DEFAULT_TAX_RATE, MemberShare, ReceiptItem, receipt_expenses, split_receipt};
pub use settlements::{Settlement, calculate_settlements};
pub use stats::{GroupSpending, MonthlySpending, global_net, monthly_spending, spending_by_group};
pub use store::{
    GroupCallback, GroupRepository, LedgerSnapshot, MemoryLedger, MemoryLedgerBuilder,
    SubscriptionId,
};

mod balances;
mod currency;
mod error;
mod expense;
mod filters;
mod group;
mod invites;
mod money;
mod payments;
mod receipt;
mod settlements;
mod stats;
mod store;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
