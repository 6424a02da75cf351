//! Expense listing filters: a free-text query plus a time window.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Expense, Group, util::normalize_key};

/// How far back an expense listing reaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseRange {
    Day,
    Week,
    #[default]
    Month,
    All,
}

impl ExpenseRange {
    /// Oldest `created_at` still inside the window, `None` for [`ExpenseRange::All`].
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::All => return None,
        };
        Some(now - Duration::days(days))
    }
}

impl FromStr for ExpenseRange {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" | "day" => Ok(Self::Day),
            "7d" | "week" => Ok(Self::Week),
            "30d" | "month" => Ok(Self::Month),
            "all" => Ok(Self::All),
            other => Err(EngineError::InvalidName(format!("invalid range: {other}"))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub query: Option<String>,
    pub range: ExpenseRange,
}

impl ExpenseFilter {
    pub fn new(query: Option<&str>, range: ExpenseRange) -> Self {
        Self {
            query: query.map(ToString::to_string),
            range,
        }
    }
}

/// Expenses of `group` matching `filter`, newest first.
///
/// The query matches the title, the payer's name or the participants' names
/// (joined with a space), ignoring case and accents. Ids without a declared
/// member contribute an empty name.
pub fn filter_expenses<'a>(
    group: &'a Group,
    filter: &ExpenseFilter,
    now: DateTime<Utc>,
) -> Vec<&'a Expense> {
    let cutoff = filter.range.cutoff(now);
    let query = filter
        .query
        .as_deref()
        .map(normalize_key)
        .filter(|q| !q.is_empty());
    let name_key = |member_id: &str| normalize_key(group.member_name(member_id).unwrap_or(""));

    let mut expenses: Vec<&Expense> = group
        .expenses
        .iter()
        .filter(|expense| cutoff.is_none_or(|cutoff| expense.created_at >= cutoff))
        .filter(|expense| {
            let Some(query) = query.as_deref() else {
                return true;
            };
            let participants = expense
                .participant_ids
                .iter()
                .map(|id| name_key(id.as_str()))
                .collect::<Vec<_>>()
                .join(" ");
            normalize_key(&expense.title).contains(query)
                || name_key(expense.paid_by_id.as_str()).contains(query)
                || participants.contains(query)
        })
        .collect();

    expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    expenses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Currency, ExpenseKind, Member, Money};

    fn expense(
        id: &str,
        title: &str,
        paid_by: &str,
        age_days: i64,
        now: DateTime<Utc>,
    ) -> Expense {
        Expense {
            id: id.to_string(),
            title: title.to_string(),
            amount: Money::new(10_00),
            paid_by_id: paid_by.to_string(),
            participant_ids: vec!["ana".to_string(), "jose".to_string()],
            kind: ExpenseKind::Expense,
            created_at: now - Duration::days(age_days),
            items: Vec::new(),
            receipt_id: None,
            receipt_url: None,
        }
    }

    fn group(now: DateTime<Utc>) -> Group {
        Group {
            id: "g".to_string(),
            name: "Piso".to_string(),
            currency: Currency::Mxn,
            members: vec![Member::new("ana", "Ana"), Member::new("jose", "José")],
            expenses: vec![
                expense("old", "Luz", "ana", 45, now),
                expense("week", "Súper", "jose", 5, now),
                expense("today", "Café", "ana", 0, now),
            ],
            admin_id: "ana".to_string(),
            invite_code: "CODE".to_string(),
        }
    }

    fn ids(expenses: Vec<&Expense>) -> Vec<&str> {
        expenses.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn range_limits_and_sorts_newest_first() {
        let now = Utc::now();
        let group = group(now);

        let month = filter_expenses(&group, &ExpenseFilter::default(), now);
        assert_eq!(ids(month), vec!["today", "week"]);

        let all = filter_expenses(&group, &ExpenseFilter::new(None, ExpenseRange::All), now);
        assert_eq!(ids(all), vec!["today", "week", "old"]);

        let day = filter_expenses(&group, &ExpenseFilter::new(None, ExpenseRange::Day), now);
        assert_eq!(ids(day), vec!["today"]);
    }

    #[test]
    fn query_ignores_case_and_accents() {
        let now = Utc::now();
        let group = group(now);

        let filter = ExpenseFilter::new(Some("super"), ExpenseRange::All);
        assert_eq!(ids(filter_expenses(&group, &filter, now)), vec!["week"]);

        let filter = ExpenseFilter::new(Some("CAFÉ"), ExpenseRange::All);
        assert_eq!(ids(filter_expenses(&group, &filter, now)), vec!["today"]);
    }

    #[test]
    fn query_matches_payer_and_participant_names() {
        let now = Utc::now();
        let group = group(now);

        // José takes part in every expense
        let filter = ExpenseFilter::new(Some("jose"), ExpenseRange::All);
        assert_eq!(ids(filter_expenses(&group, &filter, now)), vec!["today", "week", "old"]);

        // joined participant names
        let filter = ExpenseFilter::new(Some("ana jose"), ExpenseRange::All);
        assert_eq!(filter_expenses(&group, &filter, now).len(), 3);

        let filter = ExpenseFilter::new(Some("nobody"), ExpenseRange::All);
        assert!(filter_expenses(&group, &filter, now).is_empty());
    }

    #[test]
    fn blank_query_matches_everything() {
        let now = Utc::now();
        let group = group(now);
        let filter = ExpenseFilter::new(Some("   "), ExpenseRange::All);
        assert_eq!(filter_expenses(&group, &filter, now).len(), 3);
    }

    #[test]
    fn range_parses_short_labels() {
        assert_eq!("1d".parse::<ExpenseRange>().unwrap(), ExpenseRange::Day);
        assert_eq!("7D".parse::<ExpenseRange>().unwrap(), ExpenseRange::Week);
        assert_eq!("all".parse::<ExpenseRange>().unwrap(), ExpenseRange::All);
        assert!("2w".parse::<ExpenseRange>().is_err());
    }
}
