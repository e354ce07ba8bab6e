//! Financial transactions and monthly accounting summaries.

use serde::{Deserialize, Serialize};

/// Transaction identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub i64);

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category a ledger transaction is aggregated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    Revenue,
    Expense,
    Salary,
    Charity,
}

impl TransactionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCategory::Revenue => "revenue",
            TransactionCategory::Expense => "expense",
            TransactionCategory::Salary => "salary",
            TransactionCategory::Charity => "charity",
        }
    }
}

/// One financial ledger record. Written by external flows; the settlement
/// engine only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub date: chrono::NaiveDate,
    pub category: TransactionCategory,
    pub amount: f64,
    pub description: String,
}

/// Calendar month key for settlement periods.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Create a month key, validating the month number.
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        if !(1..=12).contains(&month) {
            return Err(format!("Invalid month: {}", month));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given date.
    pub fn of(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month.
    pub fn first_day(&self) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated year-month always has a first day")
    }

    /// First day of the following month (exclusive period end).
    pub fn next(&self) -> MonthKey {
        if self.month == 12 {
            MonthKey {
                year: self.year + 1,
                month: 1,
            }
        } else {
            MonthKey {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Whether the date falls inside `[first_day, next.first_day)`.
    pub fn contains(&self, date: chrono::NaiveDate) -> bool {
        date >= self.first_day() && date < self.next().first_day()
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Aggregated financials for one calendar month.
///
/// Written only by the settlement engine as an idempotent upsert keyed by
/// `(year, month)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingSummary {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
    pub expenses: f64,
    pub salaries: f64,
    pub charity: f64,
    pub net_profit: f64,
    pub computed_at: chrono::DateTime<chrono::Utc>,
}

impl AccountingSummary {
    pub fn month_key(&self) -> MonthKey {
        MonthKey {
            year: self.year,
            month: self.month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_key_validation() {
        assert!(MonthKey::new(2024, 0).is_err());
        assert!(MonthKey::new(2024, 13).is_err());
        assert!(MonthKey::new(2024, 12).is_ok());
    }

    #[test]
    fn test_month_key_next_wraps_year() {
        let december = MonthKey::new(2024, 12).unwrap();
        assert_eq!(december.next(), MonthKey::new(2025, 1).unwrap());
        let june = MonthKey::new(2024, 6).unwrap();
        assert_eq!(june.next(), MonthKey::new(2024, 7).unwrap());
    }

    #[test]
    fn test_month_key_contains_bounds() {
        let key = MonthKey::new(2024, 2).unwrap();
        let first = chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let leap_last = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let march = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        assert!(key.contains(first));
        assert!(key.contains(leap_last));
        assert!(!key.contains(march));
    }

    #[test]
    fn test_month_key_display() {
        assert_eq!(MonthKey::new(2024, 3).unwrap().to_string(), "2024-03");
    }
}
