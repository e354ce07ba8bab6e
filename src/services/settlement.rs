//! Periodic settlement engine.
//!
//! Two jobs run at each monthly boundary, both idempotent under re-run for
//! the same period:
//!
//! 1. **Counter reset** — zero every non-archived student's per-period
//!    session/absence counters and renewal flag, and every teacher's
//!    session/absence/earnings counters.
//! 2. **Financial aggregation** — fold the month's transactions into one
//!    `AccountingSummary`, upserted by year-month so a re-run overwrites
//!    rather than double-counts.
//!
//! The engine never runs concurrently with itself: an in-flight run makes a
//! new invocation report `Skipped`. Failures are logged per period and leave
//! any previously stored summary untouched.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::Mutex;

use super::error::BookingResult;
use crate::db::repository::{
    FinanceRepository, FullRepository, StudentRepository, TeacherRepository,
};
use crate::models::{
    AccountingSummary, MonthKey, StudentCounters, TeacherCounters, TransactionCategory,
};

/// Result of asking the engine to run.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    /// Both jobs (or the requested job) completed; the stored summary.
    Completed(AccountingSummary),
    /// A run was already in flight; nothing was done.
    Skipped,
}

/// The settlement engine. Cheap to clone; clones share the overlap guard.
#[derive(Clone)]
pub struct SettlementEngine {
    repo: Arc<dyn FullRepository>,
    run_guard: Arc<Mutex<()>>,
    last_settled: Arc<parking_lot::Mutex<Option<MonthKey>>>,
}

impl SettlementEngine {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self {
            repo,
            run_guard: Arc::new(Mutex::new(())),
            last_settled: Arc::new(parking_lot::Mutex::new(None)),
        }
    }

    /// Full monthly settlement: counter reset, then financial aggregation.
    pub async fn run_monthly_settlement(
        &self,
        month: MonthKey,
    ) -> BookingResult<SettlementOutcome> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            warn!("Settlement for {} skipped: a run is already in flight", month);
            return Ok(SettlementOutcome::Skipped);
        };

        let (students, teachers) = self.reset_period_counters().await?;
        info!(
            "Settlement {}: reset counters for {} students, {} teachers",
            month, students, teachers
        );

        let summary = self.aggregate_month_inner(month).await?;
        Ok(SettlementOutcome::Completed(summary))
    }

    /// Financial aggregation only (job 2), as used by the manual trigger.
    pub async fn aggregate_month(&self, month: MonthKey) -> BookingResult<SettlementOutcome> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            warn!("Aggregation for {} skipped: a run is already in flight", month);
            return Ok(SettlementOutcome::Skipped);
        };

        let summary = self.aggregate_month_inner(month).await?;
        Ok(SettlementOutcome::Completed(summary))
    }

    /// Zero per-period counters on all non-archived students and all
    /// teachers. Returns how many records of each were touched.
    async fn reset_period_counters(&self) -> BookingResult<(usize, usize)> {
        let mut students_touched = 0;
        for mut student in self.repo.list_students().await? {
            if student.is_archived {
                continue;
            }
            if student.counters != StudentCounters::default() {
                student.counters = StudentCounters::default();
                self.repo.update_student(&student).await?;
            }
            students_touched += 1;
        }

        let mut teachers_touched = 0;
        for mut teacher in self.repo.list_teachers().await? {
            if teacher.counters != TeacherCounters::default() {
                teacher.counters = TeacherCounters::default();
                self.repo.update_teacher(&teacher).await?;
            }
            teachers_touched += 1;
        }

        Ok((students_touched, teachers_touched))
    }

    async fn aggregate_month_inner(&self, month: MonthKey) -> BookingResult<AccountingSummary> {
        let transactions = self.repo.transactions_in_month(month).await?;

        let mut revenue = 0.0;
        let mut expenses = 0.0;
        let mut salaries = 0.0;
        let mut charity = 0.0;
        for tx in &transactions {
            match tx.category {
                TransactionCategory::Revenue => revenue += tx.amount,
                TransactionCategory::Expense => expenses += tx.amount,
                TransactionCategory::Salary => salaries += tx.amount,
                TransactionCategory::Charity => charity += tx.amount,
            }
        }

        let summary = AccountingSummary {
            year: month.year,
            month: month.month,
            revenue,
            expenses,
            salaries,
            charity,
            net_profit: revenue - (expenses + salaries + charity),
            computed_at: chrono::Utc::now(),
        };
        self.repo.upsert_summary(&summary).await?;

        info!(
            "Settlement {}: {} transactions, net profit {:.2}",
            month,
            transactions.len(),
            summary.net_profit
        );
        Ok(summary)
    }

    /// Spawn the scheduled driver: ticks at `check_interval` and settles the
    /// month that just ended whenever the calendar month changes. Months that
    /// ended before startup are left to the manual trigger.
    pub fn spawn_scheduler(&self, check_interval: Duration) -> tokio::task::JoinHandle<()> {
        let engine = self.clone();
        *engine.last_settled.lock() = Some(previous_month(chrono::Utc::now().date_naive()));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(check_interval);
            // The first tick fires immediately; skip it so startup is quiet.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let previous = previous_month(chrono::Utc::now().date_naive());
                let already_done = *engine.last_settled.lock() == Some(previous);
                if already_done {
                    continue;
                }
                match engine.run_monthly_settlement(previous).await {
                    Ok(SettlementOutcome::Completed(_)) => {
                        *engine.last_settled.lock() = Some(previous);
                    }
                    Ok(SettlementOutcome::Skipped) => {
                        // Another run holds the guard; retry next tick.
                    }
                    Err(e) => {
                        error!("Scheduled settlement for {} failed: {}", previous, e);
                    }
                }
            }
        })
    }
}

/// The calendar month preceding the one containing `date`.
fn previous_month(date: chrono::NaiveDate) -> MonthKey {
    let current = MonthKey::of(date);
    MonthKey::of(current.first_day() - chrono::Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::{
        FinanceRepository, StudentRepository, TeacherRepository,
    };
    use crate::models::{
        Student, StudentId, SubscriptionType, Teacher, TeacherId, Transaction, TransactionId,
    };

    fn tx(date: (i32, u32, u32), category: TransactionCategory, amount: f64) -> Transaction {
        Transaction {
            id: TransactionId(0),
            date: chrono::NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            category,
            amount,
            description: String::new(),
        }
    }

    async fn engine() -> (SettlementEngine, Arc<LocalRepository>) {
        let repo = Arc::new(LocalRepository::new());
        let full: Arc<dyn FullRepository> = repo.clone();
        (SettlementEngine::new(full), repo)
    }

    #[tokio::test]
    async fn test_aggregation_groups_by_category() {
        let (engine, repo) = engine().await;
        for t in [
            tx((2024, 3, 5), TransactionCategory::Revenue, 1000.0),
            tx((2024, 3, 12), TransactionCategory::Revenue, 500.0),
            tx((2024, 3, 20), TransactionCategory::Expense, 200.0),
            tx((2024, 3, 25), TransactionCategory::Salary, 600.0),
            tx((2024, 3, 28), TransactionCategory::Charity, 100.0),
            // Outside the period
            tx((2024, 4, 1), TransactionCategory::Revenue, 9999.0),
        ] {
            repo.add_transaction(&t).await.unwrap();
        }

        let month = MonthKey::new(2024, 3).unwrap();
        let outcome = engine.run_monthly_settlement(month).await.unwrap();
        let SettlementOutcome::Completed(summary) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(summary.revenue, 1500.0);
        assert_eq!(summary.expenses, 200.0);
        assert_eq!(summary.salaries, 600.0);
        assert_eq!(summary.charity, 100.0);
        assert_eq!(summary.net_profit, 600.0);
    }

    #[tokio::test]
    async fn test_rerun_same_month_does_not_double_count() {
        let (engine, repo) = engine().await;
        repo.add_transaction(&tx((2024, 3, 5), TransactionCategory::Revenue, 1000.0))
            .await
            .unwrap();

        let month = MonthKey::new(2024, 3).unwrap();
        engine.run_monthly_settlement(month).await.unwrap();
        engine.run_monthly_settlement(month).await.unwrap();

        let stored = repo.get_summary(month).await.unwrap().unwrap();
        assert_eq!(stored.revenue, 1000.0);
        assert_eq!(stored.net_profit, 1000.0);
    }

    #[tokio::test]
    async fn test_counter_reset_skips_archived_students() {
        let (engine, repo) = engine().await;

        let mut active = Student::new(
            StudentId(0),
            "Omar",
            "0100000000",
            SubscriptionType::HalfHourFour,
        );
        active.counters.sessions_this_period = 3;
        active.counters.renewal_due = true;
        let active_id = repo.store_student(&active).await.unwrap();

        let mut archived = Student::new(
            StudentId(0),
            "Ali",
            "0100000001",
            SubscriptionType::HalfHourFour,
        );
        archived.is_archived = true;
        archived.counters.sessions_this_period = 5;
        let archived_id = repo.store_student(&archived).await.unwrap();

        let mut teacher = Teacher::new(TeacherId(0), "Huda", 50.0, &[]);
        teacher.counters.earnings_this_period = 400.0;
        let teacher_id = repo.store_teacher(&teacher).await.unwrap();

        engine
            .run_monthly_settlement(MonthKey::new(2024, 3).unwrap())
            .await
            .unwrap();

        let active = repo.get_student(active_id).await.unwrap();
        assert_eq!(active.counters, StudentCounters::default());

        let archived = repo.get_student(archived_id).await.unwrap();
        assert_eq!(archived.counters.sessions_this_period, 5);

        let teacher = repo.get_teacher(teacher_id).await.unwrap();
        assert_eq!(teacher.counters, TeacherCounters::default());
    }

    #[tokio::test]
    async fn test_overlapping_run_is_skipped() {
        let (engine, _repo) = engine().await;
        let month = MonthKey::new(2024, 3).unwrap();

        let _held = engine.run_guard.clone().lock_owned().await;
        let outcome = engine.run_monthly_settlement(month).await.unwrap();
        assert_eq!(outcome, SettlementOutcome::Skipped);
    }

    #[test]
    fn test_previous_month_wraps_january() {
        let jan = chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(previous_month(jan), MonthKey::new(2023, 12).unwrap());
    }
}
