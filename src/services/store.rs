// src/services/store.rs

use crate::{
    errors::AppResult,
    models::{FiscalDate, MonthlyPeriod, NewPeriod, ReportShell},
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Key for `pg_advisory_xact_lock`; serialises period creation across
/// the request path and the background job.
const PERIOD_LOCK_KEY: i64 = 0x5045_5249_4f44; // "PERIOD"

/// Entry point to the planning store. Every scheduler invocation works
/// inside one unit of work obtained from `begin`.
#[async_trait]
pub trait PeriodStore: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn PeriodTx + '_>>;
}

/// An open unit of work. Nothing is visible to other callers until `commit`;
/// dropping it uncommitted discards every change.
#[async_trait]
pub trait PeriodTx: Send {
    async fn find_period(&mut self, slot: FiscalDate) -> AppResult<Option<MonthlyPeriod>>;
    async fn find_active_period(&mut self, slot: FiscalDate) -> AppResult<Option<MonthlyPeriod>>;
    async fn create_period(&mut self, data: NewPeriod) -> AppResult<MonthlyPeriod>;
    async fn archive_period(&mut self, id: Uuid) -> AppResult<MonthlyPeriod>;
    async fn list_subordinate_user_ids(&mut self) -> AppResult<Vec<Uuid>>;
    async fn create_report_shell(&mut self, period_id: Uuid, user_id: Uuid)
    -> AppResult<ReportShell>;
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

// ─── Postgres ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgPeriodStore {
    db: PgPool,
    subordinate_role: String,
}

impl PgPeriodStore {
    pub fn new(db: PgPool, subordinate_role: impl Into<String>) -> Self {
        Self {
            db,
            subordinate_role: subordinate_role.into(),
        }
    }
}

pub struct PgPeriodTx {
    tx: Transaction<'static, Postgres>,
    subordinate_role: String,
}

pub(crate) const PERIOD_COLUMNS: &str = r#"id, title, description, fiscal_month, fiscal_year,
    target_amount, deadline, status, created_at, updated_at"#;

pub(crate) const REPORT_COLUMNS: &str = r#"id, period_id, user_id, status, achieved_amount,
    progress_percentage, submitted_at, created_at"#;

#[async_trait]
impl PeriodStore for PgPeriodStore {
    async fn begin(&self) -> AppResult<Box<dyn PeriodTx + '_>> {
        let mut tx = self.db.begin().await?;

        // Held until commit/rollback; a concurrent invocation waits here and
        // then observes whatever the first one created.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(PERIOD_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PgPeriodTx {
            tx,
            subordinate_role: self.subordinate_role.clone(),
        }))
    }
}

#[async_trait]
impl PeriodTx for PgPeriodTx {
    async fn find_period(&mut self, slot: FiscalDate) -> AppResult<Option<MonthlyPeriod>> {
        let period = sqlx::query_as::<_, MonthlyPeriod>(&format!(
            "SELECT {PERIOD_COLUMNS} FROM monthly_periods WHERE fiscal_month = $1 AND fiscal_year = $2"
        ))
        .bind(slot.month as i32)
        .bind(slot.year)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(period)
    }

    async fn find_active_period(&mut self, slot: FiscalDate) -> AppResult<Option<MonthlyPeriod>> {
        let period = sqlx::query_as::<_, MonthlyPeriod>(&format!(
            r#"SELECT {PERIOD_COLUMNS} FROM monthly_periods
               WHERE fiscal_month = $1 AND fiscal_year = $2 AND status = 'active'"#
        ))
        .bind(slot.month as i32)
        .bind(slot.year)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(period)
    }

    async fn create_period(&mut self, data: NewPeriod) -> AppResult<MonthlyPeriod> {
        let period = sqlx::query_as::<_, MonthlyPeriod>(&format!(
            r#"INSERT INTO monthly_periods (
                id, title, description, fiscal_month, fiscal_year,
                target_amount, deadline, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'active', NOW(), NOW())
            RETURNING {PERIOD_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.fiscal_date.month as i32)
        .bind(data.fiscal_date.year)
        .bind(data.target_amount)
        .bind(data.deadline)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(period)
    }

    async fn archive_period(&mut self, id: Uuid) -> AppResult<MonthlyPeriod> {
        let period = sqlx::query_as::<_, MonthlyPeriod>(&format!(
            r#"UPDATE monthly_periods SET status = 'archived', updated_at = NOW()
               WHERE id = $1 RETURNING {PERIOD_COLUMNS}"#
        ))
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(period)
    }

    async fn list_subordinate_user_ids(&mut self) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE role = $1 ORDER BY created_at",
        )
        .bind(&self.subordinate_role)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(ids)
    }

    async fn create_report_shell(
        &mut self,
        period_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<ReportShell> {
        let shell = sqlx::query_as::<_, ReportShell>(&format!(
            r#"INSERT INTO report_shells (id, period_id, user_id, status, created_at)
               VALUES ($1, $2, $3, 'pending', NOW())
               RETURNING {REPORT_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(period_id)
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(shell)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

// ─── In-memory (tests) ────────────────────────────────────────────────────────

#[cfg(test)]
pub mod memory {
    use super::*;
    use crate::{
        errors::AppError,
        models::{PeriodStatus, ReportStatus},
    };
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use tokio::sync::{Mutex, OwnedMutexGuard};

    #[derive(Debug, Clone, Default)]
    pub struct MemoryState {
        pub periods: Vec<MonthlyPeriod>,
        pub reports: Vec<ReportShell>,
        pub subordinates: Vec<Uuid>,
        /// Fail the n-th report shell insert (0-based) within a unit of work
        pub fail_report_shell_at: Option<usize>,
    }

    /// Serialises units of work behind one async mutex, mirroring the
    /// advisory lock the Postgres store takes.
    #[derive(Clone, Default)]
    pub struct MemoryPeriodStore {
        state: Arc<Mutex<MemoryState>>,
    }

    impl MemoryPeriodStore {
        pub fn with_subordinates(count: usize) -> Self {
            let state = MemoryState {
                subordinates: (0..count).map(|_| Uuid::new_v4()).collect(),
                ..MemoryState::default()
            };
            Self {
                state: Arc::new(Mutex::new(state)),
            }
        }

        pub async fn snapshot(&self) -> MemoryState {
            self.state.lock().await.clone()
        }

        pub async fn update(&self, f: impl FnOnce(&mut MemoryState)) {
            f(&mut *self.state.lock().await);
        }
    }

    pub struct MemoryPeriodTx {
        guard: OwnedMutexGuard<MemoryState>,
        staged: MemoryState,
        shells_created: usize,
    }

    #[async_trait]
    impl PeriodStore for MemoryPeriodStore {
        async fn begin(&self) -> AppResult<Box<dyn PeriodTx + '_>> {
            let guard = Arc::clone(&self.state).lock_owned().await;
            let staged = guard.clone();
            Ok(Box::new(MemoryPeriodTx {
                guard,
                staged,
                shells_created: 0,
            }))
        }
    }

    #[async_trait]
    impl PeriodTx for MemoryPeriodTx {
        async fn find_period(&mut self, slot: FiscalDate) -> AppResult<Option<MonthlyPeriod>> {
            Ok(self
                .staged
                .periods
                .iter()
                .find(|p| p.fiscal_date() == slot)
                .cloned())
        }

        async fn find_active_period(
            &mut self,
            slot: FiscalDate,
        ) -> AppResult<Option<MonthlyPeriod>> {
            Ok(self
                .staged
                .periods
                .iter()
                .find(|p| p.fiscal_date() == slot && p.status == PeriodStatus::Active)
                .cloned())
        }

        async fn create_period(&mut self, data: NewPeriod) -> AppResult<MonthlyPeriod> {
            if self
                .staged
                .periods
                .iter()
                .any(|p| p.fiscal_date() == data.fiscal_date)
            {
                return Err(AppError::Conflict(format!(
                    "period {}/{} already exists",
                    data.fiscal_date.month, data.fiscal_date.year
                )));
            }
            let now = Utc::now();
            let period = MonthlyPeriod {
                id: Uuid::new_v4(),
                title: data.title,
                description: data.description,
                fiscal_month: data.fiscal_date.month as i32,
                fiscal_year: data.fiscal_date.year,
                target_amount: data.target_amount,
                deadline: data.deadline,
                status: PeriodStatus::Active,
                created_at: now,
                updated_at: now,
            };
            self.staged.periods.push(period.clone());
            Ok(period)
        }

        async fn archive_period(&mut self, id: Uuid) -> AppResult<MonthlyPeriod> {
            let period = self
                .staged
                .periods
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(AppError::Persistence(sqlx::Error::RowNotFound))?;
            period.status = PeriodStatus::Archived;
            period.updated_at = Utc::now();
            Ok(period.clone())
        }

        async fn list_subordinate_user_ids(&mut self) -> AppResult<Vec<Uuid>> {
            Ok(self.staged.subordinates.clone())
        }

        async fn create_report_shell(
            &mut self,
            period_id: Uuid,
            user_id: Uuid,
        ) -> AppResult<ReportShell> {
            if self.staged.fail_report_shell_at == Some(self.shells_created) {
                return Err(AppError::Persistence(sqlx::Error::PoolTimedOut));
            }
            self.shells_created += 1;

            let shell = ReportShell {
                id: Uuid::new_v4(),
                period_id,
                user_id,
                status: ReportStatus::Pending,
                achieved_amount: Decimal::ZERO,
                progress_percentage: Decimal::ZERO,
                submitted_at: None,
                created_at: Utc::now(),
            };
            self.staged.reports.push(shell.clone());
            Ok(shell)
        }

        async fn commit(self: Box<Self>) -> AppResult<()> {
            let mut this = self;
            *this.guard = std::mem::take(&mut this.staged);
            Ok(())
        }
    }
}
