// src/services/rollover.rs

use crate::{
    errors::AppResult,
    models::{FiscalDate, MonthlyPeriod, NewPeriod, RolloverOutcome},
    services::{
        calendar::{Clock, current_fiscal_date, fiscal_month_name},
        deadline::deadline_for,
        store::{PeriodStore, PeriodTx},
    },
};
use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info, warn};

/// Deadline is the 18th; the next period opens on the 20th (two-day grace).
pub const ROLLOVER_DAY: u32 = 20;

/// Make sure a period exists for the fiscal month containing `now`.
/// Idempotent: an existing period is returned untouched, whatever its status.
pub async fn ensure_current_period<S>(store: &S, now: NaiveDateTime) -> AppResult<MonthlyPeriod>
where
    S: PeriodStore + ?Sized,
{
    let current = current_fiscal_date(now);
    let mut tx = store.begin().await?;

    let period = ensure_period_in(tx.as_mut(), current).await?;
    tx.commit().await?;

    Ok(period)
}

/// Archive the active period once the grace window has passed and open the
/// following fiscal month. Safe to call repeatedly; every step re-checks
/// existence before creating.
pub async fn rollover_if_due<S>(store: &S, now: NaiveDateTime) -> AppResult<RolloverOutcome>
where
    S: PeriodStore + ?Sized,
{
    let current = current_fiscal_date(now);
    let mut tx = store.begin().await?;

    let Some(active) = tx.find_active_period(current).await? else {
        let period = ensure_period_in(tx.as_mut(), current).await?;
        tx.commit().await?;
        return Ok(RolloverOutcome::Ensured { period });
    };

    if now.day() < ROLLOVER_DAY {
        debug!(
            "Day {} of month; period {}/{} stays active",
            now.day(),
            current.month,
            current.year
        );
        tx.commit().await?;
        return Ok(RolloverOutcome::NotDue { period: active });
    }

    info!(
        "Day {} reached, archiving period {}/{}",
        now.day(),
        current.month,
        current.year
    );
    let archived = tx.archive_period(active.id).await?;

    let next_slot = current.next();
    let (next, next_created) = match tx.find_period(next_slot).await? {
        Some(existing) => {
            debug!(
                "Period {}/{} already exists",
                next_slot.month, next_slot.year
            );
            (existing, false)
        }
        None => {
            let created = create_period_in(tx.as_mut(), next_slot, archived.target_amount).await?;
            (created, true)
        }
    };

    tx.commit().await?;

    Ok(RolloverOutcome::RolledOver {
        archived,
        next,
        next_created,
    })
}

async fn ensure_period_in(tx: &mut dyn PeriodTx, slot: FiscalDate) -> AppResult<MonthlyPeriod> {
    if let Some(existing) = tx.find_period(slot).await? {
        debug!("Period already exists for {}/{}", slot.month, slot.year);
        return Ok(existing);
    }

    let target_amount = tx
        .find_period(slot.previous())
        .await?
        .map(|p| p.target_amount)
        .unwrap_or(Decimal::ZERO);

    create_period_in(tx, slot, target_amount).await
}

/// Insert the period and one pending report shell per subordinate user.
/// Runs inside the caller's unit of work so all rows land together or not at all.
async fn create_period_in(
    tx: &mut dyn PeriodTx,
    slot: FiscalDate,
    target_amount: Decimal,
) -> AppResult<MonthlyPeriod> {
    let deadline = deadline_for(slot)?;
    let month_name = fiscal_month_name(slot.month)
        .map(|n| n.english)
        .unwrap_or_else(|| slot.month.to_string());

    let period = tx
        .create_period(NewPeriod {
            title: format!("Monthly Plan - {} {}", month_name, slot.year),
            description: format!(
                "Auto-generated monthly plan for fiscal month {} of {}",
                slot.month, slot.year
            ),
            fiscal_date: slot,
            target_amount,
            deadline: deadline.gregorian_date,
        })
        .await?;

    let user_ids = tx.list_subordinate_user_ids().await?;
    for user_id in &user_ids {
        tx.create_report_shell(period.id, *user_id).await?;
    }

    info!(
        "Created period {}/{} (target {}, deadline {}) with {} report shells",
        slot.month,
        slot.year,
        target_amount,
        deadline.gregorian_date,
        user_ids.len()
    );

    Ok(period)
}

/// Background task: ticks every `interval` and rolls the period over when due.
/// Failures are logged and retried on the next tick.
pub fn spawn_rollover_job<S>(
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    interval: Duration,
) -> tokio::task::JoinHandle<()>
where
    S: PeriodStore + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let now = clock.now();

            match rollover_if_due(store.as_ref(), now).await {
                Ok(RolloverOutcome::RolledOver { next, .. }) => info!(
                    "Rollover complete, active period is now {}/{}",
                    next.fiscal_month, next.fiscal_year
                ),
                Ok(_) => debug!("Rollover check at {}: nothing to do", now),
                Err(e) if e.is_retryable() => {
                    warn!("Rollover failed, retrying next tick: {}", e)
                }
                Err(e) => error!("Rollover failed: {}", e),
            }
        }
    })
}
