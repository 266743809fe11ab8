//! Bulk period creation and timetable duplication.
//!
//! Both operations attempt each period independently and never abort early:
//! a period that fails its pre-check (or any validation) is logged,
//! collected in the outcome's `failed` list and excluded from `created`.
//! `copy_timetable` inherits this contract, so a copy can legitimately end
//! up with fewer periods than its source when some of them collide with
//! existing schedules; the `failed` list is how callers observe that.

use crate::{
    core::timetable::{self, NewPeriod, NewTimetable},
    entities::{timetable as timetable_entity, timetable_period},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use tracing::warn;

/// One input that could not be created, with the reason it failed.
#[derive(Debug, Clone)]
pub struct FailedPeriod {
    /// The rejected input
    pub input: NewPeriod,
    /// Why it was rejected
    pub reason: String,
}

/// Result of a bulk period creation: what landed and what did not.
#[derive(Debug, Clone, Default)]
pub struct BulkCreateOutcome {
    /// Periods that were created
    pub created: Vec<timetable_period::Model>,
    /// Inputs that failed, in input order
    pub failed: Vec<FailedPeriod>,
}

/// Attempts each period independently through the period store.
///
/// Per-item failures are logged and collected; the operation itself only
/// fails on the caller's behalf when nothing at all can be attempted (it
/// currently never does).
pub async fn bulk_create_periods(
    db: &DatabaseConnection,
    periods: Vec<NewPeriod>,
) -> Result<BulkCreateOutcome> {
    let mut outcome = BulkCreateOutcome::default();

    for new in periods {
        match timetable::create_period(db, new.clone()).await {
            Ok(created) => outcome.created.push(created),
            Err(e) => {
                warn!(
                    timetable_id = new.timetable_id,
                    day_of_week = new.day_of_week,
                    period_number = new.period_number,
                    error = %e,
                    "Skipping period in bulk create"
                );
                outcome.failed.push(FailedPeriod {
                    input: new,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}

/// Duplicates a timetable onto another section.
///
/// Creates a new timetable named `"Copy of …"` for the target section and
/// feeds every source period through [`bulk_create_periods`], so periods
/// that collide with existing schedules are dropped from the copy and
/// reported in the outcome's `failed` list rather than raising an error.
pub async fn copy_timetable(
    db: &DatabaseConnection,
    source_timetable_id: i64,
    target_section_id: &str,
    academic_year_id: &str,
) -> Result<(timetable_entity::Model, BulkCreateOutcome)> {
    let source = timetable::get_timetable(db, source_timetable_id)
        .await?
        .ok_or(Error::TimetableNotFound {
            id: source_timetable_id,
        })?;
    let source_periods = timetable::get_timetable_periods(db, source_timetable_id).await?;

    let copy_name = format!(
        "Copy of {}",
        source.name.as_deref().unwrap_or(&source.section_id)
    );
    let copy = timetable::create_timetable(
        db,
        NewTimetable {
            tenant_id: source.tenant_id.clone(),
            section_id: target_section_id.to_string(),
            academic_year_id: academic_year_id.to_string(),
            term_id: source.term_id.clone(),
            name: Some(copy_name),
            school_timing_id: source.school_timing_id,
        },
    )
    .await?;

    let inputs: Vec<NewPeriod> = source_periods
        .into_iter()
        .map(|p| NewPeriod {
            timetable_id: copy.id,
            day_of_week: p.day_of_week,
            period_number: p.period_number,
            start_time: p.start_time,
            end_time: p.end_time,
            subject_id: p.subject_id,
            teacher_id: p.teacher_id,
            room_id: p.room_id,
            room_number: p.room_number,
            building: p.building,
            is_active: true,
        })
        .collect();

    let outcome = bulk_create_periods(db, inputs).await?;
    Ok((copy, outcome))
}
