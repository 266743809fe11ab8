//! School timing and break schedule business logic.
//!
//! Provides CRUD over timing configurations and their break schedules, the
//! `school_days` bitmask helpers, and the time/day validation used across
//! the engine. Day-of-week is 0-6 with 0 = Sunday everywhere in this crate
//! (matching `chrono::Weekday::num_days_from_sunday`); time values are
//! normalized to zero-padded `HH:MM:SS` at every store boundary so the
//! fixed-width string comparison in the conflict detector stays sound.

use crate::{
    entities::{BreakSchedule, SchoolTiming, break_schedule, school_timing},
    errors::{Error, Result},
};
use chrono::NaiveTime;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Normalizes a time string to zero-padded `HH:MM:SS`.
///
/// Accepts `HH:MM` or `HH:MM:SS`. Every time value entering the store goes
/// through this function; the conflict detector's lexicographic comparison
/// is only correct over this fixed-width form.
pub fn normalize_time(value: &str) -> Result<String> {
    let parsed = NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| Error::InvalidTime {
            value: value.to_string(),
        })?;
    Ok(parsed.format("%H:%M:%S").to_string())
}

/// Validates that a day-of-week value is in `0..=6` (0 = Sunday).
pub fn validate_day_of_week(day: i32) -> Result<i32> {
    if (0..=6).contains(&day) {
        Ok(day)
    } else {
        Err(Error::InvalidDayOfWeek { value: day })
    }
}

/// Whether weekday `day` (0 = Sunday) is instructional under `mask`.
#[must_use]
pub const fn is_school_day(mask: i32, day: i32) -> bool {
    day >= 0 && day <= 6 && mask & (1 << day) != 0
}

/// Returns `mask` with weekday `day` marked instructional.
#[must_use]
pub const fn set_school_day(mask: i32, day: i32) -> i32 {
    mask | (1 << day)
}

/// Returns `mask` with weekday `day` marked non-instructional.
#[must_use]
pub const fn clear_school_day(mask: i32, day: i32) -> i32 {
    mask & !(1 << day)
}

/// Fields accepted when creating a school timing configuration.
#[derive(Debug, Clone)]
pub struct NewSchoolTiming {
    /// Tenant the timing belongs to
    pub tenant_id: String,
    /// Academic year the timing applies to
    pub academic_year_id: String,
    /// Shift number for multi-shift schools
    pub shift_number: Option<i32>,
    /// Human-readable shift name
    pub shift_name: Option<String>,
    /// Start of the instructional day
    pub start_time: String,
    /// End of the instructional day
    pub end_time: String,
    /// Length of one period in minutes
    pub period_duration_minutes: i32,
    /// Periods per instructional day
    pub total_periods: i32,
    /// 7-bit instructional-day mask, bit 0 = Sunday
    pub school_days: i32,
}

/// Creates a school timing configuration, validating times and the day mask.
pub async fn create_school_timing(
    db: &DatabaseConnection,
    new: NewSchoolTiming,
) -> Result<school_timing::Model> {
    if !(0..128).contains(&new.school_days) {
        return Err(Error::Config {
            message: format!("school_days mask out of range: {}", new.school_days),
        });
    }
    if new.period_duration_minutes <= 0 || new.total_periods <= 0 {
        return Err(Error::Config {
            message: "period_duration_minutes and total_periods must be positive".to_string(),
        });
    }

    let timing = school_timing::ActiveModel {
        tenant_id: Set(new.tenant_id),
        academic_year_id: Set(new.academic_year_id),
        shift_number: Set(new.shift_number),
        shift_name: Set(new.shift_name),
        start_time: Set(normalize_time(&new.start_time)?),
        end_time: Set(normalize_time(&new.end_time)?),
        period_duration_minutes: Set(new.period_duration_minutes),
        total_periods: Set(new.total_periods),
        school_days: Set(new.school_days),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    timing.insert(db).await.map_err(Into::into)
}

/// Finds the timing configuration for a tenant, academic year and shift.
///
/// A `shift_number` of None matches a single-shift configuration (stored
/// shift is NULL).
pub async fn get_school_timing(
    db: &DatabaseConnection,
    tenant_id: &str,
    academic_year_id: &str,
    shift_number: Option<i32>,
) -> Result<Option<school_timing::Model>> {
    let mut query = SchoolTiming::find()
        .filter(school_timing::Column::TenantId.eq(tenant_id))
        .filter(school_timing::Column::AcademicYearId.eq(academic_year_id));

    query = match shift_number {
        Some(shift) => query.filter(school_timing::Column::ShiftNumber.eq(shift)),
        None => query.filter(school_timing::Column::ShiftNumber.is_null()),
    };

    query.one(db).await.map_err(Into::into)
}

/// Lists all timing configurations for a tenant, newest first.
pub async fn list_school_timings(
    db: &DatabaseConnection,
    tenant_id: &str,
) -> Result<Vec<school_timing::Model>> {
    SchoolTiming::find()
        .filter(school_timing::Column::TenantId.eq(tenant_id))
        .order_by_desc(school_timing::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fields accepted when creating a break schedule.
#[derive(Debug, Clone)]
pub struct NewBreakSchedule {
    /// Timing configuration the break belongs to
    pub school_timing_id: i64,
    /// Break name
    pub name: String,
    /// `"break"`, `"activity"`, `"special_period"` or `"assembly"`
    pub break_type: String,
    /// Start of the break
    pub start_time: String,
    /// End of the break
    pub end_time: String,
    /// 7-bit weekday mask, bit 0 = Sunday
    pub days: i32,
    /// Display/processing order
    pub ordering: i32,
    /// Whether attendance is optional
    pub is_optional: bool,
    /// Whether attendance is tracked
    pub track_attendance: bool,
}

/// Creates a break schedule under an existing timing configuration.
pub async fn create_break_schedule(
    db: &DatabaseConnection,
    new: NewBreakSchedule,
) -> Result<break_schedule::Model> {
    let timing = SchoolTiming::find_by_id(new.school_timing_id)
        .one(db)
        .await?;
    if timing.is_none() {
        return Err(Error::SchoolTimingNotFound {
            id: new.school_timing_id,
        });
    }

    let break_model = break_schedule::ActiveModel {
        school_timing_id: Set(new.school_timing_id),
        name: Set(new.name),
        break_type: Set(new.break_type),
        start_time: Set(normalize_time(&new.start_time)?),
        end_time: Set(normalize_time(&new.end_time)?),
        days: Set(new.days),
        ordering: Set(new.ordering),
        is_optional: Set(new.is_optional),
        track_attendance: Set(new.track_attendance),
        ..Default::default()
    };

    break_model.insert(db).await.map_err(Into::into)
}

/// Lists the break schedules of a timing configuration in display order.
pub async fn get_break_schedules(
    db: &DatabaseConnection,
    school_timing_id: i64,
) -> Result<Vec<break_schedule::Model>> {
    BreakSchedule::find()
        .filter(break_schedule::Column::SchoolTimingId.eq(school_timing_id))
        .order_by_asc(break_schedule::Column::Ordering)
        .all(db)
        .await
        .map_err(Into::into)
}
