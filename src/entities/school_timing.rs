//! School timing entity - The bell schedule for one tenant, academic year and shift.
//!
//! Holds the instructional day window, period length and count, and the
//! `school_days` bitmask (bit *i* set means weekday *i* is instructional,
//! 0 = Sunday). Times are zero-padded `HH:MM:SS` strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// School timing database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "school_timings")]
pub struct Model {
    /// Unique identifier for the timing configuration
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tenant (school) this timing belongs to
    pub tenant_id: String,
    /// Academic year this timing applies to
    pub academic_year_id: String,
    /// Shift number when the school runs multiple shifts, None for single-shift
    pub shift_number: Option<i32>,
    /// Human-readable shift name (e.g. "Morning")
    pub shift_name: Option<String>,
    /// Start of the instructional day, `HH:MM:SS`
    pub start_time: String,
    /// End of the instructional day, `HH:MM:SS`
    pub end_time: String,
    /// Length of one period in minutes
    pub period_duration_minutes: i32,
    /// Number of periods in one instructional day
    pub total_periods: i32,
    /// 7-bit mask of instructional weekdays, bit 0 = Sunday
    pub school_days: i32,
    /// When this configuration was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between SchoolTiming and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One timing configuration has many break schedules
    #[sea_orm(has_many = "super::break_schedule::Entity")]
    BreakSchedules,
}

impl Related<super::break_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BreakSchedules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
