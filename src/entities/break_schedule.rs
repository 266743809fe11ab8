//! Break schedule entity - Recesses, assemblies and other non-teaching slots.
//!
//! Each break belongs to one school timing and is used as generation context
//! only; breaks are never conflict-checked against periods.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Break schedule database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "break_schedules")]
pub struct Model {
    /// Unique identifier for the break
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the school timing this break belongs to
    pub school_timing_id: i64,
    /// Human-readable name (e.g. "Lunch", "Morning Assembly")
    pub name: String,
    /// Kind of slot: `"break"`, `"activity"`, `"special_period"` or `"assembly"`
    pub break_type: String,
    /// Start of the break, `HH:MM:SS`
    pub start_time: String,
    /// End of the break, `HH:MM:SS`
    pub end_time: String,
    /// 7-bit mask of weekdays the break occurs on, bit 0 = Sunday
    pub days: i32,
    /// Display/processing order within the timing
    pub ordering: i32,
    /// Whether attendance is optional during this slot
    pub is_optional: bool,
    /// Whether attendance is tracked during this slot
    pub track_attendance: bool,
}

/// Defines relationships between BreakSchedule and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each break belongs to one school timing
    #[sea_orm(
        belongs_to = "super::school_timing::Entity",
        from = "Column::SchoolTimingId",
        to = "super::school_timing::Column::Id"
    )]
    SchoolTiming,
}

impl Related<super::school_timing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SchoolTiming.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
