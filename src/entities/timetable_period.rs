//! Timetable period entity - One scheduled slot within a timetable.
//!
//! A period is a subject taught at a given day/time, optionally with a
//! teacher and a room. The room can be referenced by id or by free-text
//! room number/building; neither is enforced over the other. Core
//! invariant: no two active periods with the same teacher (or room), same
//! day of week and overlapping time ranges may coexist across timetables.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Timetable period database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timetable_periods")]
pub struct Model {
    /// Unique identifier for the period
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the timetable this period belongs to
    pub timetable_id: i64,
    /// Day of week, 0-6 with 0 = Sunday
    pub day_of_week: i32,
    /// Position within the day, 1-based
    pub period_number: i32,
    /// Start of the slot, `HH:MM:SS`
    pub start_time: String,
    /// End of the slot, `HH:MM:SS`
    pub end_time: String,
    /// Subject taught in this slot
    pub subject_id: String,
    /// Teacher assigned to this slot, None when unassigned
    pub teacher_id: Option<String>,
    /// Room assigned by id, None when unassigned or referenced by free text
    pub room_id: Option<i64>,
    /// Free-text room number, used when no room id is recorded
    pub room_number: Option<String>,
    /// Free-text building, used alongside `room_number`
    pub building: Option<String>,
    /// Whether the period is in effect; inactive periods are invisible to
    /// the conflict detector
    pub is_active: bool,
}

/// Defines relationships between TimetablePeriod and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each period belongs to one timetable
    #[sea_orm(
        belongs_to = "super::timetable::Entity",
        from = "Column::TimetableId",
        to = "super::timetable::Column::Id"
    )]
    Timetable,
}

impl Related<super::timetable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Timetable.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
