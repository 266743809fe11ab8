//! Teacher availability entity - When a teacher can be scheduled.
//!
//! One row is a teacher x academic-year x day-of-week window with optional
//! per-day/per-week period caps. Advisory context for generation; the
//! conflict detector does not enforce it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Teacher availability database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teacher_availabilities")]
pub struct Model {
    /// Unique identifier for the availability window
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Teacher the window applies to
    pub teacher_id: String,
    /// Academic year the window applies to
    pub academic_year_id: String,
    /// Day of week, 0-6 with 0 = Sunday
    pub day_of_week: i32,
    /// Start of the window, `HH:MM:SS`
    pub start_time: String,
    /// End of the window, `HH:MM:SS`
    pub end_time: String,
    /// Maximum periods the teacher takes on this day, None for no cap
    pub max_periods_per_day: Option<i32>,
    /// Maximum periods the teacher takes per week, None for no cap
    pub max_periods_per_week: Option<i32>,
    /// Whether the teacher is available at all in this window
    pub is_available: bool,
}

/// Defines relationships between TeacherAvailability and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
