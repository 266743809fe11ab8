//! Teacher availability business logic.
//!
//! Availability windows are advisory generation context: they are handed to
//! the optimizer and to reporting, but the conflict detector does not
//! enforce them.

use crate::{
    entities::{TeacherAvailability, teacher_availability},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Fields accepted when creating a teacher availability window.
#[derive(Debug, Clone)]
pub struct NewTeacherAvailability {
    /// Teacher the window applies to
    pub teacher_id: String,
    /// Academic year the window applies to
    pub academic_year_id: String,
    /// Day of week, 0-6 with 0 = Sunday
    pub day_of_week: i32,
    /// Start of the window
    pub start_time: String,
    /// End of the window
    pub end_time: String,
    /// Per-day period cap, None for no cap
    pub max_periods_per_day: Option<i32>,
    /// Per-week period cap, None for no cap
    pub max_periods_per_week: Option<i32>,
    /// Whether the teacher is available in this window
    pub is_available: bool,
}

/// Creates an availability window, validating the day and time values.
pub async fn create_teacher_availability(
    db: &DatabaseConnection,
    new: NewTeacherAvailability,
) -> Result<teacher_availability::Model> {
    let day = super::timing::validate_day_of_week(new.day_of_week)?;

    let window = teacher_availability::ActiveModel {
        teacher_id: Set(new.teacher_id),
        academic_year_id: Set(new.academic_year_id),
        day_of_week: Set(day),
        start_time: Set(super::timing::normalize_time(&new.start_time)?),
        end_time: Set(super::timing::normalize_time(&new.end_time)?),
        max_periods_per_day: Set(new.max_periods_per_day),
        max_periods_per_week: Set(new.max_periods_per_week),
        is_available: Set(new.is_available),
        ..Default::default()
    };

    window.insert(db).await.map_err(Into::into)
}

/// Lists a teacher's availability windows for an academic year, ordered by
/// day then start time.
pub async fn get_teacher_availability(
    db: &DatabaseConnection,
    teacher_id: &str,
    academic_year_id: &str,
) -> Result<Vec<teacher_availability::Model>> {
    TeacherAvailability::find()
        .filter(teacher_availability::Column::TeacherId.eq(teacher_id))
        .filter(teacher_availability::Column::AcademicYearId.eq(academic_year_id))
        .order_by_asc(teacher_availability::Column::DayOfWeek)
        .order_by_asc(teacher_availability::Column::StartTime)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every teacher's windows for one day of an academic year.
pub async fn list_availability_for_day(
    db: &DatabaseConnection,
    academic_year_id: &str,
    day_of_week: i32,
) -> Result<Vec<teacher_availability::Model>> {
    let day = super::timing::validate_day_of_week(day_of_week)?;

    TeacherAvailability::find()
        .filter(teacher_availability::Column::AcademicYearId.eq(academic_year_id))
        .filter(teacher_availability::Column::DayOfWeek.eq(day))
        .order_by_asc(teacher_availability::Column::StartTime)
        .all(db)
        .await
        .map_err(Into::into)
}
