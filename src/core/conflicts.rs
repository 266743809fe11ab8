//! Conflict detection business logic.
//!
//! Both checks are half-open interval overlap: `[s1,e1)` and `[s2,e2)`
//! overlap iff `s1 < e2 && e1 > s2`, so a period ending at 10:00 and one
//! starting at 10:00 never conflict. Times are compared lexicographically
//! as fixed-width `HH:MM:SS` strings; the store boundary guarantees the
//! zero-padding this relies on (see [`crate::core::timing::normalize_time`]).
//!
//! The pre-check on period create/update only blocks; the full re-scan
//! (`detect_and_log_conflicts`) is the only path that writes conflict rows,
//! via insert-or-skip on the unique `dedup_key`.

use crate::{
    entities::{Timetable, TimetableConflict, TimetablePeriod, timetable_conflict,
        timetable_period},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Set, prelude::*, sea_query::OnConflict};
use tracing::debug;

/// Kind of scheduling violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictType {
    /// One teacher assigned to two overlapping periods on the same day
    TeacherOverlap,
    /// One room booked for two overlapping periods on the same day
    RoomDoubleBooking,
}

impl ConflictType {
    /// Stable string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TeacherOverlap => "teacher_overlap",
            Self::RoomDoubleBooking => "room_double_booking",
        }
    }
}

/// Severity of a detected conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational finding
    Info,
    /// Should be looked at, does not block mutations
    Warning,
    /// Blocks period create/update
    Error,
    /// Blocks period create/update
    Critical,
}

impl Severity {
    /// Stable string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Whether a conflict of this severity rejects the triggering mutation.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        matches!(self, Self::Error | Self::Critical)
    }
}

/// A conflict found by the detector, not yet persisted.
#[derive(Debug, Clone)]
pub struct DetectedConflict {
    /// Kind of violation
    pub conflict_type: ConflictType,
    /// Severity of the violation
    pub severity: Severity,
    /// Human-readable description
    pub description: String,
    /// Teacher involved, for teacher overlaps
    pub teacher_id: Option<String>,
    /// Room involved, for room double-bookings
    pub room_id: Option<i64>,
    /// Ids of the overlapping periods, sorted ascending
    pub conflicting_period_ids: Vec<i64>,
}

impl DetectedConflict {
    /// Natural identity of this conflict against an affected period:
    /// `type:period:sorted-ids`. Matches the unique `dedup_key` column.
    #[must_use]
    pub fn dedup_key(&self, affected_period_id: i64) -> String {
        let ids: Vec<String> = self
            .conflicting_period_ids
            .iter()
            .map(ToString::to_string)
            .collect();
        format!(
            "{}:{}:{}",
            self.conflict_type.as_str(),
            affected_period_id,
            ids.join(",")
        )
    }
}

/// Whether the half-open intervals `[s1,e1)` and `[s2,e2)` overlap.
///
/// Inputs must be normalized `HH:MM:SS` strings; touching endpoints do not
/// overlap.
#[must_use]
pub fn intervals_overlap(s1: &str, e1: &str, s2: &str, e2: &str) -> bool {
    s1 < e2 && e1 > s2
}

/// Searches for active periods that would double-book a teacher.
///
/// Looks across all timetables except `timetable_id` (periods inside the
/// same timetable are not checked against each other for teachers) for the
/// same teacher and day, overlapping `[start, end)`. `exclude_period_id`
/// removes the period under examination from its own search. Any hit yields
/// a single `error`-severity conflict listing every overlapping period id.
pub async fn check_teacher_overlap<C: ConnectionTrait>(
    db: &C,
    timetable_id: i64,
    day_of_week: i32,
    start: &str,
    end: &str,
    teacher_id: &str,
    exclude_period_id: Option<i64>,
) -> Result<Vec<DetectedConflict>> {
    let mut query = TimetablePeriod::find()
        .filter(timetable_period::Column::TeacherId.eq(teacher_id))
        .filter(timetable_period::Column::DayOfWeek.eq(day_of_week))
        .filter(timetable_period::Column::IsActive.eq(true))
        .filter(timetable_period::Column::TimetableId.ne(timetable_id))
        .filter(timetable_period::Column::StartTime.lt(end))
        .filter(timetable_period::Column::EndTime.gt(start));
    if let Some(id) = exclude_period_id {
        query = query.filter(timetable_period::Column::Id.ne(id));
    }

    let overlapping = query.all(db).await?;
    if overlapping.is_empty() {
        return Ok(vec![]);
    }

    let mut ids: Vec<i64> = overlapping.iter().map(|p| p.id).collect();
    ids.sort_unstable();

    Ok(vec![DetectedConflict {
        conflict_type: ConflictType::TeacherOverlap,
        severity: Severity::Error,
        description: format!(
            "Teacher {teacher_id} is already scheduled on day {day_of_week} between {start} and {end}"
        ),
        teacher_id: Some(teacher_id.to_string()),
        room_id: None,
        conflicting_period_ids: ids,
    }])
}

/// Searches for active periods that would double-book a room.
///
/// Same shape as the teacher check but keyed on `room_id` and with no
/// timetable exclusion: a period can conflict with another period in the
/// same timetable.
pub async fn check_room_double_booking<C: ConnectionTrait>(
    db: &C,
    day_of_week: i32,
    start: &str,
    end: &str,
    room_id: i64,
    exclude_period_id: Option<i64>,
) -> Result<Vec<DetectedConflict>> {
    let mut query = TimetablePeriod::find()
        .filter(timetable_period::Column::RoomId.eq(room_id))
        .filter(timetable_period::Column::DayOfWeek.eq(day_of_week))
        .filter(timetable_period::Column::IsActive.eq(true))
        .filter(timetable_period::Column::StartTime.lt(end))
        .filter(timetable_period::Column::EndTime.gt(start));
    if let Some(id) = exclude_period_id {
        query = query.filter(timetable_period::Column::Id.ne(id));
    }

    let overlapping = query.all(db).await?;
    if overlapping.is_empty() {
        return Ok(vec![]);
    }

    let mut ids: Vec<i64> = overlapping.iter().map(|p| p.id).collect();
    ids.sort_unstable();

    Ok(vec![DetectedConflict {
        conflict_type: ConflictType::RoomDoubleBooking,
        severity: Severity::Error,
        description: format!(
            "Room {room_id} is already booked on day {day_of_week} between {start} and {end}"
        ),
        teacher_id: None,
        room_id: Some(room_id),
        conflicting_period_ids: ids,
    }])
}

/// Runs both checks against the would-be state of a period mutation.
///
/// This is the pre-check the period store consults before persisting; it
/// never writes anything.
pub async fn check_period<C: ConnectionTrait>(
    db: &C,
    timetable_id: i64,
    day_of_week: i32,
    start: &str,
    end: &str,
    teacher_id: Option<&str>,
    room_id: Option<i64>,
    exclude_period_id: Option<i64>,
) -> Result<Vec<DetectedConflict>> {
    let mut conflicts = Vec::new();

    if let Some(teacher) = teacher_id {
        conflicts.extend(
            check_teacher_overlap(
                db,
                timetable_id,
                day_of_week,
                start,
                end,
                teacher,
                exclude_period_id,
            )
            .await?,
        );
    }

    if let Some(room) = room_id {
        conflicts.extend(
            check_room_double_booking(db, day_of_week, start, end, room, exclude_period_id)
                .await?,
        );
    }

    Ok(conflicts)
}

/// Re-scans a whole timetable and persists every newly found conflict.
///
/// Iterates every active period that has a teacher or room assigned, runs
/// both checks with the period excluded from its own search, and inserts
/// each finding through insert-or-skip on the unique `dedup_key`. Running
/// this twice on an unchanged timetable adds no rows. Returns the conflict
/// rows inserted by this invocation.
pub async fn detect_and_log_conflicts(
    db: &DatabaseConnection,
    timetable_id: i64,
) -> Result<Vec<timetable_conflict::Model>> {
    let timetable = Timetable::find_by_id(timetable_id)
        .one(db)
        .await?
        .ok_or(Error::TimetableNotFound { id: timetable_id })?;

    let periods = TimetablePeriod::find()
        .filter(timetable_period::Column::TimetableId.eq(timetable_id))
        .filter(timetable_period::Column::IsActive.eq(true))
        .all(db)
        .await?;

    let mut inserted = Vec::new();
    for period in &periods {
        let found = check_period(
            db,
            period.timetable_id,
            period.day_of_week,
            &period.start_time,
            &period.end_time,
            period.teacher_id.as_deref(),
            period.room_id,
            Some(period.id),
        )
        .await?;

        for conflict in found {
            if let Some(row) =
                persist_conflict(db, &conflict, period.id, Some(&timetable.section_id)).await?
            {
                inserted.push(row);
            }
        }
    }

    debug!(
        timetable_id,
        new_conflicts = inserted.len(),
        "Timetable re-scan finished"
    );
    Ok(inserted)
}

/// Inserts a conflict row, skipping silently when the same conflict (by
/// `dedup_key`) is already recorded. Returns the inserted row, or None on
/// skip.
async fn persist_conflict(
    db: &DatabaseConnection,
    conflict: &DetectedConflict,
    affected_period_id: i64,
    section_id: Option<&str>,
) -> Result<Option<timetable_conflict::Model>> {
    let ids_json = serde_json::to_string(&conflict.conflicting_period_ids).map_err(|e| {
        Error::Config {
            message: format!("Failed to encode conflicting period ids: {e}"),
        }
    })?;

    let row = timetable_conflict::ActiveModel {
        conflict_type: Set(conflict.conflict_type.as_str().to_string()),
        severity: Set(conflict.severity.as_str().to_string()),
        description: Set(conflict.description.clone()),
        teacher_id: Set(conflict.teacher_id.clone()),
        room_id: Set(conflict.room_id),
        section_id: Set(section_id.map(ToString::to_string)),
        period_id: Set(affected_period_id),
        conflicting_period_ids: Set(ids_json),
        dedup_key: Set(conflict.dedup_key(affected_period_id)),
        is_resolved: Set(false),
        detected_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let insert = TimetableConflict::insert(row)
        .on_conflict(
            OnConflict::column(timetable_conflict::Column::DedupKey)
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await;

    match insert {
        Ok(result) => Ok(TimetableConflict::find_by_id(result.last_insert_id)
            .one(db)
            .await?),
        Err(DbErr::RecordNotInserted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
