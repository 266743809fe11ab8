//! Timetable and period store business logic.
//!
//! Period mutations run the conflict pre-check on the effective
//! post-mutation state inside one database transaction with the insert, so
//! two concurrent creates for the same teacher/time cannot both pass the
//! check and commit. A blocking conflict (severity error or critical)
//! rejects the mutation with the first such conflict's message and persists
//! nothing. After a successful create/update/delete the whole owning
//! timetable is re-scanned and any discovered conflicts are persisted; the
//! pre-check itself never writes.

use crate::{
    core::{conflicts, timing},
    entities::{Timetable, TimetablePeriod, timetable, timetable_period},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::warn;

/// Fields accepted when creating a timetable.
#[derive(Debug, Clone)]
pub struct NewTimetable {
    /// Tenant the timetable belongs to
    pub tenant_id: String,
    /// Class section the timetable schedules
    pub section_id: String,
    /// Academic year the timetable applies to
    pub academic_year_id: String,
    /// Term within the year, if any
    pub term_id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// Timing configuration the timetable was generated against, if any
    pub school_timing_id: Option<i64>,
}

/// Fields accepted when creating a period.
#[derive(Debug, Clone)]
pub struct NewPeriod {
    /// Timetable the period belongs to
    pub timetable_id: i64,
    /// Day of week, 0-6 with 0 = Sunday
    pub day_of_week: i32,
    /// Position within the day, 1-based
    pub period_number: i32,
    /// Start of the slot, `HH:MM` or `HH:MM:SS`
    pub start_time: String,
    /// End of the slot, `HH:MM` or `HH:MM:SS`
    pub end_time: String,
    /// Subject taught
    pub subject_id: String,
    /// Assigned teacher, if any
    pub teacher_id: Option<String>,
    /// Assigned room by id, if any
    pub room_id: Option<i64>,
    /// Free-text room number, used when no room id is recorded
    pub room_number: Option<String>,
    /// Free-text building alongside `room_number`
    pub building: Option<String>,
    /// Whether the period is in effect
    pub is_active: bool,
}

/// Partial update of a period; unset fields keep their stored values.
///
/// The nullable assignments use a double `Option`: the outer level is
/// "touch this field or not", the inner is the new value, so
/// `Some(None)` clears a teacher or room assignment.
#[derive(Debug, Clone, Default)]
pub struct PeriodUpdate {
    /// New day of week
    pub day_of_week: Option<i32>,
    /// New position within the day
    pub period_number: Option<i32>,
    /// New start time
    pub start_time: Option<String>,
    /// New end time
    pub end_time: Option<String>,
    /// New subject
    pub subject_id: Option<String>,
    /// New teacher assignment, `Some(None)` clears it
    pub teacher_id: Option<Option<String>>,
    /// New room assignment, `Some(None)` clears it
    pub room_id: Option<Option<i64>>,
    /// New active flag
    pub is_active: Option<bool>,
}

/// Creates a timetable.
pub async fn create_timetable(
    db: &DatabaseConnection,
    new: NewTimetable,
) -> Result<timetable::Model> {
    let model = timetable::ActiveModel {
        tenant_id: Set(new.tenant_id),
        section_id: Set(new.section_id),
        academic_year_id: Set(new.academic_year_id),
        term_id: Set(new.term_id),
        name: Set(new.name),
        school_timing_id: Set(new.school_timing_id),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Finds a timetable by its unique ID.
pub async fn get_timetable(
    db: &DatabaseConnection,
    timetable_id: i64,
) -> Result<Option<timetable::Model>> {
    Timetable::find_by_id(timetable_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the authoritative timetable for a (section, year, term) tuple.
///
/// There is no uniqueness constraint on the tuple; the store's convention
/// is latest-created-wins, with the id as tiebreak.
pub async fn get_timetable_by_section(
    db: &DatabaseConnection,
    section_id: &str,
    academic_year_id: &str,
    term_id: Option<&str>,
) -> Result<Option<timetable::Model>> {
    let mut query = Timetable::find()
        .filter(timetable::Column::SectionId.eq(section_id))
        .filter(timetable::Column::AcademicYearId.eq(academic_year_id));

    if let Some(term) = term_id {
        query = query.filter(timetable::Column::TermId.eq(term));
    }

    query
        .order_by_desc(timetable::Column::CreatedAt)
        .order_by_desc(timetable::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the active periods of a timetable, ordered by day then period
/// number.
pub async fn get_timetable_periods(
    db: &DatabaseConnection,
    timetable_id: i64,
) -> Result<Vec<timetable_period::Model>> {
    TimetablePeriod::find()
        .filter(timetable_period::Column::TimetableId.eq(timetable_id))
        .filter(timetable_period::Column::IsActive.eq(true))
        .order_by_asc(timetable_period::Column::DayOfWeek)
        .order_by_asc(timetable_period::Column::PeriodNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a period, rejecting it when the pre-check finds a blocking
/// conflict. See the module docs for the check/commit/re-scan contract.
pub async fn create_period(
    db: &DatabaseConnection,
    new: NewPeriod,
) -> Result<timetable_period::Model> {
    let day = timing::validate_day_of_week(new.day_of_week)?;
    let start = timing::normalize_time(&new.start_time)?;
    let end = timing::normalize_time(&new.end_time)?;
    if start >= end {
        return Err(Error::InvalidTime {
            value: format!("{start}..{end}"),
        });
    }

    let txn = db.begin().await?;

    Timetable::find_by_id(new.timetable_id)
        .one(&txn)
        .await?
        .ok_or(Error::TimetableNotFound {
            id: new.timetable_id,
        })?;

    if new.is_active {
        let found = conflicts::check_period(
            &txn,
            new.timetable_id,
            day,
            &start,
            &end,
            new.teacher_id.as_deref(),
            new.room_id,
            None,
        )
        .await?;
        if let Some(blocking) = found.iter().find(|c| c.severity.is_blocking()) {
            return Err(Error::ScheduleConflict {
                message: blocking.description.clone(),
            });
        }
    }

    let model = timetable_period::ActiveModel {
        timetable_id: Set(new.timetable_id),
        day_of_week: Set(day),
        period_number: Set(new.period_number),
        start_time: Set(start),
        end_time: Set(end),
        subject_id: Set(new.subject_id),
        teacher_id: Set(new.teacher_id),
        room_id: Set(new.room_id),
        room_number: Set(new.room_number),
        building: Set(new.building),
        is_active: Set(new.is_active),
        ..Default::default()
    };

    let created = model.insert(&txn).await?;
    txn.commit().await?;

    rescan_after_mutation(db, created.timetable_id).await;
    Ok(created)
}

/// Updates a period, merging the provided fields over the stored record and
/// pre-checking the effective state with the period excluded from its own
/// search. Same reject/commit/re-scan contract as [`create_period`].
pub async fn update_period(
    db: &DatabaseConnection,
    period_id: i64,
    update: PeriodUpdate,
) -> Result<timetable_period::Model> {
    let txn = db.begin().await?;

    let existing = TimetablePeriod::find_by_id(period_id)
        .one(&txn)
        .await?
        .ok_or(Error::PeriodNotFound { id: period_id })?;

    // Effective post-mutation state
    let day = match update.day_of_week {
        Some(d) => timing::validate_day_of_week(d)?,
        None => existing.day_of_week,
    };
    let start = match &update.start_time {
        Some(s) => timing::normalize_time(s)?,
        None => existing.start_time.clone(),
    };
    let end = match &update.end_time {
        Some(e) => timing::normalize_time(e)?,
        None => existing.end_time.clone(),
    };
    if start >= end {
        return Err(Error::InvalidTime {
            value: format!("{start}..{end}"),
        });
    }
    let teacher_id = update
        .teacher_id
        .clone()
        .unwrap_or_else(|| existing.teacher_id.clone());
    let room_id = update.room_id.unwrap_or(existing.room_id);
    let is_active = update.is_active.unwrap_or(existing.is_active);

    if is_active {
        let found = conflicts::check_period(
            &txn,
            existing.timetable_id,
            day,
            &start,
            &end,
            teacher_id.as_deref(),
            room_id,
            Some(period_id),
        )
        .await?;
        if let Some(blocking) = found.iter().find(|c| c.severity.is_blocking()) {
            return Err(Error::ScheduleConflict {
                message: blocking.description.clone(),
            });
        }
    }

    let timetable_id = existing.timetable_id;
    let mut model: timetable_period::ActiveModel = existing.into();
    model.day_of_week = Set(day);
    model.start_time = Set(start);
    model.end_time = Set(end);
    model.teacher_id = Set(teacher_id);
    model.room_id = Set(room_id);
    model.is_active = Set(is_active);
    if let Some(number) = update.period_number {
        model.period_number = Set(number);
    }
    if let Some(subject) = update.subject_id {
        model.subject_id = Set(subject);
    }

    let updated = model.update(&txn).await?;
    txn.commit().await?;

    rescan_after_mutation(db, timetable_id).await;
    Ok(updated)
}

/// Deletes a period, then re-scans the owning timetable.
pub async fn delete_period(db: &DatabaseConnection, period_id: i64) -> Result<()> {
    let existing = TimetablePeriod::find_by_id(period_id)
        .one(db)
        .await?
        .ok_or(Error::PeriodNotFound { id: period_id })?;

    let timetable_id = existing.timetable_id;
    let model: timetable_period::ActiveModel = existing.into();
    model.delete(db).await?;

    rescan_after_mutation(db, timetable_id).await;
    Ok(())
}

/// Post-mutation re-scan. Failures here are logged, not surfaced: the
/// mutation itself already committed and conflict rows are audit data.
async fn rescan_after_mutation(db: &DatabaseConnection, timetable_id: i64) {
    if let Err(e) = conflicts::detect_and_log_conflicts(db, timetable_id).await {
        warn!(timetable_id, error = %e, "Post-mutation conflict re-scan failed");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::TimetableConflict;
    use crate::test_utils::{
        create_test_period, create_test_timetable, new_timetable, period_with_room,
        period_with_teacher, setup_test_db,
    };

    #[tokio::test]
    async fn test_create_and_get_timetable() -> Result<()> {
        let db = setup_test_db().await?;

        let tt = create_test_timetable(&db, "S1").await?;
        let found = get_timetable(&db, tt.id).await?;
        assert_eq!(found.unwrap().section_id, "S1");

        assert!(get_timetable(&db, 999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_get_timetable_by_section_latest_wins() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_timetable(&db, new_timetable("S1", None)).await?;
        let second = create_timetable(&db, new_timetable("S1", None)).await?;

        let found = get_timetable_by_section(&db, "S1", "2026", None).await?.unwrap();
        assert_eq!(found.id, second.id);
        assert_ne!(found.id, first.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_timetable_by_section_term_scoping() -> Result<()> {
        let db = setup_test_db().await?;

        create_timetable(&db, new_timetable("S1", None)).await?;
        let fall = create_timetable(&db, new_timetable("S1", Some("fall"))).await?;

        let found = get_timetable_by_section(&db, "S1", "2026", Some("fall")).await?;
        assert_eq!(found.unwrap().id, fall.id);

        assert!(
            get_timetable_by_section(&db, "S1", "2026", Some("spring"))
                .await?
                .is_none()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_periods_ordered_by_day_then_number() -> Result<()> {
        let db = setup_test_db().await?;
        let tt = create_test_timetable(&db, "S1").await?;

        create_test_period(&db, period_with_teacher(tt.id, 2, 1, "08:00", "09:00", "T3")).await?;
        create_test_period(&db, period_with_teacher(tt.id, 1, 2, "09:00", "10:00", "T2")).await?;
        create_test_period(&db, period_with_teacher(tt.id, 1, 1, "08:00", "09:00", "T1")).await?;

        let periods = get_timetable_periods(&db, tt.id).await?;
        let order: Vec<(i32, i32)> = periods.iter().map(|p| (p.day_of_week, p.period_number)).collect();
        assert_eq!(order, vec![(1, 1), (1, 2), (2, 1)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_period_normalizes_and_validates() -> Result<()> {
        let db = setup_test_db().await?;
        let tt = create_test_timetable(&db, "S1").await?;

        let period =
            create_test_period(&db, period_with_teacher(tt.id, 1, 1, "8:00", "9:00", "T1")).await?;
        assert_eq!(period.start_time, "08:00:00");
        assert_eq!(period.end_time, "09:00:00");

        let backwards =
            create_test_period(&db, period_with_teacher(tt.id, 1, 2, "10:00", "09:30", "T1")).await;
        assert!(matches!(backwards.unwrap_err(), Error::InvalidTime { .. }));

        let bad_day =
            create_test_period(&db, period_with_teacher(tt.id, 9, 1, "08:00", "09:00", "T1")).await;
        assert!(matches!(
            bad_day.unwrap_err(),
            Error::InvalidDayOfWeek { value: 9 }
        ));

        let orphan =
            create_test_period(&db, period_with_teacher(999, 1, 1, "08:00", "09:00", "T1")).await;
        assert!(matches!(
            orphan.unwrap_err(),
            Error::TimetableNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_blocking_teacher_conflict_rejects_create() -> Result<()> {
        let db = setup_test_db().await?;
        let tt_a = create_test_timetable(&db, "S1").await?;
        let tt_b = create_test_timetable(&db, "S2").await?;

        create_test_period(&db, period_with_teacher(tt_a.id, 1, 1, "08:00", "09:00", "T1")).await?;

        let result =
            create_test_period(&db, period_with_teacher(tt_b.id, 1, 1, "08:30", "09:30", "T1"))
                .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ScheduleConflict { .. }
        ));

        // Nothing was persisted for the rejected create
        let periods = get_timetable_periods(&db, tt_b.id).await?;
        assert!(periods.is_empty());

        // Back-to-back is allowed (touching endpoints)
        create_test_period(&db, period_with_teacher(tt_b.id, 1, 2, "09:00", "10:00", "T1")).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_blocking_room_conflict_rejects_create_same_timetable() -> Result<()> {
        let db = setup_test_db().await?;
        let tt = create_test_timetable(&db, "S1").await?;

        create_test_period(&db, period_with_room(tt.id, 1, 1, "08:00", "09:00", 7)).await?;

        // The room check has no timetable exclusion
        let result =
            create_test_period(&db, period_with_room(tt.id, 1, 2, "08:30", "09:30", 7)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ScheduleConflict { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_period_merges_and_prechecks() -> Result<()> {
        let db = setup_test_db().await?;
        let tt_a = create_test_timetable(&db, "S1").await?;
        let tt_b = create_test_timetable(&db, "S2").await?;

        create_test_period(&db, period_with_teacher(tt_a.id, 1, 1, "08:00", "09:00", "T1")).await?;
        let period =
            create_test_period(&db, period_with_teacher(tt_b.id, 2, 1, "08:00", "09:00", "T1"))
                .await?;

        // Moving the period onto day 1 would double-book T1
        let result = update_period(
            &db,
            period.id,
            PeriodUpdate {
                day_of_week: Some(1),
                ..PeriodUpdate::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ScheduleConflict { .. }
        ));

        // The stored record kept its old day
        let stored = get_timetable_periods(&db, tt_b.id).await?;
        assert_eq!(stored[0].day_of_week, 2);

        // Clearing the teacher first makes the same move legal
        let updated = update_period(
            &db,
            period.id,
            PeriodUpdate {
                day_of_week: Some(1),
                teacher_id: Some(None),
                ..PeriodUpdate::default()
            },
        )
        .await?;
        assert_eq!(updated.day_of_week, 1);
        assert_eq!(updated.teacher_id, None);
        // Untouched fields survived the merge
        assert_eq!(updated.start_time, "08:00:00");
        assert_eq!(updated.subject_id, "MATH");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_period() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_period(&db, 123, PeriodUpdate::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::PeriodNotFound { id: 123 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_period() -> Result<()> {
        let db = setup_test_db().await?;
        let tt = create_test_timetable(&db, "S1").await?;
        let period =
            create_test_period(&db, period_with_teacher(tt.id, 1, 1, "08:00", "09:00", "T1"))
                .await?;

        delete_period(&db, period.id).await?;
        assert!(get_timetable_periods(&db, tt.id).await?.is_empty());

        let again = delete_period(&db, period.id).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::PeriodNotFound { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_rescan_records_room_conflict_within_timetable() -> Result<()> {
        let db = setup_test_db().await?;
        let tt = create_test_timetable(&db, "S1").await?;

        // Two periods booking room 7 at overlapping times, inserted raw so
        // the pre-check can't block the second
        crate::test_utils::insert_raw_period(
            &db,
            period_with_room(tt.id, 1, 1, "08:00", "09:00", 7),
        )
        .await?;
        crate::test_utils::insert_raw_period(
            &db,
            period_with_room(tt.id, 1, 2, "08:30", "09:30", 7),
        )
        .await?;

        // Any successful mutation re-scans the whole timetable
        create_test_period(&db, period_with_teacher(tt.id, 2, 1, "08:00", "09:00", "T9")).await?;

        let conflicts = TimetableConflict::find().all(&db).await?;
        // Each of the two overlapping periods is affected once
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts.iter().all(|c| c.conflict_type == "room_double_booking"));

        Ok(())
    }
}
