//! Shared test utilities for the scheduling engine.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::optimizer::OptimizerSettings,
    core::{
        rooms::{self, NewRoom},
        timetable::{self, NewPeriod, NewTimetable},
        timing::{self, NewSchoolTiming},
    },
    entities::{self, timetable_period},
    errors::Result,
    optimizer::OptimizerClient,
};
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a school timing configuration with sensible defaults:
/// 08:00-14:00, 45-minute periods, 7 per day, Monday through Friday.
pub async fn create_test_timing(
    db: &DatabaseConnection,
    tenant_id: &str,
    academic_year_id: &str,
) -> Result<entities::school_timing::Model> {
    timing::create_school_timing(
        db,
        NewSchoolTiming {
            tenant_id: tenant_id.to_string(),
            academic_year_id: academic_year_id.to_string(),
            shift_number: None,
            shift_name: None,
            start_time: "08:00".to_string(),
            end_time: "14:00".to_string(),
            period_duration_minutes: 45,
            total_periods: 7,
            school_days: 0b011_1110, // Mon-Fri, 0 = Sunday
        },
    )
    .await
}

/// Creates a classroom with sensible defaults.
pub async fn create_test_room(
    db: &DatabaseConnection,
    tenant_id: &str,
    room_number: &str,
    building: Option<&str>,
) -> Result<entities::room::Model> {
    rooms::create_room(
        db,
        NewRoom {
            tenant_id: tenant_id.to_string(),
            room_number: room_number.to_string(),
            building: building.map(ToString::to_string),
            room_type: "classroom".to_string(),
            capacity: Some(30),
            has_projector: false,
            has_smart_board: false,
        },
    )
    .await
}

/// Fields for a timetable under tenant-1 / year 2026.
pub fn new_timetable(section_id: &str, term_id: Option<&str>) -> NewTimetable {
    NewTimetable {
        tenant_id: "tenant-1".to_string(),
        section_id: section_id.to_string(),
        academic_year_id: "2026".to_string(),
        term_id: term_id.map(ToString::to_string),
        name: None,
        school_timing_id: None,
    }
}

/// Creates a timetable for a section with test defaults.
pub async fn create_test_timetable(
    db: &DatabaseConnection,
    section_id: &str,
) -> Result<entities::timetable::Model> {
    timetable::create_timetable(db, new_timetable(section_id, None)).await
}

/// Period fields with a teacher assigned and no room.
pub fn period_with_teacher(
    timetable_id: i64,
    day_of_week: i32,
    period_number: i32,
    start: &str,
    end: &str,
    teacher_id: &str,
) -> NewPeriod {
    NewPeriod {
        timetable_id,
        day_of_week,
        period_number,
        start_time: start.to_string(),
        end_time: end.to_string(),
        subject_id: "MATH".to_string(),
        teacher_id: Some(teacher_id.to_string()),
        room_id: None,
        room_number: None,
        building: None,
        is_active: true,
    }
}

/// Period fields with a room assigned and no teacher.
pub fn period_with_room(
    timetable_id: i64,
    day_of_week: i32,
    period_number: i32,
    start: &str,
    end: &str,
    room_id: i64,
) -> NewPeriod {
    NewPeriod {
        timetable_id,
        day_of_week,
        period_number,
        start_time: start.to_string(),
        end_time: end.to_string(),
        subject_id: "MATH".to_string(),
        teacher_id: None,
        room_id: Some(room_id),
        room_number: None,
        building: None,
        is_active: true,
    }
}

/// Creates a period through the store (pre-check, commit, re-scan).
pub async fn create_test_period(
    db: &DatabaseConnection,
    new: NewPeriod,
) -> Result<entities::timetable_period::Model> {
    timetable::create_period(db, new).await
}

/// Inserts a period row directly, bypassing the store's pre-check and
/// re-scan. Used to stage already-conflicting data the way a lost race or
/// legacy import would.
pub async fn insert_raw_period(
    db: &DatabaseConnection,
    new: NewPeriod,
) -> Result<entities::timetable_period::Model> {
    let model = timetable_period::ActiveModel {
        timetable_id: Set(new.timetable_id),
        day_of_week: Set(new.day_of_week),
        period_number: Set(new.period_number),
        start_time: Set(timing::normalize_time(&new.start_time)?),
        end_time: Set(timing::normalize_time(&new.end_time)?),
        subject_id: Set(new.subject_id),
        teacher_id: Set(new.teacher_id),
        room_id: Set(new.room_id),
        room_number: Set(new.room_number),
        building: Set(new.building),
        is_active: Set(new.is_active),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// An optimizer client pointed at a port nothing listens on, so every call
/// fails with a connection refusal (the connectivity class).
#[allow(clippy::unwrap_used)]
pub fn unreachable_optimizer() -> OptimizerClient {
    OptimizerClient::new(OptimizerSettings {
        endpoint: "http://127.0.0.1:1/optimize".to_string(),
        timeout_secs: 5,
        ..OptimizerSettings::default()
    })
    .unwrap()
}
