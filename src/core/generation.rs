//! Timetable generation orchestration.
//!
//! One invocation is a small state machine recorded in the generation log:
//! `in_progress -> completed` or `in_progress -> failed`, both terminal.
//! The orchestrator loads resource context (school timing, rooms, break
//! schedules) from the registries; target sections, teachers and subjects
//! arrive on the request since they are owned by the surrounding system.
//!
//! In `ai_powered` mode one blocking call goes to the external optimizer.
//! A connectivity-class failure there is deliberately NOT an error: the
//! invocation falls back to one empty timetable per section and still
//! completes, with the log's `degraded` flag set. Every other optimizer
//! problem fails the invocation. Non-AI modes have no scheduling logic and
//! produce empty timetables only.

use crate::{
    core::{
        conflicts,
        timetable::{self, NewPeriod, NewTimetable},
        timing,
    },
    entities::{
        TimetableConflict, generation_log, timetable as timetable_entity, timetable_conflict,
        timetable_period,
    },
    errors::{Error, Result},
    optimizer::{
        BreakSchedulePayload, OptimizeRequest, OptimizedPeriod, OptimizerClient, RoomPayload,
        SchoolTimingPayload, SectionPayload, SubjectPayload, TeacherPayload,
    },
};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use std::time::Instant;
use tracing::{error, info, warn};

/// How a generation invocation should produce timetables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Delegate to the external optimization service
    AiPowered,
    /// Placeholder mode, produces empty timetables
    Balanced,
    /// Placeholder mode, produces empty timetables
    TeacherPreference,
    /// Placeholder mode, produces empty timetables
    StudentFocus,
    /// Placeholder mode, produces empty timetables
    RoomOptimization,
}

impl GenerationMode {
    /// Stable string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AiPowered => "ai_powered",
            Self::Balanced => "balanced",
            Self::TeacherPreference => "teacher_preference",
            Self::StudentFocus => "student_focus",
            Self::RoomOptimization => "room_optimization",
        }
    }
}

impl std::str::FromStr for GenerationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ai_powered" => Ok(Self::AiPowered),
            "balanced" => Ok(Self::Balanced),
            "teacher_preference" => Ok(Self::TeacherPreference),
            "student_focus" => Ok(Self::StudentFocus),
            "room_optimization" => Ok(Self::RoomOptimization),
            other => Err(Error::Config {
                message: format!("Unknown generation mode: {other}"),
            }),
        }
    }
}

/// A class section targeted by a generation invocation.
#[derive(Debug, Clone)]
pub struct SectionInfo {
    /// Section id
    pub id: String,
    /// Human-readable section name
    pub name: String,
    /// Grade the section belongs to
    pub grade: String,
    /// Subject ids taught to this section
    pub subjects: Vec<String>,
}

/// A teacher available to the generation invocation.
#[derive(Debug, Clone)]
pub struct TeacherInfo {
    /// Teacher id
    pub id: String,
    /// Teacher name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Subject ids the teacher can teach
    pub subjects: Vec<String>,
    /// Whether the teacher can cover any subject
    pub can_teach_all: bool,
}

/// A subject to be scheduled.
#[derive(Debug, Clone)]
pub struct SubjectInfo {
    /// Subject id
    pub id: String,
    /// Subject name
    pub name: String,
    /// Short subject code
    pub code: String,
}

/// One generation invocation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Tenant the generation runs for
    pub tenant_id: String,
    /// Academic year the generation targets
    pub academic_year_id: String,
    /// Term for the produced timetables, if any
    pub term_id: Option<String>,
    /// Shift whose timing configuration to use, None for single-shift
    pub shift_number: Option<i32>,
    /// How to produce the timetables
    pub mode: GenerationMode,
    /// Sections to produce timetables for
    pub target_sections: Vec<SectionInfo>,
    /// Teachers available for assignment
    pub teachers: Vec<TeacherInfo>,
    /// Subjects to schedule
    pub subjects: Vec<SubjectInfo>,
    /// Caller-supplied soft constraints, passed to the optimizer opaquely
    pub constraints: Option<serde_json::Value>,
}

/// One produced timetable with its periods.
#[derive(Debug, Clone)]
pub struct GeneratedTimetable {
    /// The created timetable
    pub timetable: timetable_entity::Model,
    /// Its active periods, empty on the fallback and non-AI paths
    pub periods: Vec<timetable_period::Model>,
}

/// Result of a completed generation invocation.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Id of the generation log row for this invocation
    pub log_id: i64,
    /// Produced timetables, one per target section
    pub timetables: Vec<GeneratedTimetable>,
    /// Conflicts recorded against the produced timetables
    pub conflicts: Vec<timetable_conflict::Model>,
    /// True when the optimizer was unreachable and the empty-timetable
    /// fallback was taken
    pub degraded: bool,
}

/// Runs one generation invocation end to end.
///
/// Creates the generation log in `in_progress`, runs the mode-specific
/// path, and moves the log to `completed` (with timetable ids, conflict
/// count and the degraded flag) or `failed` (with the error message, which
/// is then re-raised).
pub async fn generate_timetable(
    db: &DatabaseConnection,
    client: &OptimizerClient,
    request: GenerationRequest,
) -> Result<GenerationOutcome> {
    let started = Instant::now();
    let log = open_log(db, &request).await?;
    let log_id = log.id;
    info!(
        log_id,
        mode = request.mode.as_str(),
        sections = request.target_sections.len(),
        "Starting timetable generation"
    );

    match run_generation(db, client, &request).await {
        Ok((timetables, conflicts, degraded)) => {
            let timetable_ids: Vec<i64> = timetables.iter().map(|t| t.timetable.id).collect();
            complete_log(db, log, &timetable_ids, conflicts.len(), degraded).await?;
            info!(
                log_id,
                timetables = timetable_ids.len(),
                conflicts = conflicts.len(),
                degraded,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Timetable generation completed"
            );
            Ok(GenerationOutcome {
                log_id,
                timetables,
                conflicts,
                degraded,
            })
        }
        Err(e) => {
            error!(log_id, error = %e, "Timetable generation failed");
            fail_log(db, log, &e).await?;
            Err(e)
        }
    }
}

/// Mode dispatch. Returns (timetables, conflicts, degraded).
async fn run_generation(
    db: &DatabaseConnection,
    client: &OptimizerClient,
    request: &GenerationRequest,
) -> Result<(Vec<GeneratedTimetable>, Vec<timetable_conflict::Model>, bool)> {
    // The one invocation-time precondition: timing must be configured
    let school_timing = timing::get_school_timing(
        db,
        &request.tenant_id,
        &request.academic_year_id,
        request.shift_number,
    )
    .await?
    .ok_or_else(|| Error::SchoolTimingNotConfigured {
        tenant_id: request.tenant_id.clone(),
        academic_year_id: request.academic_year_id.clone(),
    })?;

    if request.mode != GenerationMode::AiPowered {
        let timetables = create_empty_timetables(db, request, Some(school_timing.id)).await?;
        return Ok((timetables, vec![], false));
    }

    let rooms = crate::core::rooms::list_rooms(db, &request.tenant_id).await?;
    let breaks = timing::get_break_schedules(db, school_timing.id).await?;
    let payload = build_optimize_request(request, &school_timing, &rooms, &breaks, client);

    match client.optimize(&payload).await {
        Ok(response) => {
            let optimized = response.timetable.ok_or_else(|| Error::OptimizerResponse {
                message: "Optimizer response is missing the timetable".to_string(),
            })?;
            persist_optimized(db, request, school_timing.id, optimized.periods).await
        }
        Err(e) if e.is_optimizer_connectivity() => {
            // Deliberate degrade-gracefully contract: unreachable optimizer
            // means empty timetables and a completed invocation
            warn!(error = %e, "Optimizer unreachable, falling back to empty timetables");
            let timetables = create_empty_timetables(db, request, Some(school_timing.id)).await?;
            Ok((timetables, vec![], true))
        }
        Err(e) => Err(e),
    }
}

/// Creates one empty timetable per target section.
async fn create_empty_timetables(
    db: &DatabaseConnection,
    request: &GenerationRequest,
    school_timing_id: Option<i64>,
) -> Result<Vec<GeneratedTimetable>> {
    let mut timetables = Vec::with_capacity(request.target_sections.len());
    for section in &request.target_sections {
        let created = timetable::create_timetable(
            db,
            NewTimetable {
                tenant_id: request.tenant_id.clone(),
                section_id: section.id.clone(),
                academic_year_id: request.academic_year_id.clone(),
                term_id: request.term_id.clone(),
                name: Some(section.name.clone()),
                school_timing_id,
            },
        )
        .await?;
        timetables.push(GeneratedTimetable {
            timetable: created,
            periods: vec![],
        });
    }
    Ok(timetables)
}

/// Writes the optimizer's periods through the period store, one timetable
/// per target section, then re-scans each and collects its conflicts.
async fn persist_optimized(
    db: &DatabaseConnection,
    request: &GenerationRequest,
    school_timing_id: i64,
    periods: Vec<OptimizedPeriod>,
) -> Result<(Vec<GeneratedTimetable>, Vec<timetable_conflict::Model>, bool)> {
    let mut timetables = Vec::with_capacity(request.target_sections.len());
    let mut all_conflicts = Vec::new();

    for section in &request.target_sections {
        let created = timetable::create_timetable(
            db,
            NewTimetable {
                tenant_id: request.tenant_id.clone(),
                section_id: section.id.clone(),
                academic_year_id: request.academic_year_id.clone(),
                term_id: request.term_id.clone(),
                name: Some(section.name.clone()),
                school_timing_id: Some(school_timing_id),
            },
        )
        .await?;

        for period in periods.iter().filter(|p| p.section_id == section.id) {
            let new = NewPeriod {
                timetable_id: created.id,
                day_of_week: period.day_of_week,
                period_number: period.period_number,
                start_time: period.start_time.clone(),
                end_time: period.end_time.clone(),
                subject_id: period.subject_id.clone(),
                teacher_id: period.teacher_id.clone(),
                room_id: period.room_id,
                room_number: None,
                building: None,
                is_active: true,
            };
            // A single failing period is skipped, not fatal to the section
            if let Err(e) = timetable::create_period(db, new).await {
                warn!(
                    section = %section.id,
                    day_of_week = period.day_of_week,
                    period_number = period.period_number,
                    error = %e,
                    "Skipping optimizer period"
                );
            }
        }

        conflicts::detect_and_log_conflicts(db, created.id).await?;
        let stored_periods = timetable::get_timetable_periods(db, created.id).await?;
        let period_ids: Vec<i64> = stored_periods.iter().map(|p| p.id).collect();
        if !period_ids.is_empty() {
            let section_conflicts = TimetableConflict::find()
                .filter(timetable_conflict::Column::PeriodId.is_in(period_ids))
                .all(db)
                .await?;
            all_conflicts.extend(section_conflicts);
        }

        timetables.push(GeneratedTimetable {
            timetable: created,
            periods: stored_periods,
        });
    }

    Ok((timetables, all_conflicts, false))
}

/// Builds the optimizer request payload from the generation context.
fn build_optimize_request(
    request: &GenerationRequest,
    school_timing: &crate::entities::school_timing::Model,
    rooms: &[crate::entities::room::Model],
    breaks: &[crate::entities::break_schedule::Model],
    client: &OptimizerClient,
) -> OptimizeRequest {
    let settings = client.settings();
    OptimizeRequest {
        sections: request
            .target_sections
            .iter()
            .map(|s| SectionPayload {
                id: s.id.clone(),
                name: s.name.clone(),
                grade: s.grade.clone(),
                subjects: s.subjects.clone(),
            })
            .collect(),
        teachers: request
            .teachers
            .iter()
            .map(|t| TeacherPayload {
                id: t.id.clone(),
                name: t.name.clone(),
                email: t.email.clone(),
                subjects: t.subjects.clone(),
                can_teach_all: t.can_teach_all,
            })
            .collect(),
        subjects: request
            .subjects
            .iter()
            .map(|s| SubjectPayload {
                id: s.id.clone(),
                name: s.name.clone(),
                code: s.code.clone(),
            })
            .collect(),
        rooms: rooms
            .iter()
            .map(|r| RoomPayload {
                id: r.id,
                room_number: r.room_number.clone(),
                building: r.building.clone(),
                room_type: r.room_type.clone(),
                capacity: r.capacity,
                is_available: r.is_available,
            })
            .collect(),
        school_timing: SchoolTimingPayload {
            start_time: school_timing.start_time.clone(),
            end_time: school_timing.end_time.clone(),
            period_duration_minutes: school_timing.period_duration_minutes,
            total_periods: school_timing.total_periods,
            school_days: school_timing.school_days,
        },
        break_schedules: breaks
            .iter()
            .map(|b| BreakSchedulePayload {
                name: b.name.clone(),
                break_type: b.break_type.clone(),
                start_time: b.start_time.clone(),
                end_time: b.end_time.clone(),
                days: b.days,
            })
            .collect(),
        constraints: request
            .constraints
            .clone()
            .unwrap_or_else(|| serde_json::json!({})),
        population_size: settings.population_size,
        generations: settings.generations,
        mutation_rate: settings.mutation_rate,
        crossover_rate: settings.crossover_rate,
    }
}

/// Inserts the generation log row in `in_progress`.
async fn open_log(
    db: &DatabaseConnection,
    request: &GenerationRequest,
) -> Result<generation_log::Model> {
    let section_ids: Vec<&str> = request.target_sections.iter().map(|s| s.id.as_str()).collect();
    let section_ids_json = serde_json::to_string(&section_ids).map_err(|e| Error::Config {
        message: format!("Failed to encode target section ids: {e}"),
    })?;
    let constraints_json = request.constraints.as_ref().map(ToString::to_string);

    let log = generation_log::ActiveModel {
        tenant_id: Set(request.tenant_id.clone()),
        academic_year_id: Set(request.academic_year_id.clone()),
        mode: Set(request.mode.as_str().to_string()),
        target_section_ids: Set(section_ids_json),
        constraints: Set(constraints_json),
        status: Set("in_progress".to_string()),
        degraded: Set(false),
        started_at: Set(chrono::Utc::now()),
        completed_at: Set(None),
        timetable_ids: Set(None),
        conflict_count: Set(0),
        error_message: Set(None),
        ..Default::default()
    };

    log.insert(db).await.map_err(Into::into)
}

/// Moves the log to its `completed` terminal state.
async fn complete_log(
    db: &DatabaseConnection,
    log: generation_log::Model,
    timetable_ids: &[i64],
    conflict_count: usize,
    degraded: bool,
) -> Result<()> {
    let ids_json = serde_json::to_string(timetable_ids).map_err(|e| Error::Config {
        message: format!("Failed to encode timetable ids: {e}"),
    })?;

    let mut model: generation_log::ActiveModel = log.into();
    model.status = Set("completed".to_string());
    model.degraded = Set(degraded);
    model.completed_at = Set(Some(chrono::Utc::now()));
    model.timetable_ids = Set(Some(ids_json));
    model.conflict_count = Set(i32::try_from(conflict_count).unwrap_or(i32::MAX));
    model.update(db).await?;
    Ok(())
}

/// Moves the log to its `failed` terminal state.
async fn fail_log(db: &DatabaseConnection, log: generation_log::Model, error: &Error) -> Result<()> {
    let mut model: generation_log::ActiveModel = log.into();
    model.status = Set("failed".to_string());
    model.completed_at = Set(Some(chrono::Utc::now()));
    model.error_message = Set(Some(error.to_string()));
    model.update(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::GenerationLog;
    use crate::test_utils::{create_test_timing, setup_test_db, unreachable_optimizer};
    use sea_orm::EntityTrait;

    fn request(mode: GenerationMode) -> GenerationRequest {
        GenerationRequest {
            tenant_id: "tenant-1".to_string(),
            academic_year_id: "2026".to_string(),
            term_id: None,
            shift_number: None,
            mode,
            target_sections: vec![SectionInfo {
                id: "S1".to_string(),
                name: "Grade 7B".to_string(),
                grade: "7".to_string(),
                subjects: vec!["MATH".to_string()],
            }],
            teachers: vec![TeacherInfo {
                id: "T1".to_string(),
                name: "A. Teacher".to_string(),
                email: "t1@school.example".to_string(),
                subjects: vec!["MATH".to_string()],
                can_teach_all: false,
            }],
            subjects: vec![SubjectInfo {
                id: "MATH".to_string(),
                name: "Mathematics".to_string(),
                code: "MAT".to_string(),
            }],
            constraints: None,
        }
    }

    #[test]
    fn test_mode_round_trip() {
        for mode in [
            GenerationMode::AiPowered,
            GenerationMode::Balanced,
            GenerationMode::TeacherPreference,
            GenerationMode::StudentFocus,
            GenerationMode::RoomOptimization,
        ] {
            assert_eq!(mode.as_str().parse::<GenerationMode>().unwrap(), mode);
        }
        assert!("genetic".parse::<GenerationMode>().is_err());
    }

    #[tokio::test]
    async fn test_unreachable_optimizer_falls_back_to_completed() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_timing(&db, "tenant-1", "2026").await?;
        let client = unreachable_optimizer();

        let outcome = generate_timetable(&db, &client, request(GenerationMode::AiPowered)).await?;

        assert!(outcome.degraded);
        assert_eq!(outcome.timetables.len(), 1);
        assert_eq!(outcome.timetables[0].timetable.section_id, "S1");
        assert!(outcome.timetables[0].periods.is_empty());
        assert!(outcome.conflicts.is_empty());

        let log = GenerationLog::find_by_id(outcome.log_id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(log.status, "completed");
        assert!(log.degraded);
        assert!(log.completed_at.is_some());
        assert_eq!(log.error_message, None);
        let ids: Vec<i64> = serde_json::from_str(log.timetable_ids.as_deref().unwrap()).unwrap();
        assert_eq!(ids, vec![outcome.timetables[0].timetable.id]);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_timing_is_a_precondition_failure() -> Result<()> {
        let db = setup_test_db().await?;
        let client = unreachable_optimizer();

        // No school timing configured: fails before the optimizer is
        // involved, so the error is the precondition, not connectivity
        let err = generate_timetable(&db, &client, request(GenerationMode::AiPowered))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SchoolTimingNotConfigured { .. }));

        let logs = GenerationLog::find().all(&db).await?;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, "failed");
        assert!(
            logs[0]
                .error_message
                .as_deref()
                .unwrap()
                .contains("not configured")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_non_ai_modes_create_empty_timetables() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_timing(&db, "tenant-1", "2026").await?;
        let client = unreachable_optimizer();

        let outcome = generate_timetable(&db, &client, request(GenerationMode::Balanced)).await?;

        assert!(!outcome.degraded);
        assert_eq!(outcome.timetables.len(), 1);
        assert!(outcome.timetables[0].periods.is_empty());

        let log = GenerationLog::find_by_id(outcome.log_id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(log.status, "completed");
        assert!(!log.degraded);
        assert_eq!(log.mode, "balanced");

        Ok(())
    }

    #[tokio::test]
    async fn test_log_records_request_shape() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_timing(&db, "tenant-1", "2026").await?;
        let client = unreachable_optimizer();

        let mut req = request(GenerationMode::Balanced);
        req.constraints = Some(serde_json::json!({"max_consecutive": 3}));
        let outcome = generate_timetable(&db, &client, req).await?;

        let log = GenerationLog::find_by_id(outcome.log_id)
            .one(&db)
            .await?
            .unwrap();
        let sections: Vec<String> = serde_json::from_str(&log.target_section_ids).unwrap();
        assert_eq!(sections, vec!["S1".to_string()]);
        assert!(log.constraints.as_deref().unwrap().contains("max_consecutive"));
        assert_eq!(log.conflict_count, 0);

        Ok(())
    }
}
