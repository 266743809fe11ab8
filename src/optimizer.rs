//! HTTP client and wire types for the external optimization service.
//!
//! The optimizer is consumed through a single blocking request/response
//! contract with a bounded timeout, no retry and no streaming. Transport
//! failures are split into two classes: connectivity (connection refused,
//! timeout) which the generation orchestrator recovers from via its
//! fallback path, and everything else, which fails the generation.

use crate::config::optimizer::OptimizerSettings;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A class section as presented to the optimizer
#[derive(Debug, Clone, Serialize)]
pub struct SectionPayload {
    /// Section id
    pub id: String,
    /// Human-readable section name
    pub name: String,
    /// Grade the section belongs to
    pub grade: String,
    /// Subject ids taught to this section
    pub subjects: Vec<String>,
}

/// A teacher as presented to the optimizer
#[derive(Debug, Clone, Serialize)]
pub struct TeacherPayload {
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

/// A subject as presented to the optimizer
#[derive(Debug, Clone, Serialize)]
pub struct SubjectPayload {
    /// Subject id
    pub id: String,
    /// Subject name
    pub name: String,
    /// Short subject code
    pub code: String,
}

/// A room as presented to the optimizer
#[derive(Debug, Clone, Serialize)]
pub struct RoomPayload {
    /// Room id
    pub id: i64,
    /// Room number or label
    pub room_number: String,
    /// Building, when recorded
    pub building: Option<String>,
    /// Kind of room
    pub room_type: String,
    /// Seating capacity, when known
    pub capacity: Option<i32>,
    /// Whether the room can be scheduled
    pub is_available: bool,
}

/// School timing as presented to the optimizer
#[derive(Debug, Clone, Serialize)]
pub struct SchoolTimingPayload {
    /// Start of the instructional day, `HH:MM:SS`
    pub start_time: String,
    /// End of the instructional day, `HH:MM:SS`
    pub end_time: String,
    /// Length of one period in minutes
    pub period_duration_minutes: i32,
    /// Periods per instructional day
    pub total_periods: i32,
    /// 7-bit instructional-day mask, bit 0 = Sunday
    pub school_days: i32,
}

/// A break schedule as presented to the optimizer
#[derive(Debug, Clone, Serialize)]
pub struct BreakSchedulePayload {
    /// Break name
    pub name: String,
    /// Kind of slot
    pub break_type: String,
    /// Start of the break, `HH:MM:SS`
    pub start_time: String,
    /// End of the break, `HH:MM:SS`
    pub end_time: String,
    /// 7-bit weekday mask, bit 0 = Sunday
    pub days: i32,
}

/// The full request body sent to the optimization service
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeRequest {
    /// Target sections
    pub sections: Vec<SectionPayload>,
    /// Available teachers
    pub teachers: Vec<TeacherPayload>,
    /// Subjects to schedule
    pub subjects: Vec<SubjectPayload>,
    /// Available rooms
    pub rooms: Vec<RoomPayload>,
    /// Bell schedule
    pub school_timing: SchoolTimingPayload,
    /// Non-teaching slots to schedule around
    pub break_schedules: Vec<BreakSchedulePayload>,
    /// Caller-supplied soft constraints, passed through opaquely
    pub constraints: serde_json::Value,
    /// GA population size
    pub population_size: u32,
    /// GA generation count
    pub generations: u32,
    /// GA mutation rate
    pub mutation_rate: f64,
    /// GA crossover rate
    pub crossover_rate: f64,
}

/// One scheduled period in the optimizer's response
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizedPeriod {
    /// Section this period was scheduled for
    pub section_id: String,
    /// Day of week, 0-6 with 0 = Sunday
    pub day_of_week: i32,
    /// Position within the day, 1-based
    pub period_number: i32,
    /// Start of the slot
    pub start_time: String,
    /// End of the slot
    pub end_time: String,
    /// Subject taught
    pub subject_id: String,
    /// Assigned teacher, if any
    pub teacher_id: Option<String>,
    /// Assigned room, if any
    pub room_id: Option<i64>,
}

/// The timetable portion of the optimizer's response
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizedTimetable {
    /// All scheduled periods across the target sections
    pub periods: Vec<OptimizedPeriod>,
}

/// The full response body from the optimization service
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeResponse {
    /// Whether the optimizer considers the run successful
    pub success: bool,
    /// The produced timetable; absent on unsuccessful runs
    pub timetable: Option<OptimizedTimetable>,
}

/// Client for the external optimization service.
///
/// Holds a `reqwest` client with the configured timeout baked in, so every
/// call is bounded without per-request plumbing.
#[derive(Debug, Clone)]
pub struct OptimizerClient {
    http: reqwest::Client,
    settings: OptimizerSettings,
}

impl OptimizerClient {
    /// Builds a client from the given settings.
    pub fn new(settings: OptimizerSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { http, settings })
    }

    /// Builds a client from default settings (optimizer.toml if present,
    /// otherwise built-in defaults).
    pub fn from_default_settings() -> Result<Self> {
        Self::new(crate::config::optimizer::load_default_settings()?)
    }

    /// The settings this client was built with.
    #[must_use]
    pub const fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Issues one blocking optimization call.
    ///
    /// Connection-level failures (refused, timeout) are mapped to
    /// [`Error::OptimizerUnreachable`] so the caller can take the fallback
    /// path; an undecodable body or a response without `success: true` is
    /// mapped to [`Error::OptimizerResponse`] and fails the generation.
    pub async fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse> {
        debug!(
            endpoint = %self.settings.endpoint,
            sections = request.sections.len(),
            "Calling optimization service"
        );

        let response = self
            .http
            .post(&self.settings.endpoint)
            .json(request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::OptimizerResponse {
                message: format!("Optimizer returned HTTP {status}"),
            });
        }

        let body: OptimizeResponse =
            response.json().await.map_err(|e| Error::OptimizerResponse {
                message: format!("Failed to decode optimizer response: {e}"),
            })?;

        if !body.success {
            warn!("Optimizer reported an unsuccessful run");
            return Err(Error::OptimizerResponse {
                message: "Optimizer reported an unsuccessful run".to_string(),
            });
        }

        Ok(body)
    }
}

/// Splits transport failures into the connectivity class the orchestrator
/// recovers from and everything else.
fn classify_transport_error(e: reqwest::Error) -> Error {
    if e.is_connect() || e.is_timeout() {
        Error::OptimizerUnreachable {
            message: e.to_string(),
        }
    } else {
        Error::Http(e)
    }
}
