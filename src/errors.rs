//! Unified error types for the scheduling engine.
//!
//! Every fallible operation in the crate returns [`Result<T>`]. The variants
//! map onto the classes the surrounding HTTP layer cares about: not-found,
//! conflict, precondition, upstream (optimizer) and unexpected failures.

use thiserror::Error;

/// All errors the scheduling engine can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A referenced timetable does not exist.
    #[error("Timetable {id} not found")]
    TimetableNotFound {
        /// Primary key that was looked up
        id: i64,
    },

    /// A referenced timetable period does not exist.
    #[error("Timetable period {id} not found")]
    PeriodNotFound {
        /// Primary key that was looked up
        id: i64,
    },

    /// A referenced school timing configuration does not exist.
    #[error("School timing {id} not found")]
    SchoolTimingNotFound {
        /// Primary key that was looked up
        id: i64,
    },

    /// A room with the same number and building already exists for the tenant.
    #[error("Room {room_number} in building {building:?} already exists")]
    DuplicateRoom {
        /// Room number of the duplicate
        room_number: String,
        /// Building of the duplicate, None collides with None
        building: Option<String>,
    },

    /// A period create/update would violate the teacher/room overlap invariant.
    #[error("Scheduling conflict: {message}")]
    ScheduleConflict {
        /// Message of the first blocking conflict found by the pre-check
        message: String,
    },

    /// Generation was requested before school timing was configured.
    #[error("School timing not configured for tenant {tenant_id}, academic year {academic_year_id}")]
    SchoolTimingNotConfigured {
        /// Tenant the generation targeted
        tenant_id: String,
        /// Academic year the generation targeted
        academic_year_id: String,
    },

    /// The optimizer service could not be reached (connection refused,
    /// timeout, network failure). Recovered internally by the fallback path
    /// and never surfaced from `generate_timetable`.
    #[error("Optimizer unreachable: {message}")]
    OptimizerUnreachable {
        /// Transport-level failure description
        message: String,
    },

    /// The optimizer responded but the response was malformed or flagged
    /// unsuccessful. Fails the generation.
    #[error("Optimizer response error: {message}")]
    OptimizerResponse {
        /// What was wrong with the response
        message: String,
    },

    /// A time string could not be parsed as `HH:MM` or `HH:MM:SS`.
    #[error("Invalid time value: {value}")]
    InvalidTime {
        /// The rejected input
        value: String,
    },

    /// A day-of-week value was outside `0..=6`.
    #[error("Invalid day of week: {value} (expected 0-6, 0 = Sunday)")]
    InvalidDayOfWeek {
        /// The rejected input
        value: i32,
    },

    /// HTTP transport failure not classified as connectivity.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error, e.g. while reading a settings file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a connectivity-class optimizer failure that the
    /// generation orchestrator recovers from via the fallback path.
    #[must_use]
    pub const fn is_optimizer_connectivity(&self) -> bool {
        matches!(self, Self::OptimizerUnreachable { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
