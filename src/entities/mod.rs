//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod break_schedule;
pub mod generation_log;
pub mod room;
pub mod school_timing;
pub mod teacher_availability;
pub mod timetable;
pub mod timetable_conflict;
pub mod timetable_period;

// Re-export specific types to avoid conflicts
pub use break_schedule::{
    Column as BreakScheduleColumn, Entity as BreakSchedule, Model as BreakScheduleModel,
};
pub use generation_log::{
    Column as GenerationLogColumn, Entity as GenerationLog, Model as GenerationLogModel,
};
pub use room::{Column as RoomColumn, Entity as Room, Model as RoomModel};
pub use school_timing::{
    Column as SchoolTimingColumn, Entity as SchoolTiming, Model as SchoolTimingModel,
};
pub use teacher_availability::{
    Column as TeacherAvailabilityColumn, Entity as TeacherAvailability,
    Model as TeacherAvailabilityModel,
};
pub use timetable::{Column as TimetableColumn, Entity as Timetable, Model as TimetableModel};
pub use timetable_conflict::{
    Column as TimetableConflictColumn, Entity as TimetableConflict,
    Model as TimetableConflictModel,
};
pub use timetable_period::{
    Column as TimetablePeriodColumn, Entity as TimetablePeriod, Model as TimetablePeriodModel,
};
